use core::fmt;
use std::sync::Arc;

// -----------------------------------------------------------------------------
// NodePath

/// One step from a parent to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Name(Arc<str>),
    Index(usize),
}

/// The location of a node, from the root.
///
/// Rendered as `/` for the root and `/a/b[2]/c` below it.
///
/// ```
/// use ar_node::NodePath;
///
/// let path = NodePath::root().child("items").index(2).child("name");
/// assert_eq!(path.to_string(), "/items[2]/name");
/// assert_eq!(path.depth(), 3);
/// assert!(NodePath::root().is_root());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

impl NodePath {
    #[inline]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path of the named child `name`.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Name(Arc::from(name)));
        Self { segments }
    }

    /// Path of the unnamed child at `index`.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Path of the parent, `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    #[inline]
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Number of segments; zero at the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                PathSegment::Name(name) => write!(f, "/{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
