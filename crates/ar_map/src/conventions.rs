use core::fmt;

use ar_node::{BoxError, Error, Node, Result};

use crate::Options;

/// Decides whether a convention applies to a (source, target) pair.
pub type Predicate = dyn Fn(&dyn Node, &dyn Node, &Options) -> Result<bool, BoxError> + Send + Sync;

/// The body of a convention.
pub type Action = dyn Fn(&dyn Node, &mut dyn Node, &Options) -> Result<(), BoxError> + Send + Sync;

/// Turns an error raised inside a convention into a mapping error.
///
/// Receives the inner error, the source node and the target node.
pub type ErrorFactory<'f> = &'f dyn Fn(BoxError, &dyn Node, &dyn Node) -> Error;

// -----------------------------------------------------------------------------
// Convention

/// An action with an optional predicate. Without a predicate the convention
/// matches every pair.
pub struct Convention {
    when: Option<Box<Predicate>>,
    action: Box<Action>,
}

impl Convention {
    /// Gates the convention on an infallible predicate.
    pub fn when<P>(&mut self, predicate: P) -> &mut Self
    where
        P: Fn(&dyn Node, &dyn Node, &Options) -> bool + Send + Sync + 'static,
    {
        self.when = Some(boxed_predicate(move |source, target, options| {
            Ok(predicate(source, target, options))
        }));
        self
    }

    /// Gates the convention on a fallible predicate.
    pub fn try_when<P>(&mut self, predicate: P) -> &mut Self
    where
        P: Fn(&dyn Node, &dyn Node, &Options) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.when = Some(Box::new(predicate));
        self
    }

    fn matches(
        &self,
        source: &dyn Node,
        target: &dyn Node,
        options: &Options,
        on_error: ErrorFactory<'_>,
    ) -> Result<bool> {
        match &self.when {
            Some(when) => when(source, target, options).map_err(|err| on_error(err, source, target)),
            None => Ok(true),
        }
    }

    fn run(
        &self,
        source: &dyn Node,
        target: &mut dyn Node,
        options: &Options,
        on_error: ErrorFactory<'_>,
    ) -> Result<()> {
        (self.action)(source, &mut *target, options).map_err(|err| on_error(err, source, &*target))
    }
}

impl fmt::Debug for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Convention")
            .field("gated", &self.when.is_some())
            .finish_non_exhaustive()
    }
}

fn boxed_predicate<P>(predicate: P) -> Box<Predicate>
where
    P: Fn(&dyn Node, &dyn Node, &Options) -> Result<bool, BoxError> + Send + Sync + 'static,
{
    Box::new(predicate)
}

fn push<A>(list: &mut Vec<Convention>, action: A) -> &mut Convention
where
    A: Fn(&dyn Node, &mut dyn Node, &Options) -> Result<(), BoxError> + Send + Sync + 'static,
{
    let index = list.len();
    list.push(Convention {
        when: None,
        action: Box::new(action),
    });
    &mut list[index]
}

// -----------------------------------------------------------------------------
// MapConventions

/// Exclusive overrides of the default mapping.
///
/// The first matching convention maps the pair on its own: the mapper does
/// not copy values, insert children or run lifecycle hooks for it.
///
/// # Example
///
/// ```
/// use ar_map::Options;
/// use ar_node::{NodeType, Value};
///
/// let mut options = Options::default();
/// options
///     .deserialization
///     .map
///     .add(|source, target, _| {
///         let text = source.value()?.to_text().to_uppercase();
///         target.set_value(Value::String(text))?;
///         Ok(())
///     })
///     .when(|source, _, _| source.node_type() == NodeType::Value);
/// assert_eq!(options.deserialization.map.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MapConventions {
    list: Vec<Convention>,
}

impl MapConventions {
    pub fn add<A>(&mut self, action: A) -> &mut Convention
    where
        A: Fn(&dyn Node, &mut dyn Node, &Options) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        push(&mut self.list, action)
    }

    /// `true` when some convention matches the pair.
    pub fn has_mapping(
        &self,
        source: &dyn Node,
        target: &dyn Node,
        options: &Options,
        on_error: ErrorFactory<'_>,
    ) -> Result<bool> {
        for convention in &self.list {
            if convention.matches(source, target, options, on_error)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Runs the first matching convention; `false` when none matched.
    pub fn map(
        &self,
        source: &dyn Node,
        target: &mut dyn Node,
        options: &Options,
        on_error: ErrorFactory<'_>,
    ) -> Result<bool> {
        for convention in &self.list {
            if convention.matches(source, &*target, options, on_error)? {
                convention.run(source, target, options, on_error)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

// -----------------------------------------------------------------------------
// VisitConventions

/// Inclusive post-processing steps, run after a pair is mapped.
#[derive(Debug, Default)]
pub struct VisitConventions {
    list: Vec<Convention>,
}

impl VisitConventions {
    pub fn add<A>(&mut self, action: A) -> &mut Convention
    where
        A: Fn(&dyn Node, &mut dyn Node, &Options) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        push(&mut self.list, action)
    }

    /// Runs every matching convention in registration order.
    pub fn visit(
        &self,
        source: &dyn Node,
        target: &mut dyn Node,
        options: &Options,
        on_error: ErrorFactory<'_>,
    ) -> Result<()> {
        for convention in &self.list {
            if convention.matches(source, &*target, options, on_error)? {
                convention.run(source, target, options, on_error)?;
            }
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Conventions

/// The conventions of one mapping direction.
#[derive(Debug, Default)]
pub struct Conventions {
    pub map: MapConventions,
    pub visit: VisitConventions,
}

// -----------------------------------------------------------------------------
// Tests
