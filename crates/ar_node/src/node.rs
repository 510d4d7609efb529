use core::any::Any;
use core::fmt;

use crate::{Error, Metadata, NodeDescription, NodePath, Result, Value};

// -----------------------------------------------------------------------------
// NodeType

/// The shape of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// A scalar leaf; never has children.
    Value,
    /// Uniquely named children.
    Object,
    /// Unnamed, ordered children.
    Array,
    /// Behaves as Object, Array or Value depending on its counterpart.
    Variable,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Value,
        NodeType::Object,
        NodeType::Array,
        NodeType::Variable,
    ];

    /// `true` for Value and Variable.
    #[inline]
    pub const fn is_value_bearing(self) -> bool {
        matches!(self, NodeType::Value | NodeType::Variable)
    }

    /// `true` for Object, Array and Variable.
    #[inline]
    pub const fn is_container(self) -> bool {
        matches!(self, NodeType::Object | NodeType::Array | NodeType::Variable)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            NodeType::Value => "value",
            NodeType::Object => "object",
            NodeType::Array => "array",
            NodeType::Variable => "variable",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Mode

/// Direction of a mapping run.
///
/// On [`Mode::Serialize`] the object side is the source; on
/// [`Mode::Deserialize`] it is the target. The traversal is the same, only
/// error messages differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Serialize,
    Deserialize,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Mode::Serialize => "serializing",
            Mode::Deserialize => "deserializing",
        })
    }
}

// -----------------------------------------------------------------------------
// Node

/// Callback handed to [`Node::add`] and [`Node::add_named`].
///
/// It receives the freshly inserted child while the parent still holds it,
/// so the parent can commit the child after the callback returns.
pub type Configure<'f> = &'f mut dyn FnMut(&mut dyn Node) -> Result<()>;

/// The uniform tree contract.
///
/// Read-side nodes implement [`children`](Node::children) and
/// [`value`](Node::value); write-side nodes implement [`add`](Node::add),
/// [`add_named`](Node::add_named) and [`set_value`](Node::set_value).
/// Operations that do not apply to a node's shape fail with one of the
/// contract-violation errors, for example [`Error::ChildrenNotSupported`]
/// on a Value node.
///
/// A node never holds its parent. Its [`path`](Node::path) records where it
/// sits, and an empty path marks the root.
pub trait Node {
    /// Short name of the backing format, for messages (`"json"`, `"object"`).
    fn format(&self) -> &'static str;

    fn node_type(&self) -> NodeType;

    fn path(&self) -> &NodePath;

    fn metadata(&self) -> &Metadata;

    /// Name of the type behind the node, for object-backed nodes.
    fn type_name(&self) -> Option<&str> {
        None
    }

    /// The node's name; fails on unnamed nodes (roots, array items).
    fn name(&self) -> Result<&str>;

    fn set_name(&mut self, name: &str) -> Result<()> {
        let _ = name;
        Err(Error::naming_not_supported(
            self.path(),
            self.format(),
            self.node_type(),
        ))
    }

    /// The scalar payload; fails on Object and Array nodes.
    fn value(&self) -> Result<Value>;

    fn set_value(&mut self, value: Value) -> Result<()>;

    /// Child nodes in order; fails on Value nodes.
    fn children(&self) -> Result<Vec<Box<dyn Node + '_>>>;

    /// Inserts an unnamed child of shape `node_type` and runs `configure` on it.
    ///
    /// Fails on Object-shaped nodes, which only take named children.
    fn add(&mut self, node_type: NodeType, metadata: &Metadata, configure: Configure<'_>)
    -> Result<()>;

    /// Inserts a child named `name` of shape `node_type` and runs `configure` on it.
    ///
    /// Fails on Array-shaped nodes.
    fn add_named(
        &mut self,
        name: &str,
        node_type: NodeType,
        metadata: &Metadata,
        configure: Configure<'_>,
    ) -> Result<()>;

    /// The typed payload of an object-backed node.
    fn object(&self) -> Option<&dyn Any> {
        None
    }

    /// Replaces the payload of an object-backed node with a ready value.
    fn set_object(&mut self, value: Box<dyn Any + Send>) -> Result<()> {
        drop(value);
        Err(Error::value_not_supported(
            self.path(),
            self.format(),
            self.node_type(),
        ))
    }

    /// Runs after the node is inserted and before its subtree is mapped.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs after the node's subtree is mapped.
    fn validate(&mut self) -> Result<()> {
        Ok(())
    }
}

impl dyn Node + '_ {
    /// Format, shape and type of the node, for messages.
    pub fn describe(&self) -> NodeDescription {
        NodeDescription {
            format: self.format(),
            node_type: self.node_type(),
            type_name: self.type_name().map(str::to_owned),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.path().is_root()
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        self.name().is_ok()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf {
        path: NodePath,
        metadata: Metadata,
        value: Value,
    }

    impl Node for Leaf {
        fn format(&self) -> &'static str {
            "leaf"
        }
        fn node_type(&self) -> NodeType {
            NodeType::Value
        }
        fn path(&self) -> &NodePath {
            &self.path
        }
        fn metadata(&self) -> &Metadata {
            &self.metadata
        }
        fn name(&self) -> Result<&str> {
            Err(Error::naming_not_supported(&self.path, "leaf", NodeType::Value))
        }
        fn value(&self) -> Result<Value> {
            Ok(self.value.clone())
        }
        fn set_value(&mut self, value: Value) -> Result<()> {
            self.value = value;
            Ok(())
        }
        fn children(&self) -> Result<Vec<Box<dyn Node + '_>>> {
            Err(Error::children_not_supported(&self.path, "leaf"))
        }
        fn add(&mut self, _: NodeType, _: &Metadata, _: Configure<'_>) -> Result<()> {
            Err(Error::children_not_supported(&self.path, "leaf"))
        }
        fn add_named(&mut self, _: &str, _: NodeType, _: &Metadata, _: Configure<'_>) -> Result<()> {
            Err(Error::children_not_supported(&self.path, "leaf"))
        }
    }

    #[test]
    fn defaults_reject_object_payloads() {
        let mut leaf = Leaf {
            path: NodePath::root(),
            metadata: Metadata::new(),
            value: Value::Null,
        };
        let node: &mut dyn Node = &mut leaf;
        assert!(node.object().is_none());
        assert!(matches!(
            node.set_object(Box::new(1_u8)),
            Err(Error::ValueNotSupported { .. })
        ));
        assert!(matches!(node.set_name("x"), Err(Error::NamingNotSupported { .. })));
        assert!(!node.is_named());
        assert!(node.is_root());
        assert_eq!(node.describe().to_string(), "leaf value");
    }

    #[test]
    fn shapes() {
        assert!(NodeType::Variable.is_value_bearing());
        assert!(NodeType::Variable.is_container());
        assert!(!NodeType::Value.is_container());
        assert!(!NodeType::Array.is_value_bearing());
        assert_eq!(format!("{:>6}", NodeType::Array), " array");
    }
}
