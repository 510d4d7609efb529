use core::fmt;

use thiserror::Error;

use crate::{Mode, NodePath, NodeType};

/// A boxed error raised by user code, such as a convention.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// `Result` with [`Error`] as the default error type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

// -----------------------------------------------------------------------------
// NodeDescription

/// Format, shape and optional type of a node, as shown in messages.
///
/// ```
/// use ar_node::{NodeDescription, NodeType};
///
/// let desc = NodeDescription {
///     format: "object",
///     node_type: NodeType::Object,
///     type_name: Some("Person".into()),
/// };
/// assert_eq!(desc.to_string(), "object object (`Person`)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescription {
    pub format: &'static str,
    pub node_type: NodeType,
    pub type_name: Option<String>,
}

impl fmt::Display for NodeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format, self.node_type)?;
        if let Some(name) = &self.type_name {
            write!(f, " (`{name}`)")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Error

/// Errors raised while mapping one node tree onto another.
///
/// Data errors (`NodeTypeMismatch`, `UnrecognizedNode`, `ValueParse`,
/// `ObjectConstruction`) describe input that does not fit the target.
/// Contract errors (`NamingNotSupported`, `ValueNotSupported`,
/// `ChildrenNotSupported`, `UnnamedChildrenNotSupported`, `ReadOnly`) mean a
/// node was asked for something its shape cannot do.
///
/// [`Display`](fmt::Display) gives the technical message,
/// [`Error::friendly_message`] the rendering meant for end users.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("{path}: cannot map a {from} node to a {to} node while {mode}")]
    NodeTypeMismatch {
        path: NodePath,
        mode: Mode,
        from: NodeDescription,
        to: NodeDescription,
    },
    #[error("{path}: `{name}` does not match any member of `{type_name}`")]
    UnrecognizedNode {
        path: NodePath,
        name: String,
        type_name: String,
    },
    #[error("{path}: cannot parse {value} as `{type_name}`: {reason}")]
    ValueParse {
        path: NodePath,
        value: String,
        type_name: String,
        reason: String,
        friendly: Option<String>,
    },
    #[error("{path}: cannot construct `{type_name}`: {reason}")]
    ObjectConstruction {
        path: NodePath,
        type_name: String,
        reason: String,
    },
    #[error("{path}: {message}")]
    Convention {
        path: NodePath,
        message: String,
        #[source]
        cause: BoxError,
    },
    #[error("invalid {format} document: {cause}")]
    Document {
        format: &'static str,
        #[source]
        cause: BoxError,
    },
    #[error("{path}: {format} {node_type} node has no name")]
    NamingNotSupported {
        path: NodePath,
        format: &'static str,
        node_type: NodeType,
    },
    #[error("{path}: {format} {node_type} node does not carry a value")]
    ValueNotSupported {
        path: NodePath,
        format: &'static str,
        node_type: NodeType,
    },
    #[error("{path}: {format} value node has no children")]
    ChildrenNotSupported { path: NodePath, format: &'static str },
    #[error("{path}: {format} object node only takes named children")]
    UnnamedChildrenNotSupported { path: NodePath, format: &'static str },
    #[error("{path}: {format} node is read-only")]
    ReadOnly { path: NodePath, format: &'static str },
}

impl Error {
    #[inline]
    pub fn naming_not_supported(path: &NodePath, format: &'static str, node_type: NodeType) -> Self {
        Error::NamingNotSupported {
            path: path.clone(),
            format,
            node_type,
        }
    }

    #[inline]
    pub fn value_not_supported(path: &NodePath, format: &'static str, node_type: NodeType) -> Self {
        Error::ValueNotSupported {
            path: path.clone(),
            format,
            node_type,
        }
    }

    #[inline]
    pub fn children_not_supported(path: &NodePath, format: &'static str) -> Self {
        Error::ChildrenNotSupported {
            path: path.clone(),
            format,
        }
    }

    #[inline]
    pub fn unnamed_children_not_supported(path: &NodePath, format: &'static str) -> Self {
        Error::UnnamedChildrenNotSupported {
            path: path.clone(),
            format,
        }
    }

    #[inline]
    pub fn read_only(path: &NodePath, format: &'static str) -> Self {
        Error::ReadOnly {
            path: path.clone(),
            format,
        }
    }

    /// Wraps a decoder error for malformed input.
    pub fn document(format: &'static str, cause: impl Into<BoxError>) -> Self {
        Error::Document {
            format,
            cause: cause.into(),
        }
    }

    /// The path of the offending node, when there is one.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            Error::NodeTypeMismatch { path, .. }
            | Error::UnrecognizedNode { path, .. }
            | Error::ValueParse { path, .. }
            | Error::ObjectConstruction { path, .. }
            | Error::Convention { path, .. }
            | Error::NamingNotSupported { path, .. }
            | Error::ValueNotSupported { path, .. }
            | Error::ChildrenNotSupported { path, .. }
            | Error::UnnamedChildrenNotSupported { path, .. }
            | Error::ReadOnly { path, .. } => Some(path),
            Error::Document { .. } => None,
        }
    }

    /// `true` for errors that point at a broken node implementation rather
    /// than at bad input.
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::NamingNotSupported { .. }
                | Error::ValueNotSupported { .. }
                | Error::ChildrenNotSupported { .. }
                | Error::UnnamedChildrenNotSupported { .. }
                | Error::ReadOnly { .. }
        )
    }

    /// A message meant for end users.
    ///
    /// Parse failures use the configured template when there is one. Other
    /// data errors get a plain sentence naming the location; everything else
    /// falls back to the technical message.
    ///
    /// ```
    /// use ar_node::{Error, NodePath};
    ///
    /// let err = Error::ValueParse {
    ///     path: NodePath::root().child("age"),
    ///     value: "\"ten\"".into(),
    ///     type_name: "u8".into(),
    ///     reason: "invalid digit found in string".into(),
    ///     friendly: Some("Age must be a whole number.".into()),
    /// };
    /// assert_eq!(err.friendly_message(), "Age must be a whole number.");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "/age: cannot parse \"ten\" as `u8`: invalid digit found in string"
    /// );
    /// ```
    pub fn friendly_message(&self) -> String {
        match self {
            Error::ValueParse {
                friendly: Some(friendly),
                ..
            } => friendly.clone(),
            Error::ValueParse { path, value, .. } => {
                format!("The value {value} at '{path}' is not valid.")
            }
            Error::NodeTypeMismatch {
                path,
                mode: Mode::Deserialize,
                from,
                to,
            } => format!(
                "Expected {} at '{path}' but found {}.",
                with_article(to.node_type),
                with_article(from.node_type),
            ),
            Error::NodeTypeMismatch { path, from, to, .. } => format!(
                "The {} at '{path}' cannot be written as {}.",
                from.node_type,
                with_article(to.node_type),
            ),
            Error::UnrecognizedNode { name, .. } => format!("'{name}' is not a recognized field."),
            Error::ObjectConstruction { path, .. } => format!("Unable to create the value at '{path}'."),
            other => other.to_string(),
        }
    }
}

fn with_article(node_type: NodeType) -> String {
    match node_type {
        NodeType::Object | NodeType::Array => format!("an {node_type}"),
        NodeType::Value | NodeType::Variable => format!("a {node_type}"),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_names_both_shapes() {
        let err = Error::NodeTypeMismatch {
            path: NodePath::root().child("tags"),
            mode: Mode::Deserialize,
            from: NodeDescription {
                format: "json",
                node_type: NodeType::Object,
                type_name: None,
            },
            to: NodeDescription {
                format: "object",
                node_type: NodeType::Array,
                type_name: Some("Vec<String>".into()),
            },
        };
        assert_eq!(
            err.to_string(),
            "/tags: cannot map a json object node to a object array (`Vec<String>`) node while deserializing"
        );
        assert_eq!(
            err.friendly_message(),
            "Expected an array at '/tags' but found an object."
        );
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn convention_keeps_cause() {
        use core::error::Error as _;

        let err = Error::Convention {
            path: NodePath::root(),
            message: "reader failed".into(),
            cause: "bad input".into(),
        };
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("bad input"));
        assert_eq!(err.path(), Some(&NodePath::root()));
    }

    #[test]
    fn contract_violations() {
        let err = Error::children_not_supported(&NodePath::root(), "json");
        assert!(err.is_contract_violation());
        assert_eq!(err.to_string(), "/: json value node has no children");
        assert!(Error::document("json", "eof").path().is_none());
    }
}
