use ar_node::{BoxError, Error, Mode, Node, NodeType, Result};

use crate::Options;

/// `true` when the default mapping can handle a source of shape `from`
/// feeding a target of shape `to`.
///
/// ```
/// use ar_map::is_legal;
/// use ar_node::NodeType;
///
/// assert!(is_legal(NodeType::Variable, NodeType::Array));
/// assert!(!is_legal(NodeType::Object, NodeType::Array));
/// assert!(!is_legal(NodeType::Variable, NodeType::Variable));
/// ```
pub const fn is_legal(from: NodeType, to: NodeType) -> bool {
    use NodeType::{Array, Object, Value, Variable};

    matches!(
        (from, to),
        (Value, Value)
            | (Value, Variable)
            | (Variable, Value)
            | (Object, Object)
            | (Object, Variable)
            | (Variable, Object)
            | (Array, Array)
            | (Array, Variable)
            | (Variable, Array)
    )
}

// -----------------------------------------------------------------------------
// NodeMapper

type BoxedFactory<'o> = Box<dyn Fn(BoxError, &dyn Node, &dyn Node) -> Error + 'o>;

/// Walks a source tree and builds the target tree from it.
///
/// For every (source, target) pair, the mapper first offers the pair to the
/// map conventions of its [`Mode`]. When none matches, it runs the target's
/// `initialize` hook, copies the value or maps the children, and runs
/// `validate`. Visit conventions run last, in both cases.
///
/// Children are inserted through [`Node::add_named`] when either side is an
/// Object, through [`Node::add`] otherwise, and each child pair is mapped
/// completely before its next sibling.
///
/// # Example
///
/// ```
/// use ar_map::{NodeMapper, Options, ObjectReader, ObjectWriter};
/// use ar_node::Mode;
///
/// let options = Options::default();
/// let numbers = vec![1_u8, 2, 3];
///
/// let source = ObjectReader::new(&numbers, &options);
/// let mut target = ObjectWriter::new::<Vec<u16>>(&options);
/// NodeMapper::new(&options, Mode::Deserialize).map(&source, &mut target).unwrap();
///
/// assert_eq!(target.into_value::<Vec<u16>>().unwrap(), [1, 2, 3]);
/// ```
pub struct NodeMapper<'o> {
    options: &'o Options,
    mode: Mode,
    on_error: BoxedFactory<'o>,
}

impl<'o> NodeMapper<'o> {
    pub fn new(options: &'o Options, mode: Mode) -> Self {
        Self {
            options,
            mode,
            on_error: Box::new(convention_error),
        }
    }

    /// Replaces the function wrapping errors raised inside conventions.
    pub fn with_error_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(BoxError, &dyn Node, &dyn Node) -> Error + 'o,
    {
        self.on_error = Box::new(factory);
        self
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn options(&self) -> &'o Options {
        self.options
    }

    /// Maps `source` onto `target`, the root pair included.
    pub fn map(&self, source: &dyn Node, target: &mut dyn Node) -> Result<()> {
        self.map_pair(source, target)
    }

    fn map_pair(&self, source: &dyn Node, target: &mut dyn Node) -> Result<()> {
        log::trace!(
            "{}: {} -> {}",
            source.path(),
            source.describe(),
            target.describe()
        );

        let conventions = self.options.conventions(self.mode);
        if conventions
            .map
            .map(source, target, self.options, &*self.on_error)?
        {
            log::debug!("{}: mapped by convention", source.path());
        } else {
            target.initialize()?;
            self.map_default(source, target)?;
            target.validate()?;
        }

        conventions
            .visit
            .visit(source, target, self.options, &*self.on_error)
    }

    fn map_default(&self, source: &dyn Node, target: &mut dyn Node) -> Result<()> {
        let (from, to) = (source.node_type(), target.node_type());
        if !is_legal(from, to) {
            return Err(Error::NodeTypeMismatch {
                path: source.path().clone(),
                mode: self.mode,
                from: source.describe(),
                to: target.describe(),
            });
        }

        if from == NodeType::Value || to == NodeType::Value {
            return target.set_value(source.value()?);
        }

        let named = from == NodeType::Object || to == NodeType::Object;
        for child in source.children()? {
            let child = &*child;
            let mut configure = |inserted: &mut dyn Node| self.map_pair(child, inserted);
            if named {
                target.add_named(
                    child.name()?,
                    child.node_type(),
                    child.metadata(),
                    &mut configure,
                )?;
            } else {
                target.add(child.node_type(), child.metadata(), &mut configure)?;
            }
        }
        Ok(())
    }
}

fn convention_error(cause: BoxError, source: &dyn Node, target: &dyn Node) -> Error {
    Error::Convention {
        path: source.path().clone(),
        message: format!(
            "convention failed mapping {} to {}",
            source.describe(),
            target.describe()
        ),
        cause,
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use ar_node::{Error, Mode, Node, NodeType, Value};

    use super::{NodeMapper, is_legal};
    use crate::Options;
    use crate::mock::{Events, Mock, recorded};

    fn empty(node_type: NodeType) -> Mock {
        match node_type {
            NodeType::Value => Mock::scalar(Value::Null),
            other => Mock::new(other),
        }
    }

    #[test]
    fn legal_pairs_map_and_others_mismatch() {
        let options = Options::default();
        let mapper = NodeMapper::new(&options, Mode::Deserialize);
        for from in NodeType::ALL {
            for to in NodeType::ALL {
                let result = mapper.map(&empty(from), &mut empty(to));
                if is_legal(from, to) {
                    assert!(result.is_ok(), "{from} -> {to}: {result:?}");
                } else {
                    assert!(
                        matches!(result, Err(Error::NodeTypeMismatch { .. })),
                        "{from} -> {to}: {result:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn map_convention_suppresses_children_and_hooks() {
        let mut options = Options::default();
        options.deserialization.map.add(|_, _, _| Ok(()));
        let mapper = NodeMapper::new(&options, Mode::Deserialize);

        for from in NodeType::ALL {
            for to in NodeType::ALL {
                let events = Events::default();
                let source = Mock::object([("a", Mock::scalar(1))]);
                let source = if from == NodeType::Object { source } else { empty(from) };
                let mut target = empty(to).recording(&events);

                mapper.map(&source, &mut target).unwrap();
                assert!(recorded(&events).is_empty(), "{from} -> {to}");
                if to != NodeType::Value {
                    assert_eq!(target.len(), 0);
                }
            }
        }
    }

    #[test]
    fn hooks_wrap_each_child() {
        let options = Options::default();
        let events = Events::default();
        let source = Mock::object([
            ("a", Mock::scalar(1)),
            ("b", Mock::array([Mock::scalar("x")])),
        ]);
        let mut target = Mock::new(NodeType::Variable).recording(&events);

        NodeMapper::new(&options, Mode::Serialize)
            .map(&source, &mut target)
            .unwrap();

        assert_eq!(
            recorded(&events),
            [
                "initialize /",
                "initialize /a",
                "validate /a",
                "initialize /b",
                "initialize /b[0]",
                "validate /b[0]",
                "validate /b",
                "validate /",
            ]
        );
        assert_eq!(target.child(0).name().unwrap(), "a");
        assert_eq!(target.child(0).current(), &Value::from(1));
        assert_eq!(target.child(1).child(0).current(), &Value::from("x"));
    }

    #[test]
    fn object_into_array_needs_a_convention() {
        let mut options = Options::default();
        let source = Mock::object([("a", Mock::scalar(1))]);

        let err = NodeMapper::new(&options, Mode::Deserialize)
            .map(&source, &mut Mock::new(NodeType::Array))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "/: cannot map a mock object node to a mock array node while deserializing"
        );

        options.deserialization.map.add(|source, target, _| {
            for child in source.children()? {
                let value = child.value()?;
                target.add(NodeType::Value, child.metadata(), &mut |item: &mut dyn Node| {
                    item.set_value(value.clone())
                })?;
            }
            Ok(())
        });
        let mut target = Mock::new(NodeType::Array);
        NodeMapper::new(&options, Mode::Deserialize)
            .map(&source, &mut target)
            .unwrap();
        assert_eq!(target.child(0).current(), &Value::from(1));
    }

    #[test]
    fn visit_conventions_run_in_order() {
        let mut options = Options::default();
        options
            .serialization
            .visit
            .add(|_, target, _| Ok(target.set_value(Value::from("first"))?));
        options.serialization.visit.add(|_, target, _| {
            let seen = target.value()?.to_text().into_owned();
            target.set_value(Value::String(format!("{seen}+second")))?;
            Ok(())
        });

        let mut target = Mock::scalar(Value::Null);
        NodeMapper::new(&options, Mode::Serialize)
            .map(&Mock::scalar(0), &mut target)
            .unwrap();
        assert_eq!(target.current(), &Value::from("first+second"));
    }

    #[test]
    fn custom_error_factory() {
        let mut options = Options::default();
        options
            .deserialization
            .map
            .add(|_, _, _| Err("no luck".into()));

        let err = NodeMapper::new(&options, Mode::Deserialize)
            .with_error_factory(|cause, source, _| Error::Convention {
                path: source.path().clone(),
                message: "custom".into(),
                cause,
            })
            .map(&Mock::scalar(1), &mut Mock::scalar(Value::Null))
            .unwrap_err();
        assert_eq!(err.to_string(), "/: custom");
        assert_eq!(
            core::error::Error::source(&err).map(ToString::to_string).as_deref(),
            Some("no luck")
        );
    }
}
