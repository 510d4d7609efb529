//! A recording in-memory node for mapper tests.

use std::sync::{Arc, Mutex};

use ar_node::{Configure, Error, Metadata, Node, NodePath, NodeType, Result, Value};

pub(crate) type Events = Arc<Mutex<Vec<String>>>;

#[derive(Clone)]
pub(crate) struct Mock {
    node_type: NodeType,
    name: Option<String>,
    path: NodePath,
    metadata: Metadata,
    value: Value,
    children: Vec<Mock>,
    events: Events,
}

impl Mock {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            name: None,
            path: NodePath::root(),
            metadata: Metadata::new(),
            value: Value::Null,
            children: Vec::new(),
            events: Events::default(),
        }
    }

    pub fn scalar(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(NodeType::Value)
        }
    }

    pub fn object<'a>(children: impl IntoIterator<Item = (&'a str, Mock)>) -> Self {
        let mut node = Self::new(NodeType::Object);
        for (name, mut child) in children {
            child.name = Some(name.to_owned());
            node.children.push(child);
        }
        node.at(NodePath::root())
    }

    pub fn array(children: impl IntoIterator<Item = Mock>) -> Self {
        let mut node = Self::new(NodeType::Array);
        node.children.extend(children);
        node.at(NodePath::root())
    }

    /// Moves the node (and its subtree) to `path`.
    pub fn at(mut self, path: NodePath) -> Self {
        self.children = core::mem::take(&mut self.children)
            .into_iter()
            .enumerate()
            .map(|(index, child)| {
                let child_path = match &child.name {
                    Some(name) => path.child(name),
                    None => path.index(index),
                };
                child.at(child_path)
            })
            .collect();
        self.path = path;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Shares `events` with the node and its subtree.
    pub fn recording(mut self, events: &Events) -> Self {
        self.events = Arc::clone(events);
        self.children = core::mem::take(&mut self.children)
            .into_iter()
            .map(|child| child.recording(events))
            .collect();
        self
    }

    pub fn child(&self, index: usize) -> &Mock {
        &self.children[index]
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn current(&self) -> &Value {
        &self.value
    }

    fn record(&self, event: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(format!("{event} {}", self.path));
        }
    }

    fn insert(
        &mut self,
        name: Option<&str>,
        node_type: NodeType,
        metadata: &Metadata,
        configure: Configure<'_>,
    ) -> Result<()> {
        let path = match name {
            Some(name) => self.path.child(name),
            None => self.path.index(self.children.len()),
        };
        let mut child = Mock {
            name: name.map(str::to_owned),
            path,
            metadata: metadata.clone(),
            events: Arc::clone(&self.events),
            ..Mock::new(node_type)
        };
        configure(&mut child)?;
        self.children.push(child);
        Ok(())
    }
}

impl Node for Mock {
    fn format(&self) -> &'static str {
        "mock"
    }

    fn node_type(&self) -> NodeType {
        self.node_type
    }

    fn path(&self) -> &NodePath {
        &self.path
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn name(&self) -> Result<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| Error::naming_not_supported(&self.path, "mock", self.node_type))
    }

    fn set_name(&mut self, name: &str) -> Result<()> {
        self.name = Some(name.to_owned());
        Ok(())
    }

    fn value(&self) -> Result<Value> {
        match self.node_type {
            NodeType::Object | NodeType::Array => {
                Err(Error::value_not_supported(&self.path, "mock", self.node_type))
            }
            _ => Ok(self.value.clone()),
        }
    }

    fn set_value(&mut self, value: Value) -> Result<()> {
        match self.node_type {
            NodeType::Object | NodeType::Array => {
                Err(Error::value_not_supported(&self.path, "mock", self.node_type))
            }
            _ => {
                self.value = value;
                Ok(())
            }
        }
    }

    fn children(&self) -> Result<Vec<Box<dyn Node + '_>>> {
        if self.node_type == NodeType::Value {
            return Err(Error::children_not_supported(&self.path, "mock"));
        }
        Ok(self
            .children
            .iter()
            .map(|child| Box::new(child.clone()) as Box<dyn Node + '_>)
            .collect())
    }

    fn add(&mut self, node_type: NodeType, metadata: &Metadata, configure: Configure<'_>) -> Result<()> {
        match self.node_type {
            NodeType::Value => Err(Error::children_not_supported(&self.path, "mock")),
            NodeType::Object => Err(Error::unnamed_children_not_supported(&self.path, "mock")),
            _ => self.insert(None, node_type, metadata, configure),
        }
    }

    fn add_named(
        &mut self,
        name: &str,
        node_type: NodeType,
        metadata: &Metadata,
        configure: Configure<'_>,
    ) -> Result<()> {
        match self.node_type {
            NodeType::Value => Err(Error::children_not_supported(&self.path, "mock")),
            NodeType::Array => Err(Error::naming_not_supported(&self.path, "mock", NodeType::Array)),
            _ => self.insert(Some(name), node_type, metadata, configure),
        }
    }

    fn initialize(&mut self) -> Result<()> {
        self.record("initialize");
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        self.record("validate");
        Ok(())
    }
}

/// The recorded events, in order.
pub(crate) fn recorded(events: &Events) -> Vec<String> {
    events.lock().map(|events| events.clone()).unwrap_or_default()
}
