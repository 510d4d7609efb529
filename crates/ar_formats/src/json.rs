//! JSON documents as node trees, over [`serde_json::Value`].
//!
//! JSON objects are Object nodes, arrays Array nodes and everything else a
//! Value node. Member order is kept in both directions.
//!
//! ```
//! use ar_map::Options;
//! use ar_reflect::derive::Reflect;
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! #[reflect(default, rename_all = "camelCase")]
//! struct Release {
//!     version: String,
//!     download_count: u32,
//! }
//!
//! let options = Options::default();
//! let release: Release = ar_formats::json::from_str(r#"{"version":"1.2","downloadCount":7}"#, &options).unwrap();
//! assert_eq!(release.download_count, 7);
//! assert_eq!(
//!     ar_formats::json::to_string(&release, &options).unwrap(),
//!     r#"{"version":"1.2","downloadCount":7}"#
//! );
//! ```

use ar_map::{NodeMapper, ObjectReader, Options};
use ar_node::{Configure, Error, Metadata, Mode, Node, NodePath, NodeType, Result, Value};
use ar_reflect::{Reflect, Typed};
use serde_json::{Map, Value as Json};

pub(crate) const FORMAT: &str = "json";

fn shape_of(json: &Json) -> NodeType {
    match json {
        Json::Object(_) => NodeType::Object,
        Json::Array(_) => NodeType::Array,
        _ => NodeType::Value,
    }
}

fn empty_of(node_type: NodeType) -> Json {
    match node_type {
        NodeType::Object => Json::Object(Map::new()),
        NodeType::Array => Json::Array(Vec::new()),
        NodeType::Value | NodeType::Variable => Json::Null,
    }
}

fn scalar_of(json: &Json) -> Result<Value> {
    serde_json::from_value(json.clone()).map_err(|err| Error::document(FORMAT, err))
}

// -----------------------------------------------------------------------------
// JsonNode

/// A read-only view of a JSON document.
#[derive(Debug, Clone)]
pub struct JsonNode<'a> {
    json: &'a Json,
    path: NodePath,
    name: Option<&'a str>,
    metadata: Metadata,
}

impl<'a> JsonNode<'a> {
    pub fn new(json: &'a Json) -> Self {
        Self {
            json,
            path: NodePath::root(),
            name: None,
            metadata: Metadata::new(),
        }
    }
}

fn children_of<'a>(json: &'a Json, path: &NodePath) -> Result<Vec<Box<dyn Node + 'a>>> {
    let node = |json: &'a Json, path: NodePath, name: Option<&'a str>| {
        Box::new(JsonNode {
            json,
            path,
            name,
            metadata: Metadata::new(),
        }) as Box<dyn Node + 'a>
    };
    match json {
        Json::Object(map) => Ok(map
            .iter()
            .map(|(name, json)| node(json, path.child(name), Some(name.as_str())))
            .collect()),
        Json::Array(items) => Ok(items
            .iter()
            .enumerate()
            .map(|(index, json)| node(json, path.index(index), None))
            .collect()),
        _ => Err(Error::children_not_supported(path, FORMAT)),
    }
}

impl Node for JsonNode<'_> {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn node_type(&self) -> NodeType {
        shape_of(self.json)
    }

    fn path(&self) -> &NodePath {
        &self.path
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn name(&self) -> Result<&str> {
        self.name
            .ok_or_else(|| Error::naming_not_supported(&self.path, FORMAT, self.node_type()))
    }

    fn set_name(&mut self, _: &str) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    fn value(&self) -> Result<Value> {
        match self.node_type() {
            NodeType::Value => scalar_of(self.json),
            other => Err(Error::value_not_supported(&self.path, FORMAT, other)),
        }
    }

    fn set_value(&mut self, _: Value) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    fn children(&self) -> Result<Vec<Box<dyn Node + '_>>> {
        children_of(self.json, &self.path)
    }

    fn add(&mut self, _: NodeType, _: &Metadata, _: Configure<'_>) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    fn add_named(&mut self, _: &str, _: NodeType, _: &Metadata, _: Configure<'_>) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }
}

// -----------------------------------------------------------------------------
// JsonWriter

/// Builds a JSON document from the nodes mapped into it.
///
/// A Variable writer takes its shape from the first write: a named child
/// makes it an object, an unnamed one an array, a value a scalar.
#[derive(Debug)]
pub struct JsonWriter {
    json: Json,
    node_type: NodeType,
    path: NodePath,
    name: Option<String>,
    metadata: Metadata,
}

impl JsonWriter {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            json: empty_of(node_type),
            node_type,
            path: NodePath::root(),
            name: None,
            metadata: Metadata::new(),
        }
    }

    /// The document written so far.
    #[inline]
    pub fn get(&self) -> &Json {
        &self.json
    }

    #[inline]
    pub fn into_json(self) -> Json {
        self.json
    }

    fn settle(&mut self, node_type: NodeType) {
        if self.node_type == NodeType::Variable {
            self.node_type = node_type;
            self.json = empty_of(node_type);
        }
    }

    fn child(&self, path: NodePath, name: Option<&str>, node_type: NodeType, metadata: &Metadata) -> JsonWriter {
        JsonWriter {
            json: empty_of(node_type),
            node_type,
            path,
            name: name.map(str::to_owned),
            metadata: metadata.clone(),
        }
    }
}

impl Node for JsonWriter {
    fn format(&self) -> &'static str {
        FORMAT
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
            .ok_or_else(|| Error::naming_not_supported(&self.path, FORMAT, self.node_type))
    }

    fn value(&self) -> Result<Value> {
        match self.node_type {
            NodeType::Value | NodeType::Variable => scalar_of(&self.json),
            other => Err(Error::value_not_supported(&self.path, FORMAT, other)),
        }
    }

    fn set_value(&mut self, value: Value) -> Result<()> {
        self.settle(NodeType::Value);
        if self.node_type != NodeType::Value {
            return Err(Error::value_not_supported(&self.path, FORMAT, self.node_type));
        }
        self.json = serde_json::to_value(value).map_err(|err| Error::document(FORMAT, err))?;
        Ok(())
    }

    /// The members or items written so far.
    fn children(&self) -> Result<Vec<Box<dyn Node + '_>>> {
        match self.node_type {
            NodeType::Variable => Ok(Vec::new()),
            _ => children_of(&self.json, &self.path),
        }
    }

    fn add(&mut self, node_type: NodeType, metadata: &Metadata, configure: Configure<'_>) -> Result<()> {
        self.settle(NodeType::Array);
        let len = match (&self.json, self.node_type) {
            (Json::Array(items), _) => items.len(),
            (_, NodeType::Object) => return Err(Error::unnamed_children_not_supported(&self.path, FORMAT)),
            _ => return Err(Error::children_not_supported(&self.path, FORMAT)),
        };
        let mut child = self.child(self.path.index(len), None, node_type, metadata);
        configure(&mut child)?;
        if let Json::Array(items) = &mut self.json {
            items.push(child.json);
        }
        Ok(())
    }

    fn add_named(
        &mut self,
        name: &str,
        node_type: NodeType,
        metadata: &Metadata,
        configure: Configure<'_>,
    ) -> Result<()> {
        self.settle(NodeType::Object);
        match self.node_type {
            NodeType::Object => {}
            NodeType::Array => return Err(Error::naming_not_supported(&self.path, FORMAT, NodeType::Array)),
            _ => return Err(Error::children_not_supported(&self.path, FORMAT)),
        }
        let mut child = self.child(self.path.child(name), Some(name), node_type, metadata);
        configure(&mut child)?;
        if let Json::Object(map) = &mut self.json
            && map.insert(name.to_owned(), child.json).is_some()
        {
            log::debug!("{}: duplicate member `{name}` replaced", self.path);
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Facades

/// Parses `text` and builds a `T` from it.
pub fn from_str<T: Typed>(text: &str, options: &Options) -> Result<T> {
    let json: Json = serde_json::from_str(text).map_err(|err| Error::document(FORMAT, err))?;
    from_value(&json, options)
}

/// Builds a `T` from a parsed document.
pub fn from_value<T: Typed>(json: &Json, options: &Options) -> Result<T> {
    ar_map::deserialize(&JsonNode::new(json), options)
}

/// Writes `value` as a JSON document.
pub fn to_value(value: &dyn Reflect, options: &Options) -> Result<Json> {
    let source = ObjectReader::new(value, options);
    let mut target = JsonWriter::new(source.node_type());
    NodeMapper::new(options, Mode::Serialize).map(&source, &mut target)?;
    Ok(target.into_json())
}

pub fn to_string(value: &dyn Reflect, options: &Options) -> Result<String> {
    let json = to_value(value, options)?;
    serde_json::to_string(&json).map_err(|err| Error::document(FORMAT, err))
}

pub fn to_string_pretty(value: &dyn Reflect, options: &Options) -> Result<String> {
    let json = to_value(value, options)?;
    serde_json::to_string_pretty(&json).map_err(|err| Error::document(FORMAT, err))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock};

    use ar_map::{Options, Unmatched};
    use ar_node::{Error, Metadata, Node, NodeType, Value};
    use ar_reflect::derive::Reflect;
    use serde_json::json;

    use super::{JsonNode, JsonWriter};

    #[derive(Reflect, Debug, Default, PartialEq)]
    #[reflect(default)]
    struct Inner {
        pub value2: String,
    }

    #[derive(Reflect, Debug, Default, PartialEq)]
    #[reflect(default)]
    struct Outer {
        pub value1: Inner,
    }

    #[test]
    fn names_match_case_insensitively_by_default() {
        let text = r#"{ "Value1": { "Value2": "hai" } }"#;
        let mut options = Options::default();
        let outer: Outer = super::from_str(text, &options).unwrap();
        assert_eq!(outer.value1.value2, "hai");

        options.case_sensitive = true;
        let err = super::from_str::<Outer>(text, &options).unwrap_err();
        assert!(matches!(&err, Error::UnrecognizedNode { name, .. } if name == "Value1"));
        assert_eq!(err.friendly_message(), "'Value1' is not a recognized field.");

        options.unmatched_elements = Unmatched::Ignore;
        assert_eq!(super::from_str::<Outer>(text, &options).unwrap(), Outer::default());
    }

    #[derive(Reflect, Debug, Default, PartialEq)]
    #[reflect(default)]
    struct Track {
        pub title: String,
        pub seconds: u32,
        pub rating: Option<f64>,
    }

    #[derive(Reflect, Debug, Default, PartialEq)]
    #[reflect(default)]
    struct Album {
        pub artist: String,
        pub tracks: Vec<Track>,
        pub live: bool,
    }

    #[test]
    fn documents_round_trip() {
        let options = Options::default();
        let album = Album {
            artist: "Low".into(),
            tracks: vec![
                Track {
                    title: "Words".into(),
                    seconds: 356,
                    rating: Some(4.5),
                },
                Track {
                    title: "Lazy".into(),
                    seconds: 290,
                    rating: None,
                },
            ],
            live: false,
        };

        let json = super::to_value(&album, &options).unwrap();
        assert_eq!(
            json,
            json!({
                "artist": "Low",
                "tracks": [
                    { "title": "Words", "seconds": 356, "rating": 4.5 },
                    { "title": "Lazy", "seconds": 290 }
                ],
                "live": false
            })
        );
        assert_eq!(super::from_value::<Album>(&json, &options).unwrap(), album);

        let pretty = super::to_string_pretty(&album, &options).unwrap();
        assert_eq!(super::from_str::<Album>(&pretty, &options).unwrap(), album);
    }

    #[test]
    fn malformed_documents() {
        let err = super::from_str::<Album>("{ \"artist\": ", &Options::default()).unwrap_err();
        assert!(matches!(err, Error::Document { format: "json", .. }));
        assert!(err.path().is_none());
    }

    #[test]
    fn shape_mismatches_name_both_sides() {
        let err = super::from_str::<Album>(r#"{ "tracks": { "title": "x" } }"#, &Options::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "/tracks: cannot map a json object node to a object array (`Vec<Track>`) node while deserializing"
        );
    }

    #[derive(Reflect)]
    struct Link {
        pub label: String,
        pub next: OnceLock<Arc<Link>>,
    }

    #[test]
    fn cycles_serialize_to_empty_objects() {
        let a = Arc::new(Link {
            label: "a".into(),
            next: OnceLock::new(),
        });
        let b = Arc::new(Link {
            label: "b".into(),
            next: OnceLock::from(Arc::clone(&a)),
        });
        assert!(a.next.set(Arc::clone(&b)).is_ok());

        let text = super::to_string(&*a, &Options::default()).unwrap();
        assert_eq!(text, r#"{"label":"a","next":{"label":"b","next":{}}}"#);
    }

    #[derive(Reflect, Debug, PartialEq)]
    #[reflect(constructor(new, id))]
    struct Account {
        #[reflect(read_only)]
        pub id: u64,
        pub owner: String,
    }

    impl Account {
        fn new(id: u64) -> Self {
            Self {
                id,
                owner: String::new(),
            }
        }
    }

    #[test]
    fn constructor_parameters_may_come_last() {
        let options = Options::default();
        let account: Account = super::from_str(r#"{ "owner": "kim", "id": 12 }"#, &options).unwrap();
        assert_eq!(
            account,
            Account {
                id: 12,
                owner: "kim".into()
            }
        );

        let err = super::from_str::<Account>(r#"{ "owner": "kim" }"#, &options).unwrap_err();
        assert!(matches!(err, Error::ObjectConstruction { .. }));
    }

    #[test]
    fn reader_paths_and_payloads() {
        let json = json!({ "a": [1, { "b": null }], "c": "x" });
        let root = JsonNode::new(&json);
        assert_eq!(root.node_type(), NodeType::Object);

        let children = root.children().unwrap();
        assert_eq!(children[0].name().unwrap(), "a");
        let items = children[0].children().unwrap();
        assert_eq!(items[0].value().unwrap(), Value::I64(1));
        assert!(items[0].name().is_err());

        let nested = items[1].children().unwrap();
        assert_eq!(nested[0].path().to_string(), "/a[1]/b");
        assert_eq!(nested[0].value().unwrap(), Value::Null);
        assert!(children[1].children().is_err());
    }

    #[test]
    fn variable_writers_settle_on_first_write() {
        let mut writer = JsonWriter::new(NodeType::Variable);
        writer
            .add(NodeType::Value, &Metadata::new(), &mut |item: &mut dyn Node| {
                item.set_value(Value::from("x"))
            })
            .unwrap();
        assert_eq!(writer.node_type(), NodeType::Array);
        assert!(
            writer
                .add_named("k", NodeType::Value, &Metadata::new(), &mut |_: &mut dyn Node| Ok(()))
                .is_err()
        );
        assert_eq!(writer.children().unwrap().len(), 1);
        assert_eq!(writer.into_json(), json!(["x"]));
    }
}
