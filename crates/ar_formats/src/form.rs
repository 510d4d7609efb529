//! `application/x-www-form-urlencoded` bodies as node trees.
//!
//! Keys are paths: `customer.name` addresses a member of a member and
//! `items[1].sku` a member of the second item. Every node is a Variable
//! node, so one key tree maps onto objects, lists and scalars alike.
//!
//! ```
//! use ar_map::Options;
//! use ar_reflect::derive::Reflect;
//!
//! #[derive(Reflect, Default)]
//! #[reflect(default)]
//! struct Search {
//!     query: String,
//!     pages: Vec<u8>,
//! }
//!
//! let options = Options::default();
//! let search: Search = ar_formats::form::from_str("query=red+fox&pages[0]=1&pages[1]=2", &options).unwrap();
//! assert_eq!(search.query, "red fox");
//! assert_eq!(search.pages, [1, 2]);
//!
//! let body = ar_formats::form::to_string(&search, &options).unwrap();
//! assert_eq!(body, "query=red+fox&pages%5B0%5D=1&pages%5B1%5D=2");
//! ```

use ar_map::Options;
use ar_node::{Configure, Error, Metadata, Node, NodePath, NodeType, Result, Value};
use ar_reflect::{Reflect, Typed};
use url::form_urlencoded;

pub(crate) const FORMAT: &str = "form";

// -----------------------------------------------------------------------------
// Keys

/// One step of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    text: String,
    /// Set for numeric bracket segments such as `[3]`.
    index: Option<usize>,
}

impl Segment {
    fn name(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            index: None,
        }
    }

    fn bracket(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            index: text.parse().ok(),
        }
    }
}

/// Splits `a.b[0][1].c` into its segments.
fn segments(key: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    for part in key.split('.') {
        let (head, mut rest) = match part.find('[') {
            Some(at) => part.split_at(at),
            None => (part, ""),
        };
        if !head.is_empty() {
            out.push(Segment::name(head));
        }
        while let Some(open) = rest.strip_prefix('[') {
            let Some(close) = open.find(']') else {
                out.push(Segment::name(rest));
                break;
            };
            out.push(Segment::bracket(&open[..close]));
            rest = &open[close + 1..];
        }
    }
    out
}

// -----------------------------------------------------------------------------
// FormTree

/// Parsed pairs, grouped by key path in order of first appearance.
#[derive(Debug, Default, Clone)]
pub struct FormTree {
    value: Option<String>,
    children: Vec<(Segment, FormTree)>,
}

impl FormTree {
    pub fn parse(body: &str) -> Self {
        let body = body.strip_prefix('?').unwrap_or(body);
        let mut tree = FormTree::default();
        for (key, value) in form_urlencoded::parse(body.as_bytes()) {
            let path = segments(&key);
            if path.is_empty() {
                log::debug!("form: dropping value without a key");
                continue;
            }
            tree.insert(&path, value.into_owned());
        }
        tree
    }

    fn insert(&mut self, path: &[Segment], value: String) {
        let Some((first, rest)) = path.split_first() else {
            if self.value.replace(value).is_some() {
                log::debug!("form: repeated key, keeping the last value");
            }
            return;
        };
        let position = match self.children.iter().position(|(segment, _)| segment == first) {
            Some(position) => position,
            None => {
                self.children.push((first.clone(), FormTree::default()));
                self.children.len() - 1
            }
        };
        self.children[position].1.insert(rest, value);
    }
}

// -----------------------------------------------------------------------------
// FormNode

/// A read-only Variable node over a [`FormTree`].
#[derive(Debug, Clone)]
pub struct FormNode<'a> {
    tree: &'a FormTree,
    path: NodePath,
    name: Option<&'a str>,
    metadata: Metadata,
}

impl<'a> FormNode<'a> {
    pub fn new(tree: &'a FormTree) -> Self {
        Self {
            tree,
            path: NodePath::root(),
            name: None,
            metadata: Metadata::new(),
        }
    }
}

impl Node for FormNode<'_> {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn node_type(&self) -> NodeType {
        NodeType::Variable
    }

    fn path(&self) -> &NodePath {
        &self.path
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn name(&self) -> Result<&str> {
        self.name
            .ok_or_else(|| Error::naming_not_supported(&self.path, FORMAT, NodeType::Variable))
    }

    fn set_name(&mut self, _: &str) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    /// The text stored at this key; null for keys that only prefix others.
    fn value(&self) -> Result<Value> {
        Ok(match &self.tree.value {
            Some(text) => Value::String(text.clone()),
            None => Value::Null,
        })
    }

    fn set_value(&mut self, _: Value) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    /// Rows under numeric brackets come back sorted by index; named keys keep
    /// the order they first appeared in.
    fn children(&self) -> Result<Vec<Box<dyn Node + '_>>> {
        let mut rows: Vec<_> = self.tree.children.iter().collect();
        if rows.iter().all(|(segment, _)| segment.index.is_some()) {
            rows.sort_by_key(|(segment, _)| segment.index);
        }
        Ok(rows
            .into_iter()
            .map(|(segment, tree)| {
                let path = match segment.index {
                    Some(index) => self.path.index(index),
                    None => self.path.child(&segment.text),
                };
                Box::new(FormNode {
                    tree,
                    path,
                    name: Some(segment.text.as_str()),
                    metadata: Metadata::new(),
                }) as Box<dyn Node + '_>
            })
            .collect())
    }

    fn add(&mut self, _: NodeType, _: &Metadata, _: Configure<'_>) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }

    fn add_named(&mut self, _: &str, _: NodeType, _: &Metadata, _: Configure<'_>) -> Result<()> {
        Err(Error::read_only(&self.path, FORMAT))
    }
}

// -----------------------------------------------------------------------------
// FormWriter

/// A Variable node collecting key/value pairs.
///
/// Null values are left out of the body.
#[derive(Debug, Default)]
pub struct FormWriter {
    key: String,
    path: NodePath,
    name: Option<String>,
    metadata: Metadata,
    value: Option<Value>,
    items: usize,
    pairs: Vec<(String, String)>,
}

impl FormWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pairs written so far, in order.
    #[inline]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Encodes the pairs as a form body.
    pub fn finish(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish()
    }

    fn insert(
        &mut self,
        key: String,
        path: NodePath,
        name: Option<&str>,
        metadata: &Metadata,
        configure: Configure<'_>,
    ) -> Result<()> {
        let mut child = FormWriter {
            key,
            path,
            name: name.map(str::to_owned),
            metadata: metadata.clone(),
            ..FormWriter::default()
        };
        configure(&mut child)?;
        self.pairs.append(&mut child.pairs);
        Ok(())
    }
}

impl Node for FormWriter {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn node_type(&self) -> NodeType {
        NodeType::Variable
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
            .ok_or_else(|| Error::naming_not_supported(&self.path, FORMAT, NodeType::Variable))
    }

    fn value(&self) -> Result<Value> {
        Ok(self.value.clone().unwrap_or(Value::Null))
    }

    fn set_value(&mut self, value: Value) -> Result<()> {
        if !value.is_null() {
            self.pairs.push((self.key.clone(), value.to_text().into_owned()));
        }
        self.value = Some(value);
        Ok(())
    }

    fn children(&self) -> Result<Vec<Box<dyn Node + '_>>> {
        Ok(Vec::new())
    }

    fn add(&mut self, _: NodeType, metadata: &Metadata, configure: Configure<'_>) -> Result<()> {
        let index = self.items;
        self.items += 1;
        let key = format!("{}[{index}]", self.key);
        let path = self.path.index(index);
        self.insert(key, path, None, metadata, configure)
    }

    fn add_named(
        &mut self,
        name: &str,
        _: NodeType,
        metadata: &Metadata,
        configure: Configure<'_>,
    ) -> Result<()> {
        let key = if self.key.is_empty() {
            name.to_owned()
        } else {
            format!("{}.{name}", self.key)
        };
        let path = self.path.child(name);
        self.insert(key, path, Some(name), metadata, configure)
    }
}

// -----------------------------------------------------------------------------
// Facades

/// Parses a form body and builds a `T` from it.
pub fn from_str<T: Typed>(body: &str, options: &Options) -> Result<T> {
    let tree = FormTree::parse(body);
    ar_map::deserialize(&FormNode::new(&tree), options)
}

/// Writes `value` as a form body.
pub fn to_string(value: &dyn Reflect, options: &Options) -> Result<String> {
    let mut target = FormWriter::new();
    ar_map::serialize(value, &mut target, options)?;
    Ok(target.finish())
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use ar_map::Options;
    use ar_node::{Error, Node, NodeType};
    use ar_reflect::derive::Reflect;

    use super::{FormNode, FormTree, Segment, segments};

    #[test]
    fn keys_split_into_segments() {
        let texts: Vec<_> = segments("a.b[2][x].c").into_iter().map(|s| s.text).collect();
        assert_eq!(texts, ["a", "b", "2", "x", "c"]);
        assert_eq!(segments("rows[10]")[1], Segment::bracket("10"));
        assert_eq!(segments("rows[10]")[1].index, Some(10));
        assert_eq!(segments("odd[1").len(), 2);
    }

    #[test]
    fn trees_keep_first_appearance_order() {
        let tree = FormTree::parse("?b=1&a.x=2&b=3&a.y=4");
        let root = FormNode::new(&tree);
        assert_eq!(root.node_type(), NodeType::Variable);
        assert!(root.name().is_err());

        let children = root.children().unwrap();
        assert_eq!(children[0].name().unwrap(), "b");
        assert_eq!(children[0].value().unwrap().to_text(), "3");
        let nested = children[1].children().unwrap();
        assert_eq!(nested[1].path().to_string(), "/a/y");
        assert!(children[1].value().unwrap().is_null());
    }

    #[derive(Reflect, Debug, Default, PartialEq)]
    #[reflect(default)]
    struct Item {
        pub name: String,
        pub qty: u32,
    }

    #[derive(Reflect, Debug, Default, PartialEq)]
    #[reflect(default)]
    struct Basket {
        pub owner: Option<String>,
        pub items: Vec<Item>,
    }

    #[test]
    fn indexed_rows_become_list_items() {
        let options = Options::default();
        let basket: Basket =
            super::from_str("items[0].name=pear&items[1].name=fig&items[1].qty=3&items[0].qty=2", &options).unwrap();
        assert_eq!(
            basket.items,
            [
                Item {
                    name: "pear".into(),
                    qty: 2
                },
                Item {
                    name: "fig".into(),
                    qty: 3
                }
            ]
        );
        assert_eq!(basket.owner, None);
    }

    #[test]
    fn rows_follow_their_index() {
        let options = Options::default();
        let basket: Basket = super::from_str("items[1].name=fig&items[0].name=pear", &options).unwrap();
        let names: Vec<_> = basket.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["pear", "fig"]);

        let tree = FormTree::parse("b=1&a=2");
        let root = FormNode::new(&tree);
        let keys: Vec<_> = root
            .children()
            .unwrap()
            .iter()
            .map(|child| child.name().unwrap().to_owned())
            .collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[derive(Reflect, Debug, Default, PartialEq)]
    #[reflect(default)]
    struct Signup {
        pub name: String,
        pub age: Option<u32>,
    }

    #[test]
    fn blank_fields_become_none() {
        let options = Options::default();
        let signup: Signup = super::from_str("name=ann&age=", &options).unwrap();
        assert_eq!(
            signup,
            Signup {
                name: "ann".into(),
                age: None
            }
        );
        assert_eq!(super::from_str::<Signup>("age=41", &options).unwrap().age, Some(41));
    }

    #[test]
    fn bodies_round_trip() {
        let options = Options::default();
        let basket = Basket {
            owner: Some("Jo Doe".into()),
            items: vec![Item {
                name: "tea & milk".into(),
                qty: 1,
            }],
        };
        let body = super::to_string(&basket, &options).unwrap();
        assert_eq!(body, "owner=Jo+Doe&items%5B0%5D.name=tea+%26+milk&items%5B0%5D.qty=1");
        assert_eq!(super::from_str::<Basket>(&body, &options).unwrap(), basket);
    }

    #[test]
    fn bad_numbers_are_parse_errors() {
        let err = super::from_str::<Basket>("items[0].qty=two", &Options::default()).unwrap_err();
        assert!(matches!(err, Error::ValueParse { .. }));
        assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("/items[0]/qty"));
    }
}
