//! JSON form of expression trees.
//!
//! - `["assign", "x", 1]` - list; bare strings are symbols
//! - `{"vector": [...]}` - vector
//! - `{"str": "text"}` - string literal
//! - numbers, booleans, `null` (nil) - themselves
//! - `{"node": <node>, "meta": {...}}` - node with metadata
//!
//! Metadata is the serde form of [`Meta`]: keys `tag`, `assignment`,
//! `defines`, `first_appearance` and `numeric_value` (itself a node in this
//! format). Unknown keys are rejected.

use crate::meta::Meta;
use crate::tree::{Atom, Node, NodeKind, Shape};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Error converting between JSON and trees.
#[derive(Debug, thiserror::Error)]
pub enum SExprError {
    #[error("invalid s-expression: {0}")]
    Invalid(String),

    #[error("invalid metadata: {0}")]
    Meta(#[source] serde_json::Error),

    #[error("float {0} has no JSON representation")]
    NonFinite(f64),
}

pub fn to_json(node: &Node) -> Result<Value, SExprError> {
    let value = match &node.kind {
        NodeKind::Atom(atom) => match atom {
            Atom::Symbol(name) => Value::String(name.clone()),
            Atom::Int(n) => Value::from(*n),
            Atom::Float(x) => serde_json::Number::from_f64(*x)
                .map(Value::Number)
                .ok_or(SExprError::NonFinite(*x))?,
            Atom::Str(s) => single("str", Value::String(s.clone())),
            Atom::Bool(b) => Value::Bool(*b),
            Atom::Nil => Value::Null,
        },
        NodeKind::Compound(shape, children) => {
            let items = children.iter().map(to_json).collect::<Result<Vec<_>, _>>()?;
            match shape {
                Shape::List => Value::Array(items),
                Shape::Vector => single("vector", Value::Array(items)),
            }
        }
    };

    if node.meta.is_empty() {
        return Ok(value);
    }
    let mut annotated = Map::new();
    annotated.insert("node".into(), value);
    annotated.insert(
        "meta".into(),
        serde_json::to_value(&node.meta).map_err(SExprError::Meta)?,
    );
    Ok(Value::Object(annotated))
}

pub fn from_json(value: &Value) -> Result<Node, SExprError> {
    match value {
        Value::Null => Ok(Node::nil()),
        Value::Bool(b) => Ok(Node::bool(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Node::int(i)),
            (None, Some(x)) => Ok(Node::float(x)),
            (None, None) => Err(SExprError::Invalid(format!("unsupported number {n}"))),
        },
        Value::String(name) => Ok(Node::symbol(name.as_str())),
        Value::Array(items) => Ok(Node::list(from_json_items(items)?)),
        Value::Object(object) => from_json_object(object),
    }
}

fn from_json_items(items: &[Value]) -> Result<Vec<Node>, SExprError> {
    items.iter().map(from_json).collect()
}

fn from_json_object(object: &Map<String, Value>) -> Result<Node, SExprError> {
    if let (Some(node), Some(meta)) = (object.get("node"), object.get("meta")) {
        if object.len() == 2 {
            let node = from_json(node)?;
            let meta = Meta::deserialize(meta).map_err(SExprError::Meta)?;
            return Ok(node.with_meta(meta));
        }
    }
    match object.iter().next() {
        Some((key, Value::Array(items))) if object.len() == 1 && key == "vector" => {
            Ok(Node::vector(from_json_items(items)?))
        }
        Some((key, Value::String(s))) if object.len() == 1 && key == "str" => Ok(Node::string(s.as_str())),
        _ => Err(SExprError::Invalid(Value::Object(object.clone()).to_string())),
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.into(), value);
    Value::Object(map)
}

/// Serde adapter for [`Meta::numeric_value`], which holds a node in the
/// JSON form above.
pub(crate) mod numeric_value {
    use super::{from_json, to_json};
    use crate::tree::Node;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
    use serde_json::Value;

    pub fn serialize<S>(value: &Option<Box<Node>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value
            .as_deref()
            .map(to_json)
            .transpose()
            .map_err(<S::Error as ser::Error>::custom)?
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Box<Node>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        from_json(&value)
            .map(|node| Some(Box::new(node)))
            .map_err(<D::Error as de::Error>::custom)
    }
}
