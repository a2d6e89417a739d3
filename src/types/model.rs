use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::requester::Context;

/// The resource shapes the SDK knows how to build.
///
/// List endpoints tag their collections with a kind so that every item is
/// constructed the same way, with the kind's fillable set applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ModelKind {
    AdAccount,
    Campaign,
    AdGroup,
    Ad,
    Analytics,
}

impl ModelKind {
    /// Attribute names accepted from the raw response. Empty means every key
    /// is kept.
    pub fn fillable(self) -> &'static [&'static str] {
        match self {
            ModelKind::AdAccount
            | ModelKind::Campaign
            | ModelKind::AdGroup
            | ModelKind::Ad
            | ModelKind::Analytics => &[],
        }
    }

    /// Build a model of this kind from one decoded JSON value.
    pub fn build(self, context: Option<Context>, raw: Value) -> Result<Model, Error> {
        Model::with_fillable(context, self, raw, self.fillable())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::AdAccount => "ad_account",
            ModelKind::Campaign => "campaign",
            ModelKind::AdGroup => "ad_group",
            ModelKind::Ad => "ad",
            ModelKind::Analytics => "analytics",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single API resource held as a bag of JSON attributes.
///
/// Attribute access never fails: unknown or filtered-out keys simply read
/// as `None`. Nested objects and arrays are returned as raw JSON.
#[derive(Clone)]
pub struct Model {
    kind: ModelKind,
    attributes: Map<String, Value>,
    fillable: &'static [&'static str],
    context: Option<Context>,
}

impl Model {
    /// Build a model using the kind's own fillable set.
    pub fn new(context: Option<Context>, kind: ModelKind, raw: Value) -> Result<Self, Error> {
        kind.build(context, raw)
    }

    /// Build a model keeping only the keys in `fillable` (all keys if empty).
    ///
    /// `null` produces an empty model. Anything other than an object or
    /// `null` is rejected as a malformed response.
    pub fn with_fillable(
        context: Option<Context>,
        kind: ModelKind,
        raw: Value,
        fillable: &'static [&'static str],
    ) -> Result<Self, Error> {
        let mut model = Model {
            kind,
            attributes: Map::new(),
            fillable,
            context,
        };

        match raw {
            Value::Null => {}
            Value::Object(map) => {
                for (key, value) in map {
                    model.set(key, value);
                }
            }
            other => {
                return Err(Error::MalformedResponse(format!(
                    "expected a JSON object for {kind}, got {}",
                    json_type_name(&other)
                )));
            }
        }

        Ok(model)
    }

    /// Store an attribute, silently ignoring keys outside the fillable set.
    pub(crate) fn set(&mut self, key: String, value: Value) {
        if self.is_fillable(&key) {
            self.attributes.insert(key, value);
        }
    }

    fn is_fillable(&self, key: &str) -> bool {
        self.fillable.is_empty() || self.fillable.contains(&key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// The resource id. Pinterest ids are strings.
    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.attributes
    }

    /// The requester this model was fetched with, if any.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("kind", &self.kind)
            .field("attributes", &self.attributes)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.attributes == other.attributes
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
