use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{BindError, CodecError};

/// Positional call arguments. An absent slot (or JSON `null`) is an omitted optional argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    values: Vec<Option<JsonValue>>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<JsonValue>) -> Self {
        self.values.push(Some(value.into()));
        self
    }

    pub fn absent(mut self) -> Self {
        self.values.push(None);
        self
    }

    pub fn maybe<V: Into<JsonValue>>(mut self, value: Option<V>) -> Self {
        self.values.push(value.map(Into::into));
        self
    }

    pub fn serialized<T: Serialize>(mut self, value: &T) -> Result<Self, BindError> {
        let v = serde_json::to_value(value).map_err(|e| CodecError::Encode(e.to_string()))?;
        self.values.push(Some(v));
        Ok(self)
    }

    pub fn get(&self, index: usize) -> Option<&JsonValue> {
        self.values
            .get(index)
            .and_then(Option::as_ref)
            .filter(|v| !v.is_null())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Into<JsonValue>> FromIterator<V> for CallArgs {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|v| Some(v.into())).collect(),
        }
    }
}
