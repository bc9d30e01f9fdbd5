use regex::Regex;
use serde_json::Value as JsonValue;

use super::{expect_str, ArgValidator};
use crate::error::ValidationError;

#[derive(Debug, Clone)]
pub struct LengthValidator {
    pub min: usize,
    pub max: usize,
}

impl ArgValidator for LengthValidator {
    fn validate(&self, value: &JsonValue) -> Result<(), ValidationError> {
        let s = expect_str(value)?;
        let len = s.chars().count();
        if len < self.min || len > self.max {
            return Err(ValidationError::new(
                s,
                format!("length must be between {} and {} (was {len})", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Requires the whole string to match `pattern`.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    anchored: Regex,
    description: String,
}

impl PatternValidator {
    pub fn new(pattern: &str, description: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            anchored: Regex::new(&format!("^(?:{pattern})$"))?,
            description: description.into(),
        })
    }
}

impl ArgValidator for PatternValidator {
    fn validate(&self, value: &JsonValue) -> Result<(), ValidationError> {
        let s = expect_str(value)?;
        if self.anchored.is_match(s) {
            Ok(())
        } else {
            Err(ValidationError::new(s, self.description.clone()))
        }
    }
}
