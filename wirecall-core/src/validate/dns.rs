use serde_json::Value as JsonValue;

use super::{expect_str, ArgValidator};
use crate::error::ValidationError;

/// Lower-case DNS label rules: `[a-z0-9-]`, starting with a letter or digit, bounded length.
#[derive(Debug, Clone)]
pub struct DnsNameValidator {
    pub min: usize,
    pub max: usize,
}

impl DnsNameValidator {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    fn check(&self, name: &str, allow_period: bool) -> Result<(), String> {
        let len = name.len();
        if len < self.min || len > self.max {
            return Err(format!(
                "Can be {} to {} characters long (was {len})",
                self.min, self.max
            ));
        }
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
            _ => return Err("Should start with a lower-case letter or a number".to_string()),
        }
        let acceptable =
            |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || (allow_period && c == '.');
        if let Some(bad) = name.chars().find(|c| !acceptable(*c)) {
            return Err(format!(
                "Should have lowercase ASCII letters, numbers, or dashes (found '{bad}')"
            ));
        }
        Ok(())
    }
}

impl ArgValidator for DnsNameValidator {
    fn validate(&self, value: &JsonValue) -> Result<(), ValidationError> {
        let s = expect_str(value)?;
        self.check(s, false).map_err(|r| ValidationError::new(s, r))
    }
}

/// DNS rules with periods allowed, as required for virtual-host addressed bucket names.
#[derive(Debug, Clone)]
pub struct BucketNameValidator {
    dns: DnsNameValidator,
}

impl Default for BucketNameValidator {
    fn default() -> Self {
        Self {
            dns: DnsNameValidator::new(3, 63),
        }
    }
}

impl ArgValidator for BucketNameValidator {
    fn validate(&self, value: &JsonValue) -> Result<(), ValidationError> {
        let s = expect_str(value)?;
        let fail = |reason: &str| {
            Err(ValidationError::new(
                s,
                format!("doesn't match bucket virtual host naming convention: {reason}"),
            ))
        };
        if let Err(r) = self.dns.check(s, true) {
            return fail(&r);
        }
        if s.contains("..") {
            return fail("Bucket names cannot contain two, adjacent periods");
        }
        if s.ends_with('-') {
            return fail("Bucket names should not end with a dash");
        }
        if s.contains("-.") || s.contains(".-") {
            return fail("Bucket names cannot contain dashes next to periods");
        }
        Ok(())
    }
}
