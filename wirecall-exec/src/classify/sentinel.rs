use serde_json::Value as JsonValue;

/// A domain value an operation returns in place of an error for selected statuses,
/// e.g. a 404 on a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    Null,
    False,
    True,
    Void,
}

/// Result types that can stand in for a [`Sentinel`]. Types without a sensible
/// mapping keep the default, and the original protocol error propagates instead.
pub trait FromSentinel: Sized {
    fn from_sentinel(sentinel: Sentinel) -> Option<Self> {
        let _ = sentinel;
        None
    }
}

impl FromSentinel for () {
    fn from_sentinel(sentinel: Sentinel) -> Option<Self> {
        matches!(sentinel, Sentinel::Void | Sentinel::Null).then_some(())
    }
}

impl FromSentinel for bool {
    fn from_sentinel(sentinel: Sentinel) -> Option<Self> {
        match sentinel {
            Sentinel::True => Some(true),
            Sentinel::False => Some(false),
            Sentinel::Null | Sentinel::Void => None,
        }
    }
}

impl<T> FromSentinel for Option<T> {
    fn from_sentinel(sentinel: Sentinel) -> Option<Self> {
        match sentinel {
            Sentinel::Null | Sentinel::Void => Some(None),
            Sentinel::True | Sentinel::False => None,
        }
    }
}

impl FromSentinel for JsonValue {
    fn from_sentinel(sentinel: Sentinel) -> Option<Self> {
        Some(match sentinel {
            Sentinel::Null | Sentinel::Void => JsonValue::Null,
            Sentinel::True => JsonValue::Bool(true),
            Sentinel::False => JsonValue::Bool(false),
        })
    }
}

impl FromSentinel for String {}
impl<T> FromSentinel for Vec<T> {}
