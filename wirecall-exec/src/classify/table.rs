use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use wirecall_core::http::LOCATION;
use wirecall_core::Response;

use crate::classify::Sentinel;

/// Broad status family a handler is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
}

impl StatusClass {
    /// Anything outside 2xx-4xx is treated as a server error.
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Success,
    Redirect,
    Retryable,
    Terminal,
    Sentinel(Sentinel),
}

pub type StatusHandler = Arc<dyn Fn(&Response) -> Disposition + Send + Sync>;

/// Maps a response to a [`Disposition`]: per-status overrides first, then the handler
/// registered for the status class. 2xx is always success unless overridden.
#[derive(Clone)]
pub struct ClassifierTable {
    overrides: BTreeMap<u16, Disposition>,
    handlers: BTreeMap<StatusClass, StatusHandler>,
}

impl Default for ClassifierTable {
    fn default() -> Self {
        let mut handlers: BTreeMap<StatusClass, StatusHandler> = BTreeMap::new();
        handlers.insert(StatusClass::Redirect, Arc::new(redirect_with_location));
        handlers.insert(StatusClass::ClientError, retry_on(&[408, 429]));
        handlers.insert(StatusClass::ServerError, retry_on(&[502, 503, 504]));
        Self {
            overrides: BTreeMap::new(),
            handlers,
        }
    }
}

impl ClassifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_status(mut self, status: u16, disposition: Disposition) -> Self {
        self.overrides.insert(status, disposition);
        self
    }

    pub fn on_class(mut self, class: StatusClass, handler: StatusHandler) -> Self {
        self.handlers.insert(class, handler);
        self
    }

    pub fn not_found_as(self, sentinel: Sentinel) -> Self {
        self.on_status(404, Disposition::Sentinel(sentinel))
    }

    pub fn classify(&self, response: &Response) -> Disposition {
        if let Some(d) = self.overrides.get(&response.status) {
            return *d;
        }
        match StatusClass::of(response.status) {
            StatusClass::Success => Disposition::Success,
            class => self
                .handlers
                .get(&class)
                .map(|h| h(response))
                .unwrap_or(Disposition::Terminal),
        }
    }
}

impl fmt::Debug for ClassifierTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierTable")
            .field("overrides", &self.overrides)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 3xx without a `Location` has nowhere to go.
pub fn redirect_with_location(response: &Response) -> Disposition {
    if response.header(LOCATION).is_some() {
        Disposition::Redirect
    } else {
        Disposition::Terminal
    }
}

pub fn retry_on(statuses: &[u16]) -> StatusHandler {
    let statuses = statuses.to_vec();
    Arc::new(move |r: &Response| {
        if statuses.contains(&r.status) {
            Disposition::Retryable
        } else {
            Disposition::Terminal
        }
    })
}
