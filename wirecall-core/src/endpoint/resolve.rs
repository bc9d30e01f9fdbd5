use url::Url;

use crate::error::EndpointError;

const SCOPE_TOKEN: &str = "{scope}";

/// Endpoint properties supplied at construction time.
///
/// `base` is the global endpoint. `scoped`, when configured, is a URL template containing
/// `{scope}` (for example `https://ec2.{scope}.amazonaws.com/`) used when an operation receives an
/// endpoint-override argument such as a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    scoped: Option<String>,
}

impl Endpoint {
    pub fn new(base: Url) -> Self {
        Self { base, scoped: None }
    }

    pub fn parse(base: &str) -> Result<Self, EndpointError> {
        Ok(Self::new(parse_url(base)?))
    }

    pub fn with_scoped_template(mut self, template: impl Into<String>) -> Self {
        self.scoped = Some(template.into());
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn scoped_template(&self) -> Option<&str> {
        self.scoped.as_deref()
    }

    /// Picks the target host for one invocation.
    ///
    /// - no override: the global endpoint.
    /// - an absolute URL (`scheme://...`): used verbatim.
    /// - anything else: substituted into the scoped template.
    pub fn resolve(&self, override_value: Option<&str>) -> Result<Url, EndpointError> {
        let Some(v) = override_value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(self.base.clone());
        };
        if v.contains("://") {
            return parse_url(v);
        }
        let template = self
            .scoped
            .as_deref()
            .ok_or(EndpointError::NoScopedTemplate)?;
        parse_url(&template.replace(SCOPE_TOKEN, v))
    }
}

fn parse_url(s: &str) -> Result<Url, EndpointError> {
    Url::parse(s).map_err(|e| EndpointError::InvalidUrl {
        url: s.to_string(),
        message: e.to_string(),
    })
}
