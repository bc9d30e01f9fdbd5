use std::collections::BTreeSet;

use crate::bind::{Binding, BindingRole};
use crate::endpoint::PathTemplate;
use crate::error::ShapeError;
use crate::http::Method;

/// The wire-facing half of an operation declaration: verb, path template, ordered bindings and
/// static parameters. Built once, validated once, then shared read-only.
#[derive(Debug, Clone)]
pub struct RequestShape {
    method: Method,
    path: PathTemplate,
    bindings: Vec<Binding>,
    static_query: Vec<(String, String)>,
    static_form: Vec<(String, String)>,
    static_headers: Vec<(String, String)>,
    payload_root: Option<String>,
    skip_encoding: Vec<char>,
}

impl RequestShape {
    pub fn builder(method: Method, path: impl Into<String>) -> RequestShapeBuilder {
        RequestShapeBuilder {
            method,
            path: path.into(),
            bindings: Vec::new(),
            static_query: Vec::new(),
            static_form: Vec::new(),
            static_headers: Vec::new(),
            payload_root: None,
            skip_encoding: Vec::new(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &PathTemplate {
        &self.path
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn static_query(&self) -> &[(String, String)] {
        &self.static_query
    }

    pub fn static_form(&self) -> &[(String, String)] {
        &self.static_form
    }

    pub fn static_headers(&self) -> &[(String, String)] {
        &self.static_headers
    }

    pub fn payload_root(&self) -> Option<&str> {
        self.payload_root.as_deref()
    }

    pub fn skip_encoding(&self) -> &[char] {
        &self.skip_encoding
    }

    /// Number of positional arguments the operation accepts.
    pub fn arity(&self) -> usize {
        self.bindings.iter().map(|b| b.index + 1).max().unwrap_or(0)
    }

    pub fn has_form(&self) -> bool {
        !self.static_form.is_empty() || self.bindings.iter().any(|b| b.role == BindingRole::Form)
    }
}

pub struct RequestShapeBuilder {
    method: Method,
    path: String,
    bindings: Vec<Binding>,
    static_query: Vec<(String, String)>,
    static_form: Vec<(String, String)>,
    static_headers: Vec<(String, String)>,
    payload_root: Option<String>,
    skip_encoding: Vec<char>,
}

impl RequestShapeBuilder {
    pub fn bind(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_query.push((key.into(), value.into()));
        self
    }

    pub fn form_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_form.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_headers.push((name.into(), value.into()));
        self
    }

    /// Wraps payload fields as `{"<root>": {...fields}}`.
    pub fn payload_root(mut self, root: impl Into<String>) -> Self {
        self.payload_root = Some(root.into());
        self
    }

    /// Characters kept literal when substituting path values.
    pub fn skip_encoding(mut self, chars: &[char]) -> Self {
        self.skip_encoding.extend_from_slice(chars);
        self
    }

    pub fn build(self) -> Result<RequestShape, ShapeError> {
        let path = PathTemplate::parse(&self.path)?;

        for b in &self.bindings {
            if b.role.requires_key() && b.key.as_deref().map_or(true, str::is_empty) {
                return Err(ShapeError::MissingKey {
                    index: b.index,
                    role: b.role,
                });
            }
        }

        let tokens: BTreeSet<&str> = path.tokens().collect();
        let path_keys: BTreeSet<&str> = self
            .bindings
            .iter()
            .filter(|b| b.role == BindingRole::Path)
            .map(Binding::key_str)
            .collect();
        if let Some(t) = tokens.iter().find(|t| !path_keys.contains(*t)) {
            return Err(ShapeError::UnboundPathToken(t.to_string()));
        }
        if let Some(k) = path_keys.iter().find(|k| !tokens.contains(*k)) {
            return Err(ShapeError::UnknownPathToken(k.to_string()));
        }

        let overrides = self
            .bindings
            .iter()
            .filter(|b| b.role == BindingRole::EndpointOverride)
            .count();
        if overrides > 1 {
            return Err(ShapeError::MultipleEndpointOverrides);
        }

        let has_form = !self.static_form.is_empty()
            || self.bindings.iter().any(|b| b.role == BindingRole::Form);
        let has_structured = self
            .bindings
            .iter()
            .any(|b| matches!(b.role, BindingRole::Payload | BindingRole::PayloadField));
        if has_form && has_structured {
            return Err(ShapeError::ConflictingPayload);
        }

        Ok(RequestShape {
            method: self.method,
            path,
            bindings: self.bindings,
            static_query: self.static_query,
            static_form: self.static_form,
            static_headers: self.static_headers,
            payload_root: self.payload_root,
            skip_encoding: self.skip_encoding,
        })
    }
}
