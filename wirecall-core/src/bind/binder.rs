use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use url::Url;

use crate::bind::{BindingRole, CallArgs, RequestShape};
use crate::codec::{PayloadCodec, FORM_URLENCODED};
use crate::endpoint::template::encode_path_value;
use crate::endpoint::Endpoint;
use crate::error::BindError;
use crate::http::{Payload, Request};

/// Turns a [`RequestShape`] plus call arguments into a [`Request`].
///
/// Binding is a pure function of its inputs: no clocks, no randomness, no shared mutable state.
#[derive(Clone)]
pub struct Binder {
    endpoint: Endpoint,
    codec: Arc<dyn PayloadCodec>,
}

impl Binder {
    pub fn new(endpoint: Endpoint, codec: Arc<dyn PayloadCodec>) -> Self {
        Self { endpoint, codec }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn bind(&self, shape: &RequestShape, args: &CallArgs) -> Result<Request, BindError> {
        if args.len() > shape.arity() {
            return Err(BindError::TooManyArguments {
                expected: shape.arity(),
                got: args.len(),
            });
        }

        for b in shape.bindings() {
            if let Some(v) = args.get(b.index) {
                for validator in &b.validators {
                    validator
                        .validate(v)
                        .map_err(|source| BindError::Validation { index: b.index, source })?;
                }
            }
        }

        // The host is settled first; everything else is relative to it.
        let override_value = shape
            .bindings()
            .iter()
            .find(|b| b.role == BindingRole::EndpointOverride)
            .and_then(|b| args.get(b.index).map(|v| (b.index, v)))
            .map(|(index, v)| scalar(v, index, BindingRole::EndpointOverride))
            .transpose()?;
        let base = self.endpoint.resolve(override_value.as_deref())?;

        let mut path_values = BTreeMap::<String, String>::new();
        let mut query = shape.static_query().to_vec();
        let mut matrix = Vec::<(String, String)>::new();
        let mut form = shape.static_form().to_vec();
        let mut headers = shape.static_headers().to_vec();
        let mut whole_payload: Option<&JsonValue> = None;
        let mut fields = serde_json::Map::new();

        for b in shape.bindings() {
            let Some(v) = args.get(b.index) else {
                continue;
            };
            let key = b.key_str();
            match b.role {
                BindingRole::Path => {
                    let s = scalar(v, b.index, b.role)?;
                    path_values.insert(key.to_string(), encode_path_value(&s, shape.skip_encoding()));
                }
                BindingRole::Query => push_pairs(&mut query, key, v, b.index, b.role)?,
                BindingRole::Matrix => push_pairs(&mut matrix, key, v, b.index, b.role)?,
                BindingRole::Form => push_pairs(&mut form, key, v, b.index, b.role)?,
                BindingRole::Header => push_pairs(&mut headers, key, v, b.index, b.role)?,
                BindingRole::Payload => whole_payload = Some(v),
                BindingRole::PayloadField => {
                    fields.insert(key.to_string(), v.clone());
                }
                BindingRole::EndpointOverride => {}
            }
        }

        let mut path = shape.path().render(&path_values)?;
        for (k, v) in &matrix {
            path.push(';');
            path.push_str(&urlencoding::encode(k));
            path.push('=');
            path.push_str(&urlencoding::encode(v));
        }

        let uri = build_uri(&base, &path, &query);
        let mut request = Request::new(shape.method(), uri);
        for (k, v) in headers {
            request.headers_mut().append(k, v);
        }

        if shape.has_form() {
            let body = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(form.iter())
                .finish();
            request.set_payload(Payload::new(body.into_bytes(), FORM_URLENCODED));
        } else if let Some(v) = whole_payload {
            request.set_payload(self.codec.encode(v)?);
        } else if !fields.is_empty() {
            let value = match shape.payload_root() {
                Some(root) => {
                    let mut wrapped = serde_json::Map::new();
                    wrapped.insert(root.to_string(), JsonValue::Object(fields));
                    JsonValue::Object(wrapped)
                }
                None => JsonValue::Object(fields),
            };
            request.set_payload(self.codec.encode(&value)?);
        }

        Ok(request)
    }
}

fn build_uri(base: &Url, path: &str, query: &[(String, String)]) -> Url {
    let mut url = base.clone();
    if !path.is_empty() {
        let joined = format!("{}{}", base.path().trim_end_matches('/'), path);
        url.set_path(&joined);
    }
    if !query.is_empty() {
        let mut qp = url.query_pairs_mut();
        for (k, v) in query {
            qp.append_pair(k, v);
        }
    }
    url
}

/// Arrays fan out into one pair per element; everything else is a single pair.
fn push_pairs(
    out: &mut Vec<(String, String)>,
    key: &str,
    v: &JsonValue,
    index: usize,
    role: BindingRole,
) -> Result<(), BindError> {
    match v {
        JsonValue::Array(items) => {
            for item in items.iter().filter(|i| !i.is_null()) {
                out.push((key.to_string(), scalar(item, index, role)?));
            }
        }
        other => out.push((key.to_string(), scalar(other, index, role)?)),
    }
    Ok(())
}

fn scalar(v: &JsonValue, index: usize, role: BindingRole) -> Result<String, BindError> {
    match v {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        JsonValue::Null => Ok(String::new()),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(BindError::UnsupportedValue { index, role }),
    }
}
