use std::collections::BTreeMap;

use crate::error::{BindError, TemplateError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Token(String),
}

/// A path such as `/servers/{id}/ips/public/{address}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(input: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut buf = String::new();
        let mut chars = input.char_indices();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' => {
                    let mut token = String::new();
                    let mut found = false;
                    for (_, n) in chars.by_ref() {
                        if n == '}' {
                            found = true;
                            break;
                        }
                        token.push(n);
                    }
                    if !found {
                        return Err(TemplateError::UnclosedToken);
                    }
                    let token = token.trim();
                    if token.is_empty() {
                        return Err(TemplateError::EmptyToken);
                    }
                    if !buf.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut buf)));
                    }
                    segments.push(Segment::Token(token.to_string()));
                }
                '}' => return Err(TemplateError::UnexpectedClose(pos)),
                _ => buf.push(ch),
            }
        }

        if !buf.is_empty() {
            segments.push(Segment::Literal(buf));
        }

        Ok(Self {
            raw: input.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Token(t) => Some(t.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes already-encoded values; any token left without a value is an error.
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<String, BindError> {
        let mut out = String::with_capacity(self.raw.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(l) => out.push_str(l),
                Segment::Token(t) => {
                    let v = values.get(t).ok_or_else(|| BindError::UnresolvedToken {
                        token: t.clone(),
                        template: self.raw.clone(),
                    })?;
                    out.push_str(v);
                }
            }
        }
        Ok(out)
    }
}

/// Percent-encodes a path value, leaving the characters in `skip` literal.
pub(crate) fn encode_path_value(value: &str, skip: &[char]) -> String {
    if skip.is_empty() {
        return urlencoding::encode(value).into_owned();
    }
    let mut out = String::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for ch in value.chars() {
        if skip.contains(&ch) {
            out.push(ch);
        } else {
            out.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    out
}
