//! Placeholder-based query text builder.
//!
//! Templates reference values as `:name`. Each bound value is validated when it is
//! created and rendered as a quoted literal; rendering fails if a placeholder has no
//! binding or a binding is never used.

use crate::error::ApiError;
use std::collections::{BTreeMap, BTreeSet};

/// A value that is safe to place inside a quoted literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    /// Rendered as `'a','b'` for use inside `IN (...)`
    TextList(Vec<String>),
}

impl QueryValue {
    pub fn text(name: &str, value: impl Into<String>) -> Result<Self, ApiError> {
        let value = value.into();
        check_literal(name, &value)?;
        Ok(QueryValue::Text(value))
    }

    pub fn text_list<S: AsRef<str>>(name: &str, values: &[S]) -> Result<Self, ApiError> {
        if values.is_empty() {
            return Err(ApiError::InvalidQueryValue {
                name: name.to_string(),
                reason: "list is empty".to_string(),
            });
        }
        let values = values
            .iter()
            .map(|v| {
                check_literal(name, v.as_ref())?;
                Ok(v.as_ref().to_string())
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        Ok(QueryValue::TextList(values))
    }

    fn render_into(&self, out: &mut String) {
        match self {
            QueryValue::Text(value) => push_quoted(out, value),
            QueryValue::TextList(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    push_quoted(out, value);
                }
            }
        }
    }
}

fn push_quoted(out: &mut String, value: &str) {
    out.push('\'');
    out.push_str(value);
    out.push('\'');
}

fn check_literal(name: &str, value: &str) -> Result<(), ApiError> {
    let reason = if value.is_empty() {
        Some("value is empty")
    } else if value.contains('\'') || value.contains('\\') {
        Some("value contains a quote or backslash")
    } else if value.chars().any(char::is_control) {
        Some("value contains a control character")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ApiError::InvalidQueryValue {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    template: String,
    bindings: BTreeMap<String, QueryValue>,
}

impl Query {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            bindings: BTreeMap::new(),
        }
    }

    pub fn bind(mut self, name: &str, value: QueryValue) -> Self {
        self.bindings.insert(name.to_string(), value);
        self
    }

    pub fn bind_text(self, name: &str, value: impl Into<String>) -> Result<Self, ApiError> {
        let value = QueryValue::text(name, value)?;
        Ok(self.bind(name, value))
    }

    pub fn bind_list<S: AsRef<str>>(self, name: &str, values: &[S]) -> Result<Self, ApiError> {
        let value = QueryValue::text_list(name, values)?;
        Ok(self.bind(name, value))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitute every `:name` placeholder with its bound literal.
    pub fn render(&self) -> Result<String, ApiError> {
        let mut out = String::with_capacity(self.template.len());
        let mut used = BTreeSet::new();
        let mut chars = self.template.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if c == ':' && chars.peek().is_some_and(|(_, next)| *next == ':') {
                chars.next();
                out.push_str("::");
                continue;
            }

            let starts_placeholder = c == ':'
                && chars
                    .peek()
                    .is_some_and(|(_, next)| next.is_ascii_alphabetic() || *next == '_');
            if !starts_placeholder {
                out.push(c);
                continue;
            }

            let start = i + 1;
            let mut end = start;
            while let Some((j, next)) = chars.peek().copied() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    end = j + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }

            let name = &self.template[start..end];
            let value = self.bindings.get(name).ok_or_else(|| {
                ApiError::InvalidQuery(format!("placeholder :{} has no bound value", name))
            })?;
            value.render_into(&mut out);
            used.insert(name);
        }

        if let Some(unused) = self
            .bindings
            .keys()
            .find(|name| !used.contains(name.as_str()))
        {
            return Err(ApiError::InvalidQuery(format!(
                "bound value :{} is not used by the query",
                unused
            )));
        }

        Ok(out)
    }
}
