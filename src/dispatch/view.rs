//! View resolution.
//!
//! The dispatcher only needs two things from the view layer: whether a
//! template identifier exists, and the rendered text for a view model.
//! [`TemplateStore`] is the bundled in-memory implementation; it knows
//! nothing beyond `{{ name }}` substitution.

use std::collections::HashMap;

use crate::dispatch::context::ViewModel;
use crate::dispatch::controller::HandlerError;

/// Template lookup and rendering collaborator.
pub trait ViewRenderer: Send + Sync {
    fn exists(&self, template: &str) -> bool;

    fn render(&self, template: &str, view: &ViewModel) -> Result<String, HandlerError>;
}

/// Templates held in memory, keyed by identifier (`"blog/post/show"`).
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<String, String>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.templates.insert(id.into(), source.into());
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TemplateStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            templates: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl ViewRenderer for TemplateStore {
    fn exists(&self, template: &str) -> bool {
        self.templates.contains_key(template)
    }

    fn render(&self, template: &str, view: &ViewModel) -> Result<String, HandlerError> {
        let source = self.templates.get(template).ok_or_else(|| HandlerError::Render {
            template: template.to_string(),
            reason: "template not found".to_string(),
        })?;

        let mut out = String::with_capacity(source.len());
        let mut rest = source.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| HandlerError::Render {
                template: template.to_string(),
                reason: "unclosed '{{'".to_string(),
            })?;

            // Unknown variables render as nothing.
            match view.get(after[..end].trim()) {
                Some(serde_json::Value::String(s)) => out.push_str(s),
                Some(serde_json::Value::Null) | None => {}
                Some(other) => out.push_str(&other.to_string()),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
