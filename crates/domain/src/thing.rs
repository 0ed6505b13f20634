//! Thing identity and the Web Thing description document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::property::PropertyMetadata;
use crate::schema::InputSchema;

/// Default JSON-LD context of a thing description.
pub const DEFAULT_CONTEXT: &str = "https://webthings.io/schemas";

/// Immutable identity of a thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingInfo {
    pub id: String,
    pub title: String,
    pub context: String,
    pub types: Vec<String>,
    pub description: Option<String>,
}

impl ThingInfo {
    /// Create a builder for a thing identity.
    #[must_use]
    pub fn builder() -> ThingInfoBuilder {
        ThingInfoBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyThingId`] when `id` is empty and
    /// [`ValidationError::EmptyName`] when `title` is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyThingId);
        }
        if self.title.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Step-by-step builder for [`ThingInfo`].
#[derive(Debug, Default)]
pub struct ThingInfoBuilder {
    id: Option<String>,
    title: Option<String>,
    context: Option<String>,
    types: Vec<String>,
    description: Option<String>,
}

impl ThingInfoBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn semantic_type(mut self, ty: impl Into<String>) -> Self {
        self.types.push(ty.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Consume the builder, validate, and return a [`ThingInfo`].
    ///
    /// # Errors
    ///
    /// See [`ThingInfo::validate`].
    pub fn build(self) -> Result<ThingInfo, ValidationError> {
        let info = ThingInfo {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            context: self
                .context
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
            types: self.types,
            description: self.description,
        };
        info.validate()?;
        Ok(info)
    }
}

/// A hyperlink in a thing description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Link {
    #[must_use]
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
        }
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

/// Property entry of a thing description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescription {
    #[serde(flatten)]
    pub metadata: PropertyMetadata,
    pub links: Vec<Link>,
}

/// Action entry of a thing description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescription {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input: InputSchema,
    pub links: Vec<Link>,
}

/// The document a transport serves to describe a thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingDescription {
    pub id: String,
    pub title: String,
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub properties: BTreeMap<String, PropertyDescription>,
    pub actions: BTreeMap<String, ActionDescription>,
    pub links: Vec<Link>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_context_to_webthings_schema() {
        let info = ThingInfo::builder()
            .id("thing:nlp:1")
            .title("nlp thing")
            .build()
            .unwrap();
        assert_eq!(info.context, DEFAULT_CONTEXT);
    }

    #[test]
    fn should_reject_empty_id() {
        let result = ThingInfo::builder().title("nlp thing").build();
        assert_eq!(result.unwrap_err(), ValidationError::EmptyThingId);
    }

    #[test]
    fn should_reject_empty_title() {
        let result = ThingInfo::builder().id("thing:nlp:1").build();
        assert_eq!(result.unwrap_err(), ValidationError::EmptyName);
    }

    #[test]
    fn should_keep_semantic_types_in_order() {
        let info = ThingInfo::builder()
            .id("thing:nlp:1")
            .title("nlp thing")
            .semantic_type("NLP")
            .semantic_type("TextAnalyzer")
            .build()
            .unwrap();
        assert_eq!(info.types, vec!["NLP", "TextAnalyzer"]);
    }

    #[test]
    fn should_serialize_link_media_type_in_camel_case() {
        let link = Link::new("alternate", "/events/stream").with_media_type("text/event-stream");
        let json = serde_json::to_value(link).unwrap();
        assert_eq!(json["mediaType"], "text/event-stream");
    }
}
