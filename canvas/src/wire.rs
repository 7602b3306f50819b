//! Persisted shapes exchanged with the template store.
//!
//! The store keeps a template row plus one row per section:
//! `{ id, position, metadata: { style, components } }`. Components inside
//! `metadata` are exactly the in-memory [`Component`] records. Sections come
//! back in arbitrary order and are sorted by `position`, which older rows
//! stored as a string.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::doc::{Component, Document, Section, SectionId};
use crate::style::{SectionStyle, parse_css_number};

/// Who may use a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessType {
    #[default]
    Free,
    Vip,
}

impl AccessType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Vip => "VIP",
        }
    }
}

impl std::str::FromStr for AccessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FREE" => Ok(Self::Free),
            "VIP" => Ok(Self::Vip),
            other => Err(format!("unknown access type `{other}` (expected FREE or VIP)")),
        }
    }
}

/// Template-level fields sent when creating or updating a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub access_type: AccessType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<String>,
}

/// Body of a section row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMetadata {
    #[serde(default)]
    pub style: SectionStyle,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<String>,
}

impl From<&Section> for SectionMetadata {
    fn from(section: &Section) -> Self {
        Self {
            style: section.style.clone(),
            components: section.components.clone(),
            responsive: section.responsive.clone(),
        }
    }
}

/// Request body for creating one section row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    pub template_id: String,
    pub position: i64,
    pub metadata: SectionMetadata,
}

/// A section row as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SectionId>,
    #[serde(default, deserialize_with = "lenient_position")]
    pub position: i64,
    #[serde(default)]
    pub metadata: SectionMetadata,
}

/// A template as returned by `get_template_by_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub meta: TemplateMeta,
    #[serde(default)]
    pub sections: Vec<WireSection>,
}

impl WireTemplate {
    /// Sections ordered by `position`; ties keep their stored order.
    #[must_use]
    pub fn sorted_sections(&self) -> Vec<&WireSection> {
        let mut sections: Vec<&WireSection> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.position);
        sections
    }

    /// Convert into an editable document. Sections without an id get a fresh one.
    #[must_use]
    pub fn into_document(self) -> (TemplateMeta, Document) {
        let mut rows = self.sections;
        rows.sort_by_key(|s| s.position);
        let sections = rows
            .into_iter()
            .map(|row| Section {
                id: row.id.unwrap_or_else(SectionId::generate),
                style: row.metadata.style,
                components: row.metadata.components,
                responsive: row.metadata.responsive,
            })
            .collect();
        (self.meta, Document::from_sections(sections))
    }
}

/// Summary row from the template list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    #[serde(deserialize_with = "required_lenient_id")]
    pub id: String,
    #[serde(flatten)]
    pub meta: TemplateMeta,
}

/// A whole template in the editor's own export format: metadata plus the
/// in-memory sections. This is what the host saves to disk and re-imports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExport {
    #[serde(flatten)]
    pub meta: TemplateMeta,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl TemplateExport {
    #[must_use]
    pub fn new(meta: TemplateMeta, doc: &Document) -> Self {
        Self { meta, sections: doc.sections().to_vec() }
    }

    /// Section row bodies in document order.
    #[must_use]
    pub fn section_metadata(&self) -> Vec<SectionMetadata> {
        self.sections.iter().map(SectionMetadata::from).collect()
    }

    /// The same template in the shape the store returns, positions 0..N.
    #[must_use]
    pub fn to_wire(&self) -> WireTemplate {
        let sections = self
            .sections
            .iter()
            .zip(0_i64..)
            .map(|(section, position)| WireSection {
                id: Some(section.id.clone()),
                position,
                metadata: SectionMetadata::from(section),
            })
            .collect();
        WireTemplate { id: None, meta: self.meta.clone(), sections }
    }

    #[must_use]
    pub fn into_document(self) -> (TemplateMeta, Document) {
        (self.meta, Document::from_sections(self.sections))
    }
}

fn lenient_position<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(position_from_f64))
            .unwrap_or_default(),
        Some(Value::String(s)) => parse_css_number(&s).map(position_from_f64).unwrap_or_default(),
        _ => 0,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn position_from_f64(n: f64) -> i64 {
    n.trunc() as i64
}

fn lenient_id<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn required_lenient_id<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_id(d)?.ok_or_else(|| serde::de::Error::custom("missing template id"))
}
