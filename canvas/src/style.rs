//! Typed style records for components and sections.
//!
//! Persisted templates carry style as a loose key/value bag. In memory each
//! component owns exactly one [`ComponentStyle`]: geometry is always present,
//! visual keys are optional, and the style panel edits them through
//! [`StyleKey`] / [`StyleValue`] so that a key can be rejected when it does not
//! apply to a component type. Keys the editor does not model (legacy
//! `transform`, `position`, ...) are kept in `extra` so they survive a
//! load/save cycle.
//!
//! Numbers are read leniently: older templates stored some of them as strings
//! (`"24"`, `"12px"`), and an unparseable value falls back to the field default
//! instead of failing the whole template.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{SECTION_GAP, SECTION_MIN_HEIGHT, SECTION_PADDING, SECTION_WIDTH};

/// Errors raised when the style panel submits an edit the model cannot accept.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleError {
    /// The key name is not a style key the editor knows.
    #[error("unknown style key `{0}`")]
    UnknownKey(String),

    /// The key exists but does not apply to this kind of entity.
    #[error("style key `{key}` does not apply to {target}")]
    NotApplicable { key: StyleKey, target: String },

    /// A numeric key received a value that is not a finite number.
    #[error("style key `{key}` expects a number, got `{value}`")]
    ExpectedNumber { key: StyleKey, value: String },

    /// A text key received a number.
    #[error("style key `{key}` expects text")]
    ExpectedText { key: StyleKey },
}

/// A style value as submitted by the style panel or stored on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    /// Interpret the value as a number, accepting numeric text such as `"24"` or `"24px"`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Self::Text(s) => parse_css_number(s),
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Every style key the editor can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleKey {
    Left,
    Top,
    Width,
    Height,
    FontSize,
    FontFamily,
    Color,
    FillColor,
    LineColor,
    BorderWidth,
    BorderStyle,
    BorderColor,
    BorderRadius,
    Opacity,
    /// Section background; not a component key.
    BackgroundColor,
}

impl StyleKey {
    pub const ALL: [StyleKey; 15] = [
        Self::Left,
        Self::Top,
        Self::Width,
        Self::Height,
        Self::FontSize,
        Self::FontFamily,
        Self::Color,
        Self::FillColor,
        Self::LineColor,
        Self::BorderWidth,
        Self::BorderStyle,
        Self::BorderColor,
        Self::BorderRadius,
        Self::Opacity,
        Self::BackgroundColor,
    ];

    /// The camelCase name used on the wire and by the style panel.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
            Self::FontSize => "fontSize",
            Self::FontFamily => "fontFamily",
            Self::Color => "color",
            Self::FillColor => "fillColor",
            Self::LineColor => "lineColor",
            Self::BorderWidth => "borderWidth",
            Self::BorderStyle => "borderStyle",
            Self::BorderColor => "borderColor",
            Self::BorderRadius => "borderRadius",
            Self::Opacity => "opacity",
            Self::BackgroundColor => "backgroundColor",
        }
    }

    /// Whether values for this key must be numbers.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Left | Self::Top | Self::Width | Self::Height | Self::FontSize | Self::BorderWidth | Self::Opacity
        )
    }

    /// Whether this key is one of the four geometry fields.
    #[must_use]
    pub fn is_geometry(self) -> bool {
        matches!(self, Self::Left | Self::Top | Self::Width | Self::Height)
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleKey {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| StyleError::UnknownKey(s.to_string()))
    }
}

/// Sparse geometry update produced by drag and resize gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryPatch {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl GeometryPatch {
    /// Patch that moves the origin only.
    #[must_use]
    pub fn position(left: f64, top: f64) -> Self {
        Self { left: Some(left), top: Some(top), ..Self::default() }
    }

    /// Patch that sets all four geometry fields.
    #[must_use]
    pub fn bounds(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left: Some(left), top: Some(top), width: Some(width), height: Some(height) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.top.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// Style of a single component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStyle {
    #[serde(default, deserialize_with = "lenient::number")]
    pub left: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub top: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub width: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub height: f64,
    #[serde(default, deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Either a pixel number or a CSS length such as `"50%"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<StyleValue>,
    /// Opacity on a 0–100 scale.
    #[serde(default, deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Override applied by the viewer on narrow screens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive_style: Option<Box<ComponentStyle>>,
    /// Keys the editor does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentStyle {
    /// A style with geometry only.
    #[must_use]
    pub fn at(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height, ..Self::default() }
    }

    /// Merge a geometry patch, leaving every other field untouched.
    pub fn apply_geometry(&mut self, patch: &GeometryPatch) {
        if let Some(left) = patch.left {
            self.left = left;
        }
        if let Some(top) = patch.top {
            self.top = top;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
    }

    /// Set one key, validating the value shape. Does not check whether the key
    /// applies to the owning component's type; callers do that first.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError`] when the value has the wrong shape or the key is
    /// a section-only key.
    pub fn set(&mut self, key: StyleKey, value: StyleValue) -> Result<(), StyleError> {
        if key.is_numeric() {
            let n = value
                .as_number()
                .ok_or_else(|| StyleError::ExpectedNumber { key, value: value.to_string() })?;
            match key {
                StyleKey::Left => self.left = n,
                StyleKey::Top => self.top = n,
                StyleKey::Width => self.width = n,
                StyleKey::Height => self.height = n,
                StyleKey::FontSize => self.font_size = Some(n),
                StyleKey::BorderWidth => self.border_width = Some(n),
                StyleKey::Opacity => self.opacity = Some(n.clamp(0.0, 100.0)),
                _ => {}
            }
            return Ok(());
        }

        if key == StyleKey::BorderRadius {
            self.border_radius = Some(value);
            return Ok(());
        }

        let StyleValue::Text(text) = value else {
            return Err(StyleError::ExpectedText { key });
        };
        match key {
            StyleKey::FontFamily => self.font_family = Some(text),
            StyleKey::Color => self.color = Some(text),
            StyleKey::FillColor => self.fill_color = Some(text),
            StyleKey::LineColor => self.line_color = Some(text),
            StyleKey::BorderStyle => self.border_style = Some(text),
            StyleKey::BorderColor => self.border_color = Some(text),
            _ => return Err(StyleError::NotApplicable { key, target: "a component".into() }),
        }
        Ok(())
    }

    /// Read one key, `None` when unset.
    #[must_use]
    pub fn get(&self, key: StyleKey) -> Option<StyleValue> {
        let text = |s: &Option<String>| s.clone().map(StyleValue::Text);
        match key {
            StyleKey::Left => Some(StyleValue::Number(self.left)),
            StyleKey::Top => Some(StyleValue::Number(self.top)),
            StyleKey::Width => Some(StyleValue::Number(self.width)),
            StyleKey::Height => Some(StyleValue::Number(self.height)),
            StyleKey::FontSize => self.font_size.map(StyleValue::Number),
            StyleKey::FontFamily => text(&self.font_family),
            StyleKey::Color => text(&self.color),
            StyleKey::FillColor => text(&self.fill_color),
            StyleKey::LineColor => text(&self.line_color),
            StyleKey::BorderWidth => self.border_width.map(StyleValue::Number),
            StyleKey::BorderStyle => text(&self.border_style),
            StyleKey::BorderColor => text(&self.border_color),
            StyleKey::BorderRadius => self.border_radius.clone(),
            StyleKey::Opacity => self.opacity.map(StyleValue::Number),
            StyleKey::BackgroundColor => None,
        }
    }
}

fn default_section_width() -> f64 {
    SECTION_WIDTH
}

fn default_section_min_height() -> f64 {
    SECTION_MIN_HEIGHT
}

fn default_section_padding() -> f64 {
    SECTION_PADDING
}

fn default_section_gap() -> f64 {
    SECTION_GAP
}

fn default_background() -> String {
    "#fff".to_string()
}

/// Layout style of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStyle {
    #[serde(default = "default_section_width", deserialize_with = "lenient::number")]
    pub width: f64,
    #[serde(default = "default_section_min_height", deserialize_with = "lenient::number")]
    pub min_height: f64,
    #[serde(default = "default_section_padding", deserialize_with = "lenient::number")]
    pub padding: f64,
    #[serde(default = "default_section_gap", deserialize_with = "lenient::number")]
    pub margin_bottom: f64,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SectionStyle {
    fn default() -> Self {
        Self {
            width: SECTION_WIDTH,
            min_height: SECTION_MIN_HEIGHT,
            padding: SECTION_PADDING,
            margin_bottom: SECTION_GAP,
            background_color: default_background(),
            extra: Map::new(),
        }
    }
}

impl SectionStyle {
    /// Apply a section-level edit. Only the background is editable.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::NotApplicable`] for any other key and
    /// [`StyleError::ExpectedText`] for a numeric background.
    pub fn set(&mut self, key: StyleKey, value: StyleValue) -> Result<(), StyleError> {
        if key != StyleKey::BackgroundColor {
            return Err(StyleError::NotApplicable { key, target: "a section".into() });
        }
        let StyleValue::Text(color) = value else {
            return Err(StyleError::ExpectedText { key });
        };
        self.background_color = color;
        Ok(())
    }
}

/// Parse `"24"`, `" 24.5 "` or `"24px"` into a finite number.
#[must_use]
pub fn parse_css_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix("px").unwrap_or(trimmed).trim_end();
    match digits.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => None,
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::parse_css_number;

    pub fn opt_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64().filter(|n| n.is_finite()),
            Some(Value::String(s)) => parse_css_number(&s),
            _ => None,
        })
    }

    pub fn number<'de, D>(d: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(opt_number(d)?.unwrap_or(0.0))
    }
}
