//! Read-only rendering for the template viewer.
//!
//! Resolves a persisted template into positioned [`RenderNode`]s: sections in
//! `position` order, each component drawn by type with safe defaults for
//! missing style fields. At or below [`RESPONSIVE_BREAKPOINT_PX`] a
//! component's `responsiveStyle` replaces its style. Component types the
//! viewer does not know are skipped silently.
//!
//! [`RenderedTemplate::to_html`] turns the result into absolutely positioned
//! markup for hosts that do not build their own DOM.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::Serialize;

use crate::consts::{LINE_HEIGHT, RESPONSIVE_BREAKPOINT_PX};
use crate::doc::{Component, ComponentId, ComponentKind, SectionId};
use crate::style::{ComponentStyle, StyleValue};
use crate::wire::{SectionMetadata, WireTemplate};

const RECT_FILL: &str = "#ccc";
const LINE_COLOR: &str = "#000";

/// A resolved, drawable component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// 0.0–1.0.
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

/// A resolved section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<SectionId>,
    pub width: f64,
    pub min_height: f64,
    pub padding: f64,
    pub margin_bottom: f64,
    pub background_color: String,
    pub nodes: Vec<RenderNode>,
}

/// A resolved template ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTemplate {
    pub name: String,
    pub description: String,
    /// Whether responsive styles were applied.
    pub responsive: bool,
    pub sections: Vec<RenderedSection>,
}

/// Resolve `template` for a viewport `viewport_width` CSS pixels wide.
#[must_use]
pub fn render_template(template: &WireTemplate, viewport_width: f64) -> RenderedTemplate {
    let responsive = viewport_width <= RESPONSIVE_BREAKPOINT_PX;
    let sections = template
        .sorted_sections()
        .into_iter()
        .map(|s| render_section(s.id.clone(), &s.metadata, responsive))
        .collect();
    RenderedTemplate {
        name: template.meta.name.clone(),
        description: template.meta.description.clone(),
        responsive,
        sections,
    }
}

fn render_section(id: Option<SectionId>, metadata: &SectionMetadata, responsive: bool) -> RenderedSection {
    RenderedSection {
        id,
        width: metadata.style.width,
        min_height: metadata.style.min_height,
        padding: metadata.style.padding,
        margin_bottom: metadata.style.margin_bottom,
        background_color: metadata.style.background_color.clone(),
        nodes: metadata.components.iter().filter_map(|c| render_component(c, responsive)).collect(),
    }
}

/// Resolve one component, `None` for types the viewer does not draw.
#[must_use]
pub fn render_component(component: &Component, responsive: bool) -> Option<RenderNode> {
    if !component.kind.is_known() {
        return None;
    }
    let style = effective_style(component, responsive);
    let mut node = RenderNode {
        id: component.id.clone(),
        kind: component.kind.clone(),
        left: style.left,
        top: style.top,
        width: style.width,
        height: style.height,
        opacity: opacity_fraction(style.opacity),
        background: style.fill_color.clone(),
        color: None,
        font_size: None,
        font_family: None,
        border: border_css(style),
        border_radius: style.border_radius.as_ref().map(length_css),
        transform: None,
        text: None,
        src: None,
    };

    match component.kind {
        ComponentKind::Text => {
            node.color = style.color.clone();
            node.font_size = style.font_size;
            node.font_family = style.font_family.clone();
            node.text = Some(component.text.clone().unwrap_or_default());
        }
        ComponentKind::Image => {
            node.src = component.src.clone();
        }
        ComponentKind::Circle => {
            node.border_radius = Some("50%".to_string());
            node.src = component.src.clone();
        }
        ComponentKind::Rect => {
            node.background = Some(style.fill_color.clone().unwrap_or_else(|| RECT_FILL.to_string()));
        }
        ComponentKind::Line => {
            if node.height <= 0.0 {
                node.height = LINE_HEIGHT;
            }
            node.background = Some(style.line_color.clone().unwrap_or_else(|| LINE_COLOR.to_string()));
        }
        ComponentKind::Diamond => {
            node.transform = Some("rotate(45deg)".to_string());
        }
        ComponentKind::Other(_) => return None,
    }
    Some(node)
}

/// The style the viewer applies. On narrow screens a component-level
/// `responsiveStyle` wins, then one nested in `style`; otherwise, and when
/// neither exists, the regular style.
#[must_use]
pub fn effective_style(component: &Component, responsive: bool) -> &ComponentStyle {
    if !responsive {
        return &component.style;
    }
    component
        .responsive_style
        .as_ref()
        .or(component.style.responsive_style.as_deref())
        .unwrap_or(&component.style)
}

/// Convert a 0–100 opacity to a CSS fraction. Absent or zero means fully
/// opaque, matching how stored templates behave.
#[must_use]
pub fn opacity_fraction(opacity: Option<f64>) -> f64 {
    match opacity {
        Some(v) if v > 0.0 => (v / 100.0).clamp(0.0, 1.0),
        _ => 1.0,
    }
}

fn border_css(style: &ComponentStyle) -> Option<String> {
    let width = style.border_width.filter(|w| *w > 0.0)?;
    let kind = style.border_style.as_deref().unwrap_or("solid");
    let color = style.border_color.as_deref().unwrap_or("#000");
    Some(format!("{width}px {kind} {color}"))
}

fn length_css(value: &StyleValue) -> String {
    match value {
        StyleValue::Number(n) => format!("{n}px"),
        StyleValue::Text(s) => s.clone(),
    }
}

impl RenderedTemplate {
    /// Absolutely positioned HTML for the whole template.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<article class=\"template\">\n");
        if !self.name.is_empty() {
            out.push_str(&format!("<h1>{}</h1>\n", escape(&self.name)));
        }
        if !self.description.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", escape(&self.description)));
        }
        for section in &self.sections {
            section.write_html(&mut out, self.responsive);
        }
        out.push_str("</article>\n");
        out
    }
}

impl RenderedSection {
    fn write_html(&self, out: &mut String, responsive: bool) {
        let width = if responsive { "100%".to_string() } else { format!("{}px", self.width) };
        out.push_str(&format!(
            "<section style=\"position:relative;width:{width};min-height:{}px;padding:{}px;margin-bottom:{}px;background-color:{}\">\n",
            self.min_height,
            self.padding,
            self.margin_bottom,
            escape(&self.background_color),
        ));
        for node in &self.nodes {
            node.write_html(out);
        }
        out.push_str("</section>\n");
    }
}

impl RenderNode {
    fn css(&self) -> String {
        let mut css = format!(
            "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;opacity:{}",
            self.left, self.top, self.width, self.height, self.opacity
        );
        let optional = [
            ("background-color", self.background.clone()),
            ("color", self.color.clone()),
            ("font-size", self.font_size.map(|s| format!("{s}px"))),
            ("font-family", self.font_family.clone()),
            ("border", self.border.clone()),
            ("border-radius", self.border_radius.clone()),
            ("transform", self.transform.clone()),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                css.push_str(&format!(";{key}:{v}"));
            }
        }
        css
    }

    fn write_html(&self, out: &mut String) {
        let css = escape(&self.css());
        let id = escape(self.id.as_str());
        match (&self.kind, &self.src) {
            (ComponentKind::Image | ComponentKind::Circle, Some(src)) => {
                out.push_str(&format!(
                    "<div data-id=\"{id}\" style=\"{css};overflow:hidden\"><img src=\"{}\" alt=\"\" style=\"width:100%;height:100%;object-fit:cover\"></div>\n",
                    escape(src)
                ));
            }
            _ => {
                let text = self.text.as_deref().map(escape).unwrap_or_default();
                out.push_str(&format!("<div data-id=\"{id}\" style=\"{css}\">{text}</div>\n"));
            }
        }
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
