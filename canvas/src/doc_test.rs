#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::collections::HashSet;

use serde_json::json;

use super::*;

// =============================================================
// Helpers
// =============================================================

fn doc_with_section() -> (Document, SectionId) {
    let mut doc = Document::new();
    let sid = doc.add_section();
    (doc, sid)
}

fn add(doc: &mut Document, sid: &SectionId, kind: ComponentKind) -> ComponentAddr {
    let cid = doc.add_component(sid, kind, Point::new(0.0, 0.0)).unwrap();
    ComponentAddr::new(sid.clone(), cid)
}

fn ids(doc: &Document, sid: &SectionId) -> Vec<ComponentId> {
    doc.section(sid).unwrap().components.iter().map(|c| c.id.clone()).collect()
}

fn z_indices(doc: &Document, sid: &SectionId) -> Vec<i64> {
    doc.section(sid).unwrap().components.iter().map(|c| c.z_index).collect()
}

// =============================================================
// Ids
// =============================================================

#[test]
fn generated_ids_are_distinct() {
    assert_ne!(SectionId::generate(), SectionId::generate());
    assert_ne!(ComponentId::generate(), ComponentId::generate());
}

#[test]
fn id_serializes_as_plain_string() {
    let id = ComponentId::from("c-1");
    assert_eq!(serde_json::to_value(&id).unwrap(), json!("c-1"));
}

#[test]
fn id_reads_legacy_numbers() {
    let id: ComponentId = serde_json::from_value(json!(1_700_000_000_000_u64)).unwrap();
    assert_eq!(id.as_str(), "1700000000000");
}

#[test]
fn id_rejects_other_shapes() {
    assert!(serde_json::from_value::<SectionId>(json!({ "id": 1 })).is_err());
    assert!(serde_json::from_value::<SectionId>(json!(null)).is_err());
}

// =============================================================
// ComponentKind
// =============================================================

#[test]
fn kind_parses_known_names_and_alias() {
    assert_eq!(ComponentKind::from("text"), ComponentKind::Text);
    assert_eq!(ComponentKind::from("rect"), ComponentKind::Rect);
    assert_eq!(ComponentKind::from("rectangle"), ComponentKind::Rect);
    assert_eq!(ComponentKind::from("diamond"), ComponentKind::Diamond);
}

#[test]
fn kind_unknown_round_trips() {
    let kind: ComponentKind = serde_json::from_value(json!("star")).unwrap();
    assert_eq!(kind, ComponentKind::Other("star".into()));
    assert!(!kind.is_known());
    assert_eq!(serde_json::to_value(&kind).unwrap(), json!("star"));
}

#[test]
fn kind_rect_serializes_canonical_name() {
    assert_eq!(serde_json::to_value(ComponentKind::Rect).unwrap(), json!("rect"));
}

#[test]
fn kind_default_sizes() {
    assert_eq!(ComponentKind::Text.default_size(), (100.0, 50.0));
    assert_eq!(ComponentKind::Image.default_size(), (100.0, 50.0));
    assert_eq!(ComponentKind::Rect.default_size(), (100.0, 50.0));
    assert_eq!(ComponentKind::Circle.default_size(), (100.0, 50.0));
    assert_eq!(ComponentKind::Line.default_size(), (100.0, 5.0));
    assert_eq!(ComponentKind::Diamond.default_size(), (50.0, 50.0));
}

#[test]
fn kind_text_default_style_has_font() {
    let style = ComponentKind::Text.default_style(Point::new(100.0, 50.0));
    assert_eq!((style.left, style.top, style.width, style.height), (100.0, 50.0, 100.0, 50.0));
    assert_eq!(style.font_size, Some(16.0));
    assert_eq!(style.color.as_deref(), Some("#000"));
}

#[test]
fn kind_accepts_matrix() {
    assert!(ComponentKind::Text.accepts(StyleKey::FontSize));
    assert!(!ComponentKind::Rect.accepts(StyleKey::FontSize));
    assert!(ComponentKind::Rect.accepts(StyleKey::FillColor));
    assert!(!ComponentKind::Line.accepts(StyleKey::FillColor));
    assert!(ComponentKind::Line.accepts(StyleKey::LineColor));
    assert!(!ComponentKind::Circle.accepts(StyleKey::LineColor));
    assert!(ComponentKind::Diamond.accepts(StyleKey::Opacity));
    assert!(!ComponentKind::Text.accepts(StyleKey::BackgroundColor));
    assert!(!ComponentKind::Other("star".into()).accepts(StyleKey::Left));
}

#[test]
fn kind_payload_capabilities() {
    assert!(ComponentKind::Text.carries_text());
    assert!(!ComponentKind::Image.carries_text());
    assert!(ComponentKind::Image.carries_image());
    assert!(ComponentKind::Circle.carries_image());
    assert!(!ComponentKind::Rect.carries_image());
}

// =============================================================
// Sections
// =============================================================

#[test]
fn add_section_appends_with_defaults() {
    let mut doc = Document::new();
    let a = doc.add_section();
    let b = doc.add_section();
    assert_ne!(a, b);
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.sections()[1].id, b);
    assert_eq!(doc.section(&a).unwrap().style, SectionStyle::default());
}

#[test]
fn update_section_style_background() {
    let (mut doc, sid) = doc_with_section();
    assert!(doc.update_section_style(&sid, StyleKey::BackgroundColor, "#eee".into()).unwrap());
    assert_eq!(doc.section(&sid).unwrap().style.background_color, "#eee");
}

#[test]
fn update_section_style_missing_section_is_noop() {
    let mut doc = Document::new();
    let result = doc.update_section_style(&SectionId::from("gone"), StyleKey::BackgroundColor, "#eee".into());
    assert_eq!(result, Ok(false));
}

#[test]
fn set_section_responsive_set_and_clear() {
    let (mut doc, sid) = doc_with_section();
    assert!(doc.set_section_responsive(&sid, Some("stacked".into())));
    assert_eq!(doc.section(&sid).unwrap().responsive.as_deref(), Some("stacked"));
    assert!(doc.set_section_responsive(&sid, Some(String::new())));
    assert!(doc.section(&sid).unwrap().responsive.is_none());
    assert!(!doc.set_section_responsive(&SectionId::from("gone"), None));
}

// =============================================================
// add_component
// =============================================================

#[test]
fn add_component_uses_type_defaults_at_position() {
    let (mut doc, sid) = doc_with_section();
    let cid = doc.add_component(&sid, ComponentKind::Text, Point::new(100.0, 50.0)).unwrap();
    let c = doc.section(&sid).unwrap().component(&cid).unwrap();
    assert_eq!(c.kind, ComponentKind::Text);
    assert_eq!((c.style.left, c.style.top, c.style.width, c.style.height), (100.0, 50.0, 100.0, 50.0));
    assert_eq!(c.z_index, 1);
    assert_eq!(c.text.as_deref(), Some(""));
    assert!(c.src.is_none());
}

#[test]
fn add_component_ids_unique_under_repetition() {
    let (mut doc, sid) = doc_with_section();
    for _ in 0..200 {
        add(&mut doc, &sid, ComponentKind::Rect);
    }
    let unique: HashSet<ComponentId> = ids(&doc, &sid).into_iter().collect();
    assert_eq!(unique.len(), 200);
    assert_eq!(doc.component_count(), 200);
}

#[test]
fn add_component_appends_on_top() {
    let (mut doc, sid) = doc_with_section();
    let a = add(&mut doc, &sid, ComponentKind::Rect);
    let b = add(&mut doc, &sid, ComponentKind::Circle);
    assert_eq!(ids(&doc, &sid), vec![a.component_id, b.component_id]);
    assert_eq!(z_indices(&doc, &sid), vec![1, 2]);
}

#[test]
fn add_component_missing_section_is_noop() {
    let (mut doc, _) = doc_with_section();
    let before = doc.clone();
    assert!(doc.add_component(&SectionId::from("gone"), ComponentKind::Rect, Point::default()).is_none());
    assert_eq!(doc, before);
}

#[test]
fn add_component_unknown_kind_is_refused() {
    let (mut doc, sid) = doc_with_section();
    assert!(doc.add_component(&sid, ComponentKind::Other("star".into()), Point::default()).is_none());
    assert_eq!(doc.component_count(), 0);
}

// =============================================================
// move_component
// =============================================================

#[test]
fn move_component_reorders_and_renumbers() {
    let (mut doc, sid) = doc_with_section();
    let a = add(&mut doc, &sid, ComponentKind::Rect).component_id;
    let b = add(&mut doc, &sid, ComponentKind::Rect).component_id;
    let c = add(&mut doc, &sid, ComponentKind::Rect).component_id;
    assert!(doc.move_component(&sid, 0, 2));
    assert_eq!(ids(&doc, &sid), vec![b, c, a]);
    assert_eq!(z_indices(&doc, &sid), vec![1, 2, 3]);
}

#[test]
fn move_component_twice_swaps_back() {
    let (mut doc, sid) = doc_with_section();
    for _ in 0..3 {
        add(&mut doc, &sid, ComponentKind::Rect);
    }
    let original = ids(&doc, &sid);
    assert!(doc.move_component(&sid, 1, 2));
    assert_ne!(ids(&doc, &sid), original);
    assert!(doc.move_component(&sid, 2, 1));
    assert_eq!(ids(&doc, &sid), original);
}

#[test]
fn move_component_same_index_is_noop() {
    let (mut doc, sid) = doc_with_section();
    add(&mut doc, &sid, ComponentKind::Rect);
    add(&mut doc, &sid, ComponentKind::Rect);
    let before = doc.clone();
    assert!(!doc.move_component(&sid, 1, 1));
    assert_eq!(doc, before);
}

#[test]
fn move_component_out_of_range_is_noop() {
    let (mut doc, sid) = doc_with_section();
    add(&mut doc, &sid, ComponentKind::Rect);
    let before = doc.clone();
    assert!(!doc.move_component(&sid, 0, 5));
    assert!(!doc.move_component(&sid, 3, 0));
    assert!(!doc.move_component(&SectionId::from("gone"), 0, 0));
    assert_eq!(doc, before);
}

// =============================================================
// update_component_style
// =============================================================

#[test]
fn update_component_style_merges() {
    let (mut doc, sid) = doc_with_section();
    let addr = add(&mut doc, &sid, ComponentKind::Text);
    assert!(doc.update_component_style(&addr, StyleKey::FontSize, 24.0.into()).unwrap());
    assert!(doc.update_component_style(&addr, StyleKey::FontFamily, "Georgia".into()).unwrap());
    let style = &doc.component(&addr).unwrap().style;
    assert_eq!(style.font_size, Some(24.0));
    assert_eq!(style.font_family.as_deref(), Some("Georgia"));
    assert_eq!(style.color.as_deref(), Some("#000"));
    assert_eq!(style.width, 100.0);
}

#[test]
fn update_component_style_rejects_inapplicable_key() {
    let (mut doc, sid) = doc_with_section();
    let addr = add(&mut doc, &sid, ComponentKind::Line);
    let before = doc.clone();
    let err = doc.update_component_style(&addr, StyleKey::FontSize, 24.0.into()).unwrap_err();
    assert!(matches!(err, StyleError::NotApplicable { key: StyleKey::FontSize, .. }));
    assert_eq!(doc, before);
}

#[test]
fn update_component_style_missing_component_is_noop() {
    let (mut doc, sid) = doc_with_section();
    let addr = ComponentAddr::new(sid, ComponentId::from("gone"));
    assert_eq!(doc.update_component_style(&addr, StyleKey::Opacity, 50.0.into()), Ok(false));
}

// =============================================================
// update_component_geometry
// =============================================================

#[test]
fn update_component_geometry_merges_fields() {
    let (mut doc, sid) = doc_with_section();
    let addr = add(&mut doc, &sid, ComponentKind::Rect);
    doc.update_component_style(&addr, StyleKey::FillColor, "#abc".into()).unwrap();
    let patch = GeometryPatch { width: Some(140.0), ..GeometryPatch::default() };
    assert!(doc.update_component_geometry(&addr.component_id, &patch));
    let style = &doc.component(&addr).unwrap().style;
    assert_eq!(style.width, 140.0);
    assert_eq!(style.height, 50.0);
    assert_eq!(style.fill_color.as_deref(), Some("#abc"));
}

#[test]
fn update_component_geometry_finds_any_section() {
    let mut doc = Document::new();
    doc.add_section();
    let second = doc.add_section();
    let addr = add(&mut doc, &second, ComponentKind::Image);
    assert!(doc.update_component_geometry(&addr.component_id, &GeometryPatch::position(7.0, 8.0)));
    assert_eq!(doc.component(&addr).unwrap().style.left, 7.0);
}

#[test]
fn update_component_geometry_missing_is_noop() {
    let (mut doc, _) = doc_with_section();
    assert!(!doc.update_component_geometry(&ComponentId::from("gone"), &GeometryPatch::position(1.0, 1.0)));
}

#[test]
fn update_component_geometry_at_targets_one_section() {
    let shared: Component = serde_json::from_value(json!({
        "id": "c1", "type": "rect", "style": { "left": 0, "top": 0, "width": 100, "height": 50 }
    }))
    .unwrap();
    let mut first = Section::new(SectionId::from("s1"));
    first.components.push(shared.clone());
    let mut second = Section::new(SectionId::from("s2"));
    second.components.push(shared);
    let mut doc = Document::from_sections(vec![first, second]);
    let addr = ComponentAddr::new(SectionId::from("s2"), ComponentId::from("c1"));
    assert!(doc.update_component_geometry_at(&addr, &GeometryPatch::position(40.0, 20.0)));
    assert_eq!(doc.sections()[0].components[0].style.left, 0.0);
    assert_eq!(doc.sections()[1].components[0].style.left, 40.0);
    assert_eq!(doc.sections()[1].components[0].style.top, 20.0);
}

#[test]
fn update_component_geometry_at_wrong_section_is_noop() {
    let (mut doc, sid) = doc_with_section();
    let addr = add(&mut doc, &sid, ComponentKind::Rect);
    let elsewhere = ComponentAddr::new(SectionId::from("other"), addr.component_id.clone());
    assert!(!doc.update_component_geometry_at(&elsewhere, &GeometryPatch::position(9.0, 9.0)));
    assert_eq!(doc.component(&addr).unwrap().style.left, 0.0);
}

// =============================================================
// delete_component
// =============================================================

#[test]
fn delete_component_removes_and_renumbers() {
    let (mut doc, sid) = doc_with_section();
    let a = add(&mut doc, &sid, ComponentKind::Rect);
    let b = add(&mut doc, &sid, ComponentKind::Rect);
    let c = add(&mut doc, &sid, ComponentKind::Rect);
    let removed = doc.delete_component(&a).unwrap();
    assert_eq!(removed.id, a.component_id);
    assert_eq!(ids(&doc, &sid), vec![b.component_id, c.component_id]);
    assert_eq!(z_indices(&doc, &sid), vec![1, 2]);
}

#[test]
fn delete_component_missing_is_none() {
    let (mut doc, sid) = doc_with_section();
    assert!(doc.delete_component(&ComponentAddr::new(sid, ComponentId::from("gone"))).is_none());
}

// =============================================================
// text / src payloads
// =============================================================

#[test]
fn set_component_text_only_on_text() {
    let (mut doc, sid) = doc_with_section();
    let text = add(&mut doc, &sid, ComponentKind::Text);
    let rect = add(&mut doc, &sid, ComponentKind::Rect);
    assert!(doc.set_component_text(&text, "Save the date".into()));
    assert_eq!(doc.component(&text).unwrap().text.as_deref(), Some("Save the date"));
    assert!(!doc.set_component_text(&rect, "nope".into()));
    assert!(doc.component(&rect).unwrap().text.is_none());
}

#[test]
fn set_component_src_on_image_and_circle() {
    let (mut doc, sid) = doc_with_section();
    let image = add(&mut doc, &sid, ComponentKind::Image);
    let circle = add(&mut doc, &sid, ComponentKind::Circle);
    let line = add(&mut doc, &sid, ComponentKind::Line);
    assert!(doc.set_component_src(&image, "https://cdn/a.png".into()));
    assert!(doc.set_component_src(&circle, "https://cdn/b.png".into()));
    assert!(!doc.set_component_src(&line, "https://cdn/c.png".into()));
    assert_eq!(doc.component(&circle).unwrap().src.as_deref(), Some("https://cdn/b.png"));
}

// =============================================================
// Lookup / construction
// =============================================================

#[test]
fn find_component_returns_full_address() {
    let mut doc = Document::new();
    doc.add_section();
    let second = doc.add_section();
    let addr = add(&mut doc, &second, ComponentKind::Diamond);
    assert_eq!(doc.find_component(&addr.component_id), Some(addr));
    assert_eq!(doc.find_component(&ComponentId::from("gone")), None);
}

#[test]
fn from_sections_restores_z_order() {
    let section: Section = serde_json::from_value(json!({
        "id": "s1",
        "components": [
            { "id": "a", "type": "rect", "zIndex": 9, "style": { "left": 0, "top": 0, "width": 10, "height": 10 } },
            { "id": "b", "type": "line", "style": { "left": 0, "top": 0, "width": 10, "height": 5 } }
        ]
    }))
    .unwrap();
    let doc = Document::from_sections(vec![section]);
    assert_eq!(z_indices(&doc, &SectionId::from("s1")), vec![1, 2]);
}

#[test]
fn component_serializes_type_and_z_index() {
    let (mut doc, sid) = doc_with_section();
    let addr = add(&mut doc, &sid, ComponentKind::Rect);
    let value = serde_json::to_value(doc.component(&addr).unwrap()).unwrap();
    assert_eq!(value["type"], json!("rect"));
    assert_eq!(value["zIndex"], json!(1));
    assert!(value.get("text").is_none());
}
