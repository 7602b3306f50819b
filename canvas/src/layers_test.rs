#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::doc::{ComponentAddr, ComponentKind};
use crate::viewport::Point;

// =============================================================
// Helpers
// =============================================================

fn doc_with_components(n: usize) -> (Document, SectionId, Vec<ComponentId>) {
    let mut doc = Document::new();
    let sid = doc.add_section();
    let ids = (0..n)
        .map(|_| doc.add_component(&sid, ComponentKind::Rect, Point::default()).unwrap())
        .collect();
    (doc, sid, ids)
}

fn order(doc: &Document, sid: &SectionId) -> Vec<ComponentId> {
    doc.section(sid).unwrap().components.iter().map(|c| c.id.clone()).collect()
}

fn component_rows(rows: &[LayerRow]) -> usize {
    rows.iter().filter(|r| matches!(r, LayerRow::Component { .. })).count()
}

// =============================================================
// Expand / collapse
// =============================================================

#[test]
fn sections_start_collapsed() {
    let (doc, sid, _) = doc_with_components(2);
    let panel = LayerPanel::new();
    assert!(!panel.is_expanded(&sid));
    let rows = panel.rows(&doc, &Selection::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(component_rows(&rows), 0);
}

#[test]
fn toggle_flips_and_reports_state() {
    let (_, sid, _) = doc_with_components(0);
    let mut panel = LayerPanel::new();
    assert!(panel.toggle(&sid));
    assert!(panel.is_expanded(&sid));
    assert!(!panel.toggle(&sid));
    assert!(!panel.is_expanded(&sid));
}

// =============================================================
// Rows
// =============================================================

#[test]
fn rows_label_sections_and_components() {
    let (doc, sid, ids) = doc_with_components(2);
    let mut panel = LayerPanel::new();
    panel.toggle(&sid);
    let rows = panel.rows(&doc, &Selection::default());
    assert_eq!(rows.len(), 3);
    let LayerRow::Section { label, detail, expanded, active, .. } = &rows[0] else {
        panic!("expected section row");
    };
    assert_eq!(label, &format!("Section: {sid}"));
    assert_eq!(detail, "Components: 2");
    assert!(*expanded);
    assert!(!*active);
    let LayerRow::Component { component_id, index, label, detail, .. } = &rows[2] else {
        panic!("expected component row");
    };
    assert_eq!(component_id, &ids[1]);
    assert_eq!(*index, 1);
    assert_eq!(label, &format!("Component: {}", ids[1]));
    assert_eq!(detail, "Type: rect");
}

#[test]
fn rows_mark_active_component_only() {
    let (doc, sid, ids) = doc_with_components(2);
    let mut panel = LayerPanel::new();
    panel.toggle(&sid);
    let mut sel = Selection::default();
    sel.select_component(&ComponentAddr::new(sid.clone(), ids[0].clone()));
    let active: Vec<bool> = panel
        .rows(&doc, &sel)
        .iter()
        .map(|r| match r {
            LayerRow::Section { active, .. } | LayerRow::Component { active, .. } => *active,
        })
        .collect();
    assert_eq!(active, vec![false, true, false]);
}

#[test]
fn rows_mark_active_section() {
    let (doc, sid, _) = doc_with_components(1);
    let mut sel = Selection::default();
    sel.select_section(&sid);
    let rows = LayerPanel::new().rows(&doc, &sel);
    assert!(matches!(rows[0], LayerRow::Section { active: true, .. }));
}

#[test]
fn row_serializes_with_row_tag() {
    let (doc, _, _) = doc_with_components(0);
    let rows = LayerPanel::new().rows(&doc, &Selection::default());
    let value = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(value["row"], serde_json::json!("section"));
    assert_eq!(value["detail"], serde_json::json!("Components: 0"));
    assert!(value.get("sectionId").is_some());
}

// =============================================================
// Drag reorder
// =============================================================

#[test]
fn hover_moves_dragged_row_and_follows_it() {
    let (mut doc, sid, ids) = doc_with_components(3);
    let mut panel = LayerPanel::new();
    panel.begin_drag(&sid, 0);
    assert!(panel.hover(&mut doc, &sid, 1));
    assert_eq!(order(&doc, &sid), vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]);
    assert_eq!(panel.drag().unwrap().index, 1);
    assert!(panel.hover(&mut doc, &sid, 2));
    assert_eq!(order(&doc, &sid), vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]);
    assert_eq!(panel.drag().unwrap().index, 2);
}

#[test]
fn hover_renumbers_z_order() {
    let (mut doc, sid, _) = doc_with_components(3);
    let mut panel = LayerPanel::new();
    panel.begin_drag(&sid, 2);
    panel.hover(&mut doc, &sid, 0);
    let z: Vec<i64> = doc.section(&sid).unwrap().components.iter().map(|c| c.z_index).collect();
    assert_eq!(z, vec![1, 2, 3]);
}

#[test]
fn hover_same_index_is_noop() {
    let (mut doc, sid, _) = doc_with_components(2);
    let before = doc.clone();
    let mut panel = LayerPanel::new();
    panel.begin_drag(&sid, 1);
    assert!(!panel.hover(&mut doc, &sid, 1));
    assert_eq!(doc, before);
}

#[test]
fn hover_without_drag_is_noop() {
    let (mut doc, sid, _) = doc_with_components(2);
    let before = doc.clone();
    assert!(!LayerPanel::new().hover(&mut doc, &sid, 1));
    assert_eq!(doc, before);
}

#[test]
fn hover_other_section_is_noop() {
    let (mut doc, sid, _) = doc_with_components(2);
    let other = doc.add_section();
    doc.add_component(&other, ComponentKind::Rect, Point::default());
    doc.add_component(&other, ComponentKind::Rect, Point::default());
    let before = doc.clone();
    let mut panel = LayerPanel::new();
    panel.begin_drag(&sid, 0);
    assert!(!panel.hover(&mut doc, &other, 1));
    assert_eq!(doc, before);
}

#[test]
fn hover_out_of_range_keeps_drag_index() {
    let (mut doc, sid, _) = doc_with_components(2);
    let mut panel = LayerPanel::new();
    panel.begin_drag(&sid, 0);
    assert!(!panel.hover(&mut doc, &sid, 9));
    assert_eq!(panel.drag().unwrap().index, 0);
}

#[test]
fn end_drag_clears() {
    let (_, sid, _) = doc_with_components(1);
    let mut panel = LayerPanel::new();
    panel.begin_drag(&sid, 0);
    assert_eq!(panel.end_drag(), Some(LayerDrag { section_id: sid, index: 0 }));
    assert!(panel.drag().is_none());
}

#[test]
fn retain_existing_forgets_removed_sections() {
    let (doc, sid, _) = doc_with_components(1);
    let mut panel = LayerPanel::new();
    panel.toggle(&sid);
    panel.begin_drag(&sid, 0);
    panel.retain_existing(&Document::new());
    assert!(!panel.is_expanded(&sid));
    assert!(panel.drag().is_none());
    panel.toggle(&sid);
    panel.retain_existing(&doc);
    assert!(panel.is_expanded(&sid));
}
