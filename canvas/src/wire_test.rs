#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::doc::{ComponentAddr, ComponentKind};
use crate::style::StyleKey;
use crate::viewport::Point;

// =============================================================
// Helpers
// =============================================================

fn sample_template() -> serde_json::Value {
    json!({
        "id": 42,
        "name": "Garden party",
        "description": "Pastel florals",
        "accessType": "VIP",
        "sections": [
            {
                "id": "s-b",
                "position": "1",
                "metadata": {
                    "style": { "backgroundColor": "#eef" },
                    "components": [
                        { "id": 1_700_000_000_001_u64, "type": "rectangle", "style": { "left": "10", "top": 0, "width": 100, "height": 50 } }
                    ]
                }
            },
            {
                "id": "s-a",
                "position": 0,
                "metadata": { "style": {}, "components": [] }
            }
        ]
    })
}

// =============================================================
// AccessType
// =============================================================

#[test]
fn access_type_parse_and_serialize() {
    assert_eq!("vip".parse::<AccessType>().unwrap(), AccessType::Vip);
    assert_eq!("FREE".parse::<AccessType>().unwrap(), AccessType::Free);
    assert!("gold".parse::<AccessType>().is_err());
    assert_eq!(serde_json::to_value(AccessType::Vip).unwrap(), json!("VIP"));
    assert_eq!(AccessType::default(), AccessType::Free);
}

// =============================================================
// WireTemplate
// =============================================================

#[test]
fn wire_template_reads_legacy_shapes() {
    let template: WireTemplate = serde_json::from_value(sample_template()).unwrap();
    assert_eq!(template.id.as_deref(), Some("42"));
    assert_eq!(template.meta.name, "Garden party");
    assert_eq!(template.meta.access_type, AccessType::Vip);
    assert_eq!(template.sections[0].position, 1);
    let component = &template.sections[0].metadata.components[0];
    assert_eq!(component.id.as_str(), "1700000000001");
    assert_eq!(component.kind, ComponentKind::Rect);
    assert_eq!(component.style.left, 10.0);
}

#[test]
fn sorted_sections_orders_by_position() {
    let template: WireTemplate = serde_json::from_value(sample_template()).unwrap();
    let ids: Vec<String> = template
        .sorted_sections()
        .iter()
        .map(|s| s.id.as_ref().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["s-a", "s-b"]);
}

#[test]
fn into_document_sorts_and_restores_z_order() {
    let template: WireTemplate = serde_json::from_value(sample_template()).unwrap();
    let (meta, doc) = template.into_document();
    assert_eq!(meta.description, "Pastel florals");
    assert_eq!(doc.sections()[0].id.as_str(), "s-a");
    assert_eq!(doc.sections()[1].id.as_str(), "s-b");
    assert_eq!(doc.sections()[1].style.background_color, "#eef");
    assert_eq!(doc.sections()[1].components[0].z_index, 1);
}

#[test]
fn into_document_generates_missing_section_ids() {
    let template: WireTemplate = serde_json::from_value(json!({
        "name": "n",
        "sections": [{ "position": 0 }, { "position": 1 }]
    }))
    .unwrap();
    let (_, doc) = template.into_document();
    assert_eq!(doc.len(), 2);
    assert_ne!(doc.sections()[0].id, doc.sections()[1].id);
}

#[test]
fn malformed_position_defaults_to_zero() {
    let section: WireSection = serde_json::from_value(json!({ "position": "first" })).unwrap();
    assert_eq!(section.position, 0);
    let section: WireSection = serde_json::from_value(json!({ "position": 2.9 })).unwrap();
    assert_eq!(section.position, 2);
}

#[test]
fn template_summary_requires_id() {
    let summary: TemplateSummary = serde_json::from_value(json!({ "id": 7, "name": "x" })).unwrap();
    assert_eq!(summary.id, "7");
    assert!(serde_json::from_value::<TemplateSummary>(json!({ "name": "x" })).is_err());
}

// =============================================================
// Round trip
// =============================================================

#[test]
fn export_round_trips_one_component_of_each_type() {
    let mut doc = Document::new();
    let sid = doc.add_section();
    for (i, kind) in ComponentKind::PALETTE.into_iter().enumerate() {
        let offset = f64::from(u8::try_from(i).unwrap()) * 10.0;
        let cid = doc.add_component(&sid, kind.clone(), Point::new(offset, offset)).unwrap();
        let addr = ComponentAddr::new(sid.clone(), cid);
        doc.update_component_style(&addr, StyleKey::Opacity, 80.0.into()).unwrap();
        if kind.carries_text() {
            doc.set_component_text(&addr, "Hello".into());
        }
        if kind.carries_image() {
            doc.set_component_src(&addr, "https://cdn/x.png".into());
        }
    }
    doc.update_section_style(&sid, StyleKey::BackgroundColor, "#fcf".into()).unwrap();
    doc.set_section_responsive(&sid, Some("stacked".into()));

    let meta = TemplateMeta { name: "All shapes".into(), ..TemplateMeta::default() };
    let export = TemplateExport::new(meta.clone(), &doc);
    let json = serde_json::to_string(&export).unwrap();
    let back: TemplateExport = serde_json::from_str(&json).unwrap();
    let (meta_back, doc_back) = back.into_document();
    assert_eq!(meta_back, meta);
    assert_eq!(doc_back, doc);
}

#[test]
fn to_wire_assigns_positions_and_reloads_identically() {
    let mut doc = Document::new();
    let a = doc.add_section();
    let b = doc.add_section();
    doc.add_component(&b, ComponentKind::Line, Point::new(5.0, 5.0));
    let export = TemplateExport::new(TemplateMeta::default(), &doc);
    let wire = export.to_wire();
    let positions: Vec<i64> = wire.sections.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![0, 1]);
    assert_eq!(wire.sections[0].id.as_ref(), Some(&a));

    let json = serde_json::to_value(&wire).unwrap();
    let reread: WireTemplate = serde_json::from_value(json).unwrap();
    let (_, doc_back) = reread.into_document();
    assert_eq!(doc_back, doc);
}

#[test]
fn unknown_component_type_survives_round_trip() {
    let raw = json!({
        "name": "legacy",
        "sections": [{
            "id": "s", "position": 0,
            "metadata": { "components": [
                { "id": "c", "type": "sparkle", "style": { "left": 0, "top": 0, "width": 10, "height": 10, "glow": true } }
            ] }
        }]
    });
    let (meta, doc) = serde_json::from_value::<WireTemplate>(raw).unwrap().into_document();
    let export = TemplateExport::new(meta, &doc);
    let value = serde_json::to_value(&export.section_metadata()[0]).unwrap();
    assert_eq!(value["components"][0]["type"], json!("sparkle"));
    assert_eq!(value["components"][0]["style"]["glow"], json!(true));
}

#[test]
fn component_level_keys_survive_round_trip() {
    let raw = json!({
        "name": "narrow",
        "sections": [{
            "id": "s", "position": 0,
            "metadata": { "components": [{
                "id": "c1", "type": "rect",
                "style": { "left": 300, "top": 0, "width": 400, "height": 50 },
                "responsiveStyle": { "left": 0, "top": 0, "width": 200, "height": 50 },
                "locked": true
            }] }
        }]
    });
    let (meta, doc) = serde_json::from_value::<WireTemplate>(raw).unwrap().into_document();
    let component = &doc.sections()[0].components[0];
    assert_eq!(component.responsive_style.as_ref().map(|s| s.width), Some(200.0));

    let value = serde_json::to_value(&TemplateExport::new(meta, &doc).section_metadata()[0]).unwrap();
    assert_eq!(value["components"][0]["responsiveStyle"]["width"], json!(200.0));
    assert_eq!(value["components"][0]["locked"], json!(true));
}

#[test]
fn new_section_serializes_camel_case() {
    let body = NewSection { template_id: "t1".into(), position: 3, metadata: SectionMetadata::default() };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["templateId"], json!("t1"));
    assert_eq!(value["position"], json!(3));
    assert!(value["metadata"]["components"].as_array().unwrap().is_empty());
    assert!(value["metadata"].get("responsive").is_none());
}

#[test]
fn template_meta_omits_absent_optionals() {
    let value = serde_json::to_value(TemplateMeta::default()).unwrap();
    assert_eq!(value, json!({ "name": "", "description": "", "accessType": "FREE" }));
}
