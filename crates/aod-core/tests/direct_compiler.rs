// SPDX-License-Identifier: Apache-2.0
//! Bundle-level behavior of the flat schema compiler: raw ids, name-keyed
//! variables, binding resolution, and unary lowering.

mod common;

use aod_core::{
    apply_bundle, compile_bundle, CompileError, DirectCompiler, DirectNode, DirectValue, NodeId,
    ResourceGraphStore, ResourceKey, VIRTUAL_ROOT_ID,
};
use aod_schema::{
    BindableBool, BindableColor, BindableF32, ConstantRecord, ConstantValue, DataSourceRecord,
    DynamicTextRecord, FontRecord, LayoutBundle, MetricRecord, OperandRef, StaticTextRecord,
    TextAlign, TextStyle, UnaryOpKind, UnaryOpRecord, ValueTypeTag,
};
use bytes::Bytes;
use common::{group, rect, RecordingHal};

fn text_style(font: u32) -> TextStyle {
    TextStyle {
        color: BindableColor::literal(0xFFFF_FFFF),
        align: TextAlign::Center,
        font,
        font_size: 32.0,
    }
}

#[test]
fn structural_ids_are_forwarded_unmapped() {
    let bundle = LayoutBundle {
        rects: vec![rect(11, 24.0, 16.0)],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].0, ResourceKey::Id(NodeId(11)));
}

#[test]
fn bound_fields_resolve_to_registered_source_paths() {
    let bundle = LayoutBundle {
        data_sources: vec![DataSourceRecord {
            name: 3,
            source: "watch.minute_string".to_owned(),
        }],
        fonts: vec![FontRecord {
            id: 2,
            ttf: Bytes::from_static(b"\x00\x01\x00\x00"),
        }],
        dynamic_texts: vec![DynamicTextRecord {
            id: 12,
            binding: 3,
            style: Some(text_style(2)),
            visibility: BindableBool::literal(true),
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");

    let text = out
        .iter()
        .find_map(|(k, n)| match n {
            DirectNode::DynamicText { source, font, .. } => Some((k.clone(), source.clone(), *font)),
            _ => None,
        })
        .expect("dynamic text node");
    assert_eq!(text, (ResourceKey::Id(NodeId(12)), "watch.minute_string".to_owned(), NodeId(2)));
}

#[test]
fn unregistered_bindings_fall_back_to_prefixed_names() {
    let bundle = LayoutBundle {
        metrics: vec![MetricRecord {
            name: 5,
            mapping: 12,
            bound_source: 9,
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");
    assert_eq!(out[0].0, ResourceKey::name("b_5"));
    assert_eq!(
        out[0].1,
        DirectNode::Metric {
            source: "b_9".to_owned(),
            mapping: "12".to_owned(),
        }
    );
}

#[test]
fn constants_are_name_keyed_and_default_to_zero() {
    let bundle = LayoutBundle {
        constants: vec![
            ConstantRecord {
                name: 1,
                value: ConstantValue::F32(9.5),
            },
            ConstantRecord {
                name: 2,
                value: ConstantValue::None,
            },
        ],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");

    assert_eq!(out[0].0, ResourceKey::name("b_1"));
    assert_eq!(
        out[1],
        (
            ResourceKey::name("b_2"),
            DirectNode::Constant {
                value: ConstantValue::I32(0),
            }
        )
    );
}

#[test]
fn ceil_lowers_to_a_builtin_mapping_and_metric_pair() {
    let bundle = LayoutBundle {
        data_sources: vec![DataSourceRecord {
            name: 3,
            source: "watch.battery.percent".to_owned(),
        }],
        unary_ops: vec![UnaryOpRecord {
            name: 8,
            op: UnaryOpKind::Ceil,
            operand: OperandRef {
                name: 3,
                ty: ValueTypeTag::Float,
            },
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].0, ResourceKey::name("ceil"));
    assert_eq!(
        out[1],
        (
            ResourceKey::name("b_8"),
            DirectNode::Metric {
                source: "watch.battery.percent".to_owned(),
                mapping: "ceil".to_owned(),
            }
        )
    );
}

#[test]
fn round_is_not_expressible_in_the_flat_schema() {
    let bundle = LayoutBundle {
        unary_ops: vec![UnaryOpRecord {
            name: 8,
            op: UnaryOpKind::Round,
            operand: OperandRef {
                name: 3,
                ty: ValueTypeTag::Float,
            },
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    assert!(matches!(
        compile_bundle(&mut compiler, &bundle),
        Err(CompileError::Unsupported { schema: "direct", .. })
    ));
}

#[test]
fn bound_group_offsets_are_rejected() {
    let mut g = group(10, vec![]);
    g.offset_x = BindableF32::bound(3);
    let bundle = LayoutBundle {
        translation_groups: vec![g],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    assert!(matches!(
        compile_bundle(&mut compiler, &bundle),
        Err(CompileError::Unsupported { schema: "direct", .. })
    ));
}

#[test]
fn text_without_style_is_malformed() {
    let bundle = LayoutBundle {
        static_texts: vec![StaticTextRecord {
            id: 12,
            value: "12:00".to_owned(),
            style: None,
            visibility: BindableBool::literal(true),
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    assert!(matches!(
        compile_bundle(&mut compiler, &bundle),
        Err(CompileError::MissingField { field: "style", .. })
    ));
}

#[test]
fn named_variables_are_sent_before_structural_nodes() {
    let bundle = LayoutBundle {
        data_sources: vec![DataSourceRecord {
            name: 3,
            source: "watch.second".to_owned(),
        }],
        metrics: vec![MetricRecord {
            name: 5,
            mapping: 12,
            bound_source: 3,
        }],
        translation_groups: vec![group(10, vec![11])],
        rects: vec![rect(11, 24.0, 16.0)],
        ..LayoutBundle::default()
    };

    let mut compiler = DirectCompiler::new();
    let mut store = ResourceGraphStore::new();
    apply_bundle(&mut compiler, &mut store, &bundle).expect("apply");

    let mut hal = RecordingHal::new();
    store.send(&mut hal).expect("send");
    let keys = hal.sent_keys();
    assert_eq!(keys[0], ResourceKey::name("b_5"));
    assert_eq!(
        &keys[1..],
        &[ResourceKey::Id(NodeId(11)), ResourceKey::Id(NodeId(10))]
    );
    assert_eq!(hal.roots, vec![NodeId(10)]);
}

#[test]
fn disjoint_flat_trees_get_a_virtual_root() {
    let bundle = LayoutBundle {
        translation_groups: vec![group(10, vec![11])],
        rects: vec![rect(11, 24.0, 16.0), rect(20, 4.0, 4.0)],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    let mut store = ResourceGraphStore::new();
    apply_bundle(&mut compiler, &mut store, &bundle).expect("apply");

    let mut hal = RecordingHal::new();
    store.send(&mut hal).expect("send");
    assert_eq!(hal.roots, vec![VIRTUAL_ROOT_ID]);
    let root = store.get(&VIRTUAL_ROOT_ID.into()).expect("virtual root");
    assert!(matches!(
        root,
        DirectNode::Group { children, .. } if *children == vec![NodeId(10), NodeId(20)]
    ));
}

#[test]
fn binding_for_a_color_resolves_like_scalars() {
    let mut r = rect(11, 24.0, 16.0);
    r.style.color = BindableColor::bound(3);
    let bundle = LayoutBundle {
        data_sources: vec![DataSourceRecord {
            name: 3,
            source: "watch.theme.accent".to_owned(),
        }],
        rects: vec![r],
        ..LayoutBundle::default()
    };
    let mut compiler = DirectCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");
    let DirectNode::Rect { style, .. } = &out[0].1 else {
        panic!("expected a rect");
    };
    assert_eq!(
        style.color,
        DirectValue::Source("watch.theme.accent".to_owned())
    );
}
