// SPDX-License-Identifier: Apache-2.0
//! Bundle-level behavior of the typed expression compiler: mapping
//! expansion, literal sharing, id stability, and error surfacing.

mod common;

use aod_core::{
    apply_bundle, compile_bundle, BindingPtr, CompileError, Emission, ExprBinaryOp, ExprCompiler,
    ExprNode, ExprUnaryOp, PrimitiveValue, ResourceGraphStore, ResourceKey, ValueType,
    SYSTEM_ID_BASE,
};
use aod_schema::{
    BindableF32, ConstantRecord, ConstantValue, DataSourceRecord, LayoutBundle, LinearMapping,
    MetricRecord, ModuloMapping, NumberFormatMapping, RangeMapping,
};
use common::{group, rect, simple_bundle, RecordingHal};

fn source(name: u32, path: &str) -> DataSourceRecord {
    DataSourceRecord {
        name,
        source: path.to_owned(),
    }
}

fn metric(name: u32, mapping: u32, bound_source: u32) -> MetricRecord {
    MetricRecord {
        name,
        mapping,
        bound_source,
    }
}

#[test]
fn recompiling_the_same_bundle_yields_identical_emissions() {
    let bundle = simple_bundle();
    let mut a = ExprCompiler::new();
    let mut b = ExprCompiler::new();
    let first = compile_bundle(&mut a, &bundle).expect("compile");
    let second = compile_bundle(&mut b, &bundle).expect("compile");
    assert_eq!(first, second);
}

#[test]
fn linear_mapping_expands_per_usage() {
    let bundle = LayoutBundle {
        data_sources: vec![source(3, "watch.battery.percent")],
        metrics: vec![metric(9, 7, 3)],
        linear_mappings: vec![LinearMapping {
            name: 7,
            m: 3.6,
            b: 0.0,
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");

    assert!(out
        .iter()
        .any(|(_, n)| matches!(n, ExprNode::Metric { target } if target == "watch.battery.percent")));
    let multiplies = out
        .iter()
        .filter(|(_, n)| matches!(n, ExprNode::BinaryOp { op: ExprBinaryOp::Multiply, .. }))
        .count();
    let adds = out
        .iter()
        .filter(|(_, n)| matches!(n, ExprNode::BinaryOp { op: ExprBinaryOp::Add, .. }))
        .count();
    assert_eq!((multiplies, adds), (1, 1));
    assert!(
        out.iter().all(|(k, _)| matches!(k, ResourceKey::Id(_))),
        "this schema keys everything by id"
    );
}

#[test]
fn two_usages_of_one_mapping_expand_twice_but_share_coefficients() {
    let bundle = LayoutBundle {
        data_sources: vec![source(3, "watch.minute"), source(4, "watch.hour")],
        metrics: vec![metric(9, 7, 3), metric(10, 7, 4)],
        linear_mappings: vec![LinearMapping {
            name: 7,
            m: 6.0,
            b: 0.0,
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");

    let adds = out
        .iter()
        .filter(|(_, n)| matches!(n, ExprNode::BinaryOp { op: ExprBinaryOp::Add, .. }))
        .count();
    assert_eq!(adds, 2, "one result node per usage");
    let slopes = out
        .iter()
        .filter(|(_, n)| {
            matches!(n, ExprNode::Primitive(PrimitiveValue::F32(v)) if v.to_bits() == 6.0_f32.to_bits())
        })
        .count();
    assert_eq!(slopes, 1, "the slope literal is shared");
}

#[test]
fn unused_mapping_definition_compiles_to_nothing() {
    let bundle = LayoutBundle {
        linear_mappings: vec![LinearMapping {
            name: 7,
            m: 1.0,
            b: 2.0,
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");
    assert!(out.is_empty());
}

#[test]
fn modulo_mapping_rounds_then_wraps() {
    let bundle = LayoutBundle {
        data_sources: vec![source(3, "watch.second")],
        metrics: vec![metric(9, 7, 3)],
        modulo_mappings: vec![ModuloMapping { name: 7, modulus: 60 }],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");

    assert!(out
        .iter()
        .any(|(_, n)| matches!(n, ExprNode::UnaryOp { op: ExprUnaryOp::Round, .. })));
    assert!(out
        .iter()
        .any(|(_, n)| matches!(n, ExprNode::BinaryOp { op: ExprBinaryOp::Modulo, .. })));
    assert!(out
        .iter()
        .any(|(_, n)| matches!(n, ExprNode::Primitive(PrimitiveValue::I32(60)))));
}

#[test]
fn number_format_emits_descriptor_and_per_usage_format_ops() {
    let bundle = LayoutBundle {
        data_sources: vec![source(3, "watch.battery.percent")],
        metrics: vec![metric(9, 6, 3)],
        number_formats: vec![NumberFormatMapping {
            name: 6,
            grouping: false,
            min_fraction_digits: 0,
            max_fraction_digits: 0,
            min_integer_digits: 1,
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");

    assert!(out
        .iter()
        .any(|(_, n)| matches!(n, ExprNode::NumberFormat { .. })));
    assert!(out
        .iter()
        .any(|(_, n)| matches!(n, ExprNode::BinaryOp { op: ExprBinaryOp::FormatText, .. })));
}

fn find_binary(out: &[Emission<ExprNode>], wanted: ExprBinaryOp) -> (ResourceKey, BindingPtr, BindingPtr) {
    out.iter()
        .find_map(|(k, n)| match n {
            ExprNode::BinaryOp { op, arg1, arg2 } if *op == wanted => {
                Some((k.clone(), *arg1, *arg2))
            }
            _ => None,
        })
        .expect("binary op present")
}

#[test]
fn chained_mapping_argument_carries_the_known_upstream_type() {
    // A linear mapping's result feeds a range mapping whose outputs are
    // integer constants. By the time the range expands, the upstream
    // result and the constants are compiled, so both the argument pointer
    // and the select chain resolve to their known types.
    let bundle = LayoutBundle {
        data_sources: vec![source(3, "watch.battery.percent")],
        constants: vec![
            ConstantRecord {
                name: 100,
                value: ConstantValue::I32(4),
            },
            ConstantRecord {
                name: 101,
                value: ConstantValue::I32(8),
            },
        ],
        metrics: vec![metric(9, 7, 3), metric(15, 8, 9)],
        linear_mappings: vec![LinearMapping {
            name: 7,
            m: 0.5,
            b: 1.0,
        }],
        range_mappings: vec![RangeMapping {
            name: 8,
            thresholds: vec![30.0],
            values: vec![100, 101],
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");

    // The compare's input is the linear result node, typed as such.
    let (add_key, _, _) = find_binary(&out, ExprBinaryOp::Add);
    let (_, compare_arg, _) = find_binary(&out, ExprBinaryOp::LessThan);
    assert_eq!(ResourceKey::Id(compare_arg.id), add_key);
    assert_eq!(compare_arg.ty, ValueType::Float);

    // The select chain carries the constants' type.
    let select = out
        .iter()
        .find_map(|(_, n)| match n {
            ExprNode::TernaryOp { arg2, arg3, .. } => Some((*arg2, *arg3)),
            _ => None,
        })
        .expect("select present");
    assert_eq!(select.0.ty, ValueType::Int32);
    assert_eq!(select.1.ty, ValueType::Int32);
}

#[test]
fn chained_mapping_forward_reference_falls_back_to_float() {
    // Here the range consumes a modulo result, but modulo definitions
    // compile after range definitions: the argument is a forward
    // reference and degrades to the float default, while the ids still
    // line up once the upstream node is emitted.
    let bundle = LayoutBundle {
        data_sources: vec![source(3, "watch.second")],
        metrics: vec![metric(9, 5, 3), metric(15, 8, 9)],
        range_mappings: vec![RangeMapping {
            name: 8,
            thresholds: vec![30.0],
            values: vec![100, 101],
        }],
        modulo_mappings: vec![ModuloMapping { name: 5, modulus: 60 }],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");

    let (_, compare_arg, _) = find_binary(&out, ExprBinaryOp::LessThan);
    assert_eq!(compare_arg.ty, ValueType::Float, "forward reference falls back");

    // The modulo result lands on the very id the range already points at.
    let (modulo_key, _, _) = find_binary(&out, ExprBinaryOp::Modulo);
    assert_eq!(modulo_key, ResourceKey::Id(compare_arg.id));

    // Unresolvable output names degrade to float as well.
    let select = out
        .iter()
        .find_map(|(_, n)| match n {
            ExprNode::TernaryOp { arg2, .. } => Some(*arg2),
            _ => None,
        })
        .expect("select present");
    assert_eq!(select.ty, ValueType::Float);
}

#[test]
fn duplicate_data_source_declarations_collapse() {
    let bundle = LayoutBundle {
        data_sources: vec![source(3, "watch.minute"), source(3, "watch.minute")],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    let out = compile_bundle(&mut compiler, &bundle).expect("compile");
    assert_eq!(out.len(), 1);
}

#[test]
fn string_constants_are_not_expressible() {
    let bundle = LayoutBundle {
        constants: vec![ConstantRecord {
            name: 5,
            value: ConstantValue::Utf8("--".to_owned()),
        }],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    assert!(matches!(
        compile_bundle(&mut compiler, &bundle),
        Err(CompileError::Unsupported { schema: "expr", .. })
    ));
}

#[test]
fn structural_ids_in_the_system_window_abort_the_pass() {
    let bundle = LayoutBundle {
        rects: vec![rect(SYSTEM_ID_BASE + 1, 4.0, 4.0)],
        ..LayoutBundle::default()
    };
    let mut compiler = ExprCompiler::new();
    assert!(matches!(
        compile_bundle(&mut compiler, &bundle),
        Err(CompileError::IdOutOfRange { .. })
    ));
}

#[test]
fn compiled_layout_forms_a_sendable_graph() {
    // A small watch-face slice: battery percent drives a rect's width
    // through a linear mapping; the rect sits in one group.
    let bundle = LayoutBundle {
        data_sources: vec![source(3, "watch.battery.percent")],
        metrics: vec![metric(9, 7, 3)],
        linear_mappings: vec![LinearMapping {
            name: 7,
            m: 0.96,
            b: 0.0,
        }],
        translation_groups: vec![group(10, vec![11])],
        rects: vec![{
            let mut r = rect(11, 0.0, 8.0);
            r.width = BindableF32::bound(9);
            r
        }],
        ..LayoutBundle::default()
    };

    let mut compiler = ExprCompiler::new();
    let mut store = ResourceGraphStore::new();
    apply_bundle(&mut compiler, &mut store, &bundle).expect("apply");

    let mut hal = RecordingHal::new();
    store.send(&mut hal).expect("send");
    assert_eq!(hal.sent.len(), store.len());
    assert_eq!(hal.roots.len(), 1);
}
