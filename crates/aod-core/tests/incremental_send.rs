// SPDX-License-Identifier: Apache-2.0
//! Incremental sync: only changed nodes go over the wire, failed passes stay
//! dirty, reconnects replay everything.

mod common;

use aod_core::{
    apply_bundle, ExprCompiler, ExprNode, ResourceGraphStore, ResourceKey, SendError, Status,
};
use aod_schema::{BindableF32, LayoutBundle};
use common::{rect, simple_bundle, RecordingHal};

fn compiled_store() -> (ExprCompiler, ResourceGraphStore<ExprNode>) {
    let mut compiler = ExprCompiler::new();
    let mut store = ResourceGraphStore::new();
    apply_bundle(&mut compiler, &mut store, &simple_bundle()).expect("apply");
    (compiler, store)
}

#[test]
fn unchanged_bundle_sends_nothing_but_the_root() {
    let (mut compiler, mut store) = compiled_store();
    let mut hal = RecordingHal::new();
    store.send(&mut hal).expect("first send");
    let first_pass = hal.sent.len();
    assert!(first_pass > 0);

    // Same layout again: every emission is structurally equal.
    apply_bundle(&mut compiler, &mut store, &simple_bundle()).expect("reapply");
    store.send(&mut hal).expect("second send");
    assert_eq!(hal.sent.len(), first_pass, "no node resent");
    assert_eq!(hal.roots.len(), 2, "root is redeclared each pass");
}

#[test]
fn a_single_field_change_resends_one_node() {
    let (mut compiler, mut store) = compiled_store();
    let mut hal = RecordingHal::new();
    store.send(&mut hal).expect("first send");
    hal.sent.clear();

    // Widen the rect. The literal's node id is stable across sessions, so
    // the rect's width pointer does not change and the rect itself stays
    // clean; only the primitive node carries the new value.
    let mut bundle = simple_bundle();
    bundle.rects[0].width = BindableF32::literal(48.0);
    apply_bundle(&mut compiler, &mut store, &bundle).expect("reapply");
    store.send(&mut hal).expect("second send");

    let resent = hal.sent_keys();
    assert_eq!(resent.len(), 1, "only the width literal: {resent:?}");
}

#[test]
fn mark_all_dirty_replays_the_full_graph() {
    let (_, mut store) = compiled_store();
    let mut hal = RecordingHal::new();
    store.send(&mut hal).expect("first send");
    let full = hal.sent_keys();
    hal.sent.clear();

    // Reconnect path: same nodes, same order.
    store.mark_all_dirty();
    store.send(&mut hal).expect("replay");
    assert_eq!(hal.sent_keys(), full);
}

#[test]
fn rejected_send_keeps_everything_dirty() {
    let (_, mut store) = compiled_store();
    let mut hal = RecordingHal::new();
    hal.reject_at = Some((2, Status::Busy));

    let err = store.send(&mut hal).expect_err("third call rejected");
    assert!(matches!(err, SendError::Rejected { status: Status::Busy, .. }));
    let delivered = hal.sent.len();

    // Retry with a healthy target: the whole pass is replayed.
    hal.reject_at = None;
    hal.sent.clear();
    store.send(&mut hal).expect("retry");
    assert!(hal.sent.len() > delivered);

    // And now everything is clean.
    hal.sent.clear();
    store.send(&mut hal).expect("steady state");
    assert!(hal.sent.is_empty());
}

#[test]
fn transport_failure_surfaces_and_preserves_dirty_state() {
    let (_, mut store) = compiled_store();
    let mut hal = RecordingHal::new();
    hal.disconnected = true;
    assert!(matches!(store.send(&mut hal), Err(SendError::Transport(_))));

    hal.disconnected = false;
    store.send(&mut hal).expect("send after reconnect");
    assert!(!hal.sent.is_empty());
}

#[test]
fn empty_store_sends_nothing_and_declares_no_root() {
    let mut store: ResourceGraphStore<ExprNode> = ResourceGraphStore::new();
    let mut hal = RecordingHal::new();
    store.send(&mut hal).expect("empty send");
    assert!(hal.sent.is_empty());
    assert!(hal.roots.is_empty());
}

#[test]
fn empty_bundle_applies_the_placeholder_layout() {
    let mut compiler = ExprCompiler::new();
    let mut store = ResourceGraphStore::new();
    let applied = apply_bundle(&mut compiler, &mut store, &LayoutBundle::default())
        .expect("apply empty");
    assert_eq!(applied, 1);

    let mut hal = RecordingHal::new();
    store.send(&mut hal).expect("send placeholder");
    assert_eq!(hal.sent.len(), 1);
    assert_eq!(hal.roots.len(), 1);
}

#[test]
fn growing_the_layout_reaches_steady_state_after_one_pass() {
    let (mut compiler, mut store) = compiled_store();
    let mut hal = RecordingHal::new();
    store.send(&mut hal).expect("first send");
    hal.sent.clear();

    // Add a second rect under the same group. The new child shifts fresh-id
    // allocation for the session, so more than just the subtree resends,
    // but the pass converges: a further identical apply sends nothing.
    let mut bundle = simple_bundle();
    bundle.rects.push(rect(12, 8.0, 8.0));
    bundle.translation_groups[0].contents.push(12);
    apply_bundle(&mut compiler, &mut store, &bundle).expect("reapply");
    store.send(&mut hal).expect("second send");

    let resent = hal.sent_keys();
    assert!(!resent.is_empty());
    let root = store.root_id().expect("order").expect("root");
    assert_eq!(resent.last(), Some(&ResourceKey::Id(root)));

    hal.sent.clear();
    apply_bundle(&mut compiler, &mut store, &bundle).expect("third apply");
    store.send(&mut hal).expect("third send");
    assert!(hal.sent.is_empty(), "steady state after one pass");
}
