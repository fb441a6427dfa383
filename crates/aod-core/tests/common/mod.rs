// SPDX-License-Identifier: Apache-2.0
#![allow(dead_code)]

use aod_core::{HalTransport, NodeId, ResourceKey, Status, TransportError};
use aod_schema::{
    BindableBool, BindableColor, BindableF32, BlendMode, FillStyle, LayoutBundle, RectRecord,
    ShapeStyle, TranslationGroupRecord,
};

/// Mock target that records every call, with optional failure injection.
pub struct RecordingHal<N> {
    /// Successfully delivered nodes, in call order.
    pub sent: Vec<(ResourceKey, N)>,
    /// Every root declaration, in call order.
    pub roots: Vec<NodeId>,
    /// Number of reset calls.
    pub resets: usize,
    /// Reject the nth send call (0-based) with this status.
    pub reject_at: Option<(usize, Status)>,
    /// Fail every call at the transport level.
    pub disconnected: bool,
    calls: usize,
}

impl<N> RecordingHal<N> {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            roots: Vec::new(),
            resets: 0,
            reject_at: None,
            disconnected: false,
            calls: 0,
        }
    }

    /// Keys of every delivered node, in call order.
    pub fn sent_keys(&self) -> Vec<ResourceKey> {
        self.sent.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl<N> Default for RecordingHal<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone> HalTransport<N> for RecordingHal<N> {
    fn send(&mut self, key: &ResourceKey, node: &N) -> Result<Status, TransportError> {
        if self.disconnected {
            return Err(TransportError::Disconnected);
        }
        let call = self.calls;
        self.calls += 1;
        if let Some((at, status)) = self.reject_at {
            if call == at {
                return Ok(status);
            }
        }
        self.sent.push((key.clone(), node.clone()));
        Ok(Status::Ok)
    }

    fn set_root(&mut self, id: NodeId) -> Result<Status, TransportError> {
        if self.disconnected {
            return Err(TransportError::Disconnected);
        }
        self.roots.push(id);
        Ok(Status::Ok)
    }

    fn reset(&mut self) {
        self.sent.clear();
        self.roots.clear();
        self.resets += 1;
    }
}

pub fn plain_style() -> ShapeStyle {
    ShapeStyle {
        color: BindableColor::literal(0xFF00_0000),
        stroke_width: 0.0,
        fill: FillStyle::Fill,
        blend: BlendMode::SrcOver,
    }
}

pub fn rect(id: u32, width: f32, height: f32) -> RectRecord {
    RectRecord {
        id,
        width: BindableF32::literal(width),
        height: BindableF32::literal(height),
        visibility: BindableBool::literal(true),
        style: plain_style(),
    }
}

pub fn group(id: u32, contents: Vec<u32>) -> TranslationGroupRecord {
    TranslationGroupRecord {
        id,
        contents,
        offset_x: BindableF32::literal(0.0),
        offset_y: BindableF32::literal(0.0),
        visibility: BindableBool::literal(true),
    }
}

/// A small one-group, one-shape layout.
pub fn simple_bundle() -> LayoutBundle {
    LayoutBundle {
        translation_groups: vec![group(10, vec![11])],
        rects: vec![rect(11, 24.0, 16.0)],
        ..LayoutBundle::default()
    }
}
