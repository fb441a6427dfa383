// SPDX-License-Identifier: Apache-2.0
//! Core node-model types shared by both schema targets.

use std::hash::{Hash, Hasher};

use crate::ident::NodeId;

/// Runtime type of a value produced by a graph node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ValueType {
    /// 32-bit float.
    Float,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer (colors).
    Uint32,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Number-format descriptor.
    NumberFormat,
}

/// A typed reference from one node's field to another node's output.
///
/// Invariant: once the target resolves, its runtime value type matches `ty`.
/// Mismatches are compiler logic errors; the store never checks them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BindingPtr {
    /// Referenced node.
    pub id: NodeId,
    /// Declared type of the referenced output.
    pub ty: ValueType,
}

impl BindingPtr {
    /// Builds a pointer to `id` producing `ty`.
    #[must_use]
    pub fn new(id: NodeId, ty: ValueType) -> Self {
        Self { id, ty }
    }
}

/// A literal value materialized as a primitive node.
///
/// Equality and hashing are bit-exact per variant, so the compile-session
/// dedup cache keys by `(type tag, value)` and an `I32(0)` can never alias an
/// `F32(0.0)`.
#[derive(Clone, Copy, Debug)]
pub enum PrimitiveValue {
    /// Float literal.
    F32(f32),
    /// Signed integer literal.
    I32(i32),
    /// Unsigned integer literal (colors).
    U32(u32),
    /// Boolean literal.
    Bool(bool),
}

impl PrimitiveValue {
    /// Runtime type this primitive produces.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::F32(_) => ValueType::Float,
            Self::I32(_) => ValueType::Int32,
            Self::U32(_) => ValueType::Uint32,
            Self::Bool(_) => ValueType::Bool,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::F32(_) => 0,
            Self::I32(_) => 1,
            Self::U32(_) => 2,
            Self::Bool(_) => 3,
        }
    }
}

impl PartialEq for PrimitiveValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PrimitiveValue {}

impl Hash for PrimitiveValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.tag());
        match self {
            Self::F32(v) => state.write_u32(v.to_bits()),
            Self::I32(v) => state.write_i32(*v),
            Self::U32(v) => state.write_u32(*v),
            Self::Bool(v) => state.write_u8(u8::from(*v)),
        }
    }
}

/// The seam between the store and a schema's node payloads.
///
/// The store is payload-agnostic: it only needs the outgoing references of a
/// node (edges are derived, never stored) and a way to synthesize the
/// virtual-root group when the graph has several roots.
pub trait GraphNode: Clone + PartialEq {
    /// Structural ids this node references; children come back in field
    /// order. Variable nodes are leaves by construction and return nothing.
    fn references(&self) -> Vec<NodeId>;

    /// Builds the synthetic root group whose children are `children`.
    #[must_use]
    fn synthetic_root(children: Vec<NodeId>) -> Self;
}
