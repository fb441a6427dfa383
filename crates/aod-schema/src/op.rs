// SPDX-License-Identifier: Apache-2.0
//! Raw expression operation records.
//!
//! Operation records reference their operands by client-side name plus a
//! declared value type. The typed-pointer schema compiles them into
//! expression nodes directly; the flat schema lowers the unary kinds it can
//! express into builtin mapping/metric pairs and skips the rest.

/// Declared runtime type of an operand reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueTypeTag {
    /// 32-bit float.
    Float,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

/// A typed reference to another named value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperandRef {
    /// Client-side name of the referenced value.
    pub name: u32,
    /// Declared type of the referenced value.
    pub ty: ValueTypeTag,
}

/// Unary operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOpKind {
    /// Round half away from zero to integer.
    Round,
    /// Round up.
    Ceil,
    /// Round down.
    Floor,
    /// `1 / x`.
    Reciprocal,
}

/// Binary operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOpKind {
    /// `a + b`.
    Add,
    /// `a - b`.
    Subtract,
    /// `a * b`.
    Multiply,
    /// `a / b`.
    Divide,
    /// `a mod b`.
    Modulo,
    /// `a < b`.
    LessThan,
}

/// Ternary operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TernaryOpKind {
    /// `if a then b else c`.
    IfElse,
}

/// A named unary operation over another value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnaryOpRecord {
    /// Name of the produced value.
    pub name: u32,
    /// Operation kind.
    pub op: UnaryOpKind,
    /// Input operand.
    pub operand: OperandRef,
}

/// A named binary operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryOpRecord {
    /// Name of the produced value.
    pub name: u32,
    /// Operation kind.
    pub op: BinaryOpKind,
    /// First operand.
    pub arg1: OperandRef,
    /// Second operand.
    pub arg2: OperandRef,
}

/// A named ternary operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TernaryOpRecord {
    /// Name of the produced value.
    pub name: u32,
    /// Operation kind.
    pub op: TernaryOpKind,
    /// First operand (the condition for `IfElse`).
    pub arg1: OperandRef,
    /// Second operand.
    pub arg2: OperandRef,
    /// Third operand.
    pub arg3: OperandRef,
}
