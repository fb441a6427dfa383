// SPDX-License-Identifier: Apache-2.0
//! Reusable scalar mapping definitions.
//!
//! A mapping is a pure function from one scalar to a scalar or string. It is
//! not itself a graph node: each `(mapping, data source)` usage declared by a
//! [`crate::MetricRecord`] expands the definition into concrete operation
//! nodes at compile time. A mapping with no usages compiles to nothing.

/// `y = m * x + b`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearMapping {
    /// Client-side name metrics refer to.
    pub name: u32,
    /// Slope.
    pub m: f32,
    /// Intercept.
    pub b: f32,
}

/// Threshold lookup: picks `values[i]` for the first threshold the input is
/// below, `values[len]` otherwise.
///
/// Invariant: `values.len() == thresholds.len() + 1`. The values are names of
/// other graph values (constants or metric results), which makes range
/// mappings chainable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeMapping {
    /// Client-side name metrics refer to.
    pub name: u32,
    /// Ascending decision thresholds.
    pub thresholds: Vec<f32>,
    /// Names of the output values, one more than `thresholds`.
    pub values: Vec<u32>,
}

/// `y = round(x) mod modulus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuloMapping {
    /// Client-side name metrics refer to.
    pub name: u32,
    /// Modulus applied after rounding to integer.
    pub modulus: i32,
}

/// Locale-aware number-to-string formatting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberFormatMapping {
    /// Client-side name metrics refer to.
    pub name: u32,
    /// Whether to insert grouping separators.
    pub grouping: bool,
    /// Minimum fraction digits to print.
    pub min_fraction_digits: u8,
    /// Maximum fraction digits to print.
    pub max_fraction_digits: u8,
    /// Minimum integer digits to print.
    pub min_integer_digits: u8,
}
