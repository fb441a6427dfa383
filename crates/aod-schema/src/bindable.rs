// SPDX-License-Identifier: Apache-2.0
//! Bindable scalar wrappers.
//!
//! A bindable field carries either a literal value or the client-side id of a
//! named data binding. At most one of the two is meaningful: when `binding`
//! is set, `value` is ignored by both compilers.

/// A float field that is either a literal or a live binding.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindableF32 {
    /// Literal value, used when `binding` is `None`.
    pub value: f32,
    /// Client-side binding id, when the field tracks a data source.
    pub binding: Option<u32>,
}

impl BindableF32 {
    /// Literal float.
    pub fn literal(value: f32) -> Self {
        Self {
            value,
            binding: None,
        }
    }

    /// Live binding to the data source registered under `binding`.
    pub fn bound(binding: u32) -> Self {
        Self {
            value: 0.0,
            binding: Some(binding),
        }
    }
}

/// An ARGB color field that is either a literal or a live binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindableColor {
    /// Packed ARGB literal, used when `binding` is `None`.
    pub value: u32,
    /// Client-side binding id, when the field tracks a data source.
    pub binding: Option<u32>,
}

impl BindableColor {
    /// Literal packed ARGB color.
    pub fn literal(value: u32) -> Self {
        Self {
            value,
            binding: None,
        }
    }

    /// Live binding to the data source registered under `binding`.
    pub fn bound(binding: u32) -> Self {
        Self {
            value: 0,
            binding: Some(binding),
        }
    }
}

/// A boolean field that is either a literal or a live binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindableBool {
    /// Literal value, used when `binding` is `None`.
    pub value: bool,
    /// Client-side binding id, when the field tracks a data source.
    pub binding: Option<u32>,
}

impl BindableBool {
    /// Literal boolean.
    pub fn literal(value: bool) -> Self {
        Self {
            value,
            binding: None,
        }
    }

    /// Live binding to the data source registered under `binding`.
    pub fn bound(binding: u32) -> Self {
        Self {
            value: false,
            binding: Some(binding),
        }
    }
}

impl Default for BindableBool {
    /// Visible by default.
    fn default() -> Self {
        Self::literal(true)
    }
}
