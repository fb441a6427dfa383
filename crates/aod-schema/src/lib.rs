// SPDX-License-Identifier: Apache-2.0
//! aod-schema: declarative layout records for the display offload compiler.
//!
//! These are the already-deserialized, fully-typed inputs of one compile
//! session: structural resources (groups, shapes, text, bitmaps, fonts),
//! value plumbing (data sources, metrics, constants), reusable scalar
//! mappings, and raw expression operations. How a bundle reaches this crate
//! (binder, wire format, test fixture) is out of scope; the compiler in
//! `aod-core` only ever sees these types.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod bindable;
mod bundle;
mod mapping;
mod op;
mod record;

pub use bindable::{BindableBool, BindableColor, BindableF32};
pub use bundle::{LayoutBundle, RecordRef};
pub use mapping::{LinearMapping, ModuloMapping, NumberFormatMapping, RangeMapping};
pub use op::{
    BinaryOpKind, BinaryOpRecord, OperandRef, TernaryOpKind, TernaryOpRecord, UnaryOpKind,
    UnaryOpRecord, ValueTypeTag,
};
pub use record::{
    ArcRecord, BitmapRecord, BlendMode, ConstantRecord, ConstantValue, CustomRecord,
    DataSourceRecord, DynamicTextRecord, EndCap, FillStyle, FontRecord, KeyValue, KvValue,
    LineRecord, MetricRecord, PixelFormat, RectRecord, RotationGroupRecord, RoundRectRecord,
    ShapeStyle, StaticTextRecord, StringTemplateRecord, TextAlign, TextStyle,
    TranslationGroupRecord,
};
