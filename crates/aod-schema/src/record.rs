// SPDX-License-Identifier: Apache-2.0
//! Structural resource records and value plumbing records.
//!
//! Structural records carry a client-chosen `id` and become id-keyed nodes in
//! the compiled graph. Value records (`DataSourceRecord`, `MetricRecord`,
//! `ConstantRecord`) carry a client-chosen `name` and are referenced by name
//! rather than by structural id.

use bytes::Bytes;

use crate::bindable::{BindableBool, BindableColor, BindableF32};

/// Paint style shared by all shape records.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeStyle {
    /// Shape color.
    pub color: BindableColor,
    /// Stroke width in pixels; ignored for filled shapes.
    pub stroke_width: f32,
    /// Fill or stroke rendering.
    pub fill: FillStyle,
    /// Compositing mode.
    pub blend: BlendMode,
}

/// Whether a shape is filled or stroked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillStyle {
    /// Fill the shape interior.
    Fill,
    /// Stroke the shape outline.
    Stroke,
}

/// Compositing mode for shapes and bitmaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    /// Replace destination pixels.
    Src,
    /// Standard source-over alpha compositing.
    SrcOver,
}

/// End-cap style for arc strokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndCap {
    /// Flat cap at the arc end.
    Butt,
    /// Rounded cap.
    Round,
    /// Square cap extending past the arc end.
    Square,
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlign {
    /// Align glyph run to the left edge.
    Left,
    /// Center the glyph run.
    Center,
    /// Align glyph run to the right edge.
    Right,
}

/// Text styling shared by static and dynamic text records.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    /// Text color.
    pub color: BindableColor,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Structural id of the font resource to render with.
    pub font: u32,
    /// Font size in pixels.
    pub font_size: f32,
}

/// A group that translates its children by a fixed or bound offset.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranslationGroupRecord {
    /// Structural id.
    pub id: u32,
    /// Structural ids of the children, in paint order.
    pub contents: Vec<u32>,
    /// Horizontal offset.
    pub offset_x: BindableF32,
    /// Vertical offset.
    pub offset_y: BindableF32,
    /// Group visibility.
    pub visibility: BindableBool,
}

/// A group that rotates its children around a pivot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RotationGroupRecord {
    /// Structural id.
    pub id: u32,
    /// Structural ids of the children, in paint order.
    pub contents: Vec<u32>,
    /// Pivot x coordinate.
    pub pivot_x: BindableF32,
    /// Pivot y coordinate.
    pub pivot_y: BindableF32,
    /// Rotation angle in degrees.
    pub angle_deg: BindableF32,
    /// Group visibility.
    pub visibility: BindableBool,
}

/// Axis-aligned rectangle shape.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectRecord {
    /// Structural id.
    pub id: u32,
    /// Rectangle width.
    pub width: BindableF32,
    /// Rectangle height.
    pub height: BindableF32,
    /// Shape visibility.
    pub visibility: BindableBool,
    /// Paint style.
    pub style: ShapeStyle,
}

/// Rounded rectangle shape.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundRectRecord {
    /// Structural id.
    pub id: u32,
    /// Rectangle width.
    pub width: BindableF32,
    /// Rectangle height.
    pub height: BindableF32,
    /// Corner radius.
    pub corner_radius: BindableF32,
    /// Shape visibility.
    pub visibility: BindableBool,
    /// Paint style.
    pub style: ShapeStyle,
}

/// Line segment from the local origin to an end point.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineRecord {
    /// Structural id.
    pub id: u32,
    /// End point x coordinate.
    pub end_x: BindableF32,
    /// End point y coordinate.
    pub end_y: BindableF32,
    /// Shape visibility.
    pub visibility: BindableBool,
    /// Paint style.
    pub style: ShapeStyle,
}

/// Elliptical arc within a bounding box.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcRecord {
    /// Structural id.
    pub id: u32,
    /// Bounding box width.
    pub width: BindableF32,
    /// Bounding box height.
    pub height: BindableF32,
    /// Start angle in degrees.
    pub start_deg: BindableF32,
    /// Sweep angle in degrees.
    pub sweep_deg: BindableF32,
    /// Shape visibility.
    pub visibility: BindableBool,
    /// Paint style.
    pub style: ShapeStyle,
    /// Stroke end-cap style.
    pub end_cap: EndCap,
}

/// Fixed string rendered with a font resource.
///
/// `style` is required; a record without it fails conversion.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticTextRecord {
    /// Structural id.
    pub id: u32,
    /// The string to render.
    pub value: String,
    /// Text styling; absent means the record is malformed.
    pub style: Option<TextStyle>,
    /// Text visibility.
    pub visibility: BindableBool,
}

/// Text whose content tracks a named binding.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicTextRecord {
    /// Structural id.
    pub id: u32,
    /// Binding id of the string-producing source.
    pub binding: u32,
    /// Text styling; absent means the record is malformed.
    pub style: Option<TextStyle>,
    /// Text visibility.
    pub visibility: BindableBool,
}

/// Pixel format of a pre-decoded bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    /// 8-bit alpha mask.
    Alpha8,
    /// 16-bit RGB.
    Rgb565,
    /// 32-bit RGBA.
    Rgba8888,
}

/// Pre-decoded bitmap resource.
///
/// Decoding from icons/drawables happens at the input boundary; this core
/// only sees raw pixel rows.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitmapRecord {
    /// Structural id.
    pub id: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout of `pixels`.
    pub format: PixelFormat,
    /// Bytes per pixel row.
    pub row_bytes: u32,
    /// Raw pixel data, `row_bytes * height` bytes.
    pub pixels: Bytes,
    /// Bitmap visibility.
    pub visibility: BindableBool,
    /// Tint color.
    pub color: BindableColor,
    /// Compositing mode.
    pub blend: BlendMode,
}

/// Raw TrueType font bytes.
///
/// Glyph subsetting is an external preprocessing step; by the time a bundle
/// is compiled the `ttf` payload is already usable by the target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontRecord {
    /// Structural id.
    pub id: u32,
    /// Font file bytes.
    pub ttf: Bytes,
}

/// Format-string resource combining several named sources (flat schema only).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StringTemplateRecord {
    /// Client-side name.
    pub name: u32,
    /// printf-style format string.
    pub format: String,
    /// Binding ids substituted into the format string, in order.
    pub sources: Vec<u32>,
}

/// Opaque vendor extension resource forwarded to the target untouched.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomRecord {
    /// Structural id.
    pub id: u32,
    /// Key/value payload; absent means the record is malformed.
    pub key_values: Option<Vec<KeyValue>>,
}

/// One key/value entry of a custom resource.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyValue {
    /// Entry key.
    pub key: String,
    /// Entry value.
    pub value: KvValue,
}

/// Value of a custom resource entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KvValue {
    /// 32-bit integer value.
    I32(i32),
    /// Float value.
    F32(f32),
    /// String value.
    Utf8(String),
    /// Opaque bytes.
    Blob(Bytes),
}

/// Declares a named external data source (a variable leaf of the graph).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataSourceRecord {
    /// Client-side name other records bind against.
    pub name: u32,
    /// Target-side data source path, e.g. `"watch.battery.percent"`.
    pub source: String,
}

/// Applies a named mapping to a bound data source, producing a new value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricRecord {
    /// Name of the produced value.
    pub name: u32,
    /// Name of the mapping definition to apply.
    pub mapping: u32,
    /// Name of the input value (a data source or another metric).
    pub bound_source: u32,
}

/// A named constant value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstantRecord {
    /// Client-side name.
    pub name: u32,
    /// Constant payload.
    pub value: ConstantValue,
}

/// Payload of a [`ConstantRecord`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstantValue {
    /// Float constant.
    F32(f32),
    /// Integer constant.
    I32(i32),
    /// String constant (flat schema only).
    Utf8(String),
    /// Unrecognized payload; compilers substitute integer zero.
    None,
}
