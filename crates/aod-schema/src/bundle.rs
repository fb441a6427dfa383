// SPDX-License-Identifier: Apache-2.0
//! The full declarative input of one compile session.

use crate::mapping::{LinearMapping, ModuloMapping, NumberFormatMapping, RangeMapping};
use crate::op::{BinaryOpRecord, TernaryOpRecord, UnaryOpRecord};
use crate::record::{
    ArcRecord, BitmapRecord, ConstantRecord, CustomRecord, DataSourceRecord, DynamicTextRecord,
    FontRecord, LineRecord, MetricRecord, RectRecord, RotationGroupRecord, RoundRectRecord,
    StaticTextRecord, StringTemplateRecord, TranslationGroupRecord,
};

/// A borrowed view of any record kind, used as the compiler dispatch unit.
#[derive(Clone, Copy, Debug)]
pub enum RecordRef<'a> {
    /// Translation group.
    TranslationGroup(&'a TranslationGroupRecord),
    /// Rotation group.
    RotationGroup(&'a RotationGroupRecord),
    /// Rectangle shape.
    Rect(&'a RectRecord),
    /// Rounded rectangle shape.
    RoundRect(&'a RoundRectRecord),
    /// Line shape.
    Line(&'a LineRecord),
    /// Arc shape.
    Arc(&'a ArcRecord),
    /// Static text.
    StaticText(&'a StaticTextRecord),
    /// Dynamic text.
    DynamicText(&'a DynamicTextRecord),
    /// Bitmap resource.
    Bitmap(&'a BitmapRecord),
    /// Font resource.
    Font(&'a FontRecord),
    /// Format-string resource.
    StringTemplate(&'a StringTemplateRecord),
    /// Vendor extension resource.
    Custom(&'a CustomRecord),
    /// Named data source.
    DataSource(&'a DataSourceRecord),
    /// Mapping usage.
    Metric(&'a MetricRecord),
    /// Named constant.
    Constant(&'a ConstantRecord),
    /// Linear mapping definition.
    Linear(&'a LinearMapping),
    /// Range mapping definition.
    Range(&'a RangeMapping),
    /// Modulo mapping definition.
    Modulo(&'a ModuloMapping),
    /// Number-format mapping definition.
    NumberFormat(&'a NumberFormatMapping),
    /// Unary expression operation.
    UnaryOp(&'a UnaryOpRecord),
    /// Binary expression operation.
    BinaryOp(&'a BinaryOpRecord),
    /// Ternary expression operation.
    TernaryOp(&'a TernaryOpRecord),
}

impl RecordRef<'_> {
    /// Short human-readable kind label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TranslationGroup(_) => "translation-group",
            Self::RotationGroup(_) => "rotation-group",
            Self::Rect(_) => "rect",
            Self::RoundRect(_) => "round-rect",
            Self::Line(_) => "line",
            Self::Arc(_) => "arc",
            Self::StaticText(_) => "static-text",
            Self::DynamicText(_) => "dynamic-text",
            Self::Bitmap(_) => "bitmap",
            Self::Font(_) => "font",
            Self::StringTemplate(_) => "string-template",
            Self::Custom(_) => "custom",
            Self::DataSource(_) => "data-source",
            Self::Metric(_) => "metric",
            Self::Constant(_) => "constant",
            Self::Linear(_) => "linear-mapping",
            Self::Range(_) => "range-mapping",
            Self::Modulo(_) => "modulo-mapping",
            Self::NumberFormat(_) => "number-format-mapping",
            Self::UnaryOp(_) => "unary-op",
            Self::BinaryOp(_) => "binary-op",
            Self::TernaryOp(_) => "ternary-op",
        }
    }
}

/// One complete declarative layout: the typed, named collections handed to a
/// compile session.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutBundle {
    /// Translation groups.
    pub translation_groups: Vec<TranslationGroupRecord>,
    /// Rotation groups.
    pub rotation_groups: Vec<RotationGroupRecord>,
    /// Rectangle shapes.
    pub rects: Vec<RectRecord>,
    /// Rounded rectangle shapes.
    pub round_rects: Vec<RoundRectRecord>,
    /// Line shapes.
    pub lines: Vec<LineRecord>,
    /// Arc shapes.
    pub arcs: Vec<ArcRecord>,
    /// Static text resources.
    pub static_texts: Vec<StaticTextRecord>,
    /// Dynamic text resources.
    pub dynamic_texts: Vec<DynamicTextRecord>,
    /// Bitmap resources.
    pub bitmaps: Vec<BitmapRecord>,
    /// Font resources.
    pub fonts: Vec<FontRecord>,
    /// Format-string resources.
    pub string_templates: Vec<StringTemplateRecord>,
    /// Vendor extension resources.
    pub customs: Vec<CustomRecord>,
    /// Named data sources.
    pub data_sources: Vec<DataSourceRecord>,
    /// Mapping usages.
    pub metrics: Vec<MetricRecord>,
    /// Named constants.
    pub constants: Vec<ConstantRecord>,
    /// Linear mapping definitions.
    pub linear_mappings: Vec<LinearMapping>,
    /// Range mapping definitions.
    pub range_mappings: Vec<RangeMapping>,
    /// Modulo mapping definitions.
    pub modulo_mappings: Vec<ModuloMapping>,
    /// Number-format mapping definitions.
    pub number_formats: Vec<NumberFormatMapping>,
    /// Unary expression operations.
    pub unary_ops: Vec<UnaryOpRecord>,
    /// Binary expression operations.
    pub binary_ops: Vec<BinaryOpRecord>,
    /// Ternary expression operations.
    pub ternary_ops: Vec<TernaryOpRecord>,
}

impl LayoutBundle {
    /// True when no collection has any record.
    pub fn is_empty(&self) -> bool {
        self.compile_order().next().is_none()
    }

    /// Iterates every record in the fixed order one compile session consumes
    /// them.
    ///
    /// The order is dependency-friendly by construction: data sources and
    /// constants come first so later bindables can resolve them, metrics
    /// precede mapping definitions so each definition sees its full usage
    /// set, and raw operations come last so their operands' binding types
    /// are already known.
    pub fn compile_order(&self) -> impl Iterator<Item = RecordRef<'_>> {
        let data = self.data_sources.iter().map(RecordRef::DataSource);
        let constants = self.constants.iter().map(RecordRef::Constant);
        let fonts = self.fonts.iter().map(RecordRef::Font);
        let bitmaps = self.bitmaps.iter().map(RecordRef::Bitmap);
        let customs = self.customs.iter().map(RecordRef::Custom);
        let t_groups = self
            .translation_groups
            .iter()
            .map(RecordRef::TranslationGroup);
        let r_groups = self.rotation_groups.iter().map(RecordRef::RotationGroup);
        let rects = self.rects.iter().map(RecordRef::Rect);
        let round_rects = self.round_rects.iter().map(RecordRef::RoundRect);
        let lines = self.lines.iter().map(RecordRef::Line);
        let arcs = self.arcs.iter().map(RecordRef::Arc);
        let static_texts = self.static_texts.iter().map(RecordRef::StaticText);
        let dynamic_texts = self.dynamic_texts.iter().map(RecordRef::DynamicText);
        let templates = self.string_templates.iter().map(RecordRef::StringTemplate);
        let metrics = self.metrics.iter().map(RecordRef::Metric);
        let linear = self.linear_mappings.iter().map(RecordRef::Linear);
        let range = self.range_mappings.iter().map(RecordRef::Range);
        let modulo = self.modulo_mappings.iter().map(RecordRef::Modulo);
        let formats = self.number_formats.iter().map(RecordRef::NumberFormat);
        let unary = self.unary_ops.iter().map(RecordRef::UnaryOp);
        let binary = self.binary_ops.iter().map(RecordRef::BinaryOp);
        let ternary = self.ternary_ops.iter().map(RecordRef::TernaryOp);

        data.chain(constants)
            .chain(fonts)
            .chain(bitmaps)
            .chain(customs)
            .chain(t_groups)
            .chain(r_groups)
            .chain(rects)
            .chain(round_rects)
            .chain(lines)
            .chain(arcs)
            .chain(static_texts)
            .chain(dynamic_texts)
            .chain(templates)
            .chain(metrics)
            .chain(linear)
            .chain(range)
            .chain(modulo)
            .chain(formats)
            .chain(unary)
            .chain(binary)
            .chain(ternary)
    }
}
