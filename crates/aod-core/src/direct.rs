// SPDX-License-Identifier: Apache-2.0
//! Flat "direct" schema target.
//!
//! The direct target predates binding pointers: structural nodes carry raw
//! scalars or data-source *names*, and metrics, constants, strings and
//! mapping definitions travel to the target as name-keyed variable nodes
//! that the target resolves itself. No id remapping happens here (client
//! structural ids are forwarded as-is) and mapping fan-out is the target's
//! job, not the compiler's.

use bytes::Bytes;
use rustc_hash::FxHashMap;
use tracing::warn;

use aod_schema::{
    ArcRecord, BindableColor, BindableF32, BitmapRecord, BlendMode, ConstantValue, CustomRecord,
    DynamicTextRecord, EndCap, FillStyle, KeyValue, LineRecord, PixelFormat, RecordRef, RectRecord,
    RotationGroupRecord, RoundRectRecord, StaticTextRecord, TextAlign, UnaryOpKind, UnaryOpRecord,
};

use crate::compiler::{check_client_id, Emission, SchemaCompiler};
use crate::error::CompileError;
use crate::ident::{NodeId, ResourceKey, EMPTY_LAYOUT_ID};
use crate::node::GraphNode;

/// Name prefix distinguishing client-named variables from raw data-source
/// paths in the target's shared namespace.
const VAR_PREFIX: &str = "b_";

/// A field that is either a raw literal or the name of a data source.
#[derive(Clone, PartialEq, Debug)]
pub enum DirectValue<T> {
    /// Literal value.
    Literal(T),
    /// Resolved at evaluation time from the named source.
    Source(String),
}

/// Paint style with a direct-value color.
#[derive(Clone, PartialEq, Debug)]
pub struct DirectShapeStyle {
    /// Shape color.
    pub color: DirectValue<u32>,
    /// Stroke width in pixels.
    pub stroke_width: f32,
    /// Fill or stroke rendering.
    pub fill: FillStyle,
    /// Compositing mode.
    pub blend: BlendMode,
}

/// Builtin mapping kinds the flat target implements natively.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BuiltinMapKind {
    /// Round up.
    Ceil,
    /// Round down.
    Floor,
    /// `1 / x`.
    Reciprocal,
}

impl BuiltinMapKind {
    /// The well-known target-side name of this builtin.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ceil => "ceil",
            Self::Floor => "floor",
            Self::Reciprocal => "reciprocal",
        }
    }
}

/// Node payload of the flat schema.
#[derive(Clone, PartialEq, Debug)]
pub enum DirectNode {
    /// Translation group; offsets are always literal in this schema.
    Group {
        /// Children in paint order.
        children: Vec<NodeId>,
        /// Horizontal offset.
        offset_x: f32,
        /// Vertical offset.
        offset_y: f32,
    },
    /// Rotation group.
    SpinGroup {
        /// Children in paint order.
        children: Vec<NodeId>,
        /// Pivot x coordinate.
        pivot_x: f32,
        /// Pivot y coordinate.
        pivot_y: f32,
        /// Rotation angle in degrees.
        angle_deg: DirectValue<f32>,
    },
    /// Rectangle shape.
    Rect {
        /// Rectangle width.
        width: DirectValue<f32>,
        /// Rectangle height.
        height: DirectValue<f32>,
        /// Paint style.
        style: DirectShapeStyle,
    },
    /// Rounded rectangle shape.
    RoundRect {
        /// Rectangle width.
        width: DirectValue<f32>,
        /// Rectangle height.
        height: DirectValue<f32>,
        /// Corner radius.
        corner_radius: DirectValue<f32>,
        /// Paint style.
        style: DirectShapeStyle,
    },
    /// Line shape.
    Line {
        /// End point x coordinate.
        end_x: DirectValue<f32>,
        /// End point y coordinate.
        end_y: DirectValue<f32>,
        /// Paint style.
        style: DirectShapeStyle,
    },
    /// Arc shape.
    Arc {
        /// Bounding box width.
        width: DirectValue<f32>,
        /// Bounding box height.
        height: DirectValue<f32>,
        /// Start angle in degrees.
        start_deg: DirectValue<f32>,
        /// Sweep angle in degrees.
        sweep_deg: DirectValue<f32>,
        /// Paint style.
        style: DirectShapeStyle,
        /// Stroke end-cap style.
        end_cap: EndCap,
    },
    /// Fixed string.
    StaticText {
        /// The string to render.
        value: String,
        /// Text color.
        color: DirectValue<u32>,
        /// Horizontal alignment.
        align: TextAlign,
        /// Font resource id.
        font: NodeId,
        /// Font size in pixels.
        font_size: f32,
    },
    /// Text bound to a named source.
    DynamicText {
        /// Name of the string-producing source.
        source: String,
        /// Text color.
        color: DirectValue<u32>,
        /// Horizontal alignment.
        align: TextAlign,
        /// Font resource id.
        font: NodeId,
        /// Font size in pixels.
        font_size: f32,
    },
    /// Bitmap resource.
    Bitmap {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Pixel layout of `pixels`.
        format: PixelFormat,
        /// Bytes per pixel row.
        row_bytes: u32,
        /// Raw pixel rows.
        pixels: Bytes,
        /// Tint color.
        color: DirectValue<u32>,
    },
    /// Font resource.
    Font {
        /// Font file bytes.
        ttf: Bytes,
    },
    /// Vendor extension resource.
    Custom {
        /// Opaque key/value payload.
        key_values: Vec<KeyValue>,
    },
    /// Format-string variable (name-keyed).
    StringTemplate {
        /// printf-style format string.
        format: String,
        /// Source names substituted in order.
        sources: Vec<String>,
    },
    /// Mapping usage variable (name-keyed).
    Metric {
        /// Name of the input value.
        source: String,
        /// Name of the mapping to apply.
        mapping: String,
    },
    /// Named constant variable (name-keyed).
    Constant {
        /// Constant payload.
        value: ConstantValue,
    },
    /// Linear mapping definition (name-keyed).
    LinearMapping {
        /// Slope.
        m: f32,
        /// Intercept.
        b: f32,
    },
    /// Range mapping definition (name-keyed).
    RangeMapping {
        /// Ascending decision thresholds.
        thresholds: Vec<f32>,
        /// Names of the output values.
        values: Vec<String>,
    },
    /// Modulo mapping definition (name-keyed).
    ModuloMapping {
        /// Modulus applied after rounding.
        modulus: i32,
    },
    /// Number-format mapping definition (name-keyed).
    NumberFormatMapping {
        /// Whether to insert grouping separators.
        grouping: bool,
        /// Minimum fraction digits.
        min_fraction_digits: u8,
        /// Maximum fraction digits.
        max_fraction_digits: u8,
        /// Minimum integer digits.
        min_integer_digits: u8,
    },
    /// Builtin mapping definition (name-keyed).
    BuiltinMapping {
        /// Which builtin.
        kind: BuiltinMapKind,
    },
}

impl GraphNode for DirectNode {
    fn references(&self) -> Vec<NodeId> {
        // Only containers and text reference other structural nodes in this
        // schema; everything else resolves by name at evaluation time.
        match self {
            Self::Group { children, .. } | Self::SpinGroup { children, .. } => children.clone(),
            Self::StaticText { font, .. } | Self::DynamicText { font, .. } => vec![*font],
            _ => Vec::new(),
        }
    }

    fn synthetic_root(children: Vec<NodeId>) -> Self {
        Self::Group {
            children,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Compiler for the flat schema target.
#[derive(Debug, Default)]
pub struct DirectCompiler {
    binding_sources: FxHashMap<u32, String>,
}

impl DirectCompiler {
    /// Creates a compiler with an empty binding table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable key for a client-side name.
    fn var_key(name: u32) -> ResourceKey {
        ResourceKey::Name(format!("{VAR_PREFIX}{name}"))
    }

    /// Resolves a binding id to the data-source path registered for it, or
    /// to its prefixed variable name when it names a metric or constant.
    fn source_for(&self, binding: u32) -> String {
        self.binding_sources
            .get(&binding)
            .cloned()
            .unwrap_or_else(|| format!("{VAR_PREFIX}{binding}"))
    }

    fn f32_value(&self, field: BindableF32) -> DirectValue<f32> {
        match field.binding {
            Some(binding) => DirectValue::Source(self.source_for(binding)),
            None => DirectValue::Literal(field.value),
        }
    }

    fn color_value(&self, field: BindableColor) -> DirectValue<u32> {
        match field.binding {
            Some(binding) => DirectValue::Source(self.source_for(binding)),
            None => DirectValue::Literal(field.value),
        }
    }

    /// Group offsets and pivots cannot be bound in this schema.
    fn literal_f32(record: &str, field: BindableF32) -> Result<f32, CompileError> {
        if field.binding.is_some() {
            return Err(CompileError::Unsupported {
                schema: "direct",
                detail: match record {
                    "translation-group" => "bound translation offsets",
                    _ => "bound rotation pivots",
                },
            });
        }
        Ok(field.value)
    }

    fn style(&self, style: &aod_schema::ShapeStyle) -> DirectShapeStyle {
        DirectShapeStyle {
            color: self.color_value(style.color),
            stroke_width: style.stroke_width,
            fill: style.fill,
            blend: style.blend,
        }
    }

    fn compile_rect(&self, record: &RectRecord) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::Rect {
                width: self.f32_value(record.width),
                height: self.f32_value(record.height),
                style: self.style(&record.style),
            },
        )])
    }

    fn compile_round_rect(
        &self,
        record: &RoundRectRecord,
    ) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::RoundRect {
                width: self.f32_value(record.width),
                height: self.f32_value(record.height),
                corner_radius: self.f32_value(record.corner_radius),
                style: self.style(&record.style),
            },
        )])
    }

    fn compile_line(&self, record: &LineRecord) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::Line {
                end_x: self.f32_value(record.end_x),
                end_y: self.f32_value(record.end_y),
                style: self.style(&record.style),
            },
        )])
    }

    fn compile_arc(&self, record: &ArcRecord) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::Arc {
                width: self.f32_value(record.width),
                height: self.f32_value(record.height),
                start_deg: self.f32_value(record.start_deg),
                sweep_deg: self.f32_value(record.sweep_deg),
                style: self.style(&record.style),
                end_cap: record.end_cap,
            },
        )])
    }

    fn compile_static_text(
        &self,
        record: &StaticTextRecord,
    ) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        let style = record.style.ok_or(CompileError::MissingField {
            record: format!("static-text #{}", record.id),
            field: "style",
        })?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::StaticText {
                value: record.value.clone(),
                color: self.color_value(style.color),
                align: style.align,
                font: NodeId(style.font),
                font_size: style.font_size,
            },
        )])
    }

    fn compile_dynamic_text(
        &self,
        record: &DynamicTextRecord,
    ) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        let style = record.style.ok_or(CompileError::MissingField {
            record: format!("dynamic-text #{}", record.id),
            field: "style",
        })?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::DynamicText {
                source: self.source_for(record.binding),
                color: self.color_value(style.color),
                align: style.align,
                font: NodeId(style.font),
                font_size: style.font_size,
            },
        )])
    }

    fn compile_bitmap(
        &self,
        record: &BitmapRecord,
    ) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::Bitmap {
                width: record.width,
                height: record.height,
                format: record.format,
                row_bytes: record.row_bytes,
                pixels: record.pixels.clone(),
                color: self.color_value(record.color),
            },
        )])
    }

    fn compile_custom(
        record: &CustomRecord,
    ) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        let key_values = record.key_values.clone().ok_or(CompileError::MissingField {
            record: format!("custom #{}", record.id),
            field: "key_values",
        })?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::Custom { key_values },
        )])
    }

    fn compile_translation_group(
        &self,
        record: &aod_schema::TranslationGroupRecord,
    ) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::Group {
                children: record.contents.iter().map(|&c| NodeId(c)).collect(),
                offset_x: Self::literal_f32("translation-group", record.offset_x)?,
                offset_y: Self::literal_f32("translation-group", record.offset_y)?,
            },
        )])
    }

    fn compile_rotation_group(
        &self,
        record: &RotationGroupRecord,
    ) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        check_client_id(record.id)?;
        Ok(vec![(
            NodeId(record.id).into(),
            DirectNode::SpinGroup {
                children: record.contents.iter().map(|&c| NodeId(c)).collect(),
                pivot_x: Self::literal_f32("rotation-group", record.pivot_x)?,
                pivot_y: Self::literal_f32("rotation-group", record.pivot_y)?,
                angle_deg: self.f32_value(record.angle_deg),
            },
        )])
    }

    /// Lowers a unary operation into a builtin-mapping/metric pair, the way
    /// the flat target expresses computed values.
    fn compile_unary(
        &self,
        record: &UnaryOpRecord,
    ) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        let kind = match record.op {
            UnaryOpKind::Ceil => BuiltinMapKind::Ceil,
            UnaryOpKind::Floor => BuiltinMapKind::Floor,
            UnaryOpKind::Reciprocal => BuiltinMapKind::Reciprocal,
            UnaryOpKind::Round => {
                return Err(CompileError::Unsupported {
                    schema: "direct",
                    detail: "round unary operation",
                })
            }
        };
        Ok(vec![
            (
                ResourceKey::name(kind.name()),
                DirectNode::BuiltinMapping { kind },
            ),
            (
                Self::var_key(record.name),
                DirectNode::Metric {
                    source: self.source_for(record.operand.name),
                    mapping: kind.name().to_owned(),
                },
            ),
        ])
    }
}

impl SchemaCompiler for DirectCompiler {
    type Node = DirectNode;

    fn begin(&mut self) {
        self.binding_sources.clear();
    }

    fn compile(
        &mut self,
        record: RecordRef<'_>,
    ) -> Result<Vec<Emission<DirectNode>>, CompileError> {
        match record {
            RecordRef::DataSource(r) => {
                self.binding_sources.insert(r.name, r.source.clone());
                Ok(Vec::new())
            }
            RecordRef::Constant(r) => {
                let value = match &r.value {
                    // Unrecognized payloads degrade to integer zero.
                    ConstantValue::None => ConstantValue::I32(0),
                    v => v.clone(),
                };
                Ok(vec![(
                    Self::var_key(r.name),
                    DirectNode::Constant { value },
                )])
            }
            RecordRef::Metric(r) => Ok(vec![(
                Self::var_key(r.name),
                DirectNode::Metric {
                    source: self.source_for(r.bound_source),
                    mapping: r.mapping.to_string(),
                },
            )]),
            RecordRef::Linear(r) => Ok(vec![(
                ResourceKey::Name(r.name.to_string()),
                DirectNode::LinearMapping { m: r.m, b: r.b },
            )]),
            RecordRef::Range(r) => {
                if r.values.len() != r.thresholds.len() + 1 {
                    return Err(CompileError::MalformedMapping {
                        name: r.name,
                        reason: "values must be one longer than thresholds",
                    });
                }
                Ok(vec![(
                    ResourceKey::Name(r.name.to_string()),
                    DirectNode::RangeMapping {
                        thresholds: r.thresholds.clone(),
                        values: r.values.iter().map(|&v| self.source_for(v)).collect(),
                    },
                )])
            }
            RecordRef::Modulo(r) => Ok(vec![(
                ResourceKey::Name(r.name.to_string()),
                DirectNode::ModuloMapping { modulus: r.modulus },
            )]),
            RecordRef::NumberFormat(r) => Ok(vec![(
                ResourceKey::Name(r.name.to_string()),
                DirectNode::NumberFormatMapping {
                    grouping: r.grouping,
                    min_fraction_digits: r.min_fraction_digits,
                    max_fraction_digits: r.max_fraction_digits,
                    min_integer_digits: r.min_integer_digits,
                },
            )]),
            RecordRef::StringTemplate(r) => Ok(vec![(
                ResourceKey::Name(r.name.to_string()),
                DirectNode::StringTemplate {
                    format: r.format.clone(),
                    sources: r.sources.iter().map(|&s| self.source_for(s)).collect(),
                },
            )]),
            RecordRef::TranslationGroup(r) => self.compile_translation_group(r),
            RecordRef::RotationGroup(r) => self.compile_rotation_group(r),
            RecordRef::Rect(r) => self.compile_rect(r),
            RecordRef::RoundRect(r) => self.compile_round_rect(r),
            RecordRef::Line(r) => self.compile_line(r),
            RecordRef::Arc(r) => self.compile_arc(r),
            RecordRef::StaticText(r) => self.compile_static_text(r),
            RecordRef::DynamicText(r) => self.compile_dynamic_text(r),
            RecordRef::Bitmap(r) => self.compile_bitmap(r),
            RecordRef::Font(r) => {
                check_client_id(r.id)?;
                Ok(vec![(
                    NodeId(r.id).into(),
                    DirectNode::Font { ttf: r.ttf.clone() },
                )])
            }
            RecordRef::Custom(r) => Self::compile_custom(r),
            RecordRef::UnaryOp(r) => self.compile_unary(r),
            // Raw binary/ternary expressions arrived with a newer schema in
            // mind; skip them rather than failing the whole layout.
            RecordRef::BinaryOp(_) | RecordRef::TernaryOp(_) => {
                warn!(kind = record.kind(), "record kind not expressible, skipped");
                Ok(Vec::new())
            }
        }
    }

    fn empty_layout(&mut self) -> Emission<DirectNode> {
        (
            EMPTY_LAYOUT_ID.into(),
            DirectNode::Group {
                children: Vec::new(),
                offset_x: 0.0,
                offset_y: 0.0,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aod_schema::{DataSourceRecord, MetricRecord};

    fn compiler_with_source() -> DirectCompiler {
        let mut c = DirectCompiler::new();
        c.begin();
        let ds = DataSourceRecord {
            name: 3,
            source: "watch.minute".to_owned(),
        };
        let out = c
            .compile(RecordRef::DataSource(&ds))
            .unwrap_or_else(|_| Vec::new());
        assert!(out.is_empty(), "data sources emit nothing themselves");
        c
    }

    #[test]
    fn bindings_resolve_to_registered_source_names() {
        let c = compiler_with_source();
        assert_eq!(c.source_for(3), "watch.minute");
        assert_eq!(c.source_for(9), "b_9", "unregistered ids fall back");
    }

    #[test]
    fn metric_emits_name_keyed_variable() {
        let mut c = compiler_with_source();
        let metric = MetricRecord {
            name: 5,
            mapping: 12,
            bound_source: 3,
        };
        let out = c.compile(RecordRef::Metric(&metric)).unwrap_or_default();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, ResourceKey::name("b_5"));
        assert_eq!(
            out[0].1,
            DirectNode::Metric {
                source: "watch.minute".to_owned(),
                mapping: "12".to_owned(),
            }
        );
    }
}
