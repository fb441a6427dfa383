// SPDX-License-Identifier: Apache-2.0
//! Typed expression-graph schema target.
//!
//! Every value position in this schema is a [`BindingPtr`] to another node,
//! so literals become shared primitive nodes, mappings expand into operation
//! subgraphs per usage, and all client ids are remapped through a
//! session-scoped [`IdAllocator`]. The same declarative bundle compiled twice
//! therefore produces identical ids, which is what makes incremental sends
//! cheap.

use bytes::Bytes;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

use aod_schema::{
    ArcRecord, BinaryOpKind, BinaryOpRecord, BindableBool, BindableColor, BindableF32,
    BitmapRecord, BlendMode, ConstantRecord, ConstantValue, DynamicTextRecord,
    EndCap, FillStyle, KeyValue, LinearMapping, LineRecord, ModuloMapping,
    NumberFormatMapping, OperandRef, PixelFormat, RangeMapping, RecordRef, RectRecord,
    RotationGroupRecord, RoundRectRecord, StaticTextRecord, TernaryOpKind, TernaryOpRecord,
    TextAlign, UnaryOpKind, UnaryOpRecord, ValueTypeTag,
};

use crate::compiler::{check_client_id, Emission, SchemaCompiler};
use crate::error::CompileError;
use crate::ident::{IdAllocator, NodeId, EMPTY_LAYOUT_ID};
use crate::node::{BindingPtr, GraphNode, PrimitiveValue, ValueType};

/// Unary operations of the expression graph.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExprUnaryOp {
    /// Round half away from zero to integer.
    Round,
    /// Round up.
    Ceil,
    /// Round down.
    Floor,
    /// `1 / x`.
    Reciprocal,
}

/// Binary operations of the expression graph.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExprBinaryOp {
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
    /// Formats `arg2` with the number-format descriptor `arg1`.
    FormatText,
}

/// Ternary operations of the expression graph.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExprTernaryOp {
    /// `if a then b else c`.
    IfElse,
}

/// Paint style with a pointer-valued color.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ExprShapeStyle {
    /// Shape color.
    pub color: BindingPtr,
    /// Stroke width in pixels.
    pub stroke_width: f32,
    /// Fill or stroke rendering.
    pub fill: FillStyle,
    /// Compositing mode.
    pub blend: BlendMode,
}

/// Node payload of the typed expression schema.
#[derive(Clone, PartialEq, Debug)]
pub enum ExprNode {
    /// Translation group.
    Group {
        /// Children in paint order.
        children: Vec<NodeId>,
        /// Group visibility.
        visible: BindingPtr,
        /// Horizontal offset.
        offset_x: BindingPtr,
        /// Vertical offset.
        offset_y: BindingPtr,
    },
    /// Rotation group.
    SpinGroup {
        /// Children in paint order.
        children: Vec<NodeId>,
        /// Group visibility.
        visible: BindingPtr,
        /// Pivot x coordinate.
        pivot_x: BindingPtr,
        /// Pivot y coordinate.
        pivot_y: BindingPtr,
        /// Rotation angle in degrees.
        angle_deg: BindingPtr,
    },
    /// Rectangle shape.
    Rect {
        /// Shape visibility.
        visible: BindingPtr,
        /// Rectangle width.
        width: BindingPtr,
        /// Rectangle height.
        height: BindingPtr,
        /// Paint style.
        style: ExprShapeStyle,
    },
    /// Rounded rectangle shape.
    RoundRect {
        /// Shape visibility.
        visible: BindingPtr,
        /// Rectangle width.
        width: BindingPtr,
        /// Rectangle height.
        height: BindingPtr,
        /// Corner radius.
        corner_radius: BindingPtr,
        /// Paint style.
        style: ExprShapeStyle,
    },
    /// Line shape.
    Line {
        /// Shape visibility.
        visible: BindingPtr,
        /// End point x coordinate.
        end_x: BindingPtr,
        /// End point y coordinate.
        end_y: BindingPtr,
        /// Paint style.
        style: ExprShapeStyle,
    },
    /// Arc shape.
    Arc {
        /// Shape visibility.
        visible: BindingPtr,
        /// Bounding box width.
        width: BindingPtr,
        /// Bounding box height.
        height: BindingPtr,
        /// Start angle in degrees.
        start_deg: BindingPtr,
        /// Sweep angle in degrees.
        sweep_deg: BindingPtr,
        /// Paint style.
        style: ExprShapeStyle,
        /// Stroke end-cap style.
        end_cap: EndCap,
    },
    /// Fixed string.
    StaticText {
        /// Text visibility.
        visible: BindingPtr,
        /// The string to render.
        value: String,
        /// Text color.
        color: BindingPtr,
        /// Horizontal alignment.
        align: TextAlign,
        /// Font resource id.
        font: NodeId,
        /// Font size in pixels.
        font_size: f32,
    },
    /// Text whose content is a string-producing node.
    DynamicText {
        /// Text visibility.
        visible: BindingPtr,
        /// String-producing node.
        content: BindingPtr,
        /// Text color.
        color: BindingPtr,
        /// Horizontal alignment.
        align: TextAlign,
        /// Font resource id.
        font: NodeId,
        /// Font size in pixels.
        font_size: f32,
    },
    /// Bitmap resource.
    Bitmap {
        /// Bitmap visibility.
        visible: BindingPtr,
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
        color: BindingPtr,
        /// Compositing mode.
        blend: BlendMode,
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
    /// External data source leaf.
    Metric {
        /// Target-side data source path.
        target: String,
    },
    /// Literal value leaf.
    Primitive(PrimitiveValue),
    /// Unary operation.
    UnaryOp {
        /// Operation kind.
        op: ExprUnaryOp,
        /// Input operand.
        arg: BindingPtr,
    },
    /// Binary operation.
    BinaryOp {
        /// Operation kind.
        op: ExprBinaryOp,
        /// First operand.
        arg1: BindingPtr,
        /// Second operand.
        arg2: BindingPtr,
    },
    /// Ternary operation.
    TernaryOp {
        /// Operation kind.
        op: ExprTernaryOp,
        /// First operand (the condition for `IfElse`).
        arg1: BindingPtr,
        /// Second operand.
        arg2: BindingPtr,
        /// Third operand.
        arg3: BindingPtr,
    },
    /// Number-format descriptor leaf.
    NumberFormat {
        /// Whether to insert grouping separators.
        grouping: bool,
        /// Minimum fraction digits.
        min_fraction_digits: u8,
        /// Maximum fraction digits.
        max_fraction_digits: u8,
        /// Minimum integer digits.
        min_integer_digits: u8,
    },
    /// Synthesized root group over a multi-root graph.
    Root {
        /// The former roots, in insertion order.
        children: Vec<NodeId>,
    },
}

impl GraphNode for ExprNode {
    fn references(&self) -> Vec<NodeId> {
        match self {
            Self::Group {
                children,
                visible,
                offset_x,
                offset_y,
            } => {
                let mut refs = children.clone();
                refs.extend([visible.id, offset_x.id, offset_y.id]);
                refs
            }
            Self::SpinGroup {
                children,
                visible,
                pivot_x,
                pivot_y,
                angle_deg,
            } => {
                let mut refs = children.clone();
                refs.extend([visible.id, pivot_x.id, pivot_y.id, angle_deg.id]);
                refs
            }
            Self::Rect {
                visible,
                width,
                height,
                style,
            } => vec![visible.id, width.id, height.id, style.color.id],
            Self::RoundRect {
                visible,
                width,
                height,
                corner_radius,
                style,
            } => vec![
                visible.id,
                width.id,
                height.id,
                corner_radius.id,
                style.color.id,
            ],
            Self::Line {
                visible,
                end_x,
                end_y,
                style,
            } => vec![visible.id, end_x.id, end_y.id, style.color.id],
            Self::Arc {
                visible,
                width,
                height,
                start_deg,
                sweep_deg,
                style,
                ..
            } => vec![
                visible.id,
                width.id,
                height.id,
                start_deg.id,
                sweep_deg.id,
                style.color.id,
            ],
            Self::StaticText {
                visible,
                color,
                font,
                ..
            } => vec![visible.id, color.id, *font],
            Self::DynamicText {
                visible,
                content,
                color,
                font,
                ..
            } => vec![visible.id, content.id, color.id, *font],
            // The tint color of a bitmap rides along the pixel payload on the
            // target and is not a structural dependency there.
            Self::Bitmap { visible, .. } => vec![visible.id],
            Self::UnaryOp { arg, .. } => vec![arg.id],
            Self::BinaryOp { arg1, arg2, .. } => vec![arg1.id, arg2.id],
            Self::TernaryOp {
                arg1, arg2, arg3, ..
            } => vec![arg1.id, arg2.id, arg3.id],
            Self::Root { children } => children.clone(),
            Self::Font { .. }
            | Self::Custom { .. }
            | Self::Metric { .. }
            | Self::Primitive(_)
            | Self::NumberFormat { .. } => Vec::new(),
        }
    }

    fn synthetic_root(children: Vec<NodeId>) -> Self {
        Self::Root { children }
    }
}

/// One declared use of a mapping: which named result it produces and which
/// named value feeds it.
#[derive(Clone, Copy, Debug)]
struct MetricUsage {
    result: u32,
    argument: u32,
}

fn tag_type(tag: ValueTypeTag) -> ValueType {
    match tag {
        ValueTypeTag::Float => ValueType::Float,
        ValueTypeTag::Int32 => ValueType::Int32,
        ValueTypeTag::Uint32 => ValueType::Uint32,
        ValueTypeTag::Bool => ValueType::Bool,
        ValueTypeTag::Utf8 => ValueType::Utf8,
    }
}

/// Compiler for the typed expression schema target.
#[derive(Debug)]
pub struct ExprCompiler {
    ids: IdAllocator,
    /// Dedup cache: one primitive node per distinct literal per session.
    primitives: FxHashMap<PrimitiveValue, BindingPtr>,
    /// Resolved output type per node id, fed back into later references.
    known_ptrs: FxHashMap<NodeId, BindingPtr>,
    /// Usages recorded by metric records, consumed by mapping definitions.
    mapping_usages: FxHashMap<u32, Vec<MetricUsage>>,
    /// Data-source names whose leaf node was already emitted.
    emitted_sources: FxHashSet<u32>,
}

impl Default for ExprCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprCompiler {
    /// Creates a compiler with a fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::with_system_window(),
            primitives: FxHashMap::default(),
            known_ptrs: FxHashMap::default(),
            mapping_usages: FxHashMap::default(),
            emitted_sources: FxHashSet::default(),
        }
    }

    /// Records the resolved output type of `ptr.id`.
    fn cache_ptr(&mut self, ptr: BindingPtr) {
        if let Some(existing) = self.known_ptrs.get(&ptr.id) {
            if existing.ty != ptr.ty {
                warn!(id = %ptr.id, old = ?existing.ty, new = ?ptr.ty, "binding type changed");
            }
        }
        self.known_ptrs.insert(ptr.id, ptr);
    }

    /// Pointer to the shared primitive node for `value`, emitting the node on
    /// first use.
    fn primitive_ptr(
        &mut self,
        value: PrimitiveValue,
        out: &mut Vec<Emission<ExprNode>>,
    ) -> BindingPtr {
        if let Some(&ptr) = self.primitives.get(&value) {
            return ptr;
        }
        let ptr = BindingPtr::new(self.ids.next_id(), value.value_type());
        self.primitives.insert(value, ptr);
        self.cache_ptr(ptr);
        out.push((ptr.id.into(), ExprNode::Primitive(value)));
        ptr
    }

    /// Pointer to the node behind the client-side name `binding`. The output
    /// type comes from the session cache when the node was already compiled
    /// and falls back to `fallback` for forward references.
    fn binding_ptr(&mut self, binding: u32, fallback: ValueType) -> BindingPtr {
        let id = self.ids.id_for(binding);
        let ty = self.known_ptrs.get(&id).map_or(fallback, |p| p.ty);
        BindingPtr::new(id, ty)
    }

    fn f32_ptr(&mut self, field: BindableF32, out: &mut Vec<Emission<ExprNode>>) -> BindingPtr {
        match field.binding {
            Some(binding) => self.binding_ptr(binding, ValueType::Float),
            None => self.primitive_ptr(PrimitiveValue::F32(field.value), out),
        }
    }

    fn color_ptr(
        &mut self,
        field: BindableColor,
        out: &mut Vec<Emission<ExprNode>>,
    ) -> BindingPtr {
        match field.binding {
            Some(binding) => self.binding_ptr(binding, ValueType::Uint32),
            None => self.primitive_ptr(PrimitiveValue::U32(field.value), out),
        }
    }

    fn bool_ptr(&mut self, field: BindableBool, out: &mut Vec<Emission<ExprNode>>) -> BindingPtr {
        match field.binding {
            Some(binding) => self.binding_ptr(binding, ValueType::Bool),
            None => self.primitive_ptr(PrimitiveValue::Bool(field.value), out),
        }
    }

    fn operand_ptr(&mut self, operand: OperandRef) -> BindingPtr {
        self.binding_ptr(operand.name, tag_type(operand.ty))
    }

    fn style(
        &mut self,
        style: &aod_schema::ShapeStyle,
        out: &mut Vec<Emission<ExprNode>>,
    ) -> ExprShapeStyle {
        ExprShapeStyle {
            color: self.color_ptr(style.color, out),
            stroke_width: style.stroke_width,
            fill: style.fill,
            blend: style.blend,
        }
    }

    /// Remaps a client structural id, rejecting the system window.
    fn structural_id(&mut self, id: u32) -> Result<NodeId, CompileError> {
        check_client_id(id)?;
        Ok(self.ids.id_for(id))
    }

    fn usages_of(&self, mapping: u32) -> Vec<MetricUsage> {
        self.mapping_usages.get(&mapping).cloned().unwrap_or_default()
    }

    fn compile_constant(
        &mut self,
        record: &ConstantRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        check_client_id(record.name)?;
        let value = match &record.value {
            ConstantValue::F32(v) => PrimitiveValue::F32(*v),
            ConstantValue::I32(v) => PrimitiveValue::I32(*v),
            // Unrecognized payloads degrade to integer zero.
            ConstantValue::None => PrimitiveValue::I32(0),
            ConstantValue::Utf8(_) => {
                return Err(CompileError::Unsupported {
                    schema: "expr",
                    detail: "string constants",
                })
            }
        };
        let id = self.ids.id_for(record.name);
        if self.primitives.contains_key(&value) {
            // Same literal was already materialized; the dedup cache wins and
            // this constant's own node is elided.
            return Ok(Vec::new());
        }
        let ptr = BindingPtr::new(id, value.value_type());
        self.primitives.insert(value, ptr);
        self.cache_ptr(ptr);
        Ok(vec![(id.into(), ExprNode::Primitive(value))])
    }

    fn compile_data_source(
        &mut self,
        name: u32,
        source: &str,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        check_client_id(name)?;
        if !self.emitted_sources.insert(name) {
            return Ok(Vec::new());
        }
        let id = self.ids.id_for(name);
        self.cache_ptr(BindingPtr::new(id, ValueType::Float));
        Ok(vec![(
            id.into(),
            ExprNode::Metric {
                target: source.to_owned(),
            },
        )])
    }

    /// `y = m * x + b` per usage: a shared-slope multiply feeding an add that
    /// lands on the usage's result id.
    fn compile_linear(
        &mut self,
        mapping: &LinearMapping,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let mut out = Vec::new();
        for usage in self.usages_of(mapping.name) {
            let m_ptr = self.primitive_ptr(PrimitiveValue::F32(mapping.m), &mut out);
            let b_ptr = self.primitive_ptr(PrimitiveValue::F32(mapping.b), &mut out);
            let arg = self.binding_ptr(usage.argument, ValueType::Float);

            let mul = BindingPtr::new(self.ids.next_id(), ValueType::Float);
            self.cache_ptr(mul);
            out.push((
                mul.id.into(),
                ExprNode::BinaryOp {
                    op: ExprBinaryOp::Multiply,
                    arg1: m_ptr,
                    arg2: arg,
                },
            ));

            let result = BindingPtr::new(self.ids.id_for(usage.result), ValueType::Float);
            self.cache_ptr(result);
            out.push((
                result.id.into(),
                ExprNode::BinaryOp {
                    op: ExprBinaryOp::Add,
                    arg1: b_ptr,
                    arg2: mul,
                },
            ));
        }
        Ok(out)
    }

    /// Threshold lookup per usage: a right-to-left compare/select chain whose
    /// outermost select lands on the usage's result id.
    fn compile_range(
        &mut self,
        mapping: &RangeMapping,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        if mapping.values.len() != mapping.thresholds.len() + 1 {
            return Err(CompileError::MalformedMapping {
                name: mapping.name,
                reason: "values must be one longer than thresholds",
            });
        }
        if mapping.thresholds.is_empty() {
            return Err(CompileError::MalformedMapping {
                name: mapping.name,
                reason: "at least one threshold is required",
            });
        }
        let mut out = Vec::new();
        for usage in self.usages_of(mapping.name) {
            // All selects produce whatever type the first output value has;
            // forward references degrade to float.
            let chain_ty = self
                .known_ptrs
                .get(&self.ids.id_for(mapping.values[0]))
                .map_or(ValueType::Float, |p| p.ty);
            let value_ptrs: Vec<BindingPtr> = mapping
                .values
                .iter()
                .map(|&v| self.binding_ptr(v, chain_ty))
                .collect();

            let mut false_val = value_ptrs[mapping.thresholds.len()];
            for i in (0..mapping.thresholds.len()).rev() {
                let threshold =
                    self.primitive_ptr(PrimitiveValue::F32(mapping.thresholds[i]), &mut out);
                let arg = self.binding_ptr(usage.argument, ValueType::Float);

                let below = BindingPtr::new(self.ids.next_id(), ValueType::Bool);
                self.cache_ptr(below);
                out.push((
                    below.id.into(),
                    ExprNode::BinaryOp {
                        op: ExprBinaryOp::LessThan,
                        arg1: arg,
                        arg2: threshold,
                    },
                ));

                let select_id = if i == 0 {
                    self.ids.id_for(usage.result)
                } else {
                    self.ids.next_id()
                };
                let select = BindingPtr::new(select_id, chain_ty);
                self.cache_ptr(select);
                out.push((
                    select.id.into(),
                    ExprNode::TernaryOp {
                        op: ExprTernaryOp::IfElse,
                        arg1: below,
                        arg2: value_ptrs[i],
                        arg3: false_val,
                    },
                ));
                false_val = select;
            }
        }
        Ok(out)
    }

    /// `y = round(x) mod modulus` per usage.
    fn compile_modulo(
        &mut self,
        mapping: &ModuloMapping,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let mut out = Vec::new();
        for usage in self.usages_of(mapping.name) {
            let arg = self.binding_ptr(usage.argument, ValueType::Float);
            let rounded = BindingPtr::new(self.ids.next_id(), ValueType::Int32);
            self.cache_ptr(rounded);
            out.push((
                rounded.id.into(),
                ExprNode::UnaryOp {
                    op: ExprUnaryOp::Round,
                    arg,
                },
            ));

            let modulus = self.primitive_ptr(PrimitiveValue::I32(mapping.modulus), &mut out);
            let result = BindingPtr::new(self.ids.id_for(usage.result), ValueType::Int32);
            self.cache_ptr(result);
            out.push((
                result.id.into(),
                ExprNode::BinaryOp {
                    op: ExprBinaryOp::Modulo,
                    arg1: modulus,
                    arg2: rounded,
                },
            ));
        }
        Ok(out)
    }

    /// One shared descriptor node plus one format operation per usage. The
    /// descriptor is emitted even with no usages so the definition's name
    /// stays resolvable.
    fn compile_number_format(
        &mut self,
        mapping: &NumberFormatMapping,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        check_client_id(mapping.name)?;
        let format = BindingPtr::new(self.ids.id_for(mapping.name), ValueType::NumberFormat);
        self.cache_ptr(format);
        let mut out = vec![(
            format.id.into(),
            ExprNode::NumberFormat {
                grouping: mapping.grouping,
                min_fraction_digits: mapping.min_fraction_digits,
                max_fraction_digits: mapping.max_fraction_digits,
                min_integer_digits: mapping.min_integer_digits,
            },
        )];
        for usage in self.usages_of(mapping.name) {
            let arg = self.binding_ptr(usage.argument, ValueType::Float);
            let result = BindingPtr::new(self.ids.id_for(usage.result), ValueType::Utf8);
            self.cache_ptr(result);
            out.push((
                result.id.into(),
                ExprNode::BinaryOp {
                    op: ExprBinaryOp::FormatText,
                    arg1: format,
                    arg2: arg,
                },
            ));
        }
        Ok(out)
    }

    fn compile_unary(
        &mut self,
        record: &UnaryOpRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        check_client_id(record.name)?;
        let (op, ty) = match record.op {
            UnaryOpKind::Round => (ExprUnaryOp::Round, ValueType::Int32),
            UnaryOpKind::Ceil => (ExprUnaryOp::Ceil, ValueType::Float),
            UnaryOpKind::Floor => (ExprUnaryOp::Floor, ValueType::Float),
            UnaryOpKind::Reciprocal => (ExprUnaryOp::Reciprocal, ValueType::Float),
        };
        let arg = self.operand_ptr(record.operand);
        let result = BindingPtr::new(self.ids.id_for(record.name), ty);
        self.cache_ptr(result);
        Ok(vec![(result.id.into(), ExprNode::UnaryOp { op, arg })])
    }

    fn compile_binary(
        &mut self,
        record: &BinaryOpRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        check_client_id(record.name)?;
        let arg1 = self.operand_ptr(record.arg1);
        let arg2 = self.operand_ptr(record.arg2);
        let (op, ty) = match record.op {
            BinaryOpKind::Add => (ExprBinaryOp::Add, arg1.ty),
            BinaryOpKind::Subtract => (ExprBinaryOp::Subtract, arg1.ty),
            BinaryOpKind::Multiply => (ExprBinaryOp::Multiply, arg1.ty),
            BinaryOpKind::Divide => (ExprBinaryOp::Divide, arg1.ty),
            BinaryOpKind::Modulo => (ExprBinaryOp::Modulo, ValueType::Int32),
            BinaryOpKind::LessThan => (ExprBinaryOp::LessThan, ValueType::Bool),
        };
        let result = BindingPtr::new(self.ids.id_for(record.name), ty);
        self.cache_ptr(result);
        Ok(vec![(
            result.id.into(),
            ExprNode::BinaryOp { op, arg1, arg2 },
        )])
    }

    fn compile_ternary(
        &mut self,
        record: &TernaryOpRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        check_client_id(record.name)?;
        let arg1 = self.operand_ptr(record.arg1);
        let arg2 = self.operand_ptr(record.arg2);
        let arg3 = self.operand_ptr(record.arg3);
        let TernaryOpKind::IfElse = record.op;
        let result = BindingPtr::new(self.ids.id_for(record.name), arg2.ty);
        self.cache_ptr(result);
        Ok(vec![(
            result.id.into(),
            ExprNode::TernaryOp {
                op: ExprTernaryOp::IfElse,
                arg1,
                arg2,
                arg3,
            },
        )])
    }

    fn compile_rect(
        &mut self,
        record: &RectRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let id = self.structural_id(record.id)?;
        let mut out = Vec::new();
        let node = ExprNode::Rect {
            visible: self.bool_ptr(record.visibility, &mut out),
            width: self.f32_ptr(record.width, &mut out),
            height: self.f32_ptr(record.height, &mut out),
            style: self.style(&record.style, &mut out),
        };
        out.push((id.into(), node));
        Ok(out)
    }

    fn compile_round_rect(
        &mut self,
        record: &RoundRectRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let id = self.structural_id(record.id)?;
        let mut out = Vec::new();
        let node = ExprNode::RoundRect {
            visible: self.bool_ptr(record.visibility, &mut out),
            width: self.f32_ptr(record.width, &mut out),
            height: self.f32_ptr(record.height, &mut out),
            corner_radius: self.f32_ptr(record.corner_radius, &mut out),
            style: self.style(&record.style, &mut out),
        };
        out.push((id.into(), node));
        Ok(out)
    }

    fn compile_line(
        &mut self,
        record: &LineRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let id = self.structural_id(record.id)?;
        let mut out = Vec::new();
        let node = ExprNode::Line {
            visible: self.bool_ptr(record.visibility, &mut out),
            end_x: self.f32_ptr(record.end_x, &mut out),
            end_y: self.f32_ptr(record.end_y, &mut out),
            style: self.style(&record.style, &mut out),
        };
        out.push((id.into(), node));
        Ok(out)
    }

    fn compile_arc(&mut self, record: &ArcRecord) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let id = self.structural_id(record.id)?;
        let mut out = Vec::new();
        let node = ExprNode::Arc {
            visible: self.bool_ptr(record.visibility, &mut out),
            width: self.f32_ptr(record.width, &mut out),
            height: self.f32_ptr(record.height, &mut out),
            start_deg: self.f32_ptr(record.start_deg, &mut out),
            sweep_deg: self.f32_ptr(record.sweep_deg, &mut out),
            style: self.style(&record.style, &mut out),
            end_cap: record.end_cap,
        };
        out.push((id.into(), node));
        Ok(out)
    }

    fn compile_static_text(
        &mut self,
        record: &StaticTextRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let id = self.structural_id(record.id)?;
        let style = record.style.ok_or(CompileError::MissingField {
            record: format!("static-text #{}", record.id),
            field: "style",
        })?;
        let mut out = Vec::new();
        let node = ExprNode::StaticText {
            visible: self.bool_ptr(record.visibility, &mut out),
            value: record.value.clone(),
            color: self.color_ptr(style.color, &mut out),
            align: style.align,
            font: self.ids.id_for(style.font),
            font_size: style.font_size,
        };
        out.push((id.into(), node));
        Ok(out)
    }

    fn compile_dynamic_text(
        &mut self,
        record: &DynamicTextRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let id = self.structural_id(record.id)?;
        let style = record.style.ok_or(CompileError::MissingField {
            record: format!("dynamic-text #{}", record.id),
            field: "style",
        })?;
        let mut out = Vec::new();
        let node = ExprNode::DynamicText {
            visible: self.bool_ptr(record.visibility, &mut out),
            content: self.binding_ptr(record.binding, ValueType::Utf8),
            color: self.color_ptr(style.color, &mut out),
            align: style.align,
            font: self.ids.id_for(style.font),
            font_size: style.font_size,
        };
        out.push((id.into(), node));
        Ok(out)
    }

    fn compile_bitmap(
        &mut self,
        record: &BitmapRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let id = self.structural_id(record.id)?;
        let mut out = Vec::new();
        let node = ExprNode::Bitmap {
            visible: self.bool_ptr(record.visibility, &mut out),
            width: record.width,
            height: record.height,
            format: record.format,
            row_bytes: record.row_bytes,
            pixels: record.pixels.clone(),
            color: self.color_ptr(record.color, &mut out),
            blend: record.blend,
        };
        out.push((id.into(), node));
        Ok(out)
    }

    fn compile_group(
        &mut self,
        record: &aod_schema::TranslationGroupRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let id = self.structural_id(record.id)?;
        let mut out = Vec::new();
        let node = ExprNode::Group {
            children: record.contents.iter().map(|&c| self.ids.id_for(c)).collect(),
            visible: self.bool_ptr(record.visibility, &mut out),
            offset_x: self.f32_ptr(record.offset_x, &mut out),
            offset_y: self.f32_ptr(record.offset_y, &mut out),
        };
        out.push((id.into(), node));
        Ok(out)
    }

    fn compile_spin_group(
        &mut self,
        record: &RotationGroupRecord,
    ) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        let id = self.structural_id(record.id)?;
        let mut out = Vec::new();
        let node = ExprNode::SpinGroup {
            children: record.contents.iter().map(|&c| self.ids.id_for(c)).collect(),
            visible: self.bool_ptr(record.visibility, &mut out),
            pivot_x: self.f32_ptr(record.pivot_x, &mut out),
            pivot_y: self.f32_ptr(record.pivot_y, &mut out),
            angle_deg: self.f32_ptr(record.angle_deg, &mut out),
        };
        out.push((id.into(), node));
        Ok(out)
    }
}

impl SchemaCompiler for ExprCompiler {
    type Node = ExprNode;

    fn begin(&mut self) {
        self.ids.reset();
        self.primitives.clear();
        self.known_ptrs.clear();
        self.mapping_usages.clear();
        self.emitted_sources.clear();
    }

    fn compile(&mut self, record: RecordRef<'_>) -> Result<Vec<Emission<ExprNode>>, CompileError> {
        match record {
            RecordRef::DataSource(r) => self.compile_data_source(r.name, &r.source),
            RecordRef::Constant(r) => self.compile_constant(r),
            RecordRef::Metric(r) => {
                self.mapping_usages
                    .entry(r.mapping)
                    .or_default()
                    .push(MetricUsage {
                        result: r.name,
                        argument: r.bound_source,
                    });
                Ok(Vec::new())
            }
            RecordRef::Linear(r) => self.compile_linear(r),
            RecordRef::Range(r) => self.compile_range(r),
            RecordRef::Modulo(r) => self.compile_modulo(r),
            RecordRef::NumberFormat(r) => self.compile_number_format(r),
            RecordRef::UnaryOp(r) => self.compile_unary(r),
            RecordRef::BinaryOp(r) => self.compile_binary(r),
            RecordRef::TernaryOp(r) => self.compile_ternary(r),
            RecordRef::TranslationGroup(r) => self.compile_group(r),
            RecordRef::RotationGroup(r) => self.compile_spin_group(r),
            RecordRef::Rect(r) => self.compile_rect(r),
            RecordRef::RoundRect(r) => self.compile_round_rect(r),
            RecordRef::Line(r) => self.compile_line(r),
            RecordRef::Arc(r) => self.compile_arc(r),
            RecordRef::StaticText(r) => self.compile_static_text(r),
            RecordRef::DynamicText(r) => self.compile_dynamic_text(r),
            RecordRef::Bitmap(r) => self.compile_bitmap(r),
            RecordRef::Font(r) => {
                let id = self.structural_id(r.id)?;
                Ok(vec![(id.into(), ExprNode::Font { ttf: r.ttf.clone() })])
            }
            RecordRef::Custom(r) => {
                let id = self.structural_id(r.id)?;
                let key_values = r.key_values.clone().ok_or(CompileError::MissingField {
                    record: format!("custom #{}", r.id),
                    field: "key_values",
                })?;
                Ok(vec![(id.into(), ExprNode::Custom { key_values })])
            }
            // Format strings are a flat-schema concept; number-format
            // mappings cover the same ground here.
            RecordRef::StringTemplate(_) => {
                warn!(kind = record.kind(), "record kind not expressible, skipped");
                Ok(Vec::new())
            }
        }
    }

    fn empty_layout(&mut self) -> Emission<ExprNode> {
        (
            EMPTY_LAYOUT_ID.into(),
            ExprNode::Root {
                children: Vec::new(),
            },
        )
    }
}
