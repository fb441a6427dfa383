// SPDX-License-Identifier: Apache-2.0
//! aod-core: compiles declarative layouts into remotely-evaluated graphs and
//! keeps the remote copy in sync.
//!
//! A [`SchemaCompiler`] turns an `aod-schema` [`LayoutBundle`] into keyed
//! graph nodes for one of two targets: the flat name-resolved schema
//! ([`DirectCompiler`]) or the typed binding-pointer schema
//! ([`ExprCompiler`]). Compiled nodes land in a [`ResourceGraphStore`],
//! which tracks exactly what changed since the last successful send and
//! pushes the dirty subset over a [`HalTransport`] children-first, root
//! last.
//!
//! ```
//! use aod_core::{apply_bundle, ExprCompiler, ResourceGraphStore};
//! use aod_schema::LayoutBundle;
//!
//! let mut compiler = ExprCompiler::new();
//! let mut store = ResourceGraphStore::new();
//! let applied = apply_bundle(&mut compiler, &mut store, &LayoutBundle::default())?;
//! assert_eq!(applied, 1); // the empty-layout placeholder
//! # Ok::<(), aod_core::CompileError>(())
//! ```
//!
//! [`LayoutBundle`]: aod_schema::LayoutBundle
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

mod compiler;
mod direct;
mod error;
mod expr;
mod ident;
mod node;
mod session;
mod store;
mod transport;

pub use compiler::{Emission, SchemaCompiler};
pub use direct::{BuiltinMapKind, DirectCompiler, DirectNode, DirectShapeStyle, DirectValue};
pub use error::{CompileError, OrderError, SendError};
pub use expr::{
    ExprBinaryOp, ExprCompiler, ExprNode, ExprShapeStyle, ExprTernaryOp, ExprUnaryOp,
};
pub use ident::{
    is_system_id, IdAllocator, NodeId, ResourceKey, EMPTY_LAYOUT_ID, SYSTEM_ID_BASE,
    VIRTUAL_ROOT_ID,
};
pub use node::{BindingPtr, GraphNode, PrimitiveValue, ValueType};
pub use session::{apply_bundle, compile_bundle};
pub use store::ResourceGraphStore;
pub use transport::{HalTransport, Status, TransportError};
