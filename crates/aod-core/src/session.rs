// SPDX-License-Identifier: Apache-2.0
//! Whole-bundle compile passes.
//!
//! A compile session is all-or-nothing: every record of the bundle compiles
//! or none of its emissions reach the store. Committing and sending are
//! separate steps so a caller can diff, log, or drop a compiled pass without
//! touching durable state.

use aod_schema::LayoutBundle;
use tracing::debug;

use crate::compiler::{Emission, SchemaCompiler};
use crate::error::CompileError;
use crate::store::ResourceGraphStore;

/// Compiles one full bundle in a fresh session.
///
/// An empty bundle compiles to the single empty-layout placeholder, so
/// "show nothing" is still an applicable, sendable pass.
///
/// # Errors
///
/// The first [`CompileError`] aborts the pass; no emissions are returned.
pub fn compile_bundle<C: SchemaCompiler>(
    compiler: &mut C,
    bundle: &LayoutBundle,
) -> Result<Vec<Emission<C::Node>>, CompileError> {
    compiler.begin();
    if bundle.is_empty() {
        let placeholder = compiler.empty_layout();
        compiler.end();
        return Ok(vec![placeholder]);
    }
    let mut emissions = Vec::new();
    for record in bundle.compile_order() {
        emissions.extend(compiler.compile(record)?);
    }
    compiler.end();
    debug!(emissions = emissions.len(), "bundle compiled");
    Ok(emissions)
}

/// Compiles `bundle` and commits every emission to `store`, returning the
/// emission count.
///
/// Unchanged nodes are recognized by the store and stay clean, so applying
/// the same bundle twice leaves nothing to send.
///
/// # Errors
///
/// On [`CompileError`] the store is left untouched.
pub fn apply_bundle<C: SchemaCompiler>(
    compiler: &mut C,
    store: &mut ResourceGraphStore<C::Node>,
    bundle: &LayoutBundle,
) -> Result<usize, CompileError> {
    let emissions = compile_bundle(compiler, bundle)?;
    let count = emissions.len();
    for (key, node) in emissions {
        store.add_or_replace(key, node);
    }
    Ok(count)
}
