// SPDX-License-Identifier: Apache-2.0
//! The schema-agnostic compiler seam.

use aod_schema::RecordRef;

use crate::error::CompileError;
use crate::ident::{ResourceKey, SYSTEM_ID_BASE};
use crate::node::GraphNode;

/// One compiled pair: the storage key and the node that defines it.
pub type Emission<N> = (ResourceKey, N);

/// Translates declarative records into graph nodes for one schema target.
///
/// Exactly one implementation is active per store, selected by the connected
/// transport's schema version. Implementations own all session-scoped state
/// (id remap tables, dedup caches, mapping-usage tables) and reset it in
/// [`begin`].
///
/// [`begin`]: SchemaCompiler::begin
pub trait SchemaCompiler {
    /// Node payload this schema emits.
    type Node: GraphNode;

    /// Opens a compile session, resetting every session-scoped cache.
    fn begin(&mut self);

    /// Closes a compile session. The default does nothing.
    fn end(&mut self) {}

    /// Translates one record into zero or more emissions, the record's own
    /// defining pair last.
    ///
    /// Record kinds the schema does not recognize produce an empty emission
    /// list rather than an error, tolerating schema skew in either
    /// direction.
    ///
    /// # Errors
    ///
    /// Any [`CompileError`] aborts the whole session; callers must not
    /// commit earlier emissions of the same pass.
    fn compile(&mut self, record: RecordRef<'_>) -> Result<Vec<Emission<Self::Node>>, CompileError>;

    /// The placeholder emission for an empty layout, keyed at
    /// [`crate::ident::EMPTY_LAYOUT_ID`].
    fn empty_layout(&mut self) -> Emission<Self::Node>;
}

/// Rejects structural ids that stray into the reserved system window.
pub(crate) fn check_client_id(id: u32) -> Result<(), CompileError> {
    if id >= SYSTEM_ID_BASE {
        return Err(CompileError::IdOutOfRange { id });
    }
    Ok(())
}
