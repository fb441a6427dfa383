// SPDX-License-Identifier: Apache-2.0
//! Node identifiers and the session-scoped id allocator.

use rustc_hash::FxHashMap;

/// Identifier of one node in the compiled graph.
///
/// Ids live in the positive 31-bit window so the transport can carry them as
/// a signed 32-bit integer. Client-supplied structural ids must stay below
/// [`SYSTEM_ID_BASE`]; the window above it is reserved for system nodes.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// First id of the reserved system window (256 entries up to `0x7FFF_FFFF`).
pub const SYSTEM_ID_BASE: u32 = 0x7FFF_FF00;

/// System node standing in for an empty layout.
pub const EMPTY_LAYOUT_ID: NodeId = NodeId(SYSTEM_ID_BASE);

/// System node synthesized to give a multi-root graph a single root.
pub const VIRTUAL_ROOT_ID: NodeId = NodeId(SYSTEM_ID_BASE + 1);

/// True for every id inside the reserved system window.
#[must_use]
pub fn is_system_id(id: NodeId) -> bool {
    id.0 >= SYSTEM_ID_BASE
}

/// Storage key of one graph node: structural nodes are id-keyed, variable
/// nodes (data bindings and named results in the flat schema) are name-keyed.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ResourceKey {
    /// Structural node key.
    Id(NodeId),
    /// Variable node key.
    Name(String),
}

impl ResourceKey {
    /// Convenience constructor for a name key.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

impl From<NodeId> for ResourceKey {
    fn from(id: NodeId) -> Self {
        Self::Id(id)
    }
}

impl core::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum SourceKey {
    Id(u32),
    Name(String),
}

/// Session-scoped allocator of stable node ids.
///
/// Fresh ids come from a monotonically increasing counter that skips any
/// value the reserved predicate claims; ids are never reused within a
/// session. Source-keyed lookups are memoized, so repeated `id_for` calls
/// with the same client key return the same id until [`reset`].
///
/// Reserved "system" ids pass through [`id_for`] unchanged; they are never
/// remapped.
///
/// [`reset`]: IdAllocator::reset
/// [`id_for`]: IdAllocator::id_for
#[derive(Debug)]
pub struct IdAllocator {
    reserved: fn(NodeId) -> bool,
    next: u32,
    memo: FxHashMap<SourceKey, NodeId>,
}

impl IdAllocator {
    /// Creates an allocator that never hands out an id matching `reserved`.
    #[must_use]
    pub fn new(reserved: fn(NodeId) -> bool) -> Self {
        Self {
            reserved,
            next: 1,
            memo: FxHashMap::default(),
        }
    }

    /// Allocator reserving the standard system window.
    #[must_use]
    pub fn with_system_window() -> Self {
        Self::new(is_system_id)
    }

    /// Returns a fresh id, distinct from every id issued this session.
    pub fn next_id(&mut self) -> NodeId {
        loop {
            let candidate = NodeId(self.next);
            self.next = self.next.wrapping_add(1);
            if !(self.reserved)(candidate) {
                return candidate;
            }
        }
    }

    /// Returns the stable id for the client-side numeric key `source`,
    /// allocating on first use. Reserved ids pass through unchanged.
    pub fn id_for(&mut self, source: u32) -> NodeId {
        if (self.reserved)(NodeId(source)) {
            return NodeId(source);
        }
        if let Some(&id) = self.memo.get(&SourceKey::Id(source)) {
            return id;
        }
        let id = self.next_id();
        self.memo.insert(SourceKey::Id(source), id);
        id
    }

    /// Returns the stable numeric alias for the string key `name`,
    /// allocating on first use.
    pub fn id_for_name(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.memo.get(&SourceKey::Name(name.to_owned())) {
            return id;
        }
        let id = self.next_id();
        self.memo.insert(SourceKey::Name(name.to_owned()), id);
        id
    }

    /// Discards all memoized mappings and restarts the counter.
    ///
    /// Called at every compile-session `begin`; cross-session stability comes
    /// from the schema compiler re-deriving the same source keys each pass.
    pub fn reset(&mut self) {
        self.memo.clear();
        self.next = 1;
    }
}
