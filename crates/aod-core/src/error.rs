// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for compile, order generation, and send.

use thiserror::Error;

use crate::ident::{NodeId, ResourceKey};
use crate::transport::{Status, TransportError};

/// A declarative record could not be translated.
///
/// Any variant aborts the whole compile session: a partial graph is worse
/// than no update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A required sub-record or field was absent.
    #[error("record {record} is missing required field `{field}`")]
    MissingField {
        /// Offending record, by kind and key.
        record: String,
        /// Name of the absent field.
        field: &'static str,
    },
    /// A structural id fell inside the reserved system window.
    #[error("resource id {id} is outside the client id window")]
    IdOutOfRange {
        /// The rejected raw id.
        id: u32,
    },
    /// A mapping definition violated its arity invariant.
    #[error("mapping {name} is malformed: {reason}")]
    MalformedMapping {
        /// Client-side mapping name.
        name: u32,
        /// What was wrong.
        reason: &'static str,
    },
    /// Record content the active schema cannot express.
    #[error("{detail} is not supported by the {schema} schema")]
    Unsupported {
        /// Which schema rejected it.
        schema: &'static str,
        /// What was rejected.
        detail: &'static str,
    },
}

/// Order generation failed; the store stays dirty so a retry recomputes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// A stored node references an id with no entry in the table.
    #[error("resource {id} is referenced but not present")]
    InvalidResource {
        /// The dangling reference.
        id: NodeId,
    },
    /// The structural graph has no topological order.
    #[error("dependency cycle among {remaining} resources")]
    Cycle {
        /// Nodes left unpeeled when progress stopped.
        remaining: usize,
    },
}

/// A send aborted; already-delivered nodes stay applied on the target and
/// every unconfirmed key stays dirty for the retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The send order could not be generated.
    #[error(transparent)]
    Order(#[from] OrderError),
    /// The target rejected a node.
    #[error("target rejected {key}: {status:?}")]
    Rejected {
        /// Key of the rejected node.
        key: ResourceKey,
        /// Status the transport returned.
        status: Status,
    },
    /// The target rejected the root-set call.
    #[error("target rejected set_root({id}): {status:?}")]
    RootRejected {
        /// The root id offered.
        id: NodeId,
        /// Status the transport returned.
        status: Status,
    },
    /// The transport itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
