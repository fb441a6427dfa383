// SPDX-License-Identifier: Apache-2.0
//! The narrow contract to whatever delivers nodes to the rendering target.
//!
//! The core never blocks or retries on its own; a transport call is a
//! synchronous, possibly-failing operation and everything else (threading,
//! reconnect policy) belongs to the caller.

use thiserror::Error;

use crate::ident::{NodeId, ResourceKey};

/// Per-call result code from the target.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    /// The call was accepted.
    Ok,
    /// The target does not understand this node kind.
    Unsupported,
    /// The node payload was rejected as invalid.
    BadValue,
    /// The target is temporarily unable to accept the call.
    Busy,
    /// Internal target failure.
    Internal,
}

impl Status {
    /// True only for [`Status::Ok`].
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Transport-level failure (as opposed to a non-OK [`Status`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection to the target dropped.
    #[error("transport disconnected")]
    Disconnected,
    /// Any other transport fault.
    #[error("transport fault: {0}")]
    Fault(String),
}

/// One node at a time, in caller-supplied order, then one root-set call.
///
/// Resending an already-applied node must be idempotent on the target; the
/// store relies on that for retries after a partial send.
pub trait HalTransport<N> {
    /// Delivers one node.
    fn send(&mut self, key: &ResourceKey, node: &N) -> Result<Status, TransportError>;

    /// Declares the evaluation root after all nodes of a pass arrived.
    fn set_root(&mut self, id: NodeId) -> Result<Status, TransportError>;

    /// Drops all target-side state (reconnect path).
    fn reset(&mut self);
}
