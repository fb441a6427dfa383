// SPDX-License-Identifier: Apache-2.0
//! The durable node table with dirty tracking and send ordering.
//!
//! The store is the only stateful piece between compile sessions: compiled
//! nodes land here via [`ResourceGraphStore::add_or_replace`], unchanged
//! nodes are recognized by structural equality and stay clean, and
//! [`ResourceGraphStore::send`] pushes exactly the dirty subset to the
//! target, children before parents, root declared last.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{OrderError, SendError};
use crate::ident::{NodeId, ResourceKey, VIRTUAL_ROOT_ID};
use crate::node::GraphNode;
use crate::transport::HalTransport;

enum OrderOutcome {
    Order(Vec<NodeId>),
    MultiRoot(Vec<NodeId>),
}

/// Node table keyed like the target keys things: structural nodes by id,
/// variable nodes by name.
#[derive(Debug)]
pub struct ResourceGraphStore<N: GraphNode> {
    by_id: BTreeMap<NodeId, N>,
    by_name: BTreeMap<String, N>,
    dirty: BTreeSet<ResourceKey>,
    /// Children-before-parents send order over `by_id`; the last entry is
    /// the root. Valid only while `order_stale` is false.
    order: Vec<NodeId>,
    order_stale: bool,
}

impl<N: GraphNode> Default for ResourceGraphStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: GraphNode> ResourceGraphStore<N> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: BTreeMap::new(),
            by_name: BTreeMap::new(),
            dirty: BTreeSet::new(),
            order: Vec::new(),
            order_stale: false,
        }
    }

    /// Number of stored nodes, structural and named.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_name.len()
    }

    /// True when no node is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_name.is_empty()
    }

    /// Looks up a node by key.
    #[must_use]
    pub fn get(&self, key: &ResourceKey) -> Option<&N> {
        match key {
            ResourceKey::Id(id) => self.by_id.get(id),
            ResourceKey::Name(name) => self.by_name.get(name),
        }
    }

    /// True when `key` has a pending (unsent) change.
    #[must_use]
    pub fn is_dirty(&self, key: &ResourceKey) -> bool {
        self.dirty.contains(key)
    }

    /// Inserts or replaces one node. A replacement structurally equal to the
    /// stored node is a no-op: the entry stays clean and the send order stays
    /// valid.
    pub fn add_or_replace(&mut self, key: ResourceKey, node: N) {
        if self.get(&key).is_some_and(|existing| *existing == node) {
            return;
        }
        match &key {
            ResourceKey::Id(id) => {
                self.by_id.insert(*id, node);
                // Structural changes can rewire the graph.
                self.order_stale = true;
            }
            ResourceKey::Name(name) => {
                self.by_name.insert(name.clone(), node);
            }
        }
        self.dirty.insert(key);
    }

    /// Marks every stored node dirty, forcing the next send to replay the
    /// full graph (reconnect path).
    pub fn mark_all_dirty(&mut self) {
        for id in self.by_id.keys() {
            self.dirty.insert(ResourceKey::Id(*id));
        }
        for name in self.by_name.keys() {
            self.dirty.insert(ResourceKey::Name(name.clone()));
        }
    }

    /// Drops every node, pending change, and the computed order.
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_name.clear();
        self.dirty.clear();
        self.order.clear();
        self.order_stale = false;
    }

    /// The current root, i.e. the last node of the send order, regenerating
    /// the order first when it is stale. `None` when the store holds no
    /// structural node.
    ///
    /// # Errors
    ///
    /// Propagates [`OrderError`] when a stale order cannot be regenerated.
    pub fn root_id(&mut self) -> Result<Option<NodeId>, OrderError> {
        if self.order_stale {
            self.generate_send_order()?;
        }
        Ok(self.order.last().copied())
    }

    /// Recomputes the send order over the structural nodes.
    ///
    /// A previously synthesized virtual root is discarded first so root
    /// synthesis never stacks. If more than one node ends up unreferenced,
    /// a fresh virtual root adopting them (in ascending id order) is added
    /// through the normal dirty-tracking path.
    ///
    /// # Errors
    ///
    /// [`OrderError::InvalidResource`] when a node references an id with no
    /// entry, [`OrderError::Cycle`] when the graph has no topological order.
    /// The order stays stale on error.
    pub fn generate_send_order(&mut self) -> Result<(), OrderError> {
        if self.by_id.remove(&VIRTUAL_ROOT_ID).is_some() {
            self.dirty.remove(&ResourceKey::Id(VIRTUAL_ROOT_ID));
        }
        if self.by_id.is_empty() {
            self.order.clear();
            self.order_stale = false;
            return Ok(());
        }

        let order = match Self::try_order(&self.by_id)? {
            OrderOutcome::Order(order) => order,
            OrderOutcome::MultiRoot(roots) => {
                debug!(roots = roots.len(), "synthesizing virtual root");
                self.add_or_replace(VIRTUAL_ROOT_ID.into(), N::synthetic_root(roots));
                match Self::try_order(&self.by_id)? {
                    OrderOutcome::Order(order) => order,
                    // Adopting every former root leaves exactly one root.
                    OrderOutcome::MultiRoot(roots) => {
                        return Err(OrderError::Cycle {
                            remaining: roots.len(),
                        })
                    }
                }
            }
        };
        self.order = order;
        self.order_stale = false;
        Ok(())
    }

    fn try_order(by_id: &BTreeMap<NodeId, N>) -> Result<OrderOutcome, OrderError> {
        let mut in_degree: FxHashMap<NodeId, usize> =
            by_id.keys().map(|&id| (id, 0)).collect();
        for node in by_id.values() {
            for child in node.references() {
                match in_degree.get_mut(&child) {
                    Some(degree) => *degree += 1,
                    None => return Err(OrderError::InvalidResource { id: child }),
                }
            }
        }

        // Unreferenced nodes are the roots of the forest.
        let roots: Vec<NodeId> = by_id
            .keys()
            .filter(|id| in_degree[*id] == 0)
            .copied()
            .collect();
        if roots.len() > 1 {
            return Ok(OrderOutcome::MultiRoot(roots));
        }

        // Peel roots first, smallest id first for determinism, then reverse
        // so children precede their parents and the root comes last.
        let mut ready: BinaryHeap<Reverse<NodeId>> =
            roots.into_iter().map(Reverse).collect();
        let mut order = Vec::with_capacity(by_id.len());
        while let Some(Reverse(id)) = ready.pop() {
            order.push(id);
            if let Some(node) = by_id.get(&id) {
                for child in node.references() {
                    if let Some(degree) = in_degree.get_mut(&child) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.push(Reverse(child));
                        }
                    }
                }
            }
        }
        if order.len() < by_id.len() {
            return Err(OrderError::Cycle {
                remaining: by_id.len() - order.len(),
            });
        }
        order.reverse();
        Ok(OrderOutcome::Order(order))
    }

    /// Pushes every pending change to the target: named nodes first, then
    /// dirty structural nodes in send order, then the root declaration.
    ///
    /// The dirty set is cleared only when the whole pass succeeds; any
    /// failure leaves it intact so a retry resends the same (idempotent)
    /// updates.
    ///
    /// # Errors
    ///
    /// [`SendError::Order`] when the order cannot be generated, and the
    /// rejection/transport variants when the target refuses a call.
    pub fn send<T: HalTransport<N>>(&mut self, transport: &mut T) -> Result<(), SendError> {
        if self.order_stale {
            self.generate_send_order()?;
        }

        let mut sent = 0_usize;
        for (name, node) in &self.by_name {
            let key = ResourceKey::Name(name.clone());
            if !self.dirty.contains(&key) {
                continue;
            }
            let status = transport.send(&key, node)?;
            if !status.is_ok() {
                return Err(SendError::Rejected { key, status });
            }
            sent += 1;
        }
        for &id in &self.order {
            let key = ResourceKey::Id(id);
            if !self.dirty.contains(&key) {
                continue;
            }
            if let Some(node) = self.by_id.get(&id) {
                let status = transport.send(&key, node)?;
                if !status.is_ok() {
                    return Err(SendError::Rejected { key, status });
                }
                sent += 1;
            }
        }
        if let Some(&root) = self.order.last() {
            let status = transport.set_root(root)?;
            if !status.is_ok() {
                return Err(SendError::RootRejected { id: root, status });
            }
        }

        debug!(sent, total = self.len(), "send pass complete");
        self.dirty.clear();
        Ok(())
    }
}
