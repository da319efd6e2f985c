//! Persistence of the local network mirror.
//!
//! - [`RouteStore`] - contract the engine needs from the relational store
//! - [`memory`] - in-process transactional implementation

mod memory;

pub use memory::MemoryRouteStore;

use crate::error::StoreResult;
use crate::models::{PersistedNetwork, PersistedRoute, Route};

/// Route writes for one network that must commit together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteBatch {
    /// New rows.
    pub create: Vec<Route>,
    /// Existing rows, by id, with their refreshed field values.
    pub update: Vec<PersistedRoute>,
    /// Ids of rows to remove.
    pub delete: Vec<String>,
}

impl RouteBatch {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    /// Number of row writes in the batch.
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }
}

/// Storage backing the local mirror.
///
/// `apply_route_batch` is the transactional boundary: either every write of
/// the batch becomes visible or none does, and two batches for the same
/// network never interleave.
pub trait RouteStore: Send + Sync {
    /// Load one network with its routes.
    fn network(&self, nwid: &str) -> StoreResult<Option<PersistedNetwork>>;

    /// All networks owned by a requester, with their routes.
    fn networks_for_owner(&self, owner_id: &str) -> StoreResult<Vec<PersistedNetwork>>;

    /// Store a new network with its initial routes.
    fn insert_network(
        &self,
        nwid: &str,
        name: &str,
        owner_id: &str,
        routes: &[Route],
    ) -> StoreResult<PersistedNetwork>;

    /// Apply a batch atomically and return the network re-read afterwards.
    fn apply_route_batch(&self, nwid: &str, batch: &RouteBatch) -> StoreResult<PersistedNetwork>;
}

/// CIDR blocks already used by a requester, one list per network.
pub fn usage_record(store: &dyn RouteStore, owner_id: &str) -> StoreResult<Vec<Vec<String>>> {
    Ok(store
        .networks_for_owner(owner_id)?
        .iter()
        .map(PersistedNetwork::route_targets)
        .collect())
}
