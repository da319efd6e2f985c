//! In-memory route store.
//!
//! Each batch is applied to a staged copy of the network and published only
//! when every write succeeded, which gives the same all-or-nothing view a
//! database transaction would.

use super::{RouteBatch, RouteStore};
use crate::error::{StoreError, StoreResult};
use crate::models::{normalize_via, PersistedNetwork, PersistedRoute, Route};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryRouteStore {
    networks: Mutex<BTreeMap<String, PersistedNetwork>>,
    /// One-shot fault: abort the transaction on this write number.
    pending_fault: Mutex<Option<usize>>,
    committed: AtomicUsize,
}

impl MemoryRouteStore {
    pub fn new() -> MemoryRouteStore {
        MemoryRouteStore::default()
    }

    /// Store seeded with existing rows, e.g. from a dump.
    pub fn with_networks(networks: Vec<PersistedNetwork>) -> MemoryRouteStore {
        let store = MemoryRouteStore::new();
        {
            let mut map = store.networks.lock();
            for network in networks {
                map.insert(network.nwid.clone(), network);
            }
        }
        store
    }

    /// Make the next transaction fail when it reaches its `n`th write
    /// (1-based). Writes before it in the same transaction are discarded.
    pub fn fail_on_write(&self, n: usize) {
        *self.pending_fault.lock() = Some(n);
    }

    /// Number of batches committed so far.
    pub fn committed_batches(&self) -> usize {
        self.committed.load(Ordering::SeqCst)
    }

    /// Number of route rows of a network, 0 when unknown or unmanaged.
    pub fn route_count(&self, nwid: &str) -> usize {
        self.networks
            .lock()
            .get(nwid)
            .and_then(|n| n.routes.as_ref().map(Vec::len))
            .unwrap_or(0)
    }

    fn new_row(nwid: &str, route: &Route) -> PersistedRoute {
        let route = route.normalized();
        PersistedRoute {
            id: Uuid::new_v4().to_string(),
            network_id: nwid.to_string(),
            target: route.target,
            via: route.via,
        }
    }
}

/// Counts writes inside one transaction and trips the injected fault.
struct WriteGuard {
    fail_on: Option<usize>,
    writes: usize,
}

impl WriteGuard {
    fn write(&mut self, nwid: &str) -> StoreResult<()> {
        self.writes += 1;
        if self.fail_on == Some(self.writes) {
            return Err(StoreError::TransactionAborted {
                reason: format!("injected failure on write {} for network {nwid}", self.writes),
            });
        }
        Ok(())
    }
}

impl RouteStore for MemoryRouteStore {
    fn network(&self, nwid: &str) -> StoreResult<Option<PersistedNetwork>> {
        Ok(self.networks.lock().get(nwid).cloned())
    }

    fn networks_for_owner(&self, owner_id: &str) -> StoreResult<Vec<PersistedNetwork>> {
        Ok(self
            .networks
            .lock()
            .values()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn insert_network(
        &self,
        nwid: &str,
        name: &str,
        owner_id: &str,
        routes: &[Route],
    ) -> StoreResult<PersistedNetwork> {
        let mut networks = self.networks.lock();
        if networks.contains_key(nwid) {
            return Err(StoreError::NetworkExists {
                nwid: nwid.to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(routes.len());
        for route in routes {
            if !seen.insert(route.key()) {
                return Err(StoreError::DuplicateRoute {
                    nwid: nwid.to_string(),
                    key: route.key(),
                });
            }
            rows.push(Self::new_row(nwid, route));
        }

        let network = PersistedNetwork {
            nwid: nwid.to_string(),
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            routes: Some(rows),
        };
        networks.insert(nwid.to_string(), network.clone());
        log::debug!("insert_network: {nwid} with {} routes", routes.len());
        Ok(network)
    }

    fn apply_route_batch(&self, nwid: &str, batch: &RouteBatch) -> StoreResult<PersistedNetwork> {
        // Held for the whole transaction, so batches never interleave.
        let mut networks = self.networks.lock();
        let mut guard = WriteGuard {
            fail_on: self.pending_fault.lock().take(),
            writes: 0,
        };

        let mut staged = networks
            .get(nwid)
            .cloned()
            .ok_or_else(|| StoreError::NetworkNotFound {
                nwid: nwid.to_string(),
            })?;
        let mut rows = staged.routes.take().unwrap_or_default();

        for route in &batch.create {
            guard.write(nwid)?;
            let key = route.key();
            if rows.iter().any(|r| r.key() == key) {
                return Err(StoreError::DuplicateRoute {
                    nwid: nwid.to_string(),
                    key,
                });
            }
            rows.push(Self::new_row(nwid, route));
        }

        for update in &batch.update {
            guard.write(nwid)?;
            let row = rows
                .iter_mut()
                .find(|r| r.id == update.id)
                .ok_or_else(|| StoreError::RouteNotFound {
                    nwid: nwid.to_string(),
                    id: update.id.clone(),
                })?;
            row.target = update.target.trim().to_string();
            row.via = normalize_via(update.via.as_deref()).map(str::to_string);
        }

        for id in &batch.delete {
            guard.write(nwid)?;
            let before = rows.len();
            rows.retain(|r| &r.id != id);
            if rows.len() == before {
                return Err(StoreError::RouteNotFound {
                    nwid: nwid.to_string(),
                    id: id.clone(),
                });
            }
        }

        staged.routes = Some(rows);
        networks.insert(nwid.to_string(), staged.clone());
        self.committed.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "apply_route_batch: {nwid} committed {} writes",
            guard.writes
        );
        Ok(staged)
    }
}
