//! Subnet allocation for new networks.
//!
//! Picks a block from a fixed candidate pool, preferring blocks the requester
//! does not use yet, and derives the controller parameters for it.

use crate::config;
use crate::models::{IpAssignmentPool, Ipv4, NetworkParameters, Route, V4AssignMode};
use itertools::Itertools;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::error::Error;

/// Ordered list of blocks available for assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct CidrPool {
    candidates: Vec<Ipv4>,
}

impl CidrPool {
    /// Build a pool from an ordered, non-empty candidate list.
    pub fn new(candidates: Vec<Ipv4>) -> Result<CidrPool, Box<dyn Error>> {
        if candidates.is_empty() {
            return Err("Candidate pool must contain at least one CIDR".into());
        }
        Ok(CidrPool { candidates })
    }

    pub fn candidates(&self) -> &[Ipv4] {
        &self.candidates
    }

    /// Choose a block for a new network.
    ///
    /// `used_pools` holds one list of CIDR strings per existing network of the
    /// requester. With `prefer_random` set the pick is uniform over the pool.
    /// Otherwise the first unused candidate wins, and once every candidate is
    /// in use the least used one (earliest on ties). Never fails.
    pub fn allocate<P, S>(&self, used_pools: &[P], prefer_random: bool) -> Ipv4
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        if prefer_random {
            let mut rng = rand::thread_rng();
            if let Some(cidr) = self.candidates.choose(&mut rng) {
                log::debug!("allocate: random pick {cidr}");
                return *cidr;
            }
        }

        let usage: HashMap<&str, usize> = used_pools
            .iter()
            .flat_map(|pool| pool.as_ref().iter())
            .map(|cidr| cidr.as_ref().trim())
            .counts();

        let counted: Vec<(Ipv4, usize)> = self
            .candidates
            .iter()
            .map(|cidr| (*cidr, usage.get(cidr.to_string().as_str()).copied().unwrap_or(0)))
            .collect();

        if let Some((cidr, _)) = counted.iter().find(|(_, count)| *count == 0) {
            log::debug!("allocate: first unused candidate {cidr}");
            return *cidr;
        }

        // min_by_key keeps the first of equal minima, so pool order breaks ties
        let (cidr, count) = counted
            .iter()
            .min_by_key(|(_, count)| *count)
            .copied()
            .unwrap_or((self.candidates[0], 0));
        log::info!("allocate: candidate pool exhausted, reusing {cidr} (used {count} times)");
        cidr
    }

    /// Parameters for a new network: the explicit block when given, otherwise
    /// one picked by [`CidrPool::allocate`].
    pub fn network_parameters<P, S>(
        &self,
        cidr: Option<Ipv4>,
        used_pools: &[P],
        prefer_random: bool,
    ) -> Result<NetworkParameters, Box<dyn Error>>
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        let cidr = match cidr {
            Some(cidr) => cidr,
            None => self.allocate(used_pools, prefer_random),
        };
        let mut params = derive_network_parameters(cidr)?;
        params.cidr_options = self.candidates.clone();
        Ok(params)
    }
}

impl Default for CidrPool {
    fn default() -> Self {
        CidrPool {
            candidates: config::Config::default().cidr_pool,
        }
    }
}

/// Derive the assignment pool, route and addressing mode for one block.
///
/// The usable range excludes the network and broadcast addresses, so /31 and
/// /32 blocks are rejected.
pub fn derive_network_parameters(cidr: Ipv4) -> Result<NetworkParameters, Box<dyn Error>> {
    let network = cidr.network()?;
    let (first, last) = network.usable_range()?;

    Ok(NetworkParameters {
        ip_assignment_pools: vec![IpAssignmentPool::new(first, last)],
        routes: vec![Route::lan(network.to_string())],
        v4_assign_mode: V4AssignMode { zt: true },
        cidr_options: vec![],
    })
}
