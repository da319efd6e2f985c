//! Network state processing logic.
//!
//! This module contains the engine's algorithms:
//! - [`allocate`] - Subnet allocation and parameter derivation
//! - [`cover`] - Covering blocks for address ranges
//! - [`dedup`] - De-duplication by route key
//! - [`reconcile`] - Route reconciliation against the controller
//! - [`overlap`] - Route targets shared across an owner's networks

mod allocate;
mod cover;
mod dedup;
mod overlap;
mod reconcile;

// Re-export public functions
pub use allocate::{derive_network_parameters, CidrPool};
pub use cover::cover_blocks_for_ranges;
pub use dedup::de_duplicate_by_key;
pub use overlap::{find_duplicate_routes, log_duplicate_routes, DuplicateRoutes};
pub use reconcile::{plan_route_changes, ReconcileOutcome, RouteReconciler};
