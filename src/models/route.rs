//! Route and persisted network models.

use serde::{Deserialize, Serialize};

/// Key fragment used for a route without a gateway.
pub const NULL_VIA: &str = "null";

/// Normalize a `via` value: absent, empty or blank all mean "directly attached".
pub fn normalize_via(via: Option<&str>) -> Option<&str> {
    via.map(str::trim).filter(|v| !v.is_empty())
}

/// Build the reconciliation key `target-via` for a route. Both parts are
/// trimmed, matching what gets written by [`Route::normalized`].
pub fn route_key(target: &str, via: Option<&str>) -> String {
    format!("{}-{}", target.trim(), normalize_via(via).unwrap_or(NULL_VIA))
}

/// A route as reported by the controller: destination block and next hop.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    /// Destination network block, e.g. `10.121.15.0/24`.
    pub target: String,
    /// Next-hop gateway, `None` when directly attached.
    #[serde(default)]
    pub via: Option<String>,
}

impl Route {
    pub fn new(target: impl Into<String>, via: Option<&str>) -> Route {
        Route {
            target: target.into(),
            via: via.map(str::to_string),
        }
    }

    /// Route without a gateway.
    pub fn lan(target: impl Into<String>) -> Route {
        Route::new(target, None)
    }

    pub fn key(&self) -> String {
        route_key(&self.target, self.via.as_deref())
    }

    /// Copy of this route with `via` normalized.
    pub fn normalized(&self) -> Route {
        Route::new(self.target.trim(), normalize_via(self.via.as_deref()))
    }
}

/// A route row as stored in the local mirror.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRoute {
    /// Store-assigned identifier.
    pub id: String,
    pub network_id: String,
    pub target: String,
    #[serde(default)]
    pub via: Option<String>,
}

impl PersistedRoute {
    pub fn key(&self) -> String {
        route_key(&self.target, self.via.as_deref())
    }

    /// True when the stored field values differ from the (normalized)
    /// controller copy of the same route.
    pub fn differs_from(&self, route: &Route) -> bool {
        let route = route.normalized();
        self.target != route.target || self.via != route.via
    }
}

/// A network row of the local mirror, with its routes when loaded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedNetwork {
    pub nwid: String,
    #[serde(default)]
    pub name: String,
    /// Requester owning the network.
    #[serde(default)]
    pub owner_id: String,
    /// `None` when the network has no route history and is not under
    /// reconciliation management.
    #[serde(default)]
    pub routes: Option<Vec<PersistedRoute>>,
}

impl PersistedNetwork {
    /// Targets of the persisted routes, the network's entry in a usage record.
    pub fn route_targets(&self) -> Vec<String> {
        self.routes
            .iter()
            .flatten()
            .map(|r| r.target.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_key_normalizes_via() {
        assert_eq!(Route::lan("10.0.0.0/24").key(), "10.0.0.0/24-null");
        assert_eq!(
            Route::new("10.0.0.0/24", Some("")).key(),
            "10.0.0.0/24-null"
        );
        assert_eq!(
            Route::new("10.0.0.0/24", Some("  ")).key(),
            "10.0.0.0/24-null"
        );
        assert_eq!(
            Route::new("10.0.0.0/24", Some("10.0.0.1")).key(),
            "10.0.0.0/24-10.0.0.1"
        );
    }

    #[test]
    fn test_route_key_trims_target() {
        let padded = Route::lan(" 10.0.0.0/24 ");
        assert_eq!(padded.key(), "10.0.0.0/24-null");
        assert_eq!(padded.key(), padded.normalized().key());
        assert_eq!(route_key("\t10.0.0.0/24", Some(" 10.0.0.1 ")), "10.0.0.0/24-10.0.0.1");
    }

    #[test]
    fn test_differs_from_raw_empty_via() {
        let stored = PersistedRoute {
            id: "r1".to_string(),
            network_id: "nw".to_string(),
            target: "10.0.0.0/24".to_string(),
            via: Some("".to_string()),
        };
        let route = Route::lan("10.0.0.0/24");
        assert_eq!(stored.key(), route.key());
        assert!(stored.differs_from(&route));

        let clean = PersistedRoute { via: None, ..stored };
        assert!(!clean.differs_from(&route));
    }

    #[test]
    fn test_route_deserialize_missing_via() {
        let route: Route = serde_json::from_str(r#"{"target":"10.1.0.0/16"}"#).unwrap();
        assert_eq!(route, Route::lan("10.1.0.0/16"));
        let route: Route =
            serde_json::from_str(r#"{"target":"10.1.0.0/16","via":null}"#).unwrap();
        assert_eq!(route.via, None);
    }

    #[test]
    fn test_route_targets_of_unmanaged_network() {
        let network = PersistedNetwork {
            nwid: "nw".to_string(),
            name: "n".to_string(),
            owner_id: "u".to_string(),
            routes: None,
        };
        assert!(network.route_targets().is_empty());
    }
}
