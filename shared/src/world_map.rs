use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    messages::{crew::HireCandidate, snapshot::NO_LOCATION},
    state::AvailableMission,
    types::LocationIndex,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldMapError {
    /// The wire reserves the top index to mean "no location".
    #[error("a map can hold at most {max} locations, got {count}")]
    TooManyLocations { count: usize, max: usize },

    #[error("connection {a} <-> {b} refers to a location outside the map")]
    ConnectionOutOfRange { a: LocationIndex, b: LocationIndex },

    #[error("location {index} cannot connect to itself")]
    SelfConnection { index: LocationIndex },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub discovered: bool,
    /// Multiplies store prices and repair costs here.
    pub price_multiplier: f32,
    pub store_balance: Option<u16>,
    pub reputation: Option<f32>,
    pub hire_pool: Vec<HireCandidate>,
    pub available_missions: Vec<AvailableMission>,
}

impl Location {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            discovered: false,
            price_multiplier: 1.0,
            store_balance: None,
            reputation: None,
            hire_pool: Vec::new(),
            available_missions: Vec::new(),
        }
    }

    pub fn with_price_multiplier(mut self, multiplier: f32) -> Self {
        self.price_multiplier = multiplier;
        self
    }

    pub fn with_hire(mut self, candidate: HireCandidate) -> Self {
        self.hire_pool.push(candidate);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub a: LocationIndex,
    pub b: LocationIndex,
}

impl Connection {
    pub fn other_end(&self, from: LocationIndex) -> Option<LocationIndex> {
        if self.a == from {
            Some(self.b)
        } else if self.b == from {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Campaign geography: locations and the routes between them. Level
/// generation lives elsewhere; this only answers adjacency and pricing
/// questions for the gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MapParts")]
pub struct WorldMap {
    seed: String,
    locations: Vec<Location>,
    connections: Vec<Connection>,
}

// Deserialized maps pass through the same checks as `WorldMap::new`.
#[derive(Deserialize)]
struct MapParts {
    seed: String,
    locations: Vec<Location>,
    connections: Vec<Connection>,
}

impl TryFrom<MapParts> for WorldMap {
    type Error = WorldMapError;

    fn try_from(parts: MapParts) -> Result<Self, Self::Error> {
        Self::new(&parts.seed, parts.locations, parts.connections)
    }
}

impl WorldMap {
    pub fn new(
        seed: &str,
        locations: Vec<Location>,
        connections: Vec<Connection>,
    ) -> Result<Self, WorldMapError> {
        let max = usize::from(NO_LOCATION);
        if locations.len() > max {
            return Err(WorldMapError::TooManyLocations {
                count: locations.len(),
                max,
            });
        }
        for connection in &connections {
            if connection.a == connection.b {
                return Err(WorldMapError::SelfConnection {
                    index: connection.a,
                });
            }
            let in_range = |index: LocationIndex| usize::from(index) < locations.len();
            if !in_range(connection.a) || !in_range(connection.b) {
                return Err(WorldMapError::ConnectionOutOfRange {
                    a: connection.a,
                    b: connection.b,
                });
            }
        }
        Ok(Self {
            seed: seed.to_string(),
            locations,
            connections,
        })
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn location(&self, index: LocationIndex) -> Option<&Location> {
        self.locations.get(usize::from(index))
    }

    pub fn location_mut(&mut self, index: LocationIndex) -> Option<&mut Location> {
        self.locations.get_mut(usize::from(index))
    }

    /// Neighbours of `index`, in connection order.
    pub fn adjacent_locations(&self, index: LocationIndex) -> Vec<LocationIndex> {
        self.connections
            .iter()
            .filter_map(|connection| connection.other_end(index))
            .collect()
    }

    pub fn are_adjacent(&self, a: LocationIndex, b: LocationIndex) -> bool {
        self.connections
            .iter()
            .any(|connection| connection.other_end(a) == Some(b))
    }

    /// 1.0 for unknown locations.
    pub fn price_multiplier(&self, index: Option<LocationIndex>) -> f32 {
        index
            .and_then(|index| self.location(index))
            .map(|location| location.price_multiplier)
            .unwrap_or(1.0)
    }

    pub fn discover(&mut self, index: LocationIndex) {
        if let Some(location) = self.location_mut(index) {
            location.discovered = true;
        }
    }
}
