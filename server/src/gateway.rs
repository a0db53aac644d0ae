//! Server-side arbitration of client requests. Every field of a request is
//! a proposal: it is re-validated against the map and re-priced against the
//! current location before anything is applied.

use fastrand::Rng;
use fathom_shared::{
    CampaignRequest, CampaignState, LocationIndex, PrefabLookup, RepairFlags, WorldMap,
};
use log::{debug, warn};

use crate::{
    server_config::ServerConfig,
    store::{adjusted_price, apply_repairs, RepairCosts, Store},
    upgrades::{purchase_upgrades, UpgradeLevels},
};

/// Read-only context a request is judged against.
pub(crate) struct Gateway<'a> {
    pub config: &'a ServerConfig,
    pub prefabs: &'a dyn PrefabLookup,
    pub map: &'a WorldMap,
    pub installed_upgrades: &'a UpgradeLevels,
}

impl<'a> Gateway<'a> {
    /// Applies whatever part of `request` is valid and affordable. Callers
    /// run this against a draft so a request that changes nothing leaves the
    /// update id alone.
    pub fn apply_request(&self, state: &mut CampaignState, request: &CampaignRequest, rng: &mut Rng) {
        self.apply_location(state, request, rng);
        self.apply_mission(state, request);

        let multiplier = self.map.price_multiplier(state.current_location);
        apply_repairs(state, request.repairs, self.repair_costs(multiplier));

        let store = Store::new(
            self.prefabs,
            multiplier,
            self.config.sell_price_ratio,
            self.config.max_quantity,
        );
        store.replace_buy_crate(state, &request.buy_crate_items);
        store.repurchase(state, &request.purchased_items);
        store.resell(state, &request.sold_items);

        purchase_upgrades(
            state,
            self.installed_upgrades,
            self.prefabs,
            multiplier,
            &request.purchased_upgrades,
        );
    }

    pub fn repair_costs(&self, multiplier: f32) -> RepairCosts {
        RepairCosts {
            hull: adjusted_price(self.config.hull_repair_cost, multiplier),
            items: adjusted_price(self.config.item_repair_cost, multiplier),
            lost_shuttles: adjusted_price(self.config.shuttle_replace_cost, multiplier),
        }
    }

    fn apply_location(&self, state: &mut CampaignState, request: &CampaignRequest, rng: &mut Rng) {
        if request.current_location != state.current_location {
            match request.current_location {
                Some(index)
                    if self.config.allow_client_location_override
                        && self.map.location(index).is_some() =>
                {
                    warn!("client moved the campaign to location {index}");
                    enter_location(state, self.map, index);
                }
                _ => debug!(
                    "ignoring client current location {:?}",
                    request.current_location
                ),
            }
        }

        let Some(current) = state.current_location else {
            return;
        };
        match request.selected_location {
            Some(selected) if self.map.are_adjacent(current, selected) => {
                state.select_location(Some(selected));
            }
            Some(selected) => {
                warn!("location {selected} is not adjacent to {current}, keeping selection");
            }
            None => {
                state.select_location(random_destination(self.map, current, rng));
            }
        }
    }

    fn apply_mission(&self, state: &mut CampaignState, request: &CampaignRequest) {
        let mission = request
            .selected_mission
            .filter(|index| usize::from(*index) < state.available_missions.len());
        if mission != request.selected_mission {
            warn!("mission {:?} is not available here", request.selected_mission);
        }
        state.select_mission(mission);
    }
}

/// Picks an adjacent location, preferring ones the crew hasn't discovered.
pub(crate) fn random_destination(
    map: &WorldMap,
    current: LocationIndex,
    rng: &mut Rng,
) -> Option<LocationIndex> {
    let adjacent = map.adjacent_locations(current);
    let undiscovered: Vec<LocationIndex> = adjacent
        .iter()
        .copied()
        .filter(|index| map.location(*index).is_some_and(|l| !l.discovered))
        .collect();
    let pool = if undiscovered.is_empty() {
        adjacent
    } else {
        undiscovered
    };
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.usize(..pool.len())])
}

/// Moves the campaign to `index` and takes the per-location fields from the
/// map. Clears the destination.
pub(crate) fn enter_location(state: &mut CampaignState, map: &WorldMap, index: LocationIndex) {
    state.current_location = Some(index);
    state.select_location(None);
    if let Some(location) = map.location(index) {
        state.location_reputation = location.reputation;
        state.store_balance = location.store_balance;
        state.available_missions = location.available_missions.clone();
    }
}

/// Round-scoped purchases are consumed once the next level spawns them.
pub(crate) fn clear_round_purchases(state: &mut CampaignState) {
    state.repairs = RepairFlags::default();
    state.buy_crate_items.clear();
    state.purchased_items.clear();
    state.sold_items.clear();
}

#[cfg(test)]
mod tests {
    use fathom_shared::{
        AvailableMission, Connection, Location, PendingUpgrade, PrefabRegistry, PurchasedItem,
    };

    use super::*;

    fn registry() -> PrefabRegistry {
        PrefabRegistry::new()
            .with_item("steelbar", 40)
            .with_upgrade("hullarmor", 3, 500, 250)
            .with_upgrade_category("hull")
    }

    // 0 - 1, 0 - 2, 2 - 3
    fn map() -> WorldMap {
        let mut start = Location::new("start").with_price_multiplier(2.0);
        start.discovered = true;
        start.available_missions.push(AvailableMission {
            identifier: "salvage".to_string(),
            connection_index: 0,
        });
        let mut visited = Location::new("visited");
        visited.discovered = true;
        WorldMap::new(
            "seed",
            vec![start, visited, Location::new("fresh"), Location::new("far")],
            vec![
                Connection { a: 0, b: 1 },
                Connection { a: 0, b: 2 },
                Connection { a: 2, b: 3 },
            ],
        )
        .unwrap()
    }

    fn started(map: &WorldMap, money: i32) -> CampaignState {
        let mut state = CampaignState::new("seed", money);
        enter_location(&mut state, map, 0);
        state
    }

    #[test]
    fn non_adjacent_selection_is_ignored() {
        let (config, registry, map) = (ServerConfig::default(), registry(), map());
        let gateway = Gateway {
            config: &config,
            prefabs: &registry,
            map: &map,
            installed_upgrades: &UpgradeLevels::default(),
        };
        let mut state = started(&map, 0);
        state.select_location(Some(1));

        let mut request = CampaignRequest::from_state(&state);
        request.selected_location = Some(3);
        gateway.apply_request(&mut state, &request, &mut Rng::with_seed(1));
        assert_eq!(state.selected_location, Some(1));
    }

    #[test]
    fn no_selection_prefers_undiscovered_neighbours() {
        let map = map();
        let mut rng = Rng::with_seed(7);
        for _ in 0..20 {
            assert_eq!(random_destination(&map, 0, &mut rng), Some(2));
        }
        // every neighbour of 1 is discovered
        assert_eq!(random_destination(&map, 1, &mut rng), Some(0));
    }

    #[test]
    fn client_cannot_move_the_campaign_by_default() {
        let (mut config, registry, map) = (ServerConfig::default(), registry(), map());
        let mut state = started(&map, 0);
        let mut request = CampaignRequest::from_state(&state);
        request.current_location = Some(3);

        {
            let gateway = Gateway {
                config: &config,
                prefabs: &registry,
                map: &map,
                installed_upgrades: &UpgradeLevels::default(),
            };
            gateway.apply_request(&mut state, &request, &mut Rng::with_seed(1));
        }
        assert_eq!(state.current_location, Some(0));

        config.allow_client_location_override = true;
        let gateway = Gateway {
            config: &config,
            prefabs: &registry,
            map: &map,
            installed_upgrades: &UpgradeLevels::default(),
        };
        gateway.apply_request(&mut state, &request, &mut Rng::with_seed(1));
        assert_eq!(state.current_location, Some(3));
    }

    #[test]
    fn prices_follow_the_location_multiplier() {
        let (config, registry, map) = (ServerConfig::default(), registry(), map());
        let gateway = Gateway {
            config: &config,
            prefabs: &registry,
            map: &map,
            installed_upgrades: &UpgradeLevels::default(),
        };
        let mut state = started(&map, 2000);
        state.select_location(Some(1));

        let mut request = CampaignRequest::from_state(&state);
        request.repairs.hull = true;
        request.purchased_items = vec![PurchasedItem::new("steelbar", 5)];
        request.purchased_upgrades = vec![PendingUpgrade {
            upgrade: "hullarmor".to_string(),
            category: "hull".to_string(),
            level: 1,
        }];
        gateway.apply_request(&mut state, &request, &mut Rng::with_seed(1));

        // hull 1000, steelbar 5 * 80, hullarmor 1000 is no longer affordable
        assert!(state.repairs.hull);
        assert_eq!(state.purchased_items, vec![PurchasedItem::new("steelbar", 5)]);
        assert!(state.pending_upgrades.is_empty());
        assert_eq!(state.money, 600);
    }

    #[test]
    fn mission_needs_a_destination_and_must_exist() {
        let (config, registry, map) = (ServerConfig::default(), registry(), map());
        let gateway = Gateway {
            config: &config,
            prefabs: &registry,
            map: &map,
            installed_upgrades: &UpgradeLevels::default(),
        };
        let mut state = started(&map, 0);
        state.select_location(Some(1));

        let mut request = CampaignRequest::from_state(&state);
        request.selected_mission = Some(4);
        gateway.apply_request(&mut state, &request, &mut Rng::with_seed(1));
        assert_eq!(state.selected_mission, None);

        request.selected_mission = Some(0);
        gateway.apply_request(&mut state, &request, &mut Rng::with_seed(1));
        assert_eq!(state.selected_mission, Some(0));
    }
}
