use std::{default::Default, time::Duration};

use fathom_shared::{TransitionConfig, MAX_ITEM_QUANTITY};

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Base price of hull repairs, before the location multiplier
    pub hull_repair_cost: i32,
    /// Base price of item repairs, before the location multiplier
    pub item_repair_cost: i32,
    /// Base price of replacing shuttles left behind last round
    pub shuttle_replace_cost: i32,
    /// Largest quantity a single cargo line may hold
    pub max_quantity: u8,
    /// Fraction of the buy price paid out for items sold to a store
    pub sell_price_ratio: f32,
    /// Phase durations and the level-load timeout of round transitions
    pub transition: TransitionConfig,
    /// How long the round continues after every player character has died
    pub crew_death_timeout: Duration,
    /// How often changed campaign state is sent to clients
    pub broadcast_interval: Duration,
    /// Unchanged state is still re-sent this often, so a lost snapshot is
    /// eventually replaced
    pub resync_interval: Duration,
    /// Lets clients move the current location directly. Debugging aid only.
    pub allow_client_location_override: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hull_repair_cost: 500,
            item_repair_cost: 500,
            shuttle_replace_cost: 1000,
            max_quantity: MAX_ITEM_QUANTITY,
            sell_price_ratio: 0.3,
            transition: TransitionConfig::default(),
            crew_death_timeout: Duration::from_secs(60),
            broadcast_interval: Duration::from_millis(250),
            resync_interval: Duration::from_secs(5),
            allow_client_location_override: false,
        }
    }
}
