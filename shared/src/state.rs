use std::collections::BTreeMap;

use fathom_serde::{BitReader, BitWrite, Serde, SerdeErr};
use serde::{Deserialize, Serialize};

use crate::types::{CharacterId, LocationIndex, MissionIndex};

/// Services bought for the next round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairFlags {
    pub hull: bool,
    pub items: bool,
    pub lost_shuttles: bool,
}

impl Serde for RepairFlags {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.hull.ser(writer);
        self.items.ser(writer);
        self.lost_shuttles.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            hull: bool::de(reader)?,
            items: bool::de(reader)?,
            lost_shuttles: bool::de(reader)?,
        })
    }
}

/// A mission offered at the current location. `connection_index` points into
/// the current location's connection list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableMission {
    pub identifier: String,
    pub connection_index: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasedItem {
    pub identifier: String,
    pub quantity: u8,
}

impl PurchasedItem {
    pub fn new(identifier: &str, quantity: u8) -> Self {
        Self {
            identifier: identifier.to_string(),
            quantity,
        }
    }
}

/// An item handed over to the store. `removed` marks entries whose item has
/// already been taken out of the world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldItem {
    pub identifier: String,
    pub id: u16,
    pub removed: bool,
    pub seller_id: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpgrade {
    pub upgrade: String,
    pub category: String,
    pub level: u8,
}

/// The recipient's own character, sent only to the client it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub id: CharacterId,
    pub name: String,
    pub job: String,
}

impl Serde for CharacterInfo {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.id.ser(writer);
        self.name.ser(writer);
        self.job.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: i32::de(reader)?,
            name: String::de(reader)?,
            job: String::de(reader)?,
        })
    }
}

/// Every replicated campaign field apart from the version counters, which
/// live on [`crate::VersionedCampaign`].
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignState {
    pub is_first_round: bool,
    pub map_seed: String,
    pub current_location: Option<LocationIndex>,
    pub selected_location: Option<LocationIndex>,
    pub selected_mission: Option<MissionIndex>,
    pub location_reputation: Option<f32>,
    pub faction_reputations: BTreeMap<String, f32>,
    pub force_map_ui: bool,
    pub money: i32,
    pub repairs: RepairFlags,
    pub available_missions: Vec<AvailableMission>,
    pub store_balance: Option<u16>,
    pub buy_crate_items: Vec<PurchasedItem>,
    pub purchased_items: Vec<PurchasedItem>,
    pub sold_items: Vec<SoldItem>,
    pub pending_upgrades: Vec<PendingUpgrade>,
}

impl Default for CampaignState {
    fn default() -> Self {
        Self {
            is_first_round: true,
            map_seed: String::new(),
            current_location: None,
            selected_location: None,
            selected_mission: None,
            location_reputation: None,
            faction_reputations: BTreeMap::new(),
            force_map_ui: false,
            money: 0,
            repairs: RepairFlags::default(),
            available_missions: Vec::new(),
            store_balance: None,
            buy_crate_items: Vec::new(),
            purchased_items: Vec::new(),
            sold_items: Vec::new(),
            pending_upgrades: Vec::new(),
        }
    }
}

impl CampaignState {
    pub fn new(map_seed: &str, money: i32) -> Self {
        Self {
            map_seed: map_seed.to_string(),
            money,
            ..Self::default()
        }
    }

    /// Selects a destination. Changing or clearing the destination drops
    /// the selected mission, which only makes sense for one connection.
    pub fn select_location(&mut self, location: Option<LocationIndex>) {
        if self.selected_location != location {
            self.selected_mission = None;
        }
        self.selected_location = location;
    }

    /// Ignored while no destination is selected.
    pub fn select_mission(&mut self, mission: Option<MissionIndex>) {
        if self.selected_location.is_none() {
            self.selected_mission = None;
            return;
        }
        self.selected_mission = mission;
    }

    pub fn purchased_quantity(&self, identifier: &str) -> u32 {
        self.purchased_items
            .iter()
            .filter(|item| item.identifier == identifier)
            .map(|item| u32::from(item.quantity))
            .sum()
    }

    /// Copies the fields that are only valid relative to a particular save.
    pub fn copy_save_dependent_from(&mut self, other: &CampaignState) {
        self.map_seed = other.map_seed.clone();
        self.current_location = other.current_location;
        self.selected_location = other.selected_location;
        self.selected_mission = other.selected_mission;
        self.location_reputation = other.location_reputation;
        self.faction_reputations = other.faction_reputations.clone();
        self.force_map_ui = other.force_map_ui;
        self.available_missions = other.available_missions.clone();
        self.store_balance = other.store_balance;
        self.buy_crate_items = other.buy_crate_items.clone();
        self.purchased_items = other.purchased_items.clone();
        self.sold_items = other.sold_items.clone();
        self.pending_upgrades = other.pending_upgrades.clone();
    }

    /// Copies the fields that can be applied whatever save is loaded.
    pub fn copy_always_safe_from(&mut self, other: &CampaignState) {
        self.is_first_round = other.is_first_round;
        self.money = other.money;
        self.repairs = other.repairs;
    }
}
