use fathom_shared::{CampaignState, PendingUpgrade, PrefabLookup};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::store::adjusted_price;

/// Upgrade levels already fitted to the submarine, one entry per
/// upgrade/category pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    entries: Vec<PendingUpgrade>,
}

impl UpgradeLevels {
    pub fn new(entries: Vec<PendingUpgrade>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PendingUpgrade] {
        &self.entries
    }

    pub fn level(&self, upgrade: &str, category: &str) -> u8 {
        find_level(&self.entries, upgrade, category).unwrap_or(0)
    }

    /// Fits pending upgrades, keeping whichever level is higher.
    pub fn install(&mut self, pending: &[PendingUpgrade]) {
        for upgrade in pending {
            match self
                .entries
                .iter_mut()
                .find(|entry| entry.upgrade == upgrade.upgrade && entry.category == upgrade.category)
            {
                Some(entry) => entry.level = entry.level.max(upgrade.level),
                None => self.entries.push(upgrade.clone()),
            }
        }
    }
}

fn find_level(entries: &[PendingUpgrade], upgrade: &str, category: &str) -> Option<u8> {
    entries
        .iter()
        .filter(|entry| entry.upgrade == upgrade && entry.category == category)
        .map(|entry| entry.level)
        .max()
}

/// Charges for each requested upgrade at the price of the level after the
/// highest one installed or pending, and queues it. Upgrades already at max
/// level or that money doesn't cover are skipped.
pub fn purchase_upgrades(
    state: &mut CampaignState,
    installed: &UpgradeLevels,
    prefabs: &dyn PrefabLookup,
    price_multiplier: f32,
    requested: &[PendingUpgrade],
) {
    for request in requested {
        let Some(prefab) = prefabs.upgrade(&request.upgrade) else {
            warn!("unknown upgrade {}", request.upgrade);
            continue;
        };
        let current = find_level(&state.pending_upgrades, &request.upgrade, &request.category)
            .unwrap_or(0)
            .max(installed.level(&request.upgrade, &request.category));
        let Some(next) = current.checked_add(1) else {
            continue;
        };
        let Some(base) = prefab.price_for_level(next) else {
            warn!("{} is already at max level {}", request.upgrade, prefab.max_level);
            continue;
        };
        let price = adjusted_price(base, price_multiplier);
        if state.money < price {
            warn!(
                "can't afford {} level {next}: {price} > {}",
                request.upgrade, state.money
            );
            continue;
        }
        state.money -= price;
        info!("purchased {} level {next} for {price}", request.upgrade);

        match state
            .pending_upgrades
            .iter_mut()
            .find(|entry| entry.upgrade == request.upgrade && entry.category == request.category)
        {
            Some(entry) => entry.level = next,
            None => state.pending_upgrades.push(PendingUpgrade {
                upgrade: request.upgrade.clone(),
                category: request.category.clone(),
                level: next,
            }),
        }
    }
}
