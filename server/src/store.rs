use fathom_shared::{CampaignState, PrefabLookup, PurchasedItem, RepairFlags, SoldItem};
use log::{debug, warn};

/// `base` scaled by a location's price multiplier.
pub fn adjusted_price(base: i32, multiplier: f32) -> i32 {
    (base as f32 * multiplier).round() as i32
}

/// Location-adjusted prices of the three mechanic services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepairCosts {
    pub hull: i32,
    pub items: i32,
    pub lost_shuttles: i32,
}

/// Brings `state.repairs` in line with `requested`. Each newly toggled
/// service is bought only if money covers it; untoggling refunds it.
pub fn apply_repairs(state: &mut CampaignState, requested: RepairFlags, costs: RepairCosts) {
    toggle_service(&mut state.money, &mut state.repairs.hull, requested.hull, costs.hull, "hull repairs");
    toggle_service(&mut state.money, &mut state.repairs.items, requested.items, costs.items, "item repairs");
    toggle_service(
        &mut state.money,
        &mut state.repairs.lost_shuttles,
        requested.lost_shuttles,
        costs.lost_shuttles,
        "shuttle replacement",
    );
}

fn toggle_service(money: &mut i32, purchased: &mut bool, wanted: bool, cost: i32, name: &str) {
    if *purchased == wanted {
        return;
    }
    if wanted {
        if *money < cost {
            warn!("can't afford {name}: {cost} > {money}");
            return;
        }
        *money -= cost;
    } else {
        *money = money.saturating_add(cost);
    }
    *purchased = wanted;
}

/// Cargo trading at one location. Prices are the prefab base price times the
/// location multiplier; sales pay out a fixed fraction of that.
pub struct Store<'p> {
    prefabs: &'p dyn PrefabLookup,
    price_multiplier: f32,
    sell_price_ratio: f32,
    max_quantity: u8,
}

impl<'p> Store<'p> {
    pub fn new(
        prefabs: &'p dyn PrefabLookup,
        price_multiplier: f32,
        sell_price_ratio: f32,
        max_quantity: u8,
    ) -> Self {
        Self {
            prefabs,
            price_multiplier,
            sell_price_ratio,
            max_quantity,
        }
    }

    pub fn buy_price(&self, identifier: &str) -> Option<i32> {
        let prefab = self.prefabs.item(identifier)?;
        Some(adjusted_price(prefab.base_price, self.price_multiplier))
    }

    pub fn sell_price(&self, identifier: &str) -> Option<i32> {
        let price = self.buy_price(identifier)?;
        Some((price as f32 * self.sell_price_ratio).round() as i32)
    }

    /// Replaces the buy crate wholesale. Lines for the same item merge and
    /// every line is clamped to the maximum quantity. No money changes hands.
    pub fn replace_buy_crate(&self, state: &mut CampaignState, items: &[PurchasedItem]) {
        state.buy_crate_items.clear();
        for item in items {
            if self.prefabs.item(&item.identifier).is_none() {
                continue;
            }
            merge_line(
                &mut state.buy_crate_items,
                &item.identifier,
                item.quantity,
                self.max_quantity,
            );
        }
    }

    /// Refunds everything already purchased, then buys `requested` line by
    /// line, skipping lines the remaining money can't cover.
    pub fn repurchase(&self, state: &mut CampaignState, requested: &[PurchasedItem]) {
        let mut store_delta: i64 = 0;

        for item in std::mem::take(&mut state.purchased_items) {
            let Some(price) = self.buy_price(&item.identifier) else {
                continue;
            };
            let refund = price.saturating_mul(i32::from(item.quantity));
            state.money = state.money.saturating_add(refund);
            store_delta -= i64::from(refund);
        }

        for item in requested {
            let Some(price) = self.buy_price(&item.identifier) else {
                continue;
            };
            let merged = state
                .purchased_items
                .iter()
                .find(|line| line.identifier == item.identifier)
                .map_or(0, |line| line.quantity);
            let quantity = item.quantity.min(self.max_quantity.saturating_sub(merged));
            if quantity == 0 {
                continue;
            }
            let cost = price.saturating_mul(i32::from(quantity));
            if state.money < cost {
                warn!(
                    "can't afford {} x{quantity}: {cost} > {}",
                    item.identifier, state.money
                );
                continue;
            }
            state.money -= cost;
            store_delta += i64::from(cost);
            merge_line(
                &mut state.purchased_items,
                &item.identifier,
                quantity,
                self.max_quantity,
            );
        }

        apply_store_delta(state, store_delta);
    }

    /// Buys back everything sold this round, then sells `requested`. Entries
    /// whose item has already been removed from the world are dropped. A sale
    /// the money no longer covers stays sold.
    pub fn resell(&self, state: &mut CampaignState, requested: &[SoldItem]) {
        let mut store_delta: i64 = 0;
        let mut kept = Vec::new();

        for item in std::mem::take(&mut state.sold_items) {
            if item.removed {
                continue;
            }
            let Some(price) = self.sell_price(&item.identifier) else {
                continue;
            };
            if state.money < price {
                warn!(
                    "can't buy back {} ({}): {price} > {}",
                    item.identifier, item.id, state.money
                );
                kept.push(item);
                continue;
            }
            state.money -= price;
            store_delta += i64::from(price);
        }
        state.sold_items = kept;

        for item in requested {
            if item.removed {
                debug!("ignoring removed sold item {}", item.id);
                continue;
            }
            if state.sold_items.iter().any(|sold| sold.id == item.id) {
                continue;
            }
            let Some(price) = self.sell_price(&item.identifier) else {
                continue;
            };
            if let Some(balance) = state.store_balance {
                if i64::from(balance) + store_delta < i64::from(price) {
                    warn!("store can't pay {price} for {}", item.identifier);
                    continue;
                }
            }
            state.money = state.money.saturating_add(price);
            store_delta -= i64::from(price);
            state.sold_items.push(item.clone());
        }

        apply_store_delta(state, store_delta);
    }
}

fn merge_line(lines: &mut Vec<PurchasedItem>, identifier: &str, quantity: u8, max_quantity: u8) {
    if quantity == 0 {
        return;
    }
    match lines.iter_mut().find(|line| line.identifier == identifier) {
        Some(line) => line.quantity = line.quantity.saturating_add(quantity).min(max_quantity),
        None => lines.push(PurchasedItem::new(identifier, quantity.min(max_quantity))),
    }
}

fn apply_store_delta(state: &mut CampaignState, delta: i64) {
    if let Some(balance) = state.store_balance.as_mut() {
        let updated = (i64::from(*balance) + delta).clamp(0, i64::from(u16::MAX));
        *balance = updated as u16;
    }
}
