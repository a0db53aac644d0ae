use std::collections::HashMap;

/// An item that can appear in store lists.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemPrefab {
    pub identifier: String,
    pub base_price: i32,
}

/// A submarine upgrade. The price of level `n` is
/// `base_price + price_per_level * (n - 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradePrefab {
    pub identifier: String,
    pub max_level: u8,
    pub base_price: i32,
    pub price_per_level: i32,
}

impl UpgradePrefab {
    /// Price of buying `level`, or None if the level is out of range.
    pub fn price_for_level(&self, level: u8) -> Option<i32> {
        if level == 0 || level > self.max_level {
            return None;
        }
        let steps = i32::from(level - 1);
        self.base_price
            .checked_add(self.price_per_level.checked_mul(steps)?)
    }
}

/// Read-only access to the content definitions that wire identifiers refer
/// to. Decoding and the mutation gateway take one of these instead of
/// reaching into process-wide tables, so both can run against a fixture.
pub trait PrefabLookup {
    fn item(&self, identifier: &str) -> Option<&ItemPrefab>;
    fn upgrade(&self, identifier: &str) -> Option<&UpgradePrefab>;
    fn has_upgrade_category(&self, identifier: &str) -> bool;
    fn has_mission(&self, identifier: &str) -> bool;
    fn has_faction(&self, identifier: &str) -> bool;
}

/// In-memory [`PrefabLookup`] assembled with builder calls.
#[derive(Clone, Debug, Default)]
pub struct PrefabRegistry {
    items: HashMap<String, ItemPrefab>,
    upgrades: HashMap<String, UpgradePrefab>,
    upgrade_categories: Vec<String>,
    missions: Vec<String>,
    factions: Vec<String>,
}

impl PrefabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, identifier: &str, base_price: i32) -> Self {
        self.items.insert(
            identifier.to_string(),
            ItemPrefab {
                identifier: identifier.to_string(),
                base_price,
            },
        );
        self
    }

    pub fn with_upgrade(
        mut self,
        identifier: &str,
        max_level: u8,
        base_price: i32,
        price_per_level: i32,
    ) -> Self {
        self.upgrades.insert(
            identifier.to_string(),
            UpgradePrefab {
                identifier: identifier.to_string(),
                max_level,
                base_price,
                price_per_level,
            },
        );
        self
    }

    pub fn with_upgrade_category(mut self, identifier: &str) -> Self {
        self.upgrade_categories.push(identifier.to_string());
        self
    }

    pub fn with_mission(mut self, identifier: &str) -> Self {
        self.missions.push(identifier.to_string());
        self
    }

    pub fn with_faction(mut self, identifier: &str) -> Self {
        self.factions.push(identifier.to_string());
        self
    }
}

impl PrefabLookup for PrefabRegistry {
    fn item(&self, identifier: &str) -> Option<&ItemPrefab> {
        self.items.get(identifier)
    }

    fn upgrade(&self, identifier: &str) -> Option<&UpgradePrefab> {
        self.upgrades.get(identifier)
    }

    fn has_upgrade_category(&self, identifier: &str) -> bool {
        self.upgrade_categories.iter().any(|c| c == identifier)
    }

    fn has_mission(&self, identifier: &str) -> bool {
        self.missions.iter().any(|m| m == identifier)
    }

    fn has_faction(&self, identifier: &str) -> bool {
        self.factions.iter().any(|f| f == identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_price_scales_with_level() {
        let registry = PrefabRegistry::new().with_upgrade("hullarmor", 3, 500, 250);
        let upgrade = registry.upgrade("hullarmor").unwrap();

        assert_eq!(upgrade.price_for_level(1), Some(500));
        assert_eq!(upgrade.price_for_level(3), Some(1000));
        assert_eq!(upgrade.price_for_level(0), None);
        assert_eq!(upgrade.price_for_level(4), None);
    }

    #[test]
    fn unknown_identifiers_are_absent() {
        let registry = PrefabRegistry::new()
            .with_item("steelbar", 40)
            .with_mission("salvage")
            .with_faction("coalition");

        assert!(registry.item("steelbar").is_some());
        assert!(registry.item("copperbar").is_none());
        assert!(registry.has_mission("salvage"));
        assert!(!registry.has_mission("escort"));
        assert!(registry.has_faction("coalition"));
        assert!(!registry.has_upgrade_category("hull"));
    }
}
