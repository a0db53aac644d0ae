use fathom_shared::{
    CharacterId, CharacterInfo, Connection, HireCandidate, Location, PrefabRegistry, WorldMap,
};

pub const STEELBAR_PRICE: i32 = 40;

pub fn test_registry() -> PrefabRegistry {
    PrefabRegistry::new()
        .with_item("steelbar", STEELBAR_PRICE)
        .with_item("oxygentank", 25)
        .with_upgrade_category("hull")
        .with_upgrade("reinforcedhull", 3, 300, 200)
}

pub fn character(id: CharacterId) -> CharacterInfo {
    CharacterInfo {
        id,
        name: format!("character {id}"),
        job: "mechanic".to_string(),
    }
}

pub fn hire_candidate(id: CharacterId, salary: i32) -> HireCandidate {
    HireCandidate {
        info: character(id),
        salary,
    }
}

/// Three outposts in a row. The first one has two hires.
pub fn test_map() -> WorldMap {
    let start = Location::new("Coral Outpost")
        .with_hire(hire_candidate(100, 300))
        .with_hire(hire_candidate(101, 900));
    let locations = vec![
        start,
        Location::new("Hadal City"),
        Location::new("Europa Deep").with_price_multiplier(1.5),
    ];
    let connections = vec![Connection { a: 0, b: 1 }, Connection { a: 1, b: 2 }];
    match WorldMap::new("test-seed", locations, connections) {
        Ok(map) => map,
        Err(error) => panic!("test map is invalid: {error}"),
    }
}
