//! Campaign saves as JSON documents. The main document holds the campaign
//! itself; a companion `*.characters.json` holds each player's character so
//! a returning player gets it back.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use fathom_shared::{
    CampaignId, CampaignState, CharacterInfo, LocationIndex, MissionIndex, PendingUpgrade,
    PurchasedItem, WorldMap,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{crew::CrewMember, upgrades::UpgradeLevels, user::User};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access save {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode or parse save: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no save at {0:?}")]
    NotFound(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub campaign: CampaignSection,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignSection {
    pub campaign_id: CampaignId,
    pub money: i32,
    pub cheats_enabled: bool,
    pub is_first_round: bool,
    pub map: MapSection,
    pub faction_reputations: Vec<(String, f32)>,
    pub cargo: CargoSection,
    pub pending_upgrades: Vec<PendingUpgrade>,
    pub installed_upgrades: UpgradeLevels,
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSection {
    pub world: WorldMap,
    pub current_location: Option<LocationIndex>,
    pub selected_location: Option<LocationIndex>,
    pub selected_mission: Option<MissionIndex>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CargoSection {
    pub purchased_items: Vec<PurchasedItem>,
}

/// Everything a save restores.
#[derive(Clone, Debug)]
pub struct RestoredCampaign {
    pub campaign_id: CampaignId,
    pub state: CampaignState,
    pub map: WorldMap,
    pub installed_upgrades: UpgradeLevels,
    pub crew: Vec<CrewMember>,
}

impl SaveDocument {
    pub fn capture(
        campaign_id: CampaignId,
        state: &CampaignState,
        map: &WorldMap,
        installed_upgrades: &UpgradeLevels,
        crew: &[CrewMember],
        cheats_enabled: bool,
    ) -> Self {
        Self {
            campaign: CampaignSection {
                campaign_id,
                money: state.money,
                cheats_enabled,
                is_first_round: state.is_first_round,
                map: MapSection {
                    world: map.clone(),
                    current_location: state.current_location,
                    selected_location: state.selected_location,
                    selected_mission: state.selected_mission,
                },
                faction_reputations: state
                    .faction_reputations
                    .iter()
                    .map(|(faction, value)| (faction.clone(), *value))
                    .collect(),
                cargo: CargoSection {
                    purchased_items: state.purchased_items.clone(),
                },
                pending_upgrades: state.pending_upgrades.clone(),
                installed_upgrades: installed_upgrades.clone(),
                crew: crew.to_vec(),
            },
        }
    }

    /// Rebuilds the campaign. Per-location fields come from the saved map;
    /// round-scoped purchases (buy crate, sales, repairs) start empty.
    pub fn restore(&self) -> RestoredCampaign {
        let section = &self.campaign;
        let map = section.map.world.clone();
        let mut state = CampaignState::new(map.seed(), section.money);
        state.is_first_round = section.is_first_round;
        state.current_location = section.map.current_location;
        state.select_location(section.map.selected_location);
        state.select_mission(section.map.selected_mission);
        state.faction_reputations = section.faction_reputations.iter().cloned().collect();
        state.purchased_items = section.cargo.purchased_items.clone();
        state.pending_upgrades = section.pending_upgrades.clone();
        if let Some(location) = section.map.current_location.and_then(|i| map.location(i)) {
            state.location_reputation = location.reputation;
            state.store_balance = location.store_balance;
            state.available_missions = location.available_missions.clone();
        }

        RestoredCampaign {
            campaign_id: section.campaign_id,
            state,
            map,
            installed_upgrades: section.installed_upgrades.clone(),
            crew: section.crew.clone(),
        }
    }
}

/// A player's character, matched back to a returning client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterCampaignData {
    pub name: String,
    pub account_id: Option<String>,
    pub info: CharacterInfo,
}

impl CharacterCampaignData {
    pub fn new(user: &User, info: CharacterInfo) -> Self {
        Self {
            name: user.name.clone(),
            account_id: user.account_id.clone(),
            info,
        }
    }

    /// Account ids win when both sides have one; otherwise the name must
    /// match.
    pub fn matches_user(&self, user: &User) -> bool {
        same_player(self, &user.name, &user.account_id)
    }
}

fn same_player(data: &CharacterCampaignData, name: &str, account_id: &Option<String>) -> bool {
    match (&data.account_id, account_id) {
        (Some(saved), Some(current)) => saved == current,
        _ => data.name == name,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDataDocument {
    pub characters: Vec<CharacterCampaignData>,
}

impl CharacterDataDocument {
    pub fn find(&self, user: &User) -> Option<&CharacterCampaignData> {
        self.characters.iter().find(|data| data.matches_user(user))
    }

    /// Replaces any entry for the same player.
    pub fn upsert(&mut self, data: CharacterCampaignData) {
        self.characters
            .retain(|existing| !same_player(existing, &data.name, &data.account_id));
        self.characters.push(data);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SaveKind {
    Singleplayer,
    Multiplayer,
}

impl SaveKind {
    fn folder(self) -> &'static str {
        match self {
            SaveKind::Singleplayer => "singleplayer",
            SaveKind::Multiplayer => "multiplayer",
        }
    }
}

pub struct LoadedGame {
    pub save: SaveDocument,
    pub characters: CharacterDataDocument,
}

pub trait SaveStore: Send {
    /// A path that no existing save uses yet.
    fn create_save_path(&self, kind: SaveKind, name: &str) -> PathBuf;

    fn save_game(
        &mut self,
        path: &Path,
        save: &SaveDocument,
        characters: &CharacterDataDocument,
    ) -> Result<(), PersistenceError>;

    /// A missing characters document loads as empty.
    fn load_game(&self, path: &Path) -> Result<LoadedGame, PersistenceError>;
}

/// Path of the character document stored next to `save_path`.
pub fn characters_path(save_path: &Path) -> PathBuf {
    save_path.with_extension("characters.json")
}

/// Saves under a root directory, one folder per [`SaveKind`].
pub struct FileSaveStore {
    root: PathBuf,
}

impl FileSaveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn write(path: &Path, contents: &str) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, contents).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read(path: &Path) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl SaveStore for FileSaveStore {
    fn create_save_path(&self, kind: SaveKind, name: &str) -> PathBuf {
        let folder = self.root.join(kind.folder());
        let mut path = folder.join(format!("{name}.json"));
        let mut suffix = 2;
        while path.exists() {
            path = folder.join(format!("{name} {suffix}.json"));
            suffix += 1;
        }
        path
    }

    fn save_game(
        &mut self,
        path: &Path,
        save: &SaveDocument,
        characters: &CharacterDataDocument,
    ) -> Result<(), PersistenceError> {
        Self::write(path, &serde_json::to_string_pretty(save)?)?;
        Self::write(
            &characters_path(path),
            &serde_json::to_string_pretty(characters)?,
        )
    }

    fn load_game(&self, path: &Path) -> Result<LoadedGame, PersistenceError> {
        let save = Self::read(path)?.ok_or_else(|| PersistenceError::NotFound(path.into()))?;
        let characters = match Self::read(&characters_path(path))? {
            Some(contents) => serde_json::from_str(&contents)?,
            None => CharacterDataDocument::default(),
        };
        Ok(LoadedGame {
            save: serde_json::from_str(&save)?,
            characters,
        })
    }
}

/// Keeps the encoded documents in memory. Used when no save directory is
/// configured, and by tests.
#[derive(Default)]
pub struct MemorySaveStore {
    documents: HashMap<PathBuf, String>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.documents.contains_key(path)
    }
}

impl SaveStore for MemorySaveStore {
    fn create_save_path(&self, kind: SaveKind, name: &str) -> PathBuf {
        let mut path = Path::new(kind.folder()).join(format!("{name}.json"));
        let mut suffix = 2;
        while self.documents.contains_key(&path) {
            path = Path::new(kind.folder()).join(format!("{name} {suffix}.json"));
            suffix += 1;
        }
        path
    }

    fn save_game(
        &mut self,
        path: &Path,
        save: &SaveDocument,
        characters: &CharacterDataDocument,
    ) -> Result<(), PersistenceError> {
        self.documents
            .insert(path.to_path_buf(), serde_json::to_string(save)?);
        self.documents
            .insert(characters_path(path), serde_json::to_string(characters)?);
        Ok(())
    }

    fn load_game(&self, path: &Path) -> Result<LoadedGame, PersistenceError> {
        let save = self
            .documents
            .get(path)
            .ok_or_else(|| PersistenceError::NotFound(path.into()))?;
        let characters = match self.documents.get(&characters_path(path)) {
            Some(contents) => serde_json::from_str(contents)?,
            None => CharacterDataDocument::default(),
        };
        Ok(LoadedGame {
            save: serde_json::from_str(save)?,
            characters,
        })
    }
}
