use std::{collections::BTreeMap, path::PathBuf};

use fastrand::Rng;
use fathom_shared::{
    CampaignState, TransitionHost, TransitionKind, VersionedCampaign, WorldMap,
};
use log::{info, warn};

use crate::{
    crew::CrewRoster,
    error::ServerError,
    events::CampaignEvents,
    gateway::{clear_round_purchases, enter_location, random_destination},
    persistence::{CharacterCampaignData, CharacterDataDocument, SaveDocument, SaveStore},
    upgrades::UpgradeLevels,
    user::{User, UserKey},
};

/// Everything a running campaign owns, apart from connections and config.
/// Doubles as the server's [`TransitionHost`].
pub(crate) struct Session {
    pub campaign: VersionedCampaign,
    pub map: WorldMap,
    pub roster: CrewRoster,
    pub installed_upgrades: UpgradeLevels,
    pub users: BTreeMap<UserKey, User>,
    pub characters: CharacterDataDocument,
    pub store: Box<dyn SaveStore>,
    pub save_path: PathBuf,
    pub cheats_enabled: bool,
    pub events: CampaignEvents,
    pub rng: Rng,
    pub level_loaded: bool,
}

impl Session {
    /// Bumps the save id and writes the campaign out.
    pub fn save(&mut self) -> Result<(), ServerError> {
        let save_id = self.campaign.bump_save_id()?;
        let document = SaveDocument::capture(
            self.campaign.campaign_id(),
            self.campaign.state(),
            &self.map,
            &self.installed_upgrades,
            self.roster.members(),
            self.cheats_enabled,
        );
        self.store
            .save_game(&self.save_path, &document, &self.characters)?;
        info!("campaign saved to {:?} (save {save_id})", self.save_path);
        self.events.push_save(save_id, self.save_path.clone());
        Ok(())
    }

    fn save_or_report(&mut self) {
        if let Err(error) = self.save() {
            warn!("{error}");
            self.events.push_error(error);
        }
    }

    fn store_character_data(&mut self) {
        for user in self.users.values() {
            if let Some(info) = &user.character {
                self.characters
                    .upsert(CharacterCampaignData::new(user, info.clone()));
            }
        }
    }

    /// Moves the campaign along according to `kind`.
    fn apply_transition(&mut self, kind: TransitionKind) -> Result<(), ServerError> {
        let Self {
            campaign,
            map,
            roster,
            installed_upgrades,
            rng,
            ..
        } = self;
        campaign.mutate(|state| match kind {
            TransitionKind::ProgressToNext => {
                let Some(destination) = state.selected_location else {
                    warn!("no destination selected, staying put");
                    return_to_previous(state);
                    return;
                };
                leave_location(state, map);
                map.discover(destination);
                enter_location(state, map, destination);
                state.select_location(random_destination(map, destination, rng));
                installed_upgrades.install(&state.pending_upgrades);
                state.pending_upgrades.clear();
                roster.clear_pending();
                state.is_first_round = false;
            }
            TransitionKind::ReturnToPrevious => return_to_previous(state),
            TransitionKind::End => {
                state.force_map_ui = false;
                state.is_first_round = true;
            }
        })?;
        Ok(())
    }

    /// Replaces the campaign with the last save, keeping the save id
    /// counter running.
    fn reload(&mut self) -> Result<(), ServerError> {
        let loaded = self.store.load_game(&self.save_path)?;
        let restored = loaded.save.restore();
        self.map = restored.map;
        self.installed_upgrades = restored.installed_upgrades;
        self.roster = CrewRoster::new(restored.crew);
        self.characters = loaded.characters;
        self.campaign.mutate(|state| *state = restored.state)?;
        self.campaign.bump_save_id()?;
        info!("no survivors, reloaded {:?}", self.save_path);
        Ok(())
    }
}

fn return_to_previous(state: &mut CampaignState) {
    state.select_location(None);
    clear_round_purchases(state);
    state.is_first_round = false;
}

fn leave_location(state: &mut CampaignState, map: &mut WorldMap) {
    clear_round_purchases(state);
    let Some(current) = state.current_location else {
        return;
    };
    if let Some(location) = map.location_mut(current) {
        location.store_balance = state.store_balance;
        location.reputation = state.location_reputation;
    }
}

impl TransitionHost for Session {
    fn end_round(&mut self, kind: TransitionKind) {
        self.events.push_round_end(kind);
        let survivors = self.users.values().any(User::has_living_character);

        if survivors || kind == TransitionKind::End {
            self.store_character_data();
            if let Err(error) = self.apply_transition(kind) {
                self.events.push_error(error);
                return;
            }
            self.save_or_report();
            return;
        }

        if let Err(error) = self.reload() {
            warn!("could not reload the campaign: {error}");
            self.events.push_error(error);
            if let Err(error) = self.apply_transition(TransitionKind::ReturnToPrevious) {
                self.events.push_error(error);
            }
        }
    }

    fn begin_level_load(&mut self) {
        self.level_loaded = false;
    }

    fn level_loaded(&self) -> bool {
        self.level_loaded
    }

    fn fall_back_to_lobby(&mut self) {
        for user in self.users.values_mut() {
            user.in_game = false;
            user.character_alive = false;
        }
    }
}
