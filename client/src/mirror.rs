use fathom_shared::{
    CampaignCodecError, CampaignMessage, CampaignSnapshot, CampaignState, CharacterInfo,
    PrefabLookup, SaveId, SaveTracker, VersionedCampaign, NO_SAVE,
};
use log::{debug, info};

/// What one incoming snapshot did to the mirror.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MirrorUpdate {
    /// The snapshot was newer than anything seen and its always-safe fields
    /// were applied.
    pub applied: bool,
    /// Save-dependent fields were applied too.
    pub save_dependent_applied: bool,
    /// The server announced a save this client should fetch.
    pub save_requested: Option<SaveId>,
    /// The campaign id changed and the old mirror was thrown away.
    pub replaced: bool,
}

/// Read-only copy of the server's campaign. Only [`read`](Self::read) and
/// [`on_save_loaded`](Self::on_save_loaded) change it.
#[derive(Debug, Default)]
pub struct CampaignMirror {
    campaign: Option<VersionedCampaign>,
    tracker: SaveTracker,
    deferred: Option<CampaignSnapshot>,
    character_info: Option<CharacterInfo>,
}

impl CampaignMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn campaign(&self) -> Option<&VersionedCampaign> {
        self.campaign.as_ref()
    }

    pub fn state(&self) -> Option<&CampaignState> {
        self.campaign.as_ref().map(VersionedCampaign::state)
    }

    /// This client's own character, as last sent by the server.
    pub fn character_info(&self) -> Option<&CharacterInfo> {
        self.character_info.as_ref()
    }

    pub fn pending_save_id(&self) -> SaveId {
        self.tracker.pending_save_id()
    }

    pub fn loaded_save_id(&self) -> Option<SaveId> {
        self.tracker.loaded_save_id()
    }

    /// Save-dependent fields are waiting for a save to be loaded.
    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// Every field matches the newest snapshot.
    pub fn is_synchronized(&self) -> bool {
        self.deferred.is_none()
            && self
                .campaign
                .as_ref()
                .is_some_and(|campaign| self.tracker.save_matches(campaign.save_id()))
    }

    /// Decodes a tagged snapshot and applies it. A payload that fails to
    /// decode leaves the mirror untouched.
    pub fn read(
        &mut self,
        payload: &[u8],
        prefabs: &dyn PrefabLookup,
    ) -> Result<MirrorUpdate, CampaignCodecError> {
        let snapshot = CampaignSnapshot::from_packet(payload, prefabs)?;
        Ok(self.apply(snapshot))
    }

    pub fn apply(&mut self, snapshot: CampaignSnapshot) -> MirrorUpdate {
        let mut update = MirrorUpdate::default();

        if let Some(campaign) = &self.campaign {
            if campaign.campaign_id() != snapshot.campaign_id {
                info!(
                    "campaign changed from {} to {}, discarding the mirror",
                    campaign.campaign_id(),
                    snapshot.campaign_id
                );
                *self = Self::new();
                update.replaced = true;
            }
        }

        if self.tracker.observe_save_id(snapshot.save_id) {
            update.save_requested = Some(self.tracker.pending_save_id());
        }
        if !self.tracker.accept_update(snapshot.update_id) {
            debug!("ignoring stale update {}", snapshot.update_id);
            return update;
        }

        let campaign = self.campaign.get_or_insert_with(|| {
            VersionedCampaign::mirror_of(&CampaignSnapshot {
                save_id: NO_SAVE,
                state: CampaignState::default(),
                character_info: None,
                ..snapshot.clone()
            })
        });
        campaign.apply_always_safe(&snapshot);
        self.character_info = snapshot.character_info.clone();
        update.applied = true;

        if self.tracker.save_matches(snapshot.save_id) {
            campaign.apply_save_dependent(&snapshot);
            self.deferred = None;
            update.save_dependent_applied = true;
        } else {
            debug!(
                "holding save-dependent fields until save {} is loaded",
                snapshot.save_id
            );
            self.deferred = Some(snapshot);
        }
        update
    }

    /// Called once the save with `save_id` is loaded locally. Returns true
    /// if held-back fields were applied.
    pub fn on_save_loaded(&mut self, save_id: SaveId) -> bool {
        self.tracker.on_save_loaded(save_id);
        if self.deferred.as_ref().map(|deferred| deferred.save_id) != Some(save_id) {
            return false;
        }
        let Some(deferred) = self.deferred.take() else {
            return false;
        };
        if let Some(campaign) = self.campaign.as_mut() {
            campaign.apply_save_dependent(&deferred);
        }
        true
    }
}
