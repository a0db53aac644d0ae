use log::debug;
use thiserror::Error;

use crate::{
    state::{CampaignState, CharacterInfo},
    types::{CampaignId, Role, SaveId, UpdateId},
};

/// Mutation attempted on a copy that does not own the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("campaign {campaign_id} is a read-only mirror")]
pub struct ReadOnlyMirror {
    pub campaign_id: CampaignId,
}

/// One full wire copy of the campaign. `character_info` is filled per
/// recipient by the sender.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignSnapshot {
    pub campaign_id: CampaignId,
    pub update_id: UpdateId,
    pub save_id: SaveId,
    pub state: CampaignState,
    pub character_info: Option<CharacterInfo>,
}

/// Campaign fields plus the counters that version them. Every committed
/// mutation goes through [`VersionedCampaign::mutate`] and advances the
/// update id by exactly one.
#[derive(Clone, Debug)]
pub struct VersionedCampaign {
    role: Role,
    campaign_id: CampaignId,
    update_id: UpdateId,
    save_id: SaveId,
    state: CampaignState,
}

impl VersionedCampaign {
    pub fn new(role: Role, campaign_id: CampaignId, state: CampaignState) -> Self {
        Self {
            role,
            campaign_id,
            update_id: 0,
            save_id: 0,
            state,
        }
    }

    /// Builds a mirror from a decoded snapshot.
    pub fn mirror_of(snapshot: &CampaignSnapshot) -> Self {
        Self {
            role: Role::Mirror,
            campaign_id: snapshot.campaign_id,
            update_id: snapshot.update_id,
            save_id: snapshot.save_id,
            state: snapshot.state.clone(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn update_id(&self) -> UpdateId {
        self.update_id
    }

    pub fn save_id(&self) -> SaveId {
        self.save_id
    }

    pub fn state(&self) -> &CampaignState {
        &self.state
    }

    /// Applies `f` and bumps the update id.
    pub fn mutate<R>(
        &mut self,
        f: impl FnOnce(&mut CampaignState) -> R,
    ) -> Result<R, ReadOnlyMirror> {
        self.check_writable()?;
        let output = f(&mut self.state);
        self.bump_update_id();
        Ok(output)
    }

    /// Applies `f` to a draft and commits it only if something changed.
    /// Returns whether a commit (and so an update id bump) happened.
    pub fn mutate_if_changed<R>(
        &mut self,
        f: impl FnOnce(&mut CampaignState) -> R,
    ) -> Result<(R, bool), ReadOnlyMirror> {
        self.check_writable()?;
        let mut draft = self.state.clone();
        let output = f(&mut draft);
        if draft == self.state {
            return Ok((output, false));
        }
        self.state = draft;
        self.bump_update_id();
        Ok((output, true))
    }

    /// Bumps the update id without touching any field, used when a
    /// collaborator outside the state (the map, the crew) changed.
    pub fn touch(&mut self) -> Result<UpdateId, ReadOnlyMirror> {
        self.check_writable()?;
        Ok(self.bump_update_id())
    }

    /// Advances the save generation, skipping 0 which means "no save".
    pub fn bump_save_id(&mut self) -> Result<SaveId, ReadOnlyMirror> {
        self.check_writable()?;
        self.save_id = next_save_id(self.save_id);
        debug!("campaign {} save id now {}", self.campaign_id, self.save_id);
        Ok(self.save_id)
    }

    pub fn snapshot_for_wire(&self) -> CampaignSnapshot {
        CampaignSnapshot {
            campaign_id: self.campaign_id,
            update_id: self.update_id,
            save_id: self.save_id,
            state: self.state.clone(),
            character_info: None,
        }
    }

    // Mirror-side writes, used only by the decode path

    pub fn apply_always_safe(&mut self, snapshot: &CampaignSnapshot) {
        self.state.copy_always_safe_from(&snapshot.state);
        self.update_id = snapshot.update_id;
    }

    pub fn apply_save_dependent(&mut self, snapshot: &CampaignSnapshot) {
        self.state.copy_save_dependent_from(&snapshot.state);
        self.save_id = snapshot.save_id;
    }

    fn check_writable(&self) -> Result<(), ReadOnlyMirror> {
        if self.role.can_mutate() {
            Ok(())
        } else {
            Err(ReadOnlyMirror {
                campaign_id: self.campaign_id,
            })
        }
    }

    fn bump_update_id(&mut self) -> UpdateId {
        self.update_id = self.update_id.wrapping_add(1);
        self.update_id
    }
}

/// The save id after `id`. Never returns 0.
pub fn next_save_id(id: SaveId) -> SaveId {
    match id.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign() -> VersionedCampaign {
        VersionedCampaign::new(Role::Authoritative, 3, CampaignState::new("seed", 100))
    }

    #[test]
    fn every_mutation_bumps_update_id() {
        let mut campaign = campaign();
        campaign.mutate(|state| state.money += 1).unwrap();
        campaign.mutate(|_| ()).unwrap();
        assert_eq!(campaign.update_id(), 2);
        assert_eq!(campaign.state().money, 101);
    }

    #[test]
    fn update_id_wraps() {
        let mut campaign = campaign();
        for _ in 0..=u16::MAX {
            campaign.touch().unwrap();
        }
        assert_eq!(campaign.update_id(), 0);
        campaign.touch().unwrap();
        assert_eq!(campaign.update_id(), 1);
    }

    #[test]
    fn unchanged_draft_does_not_bump() {
        let mut campaign = campaign();
        let (_, changed) = campaign
            .mutate_if_changed(|state| {
                if state.money >= 1000 {
                    state.money -= 1000;
                }
            })
            .unwrap();
        assert!(!changed);
        assert_eq!(campaign.update_id(), 0);

        let (_, changed) = campaign.mutate_if_changed(|state| state.money -= 40).unwrap();
        assert!(changed);
        assert_eq!(campaign.update_id(), 1);
    }

    #[test]
    fn save_id_skips_zero() {
        assert_eq!(next_save_id(0), 1);
        assert_eq!(next_save_id(u16::MAX), 1);
        assert_eq!(next_save_id(41), 42);
    }

    #[test]
    fn mirror_refuses_mutation() {
        let snapshot = campaign().snapshot_for_wire();
        let mut mirror = VersionedCampaign::mirror_of(&snapshot);
        assert_eq!(
            mirror.mutate(|state| state.money = 0),
            Err(ReadOnlyMirror { campaign_id: 3 })
        );
        assert!(mirror.bump_save_id().is_err());
        assert_eq!(mirror.state().money, 100);
    }
}
