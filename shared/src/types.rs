pub type CampaignId = u8;
pub type UpdateId = u16;
pub type SaveId = u16;
pub type LocationIndex = u16;
pub type MissionIndex = u8;
pub type CharacterId = i32;

/// Which side of the session holds a [`crate::VersionedCampaign`]. Only the
/// authoritative copy accepts local mutation; a mirror changes only by
/// applying decoded snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Authoritative,
    Mirror,
}

impl Role {
    pub fn can_mutate(self) -> bool {
        matches!(self, Role::Authoritative)
    }
}
