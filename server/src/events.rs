use std::{mem, path::PathBuf, vec::IntoIter};

use fathom_shared::{PacketKind, SaveId, TransitionKind, TransitionOutcome, UpdateId};

use crate::{error::ServerError, user::UserKey};

/// Why a client request was dropped without touching the campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    NotAuthorized(PacketKind),
    /// The packet kind is one only the server sends.
    UnexpectedKind(PacketKind),
    /// A round transition is already underway.
    TransitionRunning,
}

/// Everything that happened since the last [`CampaignServer::take_events`].
///
/// [`CampaignServer::take_events`]: crate::CampaignServer::take_events
pub struct CampaignEvents {
    connections: Vec<UserKey>,
    disconnections: Vec<UserKey>,
    rejections: Vec<(UserKey, Rejection)>,
    changes: Vec<(UserKey, UpdateId)>,
    start_round_requests: Vec<UserKey>,
    round_ends: Vec<TransitionKind>,
    transitions: Vec<TransitionOutcome>,
    saves: Vec<(SaveId, PathBuf)>,
    errors: Vec<ServerError>,

    empty: bool,
}

impl Default for CampaignEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            rejections: Vec::new(),
            changes: Vec::new(),
            start_round_requests: Vec::new(),
            round_ends: Vec::new(),
            transitions: Vec::new(),
            saves: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: CampaignEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: CampaignEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, user_key: &UserKey) {
        self.connections.push(*user_key);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, user_key: &UserKey) {
        self.disconnections.push(*user_key);
        self.empty = false;
    }

    pub(crate) fn push_rejection(&mut self, user_key: &UserKey, rejection: Rejection) {
        self.rejections.push((*user_key, rejection));
        self.empty = false;
    }

    pub(crate) fn push_change(&mut self, user_key: &UserKey, update_id: UpdateId) {
        self.changes.push((*user_key, update_id));
        self.empty = false;
    }

    pub(crate) fn push_start_round_request(&mut self, user_key: &UserKey) {
        self.start_round_requests.push(*user_key);
        self.empty = false;
    }

    pub(crate) fn push_round_end(&mut self, kind: TransitionKind) {
        self.round_ends.push(kind);
        self.empty = false;
    }

    pub(crate) fn push_transition(&mut self, outcome: TransitionOutcome) {
        self.transitions.push(outcome);
        self.empty = false;
    }

    pub(crate) fn push_save(&mut self, save_id: SaveId, path: PathBuf) {
        self.saves.push((save_id, path));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ServerError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait CampaignEvent {
    type Iter;

    fn iter(events: &mut CampaignEvents) -> Self::Iter;

    fn has(events: &CampaignEvents) -> bool;
}

macro_rules! impl_campaign_event {
    ($event:ident, $field:ident, $item:ty) => {
        pub struct $event;
        impl CampaignEvent for $event {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut CampaignEvents) -> Self::Iter {
                IntoIterator::into_iter(mem::take(&mut events.$field))
            }

            fn has(events: &CampaignEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

impl_campaign_event!(ConnectEvent, connections, UserKey);
impl_campaign_event!(DisconnectEvent, disconnections, UserKey);
impl_campaign_event!(RejectionEvent, rejections, (UserKey, Rejection));
// A request from this user changed the campaign to this update id
impl_campaign_event!(CampaignChangedEvent, changes, (UserKey, UpdateId));
impl_campaign_event!(StartRoundEvent, start_round_requests, UserKey);
impl_campaign_event!(RoundEndEvent, round_ends, TransitionKind);
impl_campaign_event!(TransitionEvent, transitions, TransitionOutcome);
impl_campaign_event!(SaveEvent, saves, (SaveId, PathBuf));
impl_campaign_event!(ErrorEvent, errors, ServerError);
