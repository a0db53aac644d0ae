use std::{mem, vec::IntoIter};

use fathom_shared::{CampaignId, CrewState, SaveId, TransitionKind, TransitionOutcome, UpdateId};

use crate::error::ClientError;

pub struct ClientEvents {
    save_requests: Vec<SaveId>,
    campaign_changes: Vec<UpdateId>,
    campaign_replacements: Vec<CampaignId>,
    crew_states: Vec<CrewState>,
    round_ends: Vec<TransitionKind>,
    lobby_returns: Vec<()>,
    transitions: Vec<TransitionOutcome>,
    errors: Vec<ClientError>,

    empty: bool,
}

impl Default for ClientEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientEvents {
    pub(crate) fn new() -> Self {
        Self {
            save_requests: Vec::new(),
            campaign_changes: Vec::new(),
            campaign_replacements: Vec::new(),
            crew_states: Vec::new(),
            round_ends: Vec::new(),
            lobby_returns: Vec::new(),
            transitions: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ClientEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ClientEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_save_request(&mut self, save_id: SaveId) {
        self.save_requests.push(save_id);
        self.empty = false;
    }

    pub(crate) fn push_campaign_change(&mut self, update_id: UpdateId) {
        self.campaign_changes.push(update_id);
        self.empty = false;
    }

    pub(crate) fn push_campaign_replacement(&mut self, campaign_id: CampaignId) {
        self.campaign_replacements.push(campaign_id);
        self.empty = false;
    }

    pub(crate) fn push_crew_state(&mut self, crew_state: CrewState) {
        self.crew_states.push(crew_state);
        self.empty = false;
    }

    pub(crate) fn push_round_end(&mut self, kind: TransitionKind) {
        self.round_ends.push(kind);
        self.empty = false;
    }

    pub(crate) fn push_lobby_return(&mut self) {
        self.lobby_returns.push(());
        self.empty = false;
    }

    pub(crate) fn push_transition(&mut self, outcome: TransitionOutcome) {
        self.transitions.push(outcome);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ClientError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait ClientEvent {
    type Iter;

    fn iter(events: &mut ClientEvents) -> Self::Iter;

    fn has(events: &ClientEvents) -> bool;
}

macro_rules! impl_client_event {
    ($event:ident, $field:ident, $item:ty) => {
        pub struct $event;
        impl ClientEvent for $event {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut ClientEvents) -> Self::Iter {
                IntoIterator::into_iter(mem::take(&mut events.$field))
            }

            fn has(events: &ClientEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

// The server moved to a save this client doesn't have; fetch it
impl_client_event!(SaveRequestedEvent, save_requests, SaveId);
impl_client_event!(CampaignChangedEvent, campaign_changes, UpdateId);
impl_client_event!(CampaignReplacedEvent, campaign_replacements, CampaignId);
impl_client_event!(CrewStateEvent, crew_states, CrewState);
impl_client_event!(RoundEndEvent, round_ends, TransitionKind);
impl_client_event!(ReturnedToLobbyEvent, lobby_returns, ());
impl_client_event!(TransitionEvent, transitions, TransitionOutcome);
impl_client_event!(ErrorEvent, errors, ClientError);
