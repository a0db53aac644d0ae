use std::{mem, time::Duration};

use fathom_shared::{
    read_packet_kind, BitReader, CampaignMessage, CampaignRequest, CrewRequest, CrewState,
    PacketKind, PrefabLookup, RequestStartRound, SaveId, StepResult, TransitionHost,
    TransitionKind, TransitionOrchestrator, TransitionOutcome, TransitionPhase, TransitionState,
    TransitionTrigger,
};
use log::{debug, info, warn};

use crate::{
    client_config::ClientConfig,
    error::ClientError,
    events::ClientEvents,
    mirror::{CampaignMirror, MirrorUpdate},
};

/// Client-side stage of a round transition: the camera and level loading
/// the player sees.
struct Stage {
    level_loaded: bool,
    cancelled: bool,
    events: ClientEvents,
}

impl TransitionHost for Stage {
    fn end_round(&mut self, kind: TransitionKind) {
        self.events.push_round_end(kind);
    }

    fn begin_level_load(&mut self) {
        self.level_loaded = false;
    }

    fn level_loaded(&self) -> bool {
        self.level_loaded
    }

    fn fall_back_to_lobby(&mut self) {
        self.events.push_lobby_return();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A connected player's view of the campaign. Decodes what the server
/// sends, and queues requests for the caller to hand to a transport.
pub struct CampaignClient {
    prefabs: Box<dyn PrefabLookup>,
    mirror: CampaignMirror,
    orchestrator: TransitionOrchestrator,
    // the running transition is the server's, so local ticks leave it alone
    following_server: bool,
    stage: Stage,
    crew_state: Option<CrewState>,
    outgoing: Vec<Box<[u8]>>,
}

impl CampaignClient {
    pub fn new(config: ClientConfig, prefabs: Box<dyn PrefabLookup>) -> Self {
        Self {
            prefabs,
            mirror: CampaignMirror::new(),
            orchestrator: TransitionOrchestrator::new(config.transition),
            following_server: false,
            stage: Stage {
                level_loaded: false,
                cancelled: false,
                events: ClientEvents::new(),
            },
            crew_state: None,
            outgoing: Vec::new(),
        }
    }

    pub fn mirror(&self) -> &CampaignMirror {
        &self.mirror
    }

    /// Latest hire pool and pending hires.
    pub fn crew_state(&self) -> Option<&CrewState> {
        self.crew_state.as_ref()
    }

    pub fn transition_phase(&self) -> TransitionPhase {
        self.orchestrator.phase()
    }

    pub fn take_events(&mut self) -> ClientEvents {
        mem::replace(&mut self.stage.events, ClientEvents::new())
    }

    /// Packets waiting to be sent to the server, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<Box<[u8]>> {
        mem::take(&mut self.outgoing)
    }

    // Incoming

    /// Handles one packet from the server. Failures surface as
    /// [`ErrorEvent`](crate::ErrorEvent)s and leave the mirror as it was.
    pub fn receive(&mut self, payload: &[u8]) {
        if let Err(error) = self.handle_packet(payload) {
            warn!("{error}");
            self.stage.events.push_error(error);
        }
    }

    fn handle_packet(&mut self, payload: &[u8]) -> Result<(), ClientError> {
        let kind = read_packet_kind(&mut BitReader::new(payload))?;
        match kind {
            PacketKind::CampaignState => {
                let update = self.mirror.read(payload, &*self.prefabs)?;
                self.report(update);
                Ok(())
            }
            PacketKind::CrewState => {
                let crew_state = CrewState::from_packet(payload, &*self.prefabs)?;
                self.crew_state = Some(crew_state.clone());
                self.stage.events.push_crew_state(crew_state);
                Ok(())
            }
            PacketKind::TransitionState => {
                let state = TransitionState::from_packet(payload, &*self.prefabs)?;
                self.follow_server(&state);
                Ok(())
            }
            PacketKind::CampaignRequest | PacketKind::CrewRequest | PacketKind::RequestStartRound => {
                Err(ClientError::UnexpectedKind(kind))
            }
        }
    }

    /// Moves the local transition to the server's phase, making the host
    /// calls for every step it skipped over.
    fn follow_server(&mut self, state: &TransitionState) {
        let previous = self.orchestrator.phase();
        if !self.orchestrator.follow(state) {
            return;
        }
        debug!("following server transition to {:?}", state.phase);
        self.following_server = self.orchestrator.is_running();

        let stage = &mut self.stage;
        if previous == TransitionPhase::Idle && state.phase != TransitionPhase::Idle {
            stage.cancelled = false;
            if let Some(kind) = state.kind {
                stage.end_round(kind);
            }
        }
        if state.phase == TransitionPhase::WaitingForNewLevel
            && previous != TransitionPhase::WaitingForNewLevel
        {
            stage.begin_level_load();
        }
        if self.orchestrator.is_running() {
            return;
        }
        if let Some(outcome) = state.outcome {
            if outcome == TransitionOutcome::TimedOut {
                stage.fall_back_to_lobby();
            }
            stage.events.push_transition(outcome);
        }
    }

    fn report(&mut self, update: MirrorUpdate) {
        let events = &mut self.stage.events;
        if update.replaced {
            if let Some(campaign) = self.mirror.campaign() {
                events.push_campaign_replacement(campaign.campaign_id());
            }
        }
        if let Some(save_id) = update.save_requested {
            info!("server is on save {save_id}, requesting it");
            events.push_save_request(save_id);
        }
        if update.applied {
            if let Some(campaign) = self.mirror.campaign() {
                events.push_campaign_change(campaign.update_id());
            }
        }
    }

    /// The save requested through a save event has been loaded.
    pub fn on_save_loaded(&mut self, save_id: SaveId) {
        if self.mirror.on_save_loaded(save_id) {
            if let Some(campaign) = self.mirror.campaign() {
                self.stage.events.push_campaign_change(campaign.update_id());
            }
        }
    }

    // Outgoing

    /// Queues a request that starts from the mirrored campaign with `edit`
    /// applied. Refused until the mirror is synchronized, since a request
    /// built from stale save-dependent fields would undo server state.
    pub fn request_campaign_change(
        &mut self,
        edit: impl FnOnce(&mut CampaignRequest),
    ) -> Result<(), ClientError> {
        let campaign = self.mirror.campaign().ok_or(ClientError::NoCampaign)?;
        if !self.mirror.is_synchronized() {
            return Err(ClientError::SaveNotLoaded {
                needed: self.mirror.pending_save_id(),
            });
        }
        let mut request = CampaignRequest::from_state(campaign.state());
        edit(&mut request);
        self.outgoing.push(request.to_packet());
        Ok(())
    }

    pub fn request_crew_change(&mut self, request: &CrewRequest) {
        self.outgoing.push(request.to_packet());
    }

    pub fn request_start_round(&mut self) {
        self.outgoing.push(RequestStartRound.to_packet());
    }

    // Transitions

    /// Starts the local camera and level-load sequence without waiting for
    /// the server to report one.
    pub fn on_round_ended(&mut self, kind: TransitionKind) -> bool {
        if self.orchestrator.is_running() {
            return false;
        }
        self.following_server = false;
        self.stage.cancelled = false;
        self.orchestrator.begin(kind, TransitionTrigger::Requested)
    }

    pub fn on_level_loaded(&mut self) {
        self.stage.level_loaded = true;
    }

    /// The screen showing the transition went away.
    pub fn cancel_transition(&mut self) {
        self.stage.cancelled = true;
    }

    pub fn tick(&mut self, dt: Duration) {
        if self.following_server || !self.orchestrator.is_running() {
            return;
        }
        if self.orchestrator.step(dt, &mut self.stage) == StepResult::Done {
            if let Some(outcome) = self.orchestrator.last_outcome() {
                self.stage.events.push_transition(outcome);
            }
        }
    }
}
