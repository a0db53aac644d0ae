use std::{
    collections::{BTreeMap, HashMap, HashSet, VecDeque},
    mem,
    path::PathBuf,
    time::Duration,
};

use fastrand::Rng;
use fathom_shared::{
    read_packet_kind, BitReader, CampaignId, CampaignMessage, CampaignRequest, CampaignState,
    CrewRequest, CrewState, LocationIndex, PacketKind, PrefabLookup, Role, StepResult,
    TransitionKind, TransitionOrchestrator, TransitionPhase, TransitionState, TransitionTrigger,
    UpdateId, VersionedCampaign, WorldMap,
};
use log::{debug, info, warn};

use crate::{
    crew::{CrewMember, CrewRoster},
    error::ServerError,
    events::{CampaignEvents, Rejection},
    gateway::{enter_location, random_destination, Gateway},
    persistence::{CharacterDataDocument, SaveKind, SaveStore},
    server_config::ServerConfig,
    session::Session,
    transport::PacketSender,
    upgrades::UpgradeLevels,
    user::{Authority, User, UserKey},
};

/// What a brand new campaign starts from.
pub struct CampaignSetup {
    pub campaign_id: CampaignId,
    pub save_name: String,
    pub map: WorldMap,
    pub starting_money: i32,
    pub crew: Vec<CrewMember>,
}

/// The authoritative side of a multiplayer campaign. Owns the campaign
/// state, arbitrates client requests and replicates snapshots.
///
/// Nothing is sent from [`receive`](Self::receive): packets are queued and
/// handled on the next [`tick`](Self::tick), which then broadcasts.
pub struct CampaignServer {
    config: ServerConfig,
    prefabs: Box<dyn PrefabLookup>,
    orchestrator: TransitionOrchestrator,
    session: Session,
    connections: HashMap<UserKey, Box<dyn PacketSender>>,
    owner: Option<UserKey>,
    next_user_key: u64,
    incoming: VecDeque<(UserKey, Box<[u8]>)>,
    outgoing_crew_state: Option<CrewState>,
    announced_transition: TransitionState,
    needs_snapshot: HashSet<UserKey>,
    last_broadcast_update: Option<UpdateId>,
    since_broadcast: Duration,
    since_resync: Duration,
    crew_dead_for: Duration,
}

impl CampaignServer {
    pub fn new(
        config: ServerConfig,
        prefabs: Box<dyn PrefabLookup>,
        store: Box<dyn SaveStore>,
        setup: CampaignSetup,
    ) -> Self {
        let save_path = store.create_save_path(SaveKind::Multiplayer, &setup.save_name);
        let state = CampaignState::new(setup.map.seed(), setup.starting_money);
        info!(
            "new campaign {} with {} locations",
            setup.campaign_id,
            setup.map.len()
        );
        let session = Session {
            campaign: VersionedCampaign::new(Role::Authoritative, setup.campaign_id, state),
            map: setup.map,
            roster: CrewRoster::new(setup.crew),
            installed_upgrades: UpgradeLevels::default(),
            users: BTreeMap::new(),
            characters: CharacterDataDocument::default(),
            store,
            save_path,
            cheats_enabled: false,
            events: CampaignEvents::new(),
            rng: Rng::new(),
            level_loaded: false,
        };
        Self::with_session(config, prefabs, session)
    }

    /// Resumes the campaign saved at `path`.
    pub fn load(
        config: ServerConfig,
        prefabs: Box<dyn PrefabLookup>,
        store: Box<dyn SaveStore>,
        path: PathBuf,
    ) -> Result<Self, ServerError> {
        let loaded = store.load_game(&path)?;
        let cheats_enabled = loaded.save.campaign.cheats_enabled;
        let restored = loaded.save.restore();
        info!("loaded campaign {} from {path:?}", restored.campaign_id);
        let session = Session {
            campaign: VersionedCampaign::new(
                Role::Authoritative,
                restored.campaign_id,
                restored.state,
            ),
            map: restored.map,
            roster: CrewRoster::new(restored.crew),
            installed_upgrades: restored.installed_upgrades,
            users: BTreeMap::new(),
            characters: loaded.characters,
            store,
            save_path: path,
            cheats_enabled,
            events: CampaignEvents::new(),
            rng: Rng::new(),
            level_loaded: false,
        };
        Ok(Self::with_session(config, prefabs, session))
    }

    fn with_session(config: ServerConfig, prefabs: Box<dyn PrefabLookup>, session: Session) -> Self {
        let orchestrator = TransitionOrchestrator::new(config.transition.clone());
        Self {
            announced_transition: orchestrator.snapshot(),
            orchestrator,
            since_broadcast: config.broadcast_interval,
            config,
            prefabs,
            session,
            connections: HashMap::new(),
            owner: None,
            next_user_key: 0,
            incoming: VecDeque::new(),
            outgoing_crew_state: None,
            needs_snapshot: HashSet::new(),
            last_broadcast_update: None,
            since_resync: Duration::ZERO,
            crew_dead_for: Duration::ZERO,
        }
    }

    /// Seeds destination choices with a fixed value, for reproducible runs.
    pub fn seed_rng(&mut self, seed: u64) {
        self.session.rng = Rng::with_seed(seed);
    }

    /// Puts the crew at the first location if the campaign has none yet,
    /// picks a destination, and writes the initial save.
    pub fn start(&mut self) -> Result<(), ServerError> {
        let Session {
            campaign, map, rng, ..
        } = &mut self.session;
        campaign.mutate(|state| {
            if state.current_location.is_none() && !map.is_empty() {
                map.discover(0);
                enter_location(state, map, 0);
            }
            if let (Some(current), None) = (state.current_location, state.selected_location) {
                state.select_location(random_destination(map, current, rng));
            }
        })?;
        self.session.save()
    }

    pub fn save(&mut self) -> Result<(), ServerError> {
        self.session.save()
    }

    // Users

    pub fn connect_user(&mut self, mut user: User, sender: Box<dyn PacketSender>) -> UserKey {
        let key = UserKey::new(self.next_user_key);
        self.next_user_key += 1;

        if user.character.is_none() {
            if let Some(data) = self.session.characters.find(&user) {
                debug!("restored character {} for {}", data.info.name, user.name);
                user.character = Some(data.info.clone());
            }
        }
        info!("{} joined the campaign", user.name);

        self.session.users.insert(key, user);
        self.connections.insert(key, sender);
        if self.owner.is_none() {
            self.owner = Some(key);
        }
        self.needs_snapshot.insert(key);
        if self.orchestrator.is_running() {
            let packet = self.orchestrator.snapshot().to_packet();
            self.send(&key, &packet);
        }
        self.session.events.push_connection(&key);
        key
    }

    pub fn disconnect_user(&mut self, user_key: &UserKey) -> Result<User, ServerError> {
        let user = self
            .session
            .users
            .remove(user_key)
            .ok_or(ServerError::UnknownUser(*user_key))?;
        self.connections.remove(user_key);
        self.needs_snapshot.remove(user_key);
        if self.owner == Some(*user_key) {
            self.owner = None;
        }
        info!("{} left the campaign", user.name);
        self.session.events.push_disconnection(user_key);
        Ok(user)
    }

    pub fn user(&self, user_key: &UserKey) -> Option<&User> {
        self.session.users.get(user_key)
    }

    pub fn user_mut(&mut self, user_key: &UserKey) -> Option<&mut User> {
        self.session.users.get_mut(user_key)
    }

    pub fn user_keys(&self) -> Vec<UserKey> {
        self.session.users.keys().copied().collect()
    }

    pub fn owner(&self) -> Option<UserKey> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<UserKey>) {
        self.owner = owner;
    }

    pub fn allowed_to_manage_campaign(&self, user_key: &UserKey) -> bool {
        Authority::new(&self.session.users, self.owner).allowed_to_manage_campaign(user_key)
    }

    pub fn allowed_to_end_round(&self, user_key: &UserKey) -> bool {
        Authority::new(&self.session.users, self.owner).allowed_to_end_round(user_key)
    }

    // Campaign

    pub fn campaign(&self) -> &VersionedCampaign {
        &self.session.campaign
    }

    pub fn map(&self) -> &WorldMap {
        &self.session.map
    }

    pub fn roster(&self) -> &CrewRoster {
        &self.session.roster
    }

    pub fn installed_upgrades(&self) -> &UpgradeLevels {
        &self.session.installed_upgrades
    }

    pub fn save_path(&self) -> &PathBuf {
        &self.session.save_path
    }

    pub fn transition_phase(&self) -> TransitionPhase {
        self.orchestrator.phase()
    }

    pub fn take_events(&mut self) -> CampaignEvents {
        mem::replace(&mut self.session.events, CampaignEvents::new())
    }

    // Input

    /// Queues a packet from `user_key` for the next tick.
    pub fn receive(&mut self, user_key: &UserKey, payload: &[u8]) -> Result<(), ServerError> {
        if !self.session.users.contains_key(user_key) {
            return Err(ServerError::UnknownUser(*user_key));
        }
        self.incoming.push_back((*user_key, payload.into()));
        Ok(())
    }

    /// Ends the round on behalf of `user_key`. Returns whether a transition
    /// started.
    pub fn request_transition(&mut self, user_key: &UserKey, kind: TransitionKind) -> bool {
        let packet_kind = PacketKind::RequestStartRound;
        if !self.allowed_to_end_round(user_key) {
            warn!("{user_key:?} may not end the round");
            self.reject(user_key, Rejection::NotAuthorized(packet_kind));
            return false;
        }
        if !self.orchestrator.begin(kind, TransitionTrigger::Requested) {
            self.reject(user_key, Rejection::TransitionRunning);
            return false;
        }
        true
    }

    /// The submarine docked at `location`. Docking at the destination
    /// progresses, docking back at the current location returns.
    pub fn notify_docked(&mut self, location: LocationIndex) -> bool {
        let state = self.session.campaign.state();
        let kind = if state.selected_location == Some(location) {
            TransitionKind::ProgressToNext
        } else if state.current_location == Some(location) {
            TransitionKind::ReturnToPrevious
        } else {
            warn!("docked at {location}, which is neither the start nor the destination");
            return false;
        };
        self.orchestrator.begin(kind, TransitionTrigger::Docked)
    }

    /// The next level finished loading.
    pub fn notify_level_loaded(&mut self) {
        self.session.level_loaded = true;
    }

    // Tick

    /// Drains queued packets, advances any round transition and sends
    /// whatever changed.
    pub fn tick(&mut self, dt: Duration) {
        self.process_incoming();
        self.check_crew_death(dt);
        self.step_transition(dt);
        self.announce_transition();
        self.broadcast(dt);
    }

    fn process_incoming(&mut self) {
        while let Some((user_key, payload)) = self.incoming.pop_front() {
            if !self.session.users.contains_key(&user_key) {
                debug!("dropping packet from departed {user_key:?}");
                continue;
            }
            if let Err(error) = self.handle_packet(&user_key, &payload) {
                warn!("{error}");
                self.session.events.push_error(error);
            }
        }
    }

    fn handle_packet(&mut self, user_key: &UserKey, payload: &[u8]) -> Result<(), ServerError> {
        let user = *user_key;
        let malformed = move |source| ServerError::MalformedPacket { user, source };

        let mut reader = BitReader::new(payload);
        let kind = read_packet_kind(&mut reader).map_err(malformed)?;
        match kind {
            PacketKind::CampaignRequest => {
                let request = CampaignRequest::read(&mut reader, &*self.prefabs)
                    .map_err(malformed)?;
                self.apply_campaign_request(user_key, &request)
            }
            PacketKind::CrewRequest => {
                let request =
                    CrewRequest::read(&mut reader, &*self.prefabs).map_err(malformed)?;
                self.apply_crew_request(user_key, &request)
            }
            PacketKind::RequestStartRound => {
                self.request_start_round(user_key);
                Ok(())
            }
            PacketKind::CampaignState | PacketKind::CrewState | PacketKind::TransitionState => {
                warn!("{user_key:?} sent a server-only {kind:?} packet");
                self.reject(user_key, Rejection::UnexpectedKind(kind));
                Ok(())
            }
        }
    }

    fn apply_campaign_request(
        &mut self,
        user_key: &UserKey,
        request: &CampaignRequest,
    ) -> Result<(), ServerError> {
        if !self.allowed_to_manage_campaign(user_key) {
            warn!("{user_key:?} may not manage the campaign");
            self.reject(user_key, Rejection::NotAuthorized(PacketKind::CampaignRequest));
            return Ok(());
        }
        if self.orchestrator.is_running() {
            self.reject(user_key, Rejection::TransitionRunning);
            return Ok(());
        }

        let gateway = Gateway {
            config: &self.config,
            prefabs: &*self.prefabs,
            map: &self.session.map,
            installed_upgrades: &self.session.installed_upgrades,
        };
        let rng = &mut self.session.rng;
        let ((), changed) = self
            .session
            .campaign
            .mutate_if_changed(|state| gateway.apply_request(state, request, rng))?;

        if changed {
            let update_id = self.session.campaign.update_id();
            debug!("{user_key:?} changed the campaign, update {update_id}");
            self.session.events.push_change(user_key, update_id);
        }
        Ok(())
    }

    fn apply_crew_request(
        &mut self,
        user_key: &UserKey,
        request: &CrewRequest,
    ) -> Result<(), ServerError> {
        if !self.allowed_to_manage_campaign(user_key) {
            warn!("{user_key:?} may not manage the crew");
            self.reject(user_key, Rejection::NotAuthorized(PacketKind::CrewRequest));
            return Ok(());
        }

        if self.orchestrator.is_running() {
            self.reject(user_key, Rejection::TransitionRunning);
            return Ok(());
        }

        let Session {
            campaign,
            map,
            roster,
            events,
            ..
        } = &mut self.session;
        let current = campaign.state().current_location;

        let fired = request
            .fired
            .and_then(|id| roster.fire(id).map(|info| info.id));

        // hires validate against the list the request replaces
        if request.validate_hires {
            let location = match current {
                Some(index) => map.location_mut(index),
                None => None,
            };
            if let Some(location) = location {
                let paid = roster.validate_hires(location, campaign.state().money);
                if paid > 0 {
                    campaign.mutate(|state| state.money -= paid)?;
                    events.push_change(user_key, campaign.update_id());
                }
            }
        }

        if let Some(ids) = &request.pending_hires {
            match current.and_then(|index| map.location(index)) {
                Some(location) => roster.set_pending_hires(ids, location),
                None => warn!("no location to hire from"),
            }
        }

        self.outgoing_crew_state = Some(roster.crew_state(
            current.and_then(|index| map.location(index)),
            request.validate_hires,
            fired,
        ));
        Ok(())
    }

    fn request_start_round(&mut self, user_key: &UserKey) {
        let kind = if self.session.campaign.state().selected_location.is_some() {
            TransitionKind::ProgressToNext
        } else {
            TransitionKind::ReturnToPrevious
        };
        if self.request_transition(user_key, kind) {
            self.session.events.push_start_round_request(user_key);
        }
    }

    fn reject(&mut self, user_key: &UserKey, rejection: Rejection) {
        self.session.events.push_rejection(user_key, rejection);
    }

    fn check_crew_death(&mut self, dt: Duration) {
        let users = &self.session.users;
        let in_round = users.values().any(|user| user.in_game);
        let alive = users.values().any(User::has_living_character);
        if self.orchestrator.is_running() || !in_round || alive {
            self.crew_dead_for = Duration::ZERO;
            return;
        }
        self.crew_dead_for += dt;
        if self.crew_dead_for >= self.config.crew_death_timeout {
            self.crew_dead_for = Duration::ZERO;
            self.orchestrator
                .begin(TransitionKind::ReturnToPrevious, TransitionTrigger::CrewDead);
        }
    }

    fn step_transition(&mut self, dt: Duration) {
        if !self.orchestrator.is_running() {
            return;
        }
        if self.orchestrator.step(dt, &mut self.session) == StepResult::Done {
            if let Some(outcome) = self.orchestrator.last_outcome() {
                info!("round transition finished: {outcome:?}");
                self.session.events.push_transition(outcome);
            }
        }
    }

    /// Tells every client about a phase or outcome change since the last
    /// tick.
    fn announce_transition(&mut self) {
        let current = self.orchestrator.snapshot();
        if current == self.announced_transition {
            return;
        }
        debug!("transition now {:?}", current.phase);
        self.announced_transition = current;
        let packet = current.to_packet();
        let keys: Vec<UserKey> = self.connections.keys().copied().collect();
        for key in keys {
            self.send(&key, &packet);
        }
    }

    fn broadcast(&mut self, dt: Duration) {
        if let Some(crew_state) = self.outgoing_crew_state.take() {
            let packet = crew_state.to_packet();
            let keys: Vec<UserKey> = self.connections.keys().copied().collect();
            for key in keys {
                self.send(&key, &packet);
            }
        }

        self.since_broadcast += dt;
        self.since_resync += dt;
        if self.since_broadcast < self.config.broadcast_interval {
            return;
        }
        self.since_broadcast = Duration::ZERO;

        let update_id = self.session.campaign.update_id();
        let everyone = self.last_broadcast_update != Some(update_id)
            || self.since_resync >= self.config.resync_interval;
        let recipients: Vec<UserKey> = if everyone {
            self.since_resync = Duration::ZERO;
            self.needs_snapshot.clear();
            self.connections.keys().copied().collect()
        } else {
            self.needs_snapshot.drain().collect()
        };
        if recipients.is_empty() {
            return;
        }
        self.last_broadcast_update = Some(update_id);

        let snapshot = self.session.campaign.snapshot_for_wire();
        for key in recipients {
            let mut snapshot = snapshot.clone();
            snapshot.character_info = self
                .session
                .users
                .get(&key)
                .and_then(|user| user.character.clone());
            self.send(&key, &snapshot.to_packet());
        }
    }

    fn send(&mut self, user_key: &UserKey, packet: &[u8]) {
        let Some(sender) = self.connections.get(user_key) else {
            return;
        };
        if let Err(source) = sender.send(packet) {
            warn!("could not send to {user_key:?}: {source}");
            self.session.events.push_error(ServerError::Send {
                user: *user_key,
                source,
            });
        }
    }
}
