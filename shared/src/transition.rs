use std::time::Duration;

use fathom_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr, UnsignedInteger};
use log::{info, warn};

use crate::messages::transition_state::TransitionState;

/// Where the crew goes when the round ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Back to the location the round started from.
    ReturnToPrevious,
    /// On to the selected destination.
    ProgressToNext,
    /// The campaign is over.
    End,
}

/// What set the transition off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionTrigger {
    Docked,
    Requested,
    CrewDead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionPhase {
    Idle,
    EndingRound,
    CameraTransitionOut,
    WaitingForNewLevel,
    CameraTransitionIn,
    CampaignEnded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepResult {
    Continue,
    Done,
}

/// How the most recent transition finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionOutcome {
    Completed,
    /// The new level never arrived and the host was sent back to the lobby.
    TimedOut,
    Aborted,
    CampaignEnded,
}

// Wire tags: the index of each variant, in declaration order
macro_rules! impl_serde_for_tag {
    ($ty:ty, $bits:literal, [$($variant:ident = $index:literal),+ $(,)?]) => {
        impl Serde for $ty {
            fn ser(&self, writer: &mut dyn BitWrite) {
                let index: u8 = match self {
                    $(Self::$variant => $index,)+
                };
                UnsignedInteger::<$bits>::new(index).ser(writer);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                match UnsignedInteger::<$bits>::de(reader)?.get() {
                    $($index => Ok(Self::$variant),)+
                    _ => Err(SerdeErr),
                }
            }

            fn bit_length(&self) -> u32 {
                <UnsignedInteger<$bits> as ConstBitLength>::const_bit_length()
            }
        }
    };
}

impl_serde_for_tag!(TransitionKind, 2, [ReturnToPrevious = 0, ProgressToNext = 1, End = 2]);
impl_serde_for_tag!(
    TransitionPhase,
    3,
    [
        Idle = 0,
        EndingRound = 1,
        CameraTransitionOut = 2,
        WaitingForNewLevel = 3,
        CameraTransitionIn = 4,
        CampaignEnded = 5,
    ]
);
impl_serde_for_tag!(
    TransitionOutcome,
    2,
    [Completed = 0, TimedOut = 1, Aborted = 2, CampaignEnded = 3]
);

/// Durations that bound each waiting phase.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionConfig {
    pub end_transition_duration: Duration,
    pub camera_in_duration: Duration,
    pub level_load_timeout: Duration,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            end_transition_duration: Duration::from_secs(2),
            camera_in_duration: Duration::from_secs(1),
            level_load_timeout: Duration::from_secs(30),
        }
    }
}

/// The side effects a transition needs from whoever drives it.
pub trait TransitionHost {
    /// Wrap up the finished round and move the campaign according to
    /// `kind`.
    fn end_round(&mut self, kind: TransitionKind);

    /// Start generating or receiving the next level.
    fn begin_level_load(&mut self);

    fn level_loaded(&self) -> bool;

    /// Give up on the level and return everyone to the lobby.
    fn fall_back_to_lobby(&mut self);

    /// The owning screen went away; the transition should stop quietly.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Tick-driven sequencing of round end, camera fade, level load and fade
/// in. Nothing here blocks: each call to [`step`](Self::step) advances by
/// `dt` and returns.
#[derive(Clone, Debug)]
pub struct TransitionOrchestrator {
    config: TransitionConfig,
    phase: TransitionPhase,
    kind: Option<TransitionKind>,
    elapsed: Duration,
    last_outcome: Option<TransitionOutcome>,
}

impl TransitionOrchestrator {
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            phase: TransitionPhase::Idle,
            kind: None,
            elapsed: Duration::ZERO,
            last_outcome: None,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn kind(&self) -> Option<TransitionKind> {
        self.kind
    }

    pub fn last_outcome(&self) -> Option<TransitionOutcome> {
        self.last_outcome
    }

    pub fn is_running(&self) -> bool {
        !matches!(
            self.phase,
            TransitionPhase::Idle | TransitionPhase::CampaignEnded
        )
    }

    /// Starts a transition. Returns false if one is already running or the
    /// campaign has ended.
    pub fn begin(&mut self, kind: TransitionKind, trigger: TransitionTrigger) -> bool {
        if self.phase != TransitionPhase::Idle {
            return false;
        }
        info!("round ending ({trigger:?}), transition {kind:?}");
        self.kind = Some(kind);
        self.phase = TransitionPhase::EndingRound;
        self.elapsed = Duration::ZERO;
        self.last_outcome = None;
        true
    }

    /// Where this transition stands, as reported to followers.
    pub fn snapshot(&self) -> TransitionState {
        TransitionState {
            kind: self.kind,
            phase: self.phase,
            outcome: self.last_outcome,
        }
    }

    /// Jumps to the phase another orchestrator reported. Makes no host
    /// calls; the caller reacts to the change. Returns false if nothing
    /// changed.
    pub fn follow(&mut self, state: &TransitionState) -> bool {
        if self.snapshot() == *state {
            return false;
        }
        if self.phase != state.phase {
            self.elapsed = Duration::ZERO;
        }
        self.kind = state.kind;
        self.phase = state.phase;
        self.last_outcome = state.outcome;
        true
    }

    /// Returns to `Idle` without any further host calls.
    pub fn abort(&mut self) {
        if !self.is_running() {
            return;
        }
        info!("transition aborted in {:?}", self.phase);
        self.finish(TransitionOutcome::Aborted);
    }

    pub fn step(&mut self, dt: Duration, host: &mut dyn TransitionHost) -> StepResult {
        if self.is_running() && host.is_cancelled() {
            self.abort();
            return StepResult::Done;
        }

        match self.phase {
            TransitionPhase::Idle | TransitionPhase::CampaignEnded => StepResult::Done,
            TransitionPhase::EndingRound => {
                let kind = self.kind.unwrap_or(TransitionKind::ReturnToPrevious);
                host.end_round(kind);
                if kind == TransitionKind::End {
                    self.phase = TransitionPhase::CampaignEnded;
                    self.last_outcome = Some(TransitionOutcome::CampaignEnded);
                    return StepResult::Done;
                }
                self.enter(TransitionPhase::CameraTransitionOut);
                StepResult::Continue
            }
            TransitionPhase::CameraTransitionOut => {
                self.elapsed += dt;
                if self.elapsed >= self.config.end_transition_duration {
                    host.begin_level_load();
                    self.enter(TransitionPhase::WaitingForNewLevel);
                }
                StepResult::Continue
            }
            TransitionPhase::WaitingForNewLevel => {
                if host.level_loaded() {
                    self.enter(TransitionPhase::CameraTransitionIn);
                    return StepResult::Continue;
                }
                self.elapsed += dt;
                if self.elapsed >= self.config.level_load_timeout {
                    warn!(
                        "new level not loaded after {:?}, returning to lobby",
                        self.config.level_load_timeout
                    );
                    host.fall_back_to_lobby();
                    self.finish(TransitionOutcome::TimedOut);
                    return StepResult::Done;
                }
                StepResult::Continue
            }
            TransitionPhase::CameraTransitionIn => {
                self.elapsed += dt;
                if self.elapsed >= self.config.camera_in_duration {
                    self.finish(TransitionOutcome::Completed);
                    return StepResult::Done;
                }
                StepResult::Continue
            }
        }
    }

    fn enter(&mut self, phase: TransitionPhase) {
        self.phase = phase;
        self.elapsed = Duration::ZERO;
    }

    fn finish(&mut self, outcome: TransitionOutcome) {
        self.phase = TransitionPhase::Idle;
        self.kind = None;
        self.elapsed = Duration::ZERO;
        self.last_outcome = Some(outcome);
    }
}
