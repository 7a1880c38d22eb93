//! Match state and core simulation types
//!
//! Everything one match needs lives in [`Match`]: the board, the fighters,
//! the in-flight attack, the clock and the random source. Nothing is global,
//! so any number of matches can run side by side.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::attack::Attack;
use super::combatant::CombatantRegistry;
use super::grid::Grid;
use crate::Timestamp;

/// Coarse stage of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Waiting for the first start command
    Title,
    /// "READY" banner
    Ready,
    /// "FIGHT!!" banner
    Fight,
    /// Live simulation
    Battle,
    /// Winner decided, waiting for a restart
    Result,
}

/// Final result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Combatant(usize),
    Draw,
}

/// Result from the human player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    Draw,
    Defeat,
}

impl Winner {
    pub fn outcome(self) -> Outcome {
        match self {
            Winner::Combatant(0) => Outcome::Victory,
            Winner::Draw => Outcome::Draw,
            Winner::Combatant(_) => Outcome::Defeat,
        }
    }
}

/// Things that happened during a tick, for audio/UI hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged(MatchPhase),
    CastStarted { caster: usize, cells: usize },
    PanelDropped(IVec2),
    CombatantFell(usize),
    PanelRestored(IVec2),
    MatchEnded(Winner),
}

/// Complete match state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct Match<R = Pcg32> {
    /// Current phase
    pub phase: MatchPhase,
    /// When the Ready/Fight banner ends
    pub phase_deadline: Option<Timestamp>,
    /// Set when entering Result
    pub winner: Option<Winner>,
    /// Floor panels
    pub grid: Grid,
    /// All four combatants
    pub registry: CombatantRegistry,
    /// At most one attack in flight
    pub attack: Option<Attack>,
    /// Random source for agent decisions
    pub rng: R,
    /// Monotonic match clock (ms)
    pub(crate) now: Timestamp,
    /// Events not yet collected by the host
    pub(crate) events: Vec<GameEvent>,
}

impl Match<Pcg32> {
    /// Create a match on the title screen with a seeded random source
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }
}

impl<R> Match<R> {
    /// Create a match on the title screen with any random source
    pub fn with_rng(rng: R) -> Self {
        Self {
            phase: MatchPhase::Title,
            phase_deadline: None,
            winner: None,
            grid: Grid::new(),
            registry: CombatantRegistry::new(),
            attack: None,
            rng,
            now: 0.0,
            events: Vec::new(),
        }
    }

    /// Current clock value
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Hand pending events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Switch phase, logging and queueing the change
    pub(crate) fn enter_phase(&mut self, phase: MatchPhase, deadline: Option<Timestamp>) {
        log::info!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.phase_deadline = deadline;
        self.push_event(GameEvent::PhaseChanged(phase));
    }

    /// Put the board and fighters back to their starting layout.
    /// Undrained events from the previous game stay queued.
    pub(crate) fn reset_field(&mut self) {
        self.grid = Grid::new();
        self.registry = CombatantRegistry::new();
        self.attack = None;
        self.winner = None;
    }

    /// Time left on the Ready/Fight banner
    pub fn deadline_remaining(&self) -> Option<Timestamp> {
        self.phase_deadline.map(|d| (d - self.now).max(0.0))
    }

    /// The human can cast right now
    pub fn attack_ready(&self) -> bool {
        self.phase == MatchPhase::Battle
            && self
                .registry
                .get(0)
                .is_some_and(|c| c.alive && self.now >= c.attack_cooldown_until)
    }
}
