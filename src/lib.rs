//! Drop Zone - A tile-elimination arena game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (panels, combatants, attacks, agents, match flow)
//! - `platform`: Browser host bindings (wasm32 only)
//! - `settings`: Host configuration

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{Direction, Match, MatchPhase, MatchSnapshot, TickInput, Winner};

/// Milliseconds on the match clock.
///
/// The clock is monotonic and owned by the match; every timer in the
/// simulation is compared against it.
pub type Timestamp = f64;

/// Game configuration constants
pub mod consts {
    /// Grid is GRID_SIZE x GRID_SIZE panels
    pub const GRID_SIZE: i32 = 10;
    /// Number of combatants (index 0 is the human)
    pub const COMBATANT_COUNT: usize = 4;

    /// Largest frame delta the match will accept (ms)
    pub const MAX_FRAME_DELTA_MS: f64 = 100.0;

    /// Move lock after a human step
    pub const MOVE_LOCK_MS: f64 = 200.0;
    /// Cooldown between casts
    pub const ATTACK_COOLDOWN_MS: f64 = 2000.0;
    /// Caster cannot cast again while this lock runs
    pub const ATTACK_LOCK_MS: f64 = 600.0;
    /// One glow step per target cell
    pub const GLOW_STEP_MS: f64 = 50.0;
    /// One panel dropped per step
    pub const DROP_STEP_MS: f64 = 100.0;

    /// Fallen panel waits this long before regrowing
    pub const PANEL_RESPAWN_DELAY_MS: f64 = 5000.0;
    /// Regrow fade-in duration
    pub const PANEL_RESPAWN_ANIM_MS: f64 = 200.0;

    /// Agent step cadence and move lock
    pub const AGENT_STEP_INTERVAL_MS: f64 = 500.0;
    /// Agent turn cadence and move lock
    pub const AGENT_TURN_LOCK_MS: f64 = 500.0;

    /// "READY" banner duration
    pub const READY_DURATION_MS: f64 = 1200.0;
    /// "FIGHT!!" banner duration
    pub const FIGHT_DURATION_MS: f64 = 800.0;

    /// Extra time after a step's move lock during which the walk sprite still plays
    pub const WALK_ANIM_TAIL_MS: f64 = 50.0;
}
