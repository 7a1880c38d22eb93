//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`, on the match's own clock
//! - Seeded RNG only
//! - Stable iteration order (by combatant index, then row-major cells)
//! - No rendering or platform dependencies

pub mod agent;
pub mod attack;
pub mod combatant;
pub mod grid;
pub mod state;
pub mod tick;
pub mod view;

pub use agent::AgentAction;
pub use attack::{Attack, AttackPhase, AttackStep};
pub use combatant::{Combatant, CombatantRegistry, Direction};
pub use grid::{Grid, Panel, PanelState};
pub use state::{GameEvent, Match, MatchPhase, Outcome, Winner};
pub use tick::{TickInput, check_winner, fall_sweep, start_new_game, tick};
pub use view::{AttackView, CombatantView, MatchSnapshot, PanelDrawState};
