//! Decision logic for the computer-controlled combatants
//!
//! Agents shoot whenever someone is on their line of fire, otherwise wander
//! at a fixed cadence. Turning and stepping are separate decisions, so a
//! change of direction always costs a tick plus the turn lock.

use glam::IVec2;
use rand::Rng;

use super::attack::{self, Attack};
use super::combatant::{CombatantRegistry, Direction};
use super::grid::{Grid, in_bounds};
use crate::Timestamp;
use crate::consts::*;

/// What an agent chose to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentAction {
    Idle,
    Cast,
    Turn(Direction),
    Step(Direction),
}

/// Another living combatant somewhere along the agent's facing ray
pub fn has_target_on_line(registry: &CombatantRegistry, index: usize) -> bool {
    let Some(c) = registry.get(index) else {
        return false;
    };
    let step = c.facing.delta();
    let mut cell = c.pos + step;
    while in_bounds(cell) {
        if registry.combatant_at(cell).is_some_and(|who| who != index) {
            return true;
        }
        cell += step;
    }
    false
}

/// Directions whose neighbouring cell can be walked into, in `Direction::ALL` order
pub fn move_options(grid: &Grid, registry: &CombatantRegistry, pos: IVec2) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|d| registry.is_free(grid, pos + d.delta()))
        .collect()
}

/// Pick this tick's action for one agent.
///
/// Does not look at the match phase or the attack slot; the caller skips
/// agents while an attack is in flight or outside of battle.
pub fn decide<R: Rng>(
    grid: &Grid,
    registry: &CombatantRegistry,
    index: usize,
    now: Timestamp,
    rng: &mut R,
) -> AgentAction {
    let Some(c) = registry.get(index) else {
        return AgentAction::Idle;
    };
    if !c.alive {
        return AgentAction::Idle;
    }

    if c.can_cast(now) && has_target_on_line(registry, index) {
        return AgentAction::Cast;
    }

    if c.is_move_locked(now) || c.agent_cadence_blocked(now) {
        return AgentAction::Idle;
    }

    let options = move_options(grid, registry, c.pos);
    if options.is_empty() {
        return AgentAction::Idle;
    }
    let dir = options[rng.random_range(0..options.len())];
    if dir != c.facing {
        AgentAction::Turn(dir)
    } else {
        AgentAction::Step(dir)
    }
}

/// Carry out a decided action. Returns true if anything changed.
pub fn act(
    grid: &Grid,
    registry: &mut CombatantRegistry,
    slot: &mut Option<Attack>,
    index: usize,
    action: AgentAction,
    now: Timestamp,
) -> bool {
    match action {
        AgentAction::Idle => false,
        AgentAction::Cast => attack::cast(slot, registry, index, now),
        AgentAction::Turn(dir) => {
            registry.turn(index, dir, now, AGENT_TURN_LOCK_MS);
            true
        }
        AgentAction::Step(dir) => {
            registry.step_agent(grid, index, dir, now, AGENT_STEP_INTERVAL_MS)
        }
    }
}
