//! Per-frame match update
//!
//! Drives phase transitions and, during battle, advances every subsystem in
//! a fixed order so that timers expiring in the same frame always resolve
//! the same way.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::agent;
use super::attack::{self, AttackStep};
use super::combatant::{CombatantRegistry, Direction};
use super::grid::Grid;
use super::state::{GameEvent, Match, MatchPhase, Winner};
use crate::Timestamp;
use crate::consts::*;

/// Input commands for a single tick (already debounced by the host)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held movement direction; simultaneous axes must arrive as None
    pub movement: Option<Direction>,
    /// Attack pressed this frame (edge-triggered)
    pub attack: bool,
    /// Demo mode - the human slot plays itself
    pub autopilot: bool,
}

/// Begin a new game from the title or result screen.
/// Returns false (and does nothing) in any other phase.
pub fn start_new_game<R>(state: &mut Match<R>) -> bool {
    if !matches!(state.phase, MatchPhase::Title | MatchPhase::Result) {
        return false;
    }
    state.reset_field();
    let deadline = state.now + READY_DURATION_MS;
    state.enter_phase(MatchPhase::Ready, Some(deadline));
    true
}

/// Advance the match by one host frame
pub fn tick<R: Rng>(state: &mut Match<R>, input: &TickInput, dt: Timestamp) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DELTA_MS)
    } else {
        0.0
    };
    state.now += dt;
    let now = state.now;

    let deadline_passed = state.phase_deadline.is_some_and(|d| now >= d);
    match state.phase {
        MatchPhase::Ready if deadline_passed => {
            state.enter_phase(MatchPhase::Fight, Some(now + FIGHT_DURATION_MS));
        }
        MatchPhase::Fight if deadline_passed => {
            state.enter_phase(MatchPhase::Battle, None);
        }
        _ => {}
    }

    if state.phase == MatchPhase::Battle {
        battle_tick(state, input, now);
    }
}

fn battle_tick<R: Rng>(state: &mut Match<R>, input: &TickInput, now: Timestamp) {
    // 1. Panels regrow
    for cell in state.grid.tick_respawns(now) {
        state.push_event(GameEvent::PanelRestored(cell));
    }

    // 2. In-flight attack
    let step = attack::advance(&mut state.attack, &mut state.grid, &mut state.registry, now);
    if let Some(AttackStep::Dropped { cell, victim, .. }) = step {
        state.push_event(GameEvent::PanelDropped(cell));
        if let Some(v) = victim {
            state.push_event(GameEvent::CombatantFell(v));
        }
    }

    // 3. Anyone left standing on a hole falls
    for fallen in fall_sweep(&state.grid, &mut state.registry) {
        log::debug!("Combatant {} fell through a missing panel", fallen);
        state.push_event(GameEvent::CombatantFell(fallen));
    }

    // 4. Win check, only after deaths are final
    if let Some(winner) = check_winner(&state.registry) {
        log::info!("Match over: {:?}", winner);
        state.winner = Some(winner);
        state.enter_phase(MatchPhase::Result, None);
        state.push_event(GameEvent::MatchEnded(winner));
        return;
    }

    // 5. Agents, in index order
    for index in 1..state.registry.len() {
        run_agent(state, index, now);
    }

    // 6. Human
    if input.autopilot {
        run_agent(state, 0, now);
        return;
    }
    if let Some(dir) = input.movement {
        let d = dir.delta();
        state.registry.try_step(&state.grid, 0, d.x, d.y, now);
    }
    if input.attack && attack::cast(&mut state.attack, &mut state.registry, 0, now) {
        queue_cast(state, 0);
    }
}

fn run_agent<R: Rng>(state: &mut Match<R>, index: usize, now: Timestamp) {
    if state.attack.is_some() {
        return;
    }
    let action = agent::decide(&state.grid, &state.registry, index, now, &mut state.rng);
    let acted = agent::act(
        &state.grid,
        &mut state.registry,
        &mut state.attack,
        index,
        action,
        now,
    );
    if acted && action == agent::AgentAction::Cast {
        queue_cast(state, index);
    }
}

fn queue_cast<R>(state: &mut Match<R>, caster: usize) {
    let cells = state.attack.as_ref().map_or(0, |a| a.target_cells.len());
    state.push_event(GameEvent::CastStarted { caster, cells });
}

/// Kill every living combatant whose cell is no longer standable.
/// Returns who fell, in index order.
pub fn fall_sweep(grid: &Grid, registry: &mut CombatantRegistry) -> Vec<usize> {
    let doomed: Vec<usize> = registry
        .alive_indices()
        .filter(|&i| !grid.is_standable(registry.combatants[i].pos))
        .collect();
    for &i in &doomed {
        registry.kill(i);
    }
    doomed
}

/// Decide whether the match is over.
///
/// Nobody alive is a draw. A dead human otherwise always hands the win to
/// slot 1, whoever else is still standing. Failing both, the last one alive
/// wins.
pub fn check_winner(registry: &CombatantRegistry) -> Option<Winner> {
    let alive = registry.alive_count();
    if alive == 0 {
        return Some(Winner::Draw);
    }
    if registry.get(0).is_some_and(|human| !human.alive) {
        return Some(Winner::Combatant(1));
    }
    match alive {
        1 => registry.alive_indices().next().map(Winner::Combatant),
        _ => None,
    }
}
