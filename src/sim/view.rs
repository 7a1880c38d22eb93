//! Read-only per-frame snapshot for renderers and UI
//!
//! Nothing in here feeds back into the simulation.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::attack::AttackPhase;
use super::combatant::Direction;
use super::grid::{Grid, PanelState, in_bounds};
use super::state::{Match, MatchPhase, Outcome, Winner};
use crate::Timestamp;
use crate::consts::GRID_SIZE;

/// How a single cell should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PanelDrawState {
    Normal,
    Hole,
    /// Telegraphed by the current attack
    Glow,
    /// Just knocked out by the current attack
    Drop,
    /// Fading back in; ratio goes 0 -> 1
    Respawning { ratio: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantView {
    pub pos: IVec2,
    pub facing: Direction,
    pub alive: bool,
    /// 0.0 right after casting, 1.0 when ready
    pub cooldown_ratio: f32,
    /// Walk animation should play
    pub moving: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackView {
    pub caster: usize,
    pub phase: AttackPhase,
    pub glowing: Vec<IVec2>,
    pub dropped: Vec<IVec2>,
}

/// Everything a frontend needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub now: Timestamp,
    pub phase: MatchPhase,
    /// Time left on the Ready/Fight banner
    pub deadline_remaining: Option<Timestamp>,
    /// Row-major, y = 0 first
    pub panels: Vec<PanelDrawState>,
    pub combatants: Vec<CombatantView>,
    pub attack: Option<AttackView>,
    /// Human may cast (drives the attack button highlight)
    pub attack_ready: bool,
    pub winner: Option<Winner>,
    pub outcome: Option<Outcome>,
}

impl MatchSnapshot {
    pub fn capture<R>(state: &Match<R>) -> Self {
        let now = state.now();

        let panels = Grid::cells()
            .map(|cell| panel_draw_state(state, cell, now))
            .collect();

        let combatants = state
            .registry
            .combatants
            .iter()
            .enumerate()
            .map(|(i, c)| CombatantView {
                pos: c.pos,
                facing: c.facing,
                alive: c.alive,
                cooldown_ratio: state.registry.cooldown_ratio(i, now),
                moving: c.alive && state.registry.is_moving(i, now),
            })
            .collect();

        let attack = state.attack.as_ref().map(|a| AttackView {
            caster: a.caster,
            phase: a.phase,
            glowing: a.target_cells.iter().copied().filter(|&c| a.is_glowing(c)).collect(),
            dropped: a.target_cells.iter().copied().filter(|&c| a.is_dropped(c)).collect(),
        });

        let winner = match state.phase {
            MatchPhase::Result => state.winner,
            _ => None,
        };

        Self {
            now,
            phase: state.phase,
            deadline_remaining: state.deadline_remaining(),
            panels,
            combatants,
            attack,
            attack_ready: state.attack_ready(),
            winner,
            outcome: winner.map(Winner::outcome),
        }
    }

    /// Draw state of one cell (None when off the board)
    pub fn panel(&self, pos: IVec2) -> Option<PanelDrawState> {
        if !in_bounds(pos) {
            return None;
        }
        self.panels.get((pos.y * GRID_SIZE + pos.x) as usize).copied()
    }
}

fn panel_draw_state<R>(state: &Match<R>, cell: IVec2, now: Timestamp) -> PanelDrawState {
    let attack = state.attack.as_ref();
    if attack.is_some_and(|a| a.is_dropped(cell)) {
        return PanelDrawState::Drop;
    }
    let Some(panel) = state.grid.panel(cell) else {
        return PanelDrawState::Hole;
    };
    match panel.state {
        PanelState::Fallen { .. } => PanelDrawState::Hole,
        _ if attack.is_some_and(|a| a.is_glowing(cell)) => PanelDrawState::Glow,
        PanelState::Respawning { .. } => PanelDrawState::Respawning {
            ratio: state.grid.respawn_ratio(cell, now).unwrap_or(0.0),
        },
        PanelState::Present => PanelDrawState::Normal,
    }
}
