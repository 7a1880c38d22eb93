//! Combatants: position, facing, and status timers

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::{Grid, in_bounds};
use crate::Timestamp;
use crate::consts::*;

/// Cardinal facing / movement direction. y grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Fixed enumeration order used wherever directions are scanned
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit step for this direction
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, 1),
            Direction::Right => IVec2::new(1, 0),
            Direction::Down => IVec2::new(0, -1),
            Direction::Left => IVec2::new(-1, 0),
        }
    }

    /// Only exact cardinal unit vectors map to a direction
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, 1) => Some(Direction::Up),
            (1, 0) => Some(Direction::Right),
            (0, -1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            _ => None,
        }
    }
}

/// One of the four fighters on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub pos: IVec2,
    pub facing: Direction,
    pub alive: bool,
    pub move_locked_until: Timestamp,
    pub attack_locked_until: Timestamp,
    pub attack_cooldown_until: Timestamp,
    /// Agent cadence: last in-place turn
    pub last_turn_at: Option<Timestamp>,
    /// Last successful step (walk animation, agent cadence)
    pub last_step_at: Option<Timestamp>,
}

impl Combatant {
    pub fn new(pos: IVec2, facing: Direction) -> Self {
        Self {
            pos,
            facing,
            alive: true,
            move_locked_until: 0.0,
            attack_locked_until: 0.0,
            attack_cooldown_until: 0.0,
            last_turn_at: None,
            last_step_at: None,
        }
    }

    /// Spawn point and facing for a slot (0 = human)
    pub fn spawn(index: usize) -> Self {
        match index {
            0 => Self::new(IVec2::new(4, 0), Direction::Up),
            1 => Self::new(IVec2::new(5, 9), Direction::Down),
            2 => Self::new(IVec2::new(9, 4), Direction::Left),
            _ => Self::new(IVec2::new(0, 5), Direction::Right),
        }
    }

    #[inline]
    pub fn is_move_locked(&self, now: Timestamp) -> bool {
        now < self.move_locked_until
    }

    /// Off attack lock and off cooldown
    #[inline]
    pub fn can_cast(&self, now: Timestamp) -> bool {
        now >= self.attack_locked_until && now >= self.attack_cooldown_until
    }

    fn within(last: Option<Timestamp>, now: Timestamp, window: Timestamp) -> bool {
        last.is_some_and(|t| now - t < window)
    }

    /// Turned or stepped too recently to make another agent decision
    pub fn agent_cadence_blocked(&self, now: Timestamp) -> bool {
        Self::within(self.last_turn_at, now, AGENT_TURN_LOCK_MS)
            || Self::within(self.last_step_at, now, AGENT_STEP_INTERVAL_MS)
    }
}

/// Owns all combatants; index 0 is the human
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantRegistry {
    pub combatants: Vec<Combatant>,
}

impl Default for CombatantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatantRegistry {
    /// Everyone at their spawn point
    pub fn new() -> Self {
        Self {
            combatants: (0..COMBATANT_COUNT).map(Combatant::spawn).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Combatant> {
        self.combatants.get(index)
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Alive combatant standing on a cell, if any
    pub fn combatant_at(&self, pos: IVec2) -> Option<usize> {
        self.combatants.iter().position(|c| c.alive && c.pos == pos)
    }

    pub fn alive_count(&self) -> usize {
        self.combatants.iter().filter(|c| c.alive).count()
    }

    pub fn alive_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.combatants
            .iter()
            .enumerate()
            .filter(|(_, c)| c.alive)
            .map(|(i, _)| i)
    }

    /// Mark a combatant dead. Returns true if it was alive.
    pub fn kill(&mut self, index: usize) -> bool {
        match self.combatants.get_mut(index) {
            Some(c) if c.alive => {
                c.alive = false;
                true
            }
            _ => false,
        }
    }

    /// In bounds, standable and not occupied by a living combatant
    pub fn is_free(&self, grid: &Grid, pos: IVec2) -> bool {
        in_bounds(pos) && grid.is_standable(pos) && self.combatant_at(pos).is_none()
    }

    /// Human-style step by a unit delta.
    ///
    /// A cardinal input always turns the combatant (when not locked), even
    /// if the destination turns out to be blocked. Diagonal or zero input
    /// does nothing. Returns true if the combatant moved.
    pub fn try_step(
        &mut self,
        grid: &Grid,
        index: usize,
        dx: i32,
        dy: i32,
        now: Timestamp,
    ) -> bool {
        let Some(dir) = Direction::from_delta(dx, dy) else {
            return false;
        };
        let Some(c) = self.combatants.get(index) else {
            return false;
        };
        if !c.alive || c.is_move_locked(now) {
            return false;
        }
        let dest = c.pos + dir.delta();
        let free = self.is_free(grid, dest);

        let c = &mut self.combatants[index];
        c.facing = dir;
        if !free {
            return false;
        }
        c.pos = dest;
        c.last_step_at = Some(now);
        c.move_locked_until = now + MOVE_LOCK_MS;
        true
    }

    /// Face a new direction without stepping
    pub fn turn(&mut self, index: usize, dir: Direction, now: Timestamp, lock: Timestamp) {
        if let Some(c) = self.combatants.get_mut(index) {
            c.facing = dir;
            c.last_turn_at = Some(now);
            c.move_locked_until = now + lock;
        }
    }

    /// Agent step in an already-faced direction with its own lock
    pub fn step_agent(
        &mut self,
        grid: &Grid,
        index: usize,
        dir: Direction,
        now: Timestamp,
        lock: Timestamp,
    ) -> bool {
        let Some(c) = self.combatants.get(index) else {
            return false;
        };
        let dest = c.pos + dir.delta();
        if !c.alive || !self.is_free(grid, dest) {
            return false;
        }
        let c = &mut self.combatants[index];
        c.pos = dest;
        c.facing = dir;
        c.last_step_at = Some(now);
        c.move_locked_until = now + lock;
        true
    }

    /// Cooldown gauge: 0.0 right after casting, 1.0 when ready. Dead reads 0.
    pub fn cooldown_ratio(&self, index: usize, now: Timestamp) -> f32 {
        match self.combatants.get(index) {
            Some(c) if c.alive => {
                let remaining = (c.attack_cooldown_until - now).max(0.0);
                (1.0 - remaining / ATTACK_COOLDOWN_MS).clamp(0.0, 1.0) as f32
            }
            _ => 0.0,
        }
    }

    /// Whether the walk animation should play for this combatant.
    /// Only a real step starts it; turning in place does not.
    pub fn is_moving(&self, index: usize, now: Timestamp) -> bool {
        self.combatants
            .get(index)
            .and_then(|c| c.last_step_at)
            .is_some_and(|t| now >= t && now < t + MOVE_LOCK_MS + WALK_ANIM_TAIL_MS)
    }
}
