//! Line attack resolution: targeting, glow telegraph, sequential drop
//!
//! A cast locks in an ordered list of cells along the caster's facing ray.
//! The cells light up one by one (glow), then fall one by one (drop), so a
//! combatant further down the line still has time to step out of the way.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::combatant::CombatantRegistry;
use super::grid::{Grid, in_bounds};
use crate::Timestamp;
use crate::consts::*;

/// Stage of an in-flight attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPhase {
    /// Telegraph: cells light up one per step
    Glowing,
    /// Cells fall one per step
    Dropping,
}

/// The single in-flight attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub caster: usize,
    pub phase: AttackPhase,
    /// Nearest to farthest from the caster, no duplicates
    pub target_cells: Vec<IVec2>,
    pub glow_cursor: usize,
    pub drop_cursor: usize,
    pub next_event_at: Timestamp,
}

impl Attack {
    /// Lit during the glow phase (everything up to and including the cursor)
    pub fn is_glowing(&self, pos: IVec2) -> bool {
        self.phase == AttackPhase::Glowing
            && self
                .target_cells
                .iter()
                .take(self.glow_cursor + 1)
                .any(|&c| c == pos)
    }

    /// Already dropped by this attack
    pub fn is_dropped(&self, pos: IVec2) -> bool {
        self.phase == AttackPhase::Dropping
            && self
                .target_cells
                .iter()
                .take(self.drop_cursor)
                .any(|&c| c == pos)
    }
}

/// What a single resolver step did
#[derive(Debug, Clone, PartialEq)]
pub enum AttackStep {
    /// Glow advanced; `entered_drop` when the telegraph just finished
    Glowed { entered_drop: bool },
    /// A panel fell, possibly taking a combatant with it
    Dropped {
        cell: IVec2,
        victim: Option<usize>,
        finished: bool,
    },
}

/// Walk from just past `origin` to the board edge
fn ray(origin: IVec2, step: IVec2) -> impl Iterator<Item = IVec2> {
    std::iter::successors(Some(origin + step), move |&c| Some(c + step))
        .take_while(|&c| in_bounds(c))
}

/// Cells an attack from `caster` would hit, nearest first.
///
/// Candidates are the full facing ray plus every living opponent strictly
/// ahead on the same line; the result is rebuilt by re-walking the ray so
/// order and uniqueness come from the walk itself.
pub fn target_cells(registry: &CombatantRegistry, caster: usize) -> Vec<IVec2> {
    let Some(c) = registry.get(caster) else {
        return Vec::new();
    };
    let step = c.facing.delta();

    let mut candidates: Vec<IVec2> = ray(c.pos, step).collect();
    for (i, other) in registry.combatants.iter().enumerate() {
        if i == caster || !other.alive {
            continue;
        }
        let offset = other.pos - c.pos;
        // Same line and strictly ahead
        let ahead = if step.x == 0 {
            offset.x == 0 && offset.y * step.y > 0
        } else {
            offset.y == 0 && offset.x * step.x > 0
        };
        if ahead && !candidates.contains(&other.pos) {
            candidates.push(other.pos);
        }
    }

    ray(c.pos, step).filter(|cell| candidates.contains(cell)).collect()
}

/// Start an attack from `caster`. Returns false (changing nothing) when an
/// attack is already in flight, the caster is dead or locked, or there is
/// nothing to hit.
pub fn cast(
    slot: &mut Option<Attack>,
    registry: &mut CombatantRegistry,
    caster: usize,
    now: Timestamp,
) -> bool {
    if slot.is_some() {
        return false;
    }
    match registry.get(caster) {
        Some(c) if c.alive && c.can_cast(now) => {}
        _ => return false,
    }
    let cells = target_cells(registry, caster);
    if cells.is_empty() {
        return false;
    }

    log::debug!("Combatant {} casts over {} cells", caster, cells.len());
    *slot = Some(Attack {
        caster,
        phase: AttackPhase::Glowing,
        target_cells: cells,
        glow_cursor: 0,
        drop_cursor: 0,
        next_event_at: now + GLOW_STEP_MS,
    });
    let c = &mut registry.combatants[caster];
    c.attack_locked_until = now + ATTACK_LOCK_MS;
    c.attack_cooldown_until = now + ATTACK_COOLDOWN_MS;
    true
}

/// Run at most one due step of the in-flight attack
pub fn advance(
    slot: &mut Option<Attack>,
    grid: &mut Grid,
    registry: &mut CombatantRegistry,
    now: Timestamp,
) -> Option<AttackStep> {
    let attack = slot.as_mut()?;
    if now < attack.next_event_at {
        return None;
    }

    match attack.phase {
        AttackPhase::Glowing => {
            attack.glow_cursor += 1;
            let entered_drop = attack.glow_cursor >= attack.target_cells.len();
            if entered_drop {
                attack.phase = AttackPhase::Dropping;
                attack.drop_cursor = 0;
                attack.next_event_at = now + DROP_STEP_MS;
            } else {
                attack.next_event_at = now + GLOW_STEP_MS;
            }
            Some(AttackStep::Glowed { entered_drop })
        }
        AttackPhase::Dropping => {
            let cell = attack.target_cells[attack.drop_cursor];
            grid.destroy(cell, now);
            let victim = registry.combatant_at(cell);
            if let Some(v) = victim {
                registry.kill(v);
                log::debug!("Combatant {} fell at ({}, {})", v, cell.x, cell.y);
            }
            log::trace!("Panel ({}, {}) dropped", cell.x, cell.y);

            attack.drop_cursor += 1;
            let finished = attack.drop_cursor >= attack.target_cells.len();
            if finished {
                *slot = None;
            } else {
                attack.next_event_at = now + DROP_STEP_MS;
            }
            Some(AttackStep::Dropped {
                cell,
                victim,
                finished,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combatant::Direction;
    use proptest::prelude::*;

    /// Registry with only the caster at `pos` facing `dir`; others parked dead
    fn lone_caster(pos: IVec2, dir: Direction) -> CombatantRegistry {
        let mut reg = CombatantRegistry::new();
        reg.combatants[0].pos = pos;
        reg.combatants[0].facing = dir;
        for i in 1..reg.len() {
            reg.kill(i);
        }
        reg
    }

    /// Drive the attack until it clears, stepping the clock by `dt`
    fn run_to_completion(
        slot: &mut Option<Attack>,
        grid: &mut Grid,
        reg: &mut CombatantRegistry,
        mut now: Timestamp,
        dt: Timestamp,
    ) -> Vec<(Timestamp, AttackStep)> {
        let mut steps = Vec::new();
        while slot.is_some() {
            now += dt;
            if let Some(step) = advance(slot, grid, reg, now) {
                steps.push((now, step));
            }
        }
        steps
    }

    #[test]
    fn test_target_cells_full_ray() {
        let reg = lone_caster(IVec2::new(4, 0), Direction::Up);
        let cells = target_cells(&reg, 0);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], IVec2::new(4, 1));
        assert_eq!(cells[8], IVec2::new(4, 9));
    }

    #[test]
    fn test_target_cells_at_edge_is_empty() {
        let reg = lone_caster(IVec2::new(4, 0), Direction::Down);
        assert!(target_cells(&reg, 0).is_empty());
    }

    #[test]
    fn test_target_cells_ignores_opponent_behind() {
        let mut reg = CombatantRegistry::new();
        reg.combatants[0].pos = IVec2::new(5, 5);
        reg.combatants[0].facing = Direction::Left;
        reg.combatants[1].pos = IVec2::new(8, 5);
        let cells = target_cells(&reg, 0);
        assert_eq!(
            cells,
            (0..5).rev().map(|x| IVec2::new(x, 5)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_cast_rejected_when_empty_line() {
        let mut reg = lone_caster(IVec2::new(0, 3), Direction::Left);
        let before = reg.clone();
        let mut slot = None;
        assert!(!cast(&mut slot, &mut reg, 0, 0.0));
        assert!(slot.is_none());
        assert_eq!(reg, before);
    }

    #[test]
    fn test_cast_applies_locks() {
        let mut reg = lone_caster(IVec2::new(4, 0), Direction::Up);
        let mut slot = None;
        assert!(cast(&mut slot, &mut reg, 0, 1000.0));
        let attack = slot.as_ref().unwrap();
        assert_eq!(attack.phase, AttackPhase::Glowing);
        assert_eq!(attack.glow_cursor, 0);
        assert_eq!(attack.next_event_at, 1050.0);
        assert_eq!(reg.combatants[0].attack_locked_until, 1600.0);
        assert_eq!(reg.combatants[0].attack_cooldown_until, 3000.0);
    }

    #[test]
    fn test_only_one_attack_in_flight() {
        let mut reg = CombatantRegistry::new();
        let mut slot = None;
        assert!(cast(&mut slot, &mut reg, 0, 0.0));
        let before_slot = slot.clone();
        let before_reg = reg.clone();
        // 2P is off cooldown and has a non-empty line, but an attack is active
        assert!(!cast(&mut slot, &mut reg, 1, 0.0));
        assert_eq!(slot, before_slot);
        assert_eq!(reg, before_reg);
    }

    #[test]
    fn test_cast_rejected_on_cooldown() {
        let mut reg = lone_caster(IVec2::new(4, 0), Direction::Up);
        let mut slot = None;
        let mut grid = Grid::new();
        assert!(cast(&mut slot, &mut reg, 0, 0.0));
        run_to_completion(&mut slot, &mut grid, &mut reg, 0.0, 10.0);
        assert!(!cast(&mut slot, &mut reg, 0, 1999.0));
        assert!(cast(&mut slot, &mut reg, 0, 2000.0));
    }

    #[test]
    fn test_glow_completes_before_drop() {
        let mut grid = Grid::new();
        let mut reg = lone_caster(IVec2::new(4, 0), Direction::Up);
        let mut slot = None;
        cast(&mut slot, &mut reg, 0, 0.0);

        let steps = run_to_completion(&mut slot, &mut grid, &mut reg, 0.0, 10.0);
        let glows: Vec<_> = steps
            .iter()
            .filter(|(_, s)| matches!(s, AttackStep::Glowed { .. }))
            .collect();
        let drops: Vec<_> = steps
            .iter()
            .filter(|(_, s)| matches!(s, AttackStep::Dropped { .. }))
            .collect();

        // One glow step per target cell, all before the first drop
        assert_eq!(glows.len(), 9);
        assert_eq!(drops.len(), 9);
        let last_glow = glows.last().unwrap().0;
        assert!(drops.iter().all(|(t, _)| *t > last_glow));
        assert_eq!(last_glow, 450.0);
        assert_eq!(drops[0].0, 550.0);

        // Drops land 100ms apart, nearest first
        for (n, (t, step)) in drops.iter().enumerate() {
            assert_eq!(*t, 550.0 + 100.0 * n as f64);
            let AttackStep::Dropped { cell, .. } = step else {
                unreachable!()
            };
            assert_eq!(*cell, IVec2::new(4, 1 + n as i32));
        }
        assert!((1..10).all(|y| !grid.is_standable(IVec2::new(4, y))));
    }

    #[test]
    fn test_one_step_per_call_when_late() {
        let mut grid = Grid::new();
        let mut reg = lone_caster(IVec2::new(4, 0), Direction::Up);
        let mut slot = None;
        cast(&mut slot, &mut reg, 0, 0.0);

        // Far past every deadline: still just one glow step
        advance(&mut slot, &mut grid, &mut reg, 10_000.0);
        assert_eq!(slot.as_ref().unwrap().glow_cursor, 1);
        assert_eq!(slot.as_ref().unwrap().next_event_at, 10_050.0);
    }

    #[test]
    fn test_occupant_dies_on_drop() {
        let mut grid = Grid::new();
        let mut reg = CombatantRegistry::new();
        reg.combatants[0].pos = IVec2::new(2, 2);
        reg.combatants[0].facing = Direction::Right;
        reg.combatants[2].pos = IVec2::new(5, 2);
        let mut slot = None;
        assert!(cast(&mut slot, &mut reg, 0, 0.0));

        let steps = run_to_completion(&mut slot, &mut grid, &mut reg, 0.0, 10.0);
        assert!(!reg.combatants[2].alive);
        assert!(steps.iter().any(|(_, s)| matches!(
            s,
            AttackStep::Dropped { victim: Some(2), .. }
        )));
        assert_eq!(reg.alive_count(), 3);
    }

    #[test]
    fn test_fleeing_target_survives() {
        let mut grid = Grid::new();
        let mut reg = CombatantRegistry::new();
        reg.combatants[0].pos = IVec2::new(0, 2);
        reg.combatants[0].facing = Direction::Right;
        reg.combatants[2].pos = IVec2::new(9, 2);
        let mut slot = None;
        assert!(cast(&mut slot, &mut reg, 0, 0.0));

        // Glow ends at 450, first drop at 550; target's cell drops at 1350
        let mut now = 0.0;
        while now < 600.0 {
            now += 10.0;
            advance(&mut slot, &mut grid, &mut reg, now);
        }
        assert!(reg.try_step(&grid, 2, 0, 1, now));
        run_to_completion(&mut slot, &mut grid, &mut reg, now, 10.0);
        assert!(reg.combatants[2].alive);
        assert_eq!(reg.combatants[2].pos, IVec2::new(9, 3));
    }

    #[test]
    fn test_highlight_queries() {
        let mut grid = Grid::new();
        let mut reg = lone_caster(IVec2::new(0, 0), Direction::Right);
        let mut slot = None;
        cast(&mut slot, &mut reg, 0, 0.0);
        let attack = slot.as_ref().unwrap();
        assert!(attack.is_glowing(IVec2::new(1, 0)));
        assert!(!attack.is_glowing(IVec2::new(2, 0)));

        advance(&mut slot, &mut grid, &mut reg, 50.0);
        assert!(slot.as_ref().unwrap().is_glowing(IVec2::new(2, 0)));

        let mut now = 50.0;
        while slot.as_ref().unwrap().phase == AttackPhase::Glowing {
            now += 50.0;
            advance(&mut slot, &mut grid, &mut reg, now);
        }
        advance(&mut slot, &mut grid, &mut reg, now + 100.0);
        let attack = slot.as_ref().unwrap();
        assert!(attack.is_dropped(IVec2::new(1, 0)));
        assert!(!attack.is_dropped(IVec2::new(2, 0)));
        assert!(!attack.is_glowing(IVec2::new(1, 0)));
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Right),
            Just(Direction::Down),
            Just(Direction::Left),
        ]
    }

    proptest! {
        #[test]
        fn prop_targets_ordered_and_unique(
            positions in proptest::collection::vec((0..GRID_SIZE, 0..GRID_SIZE), 4),
            facing in direction(),
            alive in proptest::collection::vec(any::<bool>(), 4),
        ) {
            let mut reg = CombatantRegistry::new();
            for (i, (x, y)) in positions.iter().enumerate() {
                reg.combatants[i].pos = IVec2::new(*x, *y);
                reg.combatants[i].alive = alive[i] || i == 0;
            }
            reg.combatants[0].facing = facing;

            let cells = target_cells(&reg, 0);
            let origin = reg.combatants[0].pos;
            let step = facing.delta();
            for (n, cell) in cells.iter().enumerate() {
                // Exactly n+1 steps ahead of the caster
                prop_assert_eq!(*cell, origin + step * (n as i32 + 1));
                prop_assert!(in_bounds(*cell));
            }
        }
    }
}
