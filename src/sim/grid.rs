//! Floor panels and their fall/regrow lifecycle
//!
//! A panel is present, fallen, or regrowing. The timers only exist inside
//! the variants that need them, so a present panel can never carry a
//! stale drop or regrow timestamp.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::Timestamp;
use crate::consts::*;

/// Lifecycle of a single floor panel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PanelState {
    /// Solid floor, safe to stand on
    #[default]
    Present,
    /// Destroyed by an attack, waiting out the respawn delay
    Fallen { dropped_at: Timestamp },
    /// Fading back in; becomes present once the animation finishes
    Respawning {
        dropped_at: Timestamp,
        anim_start: Timestamp,
    },
}

/// A floor panel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Panel {
    pub state: PanelState,
}

impl Panel {
    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self.state, PanelState::Present)
    }

    /// When the panel was destroyed (None while present)
    pub fn dropped_at(&self) -> Option<Timestamp> {
        match self.state {
            PanelState::Present => None,
            PanelState::Fallen { dropped_at } | PanelState::Respawning { dropped_at, .. } => {
                Some(dropped_at)
            }
        }
    }

    /// When the regrow animation started (only while respawning)
    pub fn respawn_anim_start(&self) -> Option<Timestamp> {
        match self.state {
            PanelState::Respawning { anim_start, .. } => Some(anim_start),
            _ => None,
        }
    }
}

/// Check whether a cell lies on the board
#[inline]
pub fn in_bounds(pos: IVec2) -> bool {
    pos.x >= 0 && pos.x < GRID_SIZE && pos.y >= 0 && pos.y < GRID_SIZE
}

/// The 10x10 panel board, row-major with y = 0 at the bottom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    panels: Vec<Panel>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// A board with every panel present
    pub fn new() -> Self {
        Self {
            panels: vec![Panel::default(); (GRID_SIZE * GRID_SIZE) as usize],
        }
    }

    fn index(pos: IVec2) -> Option<usize> {
        in_bounds(pos).then(|| (pos.y * GRID_SIZE + pos.x) as usize)
    }

    pub fn panel(&self, pos: IVec2) -> Option<&Panel> {
        Self::index(pos).map(|i| &self.panels[i])
    }

    /// In bounds and present
    pub fn is_standable(&self, pos: IVec2) -> bool {
        self.panel(pos).is_some_and(Panel::is_present)
    }

    /// Knock out a panel. Clears any regrow in progress.
    ///
    /// Occupants are not handled here; the caller decides who falls.
    pub fn destroy(&mut self, pos: IVec2, at: Timestamp) {
        if let Some(i) = Self::index(pos) {
            self.panels[i].state = PanelState::Fallen { dropped_at: at };
        }
    }

    /// Advance every fallen panel's timers. Returns the cells that became
    /// present again this call.
    pub fn tick_respawns(&mut self, now: Timestamp) -> Vec<IVec2> {
        let mut restored = Vec::new();
        for (i, panel) in self.panels.iter_mut().enumerate() {
            match panel.state {
                PanelState::Present => {}
                PanelState::Fallen { dropped_at } => {
                    if now - dropped_at >= PANEL_RESPAWN_DELAY_MS {
                        panel.state = PanelState::Respawning {
                            dropped_at,
                            anim_start: now,
                        };
                    }
                }
                PanelState::Respawning { anim_start, .. } => {
                    if now - anim_start >= PANEL_RESPAWN_ANIM_MS {
                        panel.state = PanelState::Present;
                        let i = i as i32;
                        restored.push(IVec2::new(i % GRID_SIZE, i / GRID_SIZE));
                    }
                }
            }
        }
        restored
    }

    /// Fade-in progress of a regrowing panel (0..=1), None otherwise
    pub fn respawn_ratio(&self, pos: IVec2, now: Timestamp) -> Option<f32> {
        let anim_start = self.panel(pos)?.respawn_anim_start()?;
        Some(((now - anim_start) / PANEL_RESPAWN_ANIM_MS).clamp(0.0, 1.0) as f32)
    }

    /// Iterate all cells in row-major order
    pub fn cells() -> impl Iterator<Item = IVec2> {
        (0..GRID_SIZE).flat_map(|y| (0..GRID_SIZE).map(move |x| IVec2::new(x, y)))
    }
}
