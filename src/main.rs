//! Drop Zone entry point
//!
//! The browser build is a library (see `platform`); natively this runs
//! headless demo matches and logs how they ended.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use drop_zone::Settings;

    env_logger::init();
    log::info!("Drop Zone (native, headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_or_default(Path::new(&path)),
        None => Settings::default(),
    };
    let seed = settings.seed.unwrap_or_else(rand::random);
    log::info!("Seed: {}", seed);

    let mut tally = headless::Tally::default();
    for round in 0..settings.rounds {
        let result = headless::play_match(seed.wrapping_add(round as u64), &settings);
        println!("Round {}: {}", round + 1, headless::describe(&result));
        tally.record(&result);
    }
    println!(
        "Victories: {}  Defeats: {}  Draws: {}  Unfinished: {}",
        tally.victories, tally.defeats, tally.draws, tally.unfinished
    );
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use drop_zone::sim::{Match, MatchPhase, Outcome, TickInput, Winner, start_new_game, tick};
    use drop_zone::Settings;

    /// How a headless match ended
    pub struct MatchResult {
        pub winner: Option<Winner>,
        pub duration_ms: f64,
    }

    #[derive(Default)]
    pub struct Tally {
        pub victories: u32,
        pub defeats: u32,
        pub draws: u32,
        pub unfinished: u32,
    }

    impl Tally {
        pub fn record(&mut self, result: &MatchResult) {
            match result.winner.map(Winner::outcome) {
                Some(Outcome::Victory) => self.victories += 1,
                Some(Outcome::Defeat) => self.defeats += 1,
                Some(Outcome::Draw) => self.draws += 1,
                None => self.unfinished += 1,
            }
        }
    }

    pub fn play_match(seed: u64, settings: &Settings) -> MatchResult {
        let mut state = Match::new(seed);
        start_new_game(&mut state);
        let input = TickInput {
            autopilot: settings.autopilot,
            ..Default::default()
        };

        let mut battle_start = None;
        while state.phase != MatchPhase::Result && state.now() < settings.max_match_ms {
            tick(&mut state, &input, settings.frame_ms);
            if battle_start.is_none() && state.phase == MatchPhase::Battle {
                battle_start = Some(state.now());
            }
            for event in state.drain_events() {
                log::trace!("{:?}", event);
            }
        }

        MatchResult {
            winner: state.winner,
            duration_ms: state.now() - battle_start.unwrap_or(state.now()),
        }
    }

    pub fn describe(result: &MatchResult) -> String {
        let secs = result.duration_ms / 1000.0;
        match result.winner {
            Some(Winner::Combatant(0)) => format!("PLAYER WINS! ({:.1}s)", secs),
            Some(Winner::Combatant(i)) => format!("DEFEAT - {}P wins ({:.1}s)", i + 1, secs),
            Some(Winner::Draw) => format!("DRAW ({:.1}s)", secs),
            None => format!("no winner after {:.1}s", secs),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::init, this is just to satisfy the compiler
}
