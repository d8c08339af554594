//! Tank Arena headless entry point
//!
//! Runs one autopilot session against the simulation core and reports the
//! result. Usage: `tank-arena [TUNING.json] [SEED]`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::Duration;

    use tank_arena::Tuning;
    use tank_arena::sim::{Clock, FrameTimer, GamePhase, GameState, ManualClock, TickInput, tick};

    /// Frame length fed to the manual clock
    const FRAME: Duration = Duration::from_micros(15_625);
    /// Ten minutes of play at 64 frames per second
    const MAX_FRAMES: u32 = 64 * 600;

    fn parse_args() -> (Tuning, u64) {
        let mut tuning = Tuning::default();
        let mut seed = 0x7a6b_5c4d;

        for arg in std::env::args().skip(1) {
            if let Ok(value) = arg.parse::<u64>() {
                seed = value;
                continue;
            }
            match Tuning::load(&arg) {
                Ok(loaded) => tuning = loaded,
                Err(e) => log::warn!("Failed to load tuning from {arg}: {e}, using defaults"),
            }
        }
        (tuning, seed)
    }

    pub fn run() -> Result<(), String> {
        let (tuning, seed) = parse_args();
        let mut state = GameState::with_tuning(seed, tuning);
        let clock = ManualClock::new();
        let mut timer = FrameTimer::new();
        timer.next_dt(&clock);

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, 0.0);

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut frames = 0;
        while state.phase == GamePhase::Playing && frames < MAX_FRAMES {
            clock.advance(FRAME);
            let dt = timer.next_dt(&clock);
            tick(&mut state, &input, dt);
            frames += 1;
        }

        log::info!(
            "Finished after {frames} frames ({:.1}s simulated, clock at {:?})",
            state.time,
            clock.now()
        );
        let summary = serde_json::json!({
            "seed": seed,
            "survived": state.time,
            "phase": state.phase,
            "stats": state.stats,
            "hud": state.hud(),
            "high_scores": state.high_scores,
        });
        let text = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{text}");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tank Arena (headless) starting...");

    if let Err(err) = headless::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser shell drives the library directly
}
