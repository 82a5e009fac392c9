//! Town Courier entry point
//!
//! The browser build is driven from JavaScript through `WebGame`. Natively
//! this runs a headless session with a scripted courier, which is handy for
//! checking tuning files and watching the log.
//!
//! Usage: `town-courier [seed] [ticks] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::error::Error;

    use town_courier::Session;
    use town_courier::consts::DEFAULT_SEED;
    use town_courier::highscores::{OfflineService, display_name};
    use town_courier::persistence::MemoryStore;
    use town_courier::sim::GameEvent;
    use town_courier::tuning::Tuning;

    const DEFAULT_TICKS: u64 = 3_000;

    /// Hold the keys that walk straight toward the target door
    fn steer(session: &mut Session<MemoryStore>) {
        let state = session.state();
        let goal = state
            .target
            .and_then(|i| state.world.buildings.get(i))
            .map(|b| b.door.bounds.center());
        let here = state.player.bounds.center();

        let keys = [
            ("ArrowLeft", goal.is_some_and(|g| g.x < here.x - 2.0)),
            ("ArrowRight", goal.is_some_and(|g| g.x > here.x + 2.0)),
            ("ArrowUp", goal.is_some_and(|g| g.y < here.y - 2.0)),
            ("ArrowDown", goal.is_some_and(|g| g.y > here.y + 2.0)),
        ];
        let input = session.input_mut();
        for (key, held) in keys {
            if held {
                input.key_down(key);
            } else {
                input.key_up(key);
            }
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(s) => s.parse()?,
            None => DEFAULT_SEED,
        };
        let ticks = match args.next() {
            Some(s) => s.parse()?,
            None => DEFAULT_TICKS,
        };
        let tuning = match args.next() {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };

        let period = tuning.tick_ms;
        let mut session = Session::new(tuning, seed, MemoryStore::new())?;
        session.start(0.0);
        log::info!("Playing {} ticks as {}", ticks, display_name(&mut OfflineService));

        let mut now = 0.0;
        let mut deliveries = 0u64;
        let mut bites = 0u64;
        for _ in 0..ticks {
            now += session.time_until_tick(now).unwrap_or(period);
            steer(&mut session);
            for event in session.update(now)? {
                match event {
                    GameEvent::Delivered { .. } => deliveries += 1,
                    GameEvent::PlayerBitten { .. } => bites += 1,
                    GameEvent::GameOver { score } => log::info!("Game over at {}", score),
                    _ => {}
                }
            }
        }

        let report = session.flush_scores(&mut OfflineService);
        let profile = session.profile();
        log::info!(
            "Done: {} deliveries, {} bites, {} games over, high score {}, {} coins, \
             {} scores left queued (best {:?})",
            deliveries,
            bites,
            session.sessions_played(),
            profile.high_score,
            profile.coins,
            report.failed,
            profile.unsubmitted.best()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Town Courier (native, headless) starting...");
    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}
