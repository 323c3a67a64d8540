//! Cave Miner headless runner
//!
//! Plays a scripted session against the simulation core and logs the haul.
//!
//! Usage: `cave-miner [tuning.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cave_miner::Tuning;
    use cave_miner::renderer::{NoAssets, RenderFrame};
    use cave_miner::sim::{GameState, advance};

    env_logger::init();
    log::info!("Cave Miner (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0xC0FFEE);

    let frame_dt = tuning.physics.step;
    let mut state = GameState::with_tuning(seed, tuning);

    const SESSION_SECONDS: u32 = 90;
    let frames = SESSION_SECONDS * 60;
    let mut now_ms = 0.0f64;
    let mut broken = 0usize;

    for frame in 0..frames {
        let input = scripted_input(frame);
        advance(&mut state, &input, frame_dt, now_ms);
        now_ms += frame_dt as f64 * 1000.0;

        broken += state.drain_events().len();

        if frame % 600 == 0 {
            log::info!(
                "t={:>3}s scroll={:>7.1} y={:?} blocks={} broken={}",
                frame / 60,
                state.camera.offset,
                state.y_level(),
                state.grid.len(),
                broken
            );
        }
    }

    let frame = RenderFrame::extract(&state, &NoAssets);
    log::info!(
        "Session over: {} blocks broken, depth {:?}, {} blocks on screen",
        broken,
        frame.y_level,
        frame.blocks.len()
    );
    for (kind, count) in &frame.ledger {
        log::info!("  {:<9} {}", kind.as_str(), count);
    }
    match serde_json::to_string(&state.ledger) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize ledger: {e}"),
    }
}

/// A short demo script: upgrade over time and wiggle the pickaxe
#[cfg(not(target_arch = "wasm32"))]
fn scripted_input(frame: u32) -> cave_miner::sim::TickInput {
    use cave_miner::sim::{TickInput, ToolSize};

    let second = frame / 60;
    let first_frame_of_second = frame % 60 == 0;

    let mut input = TickInput::default();
    if frame == 0 {
        input.select_tier = Some(2);
    }
    if first_frame_of_second {
        match second {
            20 => input.chat = Some("!diamond".to_string()),
            40 => input.select_size = Some(ToolSize::Large),
            60 => input.chat = Some("!netherite".to_string()),
            _ => {}
        }
        if second % 7 == 3 {
            input.move_left = true;
        } else if second % 7 == 5 {
            input.move_right = true;
        }
    }
    input
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host on the web; nothing to run here
}
