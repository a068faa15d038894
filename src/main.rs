//! Shadow Tag headless demo
//!
//! Runs a scripted match against the built-in enemy policy at a fixed
//! timestep and prints the final render snapshot as JSON. The player
//! circles the arena; the enemy pursues or flees per its role.
//!
//! Usage: `shadow-tag [seed] [ticks]`

use glam::DVec2;

use shadow_tag::consts::{FRAMERATE, SIM_DT};
use shadow_tag::sim::{Action, GameState, TickInput, step};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let ticks: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10 * FRAMERATE as u64);

    let mut state = GameState::new(seed)?;
    log::info!("running {} ticks with seed {}", ticks, seed);

    for tick in 0..ticks {
        // scripted player: drive forward, weaving left and right
        let weave = if (tick / FRAMERATE as u64) % 2 == 0 { 1.0 } else { -1.0 };
        let input = TickInput {
            player: Some(Action {
                linear_dir: DVec2::X,
                angular_dir: weave,
                ..Default::default()
            }),
        };
        step(&mut state, &input, SIM_DT)?;
    }

    log::info!(
        "finished at tick {}: score {}, {:?} is it",
        state.time_ticks,
        state.score,
        state.agents[state.it_index].role
    );

    let snapshot = state.render_snapshot(0)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
