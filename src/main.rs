//! Nova Strike entry point
//!
//! Runs a headless single-player session with a simple autopilot until the
//! ship is destroyed (credits are banked) or the tick limit is reached.
//!
//! Usage: `nova-strike [config.json] [--realtime]`

use std::time::Instant;

use glam::Vec2;

use nova_strike::game::{FrameInput, Game, Mode};
use nova_strike::net::TcpNetwork;
use nova_strike::persistence::JsonFileStore;
use nova_strike::sim::{InputSnapshot, Key, World};
use nova_strike::Config;

const DEFAULT_CONFIG_PATH: &str = "nova-strike.json";

/// Aim at the closest threat and keep the ship centered under it
fn autopilot(world: &World) -> InputSnapshot {
    let Some(ship) = world.players.first() else {
        return InputSnapshot::default();
    };

    let target = world
        .enemies
        .iter()
        .map(|e| e.pos)
        .chain(world.boss.as_ref().map(|b| b.pos))
        .min_by(|a, b| a.distance(ship.pos).total_cmp(&b.distance(ship.pos)));

    let mut snapshot = InputSnapshot {
        pointer: target.or(Some(ship.pos + Vec2::new(0.0, -100.0))),
        pointer_down: true,
        ..Default::default()
    };
    if let Some(target) = target {
        if target.x < ship.pos.x - 10.0 {
            snapshot.pressed.insert(Key::A);
        } else if target.x > ship.pos.x + 10.0 {
            snapshot.pressed.insert(Key::D);
        }
    }
    snapshot
}

fn main() {
    env_logger::init();

    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut realtime = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--realtime" => realtime = true,
            _ => config_path = arg,
        }
    }

    let config = Config::load(&config_path);
    let tick = config.tick_duration();
    let max_ticks = config.max_ticks;
    log::info!("Nova Strike (headless) starting, {} ticks max", max_ticks);

    let store = JsonFileStore::new(&config.save_path);
    let mut game = Game::new(config, Box::new(store), Box::new(TcpNetwork::new()));
    game.start_session(1, None);

    let mut ticks = 0u64;
    while game.mode() == Mode::Playing && ticks < max_ticks {
        let started = Instant::now();
        let snapshot = game.world().map(autopilot).unwrap_or_default();
        game.update(&FrameInput {
            snapshot,
            events: Vec::new(),
        });
        ticks += 1;

        if realtime {
            if let Some(rest) = tick.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    let hud = game.hud();
    log::info!(
        "Session ended after {ticks} ticks: wave {}, score {}, credits {}",
        hud.wave.unwrap_or(0),
        hud.total_score,
        game.credits()
    );
    println!(
        "wave {} | score {} | credits {}",
        hud.wave.unwrap_or(0),
        hud.total_score,
        game.credits()
    );
}
