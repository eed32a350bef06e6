//! Headless demo: loads a scene, runs it for a while and logs what happens
//!
//! Usage: `kinesis-demo [scene.ron|scene.json] [ticks]`

use kinesis::prelude::*;

const DEMO_SCENE: &str = r#"(
    name: "Courtyard",
    tiles: Some((
        width: 12,
        height: 8,
        tile_size: 32,
        layers: [
            [
                1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
                1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
                1, 1, 2, 2, 2, 1, 9, 1, 1, 1, 1, 1,
                1, 1, 2, 2, 2, 1, 9, 1, 1, 1, 1, 1,
                1, 1, 2, 2, 2, 1, 9, 1, 3, 3, 1, 1,
                1, 1, 1, 1, 1, 1, 9, 1, 3, 3, 1, 1,
                1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
                1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
            ],
        ],
    )),
    rules: [
        (first: 1, last: 1, walkable: true, terrain: Some(Grass)),
        (first: 2, last: 2, walkable: true, terrain: Some(Sand)),
        (first: 3, last: 3, walkable: false, terrain: Some(Water)),
        (first: 9, last: 9, walkable: false, terrain: Some(Wall)),
    ],
    obstacles: [(min: (192.0, 64.0), size: (32.0, 128.0))],
    spawn_points: [
        (name: "gate", position: (16.0, 16.0)),
        (name: "tower", position: (368.0, 240.0)),
    ],
    agents: [
        (
            name: "scout",
            spawn: Some("gate"),
            behaviors: [(kind: LookWhereYouGoing)],
            terrain_speed: [
                (terrain: Grass, max_velocity: 70.0),
                (terrain: Sand, max_velocity: 35.0),
            ],
            destination: Some((368.0, 112.0)),
        ),
        (
            name: "hound",
            spawn: Some("tower"),
            body: (max_velocity: 50.0),
            behaviors: [
                (kind: Pursue, target: Some("scout")),
                (kind: Face, target: Some("scout")),
                (kind: Separation, group: ["scout", "hound", "drifter"]),
            ],
        ),
        (
            name: "drifter",
            position: Some((300.0, 40.0)),
            behaviors: [(kind: Wander), (kind: ObstacleAvoidance, weight: Some(2))],
        ),
    ],
)"#;

fn load_scene(path: Option<&str>) -> Result<SceneConfig, ConfigError> {
    match path {
        Some(path) => {
            log::info!("Loading scene from {path}");
            SceneConfig::load(path)
        }
        None => SceneConfig::from_ron_str(DEMO_SCENE),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let ticks: u64 = args.get(2).and_then(|arg| arg.parse().ok()).unwrap_or(600);

    let scene = match load_scene(args.get(1).map(String::as_str)) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("Failed to load scene: {e}");
            std::process::exit(1);
        }
    };

    let config = SimulationConfig::default().with_seed(42);
    let mut sim = match Simulation::from_scene(&scene, config) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Failed to build simulation: {e}");
            std::process::exit(1);
        }
    };

    for _ in 0..ticks {
        sim.tick();

        let events: Vec<MotionEvent> = sim.events_mut().drain().collect();
        for event in events {
            let name = sim
                .world()
                .name(event.agent())
                .unwrap_or_else(|| String::from("<gone>"));
            match event {
                MotionEvent::PathCompleted { .. } => log::info!("{name} finished its path"),
                MotionEvent::PathNotFound { destination, .. } => {
                    log::warn!("{name} has no route to {destination}")
                }
                other => log::debug!("{name}: {other:?}"),
            }
        }

        if sim.tick_count() % 60 == 0 {
            for (_, (name, agent)) in sim.world().inner.query::<(&Name, &Agent)>().iter() {
                log::info!(
                    "t={:>4} {:<8} pos=({:>6.1}, {:>6.1}) speed={:>5.1}",
                    sim.tick_count(),
                    name.as_str(),
                    agent.transform.position.x,
                    agent.transform.position.y,
                    agent.body.speed(),
                );
            }
        }
    }

    log::info!("Ran {} ticks", sim.tick_count());
}
