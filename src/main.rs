use std::time::{Duration, Instant};

use anyhow::Context;
use rand::Rng;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use arena_sim::config::{DemoConfig, SimConfig};
use arena_sim::game::camera::PerspectiveCamera;
use arena_sim::game::constants::projectile::MUZZLE_HEIGHT;
use arena_sim::game::game_loop::Simulation;
use arena_sim::game::input::{Direction, InputState, MouseButton};
use arena_sim::game::render::RecordingRenderer;
use arena_sim::metrics::SimMetrics;
use arena_sim::util::vec2::Vec2;
use arena_sim::util::vec3::Vec3;

/// Scripted movement: each entry is held for `MOVE_PHASE_SECS`
const MOVE_SCRIPT: [&[Direction]; 6] = [
    &[Direction::Right],
    &[Direction::Forward],
    &[Direction::Left, Direction::Forward],
    &[],
    &[Direction::Back],
    &[Direction::Right, Direction::Back],
];
const MOVE_PHASE_SECS: f64 = 1.5;

/// Headless host: drives the simulation with scripted input
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Arena Sim v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = SimConfig::load_or_default();
    let demo = DemoConfig::load_or_default();
    info!(
        "Configuration loaded: host {} Hz, duration {:?}, fire every {}s",
        demo.frame_hz, demo.duration_secs, demo.fire_interval_secs
    );

    let mut render = RecordingRenderer::new();
    let camera = PerspectiveCamera::default();
    let mut sim =
        Simulation::initialize(config, &mut render).context("invalid simulation config")?;
    let metrics = sim.metrics();

    // Opening shot across the arena so the first frames have something in flight
    if let Err(e) = sim.spawn_projectile(
        Vec3::new(0.0, MUZZLE_HEIGHT, 0.0),
        Vec3::new(10.0, MUZZLE_HEIGHT, 10.0),
        &mut render,
    ) {
        debug!("Opening shot dropped: {}", e);
    }

    let frame_loop = async {
        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / demo.frame_hz as f64));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut rng = rand::thread_rng();
        let mut input = InputState::new();
        let started = Instant::now();
        let mut last = started;
        let mut next_fire = demo.fire_interval_secs;
        let mut next_report = 1.0;

        loop {
            interval.tick().await;
            let now = Instant::now();
            let elapsed = now.duration_since(last).as_secs_f64();
            last = now;
            let t = now.duration_since(started).as_secs_f64();

            if demo.duration_secs.is_some_and(|limit| t >= limit) {
                break;
            }

            // Scripted input for this frame
            let phase = (t / MOVE_PHASE_SECS) as usize % MOVE_SCRIPT.len();
            input.clear();
            for &direction in MOVE_SCRIPT[phase] {
                input.press(direction);
            }
            let sweep = t * 0.7;
            input.set_pointer_ndc(Vec2::new(
                sweep.sin() * 0.8 + rng.gen_range(-0.02..0.02),
                sweep.cos() * 0.3 - 0.4 + rng.gen_range(-0.02..0.02),
            ));

            let frame_start = Instant::now();
            if t >= next_fire {
                next_fire += demo.fire_interval_secs;
                if let Some(event) =
                    sim.fire(MouseButton::Primary, input.pointer_ndc(), &camera, &mut render)
                {
                    debug!("{:?}", event);
                }
            }
            let report = sim.update(elapsed, &input, &camera, &mut render);
            metrics.record_frame_time(frame_start.elapsed());

            for event in &report.expired {
                debug!("{:?}", event);
            }

            if t >= next_report {
                next_report += 1.0;
                let agent = sim.agent();
                info!(
                    "t={:.1}s pos=({:.2}, {:.2}) speed={:.2} facing={:.2} projectiles={} visuals={}",
                    t,
                    agent.position.x,
                    agent.position.z,
                    agent.speed(),
                    agent.facing,
                    sim.projectiles().len(),
                    render.len()
                );
            }
        }
    };

    tokio::select! {
        _ = frame_loop => {
            info!("Demo finished");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                anyhow::bail!("failed to listen for Ctrl+C: {}", e);
            }
            info!("Shutdown signal received");
        }
    }

    // Cleanup
    sim.shutdown(&mut render);
    info!(
        "Ran {} frames, {} fixed steps, {} projectiles fired",
        SimMetrics::get(&metrics.frames),
        SimMetrics::get(&metrics.fixed_steps),
        SimMetrics::get(&metrics.projectiles_spawned)
    );
    print!("{}", metrics.to_prometheus());

    Ok(())
}
