//! Simulation context and per-frame tick
//!
//! `Simulation` owns every piece of mutable simulation state. The host calls
//! [`Simulation::update`] once per frame and [`Simulation::fire`] on pointer
//! presses; nothing in the core holds hidden references to scene or camera.
//!
//! Tick order:
//! 1. aim resolution (pointer → ground point → facing)
//! 2. zero or more fixed movement steps from the accumulator
//! 3. one projectile advance on the capped frame time
//! 4. transform sync to the render collaborator

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::config::{AimTiming, ConfigError, ProjectileTiming, SimConfig};
use crate::game::camera::Camera;
use crate::game::clock::TimeAccumulator;
use crate::game::constants::{agent, projectile::MUZZLE_HEIGHT};
use crate::game::error::{SimError, SimResult};
use crate::game::input::{InputState, MouseButton};
use crate::game::render::{RenderSink, Transform, Visual};
use crate::game::state::{Agent, AimState, EntityId, ProjectileId, Snapshot};
use crate::game::systems::arena::ArenaBounds;
use crate::game::systems::projectile::{ProjectileEvent, ProjectileManager};
use crate::game::systems::{aim, physics};
use crate::metrics::SimMetrics;
use crate::util::vec2::Vec2;
use crate::util::vec3::Vec3;

/// What happened during one `update`
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Fixed movement steps executed
    pub steps: u32,
    /// Capped frame interval used for frame-rate work
    pub frame_dt: f64,
    /// Aim point resolved this frame, if the pointer ray hit the ground
    pub aim_point: Option<Vec3>,
    /// Projectiles that reached their range
    pub expired: SmallVec<[ProjectileEvent; 8]>,
}

/// The explicit simulation context owned by the host
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    bounds: ArenaBounds,
    clock: TimeAccumulator,
    agent: Agent,
    aim: AimState,
    projectiles: ProjectileManager,
    metrics: Arc<SimMetrics>,
    frame: u64,
}

impl Simulation {
    /// One-time setup: validates `config`, spawns the agent at the arena
    /// centre and attaches its visual.
    pub fn initialize<R: RenderSink + ?Sized>(
        config: SimConfig,
        render: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let sim = Self {
            bounds: config.bounds(),
            clock: TimeAccumulator::with_rate(config.fixed_hz, config.max_frame),
            agent: Agent::new(Vec3::ZERO),
            aim: AimState::default(),
            projectiles: ProjectileManager::new(config.max_projectiles),
            metrics: Arc::new(SimMetrics::new()),
            frame: 0,
            config,
        };

        render.attach(
            EntityId::Agent,
            &Visual::Agent {
                radius: sim.agent.radius,
                height: agent::BODY_HEIGHT,
            },
        );
        sim.sync_agent(render);

        info!(
            "Simulation initialized: {} Hz fixed step, arena {}x{} (pad {}), projectiles on {:?}",
            sim.config.fixed_hz,
            sim.config.arena_width,
            sim.config.arena_height,
            sim.config.wall_pad,
            sim.config.projectile_timing
        );
        Ok(sim)
    }

    /// Advance the simulation by one host frame
    pub fn update<C, R>(
        &mut self,
        real_elapsed: f64,
        input: &InputState,
        camera: &C,
        render: &mut R,
    ) -> TickReport
    where
        C: Camera + ?Sized,
        R: RenderSink + ?Sized,
    {
        self.frame += 1;
        let mut report = TickReport::default();

        if self.config.aim_timing == AimTiming::BeforeMovement {
            report.aim_point = self.resolve_aim(input.pointer_ndc(), camera);
        }

        let due = self.clock.advance(real_elapsed);
        report.steps = due.steps;
        report.frame_dt = due.frame_dt;

        let intent = input.intent();
        let fixed_dt = self.clock.fixed_dt();
        for _ in 0..due.steps {
            if !physics::step(
                &mut self.agent,
                intent,
                fixed_dt,
                &self.bounds,
                &self.config.movement,
            ) {
                SimMetrics::incr(&self.metrics.discarded_steps, 1);
            }
            if self.config.projectile_timing == ProjectileTiming::FixedStep {
                report.expired.extend(self.projectiles.advance(fixed_dt, render));
            }
        }

        if self.config.aim_timing == AimTiming::AfterMovement {
            report.aim_point = self.resolve_aim(input.pointer_ndc(), camera);
        }

        if self.config.projectile_timing == ProjectileTiming::FrameTime {
            report.expired.extend(self.projectiles.advance(due.frame_dt, render));
        }

        self.sync_agent(render);
        self.projectiles.sync(render);

        let m = &self.metrics;
        SimMetrics::incr(&m.frames, 1);
        SimMetrics::incr(&m.fixed_steps, due.steps as u64);
        if due.dropped > 0.0 {
            SimMetrics::incr(&m.capped_frames, 1);
            SimMetrics::incr(&m.dropped_time_us, (due.dropped * 1e6) as u64);
        }
        SimMetrics::incr(&m.projectiles_expired, report.expired.len() as u64);
        m.projectiles_active
            .store(self.projectiles.len() as u64, std::sync::atomic::Ordering::Relaxed);

        report
    }

    /// Handle a pointer press.
    ///
    /// Only the primary button fires. The pointer ray is resolved afresh (the
    /// last `update` may be a frame old) and the projectile leaves from the
    /// agent's position raised to muzzle height. Misses and rejected spawns
    /// are dropped quietly.
    pub fn fire<C, R>(
        &mut self,
        button: MouseButton,
        pointer_ndc: Vec2,
        camera: &C,
        render: &mut R,
    ) -> Option<ProjectileEvent>
    where
        C: Camera + ?Sized,
        R: RenderSink + ?Sized,
    {
        if button != MouseButton::Primary {
            SimMetrics::incr(&self.metrics.fire_ignored, 1);
            return None;
        }

        let target = match aim::ground_point(camera, pointer_ndc) {
            Ok(point) => point,
            Err(e) => {
                SimMetrics::incr(&self.metrics.aim_misses, 1);
                debug!("Fire dropped: {}", e);
                return None;
            }
        };
        self.aim.point = Some(target);

        let muzzle = Vec3::new(self.agent.position.x, MUZZLE_HEIGHT, self.agent.position.z);
        match self.spawn_projectile(muzzle, target, render) {
            Ok(id) => self.projectiles.get(id).map(|p| ProjectileEvent::Spawned {
                id,
                origin: p.origin,
                direction: p.direction,
            }),
            Err(e) => {
                debug!("Fire dropped: {}", e);
                None
            }
        }
    }

    /// Spawn a projectile with the configured speed and range
    pub fn spawn_projectile<R: RenderSink + ?Sized>(
        &mut self,
        origin: Vec3,
        target: Vec3,
        render: &mut R,
    ) -> SimResult<ProjectileId> {
        let result = self.projectiles.spawn(
            origin,
            target,
            self.config.projectile_speed,
            self.config.projectile_range,
            render,
        );
        match &result {
            Ok(_) => SimMetrics::incr(&self.metrics.projectiles_spawned, 1),
            Err(_) => SimMetrics::incr(&self.metrics.spawns_rejected, 1),
        }
        result
    }

    /// Detach every visual; the simulation can be dropped afterwards
    pub fn shutdown<R: RenderSink + ?Sized>(&mut self, render: &mut R) {
        self.projectiles.clear(render);
        render.detach(EntityId::Agent);
        info!("Simulation stopped after {} frames", self.frame);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            frame: self.frame,
            agent: self.agent.clone(),
            aim_point: self.aim.point,
            projectiles: self.projectiles.snapshot(),
        }
    }

    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    #[inline]
    pub fn aim_point(&self) -> Option<Vec3> {
        self.aim.point
    }

    #[inline]
    pub fn projectiles(&self) -> &ProjectileManager {
        &self.projectiles
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn bounds(&self) -> &ArenaBounds {
        &self.bounds
    }

    #[inline]
    pub fn clock(&self) -> &TimeAccumulator {
        &self.clock
    }

    /// Shared handle for reading metrics from elsewhere
    pub fn metrics(&self) -> Arc<SimMetrics> {
        Arc::clone(&self.metrics)
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn resolve_aim<C: Camera + ?Sized>(&mut self, pointer_ndc: Vec2, camera: &C) -> Option<Vec3> {
        match aim::resolve(&mut self.aim, &mut self.agent, pointer_ndc, camera) {
            Ok(point) => Some(point),
            Err(SimError::DegenerateAimRay) => {
                SimMetrics::incr(&self.metrics.aim_misses, 1);
                None
            }
            Err(e) => {
                debug!("Aim resolution failed: {}", e);
                None
            }
        }
    }

    fn sync_agent<R: RenderSink + ?Sized>(&self, render: &mut R) {
        render.sync(
            EntityId::Agent,
            Transform {
                position: self.agent.position,
                forward: self.agent.forward(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::camera::PerspectiveCamera;
    use crate::game::constants::timing::{FIXED_DT, MAX_FRAME};
    use crate::game::input::Direction;
    use crate::game::render::RecordingRenderer;
    use crate::util::ray::Ray;
    use std::f64::consts::FRAC_PI_2;

    /// Camera that always looks straight down onto a ground point
    struct TopDown(Vec3);

    impl Camera for TopDown {
        fn ray_from_ndc(&self, _ndc: Vec2) -> Ray {
            Ray::new(self.0 + Vec3::new(0.0, 20.0, 0.0), Vec3::new(0.0, -1.0, 0.0))
        }
    }

    struct Horizon;

    impl Camera for Horizon {
        fn ray_from_ndc(&self, _ndc: Vec2) -> Ray {
            Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 0.0))
        }
    }

    fn setup() -> (Simulation, RecordingRenderer) {
        let mut render = RecordingRenderer::new();
        let sim = Simulation::initialize(SimConfig::default(), &mut render).unwrap();
        (sim, render)
    }

    #[test]
    fn test_initialize_attaches_agent() {
        let (sim, render) = setup();
        assert!(render.contains(EntityId::Agent));
        assert_eq!(render.transform(EntityId::Agent).unwrap().position, Vec3::ZERO);
        assert_eq!(sim.agent().position, Vec3::ZERO);
        assert!(sim.projectiles().is_empty());
    }

    #[test]
    fn test_initialize_rejects_invalid_config() {
        let mut render = RecordingRenderer::new();
        let config = SimConfig {
            fixed_hz: 0,
            ..SimConfig::default()
        };
        assert!(Simulation::initialize(config, &mut render).is_err());
        assert!(render.is_empty());
    }

    #[test]
    fn test_update_runs_due_steps() {
        let (mut sim, mut render) = setup();
        let input = InputState::new();

        let report = sim.update(1.0 / 60.0, &input, &PerspectiveCamera::default(), &mut render);
        assert_eq!(report.steps, 2);

        let report = sim.update(10.0, &input, &PerspectiveCamera::default(), &mut render);
        assert_eq!(report.frame_dt, MAX_FRAME);
        assert_eq!(report.steps, 8);

        let metrics = sim.metrics();
        assert_eq!(SimMetrics::get(&metrics.frames), 2);
        assert_eq!(SimMetrics::get(&metrics.fixed_steps), 10);
        assert_eq!(SimMetrics::get(&metrics.capped_frames), 1);
    }

    #[test]
    fn test_update_moves_agent_and_syncs() {
        let (mut sim, mut render) = setup();
        let mut input = InputState::new();
        input.press(Direction::Right);

        for _ in 0..30 {
            sim.update(1.0 / 60.0, &input, &PerspectiveCamera::default(), &mut render);
        }

        assert!(sim.agent().position.x > 0.0);
        assert_eq!(sim.agent().position.z, 0.0);
        let transform = render.transform(EntityId::Agent).unwrap();
        assert_eq!(transform.position, sim.agent().position);
    }

    #[test]
    fn test_update_sets_facing_from_pointer() {
        let (mut sim, mut render) = setup();
        let input = InputState::new();

        let report = sim.update(
            1.0 / 60.0,
            &input,
            &TopDown(Vec3::new(10.0, 0.0, 0.0)),
            &mut render,
        );

        assert!(report.aim_point.is_some());
        assert!((sim.agent().facing - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_aim_miss_keeps_facing() {
        let (mut sim, mut render) = setup();
        let input = InputState::new();
        sim.update(FIXED_DT, &input, &TopDown(Vec3::new(10.0, 0.0, 0.0)), &mut render);

        let report = sim.update(FIXED_DT, &input, &Horizon, &mut render);

        assert!(report.aim_point.is_none());
        assert!((sim.agent().facing - FRAC_PI_2).abs() < 1e-12);
        assert!(sim.aim_point().is_some());
        assert_eq!(SimMetrics::get(&sim.metrics().aim_misses), 1);
    }

    #[test]
    fn test_fire_spawns_from_muzzle() {
        let (mut sim, mut render) = setup();
        let camera = TopDown(Vec3::new(5.0, 0.0, 0.0));

        let event = sim.fire(MouseButton::Primary, Vec2::ZERO, &camera, &mut render);

        let Some(ProjectileEvent::Spawned { id, origin, direction }) = event.clone() else {
            panic!("expected a spawn, got {:?}", event);
        };
        assert_eq!(origin, Vec3::new(0.0, MUZZLE_HEIGHT, 0.0));
        assert!((direction.length() - 1.0).abs() < 1e-12);
        assert!(direction.x > 0.0);
        assert!(render.contains(EntityId::Projectile(id)));
        assert_eq!(sim.projectiles().len(), 1);
        assert_eq!(sim.aim_point(), Some(Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_fire_ignores_other_buttons() {
        let (mut sim, mut render) = setup();
        let camera = TopDown(Vec3::new(5.0, 0.0, 0.0));

        assert!(sim
            .fire(MouseButton::Secondary, Vec2::ZERO, &camera, &mut render)
            .is_none());
        assert!(sim
            .fire(MouseButton::Middle, Vec2::ZERO, &camera, &mut render)
            .is_none());
        assert!(sim.projectiles().is_empty());
        assert_eq!(SimMetrics::get(&sim.metrics().fire_ignored), 2);
    }

    #[test]
    fn test_fire_on_miss_is_dropped() {
        let (mut sim, mut render) = setup();
        assert!(sim
            .fire(MouseButton::Primary, Vec2::ZERO, &Horizon, &mut render)
            .is_none());
        assert!(sim.projectiles().is_empty());
    }

    #[test]
    fn test_degenerate_spawn_is_quiet() {
        let (mut sim, mut render) = setup();
        let p = Vec3::new(1.0, 1.0, 1.0);

        assert_eq!(
            sim.spawn_projectile(p, p, &mut render),
            Err(SimError::DegenerateDirection)
        );
        assert!(sim.projectiles().is_empty());
        assert_eq!(SimMetrics::get(&sim.metrics().spawns_rejected), 1);
    }

    #[test]
    fn test_projectiles_expire_through_update() {
        let (mut sim, mut render) = setup();
        let input = InputState::new();
        let camera = PerspectiveCamera::default();
        let id = sim
            .spawn_projectile(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), &mut render)
            .unwrap();

        for _ in 0..119 {
            sim.update(1.0 / 60.0, &input, &camera, &mut render);
        }
        assert!(sim.projectiles().contains(id));

        let report = sim.update(1.0 / 60.0, &input, &camera, &mut render);
        assert_eq!(report.expired.len(), 1);
        assert!(!sim.projectiles().contains(id));
        assert!(!render.contains(EntityId::Projectile(id)));
        assert_eq!(SimMetrics::get(&sim.metrics().projectiles_expired), 1);
    }

    #[test]
    fn test_fixed_step_projectile_timing() {
        let mut render = RecordingRenderer::new();
        let config = SimConfig {
            projectile_timing: ProjectileTiming::FixedStep,
            ..SimConfig::default()
        };
        let mut sim = Simulation::initialize(config, &mut render).unwrap();
        let id = sim
            .spawn_projectile(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), &mut render)
            .unwrap();

        // Half a step of time: no fixed step due, so no projectile movement
        sim.update(FIXED_DT * 0.5, &InputState::new(), &Horizon, &mut render);
        assert_eq!(sim.projectiles().get(id).unwrap().distance_travelled, 0.0);

        sim.update(FIXED_DT * 0.5, &InputState::new(), &Horizon, &mut render);
        let travelled = sim.projectiles().get(id).unwrap().distance_travelled;
        assert!((travelled - 40.0 * FIXED_DT).abs() < 1e-9);
    }

    #[test]
    fn test_initialize_rejects_nan_arena() {
        let mut render = RecordingRenderer::new();
        let config = SimConfig {
            arena_width: f64::NAN,
            ..SimConfig::default()
        };
        assert!(matches!(
            Simulation::initialize(config, &mut render),
            Err(ConfigError::NotPositive { field: "arena_width", .. })
        ));
        assert!(render.is_empty());
    }

    #[test]
    fn test_aim_uses_previous_tick_position() {
        let (mut sim, mut render) = setup();
        let mut input = InputState::new();
        input.press(Direction::Right);
        let camera = TopDown(Vec3::ZERO);

        // Aim point sits on the pre-move position, too close to turn toward
        sim.update(1.0 / 30.0, &input, &camera, &mut render);
        assert!(sim.agent().position.x > 0.0);
        assert_eq!(sim.agent().facing, 0.0);

        // Next tick sees the position the agent ended on, behind the aim (-x)
        sim.update(1.0 / 30.0, &input, &camera, &mut render);
        assert!((sim.agent().facing + FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_aim_after_movement_uses_fresh_position() {
        let mut render = RecordingRenderer::new();
        let config = SimConfig {
            aim_timing: AimTiming::AfterMovement,
            ..SimConfig::default()
        };
        let mut sim = Simulation::initialize(config, &mut render).unwrap();
        let mut input = InputState::new();
        input.press(Direction::Right);

        // Aim straight at where the agent started; once it has moved right,
        // the fresh position puts the aim point behind it (-x)
        sim.update(1.0 / 30.0, &input, &TopDown(Vec3::ZERO), &mut render);

        assert!(sim.agent().position.x > 0.0);
        assert!((sim.agent().facing + FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_shutdown_detaches_everything() {
        let (mut sim, mut render) = setup();
        sim.spawn_projectile(Vec3::ZERO, Vec3::FORWARD, &mut render)
            .unwrap();

        sim.shutdown(&mut render);

        assert!(render.is_empty());
        assert!(sim.projectiles().is_empty());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let (mut sim, mut render) = setup();
        sim.spawn_projectile(Vec3::ZERO, Vec3::FORWARD, &mut render)
            .unwrap();
        sim.update(1.0 / 60.0, &InputState::new(), &Horizon, &mut render);

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.frame, 1);
        assert_eq!(snapshot.projectiles.len(), 1);
        assert_eq!(snapshot.agent.position, sim.agent().position);
    }
}
