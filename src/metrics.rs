//! Simulation metrics
//!
//! Counters are atomics so a host can read them from another thread while
//! the simulation keeps a single writer. Rendered in Prometheus text format.

#[cfg(feature = "metrics_extended")]
use std::collections::VecDeque;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[cfg(feature = "metrics_extended")]
use parking_lot::RwLock;

/// Rolling window size for frame-time percentiles
#[cfg(feature = "metrics_extended")]
const FRAME_HISTORY: usize = 1000;

/// Metrics registry for one simulation
#[derive(Debug)]
pub struct SimMetrics {
    // Tick counters
    pub frames: AtomicU64,
    pub fixed_steps: AtomicU64,
    /// Frames whose elapsed time hit the cap
    pub capped_frames: AtomicU64,
    /// Real time thrown away by the cap (microseconds)
    pub dropped_time_us: AtomicU64,

    // Projectiles
    pub projectiles_active: AtomicU64,
    pub projectiles_spawned: AtomicU64,
    pub projectiles_expired: AtomicU64,
    pub spawns_rejected: AtomicU64,

    // Input/aim
    pub aim_misses: AtomicU64,
    pub fire_ignored: AtomicU64,
    /// Movement steps discarded for producing non-finite state
    pub discarded_steps: AtomicU64,

    // Frame timing (microseconds)
    pub frame_time_us: AtomicU64,
    pub frame_time_p95_us: AtomicU64,
    pub frame_time_p99_us: AtomicU64,
    pub frame_time_max_us: AtomicU64,

    #[cfg(feature = "metrics_extended")]
    frame_history: RwLock<VecDeque<u64>>,
}

impl Default for SimMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SimMetrics {
    pub fn new() -> Self {
        Self {
            frames: AtomicU64::new(0),
            fixed_steps: AtomicU64::new(0),
            capped_frames: AtomicU64::new(0),
            dropped_time_us: AtomicU64::new(0),
            projectiles_active: AtomicU64::new(0),
            projectiles_spawned: AtomicU64::new(0),
            projectiles_expired: AtomicU64::new(0),
            spawns_rejected: AtomicU64::new(0),
            aim_misses: AtomicU64::new(0),
            fire_ignored: AtomicU64::new(0),
            discarded_steps: AtomicU64::new(0),
            frame_time_us: AtomicU64::new(0),
            frame_time_p95_us: AtomicU64::new(0),
            frame_time_p99_us: AtomicU64::new(0),
            frame_time_max_us: AtomicU64::new(0),
            #[cfg(feature = "metrics_extended")]
            frame_history: RwLock::new(VecDeque::with_capacity(FRAME_HISTORY)),
        }
    }

    #[inline]
    pub fn incr(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// Record how long a host frame took and refresh percentiles
    pub fn record_frame_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.frame_time_us.store(us, Ordering::Relaxed);

        #[cfg(feature = "metrics_extended")]
        {
            let mut history = self.frame_history.write();
            history.push_back(us);
            while history.len() > FRAME_HISTORY {
                history.pop_front();
            }

            if history.len() >= 10 {
                let mut sorted: Vec<u64> = history.iter().copied().collect();
                sorted.sort_unstable();
                let len = sorted.len();
                let p95 = sorted[(len * 95 / 100).min(len - 1)];
                let p99 = sorted[(len * 99 / 100).min(len - 1)];
                self.frame_time_p95_us.store(p95, Ordering::Relaxed);
                self.frame_time_p99_us.store(p99, Ordering::Relaxed);
                self.frame_time_max_us
                    .store(sorted[len - 1], Ordering::Relaxed);
            }
        }
    }

    /// Number of samples currently in the frame-time window
    #[cfg(feature = "metrics_extended")]
    pub fn frame_samples(&self) -> usize {
        self.frame_history.read().len()
    }

    /// Render all metrics in Prometheus text exposition format
    pub fn to_prometheus(&self) -> String {
        let counters: [(&str, &str, &AtomicU64); 11] = [
            ("arena_frames_total", "Host frames processed", &self.frames),
            ("arena_fixed_steps_total", "Fixed movement steps executed", &self.fixed_steps),
            ("arena_capped_frames_total", "Frames clamped to the max frame interval", &self.capped_frames),
            ("arena_dropped_time_us_total", "Real time discarded by the frame cap", &self.dropped_time_us),
            ("arena_projectiles_spawned_total", "Projectiles spawned", &self.projectiles_spawned),
            ("arena_projectiles_expired_total", "Projectiles expired at max range", &self.projectiles_expired),
            ("arena_spawns_rejected_total", "Projectile spawns rejected", &self.spawns_rejected),
            ("arena_aim_misses_total", "Pointer rays that missed the ground plane", &self.aim_misses),
            ("arena_fire_ignored_total", "Fire events from non-primary buttons", &self.fire_ignored),
            ("arena_discarded_steps_total", "Movement steps discarded as non-finite", &self.discarded_steps),
            ("arena_frame_time_us", "Latest frame time", &self.frame_time_us),
        ];

        let mut out = String::new();
        for (name, help, counter) in counters {
            let kind = if name.ends_with("_total") { "counter" } else { "gauge" };
            let _ = writeln!(out, "# HELP {} {}", name, help);
            let _ = writeln!(out, "# TYPE {} {}", name, kind);
            let _ = writeln!(out, "{} {}", name, Self::get(counter));
        }

        let _ = writeln!(out, "# HELP arena_projectiles_active Projectiles currently in flight");
        let _ = writeln!(out, "# TYPE arena_projectiles_active gauge");
        let _ = writeln!(out, "arena_projectiles_active {}", Self::get(&self.projectiles_active));

        #[cfg(feature = "metrics_extended")]
        {
            let _ = writeln!(out, "# HELP arena_frame_time_quantile_us Frame time percentiles");
            let _ = writeln!(out, "# TYPE arena_frame_time_quantile_us gauge");
            for (q, v) in [
                ("0.95", &self.frame_time_p95_us),
                ("0.99", &self.frame_time_p99_us),
                ("1", &self.frame_time_max_us),
            ] {
                let _ = writeln!(out, "arena_frame_time_quantile_us{{quantile=\"{}\"}} {}", q, Self::get(v));
            }
        }

        out
    }
}
