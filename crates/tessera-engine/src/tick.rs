//! Fixed-timestep tick loop driving late-update hooks.
//!
//! The scene runtime owns the frame. Once per frame the host calls
//! [`TickLoop::tick`], which runs every registered [`LateUpdate`] hook in
//! registration order with the fixed time step. Presenters are hooks: their
//! late update reaps queued destructions.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use tessera_engine::prelude::*;
//!
//! let scene = Arc::new(Mutex::new(MemoryScene::new()));
//! let presenter = Arc::new(Mutex::new(Presenter::new(scene)));
//!
//! let mut tick_loop = TickLoop::new(TickConfig { fixed_dt: 1.0 / 30.0 });
//! tick_loop.add_hook("presenter", presenter.clone());
//!
//! tick_loop.run_ticks(10);
//! assert_eq!(tick_loop.tick_count(), 10);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

// ---------------------------------------------------------------------------
// LateUpdate
// ---------------------------------------------------------------------------

/// Work that runs once per frame after the scene's regular update.
pub trait LateUpdate: Send {
    /// Called once per tick with the fixed time step in seconds.
    fn late_update(&mut self, dt: f64);
}

impl<F> LateUpdate for F
where
    F: FnMut(f64) + Send,
{
    fn late_update(&mut self, dt: f64) {
        self(dt)
    }
}

/// A hook shared between the tick loop and its owner.
pub type SharedHook = Arc<Mutex<dyn LateUpdate>>;

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the fixed-timestep tick loop.
///
/// A `fixed_dt` of `1.0 / 60.0` gives 60 ticks per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Fixed time step in seconds per tick. Must be positive and finite.
    pub fixed_dt: f64,
}

impl Default for TickConfig {
    /// Defaults to 60 Hz.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per hook, in execution order.
    pub hook_times: Vec<(String, Duration)>,
    /// Total time for the tick.
    pub total_time: Duration,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

struct RegisteredHook {
    name: String,
    hook: SharedHook,
}

/// Runs late-update hooks once per tick, in registration order.
pub struct TickLoop {
    hooks: Vec<RegisteredHook>,
    tick_counter: u64,
    fixed_dt: f64,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// Create a tick loop with no hooks.
    ///
    /// # Panics
    ///
    /// Panics if `config.fixed_dt` is not positive and finite.
    pub fn new(config: TickConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        Self {
            hooks: Vec::new(),
            tick_counter: 0,
            fixed_dt: config.fixed_dt,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// Register a hook to run every tick, after those already registered.
    ///
    /// # Panics
    ///
    /// Panics if a hook with the same name is already registered.
    pub fn add_hook<H: LateUpdate + 'static>(&mut self, name: &str, hook: Arc<Mutex<H>>) {
        self.add_shared_hook(name, hook);
    }

    /// Register an already type-erased hook.
    ///
    /// # Panics
    ///
    /// Panics if a hook with the same name is already registered.
    pub fn add_shared_hook(&mut self, name: &str, hook: SharedHook) {
        assert!(
            !self.hooks.iter().any(|h| h.name == name),
            "duplicate hook name: {name:?}"
        );
        self.hooks.push(RegisteredHook {
            name: name.to_owned(),
            hook,
        });
    }

    /// Register a closure as a hook.
    pub fn add_fn(&mut self, name: &str, f: impl FnMut(f64) + Send + 'static) {
        self.add_hook(name, Arc::new(Mutex::new(f)));
    }

    /// Unregister a hook. Returns whether it was registered.
    pub fn remove_hook(&mut self, name: &str) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|h| h.name != name);
        self.hooks.len() != before
    }

    /// Run one tick: every hook, in order.
    pub fn tick(&mut self) {
        let tick_start = Instant::now();
        let mut hook_times = Vec::with_capacity(self.hooks.len());

        for registered in &self.hooks {
            let hook_start = Instant::now();
            registered.hook.lock().late_update(self.fixed_dt);
            hook_times.push((registered.name.clone(), hook_start.elapsed()));
        }

        self.tick_counter += 1;
        self.last_diagnostics = TickDiagnostics {
            hook_times,
            total_time: tick_start.elapsed(),
        };
        trace!(tick = self.tick_counter, "tick complete");
    }

    /// Run `count` ticks in sequence.
    pub fn run_ticks(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }

    // -- accessors ----------------------------------------------------------

    /// The number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time in seconds, computed as `tick_count * fixed_dt`.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.fixed_dt
    }

    /// The fixed time step in seconds per tick.
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// The number of registered hooks.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Hook names in execution order.
    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name.as_str()).collect()
    }

    /// Diagnostics from the last tick.
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

impl std::fmt::Debug for TickLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickLoop")
            .field("hooks", &self.hook_names())
            .field("tick_counter", &self.tick_counter)
            .field("fixed_dt", &self.fixed_dt)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
