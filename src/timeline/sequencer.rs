use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
    time::Duration,
};

use crate::{
    foundation::core::StepIndex,
    foundation::error::{FlowlinesError, FlowlinesResult},
    host::{Callback, DiagramHost, Subscription, listeners::ListenerSet},
};

/// Reveal-loop configuration.
///
/// `total_steps` is configured explicitly. It must exceed every step index in use and may be
/// larger to leave idle or highlight-only steps at the end of the loop.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineConfig {
    /// Number of steps in one loop.
    pub total_steps: u32,
    /// Seconds between ticks.
    #[serde(default = "default_step_interval_secs")]
    pub step_interval_secs: f64,
}

/// Default tick period.
pub const DEFAULT_STEP_INTERVAL_SECS: f64 = 1.5;

fn default_step_interval_secs() -> f64 {
    DEFAULT_STEP_INTERVAL_SECS
}

impl TimelineConfig {
    /// Config with the default tick period.
    pub fn new(total_steps: u32) -> Self {
        Self {
            total_steps,
            step_interval_secs: DEFAULT_STEP_INTERVAL_SECS,
        }
    }

    /// Validate step count and tick period.
    pub fn validate(&self) -> FlowlinesResult<()> {
        if self.total_steps == 0 {
            return Err(FlowlinesError::validation("timeline total_steps must be > 0"));
        }
        self.step_interval().map(|_| ())
    }

    /// Tick period as a duration.
    ///
    /// Fails unless the period is finite, positive, and representable as a [`Duration`].
    pub fn step_interval(&self) -> FlowlinesResult<Duration> {
        match Duration::try_from_secs_f64(self.step_interval_secs) {
            Ok(period) if !period.is_zero() => Ok(period),
            _ => Err(FlowlinesError::validation(format!(
                "timeline step_interval_secs must be finite, > 0, and fit a duration, got {}",
                self.step_interval_secs
            ))),
        }
    }
}

/// Observable state of the reveal clock.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ClockState {
    /// Current step, always `< total_steps`.
    pub active_step: StepIndex,
    /// Completed loops.
    pub loop_count: u64,
}

impl ClockState {
    /// State after one tick.
    pub fn next(self, total_steps: u32) -> Self {
        if self.active_step + 1 >= total_steps {
            Self {
                active_step: 0,
                loop_count: self.loop_count + 1,
            }
        } else {
            Self {
                active_step: self.active_step + 1,
                loop_count: self.loop_count,
            }
        }
    }

    /// State after `ticks` ticks.
    pub fn after_ticks(self, ticks: u64, total_steps: u32) -> Self {
        let total = u64::from(total_steps.max(1));
        let offset = u64::from(self.active_step) + ticks % total;
        let wraps = ticks / total + offset / total;
        Self {
            active_step: (offset % total) as StepIndex,
            loop_count: self.loop_count.saturating_add(wraps),
        }
    }

    /// Whether an entity revealed at `step_index` is active.
    ///
    /// Reveals accumulate within a loop and reset on wraparound.
    pub fn is_active(self, step_index: StepIndex) -> bool {
        self.active_step >= step_index
    }
}

/// Fixed-period step clock.
///
/// Ticks come from a host interval timer once [`StepSequencer::start`] is called, or from explicit
/// [`StepSequencer::tick`] calls. Nothing else pauses or drives it. Cloning yields another handle
/// to the same clock.
#[derive(Clone)]
pub struct StepSequencer {
    inner: Rc<SequencerInner>,
}

struct SequencerInner {
    config: TimelineConfig,
    period: Duration,
    state: Cell<ClockState>,
    on_tick: ListenerSet,
    timer: RefCell<Option<Subscription>>,
}

impl StepSequencer {
    /// Clock at `{0, 0}`.
    pub fn new(config: TimelineConfig) -> FlowlinesResult<Self> {
        config.validate()?;
        let period = config.step_interval()?;
        Ok(Self {
            inner: Rc::new(SequencerInner {
                config,
                period,
                state: Cell::new(ClockState::default()),
                on_tick: ListenerSet::new(),
                timer: RefCell::new(None),
            }),
        })
    }

    /// Configuration.
    pub fn config(&self) -> TimelineConfig {
        self.inner.config
    }

    /// Current state.
    pub fn state(&self) -> ClockState {
        self.inner.state.get()
    }

    /// Whether an entity revealed at `step_index` is currently active.
    pub fn is_active(&self, step_index: StepIndex) -> bool {
        self.state().is_active(step_index)
    }

    /// Advance by one step, wrapping to 0 and counting the loop after the last step.
    pub fn tick(&self) -> ClockState {
        let next = self.state().next(self.inner.config.total_steps);
        self.inner.state.set(next);
        if next.active_step == 0 {
            tracing::debug!(loop_count = next.loop_count, "reveal loop wrapped");
        } else {
            tracing::trace!(active_step = next.active_step, "step");
        }
        self.inner.on_tick.notify();
        next
    }

    /// Start ticking on a host interval. Starting an already running clock does nothing.
    pub fn start<H: DiagramHost + ?Sized>(&self, host: &H) {
        let mut timer = self.inner.timer.borrow_mut();
        if timer.is_some() {
            return;
        }
        let weak: Weak<SequencerInner> = Rc::downgrade(&self.inner);
        let sub = host.start_interval(
            self.inner.period,
            Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    StepSequencer { inner }.tick();
                }
            }),
        );
        *timer = Some(sub);
    }

    /// Release the host timer. The state is kept.
    pub fn stop(&self) {
        let timer = self.inner.timer.borrow_mut().take();
        drop(timer);
    }

    /// Whether a host timer is attached.
    pub fn is_running(&self) -> bool {
        self.inner.timer.borrow().is_some()
    }

    /// Be notified after every tick.
    pub fn subscribe(&self, on_tick: Callback) -> Subscription {
        self.inner.on_tick.subscribe(on_tick)
    }
}

/// Converts elapsed frame time into whole clock ticks.
///
/// For hosts that run a frame loop instead of an interval timer; the remainder carries over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepDriver {
    interval_secs: f64,
    carry_secs: f64,
}

impl StepDriver {
    /// Driver for `config`'s tick period. The config is validated first.
    pub fn new(config: &TimelineConfig) -> FlowlinesResult<Self> {
        config.validate()?;
        Ok(Self {
            interval_secs: config.step_interval_secs,
            carry_secs: 0.0,
        })
    }

    /// Add `elapsed_secs` and return how many ticks fell due.
    pub fn advance(&mut self, elapsed_secs: f64) -> u64 {
        if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
            return 0;
        }
        self.carry_secs += elapsed_secs;
        let ticks = (self.carry_secs / self.interval_secs + 1e-9).floor();
        self.carry_secs = (self.carry_secs - ticks * self.interval_secs).max(0.0);
        ticks as u64
    }

    /// Advance and apply the resulting ticks to `sequencer`.
    pub fn drive(&mut self, sequencer: &StepSequencer, elapsed_secs: f64) -> ClockState {
        for _ in 0..self.advance(elapsed_secs) {
            sequencer.tick();
        }
        sequencer.state()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/sequencer.rs"]
mod tests;
