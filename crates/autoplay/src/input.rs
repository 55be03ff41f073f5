use crate::InputConfig;
use osrsml_core::{Rect, RngState, ScreenPoint};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Simulated pointer device. Coordinates are absolute screen pixels.
pub trait InputBackend: Send + Sync {
    fn pointer_position(&self) -> Option<ScreenPoint>;
    fn move_pointer(&self, point: ScreenPoint);
    fn press(&self);
    fn release(&self);
}

/// A fully randomised click, decided on the control loop and replayed
/// verbatim on the worker thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickPlan {
    pub label: String,
    pub target: ScreenPoint,
    pub step_delays_ms: Vec<u64>,
    pub settle_ms: u64,
    pub hold_ms: u64,
}

impl ClickPlan {
    pub fn total_duration_ms(&self) -> u64 {
        self.step_delays_ms.iter().sum::<u64>() + self.settle_ms + self.hold_ms
    }
}

/// Ease-out quadratic interpolation from `from` to `to`, excluding the start
/// and ending exactly on `to`.
pub fn eased_path(from: ScreenPoint, to: ScreenPoint, steps: usize) -> Vec<ScreenPoint> {
    let steps = steps.max(1);
    (1..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let progress = 1.0 - (1.0 - t).powi(2);
            ScreenPoint {
                x: from.x + ((to.x - from.x) as f64 * progress) as i32,
                y: from.y + ((to.y - from.y) as f64 * progress) as i32,
            }
        })
        .collect()
}

/// Plays a plan on the backend, sleeping between steps.
pub fn perform(backend: &dyn InputBackend, plan: &ClickPlan) {
    let start = backend.pointer_position().unwrap_or(plan.target);
    let path = eased_path(start, plan.target, plan.step_delays_ms.len());
    for (point, delay) in path.into_iter().zip(&plan.step_delays_ms) {
        backend.move_pointer(point);
        thread::sleep(Duration::from_millis(*delay));
    }
    backend.move_pointer(plan.target);
    thread::sleep(Duration::from_millis(plan.settle_ms));
    backend.press();
    thread::sleep(Duration::from_millis(plan.hold_ms));
    backend.release();
}

pub struct InputExecutor {
    backend: Option<Arc<dyn InputBackend>>,
    config: InputConfig,
}

impl InputExecutor {
    pub fn new(backend: Option<Arc<dyn InputBackend>>, config: InputConfig) -> Self {
        if backend.is_none() {
            tracing::warn!("input backend unavailable, running observe-only");
        }
        Self { backend, config }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Centre of `bounds` plus jitter, translated to screen space.
    pub fn plan_click(
        &self,
        label: &str,
        bounds: Rect,
        canvas_offset: ScreenPoint,
        rng: &mut RngState,
    ) -> ClickPlan {
        self.plan_at(label, bounds.center(), canvas_offset, rng)
    }

    pub fn plan_at(
        &self,
        label: &str,
        canvas_point: ScreenPoint,
        canvas_offset: ScreenPoint,
        rng: &mut RngState,
    ) -> ClickPlan {
        let jitter = self.config.jitter_px;
        let point = ScreenPoint {
            x: canvas_point.x + rng.range_i32(-jitter, jitter),
            y: canvas_point.y + rng.range_i32(-jitter, jitter),
        };
        let steps = rng.range_usize(self.config.min_steps, self.config.max_steps);
        let step_delays_ms = (0..steps)
            .map(|_| {
                rng.range_u64(
                    self.config.min_step_delay_ms,
                    self.config.max_step_delay_ms,
                )
            })
            .collect();
        ClickPlan {
            label: label.to_string(),
            target: point.offset_by(canvas_offset),
            step_delays_ms,
            settle_ms: rng.range_u64(self.config.min_settle_ms, self.config.max_settle_ms),
            hold_ms: rng.range_u64(self.config.min_hold_ms, self.config.max_hold_ms),
        }
    }

    /// Fire-and-forget: the plan runs on its own thread and the caller never
    /// waits on it. Returns `None` when there is no backend.
    pub fn dispatch(&self, plan: ClickPlan) -> Option<JoinHandle<()>> {
        let backend = self.backend.clone()?;
        tracing::info!(
            label = %plan.label,
            x = plan.target.x,
            y = plan.target.y,
            "clicking"
        );
        Some(thread::spawn(move || perform(backend.as_ref(), &plan)))
    }
}
