#![forbid(unsafe_code)]

//! Press-and-hold spin timer.
//!
//! Per direction `idle → spinning → idle`:
//!
//! - **start**: one immediate step, `start-spin` then the directional start,
//!   then a `stepintervaldelay` timeout that arms a `stepinterval` repeat.
//! - **tick**: `spincount += 1`, then one boosted step.
//! - **stop**: clear the timer, directional stop then `stop-spin`,
//!   `spincount = 0`.
//!
//! # Invariants
//!
//! 1. At most one direction spins at a time; starting the opposite direction
//!    stops the current spin first.
//! 2. Every scheduled callback carries the generation it was armed for and
//!    does nothing once that generation has ended, so `stop_spin` or
//!    `destroy` from inside any handler prevents every later tick.
//! 3. A tick that leaves the value unchanged, or lands on the bound in the
//!    travel direction, ends the spin.

use spinbox_core::{SpinEvent, StepDirection};
use spinbox_dom::TimerId;
use web_time::Duration;

use crate::engine::Engine;

#[derive(Debug, Default)]
pub(crate) struct SpinState {
    pub(crate) direction: Option<StepDirection>,
    pub(crate) count: u32,
    generation: u64,
    timer: Option<TimerId>,
}

impl Engine {
    pub(crate) fn start_spin(&self, direction: StepDirection) {
        if !self.is_live() || self.is_locked() {
            return;
        }
        let current = self.state.borrow().spin.direction;
        if current == Some(direction) {
            return;
        }
        if current.is_some() {
            self.stop_spin();
        }

        let generation = {
            let mut state = self.state.borrow_mut();
            let spin = &mut state.spin;
            spin.generation += 1;
            spin.direction = Some(direction);
            spin.count = 0;
            spin.generation
        };
        tracing::trace!(message = "spinbox.spin.start", direction = ?direction, generation);

        self.step(direction, 0);
        if !self.is_spinning(generation) {
            return;
        }
        self.emit(SpinEvent::StartSpin);
        if !self.is_spinning(generation) {
            return;
        }
        self.emit(direction.start_event());
        if !self.is_spinning(generation) {
            return;
        }

        let delay = Duration::from_millis(self.with_settings(|s| s.stepintervaldelay));
        let weak = self.weak();
        let timer = self.dom.set_timeout(delay, move || {
            if let Some(engine) = weak.upgrade() {
                engine.arm_repeat(direction, generation);
            }
        });
        self.state.borrow_mut().spin.timer = Some(timer);
    }

    fn arm_repeat(&self, direction: StepDirection, generation: u64) {
        if !self.is_spinning(generation) {
            return;
        }
        let period = Duration::from_millis(self.with_settings(|s| s.stepinterval));
        let weak = self.weak();
        let timer = self.dom.set_interval(period, move || {
            if let Some(engine) = weak.upgrade() {
                engine.tick(direction, generation);
            }
        });
        self.state.borrow_mut().spin.timer = Some(timer);
    }

    fn tick(&self, direction: StepDirection, generation: u64) {
        if !self.is_spinning(generation) {
            return;
        }
        let count = {
            let mut state = self.state.borrow_mut();
            state.spin.count = state.spin.count.saturating_add(1);
            state.spin.count
        };
        tracing::trace!(message = "spinbox.spin.tick", direction = ?direction, count);
        let keep_going = self.step(direction, count);
        if !keep_going && self.is_spinning(generation) {
            self.stop_spin();
        }
    }

    /// End the active spin, if any. Safe from inside any handler.
    pub(crate) fn stop_spin(&self) {
        let (direction, timer) = {
            let mut state = self.state.borrow_mut();
            let spin = &mut state.spin;
            spin.count = 0;
            (spin.direction.take(), spin.timer.take())
        };
        if let Some(timer) = timer {
            self.dom.clear_timer(timer);
        }
        let Some(direction) = direction else {
            return;
        };
        tracing::trace!(message = "spinbox.spin.stop", direction = ?direction);
        self.emit(direction.stop_event());
        self.emit(SpinEvent::StopSpin);
    }

    fn is_spinning(&self, generation: u64) -> bool {
        let state = self.state.borrow();
        state.spin.direction.is_some() && state.spin.generation == generation
    }

    pub(crate) fn spinning(&self) -> Option<StepDirection> {
        self.state.borrow().spin.direction
    }

    pub(crate) fn spin_count(&self) -> u32 {
        self.state.borrow().spin.count
    }
}
