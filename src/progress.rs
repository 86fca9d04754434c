//! Synthetic progress for a request that reports none.
//!
//! `ProgressSimulator` is the bare state machine; `ProgressRun` drives it
//! from an interval timer and owns the timer handle, so reaching the ceiling,
//! settling or dropping the run always cancels the ticks.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rand::Rng;

use crate::config::ProgressConfig;

/// Source of per-tick increments.
pub trait StepSource {
	fn next_step(&mut self) -> u32;
}

/// Uniform steps in `1..=max_step`.
#[derive(Clone, Debug)]
pub struct RandomSteps {
	max_step: u32,
}

impl RandomSteps {
	pub fn new(max_step: u32) -> Self {
		Self {
			max_step: max_step.max(1),
		}
	}
}

impl StepSource for RandomSteps {
	fn next_step(&mut self) -> u32 {
		rand::thread_rng().gen_range(1..=self.max_step)
	}
}

/// Same increment every tick.
#[derive(Clone, Copy, Debug)]
pub struct FixedStep(pub u32);

impl StepSource for FixedStep {
	fn next_step(&mut self) -> u32 {
		self.0
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressState {
	Idle,
	Running { percent: u32 },
	/// Reached the ceiling; ticks no longer advance it.
	Holding { percent: u32 },
}

#[derive(Debug)]
pub struct ProgressSimulator<S> {
	state: ProgressState,
	ceiling: u32,
	steps: S,
}

impl<S: StepSource> ProgressSimulator<S> {
	pub fn new(ceiling: u32, steps: S) -> Self {
		Self {
			state: ProgressState::Idle,
			ceiling,
			steps,
		}
	}

	pub fn state(&self) -> ProgressState {
		self.state
	}

	pub fn percent(&self) -> u32 {
		match self.state {
			ProgressState::Idle => 0,
			ProgressState::Running { percent } | ProgressState::Holding { percent } => percent,
		}
	}

	/// Restarts from zero, also when already running.
	pub fn start(&mut self) {
		self.state = ProgressState::Running { percent: 0 };
	}

	/// Advances a running simulation. Returns the new value when it changed.
	pub fn tick(&mut self) -> Option<u32> {
		let ProgressState::Running { percent } = self.state else {
			return None;
		};
		let next = percent.saturating_add(self.steps.next_step()).min(self.ceiling);
		self.state = if next >= self.ceiling {
			ProgressState::Holding { percent: next }
		} else {
			ProgressState::Running { percent: next }
		};
		(next != percent).then_some(next)
	}

	pub fn is_holding(&self) -> bool {
		matches!(self.state, ProgressState::Holding { .. })
	}

	/// Success and failure both reset to zero; the caller tells them apart
	/// through its own flags.
	pub fn settle(&mut self) -> u32 {
		self.state = ProgressState::Idle;
		0
	}
}

/// Periodic callback scheduler. Dropping the handle must stop the callback.
pub trait IntervalTimer {
	type Handle;

	fn every(&self, period_ms: u32, on_tick: Box<dyn FnMut()>) -> Self::Handle;
}

/// `setInterval` through gloo; the returned `Interval` clears itself on drop.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimer;

impl IntervalTimer for BrowserTimer {
	type Handle = gloo_timers::callback::Interval;

	fn every(&self, period_ms: u32, on_tick: Box<dyn FnMut()>) -> Self::Handle {
		gloo_timers::callback::Interval::new(period_ms, on_tick)
	}
}

/// A simulator bound to a timer for the lifetime of one request.
pub struct ProgressRun<T: IntervalTimer, S> {
	simulator: Rc<RefCell<ProgressSimulator<S>>>,
	timer: T,
	period_ms: u32,
	/// Strong only here; the tick callback holds a `Weak` so that dropping
	/// the run still drops the handle.
	ticking: Rc<RefCell<Option<T::Handle>>>,
}

impl<T, S> ProgressRun<T, S>
where
	T: IntervalTimer,
	T::Handle: 'static,
	S: StepSource + 'static,
{
	pub fn new(timer: T, config: &ProgressConfig, steps: S) -> Self {
		Self {
			simulator: Rc::new(RefCell::new(ProgressSimulator::new(config.ceiling, steps))),
			timer,
			period_ms: config.interval_ms,
			ticking: Rc::new(RefCell::new(None)),
		}
	}

	/// Starts at zero and reports every change through `on_change`. The
	/// interval is cancelled as soon as the ceiling is reached.
	pub fn start(&mut self, mut on_change: impl FnMut(u32) + 'static) {
		self.stop_ticking();
		self.simulator.borrow_mut().start();
		on_change(0);

		let simulator = Rc::clone(&self.simulator);
		let ticking: Weak<RefCell<Option<T::Handle>>> = Rc::downgrade(&self.ticking);
		let handle = self.timer.every(
			self.period_ms,
			Box::new(move || {
				let (changed, holding) = {
					let mut sim = simulator.borrow_mut();
					(sim.tick(), sim.is_holding())
				};
				if let Some(percent) = changed {
					on_change(percent);
				}
				if holding {
					if let Some(ticking) = ticking.upgrade() {
						let finished = ticking.borrow_mut().take();
						drop(finished);
					}
				}
			}),
		);
		*self.ticking.borrow_mut() = Some(handle);
	}

	/// Cancels the ticks and resets to zero.
	pub fn settle(&mut self) -> u32 {
		self.stop_ticking();
		log::debug!("progress run settled at {}%", self.percent());
		self.simulator.borrow_mut().settle()
	}

	pub fn percent(&self) -> u32 {
		self.simulator.borrow().percent()
	}

	fn stop_ticking(&self) {
		let previous = self.ticking.borrow_mut().take();
		drop(previous);
	}
}
