//! Instrumented probe tasks and states for scheduler tests.

use std::cell::Cell;
use std::rc::Rc;

use super::state::StateSpec;
use super::task::{BehaviorCtx, Task, TaskCtx, TaskResult};

#[derive(Default)]
struct Counts {
    begins: Cell<u32>,
    updates: Cell<u32>,
    ends: Cell<u32>,
}

/// Shared callback counters; survives the task being moved into a state.
#[derive(Clone, Default)]
pub(crate) struct ProbeCounters(Rc<Counts>);

impl ProbeCounters {
    pub fn begins(&self) -> u32 {
        self.0.begins.get()
    }

    pub fn updates(&self) -> u32 {
        self.0.updates.get()
    }

    pub fn ends(&self) -> u32 {
        self.0.ends.get()
    }
}

/// Scriptable task: counts every callback and finishes on cue.
#[derive(Clone)]
pub(crate) struct ProbeTask {
    name: &'static str,
    counters: ProbeCounters,
    ignorable: bool,
    allow_early_switch: bool,
    begin_result: Option<TaskResult>,
    update_result: Option<(u32, TaskResult)>,
    seen_updates: u32,
}

impl ProbeTask {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            counters: ProbeCounters::default(),
            ignorable: false,
            allow_early_switch: true,
            begin_result: None,
            update_result: None,
            seen_updates: 0,
        }
    }

    pub fn ignorable(mut self) -> Self {
        self.ignorable = true;
        self
    }

    pub fn uninterruptible(mut self) -> Self {
        self.allow_early_switch = false;
        self
    }

    pub fn finishes_on_begin(mut self, result: TaskResult) -> Self {
        self.begin_result = Some(result);
        self
    }

    pub fn finishes_after(mut self, updates: u32, result: TaskResult) -> Self {
        self.update_result = Some((updates, result));
        self
    }

    pub fn counters(&self) -> ProbeCounters {
        self.counters.clone()
    }
}

impl Task for ProbeTask {
    fn name(&self) -> &'static str {
        self.name
    }

    fn on_begin(&mut self, ctx: &mut TaskCtx<'_>) {
        self.counters.0.begins.set(self.counters.0.begins.get() + 1);
        self.seen_updates = 0;
        if let Some(result) = self.begin_result {
            ctx.finish(result);
        }
    }

    fn on_update(&mut self, ctx: &mut TaskCtx<'_>, _dt: f32) {
        self.counters.0.updates.set(self.counters.0.updates.get() + 1);
        self.seen_updates += 1;
        if let Some((after, result)) = self.update_result {
            if self.seen_updates >= after {
                ctx.finish(result);
            }
        }
    }

    fn on_end(&mut self, _ctx: &mut TaskCtx<'_>) {
        self.counters.0.ends.set(self.counters.0.ends.get() + 1);
    }

    fn can_switch_from_early(&self, _ctx: &BehaviorCtx<'_>) -> bool {
        self.allow_early_switch
    }

    fn can_ignore(&self, _ctx: &BehaviorCtx<'_>) -> bool {
        self.ignorable
    }
}

/// Externally togglable eligibility flag.
#[derive(Clone)]
pub(crate) struct ProbeFlag(Rc<Cell<bool>>);

impl ProbeFlag {
    pub fn new(value: bool) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn set(&self, value: bool) {
        self.0.set(value);
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }
}

/// State spec whose entry guard is a shared flag.
pub(crate) struct ProbeSpec {
    eligible: ProbeFlag,
}

impl ProbeSpec {
    pub fn new(eligible: ProbeFlag) -> Self {
        Self { eligible }
    }
}

impl StateSpec for ProbeSpec {
    fn can_switch_to(&self, _ctx: &BehaviorCtx<'_>) -> bool {
        self.eligible.get()
    }
}
