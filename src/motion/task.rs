use std::cell::Cell;
use std::rc::Rc;

/// Shared flag that stops a running frame task or pending timer.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Finished,
}

/// One step of a per-frame animation. `now` is a monotonic timestamp in ms,
/// the same clock `requestAnimationFrame` hands out.
pub trait FrameTask {
    fn tick(&mut self, now: f64) -> TaskState;
}

impl<F> FrameTask for F
where
    F: FnMut(f64) -> TaskState,
{
    fn tick(&mut self, now: f64) -> TaskState {
        self(now)
    }
}

/// Where delayed callbacks and frame tasks get queued: the browser in
/// production, a [`VirtualClock`] under test.
pub trait Scheduler {
    fn after(&mut self, delay_ms: u32, run: Box<dyn FnOnce()>);
    fn frames(&mut self, task: Box<dyn FrameTask>);
}

struct Timer {
    due: f64,
    seq: u64,
    token: CancelToken,
    run: Box<dyn FnOnce()>,
}

/// Deterministic stand-in for the browser's frame and timer queues.
///
/// Time only moves when [`VirtualClock::advance`] is called; frames fire every
/// `frame_ms`, timers fire on the first frame at or after their due time and
/// before that frame's tasks tick.
pub struct VirtualClock {
    now: f64,
    frame_ms: f64,
    seq: u64,
    tasks: Vec<(Box<dyn FrameTask>, CancelToken)>,
    timers: Vec<Timer>,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new(16.0)
    }
}

impl VirtualClock {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            now: 0.0,
            frame_ms: frame_ms.max(1.0),
            seq: 0,
            tasks: Vec::new(),
            timers: Vec::new(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn spawn(&mut self, task: impl FrameTask + 'static) -> CancelToken {
        let token = CancelToken::new();
        self.spawn_with(task, token.clone());
        token
    }

    pub fn spawn_with(&mut self, task: impl FrameTask + 'static, token: CancelToken) {
        self.tasks.push((Box::new(task), token));
    }

    pub fn after(&mut self, delay_ms: f64, run: impl FnOnce() + 'static) -> CancelToken {
        let token = CancelToken::new();
        self.seq += 1;
        self.timers.push(Timer {
            due: self.now + delay_ms.max(0.0),
            seq: self.seq,
            token: token.clone(),
            run: Box::new(run),
        });
        token
    }

    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn advance(&mut self, ms: f64) {
        let target = self.now + ms;
        while self.now < target {
            self.now = (self.now + self.frame_ms).min(target);
            self.fire_due_timers();
            self.tick_tasks();
        }
    }

    fn fire_due_timers(&mut self) {
        let now = self.now;
        let mut due: Vec<Timer> = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].due <= now {
                due.push(self.timers.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        for timer in due {
            if !timer.token.is_cancelled() {
                (timer.run)();
            }
        }
    }

    fn tick_tasks(&mut self) {
        let now = self.now;
        self.tasks.retain_mut(|(task, token)| {
            if token.is_cancelled() {
                return false;
            }
            task.tick(now) == TaskState::Running
        });
    }
}

impl Scheduler for VirtualClock {
    fn after(&mut self, delay_ms: u32, run: Box<dyn FnOnce()>) {
        VirtualClock::after(self, f64::from(delay_ms), run);
    }

    fn frames(&mut self, task: Box<dyn FrameTask>) {
        self.tasks.push((task, CancelToken::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn task_runs_until_finished() {
        let mut clock = VirtualClock::new(10.0);
        let ticks = Rc::new(Cell::new(0));
        let seen = ticks.clone();
        clock.spawn(move |_now: f64| {
            seen.set(seen.get() + 1);
            if seen.get() == 3 {
                TaskState::Finished
            } else {
                TaskState::Running
            }
        });
        clock.advance(100.0);
        assert_eq!(ticks.get(), 3);
        assert_eq!(clock.active_tasks(), 0);
    }

    #[test]
    fn cancelled_task_stops_ticking() {
        let mut clock = VirtualClock::new(10.0);
        let ticks = Rc::new(Cell::new(0));
        let seen = ticks.clone();
        let token = clock.spawn(move |_now: f64| {
            seen.set(seen.get() + 1);
            TaskState::Running
        });
        clock.advance(30.0);
        token.cancel();
        clock.advance(30.0);
        assert_eq!(ticks.get(), 3);
        assert_eq!(clock.active_tasks(), 0);
    }

    #[test]
    fn timers_fire_in_due_order() {
        let mut clock = VirtualClock::new(16.0);
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, name) in [(50.0, "b"), (20.0, "a"), (50.0, "c")] {
            let log = log.clone();
            clock.after(delay, move || log.borrow_mut().push(name));
        }
        let skipped = {
            let log = log.clone();
            clock.after(30.0, move || log.borrow_mut().push("never"))
        };
        skipped.cancel();
        clock.advance(40.0);
        assert_eq!(*log.borrow(), vec!["a"]);
        clock.advance(40.0);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(clock.pending_timers(), 0);
    }
}
