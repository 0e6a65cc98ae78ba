//! Highlight scheduling.
//!
//! A [`Scheduler`] drives the recurring highlight cycle of a single document. It is
//! either `Idle` or `Scheduled`, the latter holding the handle of the one pending
//! wake-up it asked the [`Timer`] for. Each wake-up replaces every marker of the
//! [`Host`] with the tokens of a fresh snapshot, recolors every class, and re-arms
//! the timer. Since the timer is only re-armed once a cycle completes, cycles never
//! overlap.
//!
//! Wake-ups carrying any handle other than the pending one are ignored, as are all
//! wake-ups after [`Scheduler::cancel`], hence a host that cancels before teardown
//! never receives another call.
//!
//! With a background [`Worker`], a wake-up applies the result of the previous
//! snapshot if one has arrived and the document has not changed since, then submits
//! the next snapshot if the worker is idle.

use crate::class::Class;
use crate::color::Color;
use crate::error::Result;
use crate::pos::Point;
use crate::syntax::{Library, Mode};
use crate::theme::Theme;
use crate::token::{Tokenizer, Tokens};
use crate::worker::{Job, Worker};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The default delay between cycles.
pub const INTERVAL: Duration = Duration::from_millis(100);

/// The document and rendering surface highlighted by a [`Scheduler`].
pub trait Host {
    /// Returns a snapshot of the full document text.
    fn text(&self) -> String;

    /// Returns a counter that advances whenever the document text changes.
    fn revision(&self) -> u64;

    fn mode(&self) -> Mode;

    fn clear_markers(&mut self, class: Class);

    fn apply_marker(&mut self, class: Class, start: Point, end: Point);

    fn set_color(&mut self, class: Class, color: Color);
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TimerHandle(pub u64);

/// A source of one-shot wake-ups.
pub trait Timer {
    /// Requests a wake-up after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Withdraws the wake-up identified by `handle`, if still pending.
    fn cancel(&mut self, handle: TimerHandle);
}

/// A [`Timer`] whose wake-ups are collected by polling, holding at most one
/// pending wake-up at any time.
#[derive(Debug, Default)]
pub struct PollTimer {
    next: u64,
    pending: Option<(TimerHandle, Instant)>,
}

impl PollTimer {
    pub fn new() -> PollTimer {
        PollTimer::default()
    }

    /// Returns the moment the pending wake-up becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    /// Removes and returns the pending wake-up if due at `now`.
    pub fn due(&mut self, now: Instant) -> Option<TimerHandle> {
        match self.pending {
            Some((handle, at)) if at <= now => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}

impl Timer for PollTimer {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        self.pending = Some((handle, Instant::now() + delay));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if matches!(self.pending, Some((h, _)) if h == handle) {
            self.pending = None;
        }
    }
}

/// The outcome of a wake-up.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Cycle {
    /// Markers were replaced.
    Applied,

    /// A background result was dropped because the document changed after its
    /// snapshot was taken.
    Discarded,

    /// Nothing was done because the previous snapshot is still being tokenized.
    Skipped,

    /// A snapshot was submitted for background tokenization.
    Waiting,

    /// The wake-up was not the pending one.
    Ignored,
}

/// Counters accumulated over the lifetime of a [`Scheduler`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Stats {
    /// Wake-ups that ran a cycle.
    pub cycles: u64,
    pub applied: u64,
    pub skipped: u64,
    pub stale: u64,

    /// Rules dropped across all cycles because the budget was exhausted.
    pub degraded: u64,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum State {
    Idle,
    Scheduled(TimerHandle),
}

enum Engine {
    Inline(Arc<Library>),
    Background(Worker),
}

pub struct Scheduler {
    state: State,
    engine: Engine,
    interval: Duration,
    budget: Option<Duration>,
    stats: Stats,
}

impl Scheduler {
    /// Creates an idle scheduler, spawning a worker thread if `background` is
    /// `true`.
    pub fn new(
        library: Arc<Library>,
        interval: Duration,
        budget: Option<Duration>,
        background: bool,
    ) -> Result<Scheduler> {
        let engine = if background {
            Engine::Background(Worker::spawn(library, budget)?)
        } else {
            Engine::Inline(library)
        };
        Ok(Scheduler {
            state: State::Idle,
            engine,
            interval,
            budget,
            stats: Stats::default(),
        })
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self.state, State::Scheduled(_))
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Arms the timer unless a wake-up is already pending.
    pub fn activate<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        if self.state == State::Idle {
            self.state = State::Scheduled(timer.schedule(self.interval));
        }
    }

    /// Withdraws the pending wake-up, if any, and returns to `Idle`.
    pub fn cancel<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        if let State::Scheduled(handle) = self.state {
            timer.cancel(handle);
            tracing::debug!(handle = handle.0, "highlighting cancelled");
        }
        self.state = State::Idle;
    }

    /// Handles the wake-up identified by `handle`.
    pub fn fire<H, T>(&mut self, handle: TimerHandle, host: &mut H, timer: &mut T, theme: &Theme) -> Cycle
    where
        H: Host + ?Sized,
        T: Timer + ?Sized,
    {
        if self.state != State::Scheduled(handle) {
            tracing::trace!(handle = handle.0, "ignoring wake-up");
            return Cycle::Ignored;
        }

        self.stats.cycles += 1;
        let cycle = match &mut self.engine {
            Engine::Inline(library) => {
                let tokens = Tokenizer::new(library.find(host.mode()))
                    .with_budget(self.budget)
                    .tokenize(&host.text());
                self.stats.degraded += tokens.degraded() as u64;
                apply(host, &tokens, theme);
                Cycle::Applied
            }
            Engine::Background(worker) => {
                let mut cycle = Cycle::Skipped;
                if let Some(done) = worker.poll() {
                    if done.revision == host.revision() {
                        self.stats.degraded += done.tokens.degraded() as u64;
                        apply(host, &done.tokens, theme);
                        cycle = Cycle::Applied;
                    } else {
                        tracing::debug!(
                            revision = done.revision,
                            current = host.revision(),
                            "discarding stale tokens"
                        );
                        self.stats.stale += 1;
                        cycle = Cycle::Discarded;
                    }
                }
                if !worker.is_busy() {
                    let job = Job {
                        revision: host.revision(),
                        mode: host.mode(),
                        text: host.text(),
                    };
                    if worker.submit(job) && cycle == Cycle::Skipped {
                        cycle = Cycle::Waiting;
                    }
                }
                cycle
            }
        };

        match cycle {
            Cycle::Applied => {
                self.stats.applied += 1;
                tracing::trace!(cycle = self.stats.cycles, "markers applied");
            }
            Cycle::Skipped => {
                self.stats.skipped += 1;
                tracing::debug!(cycle = self.stats.cycles, "tokenization in flight");
            }
            _ => (),
        }
        self.state = State::Scheduled(timer.schedule(self.interval));
        cycle
    }
}

/// Replaces all markers of `host` with `tokens` and recolors every class.
fn apply<H: Host + ?Sized>(host: &mut H, tokens: &Tokens, theme: &Theme) {
    for class in Class::ALL {
        host.clear_markers(class);
    }
    for m in tokens.markers() {
        host.apply_marker(m.class, m.start, m.end);
    }
    for class in Class::ALL {
        host.set_color(class, theme.color(class));
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::thread;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Clear(Class),
        Apply(Class, Point, Point),
        Color(Class, Color),
    }

    /// A host that records every rendering call.
    pub struct FakeHost {
        pub text: String,
        pub revision: u64,
        pub mode: Mode,
        pub calls: Vec<Call>,
    }

    impl FakeHost {
        pub fn new(mode: Mode, text: &str) -> FakeHost {
            FakeHost {
                text: text.to_string(),
                revision: 1,
                mode,
                calls: vec![],
            }
        }

        pub fn edit(&mut self, text: &str) {
            self.text = text.to_string();
            self.revision += 1;
        }

        pub fn applied(&self) -> Vec<(Class, Point, Point)> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Apply(class, start, end) => Some((*class, *start, *end)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Host for FakeHost {
        fn text(&self) -> String {
            self.text.clone()
        }

        fn revision(&self) -> u64 {
            self.revision
        }

        fn mode(&self) -> Mode {
            self.mode
        }

        fn clear_markers(&mut self, class: Class) {
            self.calls.push(Call::Clear(class));
        }

        fn apply_marker(&mut self, class: Class, start: Point, end: Point) {
            self.calls.push(Call::Apply(class, start, end));
        }

        fn set_color(&mut self, class: Class, color: Color) {
            self.calls.push(Call::Color(class, color));
        }
    }

    /// A timer that records requests and never fires on its own.
    #[derive(Default)]
    pub struct FakeTimer {
        next: u64,
        pub pending: Option<TimerHandle>,
        pub cancelled: Vec<TimerHandle>,
    }

    impl FakeTimer {
        pub fn last(&self) -> TimerHandle {
            TimerHandle(self.next)
        }
    }

    impl Timer for FakeTimer {
        fn schedule(&mut self, _: Duration) -> TimerHandle {
            self.next += 1;
            let handle = TimerHandle(self.next);
            self.pending = Some(handle);
            handle
        }

        fn cancel(&mut self, handle: TimerHandle) {
            if self.pending == Some(handle) {
                self.pending = None;
            }
            self.cancelled.push(handle);
        }
    }

    fn scheduler(background: bool) -> Scheduler {
        let library = Arc::new(Library::new().unwrap());
        Scheduler::new(library, INTERVAL, None, background).unwrap()
    }

    #[test]
    fn clear_then_apply_then_color() {
        let mut sched = scheduler(false);
        let mut host = FakeHost::new(Mode::Code, "x = 5");
        let mut timer = FakeTimer::default();
        let theme = Theme::default();

        sched.activate(&mut timer);
        let cycle = sched.fire(timer.last(), &mut host, &mut timer, &theme);
        assert_eq!(cycle, Cycle::Applied);

        let n = Class::ALL.len();
        assert!(host.calls[..n].iter().all(|c| matches!(c, Call::Clear(_))));
        let applied = host.applied();
        assert_eq!(
            applied,
            [
                (Class::Variable, Point::new(0, 0), Point::new(0, 1)),
                (Class::Number, Point::new(0, 4), Point::new(0, 5)),
            ]
        );
        let colors = &host.calls[n + applied.len()..];
        assert_eq!(colors.len(), n);
        assert!(colors.contains(&Call::Color(Class::Number, theme.color(Class::Number))));
    }

    #[test]
    fn every_cycle_replaces_markers() {
        let mut sched = scheduler(false);
        let mut host = FakeHost::new(Mode::Code, "# a");
        let mut timer = FakeTimer::default();
        let theme = Theme::default();

        sched.activate(&mut timer);
        sched.fire(timer.last(), &mut host, &mut timer, &theme);
        host.edit("b = 1");
        host.calls.clear();
        sched.fire(timer.last(), &mut host, &mut timer, &theme);
        assert!(matches!(host.calls[0], Call::Clear(_)));
        assert!(host.applied().iter().all(|(class, _, _)| *class != Class::Comment));
        assert_eq!(sched.stats().applied, 2);
        assert_eq!(timer.last(), TimerHandle(3));
    }

    #[test]
    fn stale_wake_up_ignored() {
        let mut sched = scheduler(false);
        let mut host = FakeHost::new(Mode::Code, "x = 1");
        let mut timer = FakeTimer::default();
        let theme = Theme::default();

        let cycle = sched.fire(TimerHandle(1), &mut host, &mut timer, &theme);
        assert_eq!(cycle, Cycle::Ignored);

        sched.activate(&mut timer);
        let first = timer.last();
        sched.activate(&mut timer);
        assert_eq!(timer.last(), first);

        sched.fire(first, &mut host, &mut timer, &theme);
        host.calls.clear();
        let cycle = sched.fire(first, &mut host, &mut timer, &theme);
        assert_eq!(cycle, Cycle::Ignored);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn no_calls_after_cancel() {
        let mut sched = scheduler(false);
        let mut host = FakeHost::new(Mode::Markup, "<p>1</p>");
        let mut timer = FakeTimer::default();
        let theme = Theme::default();

        sched.activate(&mut timer);
        sched.fire(timer.last(), &mut host, &mut timer, &theme);
        let pending = timer.last();
        sched.cancel(&mut timer);
        assert!(!sched.is_scheduled());
        assert_eq!(timer.cancelled, [pending]);
        assert!(timer.pending.is_none());

        host.calls.clear();
        for _ in 0..3 {
            let cycle = sched.fire(pending, &mut host, &mut timer, &theme);
            assert_eq!(cycle, Cycle::Ignored);
        }
        assert!(host.calls.is_empty());
        assert!(timer.pending.is_none());
    }

    #[test]
    fn exhausted_budget_clears_markers() {
        let library = Arc::new(Library::new().unwrap());
        let mut sched = Scheduler::new(library, INTERVAL, Some(Duration::ZERO), false).unwrap();
        let mut host = FakeHost::new(Mode::Code, "x = 5");
        let mut timer = FakeTimer::default();

        sched.activate(&mut timer);
        let cycle = sched.fire(timer.last(), &mut host, &mut timer, &Theme::default());
        assert_eq!(cycle, Cycle::Applied);
        assert!(host.applied().is_empty());
        assert!(sched.stats().degraded > 0);
    }

    /// Fires wake-ups until markers are applied, returning all outcomes.
    fn run_until_applied(
        sched: &mut Scheduler,
        host: &mut FakeHost,
        timer: &mut FakeTimer,
    ) -> Vec<Cycle> {
        let theme = Theme::default();
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut cycles = vec![];
        loop {
            let cycle = sched.fire(timer.last(), host, timer, &theme);
            cycles.push(cycle);
            if cycle == Cycle::Applied {
                return cycles;
            }
            assert!(Instant::now() < deadline, "no result applied");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn background_applies_result() {
        let mut sched = scheduler(true);
        let mut host = FakeHost::new(Mode::Code, "x = 5");
        let mut timer = FakeTimer::default();

        sched.activate(&mut timer);
        let cycles = run_until_applied(&mut sched, &mut host, &mut timer);
        assert_eq!(cycles[0], Cycle::Waiting);
        assert_eq!(host.applied().len(), 2);
        assert!(cycles[1..cycles.len() - 1].iter().all(|c| *c == Cycle::Skipped));
    }

    #[test]
    fn background_discards_stale_result() {
        let mut sched = scheduler(true);
        let mut host = FakeHost::new(Mode::Code, "# old");
        let mut timer = FakeTimer::default();
        let theme = Theme::default();

        sched.activate(&mut timer);
        let cycle = sched.fire(timer.last(), &mut host, &mut timer, &theme);
        assert_eq!(cycle, Cycle::Waiting);
        host.edit("y = 2");

        let cycles = run_until_applied(&mut sched, &mut host, &mut timer);
        assert!(cycles.contains(&Cycle::Discarded));
        assert_eq!(sched.stats().stale, 1);
        assert!(host.applied().iter().all(|(class, _, _)| *class != Class::Comment));
        assert!(host.applied().iter().any(|(class, _, _)| *class == Class::Variable));
    }

    #[test]
    fn poll_timer() {
        let mut timer = PollTimer::new();
        assert!(timer.due(Instant::now()).is_none());
        let a = timer.schedule(Duration::ZERO);
        let b = timer.schedule(Duration::ZERO);
        assert_ne!(a, b);
        timer.cancel(a);
        assert_eq!(timer.due(Instant::now()), Some(b));
        assert!(timer.due(Instant::now()).is_none());

        let c = timer.schedule(Duration::from_secs(60));
        assert!(timer.due(Instant::now()).is_none());
        timer.cancel(c);
        assert!(timer.deadline().is_none());
    }
}
