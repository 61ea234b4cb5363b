use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use super::timeline::{Timeline, TimelineStep};

pub type Task = Box<dyn FnOnce()>;

/// 定时器抽象：浏览器中由 `setTimeout` 驱动，测试中由 [`VirtualClock`] 驱动。
pub trait Scheduler {
    fn schedule(&self, delay_ms: u32, task: Task);
}

/// 时间轴代数。重置时递增，旧代数中尚未执行的步骤会被丢弃。
#[derive(Debug, Clone, Default)]
pub struct Generation(Rc<Cell<u64>>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self) -> u64 {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        next
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.get() == ticket
    }
}

/// 按时间点把所有步骤一次性交给调度器（开环，均从当前时刻起算）。
///
/// 返回本次时间轴所属的代数。
pub fn play_timeline(
    scheduler: &dyn Scheduler,
    timeline: Timeline,
    generation: &Generation,
    apply: Rc<dyn Fn(&TimelineStep)>,
) -> u64 {
    let ticket = generation.current();
    for entry in timeline.into_steps() {
        let generation = generation.clone();
        let apply = Rc::clone(&apply);
        scheduler.schedule(
            entry.at_ms,
            Box::new(move || {
                if generation.is_current(ticket) {
                    apply(&entry.step);
                } else {
                    tracing::trace!(ticket, step = ?entry.step, "dropped stale timeline step");
                }
            }),
        );
    }
    ticket
}

#[derive(Default)]
struct ClockState {
    now: u64,
    seq: u64,
    queue: BTreeMap<(u64, u64), Task>,
}

/// 确定性的虚拟时钟。
#[derive(Clone, Default)]
pub struct VirtualClock {
    state: Rc<RefCell<ClockState>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// 推进 `ms` 毫秒，按 (到期时间, 调度顺序) 执行到期任务，返回执行数量。
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.state.borrow().now.saturating_add(ms);
        let mut executed = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .queue
                    .first_key_value()
                    .map(|(key, _)| *key)
                    .filter(|(at, _)| *at <= target);
                match due {
                    Some(key) => {
                        state.now = key.0;
                        state.queue.remove(&key)
                    }
                    None => None,
                }
            };
            match next {
                Some(task) => {
                    task();
                    executed += 1;
                }
                None => break,
            }
        }
        self.state.borrow_mut().now = target;
        executed
    }

    /// 执行所有剩余任务。
    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        loop {
            let last = self
                .state
                .borrow()
                .queue
                .last_key_value()
                .map(|(key, _)| key.0);
            let Some(last) = last else {
                return executed;
            };
            let now = self.now();
            executed += self.advance(last.saturating_sub(now));
        }
    }
}

impl Scheduler for VirtualClock {
    fn schedule(&self, delay_ms: u32, task: Task) {
        let mut state = self.state.borrow_mut();
        let key = (state.now + u64::from(delay_ms), state.seq);
        state.seq += 1;
        state.queue.insert(key, task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuelConfig;
    use crate::game::{FixedDraw, GameSession};
    use crate::presentation::{apply_step, RecordingSurface, Slot};

    struct Recorder {
        clock: VirtualClock,
        log: RefCell<Vec<(u64, TimelineStep)>>,
    }

    fn recorder(clock: &VirtualClock) -> Rc<Recorder> {
        Rc::new(Recorder {
            clock: clock.clone(),
            log: RefCell::new(Vec::new()),
        })
    }

    fn sink(recorder: &Rc<Recorder>) -> Rc<dyn Fn(&TimelineStep)> {
        let recorder = Rc::clone(recorder);
        Rc::new(move |step: &TimelineStep| {
            let now = recorder.clock.now();
            recorder.log.borrow_mut().push((now, step.clone()));
        })
    }

    fn duel_timeline(computer: usize) -> Timeline {
        let mut session = GameSession::default();
        let report = session
            .select_card(0, &mut FixedDraw(computer))
            .expect("valid duel");
        Timeline::for_duel(&report, &DuelConfig::default())
    }

    #[test]
    fn clock_runs_tasks_in_due_order() {
        let clock = VirtualClock::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(30u32, "c"), (10, "a"), (30, "d"), (20, "b")] {
            let order = Rc::clone(&order);
            clock.schedule(delay, Box::new(move || order.borrow_mut().push(tag)));
        }

        assert_eq!(clock.advance(15), 1);
        assert_eq!(*order.borrow(), vec!["a"]);
        assert_eq!(clock.now(), 15);

        assert_eq!(clock.advance(15), 3);
        assert_eq!(*order.borrow(), vec!["a", "b", "c", "d"]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn tasks_may_schedule_followups() {
        let clock = VirtualClock::new();
        let hits = Rc::new(Cell::new(0u32));
        let inner_clock = clock.clone();
        let inner_hits = Rc::clone(&hits);
        clock.schedule(
            500,
            Box::new(move || {
                let hits = Rc::clone(&inner_hits);
                inner_clock.schedule(300, Box::new(move || hits.set(hits.get() + 1)));
            }),
        );

        clock.advance(700);
        assert_eq!(hits.get(), 0);
        clock.advance(100);
        assert_eq!(hits.get(), 1);
        assert_eq!(clock.now(), 800);
    }

    #[test]
    fn timeline_steps_fire_at_their_offsets() {
        let clock = VirtualClock::new();
        let generation = Generation::new();
        let recorder = recorder(&clock);
        play_timeline(&clock, duel_timeline(1), &generation, sink(&recorder));

        clock.advance(0);
        assert_eq!(recorder.log.borrow().len(), 1, "selection locks immediately");

        clock.advance(799);
        assert_eq!(recorder.log.borrow().len(), 2, "player flip started, image not yet swapped");

        clock.run_until_idle();
        let log = recorder.log.borrow();
        let times: Vec<u64> = log.iter().map(|(at, _)| *at).collect();
        assert_eq!(
            times,
            vec![0, 500, 800, 1000, 1300, 1500, 2500, 2500, 2500, 2500, 2500]
        );
        assert!(matches!(
            log[4].1,
            TimelineStep::ShowCard {
                slot: Slot::Computer,
                ..
            }
        ));
    }

    #[test]
    fn advancing_generation_cancels_pending_steps() {
        let clock = VirtualClock::new();
        let generation = Generation::new();
        let recorder = recorder(&clock);
        let ticket = play_timeline(&clock, duel_timeline(2), &generation, sink(&recorder));

        clock.advance(1200);
        let fired = recorder.log.borrow().len();
        assert_eq!(fired, 4);

        generation.advance();
        assert!(!generation.is_current(ticket));
        clock.run_until_idle();
        assert_eq!(recorder.log.borrow().len(), fired, "stale steps must not fire");
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn surface_reaches_final_state_through_clock() {
        let clock = VirtualClock::new();
        let generation = Generation::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let target = Rc::clone(&surface);
        let apply: Rc<dyn Fn(&TimelineStep)> = Rc::new(move |step: &TimelineStep| {
            let mut surface = target.borrow_mut();
            let mut sounds = std::mem::take(&mut surface.sounds);
            apply_step(step, &mut *surface, &mut sounds);
            surface.sounds = sounds;
        });

        play_timeline(&clock, duel_timeline(0), &generation, apply);
        clock.advance(1600);
        assert!(surface.borrow().battle);
        assert!(surface.borrow().result.is_none());

        clock.advance(900);
        let surface = surface.borrow();
        assert!(!surface.battle);
        assert!(surface.next_duel_visible);
        assert!(surface.sounds.is_empty(), "draws are silent");
        assert_eq!(surface.score.as_deref(), Some("Win: 0 | Lose: 0"));
    }

    #[test]
    fn reset_mid_animation_still_shows_the_counted_score() {
        let config = DuelConfig::default();
        let clock = VirtualClock::new();
        let generation = Generation::new();
        let mut session = GameSession::default();
        let surface = Rc::new(RefCell::new(RecordingSurface::new()));
        let target = Rc::clone(&surface);
        let apply: Rc<dyn Fn(&TimelineStep)> = Rc::new(move |step: &TimelineStep| {
            let mut surface = target.borrow_mut();
            let mut sounds = std::mem::take(&mut surface.sounds);
            apply_step(step, &mut *surface, &mut sounds);
            surface.sounds = sounds;
        });

        let report = session
            .select_card(0, &mut FixedDraw(1))
            .expect("valid duel");
        play_timeline(
            &clock,
            Timeline::for_duel(&report, &config),
            &generation,
            Rc::clone(&apply),
        );
        clock.advance(1200);
        assert!(surface.borrow().score.is_none());

        generation.advance();
        session.reset();
        for entry in Timeline::for_reset(&config, session.score()).steps() {
            apply(&entry.step);
        }
        clock.run_until_idle();

        let expected = session.score().text();
        assert_eq!(expected, "Win: 1 | Lose: 0");
        let surface = surface.borrow();
        assert_eq!(surface.score.as_deref(), Some(expected.as_str()));
        assert!(surface.selection_enabled);
        assert!(!surface.next_duel_visible);
        assert!(surface.result.is_some());
    }
}
