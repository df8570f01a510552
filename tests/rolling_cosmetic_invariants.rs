use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::bail;
use luckydraw::{
    AudioCue, AwardRecord, DrawConfig, DrawSession, ManualScheduler, NullAudio, Phase,
    SessionHooks, Student,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Default)]
struct HookLog {
    closes: usize,
    awards: usize,
}

#[derive(Clone, Default)]
struct RecordingHooks(Rc<RefCell<HookLog>>);

impl SessionHooks for RecordingHooks {
    fn on_close(&mut self) {
        self.0.borrow_mut().closes += 1;
    }

    fn on_winner(&mut self, _award: &AwardRecord) -> anyhow::Result<()> {
        self.0.borrow_mut().awards += 1;
        Ok(())
    }

    fn on_request_add_students(&mut self) {}
}

fn roster(n: usize) -> Vec<Student> {
    (0..n)
        .map(|i| Student {
            id: format!("s{}", i),
            name: format!("Student {}", i),
            avatar: None,
            gender: None,
            score: 0,
        })
        .collect()
}

fn pump<A: AudioCue>(
    session: &mut DrawSession<ManualScheduler, A, RecordingHooks>,
    by: Duration,
) {
    for tick in session.scheduler_mut().advance(by) {
        session.handle_tick(tick);
    }
}

#[test]
fn displayed_at_stop_equals_the_precomputed_winner_for_every_slot() {
    for seed in [1, 7, 42, 1000] {
        let mut session = DrawSession::with_rng(
            roster(6),
            DrawConfig::default(),
            ManualScheduler::new(),
            NullAudio,
            RecordingHooks::default(),
            StdRng::seed_from_u64(seed),
        )
        .expect("valid session");

        session.pick_count(3);
        let winners: Vec<String> = session.winners().iter().map(|w| w.id.clone()).collect();

        for _ in 0..400 {
            if matches!(session.phase(), Phase::Drawing { rolling: false }) {
                break;
            }
            pump(&mut session, Duration::from_millis(10));
        }
        assert_eq!(session.phase(), Phase::Drawing { rolling: false });

        for (slot, expected) in winners.iter().enumerate() {
            let shown = session.displayed(slot).expect("slot").id.clone();
            assert_eq!(
                &shown, expected,
                "seed {}: slot {} shows {} instead of its winner",
                seed, slot, shown
            );
        }
    }
}

#[test]
fn all_slots_stop_at_the_same_instant() {
    let mut session = DrawSession::with_rng(
        roster(5),
        DrawConfig::default(),
        ManualScheduler::new(),
        NullAudio,
        RecordingHooks::default(),
        StdRng::seed_from_u64(2),
    )
    .expect("valid session");

    session.pick_count(4);
    for _ in 0..1000 {
        pump(&mut session, Duration::from_millis(10));
        let snap = session.snapshot();
        let selected: Vec<bool> = snap.slots.iter().map(|s| s.selected).collect();
        assert!(
            selected.iter().all(|&s| s == selected[0]),
            "slots disagree mid-roll: {:?}",
            selected
        );
        if matches!(session.phase(), Phase::Drawing { rolling: false }) {
            return;
        }
    }
    panic!("rolling never stopped");
}

#[test]
fn stray_frame_ticks_after_stop_do_not_move_the_display() {
    let mut session = DrawSession::with_rng(
        roster(4),
        DrawConfig::default(),
        ManualScheduler::new(),
        NullAudio,
        RecordingHooks::default(),
        StdRng::seed_from_u64(3),
    )
    .expect("valid session");

    session.pick_count(2);
    for _ in 0..400 {
        if matches!(session.phase(), Phase::Drawing { rolling: false }) {
            break;
        }
        pump(&mut session, Duration::from_millis(10));
    }
    assert_eq!(session.scheduler_mut().pending(), 0);

    let before: Vec<String> = (0..session.slot_count())
        .map(|i| session.displayed(i).expect("slot").id.clone())
        .collect();
    // A late tick from a sloppy host runtime is ignored outright.
    session.handle_tick(luckydraw::TimerTick::SlotFrame { slot: 0 });
    session.handle_tick(luckydraw::TimerTick::StopRoll);
    let after: Vec<String> = (0..session.slot_count())
        .map(|i| session.displayed(i).expect("slot").id.clone())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn rolling_shows_only_roster_members() {
    let mut session = DrawSession::with_rng(
        roster(3),
        DrawConfig::default(),
        ManualScheduler::new(),
        NullAudio,
        RecordingHooks::default(),
        StdRng::seed_from_u64(4),
    )
    .expect("valid session");

    session.pick_count(2);
    for _ in 0..100 {
        pump(&mut session, Duration::from_millis(10));
        for i in 0..session.slot_count() {
            let shown = session.displayed(i).expect("slot");
            assert!(session.roster().iter().any(|s| s.id == shown.id));
        }
        if matches!(session.phase(), Phase::Drawing { rolling: false }) {
            break;
        }
    }
}

struct BrokenAudio;

impl AudioCue for BrokenAudio {
    fn start_roll(&mut self) -> anyhow::Result<()> {
        bail!("no audio device")
    }

    fn stop_roll(&mut self) -> anyhow::Result<()> {
        bail!("no audio device")
    }
}

#[test]
fn audio_failure_never_blocks_the_draw() {
    let hooks = RecordingHooks::default();
    let log = hooks.0.clone();
    let mut session = DrawSession::with_rng(
        roster(5),
        DrawConfig::default(),
        ManualScheduler::new(),
        BrokenAudio,
        hooks,
        StdRng::seed_from_u64(5),
    )
    .expect("valid session");

    session.pick_count(2);
    assert_eq!(session.phase(), Phase::Drawing { rolling: true });
    for _ in 0..400 {
        if matches!(session.phase(), Phase::Drawing { rolling: false }) {
            break;
        }
        pump(&mut session, Duration::from_millis(10));
    }
    assert_eq!(session.phase(), Phase::Drawing { rolling: false });

    session.confirm_award(1).expect("confirm despite audio");
    assert_eq!(log.borrow().awards, 1);
    assert_eq!(log.borrow().closes, 1);
}
