use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::audio::AudioCue;
use crate::avatar::{avatar_for, AvatarRef};
use crate::config::DrawConfig;
use crate::error::{ConfigError, DrawError};
use crate::rolling::{frame_interval, RollingSlot};
use crate::roster::Student;
use crate::scheduler::{TickScheduler, TimerHandle, TimerTick};
use crate::selection;

/// Where the session currently is. Created fresh on every open; nothing
/// survives a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the user to pick how many winners to draw.
    CountSelection,
    /// Fewer than two students; the user must add students and reopen.
    NeedsStudents,
    /// More winners requested than students exist. Keeps the request for
    /// display.
    TooManySelected { requested: usize },
    /// Winners are fixed. While `rolling` the cards flash candidates;
    /// afterwards they show the true winners and await a point value.
    Drawing { rolling: bool },
}

/// Callbacks into the embedding application. The host persists score and
/// history changes; this crate only reports what happened.
pub trait SessionHooks {
    /// Session ended for any reason: cancel, successful award, or leaving
    /// to add students.
    fn on_close(&mut self);
    /// Award confirmed. Invoked at most once per session; an error here
    /// propagates to the confirm caller untouched.
    fn on_winner(&mut self, award: &AwardRecord) -> anyhow::Result<()>;
    /// User chose to leave the draw flow and add more roster entries.
    fn on_request_add_students(&mut self);
}

/// Winner payload handed to the host. One winner is unwrapped to a bare
/// student, two or more travel as a list; `untagged` keeps that shape on
/// the JSON boundary, which is what the embedding app's award handler
/// expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WinnerSelection {
    Single(Student),
    Group(Vec<Student>),
}

impl WinnerSelection {
    fn from_winners(winners: &[Student]) -> Self {
        if winners.len() == 1 {
            WinnerSelection::Single(winners[0].clone())
        } else {
            WinnerSelection::Group(winners.to_vec())
        }
    }

    pub fn students(&self) -> &[Student] {
        match self {
            WinnerSelection::Single(s) => std::slice::from_ref(s),
            WinnerSelection::Group(v) => v,
        }
    }
}

/// Everything the host needs to apply and log an award.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardRecord {
    pub session_id: String,
    pub selection: WinnerSelection,
    pub points: i64,
    /// `points * winners`; display-only, the host applies `points` per
    /// student itself.
    pub total_points: i64,
    /// RFC 3339, for the host's point-history log.
    pub awarded_at: String,
}

/// Serializable view of the session for the embedding UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: &'static str,
    pub rolling: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<usize>,
    pub count_menu: Vec<usize>,
    pub point_menu: Vec<i64>,
    pub roster_size: usize,
    pub slots: Vec<SlotView>,
    pub awarded: bool,
}

/// One winner card as it should render right now.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub student_id: String,
    pub name: String,
    pub avatar: AvatarRef,
    /// The "Selected" affordance, shown once rolling has stopped.
    pub selected: bool,
}

/// One open lucky-draw dialog: the phase machine, the per-slot animation
/// timers and the award emission, behind host-supplied scheduler, audio
/// and hook capabilities.
pub struct DrawSession<S, A, H> {
    id: String,
    config: DrawConfig,
    roster: Vec<Student>,
    scheduler: S,
    audio: A,
    hooks: H,
    rng: StdRng,
    phase: Phase,
    winners: Vec<Student>,
    slots: Vec<RollingSlot>,
    stop_timer: Option<TimerHandle>,
    awarded: bool,
    closed: bool,
}

impl<S, A, H> DrawSession<S, A, H>
where
    S: TickScheduler,
    A: AudioCue,
    H: SessionHooks,
{
    pub fn new(
        roster: Vec<Student>,
        config: DrawConfig,
        scheduler: S,
        audio: A,
        hooks: H,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(roster, config, scheduler, audio, hooks, StdRng::from_os_rng())
    }

    /// Deterministic construction for tests and replayable hosts.
    pub fn with_rng(
        roster: Vec<Student>,
        config: DrawConfig,
        scheduler: S,
        audio: A,
        hooks: H,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            config,
            roster,
            scheduler,
            audio,
            hooks,
            rng,
            phase: Phase::CountSelection,
            winners: Vec::new(),
            slots: Vec::new(),
            stop_timer: None,
            awarded: false,
            closed: false,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn roster(&self) -> &[Student] {
        &self.roster
    }

    /// The fixed winner set; empty until a draw has started.
    pub fn winners(&self) -> &[Student] {
        &self.winners
    }

    /// Student currently displayed on a card.
    pub fn displayed(&self, slot: usize) -> Option<&Student> {
        self.slots.get(slot).map(|s| &self.roster[s.shown_index()])
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Display total for the point selector, `points * winners`.
    pub fn implied_total(&self, points: i64) -> i64 {
        points * self.winners.len() as i64
    }

    /// Host access for pumping schedulers that are owned by the session.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// User picked a winner count from the menu. Runs the draw and moves
    /// to `Drawing` on success, or to the matching guard state.
    pub fn pick_count(&mut self, requested: usize) {
        if self.closed || self.phase != Phase::CountSelection {
            return;
        }
        if !self.config.count_menu.contains(&requested) {
            debug!("ignoring winner count outside the menu: {}", requested);
            return;
        }
        match selection::winner_indices_with_rng(&self.roster, requested, &mut self.rng) {
            Err(DrawError::InsufficientRoster { .. }) => {
                debug!("session {}: roster too small, needs students", self.id);
                self.phase = Phase::NeedsStudents;
            }
            Err(DrawError::OverRequested { requested, .. }) => {
                debug!("session {}: {} winners over-requested", self.id, requested);
                self.phase = Phase::TooManySelected { requested };
            }
            Ok(indices) => self.start_drawing(indices),
        }
    }

    fn start_drawing(&mut self, winner_indices: Vec<usize>) {
        self.winners = winner_indices
            .iter()
            .map(|&i| self.roster[i].clone())
            .collect();
        // Each card starts on a random candidate so the opening frame
        // reveals nothing about the outcome.
        self.slots = winner_indices
            .iter()
            .map(|&w| {
                let start = self.rng.random_range(0..self.roster.len());
                RollingSlot::new(w, start)
            })
            .collect();

        let initial = frame_interval(
            Duration::ZERO,
            self.config.roll_duration(),
            self.config.fps_high,
            self.config.fps_low,
        );
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.timer = Some(
                self.scheduler
                    .schedule(initial, TimerTick::SlotFrame { slot: i }),
            );
        }
        // One shared deadline: every card stops at the same instant.
        self.stop_timer = Some(
            self.scheduler
                .schedule(self.config.roll_duration(), TimerTick::StopRoll),
        );

        if let Err(e) = self.audio.start_roll() {
            warn!("draw sound failed to start: {:#}", e);
        }
        self.phase = Phase::Drawing { rolling: true };
        debug!(
            "session {}: drawing {} winners from {} students",
            self.id,
            self.winners.len(),
            self.roster.len()
        );
    }

    /// Deliver a due tick from the host's timer runtime. Ticks arriving
    /// after close, or outside the rolling window, are ignored.
    pub fn handle_tick(&mut self, tick: TimerTick) {
        if self.closed {
            return;
        }
        let Phase::Drawing { rolling: true } = self.phase else {
            return;
        };
        match tick {
            TimerTick::SlotFrame { slot } => {
                let Some(s) = self.slots.get_mut(slot) else {
                    return;
                };
                let next = s.advance(self.roster.len(), &self.config, &mut self.rng);
                s.timer = Some(self.scheduler.schedule(next, TimerTick::SlotFrame { slot }));
            }
            TimerTick::StopRoll => self.stop_rolling(),
        }
    }

    fn stop_rolling(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(t) = slot.timer.take() {
                self.scheduler.cancel(t);
            }
            slot.lock();
        }
        self.stop_timer = None;
        if let Err(e) = self.audio.stop_roll() {
            warn!("draw sound failed to stop: {:#}", e);
        }
        self.phase = Phase::Drawing { rolling: false };
        debug!("session {}: rolling stopped, winners revealed", self.id);
    }

    /// From the over-requested guard back to the count menu.
    pub fn choose_smaller(&mut self) {
        if self.closed {
            return;
        }
        if let Phase::TooManySelected { .. } = self.phase {
            self.phase = Phase::CountSelection;
        }
    }

    /// Leave the draw flow to add roster entries. Only reachable from the
    /// guard states; notifies the host, then closes.
    pub fn request_add_students(&mut self) {
        if self.closed {
            return;
        }
        match self.phase {
            Phase::NeedsStudents | Phase::TooManySelected { .. } => {
                self.hooks.on_request_add_students();
                self.close();
            }
            _ => {}
        }
    }

    /// Confirm the chosen point value and emit the award. Emits at most
    /// once per session; the latch is set before the hook runs, so a hook
    /// error still consumes this session's single emission and is returned
    /// to the caller unmodified.
    pub fn confirm_award(&mut self, points: i64) -> anyhow::Result<()> {
        if self.closed || self.awarded {
            return Ok(());
        }
        let Phase::Drawing { rolling: false } = self.phase else {
            return Ok(());
        };
        if !self.config.point_menu.contains(&points) {
            debug!("ignoring point value outside the menu: {}", points);
            return Ok(());
        }

        self.awarded = true;
        let record = AwardRecord {
            session_id: self.id.clone(),
            selection: WinnerSelection::from_winners(&self.winners),
            points,
            total_points: points * self.winners.len() as i64,
            awarded_at: Utc::now().to_rfc3339(),
        };
        debug!(
            "session {}: awarding {} points to {} winners",
            self.id,
            points,
            self.winners.len()
        );
        self.hooks.on_winner(&record)?;
        self.close();
        Ok(())
    }

    /// Unconditional close, available in every state: cancels all pending
    /// timers, stops audio best-effort and notifies the host. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for slot in self.slots.iter_mut() {
            if let Some(t) = slot.timer.take() {
                self.scheduler.cancel(t);
            }
        }
        if let Some(t) = self.stop_timer.take() {
            self.scheduler.cancel(t);
        }
        if let Phase::Drawing { rolling: true } = self.phase {
            if let Err(e) = self.audio.stop_roll() {
                warn!("draw sound failed to stop: {:#}", e);
            }
        }
        self.hooks.on_close();
        debug!("session {}: closed", self.id);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let (phase, rolling, requested) = match self.phase {
            Phase::CountSelection => ("count_selection", false, None),
            Phase::NeedsStudents => ("needs_students", false, None),
            Phase::TooManySelected { requested } => ("too_many_selected", false, Some(requested)),
            Phase::Drawing { rolling } => ("drawing", rolling, None),
        };
        SessionSnapshot {
            session_id: self.id.clone(),
            phase,
            rolling,
            requested,
            count_menu: self.config.count_menu.clone(),
            point_menu: self.config.point_menu.clone(),
            roster_size: self.roster.len(),
            slots: self
                .slots
                .iter()
                .map(|s| {
                    let student = &self.roster[s.shown_index()];
                    SlotView {
                        student_id: student.id.clone(),
                        name: student.name.clone(),
                        avatar: avatar_for(student),
                        selected: !s.is_rolling(),
                    }
                })
                .collect(),
            awarded: self.awarded,
        }
    }
}
