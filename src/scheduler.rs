use std::time::Duration;

/// Opaque handle for a scheduled tick, used only to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Messages a session asks the host to deliver back after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// One rolling card advances a frame.
    SlotFrame { slot: usize },
    /// The shared end-of-roll deadline: every slot stops at once.
    StopRoll,
}

/// The single timing seam of the crate. The host's event loop implements
/// this over whatever timer runtime it has and routes due ticks back into
/// `DrawSession::handle_tick`; nothing here blocks.
pub trait TickScheduler {
    fn schedule(&mut self, after: Duration, tick: TimerTick) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug)]
struct PendingTimer {
    handle: TimerHandle,
    due: Duration,
    tick: TimerTick,
}

/// Deterministic scheduler over a virtual clock. The owner advances time
/// explicitly and feeds the drained ticks back to the session, which makes
/// every timing test exact; a host without its own timer runtime can pump
/// it from a render loop the same way.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_handle: u64,
    pending: Vec<PendingTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward, returning the ticks that fell due in firing
    /// order. Timers scheduled while the caller handles a returned tick are
    /// measured from the new clock position.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerTick> {
        let target = self.now + by;
        let mut fired: Vec<(Duration, u64, TimerTick)> = Vec::new();
        self.pending.retain(|t| {
            if t.due <= target {
                fired.push((t.due, t.handle.0, t.tick));
                false
            } else {
                true
            }
        });
        // Stable order: due time first, creation order as tie-break.
        fired.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        self.now = target;
        fired.into_iter().map(|(_, _, tick)| tick).collect()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, after: Duration, tick: TimerTick) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(PendingTimer {
            handle,
            due: self.now + after,
            tick,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|t| t.handle != handle);
    }
}
