use core::time::Duration;
use web_time::Instant;

use crate::*;

/// Step-by-step re-execution of a recorded game.
///
/// The board is mined up front from the first recorded reveal, so every
/// recorded action lands on the same layout the player saw.
#[derive(Clone, Debug, PartialEq)]
pub struct Replay {
    item: LeaderboardItem,
    state: GameState,
    cursor: usize,
}

impl Replay {
    pub fn start(item: LeaderboardItem) -> Result<Self> {
        let state = GameState::for_replay(&item)?;
        log::debug!(
            "Replaying {} game with {} actions",
            item.board_configuration.difficulty,
            item.actions.len()
        );
        Ok(Self {
            item,
            state,
            cursor: 0,
        })
    }

    /// Back to the freshly mined board, nothing applied.
    pub fn restart(&mut self) -> Result<()> {
        self.state = GameState::for_replay(&self.item)?;
        self.cursor = 0;
        Ok(())
    }

    pub fn item(&self) -> &LeaderboardItem {
        &self.item
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Number of actions applied so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.item.actions.len()
    }

    pub fn next_action(&self) -> Option<&TimedAction> {
        self.item.actions.get(self.cursor)
    }

    /// How long to wait after the previous action before the next one fires.
    pub fn next_delay(&self) -> Option<Duration> {
        self.next_action()
            .map(|action| Duration::from_millis(action.elapsed_ms))
    }

    /// Applies the next recorded action, `None` once the log is exhausted.
    pub fn step(&mut self) -> Result<Option<TimedAction>> {
        let Some(&action) = self.next_action() else {
            return Ok(None);
        };
        self.state = self.state.replayed(&action)?;
        self.cursor += 1;
        log::trace!("Replayed {:?} at {}", action.kind, action.cell);
        Ok(Some(action))
    }

    /// Applies every remaining action without waiting.
    pub fn run_to_end(&mut self) -> Result<&GameState> {
        while self.step()?.is_some() {}
        Ok(&self.state)
    }
}

/// Handle for one scheduled replay action.
///
/// A ticket taken before a restart or cancel is stale and fires nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReplayTicket {
    session: u32,
    pub due: Instant,
}

/// Drives a [`Replay`] against a monotonic clock with at most one action
/// pending at a time.
#[derive(Clone, Debug)]
pub struct ReplayTimeline {
    replay: Replay,
    session: u32,
    due: Option<Instant>,
}

impl ReplayTimeline {
    pub fn new(replay: Replay, now: Instant) -> Self {
        let mut timeline = Self {
            replay,
            session: 0,
            due: None,
        };
        timeline.schedule_from(now);
        timeline
    }

    pub fn replay(&self) -> &Replay {
        &self.replay
    }

    pub fn session(&self) -> u32 {
        self.session
    }

    /// When the pending action fires, `None` when nothing is pending.
    pub fn next_due(&self) -> Option<Instant> {
        self.due
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn next_ticket(&self) -> Option<ReplayTicket> {
        self.due.map(|due| ReplayTicket {
            session: self.session,
            due,
        })
    }

    /// Fires the action behind `ticket`. Returns `false` for a stale ticket.
    pub fn fire(&mut self, ticket: ReplayTicket) -> Result<bool> {
        if ticket.session != self.session || self.due != Some(ticket.due) {
            log::trace!("Ignoring stale replay ticket from session {}", ticket.session);
            return Ok(false);
        }
        self.fire_pending(ticket.due)?;
        Ok(true)
    }

    /// Fires every action due at `now`, in log order. Returns how many fired.
    pub fn poll(&mut self, now: Instant) -> Result<usize> {
        let mut fired = 0;
        while let Some(due) = self.due {
            if due > now {
                break;
            }
            self.fire_pending(due)?;
            fired += 1;
        }
        Ok(fired)
    }

    /// Drops any pending action and starts over from the first one.
    pub fn restart(&mut self, now: Instant) -> Result<()> {
        self.replay.restart()?;
        self.session = self.session.wrapping_add(1);
        self.schedule_from(now);
        Ok(())
    }

    /// Drops the pending action, leaving the board as it is.
    pub fn cancel(&mut self) {
        self.session = self.session.wrapping_add(1);
        self.due = None;
    }

    fn fire_pending(&mut self, due: Instant) -> Result<()> {
        self.due = None;
        self.replay.step()?;
        self.schedule_from(due);
        Ok(())
    }

    fn schedule_from(&mut self, last: Instant) {
        self.due = self.replay.next_delay().map(|delay| last + delay);
    }
}
