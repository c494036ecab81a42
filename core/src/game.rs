use alloc::vec::Vec;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Idle -> InProgress (start)
/// - InProgress -> InProgress (flag, reveal)
/// - InProgress -> Won
/// - InProgress -> Lost
/// - any -> Idle (new game)
/// - any -> InProgress (restart)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Idle,
    InProgress,
    Won,
    Lost,
}

impl Phase {
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    FlagCell,
    RevealCell,
}

/// A logged player action. `elapsed_ms` is the time since the previous
/// logged action, not a wall-clock time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedAction {
    pub kind: ActionKind,
    #[serde(rename = "cellId")]
    pub cell: CellId,
    pub elapsed_ms: u64,
}

impl TimedAction {
    pub const fn new(kind: ActionKind, cell: CellId, elapsed_ms: u64) -> Self {
        Self {
            kind,
            cell,
            elapsed_ms,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    NewGame,
    StartGame(BoardConfig),
    FlagCell(CellId),
    RevealCell(CellId),
}

/// Result of reducing one command: the next snapshot, plus the finished
/// game when this command ended a live game.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub finished: Option<FinishedGame>,
}

impl Transition {
    fn quiet(state: GameState) -> Self {
        Self {
            state,
            finished: None,
        }
    }
}

/// Immutable snapshot of one game. Every transition builds a new snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    board: Option<Board>,
    config: Option<BoardConfig>,
    actions: Vec<TimedAction>,
    start_date: Option<NaiveDate>,
    start_time: Option<DateTime<Utc>>,
    finish_time: Option<DateTime<Utc>>,
    phase: Phase,
    mines_placed: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn config(&self) -> Option<&BoardConfig> {
        self.config.as_ref()
    }

    pub fn actions(&self) -> &[TimedAction] {
        &self.actions
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.finish_time
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    /// Milliseconds played so far, 0 if the clock hasn't started.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        match self.start_time {
            Some(start_time) => (self.finish_time.unwrap_or(now) - start_time)
                .num_milliseconds()
                .max(0) as u64,
            None => 0,
        }
    }

    /// Mines minus flags, negative when over-flagged.
    pub fn mines_left(&self) -> isize {
        match (&self.board, &self.config) {
            (Some(board), Some(config)) => {
                config.placeable_mines() as isize
                    - board.count_in_state(CellState::Flagged) as isize
            }
            _ => 0,
        }
    }

    pub fn reduce(&self, command: Command, now: DateTime<Utc>) -> Result<Transition> {
        match command {
            Command::NewGame => Ok(Transition::quiet(Self::new())),
            Command::StartGame(config) => {
                config.validate()?;
                Ok(Transition::quiet(Self::started(config, now)))
            }
            Command::FlagCell(id) => self.flag(id, now),
            Command::RevealCell(id) => self.reveal(id, now),
        }
    }

    fn started(config: BoardConfig, now: DateTime<Utc>) -> Self {
        log::debug!("Starting {} game with seed {}", config.difficulty, config.seed);
        Self {
            board: Some(Board::empty(config.size())),
            config: Some(config),
            actions: Vec::new(),
            start_date: Some(now.date_naive()),
            start_time: None,
            finish_time: None,
            phase: Phase::InProgress,
            mines_placed: false,
        }
    }

    fn check_playable(&self) -> Result<()> {
        if self.board.is_none() || self.config.is_none() {
            return Err(GameError::NotStarted);
        }
        if self.phase.is_finished() {
            return Err(GameError::AlreadyEnded);
        }
        Ok(())
    }

    fn flag(&self, id: CellId, now: DateTime<Utc>) -> Result<Transition> {
        self.check_playable()?;

        let mut next = self.clone();
        next.board_mut()?.toggle_flag(id)?;
        next.log_action(ActionKind::FlagCell, id, now);
        Ok(Transition::quiet(next))
    }

    fn reveal(&self, id: CellId, now: DateTime<Utc>) -> Result<Transition> {
        self.check_playable()?;

        let mut next = self.clone();
        next.apply_reveal(id)?;
        next.log_action(ActionKind::RevealCell, id, now);

        let finished = match next.settle() {
            Some(outcome) => {
                next.finish_time = Some(now);
                log::debug!("Game ended {:?} after {} ms", outcome, next.elapsed_ms(now));
                next.finished_game(outcome)
            }
            None => None,
        };

        Ok(Transition {
            state: next,
            finished,
        })
    }

    /// Initial snapshot of a replay: the recorded log, the recorded times and
    /// the board already mined from the first recorded reveal.
    pub fn for_replay(item: &LeaderboardItem) -> Result<Self> {
        let first = item.first_reveal().ok_or(GameError::MissingInitialReveal)?;
        let config = item.board_configuration.with_kind(ConfigKind::Replay);
        config.validate()?;
        let board = place_mines(&config, Board::empty(config.size()), first)?;

        Ok(Self {
            board: Some(board),
            config: Some(config),
            actions: item.actions.clone(),
            start_date: Some(item.start_date),
            start_time: Some(item.start_time),
            finish_time: Some(item.finish_time),
            phase: Phase::InProgress,
            mines_placed: true,
        })
    }

    /// Applies a recorded action without logging it or emitting a result.
    pub fn replayed(&self, action: &TimedAction) -> Result<Self> {
        let mut next = self.clone();
        match action.kind {
            ActionKind::FlagCell => {
                next.board_mut()?.toggle_flag(action.cell)?;
            }
            ActionKind::RevealCell => {
                next.apply_reveal(action.cell)?;
                next.settle();
            }
        }
        Ok(next)
    }

    fn board_mut(&mut self) -> Result<&mut Board> {
        self.board.as_mut().ok_or(GameError::NotStarted)
    }

    /// Reveals `id`, placing the mines first if this is the first reveal.
    fn apply_reveal(&mut self, id: CellId) -> Result<RevealOutcome> {
        let config = self.config.ok_or(GameError::NotStarted)?;
        let board = self.board.take().ok_or(GameError::NotStarted)?;
        board.validate(id)?;

        let mut board = if self.mines_placed {
            board
        } else {
            self.mines_placed = true;
            place_mines(&config, board, id)?
        };
        let outcome = board.reveal(id, config.cascade);
        self.board = Some(board);
        outcome
    }

    /// Checks for a terminal board, flagging leftover mines on a win and
    /// showing every mine on a loss.
    fn settle(&mut self) -> Option<Phase> {
        let board = self.board.as_mut()?;

        let outcome = if board.has_revealed_mine() {
            board.reveal_all_mines();
            Phase::Lost
        } else if board.all_safe_revealed() {
            board.flag_remaining_mines();
            Phase::Won
        } else {
            return None;
        };

        self.phase = outcome;
        Some(outcome)
    }

    fn log_action(&mut self, kind: ActionKind, cell: CellId, now: DateTime<Utc>) {
        let elapsed_ms = match self.start_time {
            Some(start_time) => {
                let logged: u64 = self.actions.iter().map(|action| action.elapsed_ms).sum();
                let total = (now - start_time).num_milliseconds().max(0) as u64;
                total.saturating_sub(logged)
            }
            None => 0,
        };
        self.start_time.get_or_insert(now);
        self.actions.push(TimedAction::new(kind, cell, elapsed_ms));
    }

    /// Record of a finished game, `None` while it is still being played.
    pub fn leaderboard_item(&self) -> Option<LeaderboardItem> {
        Some(LeaderboardItem {
            board_configuration: self.config?,
            actions: self.actions.clone(),
            start_date: self.start_date?,
            start_time: self.start_time?,
            finish_time: self.finish_time?,
        })
    }

    fn finished_game(&self, outcome: Phase) -> Option<FinishedGame> {
        if self.config?.is_replay() {
            return None;
        }
        Some(FinishedGame {
            item: self.leaderboard_item()?,
            outcome,
        })
    }
}

/// Live game driven by a player, forwarding finished games to `sink` and
/// hosting at most one replay at a time.
#[derive(Debug)]
pub struct Game<S: LeaderboardSink> {
    state: GameState,
    replay: Option<ReplayTimeline>,
    sink: S,
}

impl<S: LeaderboardSink> Game<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: GameState::new(),
            replay: None,
            sink,
        }
    }

    /// The snapshot to show: the replay's while one is loaded.
    pub fn state(&self) -> &GameState {
        match &self.replay {
            Some(timeline) => timeline.replay().state(),
            None => &self.state,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn replay(&self) -> Option<&ReplayTimeline> {
        self.replay.as_ref()
    }

    pub fn replay_mut(&mut self) -> Option<&mut ReplayTimeline> {
        self.replay.as_mut()
    }

    pub fn new_game(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.dispatch(Command::NewGame, now)
    }

    /// Starts a fresh board. Daily boards open their first cell right away.
    pub fn start_game(&mut self, config: BoardConfig, now: DateTime<Utc>) -> Result<()> {
        self.dispatch(Command::StartGame(config), now)?;
        if config.kind == ConfigKind::Daily {
            let first = self.state.board().map(Board::first_cell).ok_or(GameError::NotStarted)?;
            self.dispatch(Command::RevealCell(first), now)?;
        }
        Ok(())
    }

    pub fn flag_cell(&mut self, id: CellId, now: DateTime<Utc>) -> Result<()> {
        self.dispatch(Command::FlagCell(id), now)
    }

    pub fn reveal_cell(&mut self, id: CellId, now: DateTime<Utc>) -> Result<()> {
        self.dispatch(Command::RevealCell(id), now)
    }

    /// Loads `item` for replay, discarding any replay in progress.
    pub fn start_replay(&mut self, item: LeaderboardItem, now: web_time::Instant) -> Result<()> {
        let timeline = ReplayTimeline::new(Replay::start(item)?, now);
        if self.replay.replace(timeline).is_some() {
            log::debug!("Previous replay discarded");
        }
        Ok(())
    }

    pub fn restart_replay(&mut self, now: web_time::Instant) -> Result<()> {
        self.replay
            .as_mut()
            .ok_or(GameError::NotReplaying)?
            .restart(now)
    }

    fn dispatch(&mut self, command: Command, now: DateTime<Utc>) -> Result<()> {
        if self.replay.take().is_some() {
            log::debug!("Replay cancelled by {:?}", command);
        }

        let Transition { state, finished } = self.state.reduce(command, now)?;
        self.state = state;

        if let Some(finished) = finished {
            if let Err(err) = self.sink.record(&finished) {
                log::warn!("Could not record finished game: {}", err);
            }
        }
        Ok(())
    }
}
