use alloc::vec::Vec;
use chrono::{DateTime, NaiveDate, Utc};
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Snapshot of a finished game: everything needed to rank it and to replay it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardItem {
    pub board_configuration: BoardConfig,
    pub actions: Vec<TimedAction>,
    /// Calendar day the game started on, used to tell daily challenges apart.
    pub start_date: NaiveDate,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finish_time: DateTime<Utc>,
}

impl LeaderboardItem {
    /// Completion time in milliseconds, never negative.
    pub fn elapsed_ms(&self) -> u64 {
        (self.finish_time - self.start_time)
            .num_milliseconds()
            .max(0) as u64
    }

    /// Cell of the first reveal, which keys mine placement.
    pub fn first_reveal(&self) -> Option<CellId> {
        self.actions
            .iter()
            .find(|action| action.kind == ActionKind::RevealCell)
            .map(|action| action.cell)
    }
}

/// Terminal result of a live game, handed to the leaderboard collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedGame {
    pub item: LeaderboardItem,
    pub outcome: Phase,
}

impl FinishedGame {
    pub const fn is_win(&self) -> bool {
        matches!(self.outcome, Phase::Won)
    }
}

/// Receives finished games. Failures are reported back but never stop play.
pub trait LeaderboardSink {
    type Error: fmt::Display;

    fn record(&mut self, game: &FinishedGame) -> core::result::Result<(), Self::Error>;
}

/// Sink that keeps every finished game in memory.
impl LeaderboardSink for Vec<FinishedGame> {
    type Error = core::convert::Infallible;

    fn record(&mut self, game: &FinishedGame) -> core::result::Result<(), Self::Error> {
        self.push(game.clone());
        Ok(())
    }
}

/// Sink that drops every finished game.
impl LeaderboardSink for () {
    type Error = core::convert::Infallible;

    fn record(&mut self, _game: &FinishedGame) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn item() -> LeaderboardItem {
        LeaderboardItem {
            board_configuration: BoardConfig::preset(Difficulty::Beginner, 42),
            actions: vec![
                TimedAction::new(ActionKind::FlagCell, CellId::new(1, 1), 0),
                TimedAction::new(ActionKind::RevealCell, CellId::new(3, 4), 250),
            ],
            start_date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            start_time: DateTime::from_timestamp_millis(1_715_000_000_000).unwrap(),
            finish_time: DateTime::from_timestamp_millis(1_715_000_012_345).unwrap(),
        }
    }

    #[test]
    fn elapsed_is_finish_minus_start() {
        assert_eq!(item().elapsed_ms(), 12_345);
    }

    #[test]
    fn first_reveal_skips_leading_flags() {
        assert_eq!(item().first_reveal(), Some(CellId::new(3, 4)));
    }

    #[test]
    fn serializes_with_millisecond_timestamps() {
        let json = serde_json::to_value(item()).unwrap();

        assert_eq!(json["startTime"], 1_715_000_000_000i64);
        assert_eq!(json["startDate"], "2024-05-06");
        assert_eq!(json["actions"][1]["kind"], "revealCell");
        assert_eq!(json["actions"][1]["cellId"], "3,4");
        assert_eq!(serde_json::from_value::<LeaderboardItem>(json).unwrap(), item());
    }
}
