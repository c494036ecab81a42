use chrono::{DateTime, NaiveDate, Utc};
use dailymines_core::{BoardConfig, GameError, LeaderboardItem};
use serde::{Deserialize, Serialize};

use crate::*;

/// Leaderboard item as persisted and shared, with the action log in its
/// compact string form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGame {
    pub board_configuration: BoardConfig,
    pub actions: String,
    pub start_date: NaiveDate,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finish_time: DateTime<Utc>,
}

impl StoredGame {
    pub fn from_json(raw: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes the action log and checks the configuration. A log without a
    /// reveal cannot be replayed and is rejected.
    pub fn into_item(self) -> Result<LeaderboardItem, CodecError> {
        self.board_configuration.validate()?;
        let item = LeaderboardItem {
            board_configuration: self.board_configuration,
            actions: decode_actions(&self.actions)?,
            start_date: self.start_date,
            start_time: self.start_time,
            finish_time: self.finish_time,
        };
        if item.first_reveal().is_none() {
            return Err(GameError::MissingInitialReveal.into());
        }
        Ok(item)
    }
}

impl From<&LeaderboardItem> for StoredGame {
    fn from(item: &LeaderboardItem) -> Self {
        Self {
            board_configuration: item.board_configuration,
            actions: encode_actions(&item.actions),
            start_date: item.start_date,
            start_time: item.start_time,
            finish_time: item.finish_time,
        }
    }
}

impl TryFrom<StoredGame> for LeaderboardItem {
    type Error = CodecError;

    fn try_from(stored: StoredGame) -> Result<Self, Self::Error> {
        stored.into_item()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailymines_core::{ActionKind, CellId, Difficulty, TimedAction};

    fn item() -> LeaderboardItem {
        LeaderboardItem {
            board_configuration: BoardConfig::preset(Difficulty::Expert, 99),
            actions: vec![
                TimedAction::new(ActionKind::RevealCell, CellId::new(5, 5), 0),
                TimedAction::new(ActionKind::FlagCell, CellId::new(6, 5), 830),
            ],
            start_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            start_time: DateTime::from_timestamp_millis(1_704_000_000_000).unwrap(),
            finish_time: DateTime::from_timestamp_millis(1_704_000_075_000).unwrap(),
        }
    }

    #[test]
    fn stores_actions_as_compact_string() {
        let json: serde_json::Value =
            serde_json::from_str(&StoredGame::from(&item()).to_json().unwrap()).unwrap();

        assert_eq!(json["actions"], "r-5,5-0;f-6,5-830");
        assert_eq!(json["boardConfiguration"]["id"], "Expert");
        assert_eq!(json["boardConfiguration"]["type"], "random");
        assert_eq!(json["finishTime"], 1_704_000_075_000i64);
        assert_eq!(json["startDate"], "2023-12-31");
    }

    #[test]
    fn decodes_back_to_item() {
        let raw = StoredGame::from(&item()).to_json().unwrap();
        let decoded = StoredGame::from_json(&raw).unwrap().into_item().unwrap();

        assert_eq!(decoded, item());
    }

    #[test]
    fn bad_action_log_fails_the_entry() {
        let mut stored = StoredGame::from(&item());
        stored.actions.push_str(";r-9,9-later");

        assert!(matches!(
            LeaderboardItem::try_from(stored),
            Err(CodecError::InvalidElapsed(_))
        ));
    }

    #[test]
    fn log_without_a_reveal_is_rejected() {
        for actions in ["", "f-1,1-0;f-2,2-300"] {
            let mut stored = StoredGame::from(&item());
            stored.actions = actions.to_owned();

            assert!(matches!(
                stored.into_item(),
                Err(CodecError::Game(GameError::MissingInitialReveal))
            ));
        }
    }
}
