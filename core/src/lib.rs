#![no_std]

extern crate alloc;

use chrono::{NaiveDate, TimeZone};
use core::fmt;
use core::ops::BitOr;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use leaderboard::*;
pub use replay::*;
pub use rng::*;
pub use types::*;

mod board;
mod cell;
mod engine;
mod error;
mod game;
mod generator;
mod leaderboard;
mod replay;
mod rng;
mod types;

/// Preset difficulties, plus `Custom` for any other board size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
    Custom,
}

impl Difficulty {
    pub const PRESETS: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    /// `(size, mines)` of a preset, `None` for `Custom`.
    pub const fn preset(self) -> Option<(Coord2, CellCount)> {
        match self {
            Self::Beginner => Some(((8, 8), 10)),
            Self::Intermediate => Some(((16, 16), 40)),
            Self::Expert => Some(((30, 16), 99)),
            Self::Custom => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        [Self::Beginner, Self::Intermediate, Self::Expert, Self::Custom]
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s))
            .ok_or(GameError::InvalidConfig)
    }
}

/// Where a board's seed came from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigKind {
    #[default]
    Random,
    Daily,
    Replay,
}

/// How far a reveal of a zero-valued cell cascades.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cascade {
    /// Connected zero cells plus the ring of numbered cells around them.
    #[default]
    Standard,
    /// Connected zero cells only; numbered cells stay hidden.
    ZeroOnly,
    /// Every safe cell connected to the clicked one, numbered or not.
    Unbounded,
}

impl Cascade {
    const fn is_standard(&self) -> bool {
        matches!(self, Self::Standard)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(rename = "id")]
    pub difficulty: Difficulty,
    pub x: Coord,
    pub y: Coord,
    pub mines: CellCount,
    pub seed: i64,
    #[serde(rename = "type")]
    pub kind: ConfigKind,
    #[serde(default, skip_serializing_if = "Cascade::is_standard")]
    pub cascade: Cascade,
}

impl BoardConfig {
    pub const fn new_unchecked(
        difficulty: Difficulty,
        (x, y): Coord2,
        mines: CellCount,
        seed: i64,
        kind: ConfigKind,
    ) -> Self {
        Self {
            difficulty,
            x,
            y,
            mines,
            seed,
            kind,
            cascade: Cascade::Standard,
        }
    }

    /// Custom board, clamping the size to at least 2 cells and the mines to
    /// `1..x*y`.
    pub fn custom((x, y): Coord2, mines: CellCount, seed: i64) -> Self {
        let x = x.clamp(1, Coord::MAX);
        let y = y.clamp(if x == 1 { 2 } else { 1 }, Coord::MAX);
        let mines = mines.clamp(1, mult(x, y) - 1);
        Self::new_unchecked(Difficulty::Custom, (x, y), mines, seed, ConfigKind::Random)
    }

    /// Preset board, `Custom` falls back to the beginner layout.
    pub fn preset(difficulty: Difficulty, seed: i64) -> Self {
        let (size, mines) = difficulty
            .preset()
            .unwrap_or(((8, 8), 10));
        Self::new_unchecked(difficulty, size, mines, seed, ConfigKind::Random)
    }

    /// Preset board with a seed jittered around `now_ms`.
    pub fn random<R: rand::Rng + ?Sized>(difficulty: Difficulty, now_ms: i64, rng: &mut R) -> Self {
        Self::preset(difficulty, now_ms + rng.random_range(-1000..=1000))
    }

    /// Daily challenge for `date`: intermediate board seeded with the
    /// timestamp of that day's midnight in `tz`.
    pub fn daily_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        let seed = tz
            .from_local_datetime(&midnight)
            .earliest()
            .map(|local| local.timestamp_millis())
            .unwrap_or_else(|| midnight.and_utc().timestamp_millis());
        Self::new_unchecked(
            Difficulty::Intermediate,
            (16, 16),
            40,
            seed,
            ConfigKind::Daily,
        )
    }

    pub const fn with_cascade(self, cascade: Cascade) -> Self {
        Self { cascade, ..self }
    }

    pub const fn with_kind(self, kind: ConfigKind) -> Self {
        Self { kind, ..self }
    }

    pub const fn size(&self) -> Coord2 {
        (self.x, self.y)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.x, self.y)
    }

    /// Mines that can actually be placed while keeping the first cell safe.
    pub const fn placeable_mines(&self) -> CellCount {
        let max = self.total_cells().saturating_sub(1);
        if self.mines > max { max } else { self.mines }
    }

    pub fn validate(&self) -> Result<()> {
        if self.x == 0 || self.y == 0 || self.total_cells() < 2 {
            return Err(GameError::InvalidConfig);
        }
        Ok(())
    }

    pub const fn is_replay(&self) -> bool {
        matches!(self.kind, ConfigKind::Replay)
    }

    /// Identity used to keep one leaderboard result per board.
    pub const fn identity(&self) -> (Difficulty, ConfigKind, i64) {
        (self.difficulty, self.kind, self.seed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Outcome of a reveal on a single board, before any game rule is applied.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    /// A flagged cell went back to hidden.
    Unflagged,
    Revealed,
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Unflagged => true,
            Revealed => true,
            HitMine => true,
        }
    }
}

/// Used to merge outcomes when several cells are opened at once.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (Unflagged, _) => Unflagged,
            (_, Unflagged) => Unflagged,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn presets_match_classic_sizes() {
        let expert = BoardConfig::preset(Difficulty::Expert, 7);
        assert_eq!(expert.size(), (30, 16));
        assert_eq!(expert.mines, 99);
        assert_eq!(expert.kind, ConfigKind::Random);
    }

    #[test]
    fn daily_seed_is_local_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let utc = BoardConfig::daily_in(date, &Utc);
        assert_eq!(utc.seed, 1_709_251_200_000);
        assert_eq!(utc.kind, ConfigKind::Daily);
        assert_eq!(utc.difficulty, Difficulty::Intermediate);

        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let local = BoardConfig::daily_in(date, &tokyo);
        assert_eq!(local.seed, utc.seed - 9 * 3_600_000);
        assert_eq!(BoardConfig::daily_in(date, &tokyo), local);
    }

    #[test]
    fn custom_boards_are_clamped() {
        let config = BoardConfig::custom((0, 0), 500, 1);
        assert_eq!(config.size(), (1, 2));
        assert_eq!(config.mines, 1);
        assert!(config.validate().is_ok());

        let config = BoardConfig::custom((10, 10), 0, 1);
        assert_eq!(config.mines, 1);
    }

    #[test]
    fn placeable_mines_leave_room_for_first_click() {
        let config = BoardConfig::new_unchecked(Difficulty::Custom, (3, 3), 20, 1, ConfigKind::Random);
        assert_eq!(config.placeable_mines(), 8);
    }

    #[test]
    fn config_serializes_with_stored_field_names() {
        let config = BoardConfig::preset(Difficulty::Beginner, 42);
        let json = serde_json::to_value(config).unwrap();

        assert_eq!(json["id"], "Beginner");
        assert_eq!(json["type"], "random");
        assert_eq!(json["x"], 8);
        assert!(json.get("cascade").is_none());

        let zero_only = config.with_cascade(Cascade::ZeroOnly);
        let json = serde_json::to_string(&zero_only).unwrap();
        assert_eq!(serde_json::from_str::<BoardConfig>(&json).unwrap(), zero_only);
    }

    #[test]
    fn random_seed_is_jittered_around_now() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);

        for _ in 0..100 {
            let config = BoardConfig::random(Difficulty::Expert, 1_000_000, &mut rng);
            assert!((999_000..=1_001_000).contains(&config.seed));
            assert_eq!(config.size(), (30, 16));
        }
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("expert".parse::<Difficulty>(), Ok(Difficulty::Expert));
        assert_eq!("nope".parse::<Difficulty>(), Err(GameError::InvalidConfig));
    }
}
