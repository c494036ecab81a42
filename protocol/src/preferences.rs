use core::fmt;
use dailymines_core::{Coord, Difficulty};
use serde::{Deserialize, Serialize};

use crate::*;

impl StorageKey for Difficulty {
    const KEY: &'static str = "difficulty";

    fn decode(raw: &str) -> Option<Self> {
        Self::PRESETS.into_iter().find(|preset| preset.name() == raw)
    }

    fn encode(&self) -> Result<String, StoreError> {
        Ok(self.name().to_owned())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
}

impl Language {
    pub const ALL: [Language; 3] = [Self::En, Self::Es, Self::Fr];

    pub const fn code(self) -> &'static str {
        use Language::*;
        match self {
            En => "en",
            Es => "es",
            Fr => "fr",
        }
    }

    pub const fn name(self) -> &'static str {
        use Language::*;
        match self {
            En => "English",
            Es => "Español",
            Fr => "Français",
        }
    }

    /// Matches on the first two letters, so `fr-CA` reads as French.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let prefix = tag.get(..2)?.to_ascii_lowercase();
        Self::ALL.into_iter().find(|language| language.code() == prefix)
    }

    /// First supported language among the stored one and `preferred`.
    pub fn negotiate<'a>(stored: Option<&'a str>, preferred: impl IntoIterator<Item = &'a str>) -> Self {
        stored
            .into_iter()
            .chain(preferred)
            .find_map(Self::from_tag)
            .unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl StorageKey for Language {
    const KEY: &'static str = "language";

    fn decode(raw: &str) -> Option<Self> {
        Self::from_tag(raw)
    }

    fn encode(&self) -> Result<String, StoreError> {
        Ok(self.code().to_owned())
    }
}

/// Side length of a custom square board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoardSize(Coord);

impl BoardSize {
    pub const MIN: Coord = 8;
    pub const MAX: Coord = 24;

    pub fn new(size: Coord) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&size).then_some(Self(size))
    }

    pub const fn get(self) -> Coord {
        self.0
    }
}

/// Halfway between the smallest and largest size.
impl Default for BoardSize {
    fn default() -> Self {
        Self(Self::MIN + (Self::MAX - Self::MIN) / 2)
    }
}

impl StorageKey for BoardSize {
    const KEY: &'static str = "boardSize";

    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok().and_then(Self::new)
    }

    fn encode(&self) -> Result<String, StoreError> {
        Ok(self.0.to_string())
    }
}

/// Everything remembered between sessions apart from the leaderboard.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Preferences {
    pub difficulty: Difficulty,
    pub language: Language,
    pub board_size: BoardSize,
}

impl Preferences {
    /// Reads every preference, storing the default for any that is missing
    /// or unreadable.
    pub fn load<S: KeyValueStore + ?Sized>(store: &mut S) -> Self {
        Self {
            difficulty: Difficulty::load_or_default(store),
            language: Language::load_or_default(store),
            board_size: BoardSize::load_or_default(store),
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        self.difficulty.save(store)?;
        self.language.save(store)?;
        self.board_size.save(store)
    }
}
