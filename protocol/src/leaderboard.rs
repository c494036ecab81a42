use dailymines_core::{BoardConfig, ConfigKind, Difficulty, FinishedGame, LeaderboardItem, LeaderboardSink};

use crate::*;

/// Best completion per board, fastest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Leaderboard {
    items: Vec<LeaderboardItem>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the stored blob, empty when missing or unreadable.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        <Self as StorageKey>::load(store).unwrap_or_default()
    }

    /// Parses a JSON array of stored games, dropping every entry that fails
    /// to decode.
    pub fn from_json(raw: &str) -> Result<Self, CodecError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(raw)?;
        let mut leaderboard = Self::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let item = serde_json::from_value::<StoredGame>(entry)
                .map_err(CodecError::from)
                .and_then(StoredGame::into_item);
            match item {
                Ok(item) => {
                    leaderboard.record(item);
                }
                Err(err) => log::warn!("Dropping leaderboard entry {}: {}", index, err),
            }
        }

        Ok(leaderboard)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(&self.stored())?)
    }

    fn stored(&self) -> Vec<StoredGame> {
        self.items.iter().map(StoredGame::from).collect()
    }

    pub fn items(&self) -> &[LeaderboardItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `item` unless a faster result for the same board is already
    /// kept. Returns whether the leaderboard changed.
    pub fn record(&mut self, item: LeaderboardItem) -> bool {
        let identity = item.board_configuration.identity();
        let existing = self
            .items
            .iter()
            .position(|kept| kept.board_configuration.identity() == identity);

        if let Some(index) = existing {
            if self.items[index].elapsed_ms() <= item.elapsed_ms() {
                return false;
            }
            self.items.remove(index);
        }

        let at = self
            .items
            .partition_point(|kept| kept.elapsed_ms() <= item.elapsed_ms());
        self.items.insert(at, item);
        true
    }

    pub fn fastest(&self, difficulty: Difficulty, limit: usize) -> Vec<&LeaderboardItem> {
        self.items
            .iter()
            .filter(|item| item.board_configuration.difficulty == difficulty)
            .take(limit)
            .collect()
    }

    /// Best result on the daily board `daily`, matched by seed so the
    /// recorded start date's time zone does not matter.
    pub fn fastest_daily(&self, daily: &BoardConfig) -> Option<&LeaderboardItem> {
        if daily.kind != ConfigKind::Daily {
            return None;
        }
        let identity = daily.identity();
        self.items
            .iter()
            .find(|item| item.board_configuration.identity() == identity)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        StorageKey::save(self, store)
    }
}

impl StorageKey for Leaderboard {
    const KEY: &'static str = "leaderboard";

    fn decode(raw: &str) -> Option<Self> {
        Self::from_json(raw).ok()
    }

    fn encode(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.stored())?)
    }
}

/// Sink that keeps won games in the store's leaderboard.
#[derive(Debug)]
pub struct StoreRecorder<S> {
    store: S,
}

impl<S: KeyValueStore> StoreRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: KeyValueStore> LeaderboardSink for StoreRecorder<S> {
    type Error = StoreError;

    fn record(&mut self, game: &FinishedGame) -> Result<(), Self::Error> {
        if !game.is_win() {
            return Ok(());
        }

        let mut leaderboard = Leaderboard::load(&self.store);
        if leaderboard.record(game.item.clone()) {
            log::debug!(
                "New best {} time: {} ms",
                game.item.board_configuration.difficulty,
                game.item.elapsed_ms()
            );
            leaderboard.save(&mut self.store)?;
        }
        Ok(())
    }
}
