use hashbrown::HashMap;

use crate::*;

/// String key-value storage, the only persistence the game needs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Value persisted under a fixed key.
pub trait StorageKey: Sized + Default {
    const KEY: &'static str;

    fn decode(raw: &str) -> Option<Self>;
    fn encode(&self) -> Result<String, StoreError>;

    /// Stored value, `None` when missing or unreadable.
    fn load<S: KeyValueStore + ?Sized>(store: &S) -> Option<Self> {
        let raw = store.get(Self::KEY)?;
        let value = Self::decode(&raw);
        if value.is_none() {
            log::warn!("Ignoring unreadable value stored under {:?}", Self::KEY);
        }
        value
    }

    /// Stored value, or the default written back in its place.
    fn load_or_default<S: KeyValueStore + ?Sized>(store: &mut S) -> Self {
        if let Some(value) = Self::load(store) {
            return value;
        }
        let value = Self::default();
        if let Err(err) = value.save(store) {
            log::warn!("Could not save default {:?}: {}", Self::KEY, err);
        }
        value
    }

    fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.set(Self::KEY, &self.encode()?)
    }
}

/// In-memory store, optionally refusing every write like a full or disabled
/// browser storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Unavailable);
        }
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Volume(u8);

    impl StorageKey for Volume {
        const KEY: &'static str = "volume";

        fn decode(raw: &str) -> Option<Self> {
            raw.parse().ok().map(Self)
        }

        fn encode(&self) -> Result<String, StoreError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn missing_value_writes_default_back() {
        let mut store = MemoryStore::new();

        assert_eq!(Volume::load_or_default(&mut store), Volume(0));
        assert_eq!(store.get("volume").as_deref(), Some("0"));
    }

    #[test]
    fn corrupt_value_falls_back() {
        let mut store = MemoryStore::new().with("volume", "loud");

        assert_eq!(Volume::load(&store), None);
        assert_eq!(Volume::load_or_default(&mut store), Volume(0));
    }

    #[test]
    fn read_only_store_still_loads() {
        let mut store = MemoryStore::read_only();

        assert_eq!(Volume::load_or_default(&mut store), Volume(0));
        assert!(matches!(Volume(3).save(&mut store), Err(StoreError::Unavailable)));
        assert!(store.is_empty());
    }
}
