use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Where the best score lives between rounds and page loads.
///
/// Both operations are best-effort: `load` falls back to 0 and `save` never
/// reports failure to the caller.
pub trait HighScoreStore {
    fn load(&self) -> u32;
    fn save(&self, score: u32);
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for Box<S> {
    fn load(&self) -> u32 {
        (**self).load()
    }

    fn save(&self, score: u32) {
        (**self).save(score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Unavailable,
    Rejected,
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "local storage is unavailable"),
            StoreError::Rejected => write!(f, "local storage rejected the write"),
            StoreError::Corrupt(raw) => write!(f, "stored high score {:?} is not a number", raw),
        }
    }
}

impl std::error::Error for StoreError {}

/// Stored values are the plain decimal text, e.g. `"120"`.
pub fn parse_high_score(raw: &str) -> Result<u32, StoreError> {
    serde_json::from_str::<u32>(raw.trim()).map_err(|_| StoreError::Corrupt(raw.to_string()))
}

pub fn encode_high_score(score: u32) -> String {
    score.to_string()
}

/// Browser `localStorage` under a single key.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
    key: String,
}

impl LocalStorageStore {
    pub fn open(key: &str) -> Result<Self, StoreError> {
        let window = web_sys::window().ok_or(StoreError::Unavailable)?;
        let storage = window
            .local_storage()
            .map_err(|_| StoreError::Unavailable)?
            .ok_or(StoreError::Unavailable)?;
        Ok(Self {
            storage,
            key: key.to_string(),
        })
    }

    fn try_load(&self) -> Result<u32, StoreError> {
        match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => parse_high_score(&raw),
            Ok(None) => Ok(0),
            Err(_) => Err(StoreError::Unavailable),
        }
    }

    fn try_save(&self, score: u32) -> Result<(), StoreError> {
        self.storage
            .set_item(&self.key, &encode_high_score(score))
            .map_err(|_| StoreError::Rejected)
    }
}

impl HighScoreStore for LocalStorageStore {
    fn load(&self) -> u32 {
        self.try_load().unwrap_or_else(|err| {
            log::warn!("Could not load high score: {}", err);
            0
        })
    }

    fn save(&self, score: u32) {
        if let Err(err) = self.try_save(score) {
            log::warn!("Could not save high score {}: {}", score, err);
        }
    }
}

/// In-memory store. Clones share the same slot, so a test can keep a handle
/// and inspect what the simulation wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Rc<Cell<u32>>,
    writes: Rc<Cell<u32>>,
}

impl MemoryStore {
    pub fn with_value(score: u32) -> Self {
        let store = Self::default();
        store.value.set(score);
        store
    }

    pub fn value(&self) -> u32 {
        self.value.get()
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.value.get()
    }

    fn save(&self, score: u32) {
        self.value.set(score);
        self.writes.set(self.writes.get() + 1);
    }
}
