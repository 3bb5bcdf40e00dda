use serde::{Deserialize, Serialize};
use sled::Db;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::keys::{Identity, Share};

/// Represents a key share held by a committee member for one minipool.
///
/// # Fields
///
/// * `subject` - The minipool address the share belongs to.
/// * `share` - A tuple containing the member identity and the raw 32-byte share.
/// * `threshold` - The number of shares needed to rebuild the validator key.
///
/// # Examples
///
/// ```rust
/// use splitkey::repository::ShareEntry;
///
/// let share_entry = ShareEntry {
///     subject: "0xdeadbeef".to_string(),
///     share: (1, vec![0u8; 32]),
///     threshold: 3,
/// };
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShareEntry {
    pub subject: String,
    pub share: (u64, Vec<u8>),
    pub threshold: u64,
}

impl ShareEntry {
    pub fn new(subject: &str, share: &Share, threshold: usize) -> Self {
        ShareEntry {
            subject: subject.to_string(),
            share: (share.identity().value(), share.to_bytes().to_vec()),
            threshold: threshold as u64,
        }
    }

    /// Number of shares needed to rebuild the validator key.
    pub fn threshold(&self) -> usize {
        self.threshold as usize
    }

    /// Decodes the stored share.
    pub fn to_share(&self) -> Result<Share> {
        Share::from_bytes(Identity::new(self.share.0)?, &self.share.1)
    }
}

/// Defines the Data Access Object (DAO) trait for `ShareEntry`.
///
/// A member's store is append-only: a share, once committed for a minipool, is
/// never replaced or removed.
pub trait ShareEntryDaoTrait: Send + Sync {
    /// Inserts a `ShareEntry` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateShare` if an entry already exists under `key`.
    fn insert(&self, key: &str, entry: &ShareEntry) -> Result<()>;

    /// Retrieves a `ShareEntry` by its key. `None` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<ShareEntry>>;
}

fn duplicate(key: &str, entry: &ShareEntry) -> Error {
    match Identity::new(entry.share.0) {
        Ok(member) => Error::DuplicateShare {
            subject: key.to_string(),
            member,
        },
        Err(err) => err,
    }
}

/// A `ShareEntryDaoTrait` implementation using Sled, an embedded database.
pub struct SledShareEntryDao {
    db: Db,
}

impl SledShareEntryDao {
    /// Opens (or creates) the sled database at `db_path`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use splitkey::repository::SledShareEntryDao;
    ///
    /// let dao = SledShareEntryDao::new("path/to/db").unwrap();
    /// ```
    pub fn new(db_path: &str) -> Result<Self> {
        let db = sled::open(db_path)?;
        Ok(SledShareEntryDao { db })
    }

    /// Opens a sled database that is removed when dropped.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(SledShareEntryDao { db })
    }
}

impl ShareEntryDaoTrait for SledShareEntryDao {
    /// Serializes the entry to JSON and stores it, unless the key is taken.
    ///
    /// The compare-and-swap against an absent value makes the duplicate check and
    /// the write a single atomic step.
    fn insert(&self, key: &str, entry: &ShareEntry) -> Result<()> {
        let serialized = serde_json::to_string(entry)?;
        match self
            .db
            .compare_and_swap(key, None::<&[u8]>, Some(serialized.as_bytes()))?
        {
            Ok(()) => {
                self.db.flush()?;
                Ok(())
            }
            Err(_) => Err(duplicate(key, entry)),
        }
    }

    fn get(&self, key: &str) -> Result<Option<ShareEntry>> {
        if let Some(found) = self.db.get(key)? {
            let entry: ShareEntry = serde_json::from_slice(&found)?;
            Ok(Some(entry))
        } else {
            Ok(None)
        }
    }
}

/// In-memory `ShareEntryDaoTrait` implementation.
#[derive(Default)]
pub struct HashMapShareEntryDao {
    pub map: Mutex<HashMap<String, ShareEntry>>,
}

impl ShareEntryDaoTrait for HashMapShareEntryDao {
    fn insert(&self, key: &str, entry: &ShareEntry) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| Error::Storage("share map lock poisoned".into()))?;
        if map.contains_key(key) {
            return Err(duplicate(key, entry));
        }
        map.insert(key.to_string(), entry.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<ShareEntry>> {
        let map = self
            .map
            .lock()
            .map_err(|_| Error::Storage("share map lock poisoned".into()))?;
        Ok(map.get(key).cloned())
    }
}
