use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::{Error, Result};
use crate::keys::{Identity, Share};
use crate::repository::{HashMapShareEntryDao, ShareEntry, ShareEntryDaoTrait, SledShareEntryDao};

/// A member's private share store, shared between the member and the tasks
/// delivering to it. The mutex serializes every write to one member.
pub type Dao = Arc<Mutex<Box<dyn ShareEntryDaoTrait>>>;

/// Executes the share registration logic.
///
/// The share is stored under the minipool address. The store refuses a second
/// share for the same minipool, which makes concurrent deliveries to one member
/// safe: exactly one of them wins.
///
/// # Arguments
/// * `subject` - The minipool address the share belongs to.
/// * `member` - The identity of the member owning `dao`.
/// * `share` - The key share to store.
/// * `threshold` - The reconstruction threshold, kept alongside the share.
/// * `dao` - The member's private store.
pub fn execute_register_share(
    subject: &str,
    member: Identity,
    share: &Share,
    threshold: usize,
    dao: &Dao,
) -> Result<()> {
    let entry = ShareEntry::new(subject, share, threshold);
    dao.lock()
        .map_err(|_| Error::Storage(format!("store of member {member} poisoned")))?
        .insert(subject, &entry)?;
    debug!("Registered share of member {} for minipool {:?}", member, subject);
    Ok(())
}

/// Executes the logic to read a member's share for a minipool.
///
/// # Returns
/// The share and the threshold it was split with, or `None` if the member holds
/// no share for `subject`.
pub fn execute_get_share(
    subject: &str,
    member: Identity,
    dao: &Dao,
) -> Result<Option<(Share, usize)>> {
    let entry = dao
        .lock()
        .map_err(|_| Error::Storage(format!("store of member {member} poisoned")))?
        .get(subject)?;

    match entry {
        Some(entry) => {
            let share = entry.to_share()?;
            if share.identity() != member {
                return Err(Error::Storage(format!(
                    "store of member {member} holds a share for member {}",
                    share.identity()
                )));
            }
            Ok(Some((share, entry.threshold())))
        }
        None => Ok(None),
    }
}

/// Creates and returns a DAO instance based on the specified database path.
///
/// If a path is provided, a Sled database DAO is created; otherwise, an in-memory HashMap
/// DAO is used.
pub fn dao(db_path: Option<&Path>) -> Result<Dao> {
    let dao: Dao = match db_path {
        Some(path) => {
            debug!("Using Sled DB at {:?}", path);
            let path = path
                .to_str()
                .ok_or_else(|| Error::Storage(format!("non UTF-8 database path {path:?}")))?;
            Arc::new(Mutex::new(Box::new(SledShareEntryDao::new(path)?)))
        }
        None => {
            debug!("Using HashMap DB");
            Arc::new(Mutex::new(Box::new(HashMapShareEntryDao {
                map: Mutex::new(HashMap::new()),
            })))
        }
    };
    Ok(dao)
}

#[cfg(test)]
mod tests {
    use bls12_381::Scalar;

    use super::*;

    #[test]
    fn test_register_then_get() {
        let dao = dao(None).unwrap();
        let member = Identity::new(3).unwrap();
        let share = Share::new(member, Scalar::from(99u64));

        assert_eq!(execute_get_share("0xdeadbeef", member, &dao).unwrap(), None);
        execute_register_share("0xdeadbeef", member, &share, 2, &dao).unwrap();
        assert_eq!(
            execute_get_share("0xdeadbeef", member, &dao).unwrap(),
            Some((share.clone(), 2))
        );
        assert!(matches!(
            execute_register_share("0xdeadbeef", member, &share, 2, &dao),
            Err(Error::DuplicateShare { .. })
        ));
    }

    #[test]
    fn test_get_share_checks_owner() {
        let dao = dao(None).unwrap();
        let owner = Identity::new(1).unwrap();
        let share = Share::new(owner, Scalar::from(5u64));
        execute_register_share("0x01", owner, &share, 2, &dao).unwrap();

        let other = Identity::new(2).unwrap();
        assert!(execute_get_share("0x01", other, &dao).is_err());
    }
}
