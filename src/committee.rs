use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::keys::{Identity, Share, ShareSet};
use crate::provider::{dao, execute_get_share, execute_register_share, Dao};
use crate::selection::SelectionPolicy;

/// A committee member and its private share store.
///
/// The store is keyed by minipool address and holds at most one share per minipool.
/// Nothing outside the member reads or writes it directly.
pub struct CommitteeMember {
    id: Identity,
    dao: Dao,
}

impl CommitteeMember {
    pub fn new(id: Identity, dao: Dao) -> Self {
        CommitteeMember { id, dao }
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    /// Commits a share for `subject`, split with `threshold`. A second share for the
    /// same subject is refused.
    pub fn set_key_share(&self, subject: &str, share: &Share, threshold: usize) -> Result<()> {
        if share.identity() != self.id {
            return Err(Error::InvalidIdentity(format!(
                "share for member {} delivered to member {}",
                share.identity(),
                self.id
            )));
        }
        execute_register_share(subject, self.id, share, threshold, &self.dao)
    }

    /// The member's share for `subject`, if it holds one.
    pub fn key_share(&self, subject: &str) -> Result<Option<Share>> {
        Ok(self.held_share(subject)?.map(|(share, _)| share))
    }

    /// The member's share for `subject` together with the threshold it was split with.
    pub fn held_share(&self, subject: &str) -> Result<Option<(Share, usize)>> {
        execute_get_share(subject, self.id, &self.dao)
    }
}

/// Outcome of distributing one minipool's shares.
///
/// Every share ends up either delivered or listed with the reason it failed.
#[derive(Debug, Default)]
pub struct DistributionReport {
    pub delivered: Vec<Identity>,
    pub failures: Vec<(Identity, Error)>,
}

impl DistributionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The fixed committee holding validator key shares.
///
/// The committee is only a roster: every minipool brings its own threshold.
pub struct Committee {
    members: BTreeMap<Identity, Arc<CommitteeMember>>,
}

impl Committee {
    /// Creates a committee of `size` members with identities `1..=size`.
    ///
    /// With a `db_path`, every member persists its shares in its own sled database
    /// under `<db_path>/member-<id>`; otherwise shares are kept in memory.
    pub fn new(size: usize, db_path: Option<&Path>) -> Result<Self> {
        let mut members = Vec::with_capacity(size);
        for i in 1..=size as u64 {
            let member_path = db_path.map(|path| path.join(format!("member-{i}")));
            members.push(CommitteeMember::new(Identity::new(i)?, dao(member_path.as_deref())?));
        }

        info!("Created committee of {} members", size);
        Committee::with_members(members)
    }

    /// Builds a committee from existing members. Identities must be unique.
    pub fn with_members(members: Vec<CommitteeMember>) -> Result<Self> {
        if members.is_empty() {
            return Err(Error::InvalidParameters("a committee needs members".into()));
        }
        let mut roster = BTreeMap::new();
        for member in members {
            let id = member.id();
            if roster.insert(id, Arc::new(member)).is_some() {
                return Err(Error::InvalidIdentity(format!("member {id} listed twice")));
            }
        }
        Ok(Committee { members: roster })
    }

    pub fn identities(&self) -> Vec<Identity> {
        self.members.keys().copied().collect()
    }

    pub fn member(&self, id: Identity) -> Result<Arc<CommitteeMember>> {
        self.members
            .get(&id)
            .cloned()
            .ok_or(Error::UnknownRecipient(id))
    }

    /// Delivers every share of `subject` to the member with the matching identity.
    /// `threshold` is the one the shares were split with and is stored beside them.
    ///
    /// A failed delivery is recorded in the report and does not stop the others.
    pub fn distribute(
        &self,
        subject: &str,
        shares: &ShareSet,
        threshold: usize,
    ) -> DistributionReport {
        let mut report = DistributionReport::default();

        for (id, share) in shares {
            let delivery = self
                .member(*id)
                .and_then(|member| member.set_key_share(subject, share, threshold));
            match delivery {
                Ok(()) => {
                    debug!("Sent minipool '{}' share to member {}", subject, id);
                    report.delivered.push(*id);
                }
                Err(err) => {
                    warn!("Could not deliver minipool '{}' share to {}: {}", subject, id, err);
                    report.failures.push((*id, err));
                }
            }
        }

        report
    }

    /// Collects the shares of the members picked by `policy` for `subject`.
    ///
    /// Members are only offered to the policy if they hold a share for the subject.
    /// Every held share must have been split with `threshold`, the one recorded for
    /// the subject; a share stored under another threshold is refused. The returned
    /// set is a snapshot handed to the reconstructor.
    pub fn gather(
        &self,
        subject: &str,
        threshold: usize,
        policy: &mut dyn SelectionPolicy,
    ) -> Result<ShareSet> {
        let mut held = BTreeMap::new();
        for (id, member) in &self.members {
            if let Some((share, stored)) = member.held_share(subject)? {
                if stored != threshold {
                    return Err(Error::InvalidParameters(format!(
                        "member {id} holds a share of '{subject}' split with threshold {stored}, expected {threshold}"
                    )));
                }
                held.insert(*id, share);
            }
        }

        let available: Vec<Identity> = held.keys().copied().collect();
        let chosen = policy.select(&available, threshold);

        let mut shares = ShareSet::new();
        for id in chosen {
            if shares.contains_key(&id) {
                return Err(Error::SingularInterpolation(format!(
                    "member {id} selected more than once"
                )));
            }
            let share = held.remove(&id).ok_or_else(|| Error::ShareNotFound {
                subject: subject.to_string(),
                member: id,
            })?;
            debug!("Using member {:>2} key share for minipool '{}'", id, subject);
            shares.insert(id, share);
        }
        Ok(shares)
    }
}
