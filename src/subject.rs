use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::keys::PublicKey;

/// Lifecycle status of a minipool.
///
/// Only ever moves forward: `Initialized -> Prelaunch -> Staking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Initialized,
    Prelaunch,
    Staking,
}

/// A minipool: the validator record whose key is held by the committee.
///
/// The validator public key and the threshold its key was split with are committed
/// at creation and never change.
#[derive(Debug, Clone)]
pub struct Subject {
    address: String,
    validator_pubkey: PublicKey,
    threshold: usize,
    status: Status,
}

impl Subject {
    pub fn new(address: &str, validator_pubkey: PublicKey, threshold: usize) -> Self {
        Subject {
            address: address.to_string(),
            validator_pubkey,
            threshold,
            status: Status::Initialized,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn validator_pubkey(&self) -> &PublicKey {
        &self.validator_pubkey
    }

    /// Number of shares needed to rebuild the validator key.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Signals that the committee verified this minipool's key shares.
    pub fn accept_validator_key(&mut self) -> Result<()> {
        self.transition(Status::Initialized, Status::Prelaunch)
    }

    /// Starts staking. Only allowed once the key shares have been accepted.
    pub fn stake(&mut self) -> Result<()> {
        self.transition(Status::Prelaunch, Status::Staking)
    }

    fn transition(&mut self, expected: Status, to: Status) -> Result<()> {
        if self.status != expected {
            return Err(Error::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Registry of deployed minipools, keyed by address.
///
/// Each subject sits behind its own lock, so a status change is visible to every
/// later reader and subjects never contend with each other.
#[derive(Default)]
pub struct SubjectStore {
    subjects: RwLock<HashMap<String, Arc<RwLock<Subject>>>>,
}

impl SubjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// "Deploys" a minipool. An address can only be registered once.
    pub fn register(&self, subject: Subject) -> Result<()> {
        let mut subjects = self
            .subjects
            .write()
            .map_err(|_| Error::Storage("subject registry lock poisoned".into()))?;
        if subjects.contains_key(subject.address()) {
            return Err(Error::DuplicateSubject(subject.address().to_string()));
        }
        info!(
            "Registered minipool {} with validator pubkey {}, threshold {}",
            subject.address(),
            subject.validator_pubkey(),
            subject.threshold()
        );
        subjects.insert(subject.address().to_string(), Arc::new(RwLock::new(subject)));
        Ok(())
    }

    fn get(&self, address: &str) -> Result<Arc<RwLock<Subject>>> {
        self.subjects
            .read()
            .map_err(|_| Error::Storage("subject registry lock poisoned".into()))?
            .get(address)
            .cloned()
            .ok_or_else(|| Error::UnknownSubject(address.to_string()))
    }

    /// Returns a copy of the subject's current record.
    pub fn snapshot(&self, address: &str) -> Result<Subject> {
        let subject = self.get(address)?;
        let guard = subject
            .read()
            .map_err(|_| Error::Storage(format!("lock for subject {address} poisoned")))?;
        Ok(guard.clone())
    }

    pub fn status(&self, address: &str) -> Result<Status> {
        Ok(self.snapshot(address)?.status())
    }

    pub fn validator_pubkey(&self, address: &str) -> Result<PublicKey> {
        Ok(*self.snapshot(address)?.validator_pubkey())
    }

    pub fn threshold(&self, address: &str) -> Result<usize> {
        Ok(self.snapshot(address)?.threshold())
    }

    pub fn accept_validator_key(&self, address: &str) -> Result<()> {
        self.update(address, Subject::accept_validator_key)
    }

    /// The external "promote to staking" trigger.
    pub fn stake(&self, address: &str) -> Result<()> {
        self.update(address, Subject::stake)?;
        info!("Started staking on minipool {}", address);
        Ok(())
    }

    fn update(&self, address: &str, f: impl FnOnce(&mut Subject) -> Result<()>) -> Result<()> {
        let subject = self.get(address)?;
        let mut guard = subject
            .write()
            .map_err(|_| Error::Storage(format!("lock for subject {address} poisoned")))?;
        f(&mut *guard).map_err(|err| {
            warn!("Minipool {}: {}", address, err);
            err
        })
    }
}
