use rand::seq::SliceRandom;
use rand::RngCore;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::keys::Identity;

/// Chooses which committee members contribute their shares to a verification.
///
/// The choice never affects the reconstructed key, only who takes part.
pub trait SelectionPolicy: Send {
    /// Picks members out of `available` (sorted by identity). Returning fewer than
    /// `threshold` identities makes the reconstruction fail with `InsufficientShares`.
    fn select(&mut self, available: &[Identity], threshold: usize) -> Vec<Identity>;
}

/// The `threshold` members with the lowest identities.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstThreshold;

impl SelectionPolicy for FirstThreshold {
    fn select(&mut self, available: &[Identity], threshold: usize) -> Vec<Identity> {
        available.iter().take(threshold).copied().collect()
    }
}

/// `threshold` members drawn at random from the injected source.
#[derive(Debug, Clone)]
pub struct RandomThreshold<R> {
    rng: R,
}

impl<R: RngCore + Send> RandomThreshold<R> {
    pub fn new(rng: R) -> Self {
        RandomThreshold { rng }
    }
}

impl<R: RngCore + Send> SelectionPolicy for RandomThreshold<R> {
    fn select(&mut self, available: &[Identity], threshold: usize) -> Vec<Identity> {
        available
            .choose_multiple(&mut self.rng, threshold)
            .copied()
            .collect()
    }
}

/// Every member holding a share.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllAvailable;

impl SelectionPolicy for AllAvailable {
    fn select(&mut self, available: &[Identity], _threshold: usize) -> Vec<Identity> {
        available.to_vec()
    }
}

/// An explicit list of members, regardless of the threshold.
#[derive(Debug, Clone, Default)]
pub struct FixedSubset(pub Vec<Identity>);

impl FixedSubset {
    /// Parses member identities. A repeated identity is kept once, in the position
    /// it first appears.
    pub fn from_ids(ids: &[u64]) -> Result<Self> {
        let mut members = Vec::with_capacity(ids.len());
        for &id in ids {
            let id = Identity::new(id)?;
            if !members.contains(&id) {
                members.push(id);
            }
        }
        Ok(FixedSubset(members))
    }
}

impl SelectionPolicy for FixedSubset {
    fn select(&mut self, available: &[Identity], _threshold: usize) -> Vec<Identity> {
        self.0
            .iter()
            .filter(|id| available.contains(id))
            .copied()
            .collect()
    }
}

/// Policy names accepted in configuration and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    First,
    Random,
    All,
}

impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(PolicyKind::First),
            "random" => Ok(PolicyKind::Random),
            "all" => Ok(PolicyKind::All),
            other => Err(Error::InvalidParameters(format!(
                "unknown selection policy '{other}', expected first, random or all"
            ))),
        }
    }
}

impl PolicyKind {
    /// Builds the policy. `Random` draws from `rng`.
    pub fn build<R: RngCore + Send + 'static>(self, rng: R) -> Box<dyn SelectionPolicy> {
        match self {
            PolicyKind::First => Box::new(FirstThreshold),
            PolicyKind::Random => Box::new(RandomThreshold::new(rng)),
            PolicyKind::All => Box::new(AllAvailable),
        }
    }
}
