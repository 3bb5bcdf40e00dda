use tracing::{debug, info, warn};

use crate::committee::Committee;
use crate::error::{Error, Result};
use crate::keys::PublicKey;
use crate::reconstruct::reconstruct_public_key;
use crate::selection::SelectionPolicy;
use crate::subject::SubjectStore;

/// The two public keys of a failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMismatch {
    pub expected: PublicKey,
    pub reconstructed: PublicKey,
}

impl From<KeyMismatch> for Error {
    fn from(mismatch: KeyMismatch) -> Self {
        Error::KeyMismatch {
            expected: mismatch.expected,
            reconstructed: mismatch.reconstructed,
        }
    }
}

/// Outcome of comparing a reconstructed key with a minipool's validator key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(KeyMismatch),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// Turns a rejection into `Error::KeyMismatch`.
    pub fn into_result(self) -> Result<()> {
        match self {
            Verdict::Accepted => Ok(()),
            Verdict::Rejected(mismatch) => Err(mismatch.into()),
        }
    }
}

/// Compares `reconstructed` with the validator key committed for `address`.
///
/// On a match the minipool moves to `Prelaunch`. Verifying an already accepted
/// minipool again is still `Accepted` but changes nothing.
///
/// # Errors
///
/// `UnknownSubject` if no minipool is registered under `address`.
pub fn verify(subjects: &SubjectStore, address: &str, reconstructed: &PublicKey) -> Result<Verdict> {
    let expected = subjects.validator_pubkey(address)?;

    if *reconstructed != expected {
        warn!(
            "Unexpected validator public key. Recovered key: {}, Contract key: {}",
            reconstructed, expected
        );
        return Ok(Verdict::Rejected(KeyMismatch {
            expected,
            reconstructed: *reconstructed,
        }));
    }

    match subjects.accept_validator_key(address) {
        Ok(()) => info!("Successfully verified key shares of minipool {}", address),
        Err(Error::InvalidTransition { from, .. }) => {
            debug!("Minipool {} already past verification ({:?})", address, from)
        }
        Err(err) => return Err(err),
    }
    Ok(Verdict::Accepted)
}

/// Committee-side check that a minipool's shares rebuild its validator key.
///
/// The members picked by `policy` hand over their shares, the aggregate public key
/// is rebuilt from them and compared with the key in the minipool contract. The
/// reconstruction uses the threshold recorded for the minipool, never the size of
/// whatever subset was gathered.
pub fn verify_key_shares(
    committee: &Committee,
    subjects: &SubjectStore,
    address: &str,
    policy: &mut dyn SelectionPolicy,
) -> Result<Verdict> {
    let threshold = subjects.threshold(address)?;
    let shares = committee.gather(address, threshold, policy)?;
    info!(
        "Will try to recover validator key of {} using {} shares...",
        address,
        shares.len()
    );
    let aggregate = reconstruct_public_key(&shares, threshold)?;
    verify(subjects, address, &aggregate)
}
