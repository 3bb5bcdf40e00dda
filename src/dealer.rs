use rand::{CryptoRng, RngCore};
use tracing::info;

use crate::error::{Error, Result};
use crate::keys::{PublicKey, SecretScalar, ShareSet};
use crate::sss::split_secret;
use crate::subject::{Subject, SubjectStore};

/// The node operator creating a minipool: the only party that ever sees the full
/// validator secret.
pub struct Dealer {
    address: String,
    validator_secret_key: SecretScalar,
    key_shares_threshold: usize,
    key_shares_count: usize,
}

impl Dealer {
    /// Creates a minipool with a fresh validator key and registers it in `subjects`.
    pub fn create_minipool<R: RngCore + CryptoRng>(
        address: &str,
        threshold: usize,
        count: usize,
        subjects: &SubjectStore,
        rng: &mut R,
    ) -> Result<Self> {
        Dealer::with_secret(
            address,
            SecretScalar::random(&mut *rng),
            threshold,
            count,
            subjects,
        )
    }

    /// Same as [`Dealer::create_minipool`] for a validator key derived elsewhere.
    ///
    /// The parameters are checked before anything is registered, so a refused
    /// minipool leaves no record behind.
    pub fn with_secret(
        address: &str,
        validator_secret_key: SecretScalar,
        threshold: usize,
        count: usize,
        subjects: &SubjectStore,
    ) -> Result<Self> {
        if threshold < 1 || threshold > count {
            return Err(Error::InvalidParameters(format!(
                "threshold {threshold} must be between 1 and the share count {count}"
            )));
        }

        let pubkey = validator_secret_key.public_key();
        subjects.register(Subject::new(address, pubkey, threshold))?;
        info!("Created minipool. Address: {}, Validator pubkey: {}", address, pubkey);

        Ok(Dealer {
            address: address.to_string(),
            validator_secret_key,
            key_shares_threshold: threshold,
            key_shares_count: count,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn validator_pubkey(&self) -> PublicKey {
        self.validator_secret_key.public_key()
    }

    pub fn threshold(&self) -> usize {
        self.key_shares_threshold
    }

    /// Splits the validator key into shares for the committee.
    ///
    /// Consumes the dealer: the secret is dropped as soon as the shares exist.
    pub fn split_validator_key<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<ShareSet> {
        split_secret(
            &self.validator_secret_key,
            self.key_shares_threshold,
            self.key_shares_count,
            rng,
        )
    }
}
