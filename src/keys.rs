use bls12_381::{G1Affine, G1Projective, Scalar};
use ff::Field;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU64;

use crate::constants::{PUBLIC_KEY_BYTES, SCALAR_BYTES};
use crate::error::{Error, Result};

/// Identity of a committee member, used as the x-coordinate of its share.
///
/// Zero is reserved for the secret itself (the polynomial's constant term), so an
/// `Identity` is always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(NonZeroU64);

impl Identity {
    pub fn new(id: u64) -> Result<Self> {
        NonZeroU64::new(id)
            .map(Identity)
            .ok_or_else(|| Error::InvalidIdentity("identity 0 is reserved for the secret".into()))
    }

    pub fn value(&self) -> u64 {
        self.0.get()
    }

    /// Maps the identity onto the scalar field.
    pub fn to_scalar(&self) -> Scalar {
        Scalar::from(self.value())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validator secret key: an element of the BLS12-381 scalar field.
///
/// Only the dealer ever holds one. The `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretScalar(pub(crate) Scalar);

impl SecretScalar {
    /// Draws a fresh non-zero secret from the given CSPRNG.
    pub fn random(mut rng: impl RngCore) -> Self {
        loop {
            let candidate = Scalar::random(&mut rng);
            if !bool::from(candidate.is_zero()) {
                return SecretScalar(candidate);
            }
        }
    }

    /// Parses a canonical little-endian scalar encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let scalar = scalar_from_slice(bytes)?;
        if bool::from(scalar.is_zero()) {
            return Err(Error::InvalidParameters("secret key must be non-zero".into()));
        }
        Ok(SecretScalar(scalar))
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        self.0.to_bytes()
    }

    /// The canonical public key `secret · G`.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_scalar(&self.0)
    }
}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar(<redacted>)")
    }
}

/// One committee member's share: the sharing polynomial evaluated at its identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Share {
    identity: Identity,
    value: Scalar,
}

impl Share {
    pub fn new(identity: Identity, value: Scalar) -> Self {
        Share { identity, value }
    }

    pub fn from_bytes(identity: Identity, bytes: &[u8]) -> Result<Self> {
        Ok(Share {
            identity,
            value: scalar_from_slice(bytes)?,
        })
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn value(&self) -> &Scalar {
        &self.value
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        self.value.to_bytes()
    }

    /// The member's public share `share · G`.
    pub fn public_share(&self) -> PublicKey {
        PublicKey::from_scalar(&self.value)
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("identity", &self.identity)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Shares of one subject, keyed and ordered by member identity.
pub type ShareSet = BTreeMap<Identity, Share>;

/// A BLS12-381 G1 public key.
///
/// Two keys are equal iff their 48-byte compressed encodings are equal.
#[derive(Clone, Copy)]
pub struct PublicKey(G1Affine);

impl PublicKey {
    pub fn from_scalar(scalar: &Scalar) -> Self {
        PublicKey(G1Affine::from(G1Projective::generator() * scalar))
    }

    pub(crate) fn from_projective(point: G1Projective) -> Self {
        PublicKey(G1Affine::from(point))
    }

    pub(crate) fn to_projective(self) -> G1Projective {
        G1Projective::from(self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let compressed: [u8; PUBLIC_KEY_BYTES] = bytes.try_into().map_err(|_| {
            Error::InvalidEncoding(format!(
                "public key must be {PUBLIC_KEY_BYTES} bytes, got {}",
                bytes.len()
            ))
        })?;
        let point: Option<G1Affine> = G1Affine::from_compressed(&compressed).into();
        point
            .map(PublicKey)
            .ok_or_else(|| Error::InvalidEncoding("not a valid compressed G1 point".into()))
    }

    pub fn from_hex(encoded: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(encoded.trim_start_matches("0x"))?)
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_BYTES] {
        self.0.to_compressed()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

fn scalar_from_slice(bytes: &[u8]) -> Result<Scalar> {
    let repr: [u8; SCALAR_BYTES] = bytes.try_into().map_err(|_| {
        Error::InvalidEncoding(format!(
            "scalar must be {SCALAR_BYTES} bytes, got {}",
            bytes.len()
        ))
    })?;
    let scalar: Option<Scalar> = Scalar::from_bytes(&repr).into();
    scalar.ok_or_else(|| Error::InvalidEncoding("scalar is not reduced modulo the field order".into()))
}
