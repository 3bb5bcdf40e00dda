use bls12_381::Scalar;
use ff::Field;
use rand::{CryptoRng, RngCore};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::keys::{Identity, SecretScalar, Share, ShareSet};

/// Represents a polynomial over the BLS12-381 scalar field.
///
/// The constant term is the secret; all other coefficients are random. A polynomial
/// is never serialized and its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<Scalar>,
}

impl Polynomial {
    /// Constructs a polynomial of the given degree with uniformly random
    /// coefficients, where the constant term is `constant`.
    ///
    /// # Arguments
    ///
    /// * `degree` - The degree of the polynomial (threshold - 1).
    /// * `constant` - The constant term of the polynomial.
    /// * `rng` - A cryptographically secure random source.
    pub fn new<R: RngCore + CryptoRng>(degree: usize, constant: Scalar, rng: &mut R) -> Self {
        let mut coefficients = vec![constant; degree + 1];

        for coeff in coefficients.iter_mut().skip(1) {
            *coeff = Scalar::random(&mut *rng);
        }

        Polynomial { coefficients }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Evaluates the polynomial at `x` using Horner's rule.
    pub fn evaluate(&self, x: &Scalar) -> Scalar {
        self.coefficients
            .iter()
            .rev()
            .fold(Scalar::ZERO, |acc, coeff| acc * x + coeff)
    }
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polynomial(degree {}, <redacted>)", self.degree())
    }
}

/// Splits a secret into `count` shares, any `threshold` of which rebuild it.
///
/// Member identities are the sequential integers `1..=count`.
///
/// # Errors
///
/// Returns `InvalidParameters` if `threshold` is zero or larger than `count`.
///
/// # Examples
///
/// ```rust
/// use splitkey::keys::SecretScalar;
/// use splitkey::sss::split_secret;
///
/// let mut rng = rand::rngs::OsRng;
/// let secret = SecretScalar::random(&mut rng);
/// let shares = split_secret(&secret, 3, 10, &mut rng).unwrap();
/// assert_eq!(shares.len(), 10);
/// ```
pub fn split_secret<R: RngCore + CryptoRng>(
    secret: &SecretScalar,
    threshold: usize,
    count: usize,
    rng: &mut R,
) -> Result<ShareSet> {
    if threshold < 1 {
        return Err(Error::InvalidParameters(
            "threshold must be at least 1".into(),
        ));
    }

    if count < threshold {
        return Err(Error::InvalidParameters(format!(
            "share count {count} is below threshold {threshold}"
        )));
    }

    let poly = Polynomial::new(threshold - 1, secret.0, rng);

    let mut shares = ShareSet::new();
    for i in 1..=count as u64 {
        let identity = Identity::new(i)?;
        let value = poly.evaluate(&identity.to_scalar());
        shares.insert(identity, Share::new(identity, value));
    }

    debug!("Split secret into {} shares, threshold {}", count, threshold);
    Ok(shares)
}

/// Computes the Lagrange coefficients for interpolating at `x = 0`.
///
/// `λ_i = Π_{j≠i} x_j / (x_j - x_i)`
///
/// # Errors
///
/// Returns `SingularInterpolation` if identities repeat or a denominator has no inverse.
pub fn lagrange_coefficients(identities: &[Identity]) -> Result<Vec<Scalar>> {
    let distinct: BTreeSet<_> = identities.iter().collect();
    if distinct.len() != identities.len() {
        return Err(Error::SingularInterpolation(
            "identities are not pairwise distinct".into(),
        ));
    }

    let xs: Vec<Scalar> = identities.iter().map(Identity::to_scalar).collect();
    let mut coefficients = Vec::with_capacity(xs.len());

    for (i, x_i) in xs.iter().enumerate() {
        if bool::from(x_i.is_zero()) {
            return Err(Error::SingularInterpolation(
                "identity maps to zero in the scalar field".into(),
            ));
        }

        let mut numerator = Scalar::ONE;
        let mut denominator = Scalar::ONE;
        for (j, x_j) in xs.iter().enumerate() {
            if i != j {
                numerator *= x_j;
                denominator *= x_j - x_i;
            }
        }

        let inverse: Option<Scalar> = denominator.invert().into();
        let inverse = inverse.ok_or_else(|| {
            Error::SingularInterpolation(format!(
                "no inverse for the denominator of identity {}",
                identities[i]
            ))
        })?;
        coefficients.push(numerator * inverse);
    }

    Ok(coefficients)
}

/// Recovers the secret scalar from at least `threshold` shares.
///
/// This is a dealer-side recovery tool; the committee only ever rebuilds the
/// public key (see `reconstruct::reconstruct_public_key`).
///
/// # Errors
///
/// Returns `InsufficientShares` if fewer than `threshold` shares are given, and
/// `SingularInterpolation` for malformed identity sets.
pub fn recover_secret(shares: &ShareSet, threshold: usize) -> Result<SecretScalar> {
    if shares.len() < threshold || shares.is_empty() {
        return Err(Error::InsufficientShares {
            threshold,
            got: shares.len(),
        });
    }

    let identities: Vec<Identity> = shares.values().map(Share::identity).collect();
    let lambdas = lagrange_coefficients(&identities)?;

    let secret = shares
        .values()
        .zip(lambdas.iter())
        .fold(Scalar::ZERO, |acc, (share, lambda)| acc + share.value() * lambda);

    Ok(SecretScalar(secret))
}
