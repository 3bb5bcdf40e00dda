use bls12_381::G1Projective;
use tracing::debug;

use crate::error::{Error, Result};
use crate::keys::{Identity, PublicKey, Share, ShareSet};
use crate::sss::lagrange_coefficients;

/// Rebuilds the aggregate public key from at least `threshold` key shares.
///
/// Every share is lifted to its public share `share_i · G`, and the public shares
/// are combined with the Lagrange coefficients of the supplied identities at zero:
///
/// ```ignore
/// PK = Σ λ_i · PK_i
/// ```
///
/// The result depends only on the polynomial behind the shares, never on which
/// qualifying subset is supplied.
///
/// # Errors
///
/// * `InsufficientShares` if fewer than `threshold` shares are supplied.
/// * `SingularInterpolation` if the identity set cannot be interpolated.
pub fn reconstruct_public_key(shares: &ShareSet, threshold: usize) -> Result<PublicKey> {
    reconstruct_from_public_shares(&public_shares(shares), threshold)
}

/// Same as [`reconstruct_public_key`], for callers that only hold public shares.
pub fn reconstruct_from_public_shares(
    public_shares: &[(Identity, PublicKey)],
    threshold: usize,
) -> Result<PublicKey> {
    if public_shares.len() < threshold || public_shares.is_empty() {
        return Err(Error::InsufficientShares {
            threshold,
            got: public_shares.len(),
        });
    }

    let identities: Vec<Identity> = public_shares.iter().map(|(id, _)| *id).collect();
    let lambdas = lagrange_coefficients(&identities)?;

    let aggregate = public_shares
        .iter()
        .zip(lambdas.iter())
        .fold(G1Projective::identity(), |acc, ((_, pk), lambda)| {
            acc + pk.to_projective() * lambda
        });

    debug!(
        "Reconstructed public key from shares of members {:?}",
        identities.iter().map(Identity::value).collect::<Vec<_>>()
    );
    Ok(PublicKey::from_projective(aggregate))
}

/// Derives the public share of every supplied key share.
pub fn public_shares(shares: &ShareSet) -> Vec<(Identity, PublicKey)> {
    shares
        .values()
        .map(|share: &Share| (share.identity(), share.public_share()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::seq::IteratorRandom;
    use rand::SeedableRng;

    use super::*;
    use crate::keys::SecretScalar;
    use crate::sss::split_secret;

    fn subset(shares: &ShareSet, ids: &[u64]) -> ShareSet {
        ids.iter()
            .map(|&i| {
                let id = Identity::new(i).unwrap();
                (id, shares[&id].clone())
            })
            .collect()
    }

    #[test]
    fn test_reconstruct_matches_canonical_key() {
        let mut rng = StdRng::seed_from_u64(21);
        let secret = SecretScalar::random(&mut rng);
        let shares = split_secret(&secret, 3, 10, &mut rng).unwrap();

        let pk = reconstruct_public_key(&subset(&shares, &[2, 5, 9]), 3).unwrap();
        assert_eq!(pk, secret.public_key());
    }

    #[test]
    fn test_threshold_correctness_across_parameters() {
        let mut rng = StdRng::seed_from_u64(22);
        for (threshold, count) in [(1, 1), (1, 4), (2, 2), (3, 5), (5, 7), (7, 7)] {
            let secret = SecretScalar::random(&mut rng);
            let shares = split_secret(&secret, threshold, count, &mut rng).unwrap();
            let chosen: ShareSet = shares
                .iter()
                .choose_multiple(&mut rng, threshold)
                .into_iter()
                .map(|(&k, v)| (k, v.clone()))
                .collect();
            assert_eq!(
                reconstruct_public_key(&chosen, threshold).unwrap(),
                secret.public_key(),
                "t={threshold} n={count}"
            );
        }
    }

    #[test]
    fn test_subset_invariance() {
        let mut rng = StdRng::seed_from_u64(23);
        let secret = SecretScalar::random(&mut rng);
        let shares = split_secret(&secret, 3, 10, &mut rng).unwrap();

        let first = reconstruct_public_key(&subset(&shares, &[1, 2, 3]), 3).unwrap();
        let last = reconstruct_public_key(&subset(&shares, &[8, 9, 10]), 3).unwrap();
        let spread = reconstruct_public_key(&subset(&shares, &[2, 5, 9]), 3).unwrap();
        let larger = reconstruct_public_key(&subset(&shares, &[1, 4, 6, 7, 10]), 3).unwrap();
        let all = reconstruct_public_key(&shares, 3).unwrap();

        assert_eq!(first, last);
        assert_eq!(first, spread);
        assert_eq!(first, larger);
        assert_eq!(first, all);
    }

    #[test]
    fn test_insufficient_shares() {
        let mut rng = StdRng::seed_from_u64(24);
        let secret = SecretScalar::random(&mut rng);
        let shares = split_secret(&secret, 3, 10, &mut rng).unwrap();

        let result = reconstruct_public_key(&subset(&shares, &[2, 5]), 3);
        assert!(matches!(
            result,
            Err(Error::InsufficientShares { threshold: 3, got: 2 })
        ));
        assert!(matches!(
            reconstruct_public_key(&ShareSet::new(), 1),
            Err(Error::InsufficientShares { threshold: 1, got: 0 })
        ));
    }

    #[test]
    fn test_duplicate_public_share_identities_are_singular() {
        let mut rng = StdRng::seed_from_u64(25);
        let secret = SecretScalar::random(&mut rng);
        let id = Identity::new(4).unwrap();
        let pk = secret.public_key();

        let result = reconstruct_from_public_shares(&[(id, pk), (id, pk)], 2);
        assert!(matches!(result, Err(Error::SingularInterpolation(_))));
    }

    #[test]
    fn test_corrupted_share_changes_aggregate() {
        let mut rng = StdRng::seed_from_u64(26);
        let secret = SecretScalar::random(&mut rng);
        let shares = split_secret(&secret, 3, 10, &mut rng).unwrap();

        let mut tampered = subset(&shares, &[2, 5, 9]);
        let five = Identity::new(5).unwrap();
        let other = SecretScalar::random(&mut rng);
        tampered.insert(five, Share::new(five, other.0));

        let pk = reconstruct_public_key(&tampered, 3).unwrap();
        assert_ne!(pk, secret.public_key());
    }

    #[test]
    fn test_public_shares_match_public_reconstruction() {
        let mut rng = StdRng::seed_from_u64(27);
        let secret = SecretScalar::random(&mut rng);
        let shares = split_secret(&secret, 4, 6, &mut rng).unwrap();

        let pks = public_shares(&shares);
        assert_eq!(pks.len(), 6);
        assert_eq!(
            reconstruct_from_public_shares(&pks[1..5], 4).unwrap(),
            secret.public_key()
        );
    }
}
