use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::thread;

use splitkey::committee::Committee;
use splitkey::dealer::Dealer;
use splitkey::error::Error;
use splitkey::keys::{Identity, SecretScalar, Share};
use splitkey::reconstruct::reconstruct_public_key;
use splitkey::selection::{AllAvailable, FirstThreshold, FixedSubset, RandomThreshold};
use splitkey::subject::{Status, SubjectStore};
use splitkey::transport;
use splitkey::verifier::{verify, verify_key_shares, Verdict};

const ADDRESS: &str = "0xdeadbeef";

fn deployed(seed: u64) -> (Committee, SubjectStore, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let subjects = SubjectStore::new();
    let committee = Committee::new(10, None).unwrap();

    let dealer = Dealer::create_minipool(ADDRESS, 3, 10, &subjects, &mut rng).unwrap();
    let shares = dealer.split_validator_key(&mut rng).unwrap();
    assert!(committee.distribute(ADDRESS, &shares, 3).is_complete());

    (committee, subjects, rng)
}

#[test]
fn test_end_to_end_with_members_2_5_9() {
    let (committee, subjects, _) = deployed(101);

    let mut policy = FixedSubset::from_ids(&[2, 5, 9]).unwrap();
    let shares = committee.gather(ADDRESS, 3, &mut policy).unwrap();
    let aggregate = reconstruct_public_key(&shares, 3).unwrap();
    assert_eq!(aggregate, subjects.validator_pubkey(ADDRESS).unwrap());

    assert_eq!(verify(&subjects, ADDRESS, &aggregate).unwrap(), Verdict::Accepted);
    assert_eq!(subjects.status(ADDRESS).unwrap(), Status::Prelaunch);

    subjects.stake(ADDRESS).unwrap();
    assert_eq!(subjects.status(ADDRESS).unwrap(), Status::Staking);

    assert!(matches!(
        subjects.stake(ADDRESS),
        Err(Error::InvalidTransition {
            from: Status::Staking,
            to: Status::Staking
        })
    ));
    assert_eq!(subjects.status(ADDRESS).unwrap(), Status::Staking);
}

#[test]
fn test_two_shares_are_not_enough() {
    let (committee, subjects, _) = deployed(102);

    let mut policy = FixedSubset::from_ids(&[2, 5]).unwrap();
    let result = verify_key_shares(&committee, &subjects, ADDRESS, &mut policy);
    assert!(matches!(
        result,
        Err(Error::InsufficientShares { threshold: 3, got: 2 })
    ));
    assert_eq!(subjects.status(ADDRESS).unwrap(), Status::Initialized);
}

#[test]
fn test_tampered_share_is_rejected() {
    let mut rng = StdRng::seed_from_u64(103);
    let subjects = SubjectStore::new();
    let committee = Committee::new(10, None).unwrap();

    let dealer = Dealer::create_minipool(ADDRESS, 3, 10, &subjects, &mut rng).unwrap();
    let mut shares = dealer.split_validator_key(&mut rng).unwrap();
    let five = Identity::new(5).unwrap();
    let garbage = SecretScalar::random(&mut rng);
    shares.insert(five, Share::from_bytes(five, &garbage.to_bytes()).unwrap());
    assert!(committee.distribute(ADDRESS, &shares, 3).is_complete());

    let mut policy = FixedSubset::from_ids(&[2, 5, 9]).unwrap();
    let verdict = verify_key_shares(&committee, &subjects, ADDRESS, &mut policy).unwrap();
    match verdict {
        Verdict::Rejected(mismatch) => {
            assert_eq!(mismatch.expected, subjects.validator_pubkey(ADDRESS).unwrap());
            assert_ne!(mismatch.reconstructed, mismatch.expected);
        }
        Verdict::Accepted => panic!("tampered share was accepted"),
    }
    assert_eq!(subjects.status(ADDRESS).unwrap(), Status::Initialized);
    assert!(subjects.stake(ADDRESS).is_err());

    // a subset avoiding the corrupted member still verifies
    let mut honest = FixedSubset::from_ids(&[1, 4, 10]).unwrap();
    assert!(verify_key_shares(&committee, &subjects, ADDRESS, &mut honest)
        .unwrap()
        .is_accepted());
    assert_eq!(subjects.status(ADDRESS).unwrap(), Status::Prelaunch);
}

#[test]
fn test_every_policy_rebuilds_the_same_key() {
    let (committee, subjects, rng) = deployed(104);
    let expected = subjects.validator_pubkey(ADDRESS).unwrap();

    let first = committee.gather(ADDRESS, 3, &mut FirstThreshold).unwrap();
    let all = committee.gather(ADDRESS, 3, &mut AllAvailable).unwrap();
    let mut random = RandomThreshold::new(rng);

    assert_eq!(reconstruct_public_key(&first, 3).unwrap(), expected);
    assert_eq!(reconstruct_public_key(&all, 3).unwrap(), expected);
    for _ in 0..5 {
        let picked = committee.gather(ADDRESS, 3, &mut random).unwrap();
        assert_eq!(picked.len(), 3);
        assert_eq!(reconstruct_public_key(&picked, 3).unwrap(), expected);
    }
}

#[test]
fn test_minipool_threshold_differs_from_the_default() {
    let mut rng = StdRng::seed_from_u64(107);
    let subjects = SubjectStore::new();
    let committee = Committee::new(10, None).unwrap();

    let dealer = Dealer::create_minipool(ADDRESS, 5, 10, &subjects, &mut rng).unwrap();
    let shares = dealer.split_validator_key(&mut rng).unwrap();
    assert!(committee.distribute(ADDRESS, &shares, 5).is_complete());

    // the first three members would rebuild a wrong key from a degree four polynomial
    let mut three = FixedSubset::from_ids(&[1, 2, 3]).unwrap();
    assert!(matches!(
        verify_key_shares(&committee, &subjects, ADDRESS, &mut three),
        Err(Error::InsufficientShares { threshold: 5, got: 3 })
    ));
    assert_eq!(subjects.status(ADDRESS).unwrap(), Status::Initialized);

    assert!(verify_key_shares(&committee, &subjects, ADDRESS, &mut FirstThreshold)
        .unwrap()
        .is_accepted());
}

#[test]
fn test_subjects_are_independent() {
    let mut rng = StdRng::seed_from_u64(105);
    let subjects = SubjectStore::new();
    let committee = Committee::new(5, None).unwrap();

    for address in ["0x01", "0x02", "0x03"] {
        let dealer = Dealer::create_minipool(address, 2, 5, &subjects, &mut rng).unwrap();
        let shares = dealer.split_validator_key(&mut rng).unwrap();
        assert!(committee.distribute(address, &shares, 2).is_complete());
    }

    assert!(verify_key_shares(&committee, &subjects, "0x02", &mut FirstThreshold)
        .unwrap()
        .is_accepted());
    assert_eq!(subjects.status("0x01").unwrap(), Status::Initialized);
    assert_eq!(subjects.status("0x02").unwrap(), Status::Prelaunch);
    assert_eq!(subjects.status("0x03").unwrap(), Status::Initialized);
}

#[test]
fn test_subjects_verify_in_parallel() {
    let mut rng = StdRng::seed_from_u64(108);
    let subjects = SubjectStore::new();
    let committee = Committee::new(10, None).unwrap();
    let addresses: Vec<String> = (0..8).map(|i| format!("0x{i:02x}")).collect();

    for (i, address) in addresses.iter().enumerate() {
        let threshold = 2 + i % 4;
        let dealer = Dealer::create_minipool(address, threshold, 10, &subjects, &mut rng).unwrap();
        let shares = dealer.split_validator_key(&mut rng).unwrap();
        assert!(committee.distribute(address, &shares, threshold).is_complete());
    }

    thread::scope(|scope| {
        for (i, address) in addresses.iter().enumerate() {
            let committee = &committee;
            let subjects = &subjects;
            scope.spawn(move || {
                let mut policy = RandomThreshold::new(StdRng::seed_from_u64(200 + i as u64));
                let verdict =
                    verify_key_shares(committee, subjects, address, &mut policy).unwrap();
                assert!(verdict.is_accepted());
                subjects.stake(address).unwrap();
            });
        }
    });

    for address in &addresses {
        assert_eq!(subjects.status(address).unwrap(), Status::Staking);
    }
}

#[tokio::test]
async fn test_distribution_over_the_event_loop() {
    let mut rng = StdRng::seed_from_u64(106);
    let subjects = SubjectStore::new();
    let committee = Arc::new(Committee::new(10, None).unwrap());
    let (client, event_loop) = transport::new(Arc::clone(&committee));
    tokio::spawn(event_loop.run());

    let dealer = Dealer::create_minipool(ADDRESS, 3, 10, &subjects, &mut rng).unwrap();
    let shares = dealer.split_validator_key(&mut rng).unwrap();
    let report = client.distribute(ADDRESS, &shares, 3).await;
    assert!(report.is_complete());

    let mut policy = FixedSubset::from_ids(&[2, 5, 9]).unwrap();
    let verdict = verify_key_shares(&committee, &subjects, ADDRESS, &mut policy).unwrap();
    assert!(verdict.is_accepted());
}
