//! # Threshold Custody of Validator Keys
//!
//! This library splits a validator's BLS12-381 secret key into shares held by a fixed
//! committee, so that any `t` of the `n` members can later check that their shares
//! rebuild the validator's public key, while fewer than `t` shares reveal nothing
//! about the secret. A minipool may only start staking once that check passed.
//!
//! ## Shamir's Secret Sharing over the Scalar Field
//!
//! The secret key `s` is the constant term of a random polynomial of degree `t-1`
//! over the BLS12-381 scalar field:
//!
//! ```ignore
//! f(x) = s + a1*x + a2*x^2 + ... + a(t-1)*x^(t-1)
//! ```
//!
//! Member `i` receives the share `f(i)`. Member identities start at 1; `x = 0` is
//! where the secret lives.
//!
//! ## Rebuilding the Public Key
//!
//! The committee never rebuilds the secret. Each selected member lifts its share to
//! a public share `f(i)·G`, and the public shares are combined with the Lagrange
//! coefficients at zero:
//!
//! ```ignore
//! PK = Σ λ_i · f(i)·G = f(0)·G = s·G
//! ```
//!
//! Any qualifying subset of members yields the same key.
//!
//! ## Example
//!
//! ```rust
//! use splitkey::committee::Committee;
//! use splitkey::dealer::Dealer;
//! use splitkey::selection::FixedSubset;
//! use splitkey::subject::{Status, SubjectStore};
//! use splitkey::verifier::verify_key_shares;
//!
//! let mut rng = rand::rngs::OsRng;
//! let subjects = SubjectStore::new();
//! let committee = Committee::new(10, None).unwrap();
//!
//! let dealer = Dealer::create_minipool("0xdeadbeef", 3, 10, &subjects, &mut rng).unwrap();
//! let shares = dealer.split_validator_key(&mut rng).unwrap();
//! assert!(committee.distribute("0xdeadbeef", &shares, 3).is_complete());
//!
//! let mut policy = FixedSubset::from_ids(&[2, 5, 9]).unwrap();
//! let verdict = verify_key_shares(&committee, &subjects, "0xdeadbeef", &mut policy).unwrap();
//! assert!(verdict.is_accepted());
//!
//! subjects.stake("0xdeadbeef").unwrap();
//! assert_eq!(subjects.status("0xdeadbeef").unwrap(), Status::Staking);
//! ```
//!
//! ## Modules
//!
//! - `sss`: Shamir splitting, Lagrange coefficients and secret recovery.
//! - `reconstruct`: aggregate public key from key shares.
//! - `committee`: committee members, their share stores and share distribution.
//! - `verifier`: comparison with the minipool's validator key.
//! - `subject`: minipool records and their lifecycle.

/// The `client` module lets async callers deliver and fetch shares through the
/// committee event loop.
pub mod client;

/// The `command` module defines the commands understood by the committee event loop.
pub mod command;

/// The `committee` module models the committee members, each owning a private
/// share store, and distributes a minipool's shares among them.
pub mod committee;

/// The `config` module loads deployment settings from `conf.toml` and the environment.
pub mod config;

/// The `constants` module defines various constants used in the library.
pub mod constants;

/// The `dealer` module creates minipools and splits their validator keys.
pub mod dealer;

/// The `error` module defines the error type shared by all operations.
pub mod error;

/// The `event` module runs the loop that executes delivery commands.
pub mod event;

/// The `keys` module defines identities, secret scalars, shares and public keys.
pub mod keys;

/// The `provider` module implements share registration and lookup against a
/// member's store.
pub mod provider;

/// The `reconstruct` module rebuilds the aggregate public key from a subset of shares.
pub mod reconstruct;

/// The `repository` module manages share storage in sled or in memory.
pub mod repository;

/// The `selection` module holds the policies choosing which members take part in
/// a verification.
pub mod selection;

/// The `sss` (Shamir's Secret Sharing) module splits a secret into shares and
/// interpolates them back.
pub mod sss;

/// The `subject` module tracks minipools and their lifecycle status.
pub mod subject;

/// The `transport` module connects a `Client` with an `EventLoop` in-process.
pub mod transport;

/// The `verifier` module checks reconstructed keys against minipool contracts.
pub mod verifier;
