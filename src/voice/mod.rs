//! Voice fingerprinting: per-user persistence and the enrollment and
//! authentication flows built on top of it.

pub mod fingerprint;
pub mod flow;

pub use fingerprint::{FingerprintStore, StoreError};
pub use flow::{authenticate, enroll, AuthOutcome, EnrollOutcome};
