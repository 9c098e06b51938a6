//! Repository implementations for database operations.

mod kyc_repo;

pub use kyc_repo::KycRepository;
