//! IPFS gateway retrieval.
//!
//! Downloads content-addressed documents through a public HTTP gateway
//! and stores them on local disk.

pub mod fetcher;

pub use fetcher::{validate_hash, Fetcher};
