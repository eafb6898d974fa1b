//! Core domain types and shared logic for the stash upload service.
//!
//! This crate defines the data model used across all other crates:
//! - Upload records and registered users
//! - Key, delete-secret and auth-token generation strategies
//! - Content-type sniffing
//! - Constant-time secret comparison

pub mod config;
pub mod error;
pub mod keys;
pub mod record;
pub mod secret;
pub mod sniff;
pub mod user;

pub use error::{Error, Result};
pub use keys::{FixedKey, KeyGenerator, KeySource, RandomKeys, SequentialKeys};
pub use record::UploadRecord;
pub use secret::{hash_token, secrets_match};
pub use sniff::{SNIFF_LEN, detect_content_type};
pub use user::{User, validate_username};
