//! Repository traits for metadata operations.

pub mod keys;
pub mod uploads;
pub mod users;

pub use keys::{KeyRepo, MAX_RESERVE_ATTEMPTS};
pub use uploads::UploadRepo;
pub use users::UserRepo;
