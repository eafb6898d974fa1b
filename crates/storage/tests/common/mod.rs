pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{TestBackends, seeded_bytes};
