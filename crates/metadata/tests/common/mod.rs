pub mod metadata;

#[allow(unused_imports)]
pub use metadata::{ScriptedKeys, TestMetadata, run_metadata_test_both, sample_record};
