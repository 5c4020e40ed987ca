pub mod classifier;
pub mod eligibility;
pub mod normalizer;
pub mod record_builder;
