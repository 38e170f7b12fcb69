pub mod classification_rules;
pub mod public_exposure;

pub use classification_rules::ClassificationRule;
pub use public_exposure::PublicExposure;
