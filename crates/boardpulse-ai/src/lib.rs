pub mod error;
pub mod generator;
pub mod models;
pub mod prompt;
pub mod providers;

pub use error::GenerationError;
pub use generator::{build_generator, GeneratorConfig, NarrativeGenerator};
pub use providers::azure::AzureFoundryProvider;
pub use providers::openai::OpenAICompatibleProvider;
