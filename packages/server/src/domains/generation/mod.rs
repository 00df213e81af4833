pub mod crew;
pub mod extraction;
pub mod generator;
pub mod markdown;
pub mod topics;

pub use crew::WritingCrew;
pub use extraction::{count_words, extract_blog_components, GenerationResult};
pub use generator::{
    BlogGenerator, GenerateRequest, GeneratedPostSummary, GenerationError, GenerationStage,
};
pub use markdown::normalize_markdown;
pub use topics::{SelectedTopic, Theme, TopicSelector};
