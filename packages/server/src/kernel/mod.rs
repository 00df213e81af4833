//! Kernel module - server infrastructure and dependencies.

pub mod openai;
pub mod scheduled_tasks;
pub mod serper_client;
pub mod test_dependencies;
pub mod traits;

pub use openai::{OpenAIClient, OpenAIError};
pub use scheduled_tasks::{BlogScheduler, JobInfo};
pub use serper_client::SerperClient;
pub use test_dependencies::TestDependencies;
pub use traits::*;
