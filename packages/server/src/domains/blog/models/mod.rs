pub mod blog_post;
pub mod generation_log;

pub use blog_post::*;
pub use generation_log::*;
