// Blog Generation Service - Core
//
// Scheduled pipeline that researches, writes and stores blog posts on
// generative AI and blockchain topics, served over a small HTTP API.
//
// Flow: scheduler -> generator -> writing crew -> extraction -> store

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
