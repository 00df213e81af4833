pub mod blog;
pub mod generation;
