pub mod slug;

pub use slug::*;
