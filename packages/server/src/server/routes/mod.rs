// HTTP routes
pub mod generate;
pub mod health;
pub mod posts;
pub mod root;
pub mod scheduler;
pub mod stats;

pub use generate::*;
pub use health::*;
pub use posts::*;
pub use root::*;
pub use scheduler::*;
pub use stats::*;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::server::ApiError;

/// Parse a JSON body that may be omitted entirely.
pub(crate) fn optional_json<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}
