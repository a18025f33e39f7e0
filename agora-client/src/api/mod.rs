pub mod client;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Api, ApiClient};
pub use error::{ApiError, ApiResult};
