//! DTOs for the web API.

pub mod request;
pub mod response;

pub use request::DownloadRequest;
pub use response::{ApiResponse, MessageResponse};
