//! Request and Response models for the HTTP surface

pub mod requests;
pub mod responses;

pub use requests::{PageQuery, RelatedQuery, SearchQuery};
pub use responses::{ClearResponse, ErrorResponse, HealthResponse, InvalidateResponse};
