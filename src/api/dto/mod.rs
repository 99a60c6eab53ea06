//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod event_dto;
pub mod host_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use host_dto::*;
