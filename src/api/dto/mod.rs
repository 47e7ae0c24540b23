//! Data Transfer Objects for REST response serialization.
//!
//! Timestamps are RFC 3339 strings in UTC. Open intervals carry a `null`
//! end.

pub mod alert_dto;
pub mod history_dto;
pub mod snapshot_dto;

pub use alert_dto::*;
pub use history_dto::*;
pub use snapshot_dto::*;
