//! Data models for the travel bucket list.
//!
//! Table rows map onto these structs via `sqlx::FromRow`; request and
//! response bodies serialize as snake_case JSON via `serde`.

pub mod bucket_item;
pub mod destination;
