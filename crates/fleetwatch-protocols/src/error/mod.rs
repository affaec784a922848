//! Error types for the fleetwatch contracts.

mod cache;
mod control_plane;
mod http;
mod mail;
mod repository;

pub use cache::*;
pub use control_plane::*;
pub use http::*;
pub use mail::*;
pub use repository::*;
