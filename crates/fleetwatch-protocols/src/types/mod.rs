//! Domain types shared across fleetwatch crates.

mod recipient;
mod route;
mod status;
mod target;

pub use recipient::*;
pub use route::*;
pub use status::*;
pub use target::*;
