//! Session runtime: policy transport, simulated input and the per-tick
//! control loop built on `osrsml-core`.

mod config;
mod controller;
mod error;
mod host;
mod input;
mod policy;
mod protocol;
mod status;

pub use config::*;
pub use controller::*;
pub use error::*;
pub use host::*;
pub use input::*;
pub use policy::*;
pub use protocol::*;
pub use status::*;
