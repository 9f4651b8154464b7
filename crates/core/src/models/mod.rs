//! Data models for Cazza

mod filter;
mod media;
mod room;
mod user;

pub use filter::*;
pub use media::*;
pub use room::*;
pub use user::*;
