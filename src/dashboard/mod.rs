//! Client side of the admin dashboard: session state and a typed API client.

mod client;
mod session;

pub use client::*;
pub use session::*;
