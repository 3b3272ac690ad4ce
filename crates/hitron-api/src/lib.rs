// hitron-api: Async Rust client for the Hitron cable modem's web management API
//
// The device speaks an undocumented JSON dialect behind a cookie-based login
// and tolerates exactly one authenticated session at a time. This crate owns
// that protocol: the single-slot session gate, the login handshake (including
// the device-enforced lockout cool-down), and the generic fetch-and-decode
// primitive for the `/data/get<Name>.asp` endpoints.

pub mod error;
pub mod gate;
pub mod models;
pub mod router;
pub mod session;
pub mod transport;

pub use error::Error;
pub use gate::{SessionGate, SessionPermit};
pub use router::{HitronRouter, RouterConfig};
pub use session::Session;
pub use transport::TransportConfig;
