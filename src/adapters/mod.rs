//! Adapter implementations for port traits.
//!
//! - `live/` — Real generator implementations (remote service, local function)
//! - `recording/` — Record interactions to cassettes
//! - `replaying/` — Replay interactions from cassettes

pub mod live;
pub mod recording;
pub mod replaying;
