//! Maloja scrobble server integration
//!
//! Reads listening history from a Maloja server's native API.
//!
//! API docs: https://github.com/krateng/maloja/blob/master/API.md

pub mod dto;
mod adapter;
mod client;

pub use adapter::{to_raw_scrobble, to_raw_scrobbles};
pub use client::MalojaClient;
