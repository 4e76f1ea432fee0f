#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and pure policy for the vidgen client.
//!
//! Everything here is IO-free: wire types for the generation service,
//! the retry/backoff policy, and the error taxonomy. The HTTP client and
//! the tracker live in `vidgen-client`.

pub mod api;
pub mod backoff;
pub mod error;
pub mod model;

mod util;

pub use util::now_ms;
