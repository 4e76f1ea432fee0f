#![forbid(unsafe_code)]

//! HTTP client and job tracker for the video generation service.
//!
//! A [`Tracker`] owns one job's lifecycle: it polls the status endpoint,
//! reconciles payloads into the `queued -> running -> completed | failed`
//! lifecycle, retries transport failures with capped exponential backoff,
//! and dispatches progress and terminal events to registered observers.
//! [`TrackerRegistry`] keeps at most one live tracker per job id.

pub mod registry;
pub mod status;
pub mod tracker;

pub use registry::TrackerRegistry;
pub use status::{HttpStatusClient, StatusSource};
pub use tracker::{Tracker, TrackerConfig, TrackerHandle};
