//! Pure cover-drive biomechanics.
//!
//! Everything in this crate is synchronous, allocation-light, and free of
//! I/O: joint records produced by a pose estimator come in, category scores
//! and coaching feedback come out. Partial detection is the common case, so
//! absence travels in-band as `Option` — nothing here returns an error.

pub mod aggregate;
pub mod geometry;
pub mod joints;
pub mod metrics;
pub mod scoring;
