//! Core library for the campus placement portal.
//!
//! The portal tracks students, job openings posted by the placement cell,
//! placement outcomes (selections), and each student's declared interest in
//! an opening. Persistence lives behind store traits so the services can be
//! exercised against in-memory fixtures or a real database adapter.

pub mod config;
pub mod error;
pub mod portal;
pub mod telemetry;
