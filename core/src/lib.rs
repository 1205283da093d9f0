//! agencydesk-core — analytics core for the agency support dashboard.
//!
//! Pure computation over in-memory collections plus a thin SQLite
//! query layer. No rendering, routing, or network code lives here.

pub mod aggregate;
pub mod directory;
pub mod distribution;
pub mod drafting;
pub mod error;
pub mod generator;
pub mod period;
pub mod rng;
pub mod sample;
pub mod store;
pub mod themes;
pub mod types;
