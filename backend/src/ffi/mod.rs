//! Python bindings (feature `pyo3`)
//!
//! Exposes the simulation runner to the Python service layer. The bindings
//! only move data across the boundary; every decision is made in Rust.

pub mod simulation;
pub mod types;
