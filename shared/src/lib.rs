//! Shared types and models for the Uniform Stock Management Platform
//!
//! This crate contains types shared between the stock engine, the application
//! layer, and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
