//! Domain models for the Uniform Stock Management Platform

mod alert;
mod audit;
mod batch;
mod variant;

pub use alert::*;
pub use audit::*;
pub use batch::*;
pub use variant::*;
