//! Domain models for the intake system.

mod appointment;
mod file;
mod patient;

pub use appointment::*;
pub use file::*;
pub use patient::*;
