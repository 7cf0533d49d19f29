//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod activity;
pub mod competition;
pub mod participation;
pub mod user;

pub use activity::*;
pub use competition::*;
pub use participation::*;
pub use user::*;
