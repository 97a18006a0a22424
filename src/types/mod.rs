//! Type definitions module.
//!
//! Contains shared types used across the application.

pub mod amount;
pub mod quote;
pub mod token;

pub use amount::*;
pub use quote::*;
pub use token::*;
