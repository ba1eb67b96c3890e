//! Core types for the vApteke customers service.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod name;
pub mod phone;
pub mod platform;

pub use email::{Email, EmailError};
pub use id::*;
pub use name::{PersonName, PersonNameError, title_case};
pub use phone::{Phone, PhoneError};
pub use platform::{Gender, Platform};
