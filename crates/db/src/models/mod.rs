//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Read-side views joined with the data a page needs
//! - Plain create/update DTOs consumed by the repositories

pub mod blueprint;
pub mod commentary;
pub mod like;
pub mod tag;
pub mod user;
