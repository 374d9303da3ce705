//! Domain logic for the blueprint library.
//!
//! Everything in this crate is free of I/O so it can be shared by the
//! repository layer, the HTTP layer and their tests.

pub mod error;
pub mod listing;
pub mod media;
pub mod ownership;
pub mod pagination;
pub mod tags;
pub mod types;
pub mod validation;
