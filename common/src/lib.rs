//! Shared building blocks for the hotel booking services.
//!
//! - [`search`]: the hotel filter/sort pipeline behind the catalog listing
//! - [`pricing`]: nights and total price of a stay
//! - [`models`]: typed entities and request/response bodies
//! - [`errors`] / [`response`]: the error type and the JSON envelope every endpoint uses
//! - [`config`], [`logging`], [`db`], [`middleware`]: service plumbing

pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod response;
pub mod search;
pub mod utils;
