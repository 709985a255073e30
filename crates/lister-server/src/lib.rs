//! HTML front end: the listing form, result pages, and health check.

pub mod dto;
pub mod error;
pub mod page;
pub mod routes;
pub mod state;
