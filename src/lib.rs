//! This crate contains the GrubDash orders service.
//!
//! It defines the orders resource (model, store, request guards and
//! handlers), the HTTP front that routes requests to it, and the ambient
//! services (configuration, log sink, readiness probe) that run it on
//! pingora.

pub mod api;
pub mod config;
pub mod core;
pub mod logging;
pub mod orders;
pub mod service;
pub(crate) mod utils;
