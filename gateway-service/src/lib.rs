//! Gateway Service - verifies bearer tokens and forwards requests to the
//! service that owns the path.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod services;
pub mod startup;
