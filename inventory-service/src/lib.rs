//! Inventory Service - records stock movements and applies them to products.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
