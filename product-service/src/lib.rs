//! Product Service - catalog entries and their on-hand stock.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
