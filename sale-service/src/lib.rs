//! Sale Service - registers sales against clients and products and debits stock.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
