pub mod client;

pub use client::{CLIENT_SORT_KEYS, Client, NewClient};
