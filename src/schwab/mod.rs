pub mod client;

pub use client::{SchwabClient, SchwabError};
