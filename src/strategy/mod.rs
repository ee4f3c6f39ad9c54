pub mod bos;
pub mod ticket;

pub use bos::{analyze, BosReport};
