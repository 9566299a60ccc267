pub mod config;
mod repositories;
mod resolve;

pub use repositories::*;
pub use resolve::*;
