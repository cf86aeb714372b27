pub mod archive;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod maps;
pub mod platform;
pub mod report;
pub mod share;
pub mod store;
pub mod util;

pub use error::{Error, Result};
