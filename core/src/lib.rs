pub mod action;
pub mod config;
pub mod report;
pub mod serdable;
pub mod session;
pub mod style;
pub mod testing;

pub use crate::config::Config;
pub use crate::session::{Session, Summary};
