pub mod check;
pub mod cli;
pub mod config;
pub mod cycle;
pub mod dedup;
pub mod duration;
pub mod error;
pub mod model;
pub mod schedule;
pub mod source;
pub mod status;

pub use crate::cycle::{Bot, CycleReport};

pub const PROJECT_NAME: &str = "starpocket";

/// User agent sent with every outbound HTTP request
pub const USER_AGENT: &str = concat!("starpocket/", env!("CARGO_PKG_VERSION"));
