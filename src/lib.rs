//! Synthetic social follow graphs and the queries run against them

pub mod config;
pub mod data;
pub mod error;
pub mod generator;
pub mod graph;
pub mod storage;

pub use anyhow::{Result, anyhow};
pub use error::{GraphError, GraphResult};
