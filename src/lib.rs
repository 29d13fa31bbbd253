//! `hci-atlas` library crate.
//!
//! The binary (`hci`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - dashboards and models can be reused from other front-ends

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboards;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
