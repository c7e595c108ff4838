//! `kcap`: fetch a diagnostic inspect capture, validate its container
//! structure while it streams to disk, and install it under a collision-safe
//! name.

pub mod cli;
pub mod config;
pub mod output;
pub mod ui;
