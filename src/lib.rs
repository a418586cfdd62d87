//! Task marketplace backend library.
//!
//! Requesters post tasks, providers advertise skills and bid on tasks, and
//! the two sides move a task from offer to review over a REST API.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod mapper;
pub mod types;
pub mod validate;
