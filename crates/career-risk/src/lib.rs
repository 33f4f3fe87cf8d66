//! Stateless quantitative models estimating automation exposure and
//! career-transition outcomes, plus the HTTP surface that serves them.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod telemetry;
