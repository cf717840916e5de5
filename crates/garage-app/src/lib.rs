//! Application service layer - use cases, config, trip planning

pub mod app;
pub mod config;
pub mod repository;
