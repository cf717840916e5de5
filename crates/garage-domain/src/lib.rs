//! Domain layer - vehicle behaviour, alerts, forecast aggregation

pub mod repository;
pub mod service;
