//! HTTP surface: middleware and service handlers

pub mod middleware;
pub mod services;
