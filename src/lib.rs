//! journey-manifest - Builds the project manifest for the web-dev-journey portfolio

pub mod builder;
pub mod commands;
pub mod config;
pub mod models;
pub mod scan;
pub mod sections;
pub mod validation;
