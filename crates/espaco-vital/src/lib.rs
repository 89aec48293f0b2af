//! Espaço Vital: a directory connecting clients to therapists and
//! therapeutic spaces.

pub mod catalog;
pub mod config;
pub mod error;
pub mod site;
pub mod telemetry;
