//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the blob storage backends and the vision-model classification gateway.

pub mod storage;
pub mod vision;
