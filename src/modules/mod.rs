//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the storage gateway and its hosted and local backends.

pub mod storage;
