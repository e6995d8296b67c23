//! MCP tool implementations.
//!
//! This module contains all tools exposed by the sitebrief server.

pub mod audit;
pub mod cache;
