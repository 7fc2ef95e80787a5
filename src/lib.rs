//! Climate Events Dashboard core
//!
//! Loads the climate events CSV once and turns it into the tables behind the
//! three dashboard views: temporal comparison, severity vs economic impact,
//! and the world map.

pub mod config;
pub mod data;
pub mod stats;
