// crates/optiface-config/src/lib.rs
// ============================================================================
// Module: Optiface Config Library
// Description: Application configuration model and validation.
// Purpose: Single source of truth for optiface.toml semantics.
// Dependencies: optiface-core, optiface-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `optiface-config` defines the application configuration for the
//! `optiface` binary: where problem spaces live, how their results databases
//! are opened, and the default log filter. Loading is strict and fails closed
//! on oversized, non-UTF-8, or invalid input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
