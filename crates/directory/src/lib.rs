//! Directory page listing service.
//!
//! This library exposes the listing internals for integration testing.
//! The main entry point for running the server is the `directory` binary.

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
