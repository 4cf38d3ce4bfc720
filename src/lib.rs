//! The Nimbus CLI library.
//!
//! This crate provides the command tree, the execution pipeline shared by
//! every command and typed clients for the Nimbus cloud APIs.
//!
//! # Modules
//!
//! - `actions`: Executors of the leaf commands
//! - `cli`: Argument parsing and dispatch
//! - `commands`: The declarative command tree
//! - `configuration`: Persisted settings
//! - `executor`: Pipeline steps shared by the leaves
//! - `print`: Output, diagnostics and confirmation prompts
//! - `sdk`: Service API clients
//! - `wait`: Polling of long-running operations

pub mod actions;
pub mod cli;
pub mod commands;
pub mod configuration;
pub mod context;
pub mod error;
pub mod executor;
pub mod exit_codes;
pub mod flags;
pub mod format;
pub mod globalflags;
pub mod print;
pub mod sdk;
pub mod spinner;
pub mod tables;
pub mod wait;
