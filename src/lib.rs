//! Magno Library
//!
//! Core modules for the Magno vehicle inventory voice assistant.

pub mod agent;
pub mod backend;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod intent;
pub mod matcher;
pub mod responder;
pub mod result;
pub mod store;
pub mod utils;
