//! Stagehand core: domain models and pure logic for the screen-graph
//! navigation engine.
//!
//! A bot's user interface is described as a graph of [`screen::Screen`]s
//! grouped into stages, gated by composable [`permission::Rule`]s, with each
//! user's position persisted as a [`session::Session`] through the
//! [`session::SessionRepository`] contract.

pub mod action;
pub mod config;
pub mod error;
pub mod permission;
pub mod registry;
pub mod render;
pub mod role;
pub mod screen;
pub mod session;

// Re-export common error type
pub use error::{Result, StagehandError};
