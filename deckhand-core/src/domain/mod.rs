//! Core domain types
//!
//! This module contains the domain structures used across Deckhand crates.
//! Applications and pipelines are read from the orchestration service; the
//! execution types describe the lifecycle of one triggered pipeline run.

pub mod application;
pub mod execution;
pub mod pipeline;
