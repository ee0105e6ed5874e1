//! Deckhand Core
//!
//! Core types and abstractions shared by the Deckhand crates.
//!
//! This crate contains:
//! - Domain types: applications, pipelines, execution handles and states
//! - DTOs: wire payloads exchanged with the orchestration service
//! - Endpoint resolution for deployed applications

pub mod domain;
pub mod dto;
pub mod endpoint;
