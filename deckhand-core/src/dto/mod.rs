//! Data Transfer Objects for the orchestration service
//!
//! Payloads returned by the trigger and status endpoints. Listing endpoints
//! decode straight into the domain types.

pub mod execution;
