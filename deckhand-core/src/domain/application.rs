//! Application domain types

use serde::{Deserialize, Serialize};

/// A deployed application known to the orchestration service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
}
