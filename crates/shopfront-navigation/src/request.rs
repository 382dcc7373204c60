//! Navigation requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// Add a history entry
    Push,
    /// Replace the current history entry
    Replace,
    /// Go one entry back
    Back,
}

impl NavigationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationMode::Push => "push",
            NavigationMode::Replace => "replace",
            NavigationMode::Back => "back",
        }
    }
}

impl std::fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One user intent to move somewhere. Newer requests supersede older queued
/// ones; they are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub id: Uuid,
    /// Opaque destination, typically a path like `/product/42`
    pub target_path: String,
    pub mode: NavigationMode,
    pub requested_at: DateTime<Utc>,
}

impl NavigationRequest {
    pub fn new(target_path: impl Into<String>, mode: NavigationMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_path: target_path.into(),
            mode,
            requested_at: Utc::now(),
        }
    }

    pub fn push(target_path: impl Into<String>) -> Self {
        Self::new(target_path, NavigationMode::Push)
    }

    pub fn replace(target_path: impl Into<String>) -> Self {
        Self::new(target_path, NavigationMode::Replace)
    }

    pub fn back() -> Self {
        Self::new(String::new(), NavigationMode::Back)
    }
}

impl std::fmt::Display for NavigationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mode {
            NavigationMode::Back => write!(f, "back"),
            mode => write!(f, "{} {}", mode, self.target_path),
        }
    }
}
