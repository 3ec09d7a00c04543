//! Common types used across the service

use serde::{Deserialize, Serialize};

/// A message in English and Portuguese
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedMessage {
    pub en: String,
    pub pt: String,
}

impl LocalizedMessage {
    pub fn new(en: impl Into<String>, pt: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            pt: pt.into(),
        }
    }
}
