//! Application Configuration
//!
//! Configuration for the market application layer.

use crate::domain::entities::BountyLimits;
use crate::domain::repository::Page;

/// Market application configuration
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Prefix of the hosted preview path given to submissions without their own URL
    pub preview_base_url: String,
    /// Budget ceiling and submission cap bounds
    pub limits: BountyLimits,
    /// Reputation credited to the winning builder
    pub reputation_per_award: i64,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            preview_base_url: "/api/preview".to_string(),
            limits: BountyLimits::default(),
            reputation_per_award: 100,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl MarketConfig {
    pub fn with_preview_base_url(mut self, url: impl Into<String>) -> Self {
        self.preview_base_url = url.into();
        self
    }

    /// Clamp client paging into range
    pub fn page(&self, limit: Option<i64>, offset: Option<i64>) -> Page {
        Page {
            limit: limit
                .unwrap_or(self.default_page_size)
                .clamp(1, self.max_page_size),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}
