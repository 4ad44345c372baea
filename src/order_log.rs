//! Order log collaborator
//!
//! One row per accepted order. The production sink writes the row to the
//! structured log when a sheet is configured and is a no-op otherwise;
//! append failures are logged and never reach the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::order::OrderBrief;

/// A single order log row
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderRow {
    pub timestamp: DateTime<Utc>,
    pub email: String,
    pub styles: String,
    pub vocal: String,
    pub language: String,
    pub brief: String,
    pub lyrics: String,
    pub link1: String,
    pub link2: String,
    pub format: String,
}

impl OrderRow {
    pub fn from_order(order: &OrderBrief, lyrics: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            email: order.email.clone(),
            styles: order.styles.clone(),
            vocal: order.vocal.clone(),
            language: order.language.clone(),
            brief: order.brief.clone(),
            lyrics: lyrics.to_string(),
            link1: String::new(),
            link2: String::new(),
            format: order.format.clone(),
        }
    }

    pub fn with_links(mut self, link1: impl Into<String>, link2: impl Into<String>) -> Self {
        self.link1 = link1.into();
        self.link2 = link2.into();
        self
    }

    /// Cells in column order
    pub fn cells(&self) -> [String; 10] {
        [
            self.timestamp.to_rfc3339(),
            self.email.clone(),
            self.styles.clone(),
            self.vocal.clone(),
            self.language.clone(),
            self.brief.clone(),
            self.lyrics.clone(),
            self.link1.clone(),
            self.link2.clone(),
            self.format.clone(),
        ]
    }
}

#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn append_order_row(&self, row: &OrderRow);
}

/// Writes rows to the tracing output, tagged with the sheet id
pub struct TracingOrderSink {
    sheet_id: Option<String>,
}

impl TracingOrderSink {
    pub fn new(sheet_id: Option<String>) -> Self {
        Self { sheet_id }
    }
}

#[async_trait]
impl OrderSink for TracingOrderSink {
    async fn append_order_row(&self, row: &OrderRow) {
        let Some(sheet_id) = &self.sheet_id else {
            debug!("SHEETS_ID not set, order row not logged");
            return;
        };
        info!(sheet_id = %sheet_id, row = %row.cells().join(" | "), "Order row");
    }
}
