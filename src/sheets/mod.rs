//! Range-based tabular store holding the link table, the result rows and the
//! append-only log.

pub mod google;
#[cfg(test)]
pub mod memory;
pub mod rows;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::Result;

pub use google::GoogleSheets;
#[cfg(test)]
pub use memory::MemorySheets;

/// One row of cell values as sent to or read from the store.
pub type Row = Vec<Value>;

#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Cells of `range` as text; formulas are returned as written.
    /// Trailing empty rows and cells may be missing.
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>>;

    /// Overwrite `range` starting at its top-left cell.
    async fn update_range(&self, range: &str, rows: Vec<Row>) -> Result<()>;

    /// Append rows after the last non-empty row of `range`.
    async fn append_rows(&self, range: &str, rows: Vec<Row>) -> Result<()>;
}

/// Spreadsheet layout and endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Spreadsheet holding the links, result and log sheets
    pub spreadsheet_id: String,

    /// Range of the links table, one product group per row
    pub links_range: String,

    /// Sheet receiving results in production runs
    pub target_sheet: String,

    /// Sheet receiving results in test mode
    pub test_sheet: String,

    /// Append-only log range
    pub log_range: String,

    /// Sheets API base URL
    pub api_base: String,

    /// OAuth token endpoint used to refresh access tokens
    pub token_endpoint: String,

    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            links_range: "Links!A1:Z".to_string(),
            target_sheet: "2022".to_string(),
            test_sheet: "2022Copy".to_string(),
            log_range: "Log!A2:E".to_string(),
            api_base: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
            token_endpoint: crate::auth::DEFAULT_TOKEN_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl SheetsConfig {
    pub fn result_sheet(&self, test_mode: bool) -> &str {
        if test_mode {
            &self.test_sheet
        } else {
            &self.target_sheet
        }
    }

    /// Whole result sheet, read for display names in column B
    pub fn names_range(&self, test_mode: bool) -> String {
        format!("{}!A1:Z", self.result_sheet(test_mode))
    }

    /// Result columns B..G
    pub fn output_range(&self, test_mode: bool) -> String {
        format!("{}!B1:G", self.result_sheet(test_mode))
    }
}
