use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{PricefloorError, Result};
use crate::sheets::rows::cell_text;
use crate::sheets::{Row, SheetStore};

/// In-process sheet store keyed by exact range string.
///
/// Reads return whatever was seeded or last written for that range; appends
/// accumulate per range.
#[derive(Debug, Default)]
pub struct MemorySheets {
    ranges: Mutex<HashMap<String, Vec<Vec<String>>>>,
    updates: Mutex<Vec<(String, Vec<Row>)>>,
    appends: Mutex<Vec<(String, Vec<Row>)>>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(self, range: &str, rows: Vec<Vec<&str>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(String::from).collect())
            .collect();
        if let Ok(mut ranges) = self.ranges.lock() {
            ranges.insert(range.to_string(), rows);
        }
        self
    }

    /// Every `update_range` call, in order
    pub fn updates(&self) -> Vec<(String, Vec<Row>)> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// Every non-empty `append_rows` call, in order
    pub fn appends(&self) -> Vec<(String, Vec<Row>)> {
        self.appends.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

fn poisoned<T>(_: T) -> PricefloorError {
    PricefloorError::Other("memory sheet lock poisoned".into())
}

#[async_trait]
impl SheetStore for MemorySheets {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let ranges = self.ranges.lock().map_err(poisoned)?;
        Ok(ranges.get(range).cloned().unwrap_or_default())
    }

    async fn update_range(&self, range: &str, rows: Vec<Row>) -> Result<()> {
        let text = rows.iter().map(|row| row.iter().map(cell_text).collect()).collect();
        self.ranges.lock().map_err(poisoned)?.insert(range.to_string(), text);
        self.updates.lock().map_err(poisoned)?.push((range.to_string(), rows));
        Ok(())
    }

    async fn append_rows(&self, range: &str, rows: Vec<Row>) -> Result<()> {
        if !rows.is_empty() {
            self.appends.lock().map_err(poisoned)?.push((range.to_string(), rows));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_seeded_read_and_write() {
        let store = MemorySheets::new().with_range("Links!A1:Z", vec![vec!["a", "b"]]);
        assert_eq!(store.read_range("Links!A1:Z").await.unwrap(), vec![vec!["a", "b"]]);
        assert!(store.read_range("Other!A1").await.unwrap().is_empty());

        store.update_range("Out!B1:G", vec![vec![json!(1.5)]]).await.unwrap();
        assert_eq!(store.read_range("Out!B1:G").await.unwrap(), vec![vec!["1.5"]]);
        assert_eq!(store.updates().len(), 1);

        store.append_rows("Log!A2:E", vec![]).await.unwrap();
        store.append_rows("Log!A2:E", vec![vec![json!("x")]]).await.unwrap();
        assert_eq!(store.appends().len(), 1);
    }
}
