use crate::error::{Result, RingError};
use std::collections::HashMap;
use std::path::Path;

/// Separates the restaurant from its dish in a feed file line.
const SEPARATOR: char = ';';

/// Endless source of (restaurant, daily special) batches.
///
/// Walks a fixed backing list circularly, `batch_size` entries per call, so repeated
/// calls keep refreshing the same restaurants.
#[derive(Debug, Clone)]
pub struct DataFeed {
    entries: Vec<(String, String)>,
    batch_size: usize,
    cursor: usize,
}

impl DataFeed {
    pub fn new(entries: Vec<(String, String)>, batch_size: usize) -> Result<Self> {
        if entries.is_empty() {
            return Err(RingError::InvalidFeed("no entries".to_string()));
        }
        if batch_size == 0 {
            return Err(RingError::InvalidFeed("batch size must be positive".to_string()));
        }

        Ok(Self {
            entries,
            batch_size,
            cursor: 0,
        })
    }

    /// Loads a feed from a file with one `restaurant;dish` pair per line.
    pub fn from_file(path: impl AsRef<Path>, batch_size: usize) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let entries = parse_entries(&content)?;
        tracing::info!(
            "Loaded {} entries from {}",
            entries.len(),
            path.as_ref().display()
        );
        Self::new(entries, batch_size)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The next `batch_size` pairs, wrapping around the backing list.
    pub fn next_batch(&mut self) -> Vec<(String, String)> {
        let start = self.cursor;
        let batch = (0..self.batch_size)
            .map(|i| self.entries[(start + i) % self.entries.len()].clone())
            .collect();

        self.cursor = (start + self.batch_size) % self.entries.len();
        batch
    }
}

/// Parses `restaurant;dish` lines. A restaurant listed twice keeps the dish of its
/// last line, at the position of its first one.
pub fn parse_entries(content: &str) -> Result<Vec<(String, String)>> {
    let mut entries: Vec<(String, String)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (restaurant, dish) = line.split_once(SEPARATOR).ok_or_else(|| {
            RingError::InvalidFeed(format!("line {}: missing '{}'", line_no + 1, SEPARATOR))
        })?;

        let (restaurant, dish) = (restaurant.trim().to_string(), dish.trim().to_string());
        match positions.get(&restaurant) {
            Some(&pos) => entries[pos].1 = dish,
            None => {
                positions.insert(restaurant.clone(), entries.len());
                entries.push((restaurant, dish));
            }
        }
    }

    Ok(entries)
}
