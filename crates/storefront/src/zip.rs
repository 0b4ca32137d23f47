//! Hungarian postal code lookup.
//!
//! The checkout form auto-fills the city from the ZIP code. The table is
//! compiled into the binary from a bundled CSV (`code;city` per line) and
//! built once at startup; there is no external data source at runtime.

use std::collections::HashMap;

/// Bundled postal code data, one `code;city` pair per line.
const ZIP_CSV: &str = include_str!("../data/iranyitoszamok.csv");

/// In-memory postal code to city lookup table.
#[derive(Debug, Clone)]
pub struct ZipCodeTable {
    entries: HashMap<String, String>,
}

impl ZipCodeTable {
    /// Build the table from the bundled CSV.
    ///
    /// Malformed lines are skipped with a warning rather than failing
    /// startup; the table is an autofill convenience, not a validator.
    #[must_use]
    pub fn bundled() -> Self {
        Self::from_csv(ZIP_CSV)
    }

    fn from_csv(csv: &str) -> Self {
        let mut entries = HashMap::new();
        for line in csv.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once(';') {
                Some((code, city)) if !code.is_empty() && !city.is_empty() => {
                    entries.insert(code.trim().to_string(), city.trim().to_string());
                }
                _ => tracing::warn!(line = %line, "Skipping malformed ZIP code line"),
            }
        }
        tracing::info!(count = entries.len(), "ZIP code table loaded");
        Self { entries }
    }

    /// Look up the city for a postal code.
    ///
    /// The input is trimmed and must be exactly four digits; anything else
    /// returns `None` without consulting the table.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.entries.get(code).map(String::as_str)
    }

    /// Number of known postal codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
