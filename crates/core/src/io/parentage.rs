//! Three-column parentage input: `ID, Sire, Dam`.
//!
//! `0` and `?` (or an empty field) mean the parent is unrecorded. Rows
//! with no content warn and are skipped; a duplicate child ID warns and
//! keeps the first record.

use std::collections::HashMap;
use std::io::Read;

use indexmap::IndexSet;

use crate::error::Result;
use crate::sources::ParentageSource;

use super::column_position;
use super::relatedness::field;

/// Recorded parent-offspring links read from a three-column CSV.
pub struct ThreeColumnCsv {
    sires: HashMap<String, String>,
    dams: HashMap<String, String>,
    indvs: Vec<String>,
}

impl ThreeColumnCsv {
    /// Read a three-column parentage file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, required columns are
    /// missing, or the CSV is malformed.
    pub fn from_csv<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read parentage data from any reader.
    ///
    /// # Errors
    /// Returns an error if required columns are missing or the CSV is
    /// malformed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        let id_col = column_position(&headers, "id")?;
        let sire_col = column_position(&headers, "sire")?;
        let dam_col = column_position(&headers, "dam")?;

        let mut sires: HashMap<String, String> = HashMap::new();
        let mut dams: HashMap<String, String> = HashMap::new();
        let mut indv_set: IndexSet<String> = IndexSet::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            let id = field(&record, id_col, "ID")?;
            let sire = parse_parent(field(&record, sire_col, "Sire")?);
            let dam = parse_parent(field(&record, dam_col, "Dam")?);

            if id.is_empty() && sire.is_none() && dam.is_none() {
                log::warn!("Problem reading parentage entry #{}: empty row", row + 1);
                continue;
            }
            if sire.is_none() && dam.is_none() {
                continue;
            }
            if indv_set.contains(id) {
                log::warn!(
                    "Duplicate parentage entry for {}; keeping the first record",
                    id
                );
                continue;
            }

            indv_set.insert(id.to_string());
            if let Some(sire) = sire {
                sires.insert(id.to_string(), sire.to_string());
            }
            if let Some(dam) = dam {
                dams.insert(id.to_string(), dam.to_string());
            }
        }

        Ok(Self {
            sires,
            dams,
            indvs: indv_set.into_iter().collect(),
        })
    }
}

impl ParentageSource for ThreeColumnCsv {
    fn indvs(&self) -> &[String] {
        &self.indvs
    }

    fn sire(&self, id: &str) -> Option<&str> {
        self.sires.get(id).map(|s| s.as_str())
    }

    fn dam(&self, id: &str) -> Option<&str> {
        self.dams.get(id).map(|s| s.as_str())
    }
}

/// `0`, `?`, and empty fields mean the parent is unrecorded.
fn parse_parent(s: &str) -> Option<&str> {
    match s {
        "" | "0" | "?" => None,
        other => Some(other),
    }
}
