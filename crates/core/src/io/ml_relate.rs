//! ML-Relate export input.
//!
//! Ten columns: `Ind1, Ind2, R, LnL.R., U, HS, FS, PO, Relationships,
//! Relatedness`. The categorical `R` column carries the inferred
//! relationship; the final `Relatedness` column carries the coefficient.

use std::collections::HashMap;
use std::io::Read;

use indexmap::IndexSet;

use crate::degree::Degree;
use crate::error::Result;
use crate::sources::RelatednessSource;

use super::relatedness::{field, lookup};
use super::{column_position, normalize_values};

/// Pairwise relatedness read from an ML-Relate output file.
pub struct MlRelateCsv {
    rels: HashMap<String, HashMap<String, f64>>,
    dists: HashMap<String, HashMap<String, Degree>>,
    indvs: Vec<String>,
}

impl MlRelateCsv {
    /// Read an ML-Relate export file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, required columns are
    /// missing, or the CSV is malformed.
    pub fn from_csv<P: AsRef<std::path::Path>>(path: P, normalize: bool) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, normalize)
    }

    /// Read ML-Relate data from any reader.
    ///
    /// # Errors
    /// Returns an error if required columns are missing or the CSV is
    /// malformed.
    pub fn from_reader<R: Read>(reader: R, normalize: bool) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        let ind1_col = column_position(&headers, "ind1")?;
        let ind2_col = column_position(&headers, "ind2")?;
        let r_col = column_position(&headers, "r")?;
        let rel_col = column_position(&headers, "relatedness")?;

        let mut entries: Vec<(String, String, f64, Degree)> = Vec::new();

        for result in rdr.records() {
            let record = result?;
            let from = field(&record, ind1_col, "Ind1")?.to_string();
            let to = field(&record, ind2_col, "Ind2")?.to_string();
            let category = field(&record, r_col, "R")?;
            let raw_rel = field(&record, rel_col, "Relatedness")?;

            let val = match raw_rel.parse::<f64>() {
                // Negative estimates just mean unrelated.
                Ok(v) => v.max(0.0),
                Err(_) => {
                    log::warn!(
                        "Unparseable relatedness {:?} for pair ({}, {}); treating as unrelated",
                        raw_rel,
                        from,
                        to
                    );
                    0.0
                }
            };

            let degree = Degree::from_category(category);
            if degree.is_unrelated() && category != "U" {
                log::warn!(
                    "Unrecognized relationship category {:?} for pair ({}, {}); treating as unrelated",
                    category,
                    from,
                    to
                );
            }

            entries.push((from, to, val, degree));
        }

        if normalize {
            let mut vals: Vec<f64> = entries.iter().map(|e| e.2).collect();
            normalize_values(&mut vals);
            for (entry, val) in entries.iter_mut().zip(vals) {
                entry.2 = val;
            }
        }

        let mut indv_set: IndexSet<String> = IndexSet::new();
        let mut rels: HashMap<String, HashMap<String, f64>> = HashMap::new();
        let mut dists: HashMap<String, HashMap<String, Degree>> = HashMap::new();

        for (from, to, val, degree) in entries {
            indv_set.insert(from.clone());
            indv_set.insert(to.clone());
            rels.entry(from.clone()).or_default().insert(to.clone(), val);
            dists.entry(from).or_default().insert(to, degree);
        }

        Ok(Self {
            rels,
            dists,
            indvs: indv_set.into_iter().collect(),
        })
    }
}

impl RelatednessSource for MlRelateCsv {
    fn indvs(&self) -> &[String] {
        &self.indvs
    }

    fn relatedness(&self, a: &str, b: &str) -> f64 {
        lookup(&self.rels, a, b).unwrap_or(0.0)
    }

    fn rel_distance(&self, a: &str, b: &str) -> Degree {
        lookup(&self.dists, a, b).unwrap_or(Degree::Unrelated)
    }
}
