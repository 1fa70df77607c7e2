//! Three-column relatedness input: `ID1, ID2, Rel`.
//!
//! `Rel` is either a numeric relatedness coefficient or a categorical code
//! (`PO`, `FS`, `HS`, `U`). Negative estimates just mean unrelated and
//! clamp to zero; an unrecognized entry warns and degrades to unrelated.

use std::collections::HashMap;
use std::io::Read;

use indexmap::IndexSet;

use crate::degree::Degree;
use crate::error::{KindredError, Result};
use crate::sources::RelatednessSource;

use super::{column_position, normalize_values};

/// Pairwise relatedness read from a three-column CSV.
#[derive(Debug)]
pub struct ThreeColumnCsv {
    rels: HashMap<String, HashMap<String, f64>>,
    dists: HashMap<String, HashMap<String, Degree>>,
    indvs: Vec<String>,
}

impl ThreeColumnCsv {
    /// Read a three-column relatedness file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, required columns are
    /// missing, or the CSV is malformed.
    pub fn from_csv<P: AsRef<std::path::Path>>(path: P, normalize: bool) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, normalize)
    }

    /// Read three-column relatedness data from any reader.
    ///
    /// With `normalize`, values are scaled into [0, 1] before degrees are
    /// derived, so inserted weights and inferred degrees always agree.
    ///
    /// # Errors
    /// Returns an error if required columns are missing or the CSV is
    /// malformed.
    pub fn from_reader<R: Read>(reader: R, normalize: bool) -> Result<Self> {
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
        let id1_col = column_position(&headers, "id1")?;
        let id2_col = column_position(&headers, "id2")?;
        let rel_col = column_position(&headers, "rel")?;

        // (from, to, relatedness, categorical degree if the entry was a code)
        let mut entries: Vec<(String, String, f64, Option<Degree>)> = Vec::new();

        for result in rdr.records() {
            let record = result?;
            let from = field(&record, id1_col, "ID1")?.to_string();
            let to = field(&record, id2_col, "ID2")?.to_string();
            let raw = field(&record, rel_col, "Rel")?;

            match raw.parse::<f64>() {
                Ok(val) => {
                    // Negative estimates just mean unrelated.
                    entries.push((from, to, val.max(0.0), None));
                }
                Err(_) => {
                    let (val, degree) = match raw {
                        "PO" => (0.5, Degree::First),
                        "FS" => (0.25, Degree::Second),
                        "HS" => (0.125, Degree::Second),
                        "U" => (0.0, Degree::Unrelated),
                        other => {
                            log::warn!(
                                "Unrecognized relatedness entry {:?} for pair ({}, {}); treating as unrelated",
                                other,
                                from,
                                to
                            );
                            (0.0, Degree::Unrelated)
                        }
                    };
                    entries.push((from, to, val, Some(degree)));
                }
            }
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

        for (from, to, val, cat_degree) in entries {
            indv_set.insert(from.clone());
            indv_set.insert(to.clone());
            let degree = cat_degree.unwrap_or_else(|| Degree::from_relatedness(val));
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

impl RelatednessSource for ThreeColumnCsv {
    fn indvs(&self) -> &[String] {
        &self.indvs
    }

    fn relatedness(&self, a: &str, b: &str) -> f64 {
        lookup(&self.rels, a, b).unwrap_or(0.0)
    }

    fn rel_distance(&self, a: &str, b: &str) -> Degree {
        lookup(&self.dists, a, b).unwrap_or_else(|| Degree::from_relatedness(self.relatedness(a, b)))
    }
}

/// Symmetric nested-map lookup: `(a, b)` falls back to `(b, a)`.
pub(super) fn lookup<T: Copy>(
    map: &HashMap<String, HashMap<String, T>>,
    a: &str,
    b: &str,
) -> Option<T> {
    map.get(a)
        .and_then(|inner| inner.get(b))
        .or_else(|| map.get(b).and_then(|inner| inner.get(a)))
        .copied()
}

pub(super) fn field<'a>(
    record: &'a csv::StringRecord,
    col: usize,
    name: &str,
) -> Result<&'a str> {
    record
        .get(col)
        .ok_or_else(|| KindredError::Data(format!("Missing {} field in row", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_numeric_values() {
        let csv = "ID1,ID2,Rel\nA,B,0.5\nA,C,0.25\n";
        let rel = ThreeColumnCsv::from_reader(csv.as_bytes(), false).unwrap();

        assert_eq!(rel.indvs(), &["A", "B", "C"]);
        assert_relative_eq!(rel.relatedness("A", "B"), 0.5);
        assert_eq!(rel.rel_distance("A", "B"), Degree::First);
        assert_eq!(rel.rel_distance("A", "C"), Degree::Second);
    }

    #[test]
    fn test_symmetric_lookup() {
        let csv = "ID1,ID2,Rel\nA,B,0.5\n";
        let rel = ThreeColumnCsv::from_reader(csv.as_bytes(), false).unwrap();
        assert_relative_eq!(rel.relatedness("B", "A"), 0.5);
        assert_eq!(rel.rel_distance("B", "A"), Degree::First);
    }

    #[test]
    fn test_negative_clamps_to_unrelated() {
        let csv = "ID1,ID2,Rel\nA,B,-0.3\n";
        let rel = ThreeColumnCsv::from_reader(csv.as_bytes(), false).unwrap();
        assert_relative_eq!(rel.relatedness("A", "B"), 0.0);
        assert_eq!(rel.rel_distance("A", "B"), Degree::Unrelated);
    }

    #[test]
    fn test_categorical_codes() {
        let csv = "ID1,ID2,Rel\nA,B,PO\nA,C,FS\nA,D,HS\nA,E,U\n";
        let rel = ThreeColumnCsv::from_reader(csv.as_bytes(), false).unwrap();

        assert_relative_eq!(rel.relatedness("A", "B"), 0.5);
        assert_eq!(rel.rel_distance("A", "B"), Degree::First);
        assert_relative_eq!(rel.relatedness("A", "C"), 0.25);
        assert_eq!(rel.rel_distance("A", "C"), Degree::Second);
        // Half sibs keep a sibling-grade degree with their own weight.
        assert_relative_eq!(rel.relatedness("A", "D"), 0.125);
        assert_eq!(rel.rel_distance("A", "D"), Degree::Second);
        assert_eq!(rel.rel_distance("A", "E"), Degree::Unrelated);
    }

    #[test]
    fn test_unrecognized_entry_degrades_to_unrelated() {
        let csv = "ID1,ID2,Rel\nA,B,garbage\n";
        let rel = ThreeColumnCsv::from_reader(csv.as_bytes(), false).unwrap();
        assert_relative_eq!(rel.relatedness("A", "B"), 0.0);
        assert_eq!(rel.rel_distance("A", "B"), Degree::Unrelated);
    }

    #[test]
    fn test_absent_pair_is_unrelated() {
        let csv = "ID1,ID2,Rel\nA,B,0.5\n";
        let rel = ThreeColumnCsv::from_reader(csv.as_bytes(), false).unwrap();
        assert_relative_eq!(rel.relatedness("A", "Z"), 0.0);
        assert_eq!(rel.rel_distance("A", "Z"), Degree::Unrelated);
    }

    #[test]
    fn test_normalize_rescales_out_of_range_values() {
        let csv = "ID1,ID2,Rel\nA,B,2.0\nA,C,0.5\n";
        let rel = ThreeColumnCsv::from_reader(csv.as_bytes(), true).unwrap();
        assert_relative_eq!(rel.relatedness("A", "B"), 1.0);
        assert_relative_eq!(rel.relatedness("A", "C"), 0.25);
        // Degrees derive from the normalized value.
        assert_eq!(rel.rel_distance("A", "C"), Degree::Second);
    }

    #[test]
    fn test_missing_column_errors() {
        let csv = "ID1,ID2,Score\nA,B,0.5\n";
        let err = ThreeColumnCsv::from_reader(csv.as_bytes(), false).unwrap_err();
        assert!(format!("{}", err).contains("REL"), "Error was: {}", err);
    }

    #[test]
    fn test_whitespace_trimmed() {
        let csv = "ID1, ID2, Rel\n A , B , 0.5 \n";
        let rel = ThreeColumnCsv::from_reader(csv.as_bytes(), false).unwrap();
        assert_eq!(rel.indvs(), &["A", "B"]);
        assert_relative_eq!(rel.relatedness("A", "B"), 0.5);
    }
}
