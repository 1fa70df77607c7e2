//! Three-column demographics input: `ID, Sex, Birth Year`.
//!
//! Sex accepts `F`/`Female`, `M`/`Male`, `U`/`Unknown` case-insensitively;
//! anything else warns and degrades to Unknown. Age derives from the birth
//! year relative to `current_year` and stays unrecorded (`None`) for
//! unparseable or future years — zero always means "born this year",
//! never "not provided".

use std::collections::HashMap;
use std::io::Read;

use indexmap::IndexSet;

use crate::error::Result;
use crate::sources::{DemographicsSource, Sex};

use super::column_position;
use super::relatedness::field;

/// Recorded ages and sexes read from a three-column CSV.
pub struct ThreeColumnCsv {
    ages: HashMap<String, u32>,
    sexes: HashMap<String, Sex>,
    indvs: Vec<String>,
}

impl ThreeColumnCsv {
    /// Read a three-column demographics file, deriving ages relative to
    /// `current_year`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, required columns are
    /// missing, or the CSV is malformed.
    pub fn from_csv<P: AsRef<std::path::Path>>(path: P, current_year: u32) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, current_year)
    }

    /// Read demographics data from any reader.
    ///
    /// # Errors
    /// Returns an error if required columns are missing or the CSV is
    /// malformed.
    pub fn from_reader<R: Read>(reader: R, current_year: u32) -> Result<Self> {
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
        let sex_col = column_position(&headers, "sex")?;
        let birth_col = column_position(&headers, "birth year")?;

        let mut ages: HashMap<String, u32> = HashMap::new();
        let mut sexes: HashMap<String, Sex> = HashMap::new();
        let mut indv_set: IndexSet<String> = IndexSet::new();

        for result in rdr.records() {
            let record = result?;
            let id = field(&record, id_col, "ID")?.to_string();
            let raw_sex = field(&record, sex_col, "Sex")?;
            let raw_birth = field(&record, birth_col, "Birth Year")?;

            if indv_set.contains(&id) {
                log::warn!(
                    "Duplicate demographics entry for {}; keeping the first record",
                    id
                );
                continue;
            }
            indv_set.insert(id.clone());

            let sex = match parse_sex(raw_sex) {
                Some(sex) => sex,
                None => {
                    log::warn!(
                        "Did not understand Sex {:?} for {}; setting Sex to Unknown",
                        raw_sex,
                        id
                    );
                    Sex::Unknown
                }
            };
            sexes.insert(id.clone(), sex);

            match raw_birth.parse::<u32>() {
                Ok(birth) if birth <= current_year => {
                    ages.insert(id, current_year - birth);
                }
                Ok(birth) => {
                    log::warn!(
                        "Birth year {} for {} is in the future; leaving age unrecorded",
                        birth,
                        id
                    );
                }
                Err(_) => {
                    log::warn!(
                        "Unparseable birth year {:?} for {}; leaving age unrecorded",
                        raw_birth,
                        id
                    );
                }
            }
        }

        Ok(Self {
            ages,
            sexes,
            indvs: indv_set.into_iter().collect(),
        })
    }
}

impl DemographicsSource for ThreeColumnCsv {
    fn indvs(&self) -> &[String] {
        &self.indvs
    }

    fn age(&self, id: &str) -> Option<u32> {
        self.ages.get(id).copied()
    }

    fn sex(&self, id: &str) -> Option<Sex> {
        self.sexes.get(id).copied()
    }
}

fn parse_sex(s: &str) -> Option<Sex> {
    match s.to_uppercase().as_str() {
        "F" | "FEMALE" => Some(Sex::Female),
        "M" | "MALE" => Some(Sex::Male),
        "U" | "UNKNOWN" => Some(Sex::Unknown),
        _ => None,
    }
}
