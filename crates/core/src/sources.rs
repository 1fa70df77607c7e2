//! Interfaces to the data sources the graph engine consumes. Concrete CSV
//! implementations live in [`crate::io`]; tests supply in-memory fakes.

use crate::degree::Degree;

/// Recorded sex of an individual. `Unknown` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sex {
    #[default]
    Unknown,
    Female,
    Male,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Sex::Female => "Female",
            Sex::Male => "Male",
            Sex::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}

/// Pairwise relatedness estimates over a set of known individuals.
pub trait RelatednessSource {
    /// All individuals present in the relatedness data.
    fn indvs(&self) -> &[String];

    /// The relatedness coefficient between two individuals, looked up
    /// symmetrically. Absent pairs are 0.0 (unrelated).
    fn relatedness(&self, a: &str, b: &str) -> f64;

    /// The relational degree between two individuals.
    fn rel_distance(&self, a: &str, b: &str) -> Degree;
}

/// Recorded parent-offspring links.
pub trait ParentageSource {
    /// Children with at least one recorded parent.
    fn indvs(&self) -> &[String];

    /// The recorded sire of `id`, if any.
    fn sire(&self, id: &str) -> Option<&str>;

    /// The recorded dam of `id`, if any.
    fn dam(&self, id: &str) -> Option<&str>;
}

/// Recorded ages and sexes.
pub trait DemographicsSource {
    /// Individuals with demographic records.
    fn indvs(&self) -> &[String];

    /// Age in years, if recorded. `Some(0)` means born this year; `None`
    /// means not recorded — the two are never conflated.
    fn age(&self, id: &str) -> Option<u32>;

    /// Recorded sex, if any.
    fn sex(&self, id: &str) -> Option<Sex>;
}
