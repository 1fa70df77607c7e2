//! Relational degree: the discrete count of generational links separating
//! two individuals, derived from a relatedness coefficient.

/// Relational degree between two individuals.
///
/// `First` is a parent-offspring link, `Second` a sibling-grade link, and so
/// on up to `Ninth`, the maximum estimable relational distance from
/// relatedness data. `Unrelated` sorts below every estimable degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Degree {
    /// No estimable relationship.
    Unrelated = 0,
    /// Parent-offspring.
    First = 1,
    /// Sibling-grade (full or half sib).
    Second = 2,
    Third = 3,
    Fourth = 4,
    Fifth = 5,
    Sixth = 6,
    Seventh = 7,
    Eighth = 8,
    /// Maximum estimable relational distance.
    Ninth = 9,
}

impl Degree {
    /// The highest degree worth inferring from relatedness estimates.
    pub const MAX_ESTIMABLE: Degree = Degree::Ninth;

    /// Derive the relational degree from a relatedness coefficient.
    ///
    /// Relatedness roughly halves per additional degree of separation, so
    /// the degree is `round(log2(1/r))`: 0.5 is `First`, 0.25 `Second`,
    /// 0.125 `Third`. Non-positive input means unrelated, and any computed
    /// value outside the estimable range `[1, 9]` also maps to `Unrelated`
    /// rather than producing an out-of-range degree.
    pub fn from_relatedness(r: f64) -> Degree {
        if r <= 0.0 {
            return Degree::Unrelated;
        }
        let level = (1.0 / r).log2().round();
        if (1.0..=9.0).contains(&level) {
            Degree::from_level(level as u8)
        } else {
            Degree::Unrelated
        }
    }

    /// Map a categorical relationship code to its relational degree.
    ///
    /// `"PO"` (parent-offspring) is `First`; `"FS"` (full sib) and `"HS"`
    /// (half sib) are both `Second`, as full and half sibs are distance-2
    /// relationships through one or two shared parents. `"U"` and anything
    /// unrecognized map to `Unrelated`; callers decide whether an
    /// unrecognized code deserves a warning.
    pub fn from_category(code: &str) -> Degree {
        match code {
            "PO" => Degree::First,
            "FS" => Degree::Second,
            "HS" => Degree::Second,
            _ => Degree::Unrelated,
        }
    }

    /// Whether this degree represents no estimable relationship.
    pub fn is_unrelated(self) -> bool {
        self == Degree::Unrelated
    }

    /// The number of edges a path of this degree spans.
    pub fn edge_count(self) -> usize {
        self as usize
    }

    fn from_level(level: u8) -> Degree {
        match level {
            1 => Degree::First,
            2 => Degree::Second,
            3 => Degree::Third,
            4 => Degree::Fourth,
            5 => Degree::Fifth,
            6 => Degree::Sixth,
            7 => Degree::Seventh,
            8 => Degree::Eighth,
            9 => Degree::Ninth,
            _ => Degree::Unrelated,
        }
    }
}

impl TryFrom<u32> for Degree {
    type Error = crate::error::KindredError;

    /// Convert a raw cutoff value into a degree.
    ///
    /// # Errors
    /// Returns an error for values above the estimable ceiling of 9.
    fn try_from(value: u32) -> crate::error::Result<Degree> {
        if value > 9 {
            return Err(crate::error::KindredError::Data(format!(
                "Relational distance {} is beyond the estimable maximum of 9",
                value
            )));
        }
        Ok(Degree::from_level(value as u8))
    }
}

impl std::fmt::Display for Degree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}
