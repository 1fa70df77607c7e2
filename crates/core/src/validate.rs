//! Cross-source consistency checks, run before graph construction.
//!
//! Every problem is collected before reporting so the user can fix the
//! whole input in one pass instead of replaying the run per mistake.

use std::collections::HashSet;

use crate::error::{KindredError, Result};
use crate::sources::{DemographicsSource, ParentageSource, RelatednessSource, Sex};

/// Check that the optional sources agree with each other and with the
/// relatedness data.
///
/// Verified:
/// - a recorded sire must not be stated female, nor a dam male, in the
///   demographics;
/// - every parentage child, sire, and dam must appear in the relatedness
///   data;
/// - every demographics ID must appear in the relatedness data.
///
/// # Errors
/// Returns [`KindredError::Inconsistent`] carrying every problem found,
/// one per line.
pub fn check_consistency<R, P, D>(
    rel: &R,
    pars: Option<&P>,
    dems: Option<&D>,
) -> Result<()>
where
    R: RelatednessSource + ?Sized,
    P: ParentageSource + ?Sized,
    D: DemographicsSource + ?Sized,
{
    let mut problems: Vec<String> = Vec::new();
    let known: HashSet<&str> = rel.indvs().iter().map(|s| s.as_str()).collect();

    if let Some(pars) = pars {
        for child in pars.indvs() {
            if let (Some(sire), Some(dems)) = (pars.sire(child), dems) {
                if let Some(sex) = dems.sex(sire) {
                    if sex != Sex::Male {
                        problems.push(format!(
                            "Sire {} for ID {} should be male, but is stated as {} in demographics",
                            sire, child, sex
                        ));
                    }
                }
            }
            if let (Some(dam), Some(dems)) = (pars.dam(child), dems) {
                if let Some(sex) = dems.sex(dam) {
                    if sex != Sex::Female {
                        problems.push(format!(
                            "Dam {} for ID {} should be female, but is stated as {} in demographics",
                            dam, child, sex
                        ));
                    }
                }
            }

            if !known.contains(child.as_str()) {
                problems.push(format!(
                    "No corresponding relatedness data for parentage entry: {}",
                    child
                ));
            }
            if let Some(sire) = pars.sire(child) {
                if !known.contains(sire) {
                    problems.push(format!(
                        "Sire {} of parentage ID {} not found in relatedness data",
                        sire, child
                    ));
                }
            }
            if let Some(dam) = pars.dam(child) {
                if !known.contains(dam) {
                    problems.push(format!(
                        "Dam {} of parentage ID {} not found in relatedness data",
                        dam, child
                    ));
                }
            }
        }
    }

    if let Some(dems) = dems {
        for id in dems.indvs() {
            if !known.contains(id.as_str()) {
                problems.push(format!(
                    "No corresponding relatedness data for demographics entry of {}",
                    id
                ));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(KindredError::Inconsistent(problems.join("\n")))
    }
}
