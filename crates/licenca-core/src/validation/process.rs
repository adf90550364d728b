//! License-process input rules

use chrono::{Months, NaiveDate};
use validator::ValidationError;

use crate::models::process::{LicenseType, NewProcessInput};

/// Expected duration of an operating license (LO) review
pub const EXPECTED_MONTHS_LO: u32 = 36;
/// Expected duration of a preliminary (LP) or installation (LI) license review
pub const EXPECTED_MONTHS_LP_LI: u32 = 6;

/// Date by which a newly submitted process is expected to be decided.
///
/// Month arithmetic clamps to the last day of the target month
/// (Aug 31 + 6 months = Feb 28/29).
pub fn expected_completion_date(license_type: LicenseType, submitted_on: NaiveDate) -> NaiveDate {
    let months = match license_type {
        LicenseType::Lo => EXPECTED_MONTHS_LO,
        LicenseType::Lp | LicenseType::Li => EXPECTED_MONTHS_LP_LI,
    };
    submitted_on
        .checked_add_months(Months::new(months))
        .unwrap_or(submitted_on)
}

/// Rejects empty and whitespace-only strings.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// A process either references an existing company or names a new one.
pub fn validate_company_reference(input: &NewProcessInput) -> Result<(), ValidationError> {
    let named = input
        .company
        .as_deref()
        .map(|name| !name.trim().is_empty())
        .unwrap_or(false);
    if input.company_id.is_none() && !named {
        let mut err = ValidationError::new("company_required");
        err.message = Some("Razão social é obrigatória.".into());
        return Err(err);
    }
    Ok(())
}
