//! De-identification policy dispatch for measurement values.

use tracing::warn;

use cohort_model::{DeidMethod, VariableDetails};
use cohort_validate::pattern;

/// Compute the de-identified copy of a measurement value.
///
/// Variables without `deidentification_required` pass the value through
/// verbatim. For required variables the declared method decides:
/// `REMOVE` stores NULL, `ANON_DATE` keeps the year and zeroes month and
/// day to `01`, and any other (or missing) method is treated as `REMOVE`
/// until a transform is defined for it.
pub fn apply_deidentification(
    value: Option<&str>,
    details: &VariableDetails,
) -> Option<String> {
    if !details.deidentification_required {
        return value.map(str::to_string);
    }
    let Some(raw_method) = details.deidentification_method.as_deref() else {
        return None;
    };
    let Ok(method) = raw_method.parse::<DeidMethod>();
    match method {
        DeidMethod::Remove => None,
        DeidMethod::AnonDate => value.and_then(|v| anonymize_date(v, details)),
        DeidMethod::Other(name) => {
            warn!(
                variable = %details.variable_name,
                method = %name,
                "no transform defined for de-identification method; removing value"
            );
            None
        }
    }
}

/// `YYYY-MM-DD` -> `YYYY-01-01`. The method can be declared on a
/// variable of any data type, so a non-date value is possible; it is
/// removed rather than transformed.
fn anonymize_date(date: &str, details: &VariableDetails) -> Option<String> {
    if !pattern::is_template_date(date) {
        warn!(
            variable = %details.variable_name,
            "value under ANON_DATE is not a YYYY-MM-DD date; removing value"
        );
        return None;
    }
    Some(format!("{}-01-01", &date[..4]))
}
