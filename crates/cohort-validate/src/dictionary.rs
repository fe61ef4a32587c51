//! Variable-dictionary file validation.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use cohort_model::{DataType, RowView, Table, VariableSource, template};

use crate::batch::{DictionaryRow, ValidatedDictionary};
use crate::common;
use crate::error::{Result, ValidationError};

/// Validate a loaded dictionary table against the dictionary template and
/// its domain rules. On success the category columns are normalized to
/// trimmed upper-case and the boolean-coded columns are coerced.
pub fn validate_dictionary(table: &Table) -> Result<ValidatedDictionary> {
    common::check_template(table, "dictionary", template::DICTIONARY_COLUMNS)?;
    common::check_duplicates(table)?;
    common::check_blanks(table)?;
    common::check_populated(table, "dataset_name")?;
    common::check_populated(table, "variable_name")?;
    common::check_populated(table, "data_type")?;
    common::check_populated(table, "has_options")?;
    common::check_populated(table, "deidentification_required")?;
    common::check_populated(table, "variable_source")?;
    let dataset_name = common::single_dataset_name(table)?;

    let mut rows = Vec::with_capacity(table.height());
    for row in table.iter_rows() {
        rows.push(parse_row(&row)?);
    }
    check_option_coherence(&rows)?;

    Ok(ValidatedDictionary::new(dataset_name, rows))
}

fn parse_row(row: &RowView<'_>) -> Result<DictionaryRow> {
    let data_type = parse_data_type(row)?;
    let variable_name = row.get("variable_name").unwrap_or_default().to_string();

    let category_level_1 = row.get("category_level_1").map(normalize_category);
    let category_level_2 = row.get("category_level_2").map(normalize_category);
    if category_level_2.is_some() && category_level_1.is_none() {
        return Err(ValidationError::OrphanCategoryLevel2 { row: row.index() });
    }

    let option_name = row.get("option_name").map(str::to_string);
    let option_description = row.get("option_description").map(str::to_string);
    if option_name.is_some() && option_description.is_none() {
        return Err(ValidationError::OptionDescriptionMissing { row: row.index() });
    }

    let range_min = parse_range(row, "range_min")?;
    let range_max = parse_range(row, "range_max")?;
    if (range_min.is_some() || range_max.is_some()) && !data_type.is_numeric() {
        return Err(ValidationError::RangeOnNonNumeric {
            variable: variable_name,
        });
    }

    // TODO: require deidentification_required when deidentification_method
    // is populated, once the method vocabulary is settled.
    Ok(DictionaryRow {
        variable_name,
        variable_description: row.get("variable_description").map(str::to_string),
        data_type,
        unit: row.get("unit").map(str::to_string),
        category_level_1,
        category_level_2,
        associated_visit: row.get("associated_visit").map(str::to_string),
        has_options: parse_bool_coded(row, "has_options")?,
        option_name,
        option_description,
        range_min,
        range_max,
        deidentification_required: parse_bool_coded(row, "deidentification_required")?,
        deidentification_method: row.get("deidentification_method").map(str::to_string),
        variable_source: parse_variable_source(row)?,
    })
}

fn normalize_category(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn parse_data_type(row: &RowView<'_>) -> Result<DataType> {
    let value = row.get("data_type").unwrap_or_default();
    let parsed = value
        .parse::<DataType>()
        .map_err(|reason| ValidationError::InvalidField {
            field: "data_type",
            value: value.to_string(),
            row: row.index(),
            reason,
        })?;
    // `time` only appears on measurement values; dictionaries declare the
    // five template types.
    if parsed == DataType::Time {
        return Err(ValidationError::InvalidField {
            field: "data_type",
            value: value.to_string(),
            row: row.index(),
            reason: "not an allowed dictionary data type".to_string(),
        });
    }
    Ok(parsed)
}

fn parse_variable_source(row: &RowView<'_>) -> Result<VariableSource> {
    let value = row.get("variable_source").unwrap_or_default();
    value
        .parse::<VariableSource>()
        .map_err(|reason| ValidationError::InvalidField {
            field: "variable_source",
            value: value.to_string(),
            row: row.index(),
            reason,
        })
}

fn parse_bool_coded(row: &RowView<'_>, field: &'static str) -> Result<bool> {
    match row.get(field) {
        Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(value) => Err(ValidationError::InvalidField {
            field,
            value: value.to_string(),
            row: row.index(),
            reason: "must be boolean-coded as 0 or 1".to_string(),
        }),
        None => Err(ValidationError::MissingValue { column: field }),
    }
}

fn parse_range(row: &RowView<'_>, field: &'static str) -> Result<Option<f64>> {
    match row.get(field) {
        None => Ok(None),
        Some(value) => value.parse::<f64>().map(Some).map_err(|_| {
            ValidationError::InvalidField {
                field,
                value: value.to_string(),
                row: row.index(),
                reason: "not numeric".to_string(),
            }
        }),
    }
}

/// Every variable that declares options must carry a populated,
/// row-unique option_name on each of its rows: the variable's row count
/// must equal its distinct option-name count.
fn check_option_coherence(rows: &[DictionaryRow]) -> Result<()> {
    let mut by_variable: BTreeMap<&str, Vec<&DictionaryRow>> = BTreeMap::new();
    for row in rows {
        by_variable.entry(&row.variable_name).or_default().push(row);
    }
    for (variable, group) in by_variable {
        if !group.iter().any(|row| row.has_options) {
            continue;
        }
        let mut names = BTreeSet::new();
        for row in &group {
            match &row.option_name {
                Some(name) => {
                    names.insert(name.as_str());
                }
                None => {
                    return Err(ValidationError::OptionNameMissing {
                        variable: variable.to_string(),
                    });
                }
            }
        }
        if names.len() != group.len() {
            return Err(ValidationError::NonUniqueOptions {
                variable: variable.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        template::DICTIONARY_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    fn base_row() -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            ("dataset_name", "STUDY1"),
            ("variable_name", "hr"),
            ("data_type", "int"),
            ("has_options", "0"),
            ("deidentification_required", "0"),
            ("variable_source", "ORIGINAL"),
        ])
    }

    fn to_cells(values: &BTreeMap<&str, &str>) -> Vec<Option<String>> {
        template::DICTIONARY_COLUMNS
            .iter()
            .map(|col| values.get(col).map(|v| v.to_string()))
            .collect()
    }

    #[test]
    fn minimal_dictionary_validates() {
        let table = Table::new(headers(), vec![to_cells(&base_row())]);
        let validated = validate_dictionary(&table).unwrap();
        assert_eq!(validated.dataset_name(), "STUDY1");
        assert_eq!(validated.rows()[0].data_type, DataType::Int);
        assert!(!validated.rows()[0].has_options);
    }

    #[test]
    fn categories_normalized_upper() {
        let mut row = base_row();
        row.insert("category_level_1", "  cardiac ");
        let table = Table::new(headers(), vec![to_cells(&row)]);
        let validated = validate_dictionary(&table).unwrap();
        assert_eq!(
            validated.rows()[0].category_level_1.as_deref(),
            Some("CARDIAC")
        );
    }

    #[test]
    fn level_2_requires_level_1() {
        let mut row = base_row();
        row.insert("category_level_2", "ECHO");
        let table = Table::new(headers(), vec![to_cells(&row)]);
        assert!(matches!(
            validate_dictionary(&table),
            Err(ValidationError::OrphanCategoryLevel2 { .. })
        ));
    }

    #[test]
    fn time_not_allowed_in_dictionaries() {
        let mut row = base_row();
        row.insert("data_type", "time");
        let table = Table::new(headers(), vec![to_cells(&row)]);
        assert!(matches!(
            validate_dictionary(&table),
            Err(ValidationError::InvalidField {
                field: "data_type",
                ..
            })
        ));
    }

    #[test]
    fn range_on_string_variable_rejected() {
        let mut row = base_row();
        row.insert("data_type", "str");
        row.insert("range_min", "0");
        let table = Table::new(headers(), vec![to_cells(&row)]);
        assert!(matches!(
            validate_dictionary(&table),
            Err(ValidationError::RangeOnNonNumeric { .. })
        ));
    }

    #[test]
    fn shared_option_name_rejected() {
        let mut first = base_row();
        first.insert("has_options", "1");
        first.insert("option_name", "LOW");
        first.insert("option_description", "Below range");
        let mut second = first.clone();
        second.insert("option_description", "Also below range");
        let table = Table::new(headers(), vec![to_cells(&first), to_cells(&second)]);
        assert!(matches!(
            validate_dictionary(&table),
            Err(ValidationError::NonUniqueOptions { .. })
        ));
    }

    #[test]
    fn option_name_required_when_has_options() {
        let mut row = base_row();
        row.insert("has_options", "1");
        let table = Table::new(headers(), vec![to_cells(&row)]);
        assert!(matches!(
            validate_dictionary(&table),
            Err(ValidationError::OptionNameMissing { .. })
        ));
    }

    #[test]
    fn option_description_required_with_name() {
        let mut row = base_row();
        row.insert("has_options", "1");
        row.insert("option_name", "LOW");
        let table = Table::new(headers(), vec![to_cells(&row)]);
        assert!(matches!(
            validate_dictionary(&table),
            Err(ValidationError::OptionDescriptionMissing { .. })
        ));
    }

    #[test]
    fn has_options_must_be_bool_coded() {
        let mut row = base_row();
        row.insert("has_options", "yes");
        let table = Table::new(headers(), vec![to_cells(&row)]);
        assert!(matches!(
            validate_dictionary(&table),
            Err(ValidationError::InvalidField {
                field: "has_options",
                ..
            })
        ));
    }
}
