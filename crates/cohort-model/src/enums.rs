//! Type-safe enumerations for the consolidated schema.
//!
//! These enums give compile-time safety to concepts that the input
//! templates and the store represent as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared data type of a metadata variable.
///
/// Dictionary files may declare `str`, `int`, `date`, `boolean`, or
/// `float`; `time` additionally appears on variables whose measurement
/// values carry a clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Str,
    Int,
    Float,
    Boolean,
    Date,
    Time,
}

impl DataType {
    /// Returns the lower-case code used in dictionary files and the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Str => "str",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::Time => "time",
        }
    }

    /// Returns true for types that may carry range bounds.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "str" => Ok(DataType::Str),
            "int" => Ok(DataType::Int),
            "float" => Ok(DataType::Float),
            "boolean" => Ok(DataType::Boolean),
            "date" => Ok(DataType::Date),
            "time" => Ok(DataType::Time),
            _ => Err(format!("Unknown data type: {s}")),
        }
    }
}

/// Subject gender as recorded in input files.
///
/// The templates only admit `F` and `M`; a missing value stays missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "F" => Ok(Gender::Female),
            "M" => Ok(Gender::Male),
            _ => Err(format!("gender should be either 'F' or 'M', got: {s}")),
        }
    }
}

/// Provenance of a metadata variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableSource {
    /// Collected as-is from the source dataset.
    Original,
    /// Computed downstream from other variables.
    Derived,
}

impl VariableSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableSource::Original => "ORIGINAL",
            VariableSource::Derived => "DERIVED",
        }
    }
}

impl fmt::Display for VariableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VariableSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ORIGINAL" => Ok(VariableSource::Original),
            "DERIVED" => Ok(VariableSource::Derived),
            _ => Err(format!("Unknown variable source: {s}")),
        }
    }
}

/// De-identification method recorded on a variable.
///
/// The vocabulary is controlled but open: methods beyond the two named
/// ones are preserved verbatim and treated conservatively (value removed)
/// until a transform is defined for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeidMethod {
    /// Remove the value completely (store NULL).
    Remove,
    /// Keep the year of a date, zeroing day and month to `01`.
    AnonDate,
    /// A method with no transform defined yet.
    Other(String),
}

impl DeidMethod {
    pub fn as_str(&self) -> &str {
        match self {
            DeidMethod::Remove => "REMOVE",
            DeidMethod::AnonDate => "ANON_DATE",
            DeidMethod::Other(name) => name,
        }
    }
}

impl fmt::Display for DeidMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeidMethod {
    type Err = std::convert::Infallible;

    /// Never fails: unknown methods become [`DeidMethod::Other`], and the
    /// uninhabited error type lets callers destructure the `Ok` directly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "REMOVE" => Ok(DeidMethod::Remove),
            "ANON_DATE" => Ok(DeidMethod::AnonDate),
            other => Ok(DeidMethod::Other(other.to_string())),
        }
    }
}
