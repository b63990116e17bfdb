//! Parameter schema for the dyeing process inputs.
//!
//! The schema is declared once, in the exact column order the trained
//! regressor expects. Completeness checking, extraction, feature-vector
//! assembly and model artifact validation all read it from here.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Number of model input columns.
pub const FEATURE_COUNT: usize = ParameterField::COUNT;

/// One of the twelve required process parameters.
///
/// Variant order is the model column order; do not reorder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, EnumCount,
)]
pub enum ParameterField {
    #[serde(rename = "dye_red_owf")]
    DyeRedOwf,
    #[serde(rename = "dye_green_owf")]
    DyeGreenOwf,
    #[serde(rename = "dye_blue_owf")]
    DyeBlueOwf,
    #[serde(rename = "salt_gL")]
    SaltGl,
    #[serde(rename = "sodaAsh_gL")]
    SodaAshGl,
    #[serde(rename = "temp_C")]
    TempC,
    #[serde(rename = "time_min")]
    TimeMin,
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "liquor_ratio")]
    LiquorRatio,
    #[serde(rename = "water_hardness_ppm")]
    WaterHardnessPpm,
    #[serde(rename = "soap_temp_C")]
    SoapTempC,
    #[serde(rename = "soap_time_min")]
    SoapTimeMin,
}

/// Numeric kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Float,
    Integer,
}

/// Declaration of a single parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub field: ParameterField,
    /// Wire name, identical to the model's feature name.
    pub name: &'static str,
    /// Short human-readable label used in summaries.
    pub label: &'static str,
    pub kind: ValueKind,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Unit suffix, empty for dimensionless values.
    pub unit: &'static str,
    question: &'static str,
}

const FIELD_SPECS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        field: ParameterField::DyeRedOwf,
        name: "dye_red_owf",
        label: "red dye",
        kind: ValueKind::Float,
        min: 0.0,
        max: 5.0,
        unit: "%",
        question: "What is the red dye concentration as a percentage on weight of fabric",
    },
    FieldSpec {
        field: ParameterField::DyeGreenOwf,
        name: "dye_green_owf",
        label: "green dye",
        kind: ValueKind::Float,
        min: 0.0,
        max: 5.0,
        unit: "%",
        question: "What is the green dye concentration as a percentage on weight of fabric",
    },
    FieldSpec {
        field: ParameterField::DyeBlueOwf,
        name: "dye_blue_owf",
        label: "blue dye",
        kind: ValueKind::Float,
        min: 0.0,
        max: 5.0,
        unit: "%",
        question: "What is the blue dye concentration as a percentage on weight of fabric",
    },
    FieldSpec {
        field: ParameterField::SaltGl,
        name: "salt_gL",
        label: "salt",
        kind: ValueKind::Float,
        min: 40.0,
        max: 80.0,
        unit: "g/L",
        question: "What is the salt concentration in g/L",
    },
    FieldSpec {
        field: ParameterField::SodaAshGl,
        name: "sodaAsh_gL",
        label: "soda ash",
        kind: ValueKind::Float,
        min: 10.0,
        max: 20.0,
        unit: "g/L",
        question: "What is the soda ash concentration in g/L",
    },
    FieldSpec {
        field: ParameterField::TempC,
        name: "temp_C",
        label: "dyeing temperature",
        kind: ValueKind::Float,
        min: 60.0,
        max: 80.0,
        unit: "°C",
        question: "What is the dyeing temperature in °C",
    },
    FieldSpec {
        field: ParameterField::TimeMin,
        name: "time_min",
        label: "dyeing time",
        kind: ValueKind::Integer,
        min: 30.0,
        max: 90.0,
        unit: "min",
        question: "How long is the dyeing time in minutes",
    },
    FieldSpec {
        field: ParameterField::Ph,
        name: "pH",
        label: "pH",
        kind: ValueKind::Float,
        min: 10.0,
        max: 11.5,
        unit: "",
        question: "What is the pH of the dye bath",
    },
    FieldSpec {
        field: ParameterField::LiquorRatio,
        name: "liquor_ratio",
        label: "liquor ratio",
        kind: ValueKind::Float,
        min: 10.0,
        max: 20.0,
        unit: "",
        question: "What is the liquor ratio (litres of water per kg of fabric)",
    },
    FieldSpec {
        field: ParameterField::WaterHardnessPpm,
        name: "water_hardness_ppm",
        label: "water hardness",
        kind: ValueKind::Float,
        min: 50.0,
        max: 300.0,
        unit: "ppm",
        question: "What is the water hardness in ppm",
    },
    FieldSpec {
        field: ParameterField::SoapTempC,
        name: "soap_temp_C",
        label: "soaping temperature",
        kind: ValueKind::Float,
        min: 70.0,
        max: 95.0,
        unit: "°C",
        question: "What is the soaping temperature in °C",
    },
    FieldSpec {
        field: ParameterField::SoapTimeMin,
        name: "soap_time_min",
        label: "soaping time",
        kind: ValueKind::Integer,
        min: 10.0,
        max: 30.0,
        unit: "min",
        question: "How long is the soaping time in minutes",
    },
];

impl ParameterField {
    /// All fields in schema (model column) order.
    pub fn all() -> impl Iterator<Item = ParameterField> {
        Self::iter()
    }

    /// Position of this field in the model input vector.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static FieldSpec {
        &FIELD_SPECS[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Looks a field up by wire name, ignoring ASCII case as a fallback.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::iter()
            .find(|field| field.name() == name)
            .or_else(|| Self::iter().find(|field| field.name().eq_ignore_ascii_case(name)))
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FieldSpec {
    /// Validates a value against this field's kind and range.
    pub fn validate(&self, value: f64) -> Result<(), ValidationError> {
        let reason = if !value.is_finite() {
            Some(ValidationReason::NotFinite)
        } else if value < self.min || value > self.max {
            Some(ValidationReason::OutOfRange)
        } else if self.kind == ValueKind::Integer && value.fract() != 0.0 {
            Some(ValidationReason::NotInteger)
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ValidationError {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Allowed range rendered for humans, e.g. `40–80 g/L` or `10–11.5`.
    pub fn range_text(&self) -> String {
        let range = format!("{}–{}", format_number(self.min), format_number(self.max));
        if self.unit.is_empty() {
            range
        } else {
            format!("{} {}", range, self.unit)
        }
    }

    /// A value with its label and unit, e.g. `salt 50 g/L`.
    pub fn describe(&self, value: f64) -> String {
        if self.unit.is_empty() {
            format!("{} {}", self.label, format_number(value))
        } else {
            format!("{} {} {}", self.label, format_number(value), self.unit)
        }
    }

    /// The single targeted question asked when this field is missing.
    pub fn question(&self) -> String {
        format!("{}? ({})", self.question, self.range_text())
    }
}

/// Validates `value` for `field` against the schema.
pub fn validate(field: ParameterField, value: f64) -> Result<(), ValidationError> {
    field.spec().validate(value)
}

/// Renders a number without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    OutOfRange,
    NotInteger,
    NotFinite,
}

/// A supplied value rejected by the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: ParameterField,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub reason: ValidationReason,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.field.spec();
        match self.reason {
            ValidationReason::OutOfRange => write!(
                f,
                "{} = {} is outside the allowed range {}",
                self.field,
                format_number(self.value),
                spec.range_text()
            ),
            ValidationReason::NotInteger => write!(
                f,
                "{} = {} must be a whole number in {}",
                self.field,
                format_number(self.value),
                spec.range_text()
            ),
            ValidationReason::NotFinite => write!(
                f,
                "{} must be a finite number in {}",
                self.field,
                spec.range_text()
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
