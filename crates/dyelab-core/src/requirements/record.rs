//! Requirements record.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{DyelabError, Result};
use crate::schema::{ParameterField, ValidationError, format_number, validate};

/// Mutable accumulator of the parameters gathered so far.
///
/// Values are stored raw; the schema decides whether a value counts. The
/// conversation only ever merges validated values into a session's record,
/// but records built by extractors or parsed from JSON may hold anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsRecord {
    pub dye_red_owf: Option<f64>,
    pub dye_green_owf: Option<f64>,
    pub dye_blue_owf: Option<f64>,
    #[serde(rename = "salt_gL")]
    pub salt_gl: Option<f64>,
    #[serde(rename = "sodaAsh_gL")]
    pub soda_ash_gl: Option<f64>,
    #[serde(rename = "temp_C")]
    pub temp_c: Option<f64>,
    #[serde(serialize_with = "serialize_whole")]
    pub time_min: Option<f64>,
    #[serde(rename = "pH")]
    pub ph: Option<f64>,
    pub liquor_ratio: Option<f64>,
    pub water_hardness_ppm: Option<f64>,
    #[serde(rename = "soap_temp_C")]
    pub soap_temp_c: Option<f64>,
    #[serde(serialize_with = "serialize_whole")]
    pub soap_time_min: Option<f64>,
}

/// What happened when extracted values were merged into a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Fields that were unset and are now filled.
    pub filled: Vec<ParameterField>,
    /// Fields whose previous value was replaced by a different valid value.
    pub corrected: Vec<ParameterField>,
    /// Values that failed validation and were treated as not provided.
    pub rejected: Vec<ValidationError>,
}

impl RequirementsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: ParameterField) -> Option<f64> {
        *self.slot(field)
    }

    /// Stores `value` without validation and returns the previous value.
    pub fn insert(&mut self, field: ParameterField, value: f64) -> Option<f64> {
        self.slot_mut(field).replace(value)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, field: ParameterField, value: f64) -> Self {
        self.insert(field, value);
        self
    }

    /// Validates `value` and stores it, returning the previous value.
    ///
    /// # Errors
    ///
    /// [`DyelabError::Validation`] when the schema rejects the value; the
    /// field keeps its previous state.
    pub fn try_set(&mut self, field: ParameterField, value: f64) -> Result<Option<f64>> {
        validate(field, value)?;
        Ok(self.insert(field, value))
    }

    pub fn is_set(&self, field: ParameterField) -> bool {
        self.get(field).is_some()
    }

    /// Whether the field holds a value that satisfies the schema.
    pub fn is_valid(&self, field: ParameterField) -> bool {
        self.get(field).is_some_and(|value| validate(field, value).is_ok())
    }

    pub fn is_complete(&self) -> bool {
        ParameterField::all().all(|field| self.is_valid(field))
    }

    pub fn is_empty(&self) -> bool {
        ParameterField::all().all(|field| !self.is_set(field))
    }

    /// Set fields in schema order.
    pub fn filled_fields(&self) -> impl Iterator<Item = (ParameterField, f64)> + '_ {
        ParameterField::all().filter_map(|field| self.get(field).map(|value| (field, value)))
    }

    /// Merges an extraction result into this record.
    ///
    /// Fields absent from `incoming` are left untouched. A present value that
    /// passes validation replaces the current one; a value that fails is
    /// ignored and reported, so the field keeps its previous state.
    pub fn merge_extracted(&mut self, incoming: &RequirementsRecord) -> MergeReport {
        let mut report = MergeReport::default();

        for (field, value) in incoming.filled_fields() {
            match self.try_set(field, value) {
                Ok(None) => report.filled.push(field),
                Ok(Some(previous)) if previous != value => {
                    tracing::debug!(
                        "[Requirements] {} corrected from {} to {}",
                        field,
                        format_number(previous),
                        format_number(value)
                    );
                    report.corrected.push(field);
                }
                Ok(Some(_)) => {}
                Err(DyelabError::Validation(err)) => {
                    tracing::warn!("[Requirements] Ignoring extracted value: {}", err);
                    report.rejected.push(err);
                }
                Err(other) => {
                    tracing::warn!("[Requirements] Ignoring {} value: {}", field, other);
                }
            }
        }

        report
    }

    /// One-line human summary of the gathered values, e.g. `salt 50 g/L, pH 10.5`.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .filled_fields()
            .map(|(field, value)| field.spec().describe(value))
            .collect();

        if parts.is_empty() {
            "nothing gathered yet".to_string()
        } else {
            parts.join(", ")
        }
    }

    fn slot(&self, field: ParameterField) -> &Option<f64> {
        match field {
            ParameterField::DyeRedOwf => &self.dye_red_owf,
            ParameterField::DyeGreenOwf => &self.dye_green_owf,
            ParameterField::DyeBlueOwf => &self.dye_blue_owf,
            ParameterField::SaltGl => &self.salt_gl,
            ParameterField::SodaAshGl => &self.soda_ash_gl,
            ParameterField::TempC => &self.temp_c,
            ParameterField::TimeMin => &self.time_min,
            ParameterField::Ph => &self.ph,
            ParameterField::LiquorRatio => &self.liquor_ratio,
            ParameterField::WaterHardnessPpm => &self.water_hardness_ppm,
            ParameterField::SoapTempC => &self.soap_temp_c,
            ParameterField::SoapTimeMin => &self.soap_time_min,
        }
    }

    fn slot_mut(&mut self, field: ParameterField) -> &mut Option<f64> {
        match field {
            ParameterField::DyeRedOwf => &mut self.dye_red_owf,
            ParameterField::DyeGreenOwf => &mut self.dye_green_owf,
            ParameterField::DyeBlueOwf => &mut self.dye_blue_owf,
            ParameterField::SaltGl => &mut self.salt_gl,
            ParameterField::SodaAshGl => &mut self.soda_ash_gl,
            ParameterField::TempC => &mut self.temp_c,
            ParameterField::TimeMin => &mut self.time_min,
            ParameterField::Ph => &mut self.ph,
            ParameterField::LiquorRatio => &mut self.liquor_ratio,
            ParameterField::WaterHardnessPpm => &mut self.water_hardness_ppm,
            ParameterField::SoapTempC => &mut self.soap_temp_c,
            ParameterField::SoapTimeMin => &mut self.soap_time_min,
        }
    }
}

/// Integer-kind fields go out as JSON integers when they hold whole numbers.
fn serialize_whole<S>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => serializer.serialize_some(&(*v as i64)),
        Some(v) => serializer.serialize_some(v),
        None => serializer.serialize_none(),
    }
}
