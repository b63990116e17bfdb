//! Completeness checking.

use serde::{Deserialize, Serialize};

use super::record::RequirementsRecord;
use crate::schema::ParameterField;

/// Outcome of a completeness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessResult {
    pub complete: bool,
    /// Missing or invalid fields in schema order.
    pub missing_fields: Vec<ParameterField>,
    /// Question for the first missing field, empty when complete.
    pub next_question: String,
}

impl CompletenessResult {
    pub fn first_missing(&self) -> Option<ParameterField> {
        self.missing_fields.first().copied()
    }

    pub fn missing_names(&self) -> Vec<String> {
        self.missing_fields.iter().map(|f| f.name().to_string()).collect()
    }
}

/// Determines what is still missing from a record and what to ask next.
///
/// Only one question is produced per check: the one for the first missing
/// field in schema order.
pub struct CompletenessChecker;

impl CompletenessChecker {
    pub fn check(record: &RequirementsRecord) -> CompletenessResult {
        let missing_fields: Vec<ParameterField> = ParameterField::all()
            .filter(|field| !record.is_valid(*field))
            .collect();

        let next_question = missing_fields
            .first()
            .map(|field| field.spec().question())
            .unwrap_or_default();

        CompletenessResult {
            complete: missing_fields.is_empty(),
            missing_fields,
            next_question,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> RequirementsRecord {
        let values = [2.5, 1.0, 0.5, 50.0, 15.0, 60.8, 45.0, 10.5, 10.0, 150.0, 80.0, 15.0];
        ParameterField::all()
            .zip(values)
            .fold(RequirementsRecord::new(), |record, (field, value)| {
                record.with(field, value)
            })
    }

    #[test]
    fn test_empty_record_asks_for_red_dye() {
        let result = CompletenessChecker::check(&RequirementsRecord::new());
        assert!(!result.complete);
        assert_eq!(result.missing_fields.len(), 12);
        assert_eq!(result.first_missing(), Some(ParameterField::DyeRedOwf));
        assert!(result.next_question.contains("red dye"));
    }

    #[test]
    fn test_rgb_only_asks_for_salt() {
        let record = RequirementsRecord::new()
            .with(ParameterField::DyeRedOwf, 4.2)
            .with(ParameterField::DyeGreenOwf, 3.5)
            .with(ParameterField::DyeBlueOwf, 2.8);

        let result = CompletenessChecker::check(&record);

        assert_eq!(result.first_missing(), Some(ParameterField::SaltGl));
        assert_eq!(
            result.next_question,
            "What is the salt concentration in g/L? (40–80 g/L)"
        );
    }

    #[test]
    fn test_each_single_missing_field_is_the_one_asked() {
        for field in ParameterField::all() {
            let mut record = full_record();
            *record_slot(&mut record, field) = None;

            let result = CompletenessChecker::check(&record);

            assert!(!result.complete);
            assert_eq!(result.missing_fields, vec![field]);
            assert_eq!(result.next_question, field.spec().question());
        }
    }

    #[test]
    fn test_first_missing_wins_regardless_of_later_gaps() {
        let mut record = full_record();
        *record_slot(&mut record, ParameterField::SoapTimeMin) = None;
        *record_slot(&mut record, ParameterField::Ph) = None;

        let result = CompletenessChecker::check(&record);

        assert_eq!(
            result.missing_fields,
            vec![ParameterField::Ph, ParameterField::SoapTimeMin]
        );
        assert_eq!(result.first_missing(), Some(ParameterField::Ph));
    }

    #[test]
    fn test_invalid_value_counts_as_missing() {
        let record = full_record().with(ParameterField::WaterHardnessPpm, 900.0);
        let result = CompletenessChecker::check(&record);
        assert_eq!(result.missing_fields, vec![ParameterField::WaterHardnessPpm]);
    }

    #[test]
    fn test_complete_record_has_no_question() {
        let result = CompletenessChecker::check(&full_record());
        assert!(result.complete);
        assert!(result.missing_fields.is_empty());
        assert_eq!(result.next_question, "");
    }

    fn record_slot(record: &mut RequirementsRecord, field: ParameterField) -> &mut Option<f64> {
        match field {
            ParameterField::DyeRedOwf => &mut record.dye_red_owf,
            ParameterField::DyeGreenOwf => &mut record.dye_green_owf,
            ParameterField::DyeBlueOwf => &mut record.dye_blue_owf,
            ParameterField::SaltGl => &mut record.salt_gl,
            ParameterField::SodaAshGl => &mut record.soda_ash_gl,
            ParameterField::TempC => &mut record.temp_c,
            ParameterField::TimeMin => &mut record.time_min,
            ParameterField::Ph => &mut record.ph,
            ParameterField::LiquorRatio => &mut record.liquor_ratio,
            ParameterField::WaterHardnessPpm => &mut record.water_hardness_ppm,
            ParameterField::SoapTempC => &mut record.soap_temp_c,
            ParameterField::SoapTimeMin => &mut record.soap_time_min,
        }
    }
}
