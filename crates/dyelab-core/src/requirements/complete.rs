//! Typed proof of a complete requirements record.

use super::record::RequirementsRecord;
use crate::error::DyelabError;
use crate::schema::{FEATURE_COUNT, ParameterField};

/// A requirements record that passed completeness checking.
///
/// Holds the model input vector in schema order. The only way to build one
/// is `TryFrom<&RequirementsRecord>`, so the pipeline never sees a missing
/// value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompleteRequirements {
    features: [f64; FEATURE_COUNT],
}

impl CompleteRequirements {
    /// The model input vector, one column per field in schema order.
    pub fn features(&self) -> &[f64; FEATURE_COUNT] {
        &self.features
    }

    pub fn get(&self, field: ParameterField) -> f64 {
        self.features[field.index()]
    }

    pub fn to_record(&self) -> RequirementsRecord {
        ParameterField::all().fold(RequirementsRecord::new(), |record, field| {
            record.with(field, self.get(field))
        })
    }
}

impl TryFrom<&RequirementsRecord> for CompleteRequirements {
    type Error = DyelabError;

    fn try_from(record: &RequirementsRecord) -> Result<Self, Self::Error> {
        let mut features = [0.0; FEATURE_COUNT];
        let mut missing = Vec::new();

        for field in ParameterField::all() {
            match record.get(field) {
                Some(value) if record.is_valid(field) => features[field.index()] = value,
                _ => missing.push(field.name()),
            }
        }

        if missing.is_empty() {
            Ok(Self { features })
        } else {
            Err(DyelabError::incomplete(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_record() -> RequirementsRecord {
        let values = [2.5, 1.0, 0.5, 50.0, 15.0, 60.8, 45.0, 10.5, 10.0, 150.0, 80.0, 15.0];
        ParameterField::all()
            .zip(values)
            .fold(RequirementsRecord::new(), |record, (field, value)| {
                record.with(field, value)
            })
    }

    #[test]
    fn test_features_follow_schema_order() {
        let complete = CompleteRequirements::try_from(&reference_record()).unwrap();
        assert_eq!(
            complete.features(),
            &[2.5, 1.0, 0.5, 50.0, 15.0, 60.8, 45.0, 10.5, 10.0, 150.0, 80.0, 15.0]
        );
        assert_eq!(complete.get(ParameterField::Ph), 10.5);
    }

    #[test]
    fn test_missing_ph_is_named() {
        let mut record = reference_record();
        record.ph = None;

        let err = CompleteRequirements::try_from(&record).unwrap_err();

        assert!(err.is_incomplete_input());
        assert_eq!(err.missing_fields(), &["pH".to_string()]);
    }

    #[test]
    fn test_round_trips_to_record() {
        let record = reference_record();
        let complete = CompleteRequirements::try_from(&record).unwrap();
        assert_eq!(complete.to_record(), record);
    }
}
