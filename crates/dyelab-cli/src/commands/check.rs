use anyhow::Result;
use dyelab_core::ParameterField;
use dyelab_core::requirements::CompletenessChecker;
use dyelab_core::schema::validate;
use serde_json::json;

use super::input::read_record;

pub fn run(input: &str) -> Result<()> {
    let record = read_record(input)?;
    let result = CompletenessChecker::check(&record);

    let invalid: Vec<String> = ParameterField::all()
        .filter_map(|field| {
            let value = record.get(field)?;
            validate(field, value).err().map(|e| e.to_string())
        })
        .collect();

    let report = json!({
        "complete": result.complete,
        "missing_fields": result.missing_names(),
        "next_question": result.next_question,
        "invalid": invalid,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
