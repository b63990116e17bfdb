use dyelab_core::ParameterField;
use dyelab_core::schema::ValueKind;

pub fn run() {
    println!("{:<20} {:<8} {:<16} {}", "field", "kind", "range", "label");
    for field in ParameterField::all() {
        let spec = field.spec();
        let kind = match spec.kind {
            ValueKind::Float => "float",
            ValueKind::Integer => "integer",
        };
        println!(
            "{:<20} {:<8} {:<16} {}",
            spec.name,
            kind,
            spec.range_text(),
            spec.label
        );
    }
}
