//! System prompt for the LLM extractor.

use dyelab_core::ParameterField;
use dyelab_core::error::{DyelabError, Result};
use dyelab_core::requirements::RequirementsRecord;
use dyelab_core::schema::{ValueKind, format_number};
use minijinja::{Environment, context};
use serde::Serialize;

const TEMPLATE_NAME: &str = "extraction_system";

const EXTRACTION_SYSTEM_PROMPT: &str = r#"You extract reactive dyeing recipe parameters from a conversation with a textile technician.

Read every user message and report the value the user gave for each parameter below.
Later statements override earlier ones. Do not guess, do not convert units you are unsure of,
and use null for anything the user has not stated.

Parameters:
{% for field in fields -%}
- {{ field.name }}: {{ field.label }}, {{ field.kind }}, valid range {{ field.range }}
{% endfor %}
{%- if gathered %}
Already recorded:
{% for field in gathered -%}
- {{ field.name }} = {{ field.value }}
{% endfor %}
{%- endif %}
Reply with a single JSON object and nothing else:
{"requirements": { {% for field in fields %}"{{ field.name }}": number or null{% if not loop.last %}, {% endif %}{% endfor %} }, "remark": string or null}

Use "remark" only for a short note to the user, for example when a value is ambiguous."#;

#[derive(Serialize)]
struct FieldContext {
    name: &'static str,
    label: &'static str,
    kind: &'static str,
    range: String,
}

#[derive(Serialize)]
struct GatheredContext {
    name: &'static str,
    value: String,
}

pub struct PromptRenderer {
    env: Environment<'static>,
}

impl PromptRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, EXTRACTION_SYSTEM_PROMPT)
            .map_err(|e| DyelabError::internal(format!("invalid prompt template: {}", e)))?;
        Ok(Self { env })
    }

    pub fn render(&self, current: &RequirementsRecord) -> Result<String> {
        let fields: Vec<FieldContext> = ParameterField::all()
            .map(|field| {
                let spec = field.spec();
                FieldContext {
                    name: spec.name,
                    label: spec.label,
                    kind: match spec.kind {
                        ValueKind::Float => "number",
                        ValueKind::Integer => "whole number",
                    },
                    range: spec.range_text(),
                }
            })
            .collect();
        let gathered: Vec<GatheredContext> = current
            .filled_fields()
            .map(|(field, value)| GatheredContext {
                name: field.name(),
                value: format_number(value),
            })
            .collect();

        self.env
            .get_template(TEMPLATE_NAME)
            .and_then(|template| template.render(context! { fields, gathered }))
            .map_err(|e| DyelabError::internal(format!("failed to render prompt: {}", e)))
    }
}
