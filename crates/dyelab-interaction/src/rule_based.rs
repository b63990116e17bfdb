//! Deterministic extractor reading parameters straight out of user text.
//!
//! Recognises `<alias> [connector] <number>` anywhere in a user message, for
//! example `salt 50 g/L`, `pH: 10.5` or `soaping temperature of 80°C`.
//! Aliases are tried longest first and every match is blanked out before
//! shorter aliases run, so `soaping temperature 80` never feeds `temp_C`.
//! The connector between an alias and its number never spans another alias:
//! in `soaping time unknown, temperature 65` the 65 belongs to `temp_C`.
//! Ratios written `1:10` give the liquor ratio. A single number answers the
//! question asked just before it, unless the message names some other field.

use std::collections::HashMap;
use std::ops::Range;

use async_trait::async_trait;
use dyelab_core::ParameterField;
use dyelab_core::error::{DyelabError, Result};
use dyelab_core::extraction::{ExtractionOutput, RequirementsExtractor};
use dyelab_core::requirements::RequirementsRecord;
use dyelab_core::schema::validate;
use dyelab_core::session::{ConversationMessage, MessageRole};
use regex::{Captures, Regex};

/// Longest gap allowed between an alias and its number.
const MAX_CONNECTOR: usize = 20;

const NUMBER: &str = r"(?P<value>-?\d+(?:\.\d+)?)(?:\s*:\s*(?P<per>\d+(?:\.\d+)?))?";

fn aliases(field: ParameterField) -> &'static [&'static str] {
    use ParameterField::*;

    match field {
        DyeRedOwf => &["dye_red_owf", "red dye", "red"],
        DyeGreenOwf => &["dye_green_owf", "green dye", "green"],
        DyeBlueOwf => &["dye_blue_owf", "blue dye", "blue"],
        SaltGl => &["salt_gl", "salt concentration", "salt"],
        SodaAshGl => &["sodaash_gl", "soda_ash", "soda ash", "soda"],
        TempC => &[
            "temp_c",
            "dyeing temperature",
            "dye temperature",
            "dyeing temp",
            "temperature",
            "temp",
        ],
        TimeMin => &[
            "time_min",
            "dyeing duration",
            "dyeing time",
            "dye time",
            "duration",
            "time",
        ],
        Ph => &["ph level", "ph"],
        LiquorRatio => &["liquor_ratio", "liquor ratio", "liquor", "l:r", "ratio"],
        WaterHardnessPpm => &["water_hardness_ppm", "water hardness", "hardness"],
        SoapTempC => &[
            "soap_temp_c",
            "soaping temperature",
            "soap temperature",
            "soaping temp",
            "soap temp",
        ],
        SoapTimeMin => &[
            "soap_time_min",
            "soaping duration",
            "soaping time",
            "soap time",
        ],
    }
}

struct AliasPattern {
    field: ParameterField,
    /// The alias followed by a connector and a number.
    valued: Regex,
    /// The alias on its own.
    bare: Regex,
}

/// A value found in one message, tagged with where it came from.
#[derive(Debug, Clone, Copy)]
struct Mention {
    value: f64,
    message: usize,
}

pub struct RuleBasedExtractor {
    patterns: Vec<AliasPattern>,
    any_alias: Regex,
    lone_number: Regex,
}

impl RuleBasedExtractor {
    pub fn new() -> Result<Self> {
        let mut entries: Vec<(ParameterField, &str)> = ParameterField::all()
            .flat_map(|field| aliases(field).iter().map(move |alias| (field, *alias)))
            .collect();
        entries.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let any_alias = compile(&format!(
            r"(?i)\b(?:{})\b",
            entries
                .iter()
                .map(|(_, alias)| regex::escape(alias))
                .collect::<Vec<_>>()
                .join("|")
        ))?;

        let patterns = entries
            .into_iter()
            .map(|(field, alias)| -> Result<AliasPattern> {
                let alias = regex::escape(alias);
                Ok(AliasPattern {
                    field,
                    valued: compile(&format!(
                        r"(?i)\b(?P<alias>{})\b(?P<connector>[^0-9\n]{{0,{}}}?){}",
                        alias, MAX_CONNECTOR, NUMBER
                    ))?,
                    bare: compile(&format!(r"(?i)\b{}\b", alias))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            any_alias,
            lone_number: compile(NUMBER)?,
        })
    }

    /// Reads every aliased value out of one message, in order of position.
    fn scan_message(&self, text: &str) -> (Vec<(ParameterField, f64)>, String) {
        let mut masked = text.to_string();
        let mut found: Vec<(usize, ParameterField, f64)> = Vec::new();

        for pattern in &self.patterns {
            let mut spans = Vec::new();
            let mut pos = 0;
            while let Some(caps) = pattern.valued.captures_at(&masked, pos) {
                let (Some(whole), Some(alias)) = (caps.get(0), caps.name("alias")) else {
                    break;
                };
                let connector = caps.name("connector").map_or("", |m| m.as_str());
                if self.any_alias.is_match(connector) {
                    // The number belongs to the later alias; this one has none.
                    spans.push(alias.range());
                    pos = alias.end();
                    continue;
                }
                if let Some(value) = read_number(&caps, pattern.field) {
                    found.push((whole.start(), pattern.field, value));
                }
                spans.push(whole.range());
                pos = whole.end();
            }
            for span in spans {
                blank_out(&mut masked, span);
            }
        }

        found.sort_by_key(|(start, _, _)| *start);
        let values = found.into_iter().map(|(_, field, value)| (field, value)).collect();
        (values, masked)
    }

    /// Fields named anywhere in `text`, with or without a value.
    fn mentioned_fields(&self, text: &str) -> Vec<ParameterField> {
        let mut masked = text.to_string();
        let mut fields = Vec::new();
        for pattern in &self.patterns {
            let spans: Vec<Range<usize>> =
                pattern.bare.find_iter(&masked).map(|m| m.range()).collect();
            if !spans.is_empty() && !fields.contains(&pattern.field) {
                fields.push(pattern.field);
            }
            for span in spans {
                blank_out(&mut masked, span);
            }
        }
        fields
    }

    /// A single number left over after alias matching answers `field`.
    fn answer_to(&self, masked: &str, field: ParameterField) -> Option<f64> {
        let mut numbers = self.lone_number.captures_iter(masked);
        let caps = numbers.next()?;
        if numbers.next().is_some() {
            return None;
        }
        read_number(&caps, field)
    }

    fn collect(&self, history: &[ConversationMessage]) -> (HashMap<ParameterField, Mention>, bool) {
        let mut mentions: HashMap<ParameterField, Mention> = HashMap::new();
        let mut asked: Option<ParameterField> = None;
        let mut latest_found_any = false;

        for (index, message) in history.iter().enumerate() {
            match message.role {
                MessageRole::Assistant => asked = message.asked_field,
                MessageRole::System => {}
                MessageRole::User => {
                    let (values, masked) = self.scan_message(&message.content);
                    let mut any = !values.is_empty();
                    for (field, value) in values {
                        mentions.insert(field, Mention { value, message: index });
                    }
                    if !any {
                        if let Some(field) = asked.filter(|field| {
                            self.mentioned_fields(&message.content)
                                .iter()
                                .all(|named| named == field)
                        }) {
                            if let Some(value) = self.answer_to(&masked, field) {
                                mentions.insert(field, Mention { value, message: index });
                                any = true;
                            }
                        }
                    }
                    latest_found_any = any;
                }
            }
        }

        (mentions, latest_found_any)
    }
}

fn compile(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| DyelabError::internal(format!("bad extraction pattern: {}", e)))
}

/// Replaces a byte range with spaces, keeping every other offset valid.
fn blank_out(text: &mut String, span: Range<usize>) {
    let blank = " ".repeat(span.len());
    text.replace_range(span, &blank);
}

/// Plain numbers read as-is; `a:b` reads as `b / a` for the liquor ratio and
/// is ignored for every other field.
fn read_number(caps: &Captures<'_>, field: ParameterField) -> Option<f64> {
    let first: f64 = caps.name("value")?.as_str().parse().ok()?;
    match caps.name("per") {
        None => Some(first),
        Some(second) if field == ParameterField::LiquorRatio && first != 0.0 => {
            let second: f64 = second.as_str().parse().ok()?;
            Some(second / first)
        }
        Some(_) => None,
    }
}

#[async_trait]
impl RequirementsExtractor for RuleBasedExtractor {
    fn name(&self) -> &str {
        "rule_based"
    }

    async fn extract(
        &self,
        history: &[ConversationMessage],
        _current: &RequirementsRecord,
    ) -> Result<ExtractionOutput> {
        let latest_user = history.iter().rposition(ConversationMessage::is_user);
        let (mentions, latest_found_any) = self.collect(history);

        let mut record = RequirementsRecord::new();
        for (field, mention) in mentions {
            // An invalid value from an older message was already reported.
            if validate(field, mention.value).is_err() && Some(mention.message) != latest_user {
                continue;
            }
            record.insert(field, mention.value);
        }

        tracing::debug!("[RuleBased] Extracted {}", record.summary());

        let latest_blank = latest_user.is_none_or(|i| history[i].content.trim().is_empty());
        let output = ExtractionOutput::new(record);
        Ok(if !latest_blank && !latest_found_any {
            output.with_remark("I couldn't find any parameter values in your last message.")
        } else {
            output
        })
    }
}
