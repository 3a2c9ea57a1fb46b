//! JSON-LD `JobPosting` extraction
//!
//! Job boards commonly embed schema.org `JobPosting` objects in
//! `<script type="application/ld+json">` blocks. This module finds those
//! blocks, parses them, and maps postings onto [`JobRecord`].

use crate::extract::text::{html_to_text, normalize_space};
use crate::extract::StructuredDataExtractor;
use crate::record::JobRecord;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use url::Url;

const LD_JSON_TYPE: &str = "application/ld+json";
const JOB_POSTING: &str = "JobPosting";

/// Structured-data extractor for JSON-LD script blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLdExtractor;

impl StructuredDataExtractor for JsonLdExtractor {
    fn extract(&self, markup: &str, base_url: &Url) -> Vec<JobRecord> {
        let mut records = Vec::new();

        for raw in ld_json_blocks(markup) {
            let block = match parse_block(&raw) {
                Some(block) => block,
                None => {
                    tracing::debug!("Skipping malformed JSON-LD block on {}", base_url);
                    continue;
                }
            };

            for posting in block.job_postings() {
                records.push(posting_to_record(posting, base_url));
            }
        }

        records
    }
}

/// A parsed JSON-LD block, resolved once into its shape
#[derive(Debug)]
enum LdBlock {
    /// A single top-level object
    Single(Map<String, Value>),
    /// A top-level array; every posting in it counts
    List(Vec<Value>),
    /// An object carrying `@graph`; the first posting in the graph counts
    Graph(Vec<Value>),
}

impl LdBlock {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::List(items)),
            Value::Object(mut map) => match map.remove("@graph") {
                Some(Value::Array(items)) => Some(Self::Graph(items)),
                Some(single @ Value::Object(_)) => Some(Self::Graph(vec![single])),
                Some(_) => None,
                None => Some(Self::Single(map)),
            },
            _ => None,
        }
    }

    /// Returns the `JobPosting` objects this block contributes
    fn job_postings(&self) -> Vec<&Map<String, Value>> {
        match self {
            Self::Single(map) if is_job_posting(map) => vec![map],
            Self::Single(_) => Vec::new(),
            Self::List(items) => items
                .iter()
                .filter_map(Value::as_object)
                .filter(|map| is_job_posting(map))
                .collect(),
            Self::Graph(items) => items
                .iter()
                .filter_map(Value::as_object)
                .find(|map| is_job_posting(map))
                .into_iter()
                .collect(),
        }
    }
}

/// Returns the raw text of every JSON-LD script block in the page
fn ld_json_blocks(markup: &str) -> Vec<String> {
    let document = Html::parse_document(markup);
    let selector = match Selector::parse("script[type]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter(|script| {
            script
                .value()
                .attr("type")
                .map(|t| t.trim().eq_ignore_ascii_case(LD_JSON_TYPE))
                .unwrap_or(false)
        })
        .map(|script| script.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

/// Parses one block, retrying once with raw control characters blanked
///
/// Hand-written JSON-LD often carries literal newlines inside strings,
/// which strict JSON rejects.
fn parse_block(raw: &str) -> Option<LdBlock> {
    let value = serde_json::from_str::<Value>(raw.trim()).or_else(|_| {
        let relaxed: String = raw
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        serde_json::from_str::<Value>(relaxed.trim())
    });

    value.ok().and_then(LdBlock::from_value)
}

fn is_job_posting(map: &Map<String, Value>) -> bool {
    match map.get("@type") {
        Some(Value::String(t)) => t == JOB_POSTING,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(JOB_POSTING)),
        _ => false,
    }
}

/// Maps one `JobPosting` object onto a record
fn posting_to_record(posting: &Map<String, Value>, base_url: &Url) -> JobRecord {
    let organization = posting
        .get("hiringOrganization")
        .or_else(|| posting.get("company"));

    JobRecord {
        title: posting.get("title").and_then(text),
        company: organization.and_then(name_of),
        location: posting.get("jobLocation").and_then(location),
        description: posting
            .get("description")
            .and_then(Value::as_str)
            .and_then(html_to_text),
        date_posted: posting.get("datePosted").and_then(text),
        valid_through: posting.get("validThrough").and_then(text),
        employment_type: posting.get("employmentType").and_then(employment_type),
        salary: posting
            .get("baseSalary")
            .or_else(|| posting.get("salary"))
            .and_then(salary),
        url: Some(posting_url(posting, base_url)),
        source: None,
        raw: Some(Value::Object(posting.clone())),
    }
}

/// Normalized text of a string value
fn text(value: &Value) -> Option<String> {
    value.as_str().and_then(normalize_space)
}

/// Text of a scalar, rendering numbers as written
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => normalize_space(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A bare string, or the `name` of an object
fn name_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => normalize_space(s),
        Value::Object(map) => map.get("name").and_then(text),
        _ => None,
    }
}

/// Renders `jobLocation` as "locality, region, country"
fn location(value: &Value) -> Option<String> {
    let place = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };

    match place {
        Value::String(s) => normalize_space(s),
        Value::Object(map) => match map.get("address")? {
            Value::Object(address) => {
                let parts: Vec<String> = ["addressLocality", "addressRegion", "addressCountry"]
                    .iter()
                    .filter_map(|key| address.get(*key).and_then(name_of))
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            other => scalar(other),
        },
        _ => None,
    }
}

/// Renders `employmentType`, which may be a list
fn employment_type(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        other => text(other),
    }
}

/// Renders a `MonetaryAmount` as "amount unit currency"
fn salary(value: &Value) -> Option<String> {
    let compensation = match value {
        Value::Object(map) => map,
        other => return scalar(other),
    };

    let inner = compensation.get("value");
    let (amount, unit, inner_currency) = match inner {
        Some(Value::Object(quantity)) => (
            ["value", "minValue", "maxValue"]
                .iter()
                .find_map(|key| quantity.get(*key).and_then(scalar)),
            quantity.get("unitText").and_then(text),
            quantity.get("currency").and_then(text),
        ),
        Some(other) => (scalar(other), None, None),
        None => (None, None, None),
    };

    let unit = unit.or_else(|| compensation.get("unitText").and_then(text));
    let currency = compensation
        .get("currency")
        .and_then(text)
        .or(inner_currency);

    let parts: Vec<String> = [amount, unit, currency].into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// The posting's own URL resolved against the page, or the page itself
fn posting_url(posting: &Map<String, Value>, base_url: &Url) -> String {
    posting
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .and_then(|u| base_url.join(u).ok())
        .unwrap_or_else(|| base_url.clone())
        .to_string()
}
