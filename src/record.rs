//! The harvested job record and its identity key

use serde::Serialize;

/// Column names of the tabular output, in order
///
/// This is the record schema minus the opaque `raw` block.
pub const TABULAR_COLUMNS: [&str; 10] = [
    "title",
    "company",
    "location",
    "description",
    "datePosted",
    "validThrough",
    "employmentType",
    "salary",
    "url",
    "source",
];

/// A single job posting harvested from a site
///
/// Records are created by site adapters and never mutated afterwards.
/// Absent fields stay `None`; nothing is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub date_posted: Option<String>,
    pub valid_through: Option<String>,
    pub employment_type: Option<String>,
    pub salary: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,

    /// Original structured-data block, kept for auditing only
    pub raw: Option<serde_json::Value>,
}

/// Tuple used to recognize the same posting across pages and sites
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
}

impl JobRecord {
    /// Tags the record with the site that produced it
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// Returns the deduplication key for this record
    ///
    /// The `raw` block and the source site never take part in identity.
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            url: self.url.clone(),
        }
    }

    /// Returns the tabular fields in [`TABULAR_COLUMNS`] order
    pub fn tabular_row(&self) -> [&str; 10] {
        fn field(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("")
        }

        [
            field(&self.title),
            field(&self.company),
            field(&self.location),
            field(&self.description),
            field(&self.date_posted),
            field(&self.valid_through),
            field(&self.employment_type),
            field(&self.salary),
            field(&self.url),
            field(&self.source),
        ]
    }
}
