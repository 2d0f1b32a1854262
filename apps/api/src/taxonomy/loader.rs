//! Taxonomy Loader: parses the O*NET skill catalog (CSV) into `SkillRecord`s.
//!
//! Rows are recovered individually: a malformed row is skipped and recorded as a
//! `DataFormatError` in the `LoadReport`. Only a load that yields zero usable
//! records fails as a whole (`TaxonomyError::Empty`).
//!
//! Expected header (case-insensitive, any order):
//! `id, name, category, description, related_terms`
//! `related_terms` is a `;`-separated list. `element_id` / `element_name` are
//! accepted as aliases for `id` / `name`.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::SkillRecord;
use crate::taxonomy::category::infer_category;

pub const RELATED_TERMS_DELIMITER: char = ';';

/// A single rejected row (or header) of the taxonomy source.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("line {line}: {reason}")]
pub struct DataFormatError {
    pub line: u64,
    pub id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid synonym table: {0}")]
    Synonyms(#[from] serde_json::Error),

    #[error("Taxonomy contains no usable records ({} rows rejected)", .errors.len())]
    Empty { errors: Vec<DataFormatError> },
}

/// Outcome of a successful load: how many records were kept and which rows were not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub errors: Vec<DataFormatError>,
}

/// The loaded skill catalog. Records keep source order; ids are unique.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    records: Vec<SkillRecord>,
    by_id: HashMap<String, usize>,
}

impl Taxonomy {
    pub fn records(&self) -> &[SkillRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&SkillRecord> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Case-insensitive lookup by canonical name.
    pub fn find_by_name(&self, name: &str) -> Option<&SkillRecord> {
        self.records
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts a record unless its id is already present. Returns whether it was kept.
    fn insert(&mut self, record: SkillRecord) -> bool {
        if self.by_id.contains_key(&record.id) {
            return false;
        }
        self.by_id.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        true
    }
}

/// Header positions resolved from the first CSV row.
struct Columns {
    id: usize,
    name: usize,
    category: Option<usize>,
    description: Option<usize>,
    related_terms: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, DataFormatError> {
        let position = |aliases: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().to_lowercase().replace([' ', '-'], "_");
                aliases.contains(&h.as_str())
            })
        };

        let missing = |column: &str| DataFormatError {
            line: 1,
            id: None,
            reason: format!("missing required column '{column}'"),
        };

        Ok(Columns {
            id: position(&["id", "element_id", "skill_id"]).ok_or_else(|| missing("id"))?,
            name: position(&["name", "element_name", "skill_name"])
                .ok_or_else(|| missing("name"))?,
            category: position(&["category"]),
            description: position(&["description"]),
            related_terms: position(&["related_terms", "relatedterms"]),
        })
    }

    /// Fields a row needs to reach every resolved column.
    fn width(&self) -> usize {
        [self.category, self.description, self.related_terms]
            .into_iter()
            .flatten()
            .chain([self.id, self.name])
            .max()
            .map_or(0, |i| i + 1)
    }
}

/// Parses a taxonomy CSV stream into a `Taxonomy`, recovering from bad rows.
pub fn load_taxonomy<R: Read>(source: R) -> Result<(Taxonomy, LoadReport), TaxonomyError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let columns = match Columns::resolve(&headers) {
        Ok(columns) => columns,
        Err(e) => {
            warn!("Taxonomy header rejected: {e}");
            return Err(TaxonomyError::Empty { errors: vec![e] });
        }
    };

    let mut taxonomy = Taxonomy::default();
    let mut errors = Vec::new();

    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                let e = DataFormatError {
                    line: e.position().map(|p| p.line()).unwrap_or(0),
                    id: None,
                    reason: format!("unreadable row: {e}"),
                };
                warn!("Skipping taxonomy row: {e}");
                errors.push(e);
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let record = match parse_row(&row, &columns, line) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping taxonomy row: {e}");
                errors.push(e);
                continue;
            }
        };

        let id = record.id.clone();
        if !taxonomy.insert(record) {
            let e = DataFormatError {
                line,
                id: Some(id.clone()),
                reason: format!("duplicate id '{id}' (first occurrence kept)"),
            };
            warn!("Skipping taxonomy row: {e}");
            errors.push(e);
        }
    }

    if taxonomy.is_empty() {
        return Err(TaxonomyError::Empty { errors });
    }

    info!(
        "Loaded {} taxonomy skills ({} rows skipped)",
        taxonomy.len(),
        errors.len()
    );

    let report = LoadReport {
        loaded: taxonomy.len(),
        errors,
    };
    Ok((taxonomy, report))
}

/// Opens and loads a taxonomy CSV from disk.
pub fn load_taxonomy_file(path: &Path) -> Result<(Taxonomy, LoadReport), TaxonomyError> {
    let file = File::open(path)?;
    load_taxonomy(file)
}

fn parse_row(
    row: &StringRecord,
    columns: &Columns,
    line: u64,
) -> Result<SkillRecord, DataFormatError> {
    let field = |i: Option<usize>| i.and_then(|i| row.get(i)).unwrap_or("").trim();
    let id = field(Some(columns.id));

    let reject = |reason: String| DataFormatError {
        line,
        id: (!id.is_empty()).then(|| id.to_string()),
        reason,
    };

    let expected_fields = columns.width();
    if row.len() < expected_fields {
        return Err(reject(format!(
            "expected {expected_fields} fields, found {}",
            row.len()
        )));
    }
    if id.is_empty() {
        return Err(reject("blank id".to_string()));
    }

    let name = collapse_whitespace(field(Some(columns.name)));
    if name.is_empty() {
        return Err(reject("blank name".to_string()));
    }

    let description = field(columns.description).to_string();
    let category = match field(columns.category) {
        "" => infer_category(&name, &description).to_string(),
        c => c.to_string(),
    };

    let mut related_terms: Vec<String> = Vec::new();
    for term in field(columns.related_terms).split(RELATED_TERMS_DELIMITER) {
        let term = collapse_whitespace(term);
        if !term.is_empty() && !related_terms.contains(&term) {
            related_terms.push(term);
        }
    }

    Ok(SkillRecord {
        id: id.to_string(),
        name,
        category,
        description,
        related_terms,
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
