use std::collections::{HashMap, HashSet};

use crate::classify::GenericClassifier;
use crate::config::{DedupConfig, OperatorColumns, PlantColumns};
use crate::consolidate::consolidate;
use crate::error::DedupError;
use crate::group::group_records;
use crate::model::{DedupResult, OperatorRecord, PlantRecord, RunMeta};
use crate::normalize::Normalizer;
use crate::summary::compute_summary;

/// Pre-loaded operator records.
pub struct DedupInput {
    pub operators: Vec<OperatorRecord>,
}

/// Run deduplication per config. Returns the canonical operator table,
/// the raw-id → canonical-id mapping, and run statistics.
pub fn run(config: &DedupConfig, input: &DedupInput) -> Result<DedupResult, DedupError> {
    let normalizer = Normalizer::new();
    let classifier = GenericClassifier::new(&config.generic);

    let groups = group_records(&input.operators, &normalizer, &classifier);

    let mut by_id: HashMap<&str, &OperatorRecord> = HashMap::new();
    for record in &input.operators {
        by_id.entry(record.raw_id.as_str()).or_insert(record);
    }

    let mut operators = Vec::with_capacity(groups.len());
    let mut mapping = Vec::with_capacity(input.operators.len());
    for group in &groups {
        let members: Vec<&OperatorRecord> = group
            .member_ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .collect();
        let (operator, rows) = consolidate(group, &members, config.tie_break);
        operators.push(operator);
        mapping.extend(rows);
    }

    let summary = compute_summary(&groups, &operators, input.operators.len());

    Ok(DedupResult {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        operators,
        mapping,
    })
}

/// Load operator rows from decoded CSV text, applying the column mapping.
///
/// The extract repeats actor rows (one per registered unit); repeats of a
/// `raw_id` collapse to the first occurrence. A row without a `raw_id`
/// violates the input contract and fails the load.
pub fn load_operator_rows(
    csv_data: &str,
    delimiter: u8,
    columns: &OperatorColumns,
) -> Result<Vec<OperatorRecord>, DedupError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DedupError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, DedupError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DedupError::MissingColumn {
                table: "operators".into(),
                column: name.into(),
            })
    };

    let raw_id_idx = idx(&columns.raw_id)?;
    let name_idx = idx(&columns.name)?;
    let email_idx = idx(&columns.email)?;
    let phone_idx = idx(&columns.phone)?;
    let website_idx = idx(&columns.website)?;

    let mut rows = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for record in reader.records() {
        let record = record.map_err(|e| DedupError::Csv(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let raw_id = record.get(raw_id_idx).unwrap_or("").trim();
        if raw_id.is_empty() {
            return Err(DedupError::MissingId {
                table: "operators".into(),
                line,
            });
        }
        if !seen.insert(raw_id.to_string()) {
            continue;
        }

        rows.push(OperatorRecord {
            raw_id: raw_id.to_string(),
            name: record.get(name_idx).unwrap_or("").trim().to_string(),
            email: non_empty(record.get(email_idx)),
            phone: non_empty(record.get(phone_idx)),
            website: non_empty(record.get(website_idx)),
        });
    }

    Ok(rows)
}

/// Load plant rows from decoded CSV text. Columns other than the two
/// mapped ones are carried through untouched in `raw_fields`.
pub fn load_plant_rows(
    csv_data: &str,
    delimiter: u8,
    columns: &PlantColumns,
) -> Result<Vec<PlantRecord>, DedupError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DedupError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let plant_id_idx = headers
        .iter()
        .position(|h| h == &columns.plant_id)
        .ok_or_else(|| DedupError::MissingColumn {
            table: "plants".into(),
            column: columns.plant_id.clone(),
        })?;
    let operator_id_idx = headers
        .iter()
        .position(|h| h == &columns.operator_id)
        .ok_or_else(|| DedupError::MissingColumn {
            table: "plants".into(),
            column: columns.operator_id.clone(),
        })?;

    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| DedupError::Csv(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let plant_id = record.get(plant_id_idx).unwrap_or("").trim();
        if plant_id.is_empty() {
            return Err(DedupError::MissingId {
                table: "plants".into(),
                line,
            });
        }

        let mut raw_fields = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            if i == plant_id_idx || i == operator_id_idx {
                continue;
            }
            if let Some(value) = record.get(i) {
                raw_fields.insert(header.clone(), value.to_string());
            }
        }

        rows.push(PlantRecord {
            plant_id: plant_id.to_string(),
            operator_id: non_empty(record.get(operator_id_idx)),
            raw_fields,
        });
    }

    Ok(rows)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
