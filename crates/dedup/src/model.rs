use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single market-actor row from the registry extract.
///
/// Many raw records may denote the same real-world operator; `raw_id` is
/// unique per row. Contact fields are `None` when the extract cell was
/// empty or whitespace.
#[derive(Debug, Clone)]
pub struct OperatorRecord {
    pub raw_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl OperatorRecord {
    /// Number of non-empty contact fields, used by the most-contacts
    /// tie-break.
    pub fn contact_fields(&self) -> usize {
        [&self.email, &self.phone, &self.website]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

/// A plant row from the unit extract. Technical columns the engine does
/// not interpret ride along in `raw_fields`.
#[derive(Debug, Clone, Serialize)]
pub struct PlantRecord {
    pub plant_id: String,
    pub operator_id: Option<String>,
    pub raw_fields: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// An equivalence class of operator records sharing a normalized name key.
///
/// Member order is input order (first occurrence first); the consolidator
/// depends on it. Generic-flagged records are always singleton groups.
#[derive(Debug, Clone)]
pub struct OperatorGroup {
    pub key: String,
    pub member_ids: Vec<String>,
    pub is_generic: bool,
}

// ---------------------------------------------------------------------------
// Consolidation
// ---------------------------------------------------------------------------

/// One consolidated operator, keyed by an id chosen from its members.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalOperator {
    pub canonical_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub member_count: usize,
    pub member_ids: Vec<String>,
}

impl CanonicalOperator {
    pub fn has_contact(&self) -> bool {
        self.email.is_some() || self.phone.is_some() || self.website.is_some()
    }
}

/// Audit-trail row: every raw id maps to exactly one canonical id, and
/// every canonical id is itself some row's raw id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRow {
    pub raw_id: String,
    pub canonical_id: String,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DedupSummary {
    pub total_records: usize,
    pub canonical_operators: usize,
    /// Groups that merged more than one record.
    pub merged_groups: usize,
    /// Records folded into another record's canonical id.
    pub merged_records: usize,
    pub generic_records: usize,
    pub with_email: usize,
    pub with_phone: usize,
    pub with_website: usize,
    pub with_any_contact: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupResult {
    pub meta: RunMeta,
    pub summary: DedupSummary,
    pub operators: Vec<CanonicalOperator>,
    pub mapping: Vec<MappingRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}
