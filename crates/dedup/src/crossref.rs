use std::collections::HashMap;

use serde::Serialize;

use crate::model::{CanonicalOperator, MappingRow, PlantRecord};

/// Join coverage after re-keying the plant table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageSummary {
    pub total_plants: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Resolved plants whose canonical operator carries at least one
    /// non-empty contact field.
    pub with_contact: usize,
}

#[derive(Debug)]
pub struct CrossRefOutput {
    pub plants: Vec<PlantRecord>,
    pub coverage: CoverageSummary,
}

pub fn mapping_lookup(mapping: &[MappingRow]) -> HashMap<&str, &str> {
    mapping
        .iter()
        .map(|row| (row.raw_id.as_str(), row.canonical_id.as_str()))
        .collect()
}

pub fn operator_lookup(operators: &[CanonicalOperator]) -> HashMap<&str, &CanonicalOperator> {
    operators
        .iter()
        .map(|op| (op.canonical_id.as_str(), op))
        .collect()
}

/// Re-key each plant's `operator_id` to the canonical id.
///
/// An operator id absent from the mapping is a data-quality gap in the
/// extract, not an error: the plant keeps a null operator and the
/// unresolved counter moves. Nothing here can fail a run.
pub fn reproject(
    plants: &[PlantRecord],
    mapping: &HashMap<&str, &str>,
    operators: &HashMap<&str, &CanonicalOperator>,
) -> CrossRefOutput {
    let mut out = Vec::with_capacity(plants.len());
    let mut resolved = 0;
    let mut unresolved = 0;
    let mut with_contact = 0;

    for plant in plants {
        let canonical_id = plant
            .operator_id
            .as_deref()
            .and_then(|id| mapping.get(id))
            .map(|id| id.to_string());

        match canonical_id.as_deref() {
            Some(id) => {
                resolved += 1;
                if operators.get(id).is_some_and(|op| op.has_contact()) {
                    with_contact += 1;
                }
            }
            None => unresolved += 1,
        }

        out.push(PlantRecord {
            plant_id: plant.plant_id.clone(),
            operator_id: canonical_id,
            raw_fields: plant.raw_fields.clone(),
        });
    }

    CrossRefOutput {
        plants: out,
        coverage: CoverageSummary {
            total_plants: plants.len(),
            resolved,
            unresolved,
            with_contact,
        },
    }
}
