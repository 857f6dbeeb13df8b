use crate::model::{CanonicalOperator, DedupSummary, OperatorGroup};

/// Compute run statistics from the grouping and consolidation output.
pub fn compute_summary(
    groups: &[OperatorGroup],
    operators: &[CanonicalOperator],
    total_records: usize,
) -> DedupSummary {
    let mut merged_groups = 0;
    let mut merged_records = 0;
    let mut generic_records = 0;

    for group in groups {
        if group.is_generic {
            generic_records += 1;
        }
        if group.member_ids.len() > 1 {
            merged_groups += 1;
            merged_records += group.member_ids.len() - 1;
        }
    }

    let with_email = operators.iter().filter(|op| op.email.is_some()).count();
    let with_phone = operators.iter().filter(|op| op.phone.is_some()).count();
    let with_website = operators.iter().filter(|op| op.website.is_some()).count();
    let with_any_contact = operators.iter().filter(|op| op.has_contact()).count();

    DedupSummary {
        total_records,
        canonical_operators: operators.len(),
        merged_groups,
        merged_records,
        generic_records,
        with_email,
        with_phone,
        with_website,
        with_any_contact,
    }
}
