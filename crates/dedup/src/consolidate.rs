use crate::config::TieBreak;
use crate::model::{CanonicalOperator, MappingRow, OperatorGroup, OperatorRecord};

/// Pick a canonical record for the group, merge contact attributes, and
/// emit one mapping row per member (the canonical member maps to itself,
/// which gives the mapping table its closure property).
///
/// `members` must be the group's records in `member_ids` order. Pure:
/// no I/O, nothing mutated; persistence belongs to the caller.
pub fn consolidate(
    group: &OperatorGroup,
    members: &[&OperatorRecord],
    tie_break: TieBreak,
) -> (CanonicalOperator, Vec<MappingRow>) {
    debug_assert_eq!(group.member_ids.len(), members.len());

    let canonical_idx = match tie_break {
        TieBreak::First => 0,
        TieBreak::MostContacts => most_contacts_index(members),
    };
    let canonical = members[canonical_idx];

    let operator = CanonicalOperator {
        canonical_id: canonical.raw_id.clone(),
        name: canonical.name.clone(),
        email: first_non_empty(members, |m| &m.email),
        phone: first_non_empty(members, |m| &m.phone),
        website: first_non_empty(members, |m| &m.website),
        member_count: members.len(),
        member_ids: group.member_ids.clone(),
    };

    let mapping = members
        .iter()
        .map(|m| MappingRow {
            raw_id: m.raw_id.clone(),
            canonical_id: operator.canonical_id.clone(),
        })
        .collect();

    (operator, mapping)
}

/// Index of the member with the most non-empty contact fields; ties keep
/// the earlier member, so the choice is stable for identical input.
fn most_contacts_index(members: &[&OperatorRecord]) -> usize {
    let mut best = 0;
    for (i, member) in members.iter().enumerate().skip(1) {
        if member.contact_fields() > members[best].contact_fields() {
            best = i;
        }
    }
    best
}

/// First non-empty value in member order. First-wins is the contract, not
/// a best effort: disagreeing members are never reconciled.
fn first_non_empty<'a, F>(members: &'a [&OperatorRecord], field: F) -> Option<String>
where
    F: Fn(&'a OperatorRecord) -> &'a Option<String>,
{
    members.iter().find_map(|m| field(m).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        raw_id: &str,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        website: Option<&str>,
    ) -> OperatorRecord {
        OperatorRecord {
            raw_id: raw_id.into(),
            name: name.into(),
            email: email.map(String::from),
            phone: phone.map(String::from),
            website: website.map(String::from),
        }
    }

    fn group_of(records: &[OperatorRecord]) -> OperatorGroup {
        OperatorGroup {
            key: "key".into(),
            member_ids: records.iter().map(|r| r.raw_id.clone()).collect(),
            is_generic: false,
        }
    }

    #[test]
    fn first_member_wins_by_default() {
        let records = vec![
            record("A1", "Agrar Nord GbR", None, None, None),
            record("A2", "Agrar Nord GbR", Some("a@x.de"), Some("0123"), Some("x.de")),
        ];
        let group = group_of(&records);
        let members: Vec<&OperatorRecord> = records.iter().collect();
        let (op, _) = consolidate(&group, &members, TieBreak::First);
        assert_eq!(op.canonical_id, "A1");
        assert_eq!(op.name, "Agrar Nord GbR");
    }

    #[test]
    fn first_non_empty_contact_per_field() {
        let records = vec![
            record("A1", "Agrar Nord GbR", None, Some("0461-1"), None),
            record("A2", "Agrar Nord GbR", Some("a@x.de"), None, None),
            record("A3", "Agrar Nord GbR", Some("b@y.de"), Some("0461-2"), Some("y.de")),
        ];
        let group = group_of(&records);
        let members: Vec<&OperatorRecord> = records.iter().collect();
        let (op, _) = consolidate(&group, &members, TieBreak::First);
        assert_eq!(op.email.as_deref(), Some("a@x.de"));
        assert_eq!(op.phone.as_deref(), Some("0461-1"));
        assert_eq!(op.website.as_deref(), Some("y.de"));
    }

    #[test]
    fn every_member_maps_to_canonical_including_itself() {
        let records = vec![
            record("A1", "Agrar Nord GbR", None, None, None),
            record("A2", "Agrar Nord GbR", None, None, None),
        ];
        let group = group_of(&records);
        let members: Vec<&OperatorRecord> = records.iter().collect();
        let (op, mapping) = consolidate(&group, &members, TieBreak::First);
        assert_eq!(mapping.len(), 2);
        assert!(mapping.iter().all(|row| row.canonical_id == op.canonical_id));
        assert!(mapping.iter().any(|row| row.raw_id == op.canonical_id));
    }

    #[test]
    fn most_contacts_tie_break_picks_richest_member() {
        let records = vec![
            record("A1", "Agrar Nord GbR", None, None, None),
            record("A2", "Agrar Nord GbR", Some("a@x.de"), Some("0123"), None),
            record("A3", "Agrar Nord GbR", Some("b@y.de"), None, None),
        ];
        let group = group_of(&records);
        let members: Vec<&OperatorRecord> = records.iter().collect();
        let (op, mapping) = consolidate(&group, &members, TieBreak::MostContacts);
        assert_eq!(op.canonical_id, "A2");
        assert!(mapping.iter().all(|row| row.canonical_id == "A2"));
        // Merge order is unchanged by the tie-break rule
        assert_eq!(op.email.as_deref(), Some("a@x.de"));
    }

    #[test]
    fn most_contacts_tie_falls_back_to_first() {
        let records = vec![
            record("A1", "Agrar Nord GbR", Some("a@x.de"), None, None),
            record("A2", "Agrar Nord GbR", Some("b@y.de"), None, None),
        ];
        let group = group_of(&records);
        let members: Vec<&OperatorRecord> = records.iter().collect();
        let (op, _) = consolidate(&group, &members, TieBreak::MostContacts);
        assert_eq!(op.canonical_id, "A1");
    }

    #[test]
    fn consolidation_is_idempotent() {
        let records = vec![
            record("A1", "Agrar Nord GbR", None, Some("0461-1"), None),
            record("A2", "Agrar Nord GbR", Some("a@x.de"), None, Some("x.de")),
        ];
        let group = group_of(&records);
        let members: Vec<&OperatorRecord> = records.iter().collect();
        let (first_op, first_map) = consolidate(&group, &members, TieBreak::First);
        let (second_op, second_map) = consolidate(&group, &members, TieBreak::First);
        assert_eq!(first_op.canonical_id, second_op.canonical_id);
        assert_eq!(first_op.email, second_op.email);
        assert_eq!(first_map, second_map);
    }
}
