use std::collections::HashMap;

use crate::classify::GenericClassifier;
use crate::model::{OperatorGroup, OperatorRecord};
use crate::normalize::Normalizer;

/// Partition operator records into equivalence classes by normalized name.
///
/// Single pass, hash-keyed. Group order and member order both follow
/// first occurrence in the input, which downstream canonical-id choice
/// depends on. Generic-flagged records become singleton groups even when
/// their keys collide.
pub fn group_records(
    records: &[OperatorRecord],
    normalizer: &Normalizer,
    classifier: &GenericClassifier,
) -> Vec<OperatorGroup> {
    let mut groups: Vec<OperatorGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = normalizer.normalize(&record.name);

        if classifier.is_generic(&key) {
            groups.push(OperatorGroup {
                key,
                member_ids: vec![record.raw_id.clone()],
                is_generic: true,
            });
            continue;
        }

        match index.get(&key) {
            Some(&i) => groups[i].member_ids.push(record.raw_id.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(OperatorGroup {
                    key,
                    member_ids: vec![record.raw_id.clone()],
                    is_generic: false,
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenericNameConfig;

    fn record(raw_id: &str, name: &str) -> OperatorRecord {
        OperatorRecord {
            raw_id: raw_id.into(),
            name: name.into(),
            email: None,
            phone: None,
            website: None,
        }
    }

    fn group(records: &[OperatorRecord]) -> Vec<OperatorGroup> {
        group_records(
            records,
            &Normalizer::new(),
            &GenericClassifier::new(&GenericNameConfig::default()),
        )
    }

    #[test]
    fn same_normalized_name_shares_a_group() {
        let records = vec![
            record("A1", "EnviTec Energy GmbH & Co. KG"),
            record("A2", "EnviTec  Energy GmbH u. Co. KG"),
            record("A3", "Bioenergie Husum GmbH"),
        ];
        let groups = group(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].member_ids, vec!["A1", "A2"]);
        assert!(!groups[0].is_generic);
        assert_eq!(groups[1].member_ids, vec!["A3"]);
    }

    #[test]
    fn generic_records_stay_singletons() {
        let records = vec![
            record("A1", "Herr"),
            record("A2", "Herr"),
            record("A3", "Herr"),
        ];
        let groups = group(&records);
        assert_eq!(groups.len(), 3);
        for g in &groups {
            assert!(g.is_generic);
            assert_eq!(g.member_ids.len(), 1);
        }
    }

    #[test]
    fn member_order_is_input_order() {
        let records = vec![
            record("B2", "Agrar Nord GbR"),
            record("A9", "Bioenergie Süd KG"),
            record("B1", "Agrar  Nord GbR"),
            record("A1", "Agrar Nord GbR"),
        ];
        let groups = group(&records);
        assert_eq!(groups[0].member_ids, vec!["B2", "B1", "A1"]);
        assert_eq!(groups[1].member_ids, vec!["A9"]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group(&[]).is_empty());
    }

    #[test]
    fn empty_name_is_generic_singleton() {
        let groups = group(&[record("A1", "   "), record("A2", "")]);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.is_generic));
    }
}
