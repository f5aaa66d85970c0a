//! Property tests for id issuance, cascading deletes and completeness.

use proptest::prelude::*;
use std::collections::HashSet;
use tagbench_store::{check_completeness, is_complete, Tag, TagId, TagStore};
use tagbench_test_utils::{add_person, add_relation, empty_store, tag_type, STORY_TEXT};

#[derive(Debug, Clone)]
enum Op {
    Person(usize),
    Relation(usize, usize),
    Delete(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..40).prop_map(Op::Person),
        (0usize..16, 0usize..16).prop_map(|(a, b)| Op::Relation(a, b)),
        (0usize..16).prop_map(Op::Delete),
    ]
}

fn live_extents(store: &TagStore) -> Vec<TagId> {
    store
        .tags()
        .filter(|t| t.is_extent())
        .map(|t| t.id().clone())
        .collect()
}

/// Apply ops, returning every id ever issued
fn apply(store: &mut TagStore, ops: &[Op]) -> Vec<TagId> {
    let mut issued = Vec::new();
    for op in ops {
        match *op {
            Op::Person(start) => issued.push(add_person(store, start, start + 3)),
            Op::Relation(a, b) => {
                let extents = live_extents(store);
                let arg1 = extents.get(a % extents.len().max(1));
                let arg2 = extents.get(b % extents.len().max(1));
                issued.push(add_relation(store, arg1, arg2));
            }
            Op::Delete(i) => {
                let ids: Vec<TagId> = store.tags().map(|t| t.id().clone()).collect();
                if let Some(id) = ids.get(i % ids.len().max(1)) {
                    store.delete_tag(id).unwrap();
                }
            }
        }
    }
    issued
}

proptest! {
    #[test]
    fn issued_ids_are_never_repeated(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut store = empty_store(STORY_TEXT);
        let issued = apply(&mut store, &ops);
        let unique: HashSet<_> = issued.iter().collect();
        prop_assert_eq!(unique.len(), issued.len());
    }

    #[test]
    fn no_link_survives_its_argument(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut store = empty_store(STORY_TEXT);
        apply(&mut store, &ops);
        for tag in store.tags() {
            if let Tag::Link(link) = tag {
                for (_, target) in link.arguments() {
                    if let Some(target) = target {
                        prop_assert!(store.get_tag_by_tid(target).is_some_and(Tag::is_extent));
                    }
                }
            }
        }
    }

    #[test]
    fn deleting_an_extent_removes_its_links(
        ops in prop::collection::vec(arb_op(), 1..40),
        pick in 0usize..16,
    ) {
        let mut store = empty_store(STORY_TEXT);
        apply(&mut store, &ops);
        let extents = live_extents(&store);
        prop_assume!(!extents.is_empty());
        let victim = extents[pick % extents.len()].clone();
        let referencing: Vec<TagId> = store
            .links_referencing(&victim)
            .into_iter()
            .map(|l| l.id().clone())
            .collect();

        let removed = store.delete_tag(&victim).unwrap();
        prop_assert_eq!(removed.len(), referencing.len() + 1);
        for id in referencing.iter().chain(std::iter::once(&victim)) {
            prop_assert!(store.get_tag_by_tid(id).is_none());
        }
        prop_assert!(store.links_referencing(&victim).is_empty());
    }

    #[test]
    fn filling_every_field_completes_a_relation(
        bind_first in any::<bool>(),
        bind_second in any::<bool>(),
    ) {
        let mut store = empty_store(STORY_TEXT);
        let a = add_person(&mut store, 0, 4);
        let b = add_person(&mut store, 9, 13);
        let rel = add_relation(
            &mut store,
            bind_first.then_some(&a),
            bind_second.then_some(&b),
        );
        let complete = is_complete(store.get_tag_by_tid(&rel).unwrap());
        prop_assert_eq!(complete, bind_first && bind_second);

        let rel_type = tag_type(store.schema(), "RELATION");
        for (name, target) in [("arg1", &a), ("arg2", &b)] {
            let slot = rel_type.argument(name).unwrap().clone();
            store.add_or_update_argument(&rel, &slot, target).unwrap();
        }
        prop_assert!(check_completeness(&store).is_empty());

        let slot = rel_type.argument("arg2").unwrap().clone();
        store.clear_argument(&rel, &slot).unwrap();
        let incomplete: Vec<_> = check_completeness(&store).into_iter().map(|t| t.id().clone()).collect();
        prop_assert_eq!(incomplete, vec![rel]);
    }

    #[test]
    fn clearing_a_required_attribute_marks_incomplete(start in 0usize..40) {
        let mut store = empty_store(STORY_TEXT);
        let id = add_person(&mut store, start, start + 3);
        prop_assert!(is_complete(store.get_tag_by_tid(&id).unwrap()));

        store.remove_attribute(&id, "role").unwrap();
        prop_assert!(!is_complete(store.get_tag_by_tid(&id).unwrap()));

        tagbench_store::populate_default_attributes(&mut store, &id).unwrap();
        prop_assert!(is_complete(store.get_tag_by_tid(&id).unwrap()));
    }
}
