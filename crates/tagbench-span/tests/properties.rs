//! Property tests for span normalization and the text codec.

use proptest::prelude::*;
use tagbench_span::{parse, serialize, union, Span, SpanSet};

fn arb_span() -> impl Strategy<Value = Span> {
    (0usize..200, 1usize..20).prop_map(|(start, len)| Span::new(start, start + len).unwrap())
}

fn arb_spans() -> impl Strategy<Value = Vec<Span>> {
    prop::collection::vec(arb_span(), 0..8)
}

proptest! {
    #[test]
    fn union_is_idempotent(spans in arb_spans()) {
        let once = union(&spans);
        let twice = union(once.spans());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn union_is_sorted_and_separated(spans in arb_spans()) {
        let set = union(&spans);
        for pair in set.spans().windows(2) {
            prop_assert!(pair[0].end() < pair[1].start());
        }
    }

    #[test]
    fn union_preserves_coverage(spans in arb_spans(), point in 0usize..230) {
        let set = union(&spans);
        let covered_by_input = spans.iter().any(|s| s.contains(point));
        prop_assert_eq!(set.contains(point), covered_by_input);
    }

    #[test]
    fn parse_inverts_serialize(spans in arb_spans()) {
        let normalized = union(&spans);
        let round_tripped = parse(&serialize(&normalized)).unwrap();
        prop_assert_eq!(round_tripped, normalized);
    }

    #[test]
    fn parse_normalizes_raw_pairs(spans in arb_spans()) {
        let raw = spans
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(parse(&raw).unwrap(), union(&spans));
    }

    #[test]
    fn anchors_match_coverage(spans in arb_spans()) {
        let set: SpanSet = spans.into_iter().collect();
        prop_assert_eq!(set.anchors().count(), set.covered_len());
    }
}
