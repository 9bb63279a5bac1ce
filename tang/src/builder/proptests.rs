//! Property-based tests for the binding algebra.

use super::{ConfigurationBuilder, ConfigurationMerger, SetEntry};
use crate::classpath::ClasspathLoader;
use proptest::prelude::*;

const DECLS: &str = r"
declarations:
  - name: app.Timer
    kind: interface
  - name: app.A
    implements: [app.Timer]
  - name: app.B
    implements: [app.Timer]
  - name: app.C
    implements: [app.Timer]
  - name: app.Retries
    implements: ['Name<Integer>']
    named_parameter: {}
  - name: app.Label
    implements: ['Name<String>']
    named_parameter: {}
  - name: app.Tags
    implements: ['Name<Set<String>>']
    named_parameter: {}
";

const IMPLS: &[&str] = &["app.A", "app.B", "app.C"];
const SCALARS: &[&str] = &["app.Retries", "app.Label"];

#[derive(Debug, Clone)]
enum Op {
    Implementation(usize),
    Scalar(usize, String),
    Tag(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..IMPLS.len()).prop_map(Op::Implementation),
        (0..SCALARS.len(), "[a-z0-9]{0,6}").prop_map(|(i, v)| Op::Scalar(i, v)),
        "[a-c]{1,2}".prop_map(Op::Tag),
    ]
}

fn builder() -> ConfigurationBuilder {
    ConfigurationBuilder::from_entries([ClasspathLoader::parse_str("proptest", DECLS).unwrap()])
        .unwrap()
}

fn apply(builder: &mut ConfigurationBuilder, ops: &[Op]) {
    for op in ops {
        match op {
            Op::Implementation(i) => {
                builder.bind_implementation("app.Timer", IMPLS[*i]).unwrap();
            }
            Op::Scalar(i, v) => {
                builder.bind_named_parameter(SCALARS[*i], v).unwrap();
            }
            Op::Tag(v) => {
                builder.bind_set_entry("app.Tags", v).unwrap();
            }
        }
    }
}

fn tags(ops: &[Op]) -> Vec<String> {
    ops.iter()
        .filter_map(|op| match op {
            Op::Tag(v) => Some(v.clone()),
            _ => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        .. ProptestConfig::default()
    })]

    // At most one singleton per node: only the last write survives
    #[test]
    fn singleton_is_last_write(ops in prop::collection::vec(op_strategy(), 0..30)) {
        let mut b = builder();
        apply(&mut b, &ops);
        let c = b.build();

        let last_impl = ops.iter().rev().find_map(|op| match op {
            Op::Implementation(i) => Some(IMPLS[*i]),
            _ => None,
        });
        prop_assert_eq!(c.bound_implementation("app.Timer"), last_impl);

        for (index, name) in SCALARS.iter().enumerate() {
            let last = ops.iter().rev().find_map(|op| match op {
                Op::Scalar(i, v) if *i == index => Some(v.as_str()),
                _ => None,
            });
            prop_assert_eq!(c.named_parameter(name), last);
        }
    }

    // Set entries are the concatenation of everything bound, as a multiset
    #[test]
    fn set_entries_are_concatenation(ops in prop::collection::vec(op_strategy(), 0..30)) {
        let mut b = builder();
        apply(&mut b, &ops);
        let mut expected = tags(&ops);
        expected.sort();
        let actual: Vec<String> = b
            .store()
            .set_entries("app.Tags")
            .iter()
            .map(|e| e.value().to_string())
            .collect();
        prop_assert_eq!(actual, expected);
    }

    // Merging a single configuration reproduces it
    #[test]
    fn merge_single_round_trips(ops in prop::collection::vec(op_strategy(), 0..30)) {
        let mut b = builder();
        apply(&mut b, &ops);
        let c = b.build();
        let merged = ConfigurationMerger::merge(&[&c]).unwrap();
        prop_assert_eq!(merged, c);
    }

    // Later configurations override singletons; sets union
    #[test]
    fn merge_overrides_and_unions(
        first in prop::collection::vec(op_strategy(), 0..20),
        second in prop::collection::vec(op_strategy(), 0..20)
    ) {
        let mut b1 = builder();
        apply(&mut b1, &first);
        let mut b2 = builder();
        apply(&mut b2, &second);
        let (c1, c2) = (b1.build(), b2.build());
        let merged = ConfigurationMerger::merge(&[&c1, &c2]).unwrap();

        let expected_impl = c2
            .bound_implementation("app.Timer")
            .or_else(|| c1.bound_implementation("app.Timer"));
        prop_assert_eq!(merged.bound_implementation("app.Timer"), expected_impl);

        for name in SCALARS {
            let expected = c2.named_parameter(name).or_else(|| c1.named_parameter(name));
            prop_assert_eq!(merged.named_parameter(name), expected);
        }

        for tag in tags(&first).iter().chain(tags(&second).iter()) {
            let entry = SetEntry::Value(tag.clone());
            prop_assert_eq!(
                merged.store().count("app.Tags", &entry),
                c1.store().count("app.Tags", &entry) + c2.store().count("app.Tags", &entry)
            );
        }
    }

    // Enumeration depends only on content, not on insertion order
    #[test]
    fn enumeration_ignores_order(ops in prop::collection::vec(op_strategy(), 0..30)) {
        let set_only: Vec<Op> = ops.iter().filter(|op| matches!(op, Op::Tag(_))).cloned().collect();
        let mut reversed = set_only.clone();
        reversed.reverse();

        let mut a = builder();
        apply(&mut a, &set_only);
        let mut b = builder();
        apply(&mut b, &reversed);

        let (ca, cb) = (a.build(), b.build());
        prop_assert_eq!(ca.entries(), cb.entries());
    }
}
