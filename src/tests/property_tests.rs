//! Property-based tests for the type system

use proptest::prelude::*;

use crate::core::types::{can_assign, ExpressionType};
use crate::core::SelectOption;

/// Atomic and parameterized leaf types.
fn leaf_type() -> impl Strategy<Value = ExpressionType> {
    prop_oneof![
        Just(ExpressionType::Any),
        Just(ExpressionType::Boolean),
        Just(ExpressionType::Void),
        Just(ExpressionType::Element),
        Just(ExpressionType::Color),
        Just(ExpressionType::Image),
        Just(ExpressionType::Link),
        Just(ExpressionType::Text),
        Just(ExpressionType::Date),
        Just(ExpressionType::number()),
        Just(ExpressionType::whole_number()),
        "[a-z]{1,4}".prop_map(|suffix| ExpressionType::suffixed_number(suffix)),
        ("[A-Z][a-z]{1,6}", prop::collection::vec("[a-z]{1,6}", 1..4)).prop_map(
            |(name, values)| ExpressionType::Enum {
                name,
                options: values
                    .into_iter()
                    .map(|value| SelectOption::new(value.clone(), value))
                    .collect(),
            }
        ),
    ]
}

/// Recursive types up to a bounded depth. Alternative lists go through
/// `one_of` so the construction invariant (no directly nested lists) holds
/// for every generated value.
fn arb_type() -> impl Strategy<Value = ExpressionType> {
    leaf_type().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(ExpressionType::array_of),
            inner.clone().prop_map(ExpressionType::promise_of),
            (
                "[A-Z][a-z]{1,6}",
                prop::collection::btree_map("[a-z]{1,6}", inner.clone(), 1..4)
            )
                .prop_map(|(name, entries)| ExpressionType::Object { name, entries }),
            prop::collection::vec(inner, 2..4).prop_map(|options| ExpressionType::one_of(options)),
        ]
    })
}

/// Members of the loosely-interchangeable bucket.
fn bucket_type() -> impl Strategy<Value = ExpressionType> {
    prop_oneof![
        Just(ExpressionType::Any),
        Just(ExpressionType::Color),
        Just(ExpressionType::Element),
        Just(ExpressionType::Image),
        Just(ExpressionType::Text),
        Just(ExpressionType::number()),
        Just(ExpressionType::Link),
        Just(ExpressionType::Enum {
            name: "Choice".to_string(),
            options: vec![SelectOption::new("A", "a")],
        }),
    ]
}

proptest! {
    /// `can_assign(t, t)` holds for every generated type.
    #[test]
    fn assignability_is_reflexive(ty in arb_type()) {
        prop_assert!(can_assign(&ty, &ty));
    }

    /// Bucket membership is symmetric in both directions.
    #[test]
    fn bucket_members_are_mutually_assignable(a in bucket_type(), b in bucket_type()) {
        prop_assert!(can_assign(&a, &b));
        prop_assert!(can_assign(&b, &a));
    }

    /// A type always fits a slot listing it as one alternative.
    #[test]
    fn alternatives_accept_their_members(ty in arb_type(), other in arb_type()) {
        let slot = ExpressionType::one_of([ty.clone(), other]);
        prop_assert!(can_assign(&ty, &slot));
    }

    /// The wire representation round-trips losslessly.
    #[test]
    fn wire_representation_round_trips(ty in arb_type()) {
        let restored = ExpressionType::from_value(&ty.to_value());
        prop_assert_eq!(restored.ok(), Some(ty));
    }

    /// Serde goes through the same wire representation.
    #[test]
    fn serde_round_trips(ty in arb_type()) {
        let json = serde_json::to_string(&ty).unwrap();
        let restored: ExpressionType = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(restored, ty);
    }
}
