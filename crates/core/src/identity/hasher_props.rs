//! Property-based tests for student id hashing.

use proptest::prelude::*;

use super::hasher::StudentIdHasher;

/// Strategy for non-blank ids without surrounding whitespace.
fn student_id() -> impl Strategy<Value = String> {
    "[0-9A-Za-z]{1,20}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Hashing the same id twice gives the same key.
    #[test]
    fn prop_hash_is_deterministic(id in student_id(), salt in ".{0,16}") {
        let hasher = StudentIdHasher::new(salt);
        prop_assert_eq!(hasher.hash(&id).unwrap(), hasher.hash(&id).unwrap());
    }

    /// Appending a character changes the key.
    #[test]
    fn prop_trivially_different_ids_differ(id in student_id()) {
        let hasher = StudentIdHasher::new("salt");
        let extended = format!("{id}x");
        prop_assert_ne!(hasher.hash(&id).unwrap(), hasher.hash(&extended).unwrap());
    }

    /// Verification always accepts the id a hash was made from.
    #[test]
    fn prop_verify_roundtrip(id in student_id()) {
        let hasher = StudentIdHasher::new("salt");
        let hashed = hasher.hash(&id).unwrap();
        prop_assert!(hasher.verify(&id, &hashed));
    }
}
