//! Ring Module Tests
//!
//! ## Test Scopes
//! - **Identifier**: range validation, circular interval membership with and without wraparound.
//! - **Key**: determinism, placement in the ring and known values for fixed names.

#[cfg(test)]
mod tests {
    use crate::error::RingError;
    use crate::ring::{Identifier, Key, RING_SIZE};

    fn id(value: u64) -> Identifier {
        Identifier::new(value).unwrap()
    }

    // ============================================================
    // IDENTIFIER TESTS
    // ============================================================

    #[test]
    fn test_identifier_accepts_ring_bounds() {
        assert_eq!(id(0).value(), 0);
        assert_eq!(id(RING_SIZE - 1).value() as u64, RING_SIZE - 1);
    }

    #[test]
    fn test_identifier_rejects_out_of_range() {
        let err = Identifier::new(RING_SIZE).unwrap_err();
        assert!(matches!(err, RingError::InvalidIdentifier(v) if v == RING_SIZE));

        assert!(Identifier::new(u64::MAX).is_err());
    }

    #[test]
    fn test_identifier_plain_ordering() {
        assert!(id(100) < id(200));
        assert_eq!(id(300), id(300));
    }

    #[test]
    fn test_open_closed_without_wrap() {
        let (a, b) = (id(100), id(400));

        for x in 0..1000u64 {
            let expected = x > 100 && x <= 400;
            assert_eq!(
                id(x).is_between_open_closed(a, b),
                expected,
                "x = {} in (100, 400]",
                x
            );
        }
    }

    #[test]
    fn test_open_closed_with_wrap() {
        let (a, b) = (id(800), id(200));

        for x in 0..1000u64 {
            let expected = x > 800 || x <= 200;
            assert_eq!(
                id(x).is_between_open_closed(a, b),
                expected,
                "x = {} in (800, 200]",
                x
            );
        }

        assert!(id(RING_SIZE - 1).is_between_open_closed(a, b));
    }

    #[test]
    fn test_open_open_excludes_both_ends() {
        let (a, b) = (id(100), id(400));
        assert!(!id(100).is_between_open_open(a, b));
        assert!(!id(400).is_between_open_open(a, b));
        assert!(id(250).is_between_open_open(a, b));

        let (a, b) = (id(900), id(0));
        assert!(id(950).is_between_open_open(a, b));
        assert!(!id(0).is_between_open_open(a, b));
        assert!(!id(900).is_between_open_open(a, b));
        assert!(!id(500).is_between_open_open(a, b));
    }

    #[test]
    fn test_degenerate_interval_covers_ring() {
        // (a, a] is the whole ring, (a, a) everything except a
        let a = id(500);
        assert!(id(500).is_between_open_closed(a, a));
        assert!(id(10).is_between_open_closed(a, a));
        assert!(!id(500).is_between_open_open(a, a));
        assert!(id(10).is_between_open_open(a, a));
        assert!(id(900).is_between_open_open(a, a));
    }

    #[test]
    fn test_identifier_serde_validates_range() {
        let json = serde_json::to_string(&id(1234)).unwrap();
        assert_eq!(json, "1234");

        let restored: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id(1234));

        let too_big = format!("{}", RING_SIZE);
        assert!(serde_json::from_str::<Identifier>(&too_big).is_err());
    }

    // ============================================================
    // KEY TESTS
    // ============================================================

    #[test]
    fn test_key_is_deterministic() {
        let k1 = Key::new("Le Bistrot Gourmand");
        let k2 = Key::new("Le Bistrot Gourmand");
        assert_eq!(k1, k2, "The same name should yield the same key");
    }

    #[test]
    fn test_key_known_values() {
        assert_eq!(Key::new("Le Bistrot Gourmand").id(), id(100));
        assert_eq!(Key::new("Auberge de la Madone").id(), id(1900));
        assert_eq!(Key::new("toto").id(), id(2600));
        assert_eq!(Key::new("La Merenda").id(), id(200));
        assert_eq!(Key::new("").id(), id(2400));
    }

    #[test]
    fn test_key_lands_on_scaled_slots() {
        for i in 0..500 {
            let key = Key::new(&format!("restaurant_{}", i)).id().value();
            assert_eq!(key % 100, 0, "key {} should be a multiple of 100", key);
            assert!(key < 3100, "key {} should be below 31 * 100", key);
        }
    }

    #[test]
    fn test_key_distribution() {
        use std::collections::HashSet;

        let slots: HashSet<u32> = (0..1000)
            .map(|i| Key::new(&format!("restaurant_{}", i)).id().value())
            .collect();

        // 31 slots, 1000 names: nearly every slot should be hit
        assert!(slots.len() > 25, "only {} slots used", slots.len());
    }
}
