//! Property-based tests for the campaign location encoding
//!
//! Tests invariants:
//! - Comma-free countries round-trip through `to_location`/`from_location`
//! - A country containing a comma is rejected and the old value kept
//! - Cities may contain commas; the split happens at the first one

use proptest::prelude::*;

use crate::core::campaign::wizard::{Address, AddressError};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Trimmed, non-empty text without commas.
fn arb_country() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z .'-]{0,30}[A-Za-z]"
}

/// City names may contain commas ("Washington, D.C.").
fn arb_city() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ,.'-]{0,30}[A-Za-z.]"
}

fn arb_country_with_comma() -> impl Strategy<Value = String> {
    (arb_country(), arb_country()).prop_map(|(a, b)| format!("{},{}", a, b))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Encoding then decoding restores both parts
    #[test]
    fn prop_location_round_trips(
        country in arb_country(),
        city in arb_city()
    ) {
        let address = Address::new(&country, &city).unwrap();
        let decoded = Address::from_location(&address.to_location());

        prop_assert_eq!(decoded, Some(address));
    }

    /// Property: The encoded form starts with the country and a comma
    #[test]
    fn prop_location_prefix_is_country(
        country in arb_country(),
        city in arb_city()
    ) {
        let location = Address::new(&country, &city).unwrap().to_location();

        let expected_prefix = format!("{},", country);
        prop_assert!(location.starts_with(&expected_prefix));
        prop_assert_eq!(location.len(), country.len() + 1 + city.len());
    }

    /// Property: A comma in the country is always rejected
    #[test]
    fn prop_comma_in_country_rejected(
        bad in arb_country_with_comma(),
        city in arb_city()
    ) {
        prop_assert_eq!(
            Address::new(&bad, &city),
            Err(AddressError::CommaInCountry)
        );
    }

    /// Property: A rejected update keeps the previous country
    #[test]
    fn prop_rejected_update_keeps_previous(
        good in arb_country(),
        bad in arb_country_with_comma()
    ) {
        let mut address = Address::new(&good, "Nairobi").unwrap();

        prop_assert!(address.set_country(&bad).is_err());
        prop_assert_eq!(address.country(), good.as_str());
    }
}
