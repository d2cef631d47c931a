//! Shipping and border-fee calculation.
//!
//! Pure functions over fixed per-country tables. The tables are deliberately
//! static rather than derived from real tariff data; callers must not assume
//! correctness beyond the table itself.

/// Flat component of every shipping quote.
const BASE_COST: f64 = 10.0;
/// Per-kilogram component of every shipping quote.
const WEIGHT_RATE: f64 = 2.0;
/// Border fee applied to destinations absent from the table.
const DEFAULT_BORDER_FEE: f64 = 20.0;

/// Destination multiplier applied to the shipping base cost.
fn country_multiplier(destination: &str) -> f64 {
    match destination {
        "US" => 1.2,
        "UK" => 1.3,
        "CA" => 1.1,
        "AU" => 1.5,
        "EU" => 1.0,
        _ => 1.0,
    }
}

/// Quote the shipping cost for a parcel of `weight_kg` kilograms.
///
/// `(10 + 2 * weight) * multiplier(destination)`, multiplier defaulting to
/// 1.0 for unknown country codes.
pub fn shipping_cost(weight_kg: f64, destination: &str) -> f64 {
    (BASE_COST + weight_kg * WEIGHT_RATE) * country_multiplier(destination)
}

/// Customs clearance charge collected before a parcel can proceed past the
/// border hold.
pub fn border_fee(destination: &str) -> f64 {
    match destination {
        "US" => 25.0,
        "UK" => 30.0,
        "CA" => 20.0,
        "AU" => 35.0,
        "EU" => 15.0,
        _ => DEFAULT_BORDER_FEE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("US", 1.2)]
    #[case("UK", 1.3)]
    #[case("CA", 1.1)]
    #[case("AU", 1.5)]
    #[case("EU", 1.0)]
    #[case("NZ", 1.0)]
    #[case("", 1.0)]
    fn shipping_cost_follows_formula(#[case] destination: &str, #[case] multiplier: f64) {
        for weight in [0.1, 1.0, 5.0, 99.9] {
            let expected = (10.0 + 2.0 * weight) * multiplier;
            let quoted = shipping_cost(weight, destination);
            assert!(
                (quoted - expected).abs() < f64::EPSILON * 100.0,
                "weight {weight} to {destination}: expected {expected}, got {quoted}"
            );
        }
    }

    #[rstest]
    #[case("US", 25.0)]
    #[case("UK", 30.0)]
    #[case("CA", 20.0)]
    #[case("AU", 35.0)]
    #[case("EU", 15.0)]
    #[case("NZ", 20.0)]
    #[case("", 20.0)]
    fn border_fee_matches_table(#[case] destination: &str, #[case] expected: f64) {
        assert!((border_fee(destination) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn five_kilograms_to_the_us_costs_twenty_four() {
        // The worked example: (10 + 2*5) * 1.2 = 24, border fee 25.
        assert!((shipping_cost(5.0, "US") - 24.0).abs() < f64::EPSILON);
        assert!((border_fee("US") - 25.0).abs() < f64::EPSILON);
    }
}
