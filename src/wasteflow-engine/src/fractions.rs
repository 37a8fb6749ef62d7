// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;

use float_cmp::approx_eq;

use crate::categories::Category;
use crate::common::InconsistentFractions;

/// Tolerance for fraction groups expected to partition exactly (identities
/// the caller constructed, like the disposition split of the waste stream).
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Tolerance for observed statistical tables: the national datasets round
/// shares to 3-4 decimal places, so their groups sum to 0.999-0.9999.
pub const OBSERVED_SUM_TOLERANCE: f64 = 2e-3;

/// Verify that a named fraction group sums to `target` within `tolerance`.
///
/// This never rescales: a group that fails the check is reported to the
/// caller with the offending keys and the observed sum, and the caller
/// decides whether to proceed or abort.
pub fn check_sum<K: Category>(
    group: &'static str,
    shares: &BTreeMap<K, f64>,
    target: f64,
    tolerance: f64,
) -> Result<(), InconsistentFractions> {
    let sum = recompose(shares);
    if approx_eq!(f64, sum, target, epsilon = tolerance) {
        Ok(())
    } else {
        Err(InconsistentFractions {
            group,
            keys: shares.keys().map(|k| k.name()).collect(),
            sum,
            target,
        })
    }
}

/// Split `total_mass` across categories: each output is `total_mass x share`.
///
/// Pure and commutative; the outputs sum to `total_mass` within normal
/// floating-point tolerance and no key absorbs a rounding remainder.
pub fn distribute<K: Category>(total_mass: f64, shares: &BTreeMap<K, f64>) -> BTreeMap<K, f64> {
    shares
        .iter()
        .map(|(k, share)| (*k, total_mass * share))
        .collect()
}

/// Inverse of [`distribute`]: a plain sum over the category masses, used to
/// reconcile reported absolute figures against fraction-derived ones.
pub fn recompose<K: Category>(masses: &BTreeMap<K, f64>) -> f64 {
    masses.values().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Resin;
    use proptest::prelude::*;

    fn shares_of(values: &[f64]) -> BTreeMap<Resin, f64> {
        Resin::ALL
            .iter()
            .copied()
            .zip(values.iter().copied())
            .collect()
    }

    #[test]
    fn check_sum_accepts_exact_partition() {
        let shares = shares_of(&[0.5, 0.5]);
        assert!(check_sum("resins", &shares, 1.0, SUM_TOLERANCE).is_ok());
    }

    #[test]
    fn check_sum_accepts_rounded_observed_data() {
        // the 2018 MSW incineration vector sums to 0.999
        let shares = shares_of(&[0.3, 0.3, 0.399]);
        assert!(check_sum("observed", &shares, 1.0, SUM_TOLERANCE).is_err());
        assert!(check_sum("observed", &shares, 1.0, OBSERVED_SUM_TOLERANCE).is_ok());
    }

    #[test]
    fn check_sum_reports_keys_and_sum() {
        let shares = shares_of(&[0.3, 0.3]);
        let err = check_sum("plastic recycling fractions", &shares, 1.0, SUM_TOLERANCE)
            .expect_err("0.6 is not 1.0");
        assert_eq!(err.group, "plastic recycling fractions");
        assert_eq!(err.keys, vec!["PET", "HDPE"]);
        assert!((err.sum - 0.6).abs() < 1e-12);
        assert_eq!(err.target, 1.0);
    }

    #[test]
    fn distribute_multiplies_each_share() {
        let shares = shares_of(&[0.25, 0.75]);
        let masses = distribute(1000.0, &shares);
        assert_eq!(masses[&Resin::Pet], 250.0);
        assert_eq!(masses[&Resin::Hdpe], 750.0);
        assert_eq!(recompose(&masses), 1000.0);
    }

    #[test]
    fn distribute_zero_mass_is_all_zeros() {
        let shares = shares_of(&[0.25, 0.75]);
        let masses = distribute(0.0, &shares);
        assert!(masses.values().all(|m| *m == 0.0));
    }

    proptest! {
        #[test]
        fn distribute_then_recompose_returns_total(
            total in 0.0f64..1.0e9,
            raw in proptest::collection::vec(0.001f64..1.0, 1..8),
        ) {
            let sum: f64 = raw.iter().sum();
            let shares: BTreeMap<Resin, f64> = Resin::ALL
                .iter()
                .copied()
                .zip(raw.iter().map(|v| v / sum))
                .collect();
            let back = recompose(&distribute(total, &shares));
            prop_assert!((back - total).abs() <= 1e-9 * total.max(1.0));
        }
    }
}
