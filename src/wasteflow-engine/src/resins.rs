// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;

use crate::categories::{Category, IntlPlastic, Resin};
use crate::common::Result;
use crate::constants::ConstantTable;
use crate::dispositions::DispositionTotals;
use crate::fractions::distribute;
use crate::results::Warning;
use crate::scenario::ResolvedScenario;

/// Default tolerance for reported-vs-derived mass disagreement, relative to
/// the larger magnitude.  [`crate::constants::Assumptions`] carries the
/// effective value.
pub const RECONCILE_TOLERANCE: f64 = 0.05;

/// Per-resin mass ledgers for every plastic disposition, in tons.
#[derive(Clone, Debug, PartialEq)]
pub struct ResinFlows {
    /// Total recycling (domestic and export), reconciled against reported
    /// recycled masses where those exist.
    pub recycling: BTreeMap<Resin, f64>,
    /// Gross incinerated mass, before the destruction-efficiency split.
    pub incineration: BTreeMap<Resin, f64>,
    pub landfill_gross: BTreeMap<Resin, f64>,
    pub landfill_net: BTreeMap<Resin, f64>,
    pub imports: BTreeMap<Resin, f64>,
    pub exports: BTreeMap<Resin, f64>,
    pub re_exports: BTreeMap<Resin, f64>,
}

/// Distribute each disposition's plastic mass across resins, preferring
/// reported absolute masses over fraction-derived ones where they exist.
pub fn resolve_flows(
    scenario: &ResolvedScenario,
    totals: &DispositionTotals,
    constants: &ConstantTable,
    warnings: &mut Vec<Warning>,
) -> Result<ResinFlows> {
    let recycled_total = totals.recycled_domestic + totals.recycled_export;
    let derived = distribute(recycled_total, &scenario.plastic_recycling);
    let recycling = reconcile(
        "recycled plastics",
        &derived,
        &scenario.reported_recycled,
        constants.assumed.reconcile_tolerance,
        warnings,
    );

    let incineration = distribute(totals.incinerated, &scenario.plastic_incineration);
    let landfill_gross = distribute(totals.landfilled_gross, &scenario.plastic_landfill);
    let landfill_net = distribute(totals.landfilled_net, &scenario.plastic_landfill);

    Ok(ResinFlows {
        recycling,
        incineration,
        landfill_gross,
        landfill_net,
        imports: map_international(&scenario.imports, constants),
        exports: map_international(&scenario.exports, constants),
        re_exports: map_international(&scenario.re_exports, constants),
    })
}

/// Merge a fraction-derived ledger with reported absolute masses.  A
/// reported value wins for its resin; disagreement beyond tolerance is
/// flagged with both values, never silently overwritten.
fn reconcile(
    context: &'static str,
    derived: &BTreeMap<Resin, f64>,
    reported: &BTreeMap<Resin, f64>,
    tolerance: f64,
    warnings: &mut Vec<Warning>,
) -> BTreeMap<Resin, f64> {
    let mut merged = derived.clone();
    for (resin, reported_mass) in reported {
        let derived_mass = merged.get(resin).copied().unwrap_or(0.0);
        if relative_difference(derived_mass, *reported_mass) > tolerance {
            warnings.push(Warning::Reconciliation {
                context,
                key: resin.name(),
                derived: derived_mass,
                reported: *reported_mass,
            });
        }
        merged.insert(*resin, *reported_mass);
    }
    merged
}

pub(crate) fn relative_difference(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 { 0.0 } else { (a - b).abs() / scale }
}

/// Convert international trade masses to the domestic resin ledger through
/// the fixed correspondence table.
fn map_international(
    masses: &BTreeMap<IntlPlastic, f64>,
    constants: &ConstantTable,
) -> BTreeMap<Resin, f64> {
    let mut out: BTreeMap<Resin, f64> = Resin::ALL.iter().map(|r| (*r, 0.0)).collect();
    for (category, mass) in masses {
        for (resin, share) in constants.resin_correspondence(*category) {
            *out.entry(resin).or_insert(0.0) += mass * share;
        }
    }
    out
}
