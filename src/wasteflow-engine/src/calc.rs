// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::categories::{Category, WasteType};
use crate::common::Result;
use crate::constants::ConstantTable;
use crate::results::{CalcResults, Warning};
use crate::scenario::ScenarioInput;
use crate::{dispositions, inventory, resins};

/// Run one calculation: a pure function of the scenario and the constant
/// table.  Either the complete result set is returned or nothing is; partial
/// results are never published.
pub fn run(scenario: &ScenarioInput, constants: &ConstantTable) -> Result<CalcResults> {
    let resolved = scenario.resolve(constants)?;
    let mut warnings = Vec::new();

    // the declared plastic waste total should agree with the plastics share
    // of the MSW composition
    let composition_plastics = resolved.conditions.total_msw
        * resolved
            .msw_composition
            .get(&WasteType::Plastics)
            .copied()
            .unwrap_or(0.0);
    if resins::relative_difference(composition_plastics, resolved.conditions.total_waste)
        > constants.assumed.reconcile_tolerance
    {
        warnings.push(Warning::Reconciliation {
            context: "total plastic waste",
            key: WasteType::Plastics.name(),
            derived: composition_plastics,
            reported: resolved.conditions.total_waste,
        });
    }

    let dispositions = dispositions::allocate(&resolved.conditions, constants, &mut warnings)?;
    let flows = resins::resolve_flows(&resolved, &dispositions, constants, &mut warnings)?;
    let records = inventory::aggregate(&resolved, &flows, constants)?;

    Ok(CalcResults {
        records,
        dispositions,
        warnings,
    })
}

/// Run many independent scenarios against one shared constant table.
/// Results come back in input order.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_many(scenarios: &[ScenarioInput], constants: &ConstantTable) -> Vec<Result<CalcResults>> {
    use rayon::prelude::*;

    scenarios
        .par_iter()
        .map(|scenario| run(scenario, constants))
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub fn run_many(scenarios: &[ScenarioInput], constants: &ConstantTable) -> Vec<Result<CalcResults>> {
    scenarios
        .iter()
        .map(|scenario| run(scenario, constants))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{InventoryCategory, Resin, Stream};
    use crate::results::ResultKey;

    #[test]
    fn defaults_run_succeeds_and_is_idempotent() {
        let constants = ConstantTable::builtin();
        let scenario = ScenarioInput::default();
        let first = run(&scenario, constants).unwrap();
        let second = run(&scenario, constants).unwrap();
        assert_eq!(first, second);
        assert!(!first.records.is_empty());
    }

    #[test]
    fn defaults_plastic_total_is_consistent_with_composition() {
        let constants = ConstantTable::builtin();
        let results = run(&ScenarioInput::default(), constants).unwrap();
        // 292,360,000 * 0.122 is within 5% of 35,680,000, so no warning for
        // the plastics cross-check
        assert!(!results.warnings.iter().any(|w| matches!(
            w,
            Warning::Reconciliation {
                context: "total plastic waste",
                ..
            }
        )));
    }

    #[test]
    fn mismatched_plastic_total_warns() {
        let constants = ConstantTable::builtin();
        let mut scenario = ScenarioInput::default();
        scenario.conditions.total_waste = Some(1_000_000.0);
        let results = run(&scenario, constants).unwrap();
        assert!(results.warnings.iter().any(|w| matches!(
            w,
            Warning::Reconciliation {
                context: "total plastic waste",
                ..
            }
        )));
    }

    #[test]
    fn recyclate_yield_applies_domestic_share_and_efficiency() {
        let constants = ConstantTable::builtin();
        let results = run(&ScenarioInput::default(), constants).unwrap();
        let key = ResultKey::Inventory(InventoryCategory::Hdpe);
        let recycled = results.value(Stream::PlasticsRecycling, key).unwrap();
        let yielded = results.value(Stream::RecyclateYield, key).unwrap();
        let expected = recycled * (1.0 - 0.045_670_6 / 0.084) * 0.667;
        assert!((yielded - expected).abs() < 1e-6);
        assert!(yielded < recycled);
    }

    #[test]
    fn re_export_stream_maps_ethylene_to_polyethylenes() {
        let constants = ConstantTable::builtin();
        let results = run(&ScenarioInput::default(), constants).unwrap();
        let hdpe = results
            .value(
                Stream::PlasticsReExport,
                ResultKey::Inventory(InventoryCategory::Hdpe),
            )
            .unwrap();
        // 7,246 tons of re-exported ethylene, split evenly
        assert!((hdpe - 3_623.0).abs() < 1e-9);
        let pet = results
            .value(
                Stream::PlasticsReExport,
                ResultKey::Inventory(InventoryCategory::Pet),
            )
            .unwrap();
        assert_eq!(pet, 0.0);
    }

    #[test]
    fn run_many_matches_individual_runs() {
        let constants = ConstantTable::builtin();
        let scenarios = vec![ScenarioInput::default(), ScenarioInput::from_year("2018")];
        let batch = run_many(&scenarios, constants);
        assert_eq!(batch.len(), 2);
        for (scenario, result) in scenarios.iter().zip(&batch) {
            let individual = run(scenario, constants).unwrap();
            assert_eq!(result.as_ref().unwrap(), &individual);
        }
    }

    #[test]
    fn incineration_split_preserves_mass() {
        let constants = ConstantTable::builtin();
        let results = run(&ScenarioInput::default(), constants).unwrap();
        for resin in Resin::ALL {
            let key = ResultKey::Inventory((*resin).into());
            let converted = results.value(Stream::PlasticsIncineration, key).unwrap();
            let residual = results.value(Stream::IncinerationEmissions, key).unwrap();
            let gross = converted + residual;
            // residual is the 1 - 0.9999 complement of the converted share
            if gross > 0.0 {
                assert!((residual / gross - 0.0001).abs() < 1e-9);
            }
        }
    }
}
