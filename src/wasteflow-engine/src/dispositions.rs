// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::Serialize;

use crate::common::Result;
use crate::constants::ConstantTable;
use crate::results::Warning;
use crate::scenario::ResolvedConditions;

/// Total plastic masses by end-of-life pathway, in tons.
///
/// Litter and post-landfill leakage are deductions per the assumed
/// constants: `landfilled_net = landfilled_gross - landfill_leak`, and the
/// leak is reported separately rather than double-counted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DispositionTotals {
    pub recycled_domestic: f64,
    pub recycled_export: f64,
    pub re_exported: f64,
    pub incinerated: f64,
    pub landfilled_gross: f64,
    pub landfill_leak: f64,
    pub landfilled_net: f64,
    pub littered: f64,
    pub composted_plastic: f64,
    /// Pass-throughs from the scenario conditions; no category breakdown
    /// exists for these, so they live on the summary.
    pub waste_facility_emissions: f64,
    pub landfill_emissions: f64,
}

/// Allocate the plastic waste stream across disposition pathways.
pub fn allocate(
    conditions: &ResolvedConditions,
    constants: &ConstantTable,
    warnings: &mut Vec<Warning>,
) -> Result<DispositionTotals> {
    conditions.validate()?;

    let total_waste = conditions.total_waste;

    // domestic_recyc is a share of the recycled portion and has no meaning
    // when nothing is recycled; both recycling masses are 0 in that case.
    let (recycled_domestic, recycled_export) = if conditions.total_recyc == 0.0 {
        (0.0, 0.0)
    } else {
        (
            total_waste * conditions.total_recyc * conditions.domestic_recyc,
            total_waste * conditions.total_recyc * (1.0 - conditions.domestic_recyc),
        )
    };
    let re_exported = recycled_export * conditions.re_export;

    let incinerated = total_waste * conditions.incinerated;
    let landfilled_gross = total_waste * conditions.landfilled;
    let littered = total_waste * constants.assumed.littering_fraction;
    let landfill_leak = landfilled_gross * constants.assumed.landfill_leak_fraction;
    let landfilled_net = landfilled_gross - landfill_leak;

    let composted_plastic = conditions.total_msw
        * constants.assumed.compost_stream_multiplier
        * constants.assumed.compost_plastic_content;
    if composted_plastic > constants.assumed.compost_plastic_ceiling {
        warnings.push(Warning::CompostCeiling {
            computed: composted_plastic,
            ceiling: constants.assumed.compost_plastic_ceiling,
        });
    }

    Ok(DispositionTotals {
        recycled_domestic,
        recycled_export,
        re_exported,
        incinerated,
        landfilled_gross,
        landfill_leak,
        landfilled_net,
        littered,
        composted_plastic,
        waste_facility_emissions: conditions.waste_facility_emissions,
        landfill_emissions: conditions.landfill_emissions,
    })
}
