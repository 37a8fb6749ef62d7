// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeMap, BTreeSet};

use crate::categories::{Additive, Category, InventoryCategory, Resin, Stream};
use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::constants::ConstantTable;
use crate::fractions::{distribute, recompose};
use crate::resins::ResinFlows;
use crate::results::{ResultKey, ResultRecord};
use crate::scenario::ResolvedScenario;

/// Additive mass released from `bulk_mass` tons of plastic, per additive
/// type: bulk mass x migration fraction x low-bound additive fraction.
pub fn additive_releases(constants: &ConstantTable, bulk_mass: f64) -> BTreeMap<Additive, f64> {
    let migration = constants.assumed.additive_migration_fraction;
    Additive::ALL
        .iter()
        .map(|a| (*a, bulk_mass * migration * constants.low_additive_fraction(*a)))
        .collect()
}

/// Total additive mass released from `bulk_mass` tons of plastic, across
/// every additive type.
pub fn total_additive_release(constants: &ConstantTable, bulk_mass: f64) -> f64 {
    bulk_mass
        * constants.assumed.additive_migration_fraction
        * constants.total_low_additive_fraction()
}

/// Accumulates result records, rejecting a second write to any
/// `(stream, category)` slot: that is a programming error, not data.
struct ResultSetBuilder {
    records: Vec<ResultRecord>,
    seen: BTreeSet<(Stream, ResultKey)>,
}

impl ResultSetBuilder {
    fn new() -> ResultSetBuilder {
        ResultSetBuilder {
            records: Vec::new(),
            seen: BTreeSet::new(),
        }
    }

    fn push(&mut self, stream: Stream, key: ResultKey, value: f64) -> Result<()> {
        if !self.seen.insert((stream, key)) {
            return Err(Error::new(
                ErrorKind::Calculation,
                ErrorCode::DuplicateResult,
                Some(format!("{} / {}", stream.title(), key.name())),
            ));
        }
        self.records.push(ResultRecord { stream, key, value });
        Ok(())
    }

    fn finish(self) -> Vec<ResultRecord> {
        self.records
    }
}

/// Roll every ledger up into the final `(stream, category, value)` records,
/// in stream order.
pub(crate) fn aggregate(
    resolved: &ResolvedScenario,
    flows: &ResinFlows,
    constants: &ConstantTable,
) -> Result<Vec<ResultRecord>> {
    let assumed = &constants.assumed;
    let conditions = &resolved.conditions;
    let mut builder = ResultSetBuilder::new();

    let recycling_additives = total_additive_release(constants, recompose(&flows.recycling));
    let incineration_additives = total_additive_release(constants, recompose(&flows.incineration));
    let landfill_additives = total_additive_release(constants, recompose(&flows.landfill_net));

    // 1: life-cycle roll-up of everything entering end-of-life management
    for resin in Resin::ALL {
        let value =
            flows.recycling[resin] + flows.incineration[resin] + flows.landfill_gross[resin];
        builder.push(
            Stream::MonomerRawMaterials,
            ResultKey::Inventory((*resin).into()),
            value,
        )?;
    }
    builder.push(
        Stream::MonomerRawMaterials,
        ResultKey::Inventory(InventoryCategory::ChemicalAdditives),
        recycling_additives + incineration_additives + landfill_additives,
    )?;

    // 2-6: MSW streams by waste type
    for (waste, mass) in distribute(conditions.total_msw, &resolved.msw_composition) {
        builder.push(Stream::MswComposition, ResultKey::Waste(waste), mass)?;
    }
    let msw_streams = [
        (Stream::MswRecycling, &resolved.msw_recycling),
        (Stream::MswIncineration, &resolved.msw_incineration),
        (Stream::MswLandfill, &resolved.msw_landfill),
        (Stream::MswCompost, &resolved.msw_compost),
    ];
    for (stream, breakdown) in msw_streams {
        for (waste, mass) in distribute(breakdown.total_mass, &breakdown.shares) {
            builder.push(stream, ResultKey::Waste(waste), mass)?;
        }
    }

    // 7-9: plastic dispositions by resin, each with its additive release
    for (resin, mass) in &flows.recycling {
        builder.push(
            Stream::PlasticsRecycling,
            ResultKey::Inventory((*resin).into()),
            *mass,
        )?;
    }
    builder.push(
        Stream::PlasticsRecycling,
        ResultKey::Inventory(InventoryCategory::ChemicalAdditives),
        recycling_additives,
    )?;

    for (resin, mass) in &flows.incineration {
        builder.push(
            Stream::PlasticsIncineration,
            ResultKey::Inventory((*resin).into()),
            mass * assumed.incineration_efficiency,
        )?;
    }
    builder.push(
        Stream::PlasticsIncineration,
        ResultKey::Inventory(InventoryCategory::ChemicalAdditives),
        incineration_additives,
    )?;

    for (resin, mass) in &flows.landfill_net {
        builder.push(
            Stream::PlasticsLandfill,
            ResultKey::Inventory((*resin).into()),
            *mass,
        )?;
    }
    builder.push(
        Stream::PlasticsLandfill,
        ResultKey::Inventory(InventoryCategory::ChemicalAdditives),
        landfill_additives,
    )?;

    // 10: the residual the destruction efficiency does not convert
    for (resin, mass) in &flows.incineration {
        builder.push(
            Stream::IncinerationEmissions,
            ResultKey::Inventory((*resin).into()),
            mass * (1.0 - assumed.incineration_efficiency),
        )?;
    }

    // 11: domestic recyclate after process efficiency
    for (resin, mass) in &flows.recycling {
        builder.push(
            Stream::RecyclateYield,
            ResultKey::Inventory((*resin).into()),
            mass * conditions.domestic_recyc * conditions.recyc_efficiency,
        )?;
    }

    // 12-14: international flows mapped onto domestic resins
    let trade_streams = [
        (Stream::PlasticsImport, &flows.imports),
        (Stream::PlasticsExport, &flows.exports),
        (Stream::PlasticsReExport, &flows.re_exports),
    ];
    for (stream, ledger) in trade_streams {
        for (resin, mass) in ledger {
            builder.push(stream, ResultKey::Inventory((*resin).into()), *mass)?;
        }
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::WasteType;
    use crate::{dispositions, resins};

    #[test]
    fn additive_release_uses_migration_and_low_bounds() {
        let constants = ConstantTable::builtin();
        let releases = additive_releases(constants, 1000.0);
        // 1000 * 0.02 migration * 0.1 plasticizer bulk fraction
        assert!((releases[&Additive::Plasticizer] - 2.0).abs() < 1e-12);
        assert!((releases[&Additive::Biocide] - 1000.0 * 0.02 * 0.00001).abs() < 1e-12);

        let total: f64 = releases.values().sum();
        assert!((total - total_additive_release(constants, 1000.0)).abs() < 1e-9);
        assert!((total - 1000.0 * 0.02 * 0.28378).abs() < 1e-9);
    }

    #[test]
    fn duplicate_slot_is_a_calculation_error() {
        let mut builder = ResultSetBuilder::new();
        let key = ResultKey::Inventory(InventoryCategory::Pet);
        builder.push(Stream::MonomerRawMaterials, key, 1.0).unwrap();
        let err = builder
            .push(Stream::MonomerRawMaterials, key, 2.0)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateResult);
        assert!(err.get_details().unwrap().contains("Monomer/Raw Materials"));
    }

    #[test]
    fn same_key_in_different_streams_is_fine() {
        let mut builder = ResultSetBuilder::new();
        let key = ResultKey::Inventory(InventoryCategory::Pet);
        builder.push(Stream::PlasticsRecycling, key, 1.0).unwrap();
        builder.push(Stream::PlasticsLandfill, key, 2.0).unwrap();
        assert_eq!(builder.finish().len(), 2);
    }

    #[test]
    fn aggregate_emits_every_stream_once_per_category() {
        let constants = ConstantTable::builtin();
        let resolved = crate::scenario::ScenarioInput::default()
            .resolve(constants)
            .unwrap();
        let mut warnings = Vec::new();
        let totals = dispositions::allocate(&resolved.conditions, constants, &mut warnings).unwrap();
        let flows = resins::resolve_flows(&resolved, &totals, constants, &mut warnings).unwrap();
        let records = aggregate(&resolved, &flows, constants).unwrap();

        // 9 roll-up + 5 MSW streams x 10 waste types + 3 disposition streams
        // x 9 + emissions/yield x 8 + 3 trade streams x 8
        assert_eq!(records.len(), 126);

        let mut seen = BTreeSet::new();
        for r in &records {
            assert!(seen.insert((r.stream, r.key)), "duplicate {:?}", (r.stream, r.key));
            assert!(r.value >= 0.0);
        }

        // records come out in stream order
        let ids: Vec<u8> = records.iter().map(|r| r.stream.id()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);

        // waste-type streams cover all ten types
        let composition_rows = records
            .iter()
            .filter(|r| r.stream == Stream::MswComposition)
            .count();
        assert_eq!(composition_rows, WasteType::ALL.len());
    }
}
