// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::categories::{Category, IntlPlastic, Resin, WasteType};
use crate::common::{Error, ErrorCode, ErrorKind, InconsistentFractions, Result};
use crate::constants::{ConstantTable, DEFAULT_YEAR, YearDefaults};
use crate::fractions::{self, OBSERVED_SUM_TOLERANCE, SUM_TOLERANCE};

/// Top-level scenario conditions, as entered by the user.
///
/// Every field is optional; absent fields resolve from the year defaults in
/// the constant table.  Fractions are of the total plastic waste stream,
/// masses are tons.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    pub total_msw: Option<f64>,
    pub total_waste: Option<f64>,
    pub total_recyc: Option<f64>,
    /// Share of recycling that stays domestic (not a share of total waste).
    pub domestic_recyc: Option<f64>,
    pub export: Option<f64>,
    pub re_export: Option<f64>,
    pub recyc_efficiency: Option<f64>,
    pub incinerated: Option<f64>,
    pub landfilled: Option<f64>,
    pub waste_facility_emissions: Option<f64>,
    pub landfill_emissions: Option<f64>,
}

impl Conditions {
    fn is_fully_specified(&self) -> bool {
        self.total_msw.is_some()
            && self.total_waste.is_some()
            && self.total_recyc.is_some()
            && self.domestic_recyc.is_some()
            && self.export.is_some()
            && self.re_export.is_some()
            && self.recyc_efficiency.is_some()
            && self.incinerated.is_some()
            && self.landfilled.is_some()
            && self.waste_facility_emissions.is_some()
            && self.landfill_emissions.is_some()
    }

    fn resolve(&self, defaults: Option<&ResolvedConditions>) -> Result<ResolvedConditions> {
        let field = |declared: Option<f64>, name: &str, default: Option<f64>| -> Result<f64> {
            declared.or(default).ok_or_else(|| {
                Error::new(
                    ErrorKind::Input,
                    ErrorCode::BadInput,
                    Some(format!("{name} missing and no default year data loaded")),
                )
            })
        };

        let total_recyc = field(self.total_recyc, "total_recyc", defaults.map(|d| d.total_recyc))?;
        let domestic_recyc = field(
            self.domestic_recyc,
            "domestic_recyc",
            defaults.map(|d| d.domestic_recyc),
        )?;

        // The original dataset records export as an independent fraction and
        // derives the rest by subtraction; here the identity is explicit.  A
        // declared export must agree with the recycling split, an absent one
        // is derived from it.
        let derived_export = total_recyc * (1.0 - domestic_recyc);
        let export = match self.export {
            Some(declared) => {
                if (declared - derived_export).abs() > SUM_TOLERANCE {
                    return Err(InconsistentFractions {
                        group: "export partition",
                        keys: vec!["total_recyc", "domestic_recyc", "export"],
                        sum: declared,
                        target: derived_export,
                    }
                    .into());
                }
                declared
            }
            None => derived_export,
        };

        let resolved = ResolvedConditions {
            total_msw: field(self.total_msw, "total_msw", defaults.map(|d| d.total_msw))?,
            total_waste: field(self.total_waste, "total_waste", defaults.map(|d| d.total_waste))?,
            total_recyc,
            domestic_recyc,
            export,
            re_export: field(self.re_export, "re_export", defaults.map(|d| d.re_export))?,
            recyc_efficiency: field(
                self.recyc_efficiency,
                "recyc_efficiency",
                defaults.map(|d| d.recyc_efficiency),
            )?,
            incinerated: field(self.incinerated, "incinerated", defaults.map(|d| d.incinerated))?,
            landfilled: field(self.landfilled, "landfilled", defaults.map(|d| d.landfilled))?,
            waste_facility_emissions: field(
                self.waste_facility_emissions,
                "waste_facility_emissions",
                defaults.map(|d| d.waste_facility_emissions),
            )?,
            landfill_emissions: field(
                self.landfill_emissions,
                "landfill_emissions",
                defaults.map(|d| d.landfill_emissions),
            )?,
        };
        resolved.validate()?;

        // recycled, incinerated and landfilled must partition the plastic
        // waste stream; the source data satisfies this by construction, user
        // input has to prove it.
        let partition = resolved.total_recyc + resolved.incinerated + resolved.landfilled;
        if (partition - 1.0).abs() > SUM_TOLERANCE {
            return Err(InconsistentFractions {
                group: "disposition fractions",
                keys: vec!["total_recyc", "incinerated", "landfilled"],
                sum: partition,
                target: 1.0,
            }
            .into());
        }

        Ok(resolved)
    }
}

/// Conditions with every field concrete, post default-resolution.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedConditions {
    pub total_msw: f64,
    pub total_waste: f64,
    pub total_recyc: f64,
    pub domestic_recyc: f64,
    pub export: f64,
    pub re_export: f64,
    pub recyc_efficiency: f64,
    pub incinerated: f64,
    pub landfilled: f64,
    pub waste_facility_emissions: f64,
    pub landfill_emissions: f64,
}

impl ResolvedConditions {
    pub(crate) fn validate(&self) -> Result<()> {
        let fractions = [
            ("total_recyc", self.total_recyc),
            ("domestic_recyc", self.domestic_recyc),
            ("export", self.export),
            ("re_export", self.re_export),
            ("recyc_efficiency", self.recyc_efficiency),
            ("incinerated", self.incinerated),
            ("landfilled", self.landfilled),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(domain_range(name, value, "[0, 1]"));
            }
        }
        let masses = [
            ("total_msw", self.total_msw),
            ("total_waste", self.total_waste),
            ("waste_facility_emissions", self.waste_facility_emissions),
            ("landfill_emissions", self.landfill_emissions),
        ];
        for (name, value) in masses {
            if value < 0.0 {
                return Err(domain_range(name, value, ">= 0"));
            }
        }
        Ok(())
    }
}

fn domain_range(name: &str, value: f64, expected: &str) -> Error {
    Error::new(
        ErrorKind::Input,
        ErrorCode::DomainRange,
        Some(format!("{name}: {value} outside {expected}")),
    )
}

/// A category-keyed breakdown of one waste stream: an optional stream total
/// plus per-category shares of that total.
///
/// One parametric record per category set, instead of the near-identical
/// record type per table the source data model used.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(bound(deserialize = "K: Category + Serialize + for<'a> Deserialize<'a>"))]
pub struct Breakdown<K: Category + Serialize + for<'a> Deserialize<'a>> {
    pub total_mass: Option<f64>,
    pub shares: BTreeMap<K, f64>,
}

impl<K: Category + Serialize + for<'a> Deserialize<'a>> Default for Breakdown<K> {
    fn default() -> Self {
        Breakdown {
            total_mass: None,
            shares: BTreeMap::new(),
        }
    }
}

/// A breakdown with its total and full share table concrete.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedBreakdown<K: Category + Serialize> {
    pub total_mass: f64,
    pub shares: BTreeMap<K, f64>,
}

/// Immutable snapshot of all user-entered values for one calculation run.
///
/// Missing values fall back to the `year` defaults (2018 if unset) from the
/// constant table during [`ScenarioInput::resolve`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    pub year: Option<String>,
    pub conditions: Conditions,
    /// Waste-type shares of total MSW.
    pub msw_composition: BTreeMap<WasteType, f64>,
    pub msw_recycling: Breakdown<WasteType>,
    pub msw_incineration: Breakdown<WasteType>,
    pub msw_landfill: Breakdown<WasteType>,
    pub msw_compost: Breakdown<WasteType>,
    /// Resin shares of each plastic disposition's mass.
    pub plastic_recycling: BTreeMap<Resin, f64>,
    pub plastic_incineration: BTreeMap<Resin, f64>,
    pub plastic_landfill: BTreeMap<Resin, f64>,
    /// Reported recycled masses in tons; a present key overrides the
    /// fraction-derived figure for that resin.
    pub reported_recycled: BTreeMap<Resin, f64>,
    /// International trade masses in tons.
    pub imports: BTreeMap<IntlPlastic, f64>,
    pub exports: BTreeMap<IntlPlastic, f64>,
    pub re_exports: BTreeMap<IntlPlastic, f64>,
}

impl ScenarioInput {
    /// Build a scenario that takes every value from a year's defaults.
    pub fn from_year(year: &str) -> ScenarioInput {
        ScenarioInput {
            year: Some(year.to_string()),
            ..Default::default()
        }
    }

    fn is_fully_specified(&self) -> bool {
        let full_waste = |b: &Breakdown<WasteType>| {
            b.total_mass.is_some() && b.shares.len() == WasteType::ALL.len()
        };
        self.conditions.is_fully_specified()
            && self.msw_composition.len() == WasteType::ALL.len()
            && full_waste(&self.msw_recycling)
            && full_waste(&self.msw_incineration)
            && full_waste(&self.msw_landfill)
            && full_waste(&self.msw_compost)
            && self.plastic_recycling.len() == Resin::ALL.len()
            && self.plastic_incineration.len() == Resin::ALL.len()
            && self.plastic_landfill.len() == Resin::ALL.len()
            && !self.reported_recycled.is_empty()
            && !self.imports.is_empty()
            && !self.exports.is_empty()
            && !self.re_exports.is_empty()
    }

    /// Resolve this input against the constant table's year defaults,
    /// validating ranges and fraction-group sums at the boundary.
    pub fn resolve(&self, constants: &ConstantTable) -> Result<ResolvedScenario> {
        let year = self.year.as_deref().unwrap_or(DEFAULT_YEAR).to_string();
        let defaults: Option<&YearDefaults> = if self.is_fully_specified() {
            None
        } else {
            Some(constants.year_defaults(&year)?)
        };

        let conditions = self.conditions.resolve(defaults.map(|d| &d.conditions))?;

        let msw_composition = resolve_shares(
            "MSW composition",
            &self.msw_composition,
            defaults.map(|d| &d.msw_composition),
            OBSERVED_SUM_TOLERANCE,
        )?;

        let breakdown = |group: &'static str,
                         declared: &Breakdown<WasteType>,
                         default: Option<&ResolvedBreakdown<WasteType>>|
         -> Result<ResolvedBreakdown<WasteType>> {
            let total_mass = match declared.total_mass {
                Some(v) if v < 0.0 => return Err(domain_range(group, v, ">= 0")),
                Some(v) => v,
                None => {
                    default
                        .ok_or_else(|| {
                            Error::new(
                                ErrorKind::Input,
                                ErrorCode::BadInput,
                                Some(format!("{group}: total mass missing")),
                            )
                        })?
                        .total_mass
                }
            };
            let shares = resolve_shares(
                group,
                &declared.shares,
                default.map(|d| &d.shares),
                OBSERVED_SUM_TOLERANCE,
            )?;
            Ok(ResolvedBreakdown { total_mass, shares })
        };

        Ok(ResolvedScenario {
            year,
            msw_composition,
            msw_recycling: breakdown(
                "MSW recycling",
                &self.msw_recycling,
                defaults.map(|d| &d.msw_recycling),
            )?,
            msw_incineration: breakdown(
                "MSW incineration",
                &self.msw_incineration,
                defaults.map(|d| &d.msw_incineration),
            )?,
            msw_landfill: breakdown(
                "MSW landfill",
                &self.msw_landfill,
                defaults.map(|d| &d.msw_landfill),
            )?,
            msw_compost: breakdown(
                "MSW compost",
                &self.msw_compost,
                defaults.map(|d| &d.msw_compost),
            )?,
            plastic_recycling: resolve_shares(
                "plastic recycling fractions",
                &self.plastic_recycling,
                defaults.map(|d| &d.plastic_recycling),
                OBSERVED_SUM_TOLERANCE,
            )?,
            plastic_incineration: resolve_shares(
                "plastic incineration fractions",
                &self.plastic_incineration,
                defaults.map(|d| &d.plastic_incineration),
                OBSERVED_SUM_TOLERANCE,
            )?,
            plastic_landfill: resolve_shares(
                "plastic landfill fractions",
                &self.plastic_landfill,
                defaults.map(|d| &d.plastic_landfill),
                OBSERVED_SUM_TOLERANCE,
            )?,
            reported_recycled: resolve_masses(
                "reported recycled masses",
                &self.reported_recycled,
                defaults.map(|d| &d.reported_recycled),
                false,
            )?,
            imports: resolve_masses(
                "imported plastics",
                &self.imports,
                defaults.map(|d| &d.imports),
                true,
            )?,
            exports: resolve_masses(
                "exported plastics",
                &self.exports,
                defaults.map(|d| &d.exports),
                true,
            )?,
            re_exports: resolve_masses(
                "re-exported plastics",
                &self.re_exports,
                defaults.map(|d| &d.re_exports),
                true,
            )?,
            conditions,
        })
    }
}

/// A scenario with defaults applied and every group verified; the input to
/// the calculation proper.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedScenario {
    pub year: String,
    pub conditions: ResolvedConditions,
    pub msw_composition: BTreeMap<WasteType, f64>,
    pub msw_recycling: ResolvedBreakdown<WasteType>,
    pub msw_incineration: ResolvedBreakdown<WasteType>,
    pub msw_landfill: ResolvedBreakdown<WasteType>,
    pub msw_compost: ResolvedBreakdown<WasteType>,
    pub plastic_recycling: BTreeMap<Resin, f64>,
    pub plastic_incineration: BTreeMap<Resin, f64>,
    pub plastic_landfill: BTreeMap<Resin, f64>,
    pub reported_recycled: BTreeMap<Resin, f64>,
    pub imports: BTreeMap<IntlPlastic, f64>,
    pub exports: BTreeMap<IntlPlastic, f64>,
    pub re_exports: BTreeMap<IntlPlastic, f64>,
}

/// Verify a share group, falling back to the year defaults for keys the user
/// left unspecified.  Declared values are never rescaled.
fn resolve_shares<K: Category>(
    group: &'static str,
    declared: &BTreeMap<K, f64>,
    defaults: Option<&BTreeMap<K, f64>>,
    tolerance: f64,
) -> Result<BTreeMap<K, f64>> {
    for (k, v) in declared {
        if !(0.0..=1.0).contains(v) {
            return Err(domain_range(k.name(), *v, "[0, 1]"));
        }
    }

    if !declared.is_empty() && fractions::check_sum(group, declared, 1.0, tolerance).is_ok() {
        return Ok(pad_zero(declared.clone()));
    }

    let mut merged = declared.clone();
    if let Some(defaults) = defaults {
        for k in K::ALL {
            if !merged.contains_key(k)
                && let Some(v) = defaults.get(k)
            {
                merged.insert(*k, *v);
            }
        }
    }
    fractions::check_sum(group, &merged, 1.0, tolerance)?;
    Ok(pad_zero(merged))
}

/// Resolve an absolute-mass table.  An empty declared table takes the year
/// defaults wholesale; a non-empty one is used as given (for reported tables
/// a missing key means "not reported", so only `pad` tables fill zeros).
fn resolve_masses<K: Category>(
    name: &'static str,
    declared: &BTreeMap<K, f64>,
    defaults: Option<&BTreeMap<K, f64>>,
    pad: bool,
) -> Result<BTreeMap<K, f64>> {
    for (k, v) in declared {
        if *v < 0.0 {
            return Err(domain_range(&format!("{name}: {}", k.name()), *v, ">= 0"));
        }
    }
    let mut out = if declared.is_empty() {
        defaults.cloned().unwrap_or_default()
    } else {
        declared.clone()
    };
    if pad {
        out = pad_zero(out);
    }
    Ok(out)
}

fn pad_zero<K: Category>(mut map: BTreeMap<K, f64>) -> BTreeMap<K, f64> {
    for k in K::ALL {
        map.entry(*k).or_insert(0.0);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ConstantTable;

    #[test]
    fn empty_scenario_resolves_from_2018_defaults() {
        let constants = ConstantTable::builtin();
        let resolved = ScenarioInput::default().resolve(constants).unwrap();
        assert_eq!(resolved.year, "2018");
        assert_eq!(resolved.conditions.total_msw, 292_360_000.0);
        assert_eq!(resolved.conditions.total_waste, 35_680_000.0);
        assert_eq!(resolved.conditions.total_recyc, 0.084);
        assert_eq!(resolved.msw_composition.len(), WasteType::ALL.len());
        assert_eq!(resolved.plastic_recycling.len(), Resin::ALL.len());
        assert_eq!(resolved.msw_compost.total_mass, 42_600_000.0);
        // export is consistent with the recycling split
        assert!((resolved.conditions.export - 0.045_670_6).abs() < 1e-9);
    }

    #[test]
    fn unknown_year_fails_when_defaults_needed() {
        let constants = ConstantTable::builtin();
        let err = ScenarioInput::from_year("1994")
            .resolve(constants)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownDefaultYear);
    }

    #[test]
    fn out_of_range_fraction_is_domain_range() {
        let constants = ConstantTable::builtin();
        let mut scenario = ScenarioInput::default();
        scenario.conditions.landfilled = Some(1.2);
        let err = scenario.resolve(constants).unwrap_err();
        assert_eq!(err.code, ErrorCode::DomainRange);
    }

    #[test]
    fn declared_export_must_match_recycling_split() {
        let constants = ConstantTable::builtin();
        let mut scenario = ScenarioInput::default();
        scenario.conditions.total_recyc = Some(0.3);
        scenario.conditions.domestic_recyc = Some(0.8);
        scenario.conditions.export = Some(0.1); // 0.3 * 0.2 = 0.06
        scenario.conditions.incinerated = Some(0.2);
        scenario.conditions.landfilled = Some(0.5);
        let err = scenario.resolve(constants).unwrap_err();
        assert_eq!(err.code, ErrorCode::InconsistentFractions);
    }

    #[test]
    fn disposition_fractions_must_partition() {
        let constants = ConstantTable::builtin();
        let mut scenario = ScenarioInput::default();
        scenario.conditions.total_recyc = Some(0.3);
        scenario.conditions.incinerated = Some(0.2);
        scenario.conditions.landfilled = Some(0.2);
        let err = scenario.resolve(constants).unwrap_err();
        assert_eq!(err.code, ErrorCode::InconsistentFractions);
        assert!(err.get_details().unwrap().contains("disposition fractions"));
    }

    #[test]
    fn partial_share_group_falls_back_then_fails() {
        let constants = ConstantTable::builtin();
        let mut scenario = ScenarioInput::default();
        scenario.plastic_recycling.insert(Resin::Pet, 0.3);
        scenario.plastic_recycling.insert(Resin::Hdpe, 0.3);
        let err = scenario.resolve(constants).unwrap_err();
        assert_eq!(err.code, ErrorCode::InconsistentFractions);
        assert!(err.get_details().unwrap().contains("plastic recycling fractions"));
    }

    #[test]
    fn partial_share_group_summing_to_one_is_accepted() {
        let constants = ConstantTable::builtin();
        let mut scenario = ScenarioInput::default();
        scenario.plastic_recycling.insert(Resin::Pet, 0.4);
        scenario.plastic_recycling.insert(Resin::Hdpe, 0.6);
        let resolved = scenario.resolve(constants).unwrap();
        assert_eq!(resolved.plastic_recycling[&Resin::Pet], 0.4);
        assert_eq!(resolved.plastic_recycling[&Resin::Pvc], 0.0);
    }

    #[test]
    fn scenario_json_round_trips() {
        let mut scenario = ScenarioInput::from_year("2018");
        scenario.conditions.total_waste = Some(1000.0);
        scenario.reported_recycled.insert(Resin::Pet, 980_000.0);
        let json = serde_json::to_string(&scenario).unwrap();
        let back: ScenarioInput = serde_json::from_str(&json).unwrap();
        assert_eq!(scenario, back);
    }
}
