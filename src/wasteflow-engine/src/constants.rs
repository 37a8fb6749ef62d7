// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use smallvec::{SmallVec, smallvec};

use crate::categories::{Additive, Category, IntlPlastic, Resin, WasteType};
use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::fractions::{self, OBSERVED_SUM_TOLERANCE, SUM_TOLERANCE};
use crate::scenario::{ResolvedBreakdown, ResolvedConditions};

pub const DEFAULT_YEAR: &str = "2018";

/// Assumed physical and behavioral ratios used across the calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct Assumptions {
    /// Share of total plastic waste lost to littering.
    pub littering_fraction: f64,
    /// Share of landfilled plastic that leaks after landfill.
    pub landfill_leak_fraction: f64,
    /// Plastic content of the compost stream.
    pub compost_plastic_content: f64,
    /// Total compost stream mass multiplier.
    pub compost_stream_multiplier: f64,
    /// Assumed total mass of plastic in the compost stream (tons); a sanity
    /// ceiling, never a clamp.
    pub compost_plastic_ceiling: f64,
    /// Share of additive mass that migrates out of a resin over its
    /// lifecycle.
    pub additive_migration_fraction: f64,
    /// Share of incinerated plastic destroyed (converted); the remainder is
    /// residual emissions.
    pub incineration_efficiency: f64,
    /// Relative disagreement between a fraction-derived and a reported mass
    /// beyond which reconciliation warns.
    pub reconcile_tolerance: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Assumptions {
            littering_fraction: 0.02,
            landfill_leak_fraction: 0.1,
            compost_plastic_content: 0.01,
            compost_stream_multiplier: 1.01,
            compost_plastic_ceiling: 426_000.0,
            additive_migration_fraction: 0.02,
            incineration_efficiency: 0.9999,
            reconcile_tolerance: crate::resins::RECONCILE_TOLERANCE,
        }
    }
}

/// Observed national dataset for one year, used wherever a scenario leaves a
/// field unspecified.
#[derive(Clone, Debug, PartialEq)]
pub struct YearDefaults {
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

/// Process-wide read-only reference data: assumed ratios, additive fraction
/// bounds, resin densities and the year-keyed default datasets.
///
/// Constructed (and validated) once; [`ConstantTable::builtin`] is the
/// shared instance backed by the 2018 national statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantTable {
    pub assumed: Assumptions,
    /// Low-bound bulk mass proportion per additive type.  The low table is
    /// authoritative; a high-bound variant is a future extension.
    pub additive_fractions: BTreeMap<Additive, f64>,
    /// Densities of domestic plastics, as recorded in the source dataset.
    pub resin_densities: BTreeMap<Resin, f64>,
    defaults: BTreeMap<String, YearDefaults>,
}

lazy_static! {
    static ref BUILTIN: ConstantTable =
        ConstantTable::with_defaults().expect("built-in constant table validates");
}

impl ConstantTable {
    /// The shared built-in table; cheap to access from any thread.
    pub fn builtin() -> &'static ConstantTable {
        &BUILTIN
    }

    /// Build the built-in table, validating every year dataset.
    pub fn with_defaults() -> Result<ConstantTable> {
        let mut defaults = BTreeMap::new();
        defaults.insert(DEFAULT_YEAR.to_string(), year_2018());

        ConstantTable::new(
            Assumptions::default(),
            table(
                Additive::ALL,
                &[
                    0.1,     // Plasticizer
                    0.007,   // Flame Retardant
                    0.005,   // UV Stabilizer
                    0.005,   // Heat Stabilizer
                    0.005,   // Antioxidant
                    0.001,   // Slip Agent
                    0.001,   // Lubricant
                    0.001,   // Antistatic
                    0.001,   // Curing Agent
                    0.005,   // Blowing Agent
                    0.00001, // Biocide
                    0.0025,  // Colorant
                    0.00001, // Organic Pigment
                    0.00015, // Clarifier/Toner
                    0.0001,  // Inorganic Pigment
                    0.00001, // Filler
                    0.15,    // Reinforcement
                ],
            ),
            table(
                Resin::ALL,
                &[1.365, 952.5, 1.455, 0.925, 1.26, 905.0, 1.055, 1.29],
            ),
            defaults,
        )
    }

    pub fn new(
        assumed: Assumptions,
        additive_fractions: BTreeMap<Additive, f64>,
        resin_densities: BTreeMap<Resin, f64>,
        defaults: BTreeMap<String, YearDefaults>,
    ) -> Result<ConstantTable> {
        let constants = ConstantTable {
            assumed,
            additive_fractions,
            resin_densities,
            defaults,
        };
        constants.validate()?;
        Ok(constants)
    }

    fn validate(&self) -> Result<()> {
        for (year, defaults) in &self.defaults {
            validate_year(year, defaults)?;
        }
        Ok(())
    }

    pub fn year_defaults(&self, year: &str) -> Result<&YearDefaults> {
        self.defaults.get(year).ok_or_else(|| {
            Error::new(
                ErrorKind::Constants,
                ErrorCode::UnknownDefaultYear,
                Some(format!("no default dataset for year '{year}'")),
            )
        })
    }

    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.defaults.keys().map(|y| y.as_str())
    }

    pub fn low_additive_fraction(&self, additive: Additive) -> f64 {
        self.additive_fractions
            .get(&additive)
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum of the low-bound additive fractions; the bulk additive content of
    /// a unit of plastic.
    pub fn total_low_additive_fraction(&self) -> f64 {
        self.additive_fractions.values().sum()
    }

    pub fn resin_density(&self, resin: Resin) -> f64 {
        self.resin_densities.get(&resin).copied().unwrap_or(0.0)
    }

    /// Fixed correspondence from international trade categories to domestic
    /// resins.  Polyethylene trade covers both HDPE and LDPE and is split
    /// evenly between them.
    pub fn resin_correspondence(&self, category: IntlPlastic) -> SmallVec<[(Resin, f64); 2]> {
        match category {
            IntlPlastic::Ethylene => smallvec![(Resin::Hdpe, 0.5), (Resin::Ldpe, 0.5)],
            IntlPlastic::VinylChloride => smallvec![(Resin::Pvc, 1.0)],
            IntlPlastic::Styrene => smallvec![(Resin::Ps, 1.0)],
            IntlPlastic::Other => smallvec![(Resin::OtherResin, 1.0)],
        }
    }
}

fn validate_year(year: &str, defaults: &YearDefaults) -> Result<()> {
    let bad = |details: String| {
        Error::new(ErrorKind::Constants, ErrorCode::BadInput, Some(format!("{year}: {details}")))
    };

    defaults.conditions.validate()?;

    let c = &defaults.conditions;
    let partition = c.total_recyc + c.incinerated + c.landfilled;
    if (partition - 1.0).abs() > SUM_TOLERANCE {
        return Err(bad(format!("disposition fractions sum to {partition}")));
    }
    let derived_export = c.total_recyc * (1.0 - c.domestic_recyc);
    if (derived_export - c.export).abs() > SUM_TOLERANCE {
        return Err(bad(format!(
            "export fraction {} disagrees with recycling split {derived_export}",
            c.export
        )));
    }

    // observed tables are rounded; verify under the loose tolerance
    let waste_groups = [
        ("msw_composition", &defaults.msw_composition),
        ("msw_recycling", &defaults.msw_recycling.shares),
        ("msw_incineration", &defaults.msw_incineration.shares),
        ("msw_landfill", &defaults.msw_landfill.shares),
        ("msw_compost", &defaults.msw_compost.shares),
    ];
    for (group, shares) in waste_groups {
        fractions::check_sum(group, shares, 1.0, OBSERVED_SUM_TOLERANCE)
            .map_err(|err| bad(err.to_string()))?;
    }
    let resin_groups = [
        ("plastic_recycling", &defaults.plastic_recycling),
        ("plastic_incineration", &defaults.plastic_incineration),
        ("plastic_landfill", &defaults.plastic_landfill),
    ];
    for (group, shares) in resin_groups {
        fractions::check_sum(group, shares, 1.0, OBSERVED_SUM_TOLERANCE)
            .map_err(|err| bad(err.to_string()))?;
    }

    for breakdown in [
        &defaults.msw_recycling,
        &defaults.msw_incineration,
        &defaults.msw_landfill,
        &defaults.msw_compost,
    ] {
        if breakdown.total_mass < 0.0 {
            return Err(bad(format!("negative stream total {}", breakdown.total_mass)));
        }
    }
    for masses in [&defaults.reported_recycled] {
        if masses.values().any(|v| *v < 0.0) {
            return Err(bad("negative reported mass".to_string()));
        }
    }
    for masses in [&defaults.imports, &defaults.exports, &defaults.re_exports] {
        if masses.values().any(|v| *v < 0.0) {
            return Err(bad("negative trade mass".to_string()));
        }
    }

    Ok(())
}

fn table<K: Category>(keys: &'static [K], values: &[f64]) -> BTreeMap<K, f64> {
    assert_eq!(keys.len(), values.len());
    keys.iter().copied().zip(values.iter().copied()).collect()
}

/// The 2018 observed national dataset.  Derived quantities are kept as the
/// source expressions rather than pre-multiplied literals.
fn year_2018() -> YearDefaults {
    YearDefaults {
        conditions: ResolvedConditions {
            total_msw: 292_360_000.0,
            total_waste: 35_680_000.0,
            total_recyc: 0.084,
            // the source records domestic recycling as a share of total
            // waste (0.084 - 0.0456706); as a share of recycling:
            domestic_recyc: 1.0 - 0.045_670_6 / 0.084,
            export: 0.045_670_6,
            re_export: 0.0002,
            recyc_efficiency: 0.667,
            incinerated: 0.172_271 * (1.0 - 0.084),
            landfilled: 1.0 - 0.084 - 0.172_271 * (1.0 - 0.084),
            waste_facility_emissions: 109_000_000.0,
            landfill_emissions: 630_000_000.0,
        },
        msw_composition: table(
            WasteType::ALL,
            &[
                0.0139, 0.0156, 0.121, 0.2159, 0.0896, 0.0619, 0.0876, 0.0419, 0.2305, 0.122,
            ],
        ),
        msw_recycling: ResolvedBreakdown {
            total_mass: 69_000_000.0,
            shares: table(
                WasteType::ALL,
                &[
                    0.0, 0.014, 0.0, 0.0, 0.0606, 0.0449, 0.1263, 0.0443, 0.666, 0.0438,
                ],
            ),
        },
        msw_incineration: ResolvedBreakdown {
            total_mass: 34_560_000.0,
            shares: table(
                WasteType::ALL,
                &[
                    0.023, 0.019, 0.074, 0.218, 0.166, 0.082, 0.085, 0.047, 0.122, 0.163,
                ],
            ),
        },
        msw_landfill: ResolvedBreakdown {
            total_mass: 146_180_000.0,
            shares: table(
                WasteType::ALL,
                &[
                    0.022, 0.02, 0.072, 0.241, 0.111, 0.083, 0.095, 0.052, 0.118, 0.185,
                ],
            ),
        },
        msw_compost: ResolvedBreakdown {
            total_mass: 42_600_000.0,
            shares: table(
                WasteType::ALL,
                &[0.0, 0.0, 0.523, 0.477, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            ),
        },
        plastic_recycling: table(
            Resin::ALL,
            &[
                0.148179271708683,
                0.176470588235294,
                0.0235294117647059,
                0.240616246498599,
                0.00252100840336134,
                0.228291316526611,
                0.0633053221288515,
                0.116526610644258,
            ],
        ),
        plastic_incineration: table(
            Resin::ALL,
            &[
                0.13410900183711,
                0.175750153092468,
                0.0257195345988977,
                0.251684017146356,
                0.00275566442131047,
                0.248009797917942,
                0.0685854255970606,
                0.0933864053888549,
            ],
        ),
        plastic_landfill: table(
            Resin::ALL,
            &[
                0.13410900183711,
                0.175750153092468,
                0.0257195345988977,
                0.251684017146356,
                0.00275566442131047,
                0.248009797917942,
                0.0685854255970606,
                0.0933864053888549,
            ],
        ),
        reported_recycled: table(
            Resin::ALL,
            &[
                980_000.0, 560_000.0, 0.0, 370_000.0, 0.0, 50_000.0, 20_000.0, 1_110_000.0,
            ],
        ),
        imports: table(IntlPlastic::ALL, &[139_791.0, 36_647.0, 19_841.0, 778_806.0]),
        exports: table(IntlPlastic::ALL, &[920_477.0, 137_493.0, 28_071.0, 543_487.0]),
        re_exports: table(IntlPlastic::ALL, &[7_246.0, 34.0, 27.0, 1_038.0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_validates() {
        let constants = ConstantTable::builtin();
        assert_eq!(constants.years().collect::<Vec<_>>(), vec!["2018"]);
        assert!(constants.year_defaults("2018").is_ok());
    }

    #[test]
    fn unknown_year_is_an_error() {
        let err = ConstantTable::builtin().year_defaults("2017").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownDefaultYear);
    }

    #[test]
    fn additive_fractions_cover_every_type() {
        let constants = ConstantTable::builtin();
        assert_eq!(constants.additive_fractions.len(), Additive::ALL.len());
        assert_eq!(constants.low_additive_fraction(Additive::Plasticizer), 0.1);
        assert_eq!(constants.low_additive_fraction(Additive::Biocide), 0.00001);
        assert!((constants.total_low_additive_fraction() - 0.28378).abs() < 1e-9);
    }

    #[test]
    fn densities_match_source_dataset() {
        let constants = ConstantTable::builtin();
        assert_eq!(constants.resin_density(Resin::Pet), 1.365);
        assert_eq!(constants.resin_density(Resin::Hdpe), 952.5);
        assert_eq!(constants.resin_density(Resin::OtherResin), 1.29);
    }

    #[test]
    fn correspondence_shares_sum_to_one() {
        let constants = ConstantTable::builtin();
        for category in IntlPlastic::ALL {
            let total: f64 = constants
                .resin_correspondence(*category)
                .iter()
                .map(|(_, share)| share)
                .sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn bad_dataset_is_rejected() {
        let mut defaults = BTreeMap::new();
        let mut year = year_2018();
        year.conditions.landfilled = 0.5; // breaks the disposition partition
        defaults.insert("2018".to_string(), year);
        let err = ConstantTable::new(
            Assumptions::default(),
            ConstantTable::builtin().additive_fractions.clone(),
            ConstantTable::builtin().resin_densities.clone(),
            defaults,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Constants);
    }
}
