// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of a fixed category set (waste types, resins, and so on).
///
/// `ALL` is the canonical ordering used everywhere results are emitted, so
/// two runs over the same input produce records in the same order.
pub trait Category: Copy + Clone + Eq + Ord + std::hash::Hash + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn name(&self) -> &'static str;
}

/// The ten municipal solid waste types tracked by the national statistics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WasteType {
    #[serde(rename = "Misc. Inorganic Waste")]
    Inorganic,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Yard Trimmings")]
    YardTrimmings,
    #[serde(rename = "Food")]
    Food,
    #[serde(rename = "Rubber, Leather and Textiles")]
    RubberLeatherTextiles,
    #[serde(rename = "Wood")]
    Wood,
    #[serde(rename = "Metals")]
    Metals,
    #[serde(rename = "Glass")]
    Glass,
    #[serde(rename = "Paper and Paperboard")]
    Paper,
    #[serde(rename = "Plastics")]
    Plastics,
}

impl Category for WasteType {
    const ALL: &'static [WasteType] = &[
        WasteType::Inorganic,
        WasteType::Other,
        WasteType::YardTrimmings,
        WasteType::Food,
        WasteType::RubberLeatherTextiles,
        WasteType::Wood,
        WasteType::Metals,
        WasteType::Glass,
        WasteType::Paper,
        WasteType::Plastics,
    ];

    fn name(&self) -> &'static str {
        match self {
            WasteType::Inorganic => "Misc. Inorganic Waste",
            WasteType::Other => "Other",
            WasteType::YardTrimmings => "Yard Trimmings",
            WasteType::Food => "Food",
            WasteType::RubberLeatherTextiles => "Rubber, Leather and Textiles",
            WasteType::Wood => "Wood",
            WasteType::Metals => "Metals",
            WasteType::Glass => "Glass",
            WasteType::Paper => "Paper and Paperboard",
            WasteType::Plastics => "Plastics",
        }
    }
}

impl fmt::Display for WasteType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The eight resin categories used for domestic plastic flows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resin {
    #[serde(rename = "PET")]
    Pet,
    #[serde(rename = "HDPE")]
    Hdpe,
    #[serde(rename = "PVC")]
    Pvc,
    #[serde(rename = "LDPE")]
    Ldpe,
    #[serde(rename = "PLA")]
    Pla,
    #[serde(rename = "PP")]
    Pp,
    #[serde(rename = "PS")]
    Ps,
    #[serde(rename = "Other Resin")]
    OtherResin,
}

impl Category for Resin {
    const ALL: &'static [Resin] = &[
        Resin::Pet,
        Resin::Hdpe,
        Resin::Pvc,
        Resin::Ldpe,
        Resin::Pla,
        Resin::Pp,
        Resin::Ps,
        Resin::OtherResin,
    ];

    fn name(&self) -> &'static str {
        match self {
            Resin::Pet => "PET",
            Resin::Hdpe => "HDPE",
            Resin::Pvc => "PVC",
            Resin::Ldpe => "LDPE",
            Resin::Pla => "PLA",
            Resin::Pp => "PP",
            Resin::Ps => "PS",
            Resin::OtherResin => "Other Resin",
        }
    }
}

impl fmt::Display for Resin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Plastic categories used in international trade reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntlPlastic {
    #[serde(rename = "Ethylene")]
    Ethylene,
    #[serde(rename = "Vinyl Chloride")]
    VinylChloride,
    #[serde(rename = "Styrene")]
    Styrene,
    #[serde(rename = "Other")]
    Other,
}

impl Category for IntlPlastic {
    const ALL: &'static [IntlPlastic] = &[
        IntlPlastic::Ethylene,
        IntlPlastic::VinylChloride,
        IntlPlastic::Styrene,
        IntlPlastic::Other,
    ];

    fn name(&self) -> &'static str {
        match self {
            IntlPlastic::Ethylene => "Ethylene",
            IntlPlastic::VinylChloride => "Vinyl Chloride",
            IntlPlastic::Styrene => "Styrene",
            IntlPlastic::Other => "Other",
        }
    }
}

impl fmt::Display for IntlPlastic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Chemical additive types with assumed bulk mass proportion bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Additive {
    Plasticizer,
    #[serde(rename = "Flame Retardant")]
    FlameRetardant,
    #[serde(rename = "UV Stabilizer")]
    UvStabilizer,
    #[serde(rename = "Heat Stabilizer")]
    HeatStabilizer,
    Antioxidant,
    #[serde(rename = "Slip Agent")]
    SlipAgent,
    Lubricant,
    Antistatic,
    #[serde(rename = "Curing Agent")]
    CuringAgent,
    #[serde(rename = "Blowing Agent")]
    BlowingAgent,
    Biocide,
    Colorant,
    #[serde(rename = "Organic Pigment")]
    OrganicPigment,
    #[serde(rename = "Clarifier/Toner")]
    ClarifierToner,
    #[serde(rename = "Inorganic Pigment")]
    InorganicPigment,
    Filler,
    Reinforcement,
}

impl Category for Additive {
    const ALL: &'static [Additive] = &[
        Additive::Plasticizer,
        Additive::FlameRetardant,
        Additive::UvStabilizer,
        Additive::HeatStabilizer,
        Additive::Antioxidant,
        Additive::SlipAgent,
        Additive::Lubricant,
        Additive::Antistatic,
        Additive::CuringAgent,
        Additive::BlowingAgent,
        Additive::Biocide,
        Additive::Colorant,
        Additive::OrganicPigment,
        Additive::ClarifierToner,
        Additive::InorganicPigment,
        Additive::Filler,
        Additive::Reinforcement,
    ];

    fn name(&self) -> &'static str {
        match self {
            Additive::Plasticizer => "Plasticizer",
            Additive::FlameRetardant => "Flame Retardant",
            Additive::UvStabilizer => "UV Stabilizer",
            Additive::HeatStabilizer => "Heat Stabilizer",
            Additive::Antioxidant => "Antioxidant",
            Additive::SlipAgent => "Slip Agent",
            Additive::Lubricant => "Lubricant",
            Additive::Antistatic => "Antistatic",
            Additive::CuringAgent => "Curing Agent",
            Additive::BlowingAgent => "Blowing Agent",
            Additive::Biocide => "Biocide",
            Additive::Colorant => "Colorant",
            Additive::OrganicPigment => "Organic Pigment",
            Additive::ClarifierToner => "Clarifier/Toner",
            Additive::InorganicPigment => "Inorganic Pigment",
            Additive::Filler => "Filler",
            Additive::Reinforcement => "Reinforcement",
        }
    }
}

impl fmt::Display for Additive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Life-cycle inventory roll-up buckets: the eight resins plus chemical
/// additives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InventoryCategory {
    #[serde(rename = "PET")]
    Pet,
    #[serde(rename = "HDPE")]
    Hdpe,
    #[serde(rename = "PVC")]
    Pvc,
    #[serde(rename = "LDPE")]
    Ldpe,
    #[serde(rename = "PLA")]
    Pla,
    #[serde(rename = "PP")]
    Pp,
    #[serde(rename = "PS")]
    Ps,
    #[serde(rename = "Other Resin")]
    OtherResin,
    #[serde(rename = "Chemical Additives")]
    ChemicalAdditives,
}

impl Category for InventoryCategory {
    const ALL: &'static [InventoryCategory] = &[
        InventoryCategory::Pet,
        InventoryCategory::Hdpe,
        InventoryCategory::Pvc,
        InventoryCategory::Ldpe,
        InventoryCategory::Pla,
        InventoryCategory::Pp,
        InventoryCategory::Ps,
        InventoryCategory::OtherResin,
        InventoryCategory::ChemicalAdditives,
    ];

    fn name(&self) -> &'static str {
        match self {
            InventoryCategory::Pet => "PET",
            InventoryCategory::Hdpe => "HDPE",
            InventoryCategory::Pvc => "PVC",
            InventoryCategory::Ldpe => "LDPE",
            InventoryCategory::Pla => "PLA",
            InventoryCategory::Pp => "PP",
            InventoryCategory::Ps => "PS",
            InventoryCategory::OtherResin => "Other Resin",
            InventoryCategory::ChemicalAdditives => "Chemical Additives",
        }
    }
}

impl From<Resin> for InventoryCategory {
    fn from(resin: Resin) -> Self {
        match resin {
            Resin::Pet => InventoryCategory::Pet,
            Resin::Hdpe => InventoryCategory::Hdpe,
            Resin::Pvc => InventoryCategory::Pvc,
            Resin::Ldpe => InventoryCategory::Ldpe,
            Resin::Pla => InventoryCategory::Pla,
            Resin::Pp => InventoryCategory::Pp,
            Resin::Ps => InventoryCategory::Ps,
            Resin::OtherResin => InventoryCategory::OtherResin,
        }
    }
}

impl fmt::Display for InventoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Output stages of the calculator, persisted as `(stream, key, value)`
/// records downstream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stream {
    MonomerRawMaterials,
    MswComposition,
    MswRecycling,
    MswIncineration,
    MswLandfill,
    MswCompost,
    PlasticsRecycling,
    PlasticsIncineration,
    PlasticsLandfill,
    IncinerationEmissions,
    RecyclateYield,
    PlasticsImport,
    PlasticsExport,
    PlasticsReExport,
}

impl Stream {
    pub const ALL: &'static [Stream] = &[
        Stream::MonomerRawMaterials,
        Stream::MswComposition,
        Stream::MswRecycling,
        Stream::MswIncineration,
        Stream::MswLandfill,
        Stream::MswCompost,
        Stream::PlasticsRecycling,
        Stream::PlasticsIncineration,
        Stream::PlasticsLandfill,
        Stream::IncinerationEmissions,
        Stream::RecyclateYield,
        Stream::PlasticsImport,
        Stream::PlasticsExport,
        Stream::PlasticsReExport,
    ];

    pub fn id(&self) -> u8 {
        match self {
            Stream::MonomerRawMaterials => 1,
            Stream::MswComposition => 2,
            Stream::MswRecycling => 3,
            Stream::MswIncineration => 4,
            Stream::MswLandfill => 5,
            Stream::MswCompost => 6,
            Stream::PlasticsRecycling => 7,
            Stream::PlasticsIncineration => 8,
            Stream::PlasticsLandfill => 9,
            Stream::IncinerationEmissions => 10,
            Stream::RecyclateYield => 11,
            Stream::PlasticsImport => 12,
            Stream::PlasticsExport => 13,
            Stream::PlasticsReExport => 14,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stream::MonomerRawMaterials => "Monomer/Raw Materials",
            Stream::MswComposition => "MSW Composition",
            Stream::MswRecycling => "MSW Recycling",
            Stream::MswIncineration => "MSW Incineration",
            Stream::MswLandfill => "MSW Landfill",
            Stream::MswCompost => "MSW Compost",
            Stream::PlasticsRecycling => "Plastics Recycling",
            Stream::PlasticsIncineration => "Plastics Incineration",
            Stream::PlasticsLandfill => "Plastics Landfill",
            Stream::IncinerationEmissions => "Incineration Emissions",
            Stream::RecyclateYield => "Recyclate Yield",
            Stream::PlasticsImport => "Plastics Import",
            Stream::PlasticsExport => "Plastics Export",
            Stream::PlasticsReExport => "Plastics Re-Export",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_orderings_match_declaration_order() {
        assert_eq!(WasteType::ALL.len(), 10);
        assert_eq!(Resin::ALL.len(), 8);
        assert_eq!(IntlPlastic::ALL.len(), 4);
        assert_eq!(Additive::ALL.len(), 17);
        assert_eq!(InventoryCategory::ALL.len(), 9);

        let mut sorted = Resin::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted.as_slice(), Resin::ALL);
    }

    #[test]
    fn stream_ids_are_dense_and_start_at_one() {
        for (i, stream) in Stream::ALL.iter().enumerate() {
            assert_eq!(stream.id() as usize, i + 1);
        }
    }

    #[test]
    fn serde_names_round_trip() {
        let json = serde_json::to_string(&WasteType::RubberLeatherTextiles).unwrap();
        assert_eq!(json, "\"Rubber, Leather and Textiles\"");
        let back: WasteType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WasteType::RubberLeatherTextiles);

        assert_eq!(serde_json::to_string(&Resin::OtherResin).unwrap(), "\"Other Resin\"");
    }

    #[test]
    fn inventory_category_covers_every_resin() {
        for resin in Resin::ALL {
            let category: InventoryCategory = (*resin).into();
            assert_eq!(category.name(), resin.name());
        }
    }
}
