// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::categories::{Category, InventoryCategory, Stream, WasteType};
use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::dispositions::DispositionTotals;

/// Non-fatal findings surfaced alongside the results; the caller decides
/// what to do with them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Warning {
    /// A fraction-derived mass and a reported absolute mass disagree beyond
    /// tolerance.  The reported value was used; both are surfaced.
    Reconciliation {
        context: &'static str,
        key: &'static str,
        derived: f64,
        reported: f64,
    },
    /// Computed compost plastic exceeds the assumed total mass of plastic in
    /// the compost stream.
    CompostCeiling { computed: f64, ceiling: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::Reconciliation {
                context,
                key,
                derived,
                reported,
            } => write!(
                f,
                "{context}: {key}: derived {derived} vs reported {reported}"
            ),
            Warning::CompostCeiling { computed, ceiling } => write!(
                f,
                "compost plastic {computed} exceeds assumed ceiling {ceiling}"
            ),
        }
    }
}

/// Category key of one result record: a waste type for the MSW streams, an
/// inventory category for the plastics streams.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResultKey {
    Waste(WasteType),
    Inventory(InventoryCategory),
}

impl ResultKey {
    pub fn name(&self) -> &'static str {
        match self {
            ResultKey::Waste(w) => w.name(),
            ResultKey::Inventory(c) => c.name(),
        }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for ResultKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl Serialize for Stream {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

/// One row of calculator output: `(stream, category key, mass in tons)`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultRecord {
    pub stream: Stream,
    pub key: ResultKey,
    pub value: f64,
}

impl ResultRecord {
    pub fn display_value(&self) -> DisplayValue {
        DisplayValue::from_value(self.value)
    }
}

/// Presentation form of a result value.  Sub-threshold masses render as
/// bands; the literal value is always kept on the record itself.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DisplayValue {
    Literal(f64),
    Band(&'static str),
}

impl DisplayValue {
    pub fn from_value(value: f64) -> DisplayValue {
        if value < 0.1 {
            DisplayValue::Band("<0.1")
        } else if value < 0.5 {
            DisplayValue::Band("<0.5")
        } else if value < 1.0 {
            DisplayValue::Band("<1")
        } else {
            DisplayValue::Literal(value)
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DisplayValue::Literal(value) => write!(f, "{value}"),
            DisplayValue::Band(band) => write!(f, "{band}"),
        }
    }
}

/// The complete output of one calculation run, published atomically: the
/// ordered result records, the disposition summary they were derived from,
/// and any non-fatal warnings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalcResults {
    pub records: Vec<ResultRecord>,
    pub dispositions: DispositionTotals,
    pub warnings: Vec<Warning>,
}

impl CalcResults {
    pub fn value(&self, stream: Stream, key: ResultKey) -> Option<f64> {
        self.records
            .iter()
            .find(|r| r.stream == stream && r.key == key)
            .map(|r| r.value)
    }

    pub fn print_tsv(&self) {
        println!("id\tstream\tkey\tvalue\tdisplay");
        for r in &self.records {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                r.stream.id(),
                r.stream.title(),
                r.key,
                r.value,
                r.display_value()
            );
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| {
            Error::new(
                ErrorKind::Calculation,
                ErrorCode::Generic,
                Some(err.to_string()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_bands_at_documented_thresholds() {
        assert_eq!(DisplayValue::from_value(0.099999), DisplayValue::Band("<0.1"));
        assert_eq!(DisplayValue::from_value(0.1), DisplayValue::Band("<0.5"));
        assert_eq!(DisplayValue::from_value(0.4999), DisplayValue::Band("<0.5"));
        assert_eq!(DisplayValue::from_value(0.5), DisplayValue::Band("<1"));
        assert_eq!(DisplayValue::from_value(0.9999), DisplayValue::Band("<1"));
        assert_eq!(DisplayValue::from_value(1.0), DisplayValue::Literal(1.0));
        assert_eq!(DisplayValue::from_value(0.0), DisplayValue::Band("<0.1"));
    }

    #[test]
    fn display_value_formats() {
        assert_eq!(format!("{}", DisplayValue::from_value(0.2)), "<0.5");
        assert_eq!(format!("{}", DisplayValue::from_value(4_624_952.0)), "4624952");
    }

    #[test]
    fn record_keeps_literal_value_under_banding() {
        let record = ResultRecord {
            stream: Stream::MonomerRawMaterials,
            key: ResultKey::Inventory(InventoryCategory::Pet),
            value: 0.25,
        };
        assert_eq!(record.value, 0.25);
        assert_eq!(record.display_value(), DisplayValue::Band("<0.5"));
    }

    #[test]
    fn warning_display_surfaces_both_values() {
        let warning = Warning::Reconciliation {
            context: "recycled plastics",
            key: "PET",
            derived: 1_000_000.0,
            reported: 980_000.0,
        };
        let text = format!("{warning}");
        assert!(text.contains("1000000"));
        assert!(text.contains("980000"));
    }
}
