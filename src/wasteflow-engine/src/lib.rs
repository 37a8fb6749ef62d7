// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

pub mod calc;
pub mod categories;
pub mod common;
pub mod constants;
pub mod dispositions;
pub mod fractions;
pub mod inventory;
pub mod resins;
pub mod results;
pub mod scenario;

pub use self::calc::{run, run_many};
pub use self::categories::{
    Additive, Category, IntlPlastic, InventoryCategory, Resin, Stream, WasteType,
};
pub use self::common::{Error, ErrorCode, ErrorKind, InconsistentFractions, Result};
pub use self::constants::{Assumptions, ConstantTable, DEFAULT_YEAR, YearDefaults};
pub use self::dispositions::DispositionTotals;
pub use self::resins::ResinFlows;
pub use self::results::{CalcResults, DisplayValue, ResultKey, ResultRecord, Warning};
pub use self::scenario::{
    Breakdown, Conditions, ResolvedConditions, ResolvedScenario, ScenarioInput,
};
