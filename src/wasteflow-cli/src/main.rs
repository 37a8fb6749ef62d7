// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs;
use std::result::Result as StdResult;

use pico_args::Arguments;

use wasteflow_engine::{ConstantTable, ScenarioInput, run};

const VERSION: &str = "1.0";
const EXIT_FAILURE: i32 = 1;

#[macro_export]
macro_rules! die(
    ($($arg:tt)*) => { {
        use std;
        eprintln!($($arg)*);
        std::process::exit(EXIT_FAILURE)
    } }
);

fn usage() -> ! {
    let argv0 = std::env::args()
        .next()
        .unwrap_or_else(|| "<wasteflow>".to_string());
    die!(
        concat!(
            "wasteflow {}: Calculate end-of-life mass flows for municipal plastic waste.\n\
         \n\
         USAGE:\n",
            "    {} [SUBCOMMAND] [OPTION...] [PATH]\n",
            "\n\
         OPTIONS:\n",
            "    -h, --help       show this message\n",
            "    --year YEAR      default dataset year for unspecified fields (default 2018)\n",
            "    --json           output results as JSON instead of TSV\n",
            "    --no-output      don't print results (for benchmarking)\n",
            "\n\
         SUBCOMMANDS:\n",
            "    run              Run the calculator for a scenario JSON file (pure defaults if no PATH)\n",
            "    defaults         Print a year's fully-resolved scenario as JSON\n",
        ),
        VERSION,
        argv0
    );
}

#[derive(Clone, Default, Debug)]
struct Args {
    path: Option<String>,
    year: Option<String>,
    is_json: bool,
    is_no_output: bool,
    is_defaults: bool,
}

fn parse_args() -> StdResult<Args, Box<dyn std::error::Error>> {
    let mut parsed = Arguments::from_env();
    if parsed.contains(["-h", "--help"]) {
        usage();
    }

    let subcommand = parsed.subcommand()?;
    if subcommand.is_none() {
        eprintln!("error: subcommand required");
        usage();
    }

    let mut args: Args = Default::default();

    let subcommand = subcommand.unwrap();
    if subcommand == "run" {
    } else if subcommand == "defaults" {
        args.is_defaults = true;
    } else {
        eprintln!("error: unknown subcommand {}", subcommand);
        usage();
    }

    args.year = parsed.value_from_str("--year").ok();
    args.is_json = parsed.contains("--json");
    args.is_no_output = parsed.contains("--no-output");

    let free_arguments = parsed.finish();
    if let Some(path) = free_arguments.first() {
        args.path = Some(path.to_string_lossy().into_owned());
    }

    Ok(args)
}

fn load_scenario(path: &str) -> ScenarioInput {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => die!("error: unable to read {}: {}", path, err),
    };
    match serde_json::from_str(&contents) {
        Ok(scenario) => scenario,
        Err(err) => die!("error: invalid scenario {}: {}", path, err),
    }
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => die!("error: {}", err),
    };

    let constants = ConstantTable::builtin();

    if args.is_defaults {
        let year = args.year.as_deref().unwrap_or(wasteflow_engine::DEFAULT_YEAR);
        let resolved = match ScenarioInput::from_year(year).resolve(constants) {
            Ok(resolved) => resolved,
            Err(err) => die!("error: {}", err),
        };
        match serde_json::to_string_pretty(&resolved) {
            Ok(json) => println!("{}", json),
            Err(err) => die!("error: {}", err),
        }
        return;
    }

    let mut scenario = match &args.path {
        Some(path) => load_scenario(path),
        None => ScenarioInput::default(),
    };
    if let Some(year) = &args.year {
        scenario.year = Some(year.clone());
    }

    let results = match run(&scenario, constants) {
        Ok(results) => results,
        Err(err) => die!("error: {}", err),
    };

    for warning in &results.warnings {
        eprintln!("warning: {}", warning);
    }

    if args.is_no_output {
        return;
    }

    if args.is_json {
        match results.to_json() {
            Ok(json) => println!("{}", json),
            Err(err) => die!("error: {}", err),
        }
    } else {
        results.print_tsv();
    }
}
