// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    DomainRange,
    InconsistentFractions,
    DuplicateResult,
    UnknownDefaultYear,
    BadInput,
    Generic,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            DomainRange => "domain_range",
            InconsistentFractions => "inconsistent_fractions",
            DuplicateResult => "duplicate_result",
            UnknownDefaultYear => "unknown_default_year",
            BadInput => "bad_input",
            Generic => "generic",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Constants,
    Calculation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Input => "InputError",
            ErrorKind::Constants => "ConstantsError",
            ErrorKind::Calculation => "CalculationError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// A fraction group that failed its sum check, with enough detail for the
/// caller to decide whether to proceed with the raw values or abort.
#[derive(Clone, Debug, PartialEq)]
pub struct InconsistentFractions {
    pub group: &'static str,
    pub keys: Vec<&'static str>,
    pub sum: f64,
    pub target: f64,
}

impl fmt::Display for InconsistentFractions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "'{}' sums to {} (expected {}; keys: {})",
            self.group,
            self.sum,
            self.target,
            self.keys.join(", ")
        )
    }
}

impl From<InconsistentFractions> for Error {
    fn from(err: InconsistentFractions) -> Self {
        Error::new(
            ErrorKind::Input,
            ErrorCode::InconsistentFractions,
            Some(err.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::new(
            ErrorKind::Input,
            ErrorCode::DomainRange,
            Some("landfilled: 1.2 outside [0, 1]".to_string()),
        );
        assert_eq!(
            format!("{err}"),
            "InputError{domain_range: landfilled: 1.2 outside [0, 1]}"
        );

        let err = Error::new(ErrorKind::Calculation, ErrorCode::DuplicateResult, None);
        assert_eq!(format!("{err}"), "CalculationError{duplicate_result}");
    }

    #[test]
    fn inconsistent_fractions_lowers_to_error() {
        let err = InconsistentFractions {
            group: "plastic recycling fractions",
            keys: vec!["PET", "HDPE"],
            sum: 0.6,
            target: 1.0,
        };
        let err: Error = err.into();
        assert_eq!(err.code, ErrorCode::InconsistentFractions);
        assert!(err.get_details().unwrap().contains("PET"));
    }
}
