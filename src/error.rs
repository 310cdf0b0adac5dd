use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::speciation::dispatch::Parameter;

#[derive(Error, Debug)]
pub enum AppError {
    #[cfg(feature = "cli")]
    #[error("Error reading from stdin: {source}")]
    ReadStdin {
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Error reading file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON for --inputs-json: {source}")]
    ParseInputsJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON for --assumptions-json: {source}")]
    ParseAssumptionsJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON in input document: {source}")]
    ParseCmdInputJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Could not serialize output to JSON: {source}")]
    SerializeOutput {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Missing input data: provide --input or --inputs-json")]
    MissingInputData,

    #[error("Underdetermined system: two carbonate parameters are required, got [{}]", join(.supplied))]
    UnderdeterminedSystem { supplied: Vec<Parameter> },

    #[error("Overdetermined or ambiguous parameter set [{}]: {reason}", join(.supplied))]
    OverdeterminedOrAmbiguous {
        supplied: Vec<Parameter>,
        reason: &'static str,
    },

    #[error("Overdetermined isotope inputs [{}]: supply at most one of ABT, ABO3, ABO4, dBT, dBO3, dBO4", .supplied.join(", "))]
    OverdeterminedIsotopes { supplied: Vec<&'static str> },

    #[error("Parameter '{name}' has length {len}, expected 1 or {expected}")]
    ShapeMismatch {
        name: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("Parameter '{name}' is an empty array")]
    EmptySeries { name: &'static str },
}

fn join(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-row failure. Rows carrying a fault hold `NaN` in every derived field;
/// the rest of the batch is unaffected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementFault {
    NonConvergence,
    InvalidDomainValue,
}
