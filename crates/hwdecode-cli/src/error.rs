// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::fmt;
use std::process::ExitCode;

/// CLI-specific error type with exit code mapping
#[derive(Debug)]
pub enum CliError {
    /// Invalid command-line arguments or capability file
    InvalidArgs(String),
    /// Platform decode library not loadable or incomplete
    Unavailable(String),
    /// The described hardware cannot decode the stream
    Incompatible(String),
    /// General error from the hwdecode library
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            CliError::Unavailable(msg) => write!(f, "Hardware decode unavailable: {}", msg),
            CliError::Incompatible(msg) => write!(f, "Incompatible: {}", msg),
            CliError::General(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::InvalidArgs(_) => ExitCode::from(2),
            CliError::Unavailable(_) => ExitCode::from(3),
            CliError::Incompatible(_) => ExitCode::from(4),
            CliError::General(_) => ExitCode::from(1),
        }
    }
}

/// Map hwdecode::Error to CliError with appropriate exit codes
impl From<hwdecode::Error> for CliError {
    fn from(err: hwdecode::Error) -> Self {
        use hwdecode::Error;

        match err {
            Error::LibraryNotLoaded(_) | Error::SymbolNotFound(_) => {
                CliError::Unavailable(err.to_string())
            }

            // Negotiation outcomes the hardware description decides
            Error::NoCompatibleProfile
            | Error::HardwareIncompatible(_)
            | Error::NoUsableConfig
            | Error::UnsupportedProfile(_)
            | Error::DimensionsUnknown => CliError::Incompatible(err.to_string()),

            Error::InvalidArgument(msg) => CliError::InvalidArgs(msg.to_string()),

            _ => CliError::General(err.to_string()),
        }
    }
}

/// Helper function to convert result to exit code
pub fn result_to_exit_code<T>(result: Result<T, CliError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}
