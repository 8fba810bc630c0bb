// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

/// Everything that can go wrong between a trigger and a rendered result.
///
/// The three kinds are kept apart for logging only; the UI collapses them
/// into [`ConvertError::USER_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// Transport failure, HTTP error status or a body that is not JSON.
    #[error("network error: {0}")]
    Network(String),

    /// Well-formed JSON that does not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The rate table for `base` has no usable entry for `target`.
    #[error("no {target} rate in the {base} rate table")]
    MissingRate { base: String, target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    InvalidResponse,
    MissingRate,
}

impl ConvertError {
    pub const USER_MESSAGE: &'static str = "Failed to get exchange rate. Please try again.";

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Network(_) => ErrorKind::Network,
            ConvertError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ConvertError::MissingRate { .. } => ErrorKind::MissingRate,
        }
    }
}

impl From<reqwest::Error> for ConvertError {
    fn from(err: reqwest::Error) -> Self {
        ConvertError::Network(err.to_string())
    }
}
