// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

use thiserror::Error;

/// The three synchronous error kinds a tabulation can raise. Tie-break
/// cancellation is not among them - it is not an error, it falls back to
/// `StrongTieMode::Random` (see `tie_resolution`).
#[derive(Error, Debug)]
pub enum TabulationError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("ballot data error: {0}")]
    BallotData(String),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl TabulationError {
    pub fn configuration(message: impl Into<String>) -> Self { TabulationError::Configuration(message.into()) }
    pub fn ballot_data(message: impl Into<String>) -> Self { TabulationError::BallotData(message.into()) }
}

pub type Result<T> = std::result::Result<T, TabulationError>;
