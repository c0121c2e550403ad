// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! The configuration surface: everything about a count that is data, not code.
//! Grouped into one `serde`-serializable record per tabulator, the way the
//! upstream rules keep algorithm (a trait impl) and configuration (an election's
//! metadata) separate.

use serde::{Deserialize, Serialize};
use crate::candidate::NumberOfCandidates;
use crate::error::{Result, TabulationError};
use crate::fixed_point::Scale;
use crate::tie_resolution::{PredeclaredTieResolutions, StrongTieMode, WeakTieMode};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum StopCondition {
    /// stop as soon as there are enough declared winners.
    KnownWinners,
    /// stop when only one more continuing candidate than seats remain.
    NPlusOne,
    /// stop when exactly as many continuing candidates as seats remain.
    N,
    /// stop when no continuing candidates remain.
    ContinuingEmpty,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TabulatorConfig {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<String>,
    pub vacancies: NumberOfCandidates,
    pub scale: Scale,
    pub strong_tie_mode: StrongTieMode,
    pub weak_tie_mode: WeakTieMode,
    #[serde(default)]
    pub predeclared_ties: PredeclaredTieResolutions,
    #[serde(default)]
    pub stop_conditions: Vec<StopCondition>,
}

impl TabulatorConfig {
    pub fn new(title: impl Into<String>, vacancies: NumberOfCandidates, scale: Scale) -> Self {
        TabulatorConfig {
            title: title.into(),
            date: None,
            vacancies,
            scale,
            strong_tie_mode: StrongTieMode::Random,
            weak_tie_mode: WeakTieMode::Backward,
            predeclared_ties: PredeclaredTieResolutions::default(),
            stop_conditions: vec![StopCondition::ContinuingEmpty, StopCondition::KnownWinners],
        }
    }

    /// `preCount` validation: reject configurations that cannot produce a count.
    pub fn validate(&self, num_candidates: NumberOfCandidates) -> Result<()> {
        if num_candidates.0 < 2 {
            return Err(TabulationError::configuration("at least two candidates are required"));
        }
        if self.vacancies.0 == 0 {
            return Err(TabulationError::configuration("at least one seat is required"));
        }
        if self.vacancies.0 >= num_candidates.0 {
            return Err(TabulationError::configuration("number of seats must be less than number of candidates"));
        }
        Ok(())
    }
}
