// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Ties a candidate roster, a cleaned ballot collection and the configuration
//! surface together into the one value a tabulator needs to run.

use serde::{Deserialize, Serialize};
use crate::ballot_collection::{BallotCollection, CleaningOptions};
use crate::candidate::CandidateRoster;
use crate::config::TabulatorConfig;
use crate::error::{Result, TabulationError};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectionData {
    pub roster: CandidateRoster,
    pub ballots: BallotCollection,
    /// formal-but-uncounted ballots rejected before this crate ever saw them
    /// (e.g. blank papers) - kept only for the summary, never tabulated.
    #[serde(default)]
    pub informal: usize,
}

impl ElectionData {
    pub fn new(roster: CandidateRoster, ballots: BallotCollection) -> Self {
        ElectionData { roster, ballots, informal: 0 }
    }

    pub fn print_summary(&self) {
        println!("{} candidates, {} formal ballots ({} distinct), {} informal",
            self.roster.len(), self.ballots.total_ballots(), self.ballots.num_unique(), self.informal);
    }

    /// run the ballot-cleaning pipeline, validating the configuration against
    /// the (post-withdrawal) candidate count first.
    pub fn clean(&self, config: &TabulatorConfig, options: CleaningOptions) -> Result<(CandidateRoster, BallotCollection)> {
        let (compacted, _) = self.roster.compact_removing_withdrawn();
        config.validate(compacted.len())?;
        if compacted.is_empty() {
            return Err(TabulationError::configuration("no candidates remain after removing withdrawals"));
        }
        let cleaned = self.ballots.clean(&self.roster, options);
        Ok((compacted, cleaned))
    }
}
