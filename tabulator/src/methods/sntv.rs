// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Single Non-Transferable Vote: only the first active ranking on each ballot
//! counts, and the top `vacancies` candidates by that count win - no transfers.

use std::collections::HashSet;
use rand::RngCore;
use crate::ballot_collection::BallotCollection;
use crate::candidate::CandidateRoster;
use crate::config::TabulatorConfig;
use crate::fixed_point::FixedPoint;
use crate::methods::approval::elect_top_n;
use crate::tie_resolution::TieBreakChannel;
use crate::transcript::Transcript;

pub fn run(roster: &CandidateRoster, ballots: &BallotCollection, config: &TabulatorConfig, rng: &mut impl RngCore, tie_channel: Option<&TieBreakChannel>) -> Transcript<FixedPoint> {
    let scale = config.scale;
    let n = roster.len().0;
    let all: HashSet<_> = crate::methods::all_candidates(roster).into_iter().collect();
    let mut tallies = vec![scale.zero(); n];
    for slot in ballots.weighted_view() {
        if let Some(c) = slot.ballot.top_choice(&all) {
            tallies[c.0] += scale.from_usize(slot.weight.0);
        }
    }
    elect_top_n(roster, config, scale, tallies, "SNTV", rng, tie_channel)
}
