// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Borda count, with an optional ballot-completion rule: a ballot that ranks
//! only `k` of the `M` candidates either leaves the remaining Borda mass
//! unallocated (it goes to exhaustion) or splits it equally among the
//! candidates it didn't rank.

use std::collections::HashSet;
use crate::ballot_collection::BallotCollection;
use crate::candidate::CandidateRoster;
use crate::config::TabulatorConfig;
use crate::fixed_point::FixedPoint;
use crate::methods::approval::elect_top_n;
use crate::transcript::Transcript;

pub fn run(roster: &CandidateRoster, ballots: &BallotCollection, config: &TabulatorConfig, ballot_completion: bool) -> Transcript<FixedPoint> {
    let scale = config.scale;
    let m = roster.len().0;
    let all: HashSet<_> = crate::methods::all_candidates(roster).into_iter().collect();
    let mut tallies = vec![scale.zero(); m];
    let mut exhausted = scale.zero();
    for slot in ballots.weighted_view() {
        let ranked = slot.ballot.continuing_order(&all);
        let k = ranked.len();
        for (i, c) in ranked.iter().enumerate() {
            let points = (m - i - 1) * slot.weight.0;
            tallies[c.0] += scale.from_usize(points);
        }
        if k < m {
            // mass left over from positions k..M-1, which would have scored (M-k-1)..0.
            let remaining_total = (m - k - 1) * (m - k) / 2;
            if ballot_completion {
                let per_candidate = scale.from_usize(m - k - 1).div(&scale.from_usize(2));
                let share = per_candidate * slot.weight.0;
                let unranked = all.iter().copied().filter(|c| !ranked.contains(c));
                for c in unranked { tallies[c.0] += share; }
            } else {
                exhausted += scale.from_usize(remaining_total * slot.weight.0);
            }
        }
    }
    let mut transcript = elect_top_n(roster, config, scale, tallies, "Borda");
    transcript.rounds[0].status.tallies.exhausted = exhausted;
    transcript
}
