// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Bucklin, single-winner only: each round adds the next choice of every
//! ballot to its running candidate total; the first candidate to cross half
//! the ballot total wins. If no majority ever appears, the plurality leader
//! after all ranks have been added wins.

use rand::RngCore;
use crate::ballot_collection::BallotCollection;
use crate::candidate::{CandidateIndex, CandidateRoster};
use crate::config::TabulatorConfig;
use crate::fixed_point::FixedPoint;
use crate::tie_resolution::{resolve_strong, TieBreakChannel};
use crate::transcript::{Action, CandidateElected, ElectionReason, EndCountStatus, PerCandidate, RoundRecord, Transcript};

pub fn run(roster: &CandidateRoster, ballots: &BallotCollection, config: &TabulatorConfig, rng: &mut impl RngCore, tie_channel: Option<&TieBreakChannel>) -> Transcript<FixedPoint> {
    let scale = config.scale;
    let n = roster.len().0;
    let max_rank = ballots.weighted_view().iter().map(|s| s.ballot.rankings.len()).max().unwrap_or(0);
    let total_papers = ballots.total_ballots();
    let half = scale.from_usize(total_papers.0).div(&scale.from_usize(2));

    let mut tallies = vec![scale.zero(); n];
    let mut rounds = Vec::new();
    let mut winner = None;

    for round_rank in 0..max_rank {
        for slot in ballots.weighted_view() {
            if let Some(crate::ballot::Ranking::Single(c)) = slot.ballot.rankings.get(round_rank) {
                tallies[c.0] += scale.from_usize(slot.weight.0);
            }
        }
        let leaders: Vec<CandidateIndex> = (0..n).map(CandidateIndex).filter(|c| tallies[c.0].approx_gt(&half)).collect();
        let elected = if !leaders.is_empty() {
            let who = resolve_strong(&leaders, config.strong_tie_mode, roster, rng, tie_channel, "Bucklin: candidates crossing majority this round");
            winner = Some(who);
            vec![CandidateElected { who, why: ElectionReason::ReachedThreshold }]
        } else { vec![] };
        rounds.push(RoundRecord {
            action: Action::FirstPreferences,
            elected: elected.clone(),
            not_continuing: vec![],
            created_transfer_value: None,
            decisions: vec![],
            status: EndCountStatus {
                tallies: PerCandidate { candidate: tallies.clone(), exhausted: scale.zero(), rounding: Default::default(), set_aside: None },
                papers: PerCandidate::from_num_candidates(n, crate::ballot_collection::BallotPaperCount(0)),
                keep_factor: None,
            },
            narrative: vec![format!("added rank {} preferences", round_rank + 1)],
            count_name: None,
        });
        if winner.is_some() { break; }
    }
    let who = match winner {
        Some(w) => w,
        None => {
            let max = (0..n).map(CandidateIndex).max_by(|a, b| tallies[a.0].cmp(&tallies[b.0])).map(|c| tallies[c.0]);
            let leaders: Vec<CandidateIndex> = (0..n).map(CandidateIndex).filter(|c| Some(tallies[c.0]) == max).collect();
            resolve_strong(&leaders, config.strong_tie_mode, roster, rng, tie_channel, "Bucklin: plurality leader, no majority reached")
        }
    };
    if let Some(last) = rounds.last_mut() {
        if last.elected.is_empty() {
            last.elected.push(CandidateElected { who, why: ElectionReason::HighestOfLastTwoStanding });
            last.narrative.push(format!("{} elected as plurality leader, no majority reached", roster.name(who)));
        }
    }
    Transcript { method_name: "Bucklin".to_string(), threshold: None, rounds, elected: vec![who] }
}
