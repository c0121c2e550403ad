// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Approval voting: every ranking on a ballot contributes the ballot's full
//! weight to its named candidate (an approval ballot has no ranking order, so
//! `Ranking::Single` after cleaning is read as "approved", not "first choice").

use rand::RngCore;
use crate::ballot::Ranking;
use crate::ballot_collection::BallotCollection;
use crate::candidate::{CandidateIndex, CandidateRoster};
use crate::config::TabulatorConfig;
use crate::fixed_point::{FixedPoint, Scale};
use crate::tie_resolution::{resolve_strong, TieBreakChannel};
use crate::transcript::{Action, CandidateElected, ElectionReason, EndCountStatus, PerCandidate, RoundRecord, Transcript};

pub fn run(roster: &CandidateRoster, ballots: &BallotCollection, config: &TabulatorConfig, rng: &mut impl RngCore, tie_channel: Option<&TieBreakChannel>) -> Transcript<FixedPoint> {
    let scale = config.scale;
    let n = roster.len().0;
    let mut tallies = vec![scale.zero(); n];
    for slot in ballots.weighted_view() {
        let weight = scale.from_usize(slot.weight.0);
        for ranking in &slot.ballot.rankings {
            if let Ranking::Single(c) = ranking {
                tallies[c.0] += weight;
            }
        }
    }
    elect_top_n(roster, config, scale, tallies, "Approval", rng, tie_channel)
}

/// Shared by Approval and SNTV: the top `vacancies` candidates by tally win,
/// decided in one round with no transfers. Candidates tied at the boundary
/// of the last seat are resolved by the strong tie-break protocol rather
/// than by whatever order `sort_by` happens to leave them in.
pub(crate) fn elect_top_n(
    roster: &CandidateRoster,
    config: &TabulatorConfig,
    scale: Scale,
    tallies: Vec<FixedPoint>,
    method_name: &str,
    rng: &mut impl RngCore,
    tie_channel: Option<&TieBreakChannel>,
) -> Transcript<FixedPoint> {
    let mut order: Vec<usize> = (0..tallies.len()).collect();
    order.sort_by(|&a, &b| tallies[b].cmp(&tallies[a]));
    let seats = config.vacancies.0.min(order.len());

    let mut winners: Vec<CandidateIndex> = Vec::new();
    let mut idx = 0;
    while winners.len() < seats && idx < order.len() {
        let tally = tallies[order[idx]];
        let mut group: Vec<CandidateIndex> = vec![CandidateIndex(order[idx])];
        idx += 1;
        while idx < order.len() && tallies[order[idx]] == tally {
            group.push(CandidateIndex(order[idx]));
            idx += 1;
        }
        let remaining = seats - winners.len();
        if group.len() <= remaining {
            winners.extend(group);
        } else {
            let mut tied = group;
            for _ in 0..remaining {
                let who = resolve_strong(&tied, config.strong_tie_mode, roster, rng, tie_channel, &format!("{} tie for final seat", method_name));
                winners.push(who);
                tied.retain(|&c| c != who);
            }
        }
    }

    let mut elected = Vec::new();
    let mut narrative = Vec::new();
    for who in winners {
        elected.push(CandidateElected { who, why: ElectionReason::ReachedThreshold });
        narrative.push(format!("{} elected with {} votes", roster.name(who), tallies[who.0]));
    }
    let status = EndCountStatus {
        tallies: PerCandidate { candidate: tallies, exhausted: scale.zero(), rounding: Default::default(), set_aside: None },
        papers: PerCandidate::from_num_candidates(roster.len().0, crate::ballot_collection::BallotPaperCount(0)),
        keep_factor: None,
    };
    let round = RoundRecord {
        action: Action::FirstPreferences,
        elected: elected.clone(),
        not_continuing: vec![],
        created_transfer_value: None,
        decisions: vec![],
        status,
        narrative,
        count_name: None,
    };
    Transcript {
        method_name: method_name.to_string(),
        threshold: None,
        rounds: vec![round],
        elected: elected.into_iter().map(|e| e.who).collect(),
    }
}
