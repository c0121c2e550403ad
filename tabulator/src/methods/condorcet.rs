// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Condorcet, single-winner: pairwise matrix, Smith set, and one of three
//! completion methods when the Smith set has more than one member.

use std::collections::HashSet;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use crate::ballot_collection::BallotCollection;
use crate::candidate::{CandidateIndex, CandidateRoster};
use crate::config::TabulatorConfig;
use crate::fixed_point::FixedPoint;
use crate::tie_resolution::{resolve_strong, TieBreakChannel};
use crate::transcript::{Action, CandidateElected, ElectionReason, EndCountStatus, PerCandidate, RoundRecord, Transcript};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CondorcetCompletion {
    SchwartzSequentialDropping,
    IrvOnSmithSet,
    BordaOnSmithSet,
}

/// `P[i][j]` = total weight of ballots ranking `i` strictly above `j`. Ballots
/// that rank neither, or only one of the pair, contribute nothing to that cell.
pub fn pairwise_matrix(roster: &CandidateRoster, ballots: &BallotCollection) -> Vec<Vec<FixedPoint>> {
    let n = roster.len().0;
    let scale = crate::fixed_point::Scale::plain(0);
    let mut p = vec![vec![scale.zero(); n]; n];
    let all: HashSet<_> = crate::methods::all_candidates(roster).into_iter().collect();
    for slot in ballots.weighted_view() {
        let order = slot.ballot.continuing_order(&all);
        let weight = scale.from_usize(slot.weight.0);
        for (pos, &higher) in order.iter().enumerate() {
            for &lower in &order[pos + 1..] {
                p[higher.0][lower.0] += weight;
            }
        }
    }
    p
}

/// the smallest non-empty set such that every member beats every non-member.
/// Found by growing a Copeland-ranked prefix until it is closed under beating.
pub fn smith_set(n: usize, p: &[Vec<FixedPoint>]) -> Vec<CandidateIndex> {
    let beats = |i: usize, j: usize| p[i][j].approx_gt(&p[j][i]);
    let mut by_wins: Vec<usize> = (0..n).collect();
    by_wins.sort_by_key(|&i| std::cmp::Reverse((0..n).filter(|&j| j != i && beats(i, j)).count()));
    for size in 1..=n {
        let prefix = &by_wins[..size];
        let prefix_set: HashSet<usize> = prefix.iter().copied().collect();
        let closed = prefix.iter().all(|&i| (0..n).filter(|j| !prefix_set.contains(j)).all(|&j| beats(i, j)));
        if closed {
            return prefix.iter().map(|&i| CandidateIndex(i)).collect();
        }
    }
    (0..n).map(CandidateIndex).collect()
}

/// Schulze-style strongest-beatpath closure: `d[i][j] = P[i][j]` when `i`
/// strictly beats `j`, else zero; then `d[i][j] = max(d[i][j], min(d[i][k], d[k][j]))`
/// over all intermediate `k`.
fn beatpath_closure(n: usize, p: &[Vec<FixedPoint>]) -> Vec<Vec<FixedPoint>> {
    let scale = crate::fixed_point::Scale::plain(0);
    let mut d = vec![vec![scale.zero(); n]; n];
    for i in 0..n {
        for j in 0..n {
            if i != j && p[i][j].approx_gt(&p[j][i]) { d[i][j] = p[i][j]; }
        }
    }
    for k in 0..n {
        for i in 0..n {
            if i == k { continue; }
            for j in 0..n {
                if j == k || j == i { continue; }
                let via = d[i][k].min(d[k][j]);
                if via.approx_gt(&d[i][j]) { d[i][j] = via; }
            }
        }
    }
    d
}

pub fn run(
    roster: &CandidateRoster,
    ballots: &BallotCollection,
    config: &TabulatorConfig,
    completion: CondorcetCompletion,
    rng: &mut impl RngCore,
    tie_channel: Option<&TieBreakChannel>,
) -> Transcript<FixedPoint> {
    let n = roster.len().0;
    let p = pairwise_matrix(roster, ballots);
    let smith = smith_set(n, &p);

    let who = if smith.len() == 1 {
        smith[0]
    } else {
        match completion {
            CondorcetCompletion::SchwartzSequentialDropping => {
                let d = beatpath_closure(n, &p);
                let schwartz: Vec<CandidateIndex> = smith.iter().copied().filter(|&c| {
                    smith.iter().all(|&other| other == c || !d[other.0][c.0].approx_gt(&d[c.0][other.0]))
                }).collect();
                resolve_strong(&schwartz, config.strong_tie_mode, roster, rng, tie_channel, "Condorcet completion (Schwartz Sequential Dropping)")
            }
            CondorcetCompletion::IrvOnSmithSet => irv_among(roster, ballots, &smith, config, rng, tie_channel),
            CondorcetCompletion::BordaOnSmithSet => borda_among(roster, ballots, &smith, config),
        }
    };

    let scale = crate::fixed_point::Scale::plain(0);
    let round = RoundRecord {
        action: Action::FirstPreferences,
        elected: vec![CandidateElected { who, why: ElectionReason::ReachedThreshold }],
        not_continuing: vec![],
        created_transfer_value: None,
        decisions: vec![],
        status: EndCountStatus {
            tallies: PerCandidate { candidate: p.iter().enumerate().map(|(i, row)| row.iter().enumerate().filter(|&(j, _)| j != i).map(|(_, v)| *v).fold(scale.zero(), |a, b| a + b)).collect(), exhausted: scale.zero(), rounding: Default::default(), set_aside: None },
            papers: PerCandidate::from_num_candidates(n, crate::ballot_collection::BallotPaperCount(0)),
            keep_factor: None,
        },
        narrative: vec![format!("Smith set {{{}}}; winner {}", smith.iter().map(|c| roster.name(*c)).collect::<Vec<_>>().join(","), roster.name(who))],
        count_name: None,
    };
    Transcript { method_name: "Condorcet".to_string(), threshold: None, rounds: vec![round], elected: vec![who] }
}

/// a restricted single-seat IRV used only to complete a Condorcet count over
/// the Smith set; eliminates the lowest first-preference candidate each round
/// until one remains.
fn irv_among(
    roster: &CandidateRoster,
    ballots: &BallotCollection,
    candidates: &[CandidateIndex],
    config: &TabulatorConfig,
    rng: &mut impl RngCore,
    tie_channel: Option<&TieBreakChannel>,
) -> CandidateIndex {
    let scale = crate::fixed_point::Scale::plain(0);
    let mut continuing: HashSet<CandidateIndex> = candidates.iter().copied().collect();
    loop {
        if continuing.len() == 1 { return *continuing.iter().next().unwrap(); }
        let mut tallies = std::collections::HashMap::new();
        for &c in &continuing { tallies.insert(c, scale.zero()); }
        for slot in ballots.weighted_view() {
            if let Some(c) = slot.ballot.top_choice(&continuing) {
                *tallies.get_mut(&c).unwrap() += scale.from_usize(slot.weight.0);
            }
        }
        let min = tallies.values().copied().min().unwrap();
        let lowest: Vec<CandidateIndex> = tallies.iter().filter(|(_, t)| **t == min).map(|(c, _)| *c).collect();
        let dropped = resolve_strong(&lowest, config.strong_tie_mode, roster, rng, tie_channel, "IRV completion elimination");
        continuing.remove(&dropped);
    }
}

fn borda_among(_roster: &CandidateRoster, ballots: &BallotCollection, candidates: &[CandidateIndex], config: &TabulatorConfig) -> CandidateIndex {
    let scale = config.scale;
    let allowed: HashSet<_> = candidates.iter().copied().collect();
    let m = candidates.len();
    let mut tallies = std::collections::HashMap::new();
    for &c in candidates { tallies.insert(c, scale.zero()); }
    for slot in ballots.weighted_view() {
        let ranked = slot.ballot.continuing_order(&allowed);
        for (i, c) in ranked.iter().enumerate() {
            *tallies.get_mut(c).unwrap() += scale.from_usize((m - i - 1) * slot.weight.0);
        }
    }
    *candidates.iter().max_by(|a, b| tallies[a].cmp(&tallies[b])).unwrap()
}
