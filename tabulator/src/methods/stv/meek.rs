// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Recursive keep-factor methods: Meek and its Warren variant. No ballots are
//! ever physically transferred; instead each winner retains a shrinking
//! fraction (the keep factor) of every ballot that reaches it, and surplus
//! emerges from the residual each round as keep factors are recomputed.
//!
//! A ballot's contribution is computed by walking its rankings carrying a
//! `remainder` (the fraction of the paper's value not yet allocated), exactly
//! as the upstream ballot tree does, just without the tree's caching - this
//! collection is small enough that recomputing the walk every round is cheap
//! and a lot easier to get right than an incrementally-updated trie.

use std::collections::HashSet;
use num::rational::BigRational;
use num::Zero;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use crate::ballot::Ranking;
use crate::ballot_collection::{BallotCollection, BallotPaperCount};
use crate::candidate::{CandidateIndex, CandidateRoster, CandidateStatus};
use crate::config::TabulatorConfig;
use crate::fixed_point::FixedPoint;
use crate::threshold::ThresholdPolicy;
use crate::tie_resolution::{resolve_strong, resolve_weak, TieBreakChannel};
use crate::transcript::{Action, CandidateElected, ElectionReason, EndCountStatus, PerCandidate, RoundRecord, Transcript};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct MeekOptions {
    /// Warren keeps `min(remainder, keep_factor)` of the ballot's remaining
    /// value at each winner, instead of Meek's `remainder * keep_factor`.
    pub warren: bool,
    /// New Zealand's variant truncates the keep-factor update rather than
    /// rounding it up; see the crate's open-question record in `DESIGN.md`.
    pub nz_truncating_round: bool,
}

impl MeekOptions {
    pub fn meek() -> Self { MeekOptions { warren: false, nz_truncating_round: false } }
    pub fn warren() -> Self { MeekOptions { warren: true, nz_truncating_round: false } }
    pub fn nz() -> Self { MeekOptions { warren: false, nz_truncating_round: true } }
}

pub fn run(
    options: &MeekOptions,
    roster: &CandidateRoster,
    ballots: &BallotCollection,
    config: &TabulatorConfig,
    rng: &mut impl RngCore,
    tie_channel: Option<&TieBreakChannel>,
) -> Transcript<FixedPoint> {
    let n = roster.len().0;
    let seats = config.vacancies.0;
    let scale = config.scale;
    let threshold_policy = ThresholdPolicy::droop_dynamic_fractional();
    let total_papers = ballots.total_ballots();
    let total_rational = BigRational::from_integer(total_papers.0.into());
    let slots = ballots.weighted_view();

    let mut status = vec![CandidateStatus::Continuing; n];
    let mut kf: Vec<BigRational> = vec![BigRational::from_integer(1.into()); n];
    let mut elected_order: Vec<CandidateIndex> = Vec::new();
    let mut rounds = Vec::new();
    let mut history: Vec<Vec<(CandidateIndex, BigRational)>> = Vec::new();

    loop {
        let tallies = walk_all_ballots(slots, &status, &kf, n, options.warren);
        let assigned: BigRational = tallies.iter().cloned().fold(BigRational::zero(), |a, b| a + b);
        let exhausted_rational = &total_rational - &assigned;
        let exhausted_fp = FixedPoint::from_rational_rounding_down(&exhausted_rational, scale);
        let tallies_fp: Vec<FixedPoint> = tallies.iter().map(|t| FixedPoint::from_rational_rounding_down(t, scale)).collect();
        let threshold = threshold_policy.compute(total_papers, exhausted_fp, seats, scale);

        history.push((0..n).map(|c| (CandidateIndex(c), tallies[c].clone())).collect());

        let mut newly_elected = Vec::new();
        for c in 0..n {
            if status[c] == CandidateStatus::Continuing && tallies_fp[c].approx_gt(&threshold) {
                status[c] = CandidateStatus::WinnerWithSurplus;
                elected_order.push(CandidateIndex(c));
                newly_elected.push(CandidateElected { who: CandidateIndex(c), why: ElectionReason::ReachedThreshold });
            }
        }
        let continuing_count = (0..n).filter(|&c| status[c] == CandidateStatus::Continuing).count();
        if newly_elected.is_empty() && continuing_count > 0 && continuing_count <= seats - elected_order.len() {
            for c in 0..n {
                if status[c] == CandidateStatus::Continuing {
                    status[c] = CandidateStatus::WinnerWithSurplus;
                    elected_order.push(CandidateIndex(c));
                    newly_elected.push(CandidateElected { who: CandidateIndex(c), why: ElectionReason::AllRemainingMustBeElected });
                }
            }
        }

        let keep_factor_fp: Vec<FixedPoint> = kf.iter().map(|k| FixedPoint::from_rational_rounding_down(k, scale)).collect();
        let narrative: Vec<String> = newly_elected.iter().map(|e| format!("{} elected", roster.name(e.who))).collect();
        rounds.push(RoundRecord {
            action: if rounds.is_empty() { Action::FirstPreferences } else { Action::SurplusTransfer(elected_order.last().copied().unwrap_or(CandidateIndex(0))) },
            elected: newly_elected,
            not_continuing: vec![],
            created_transfer_value: None,
            decisions: vec![],
            status: EndCountStatus {
                tallies: PerCandidate { candidate: tallies_fp.clone(), exhausted: exhausted_fp, rounding: Default::default(), set_aside: None },
                papers: PerCandidate::from_num_candidates(n, BallotPaperCount(0)),
                keep_factor: Some(keep_factor_fp),
            },
            narrative,
            count_name: None,
        });

        let won_enough = elected_order.len() >= seats;
        let continuing_empty = (0..n).all(|c| status[c] != CandidateStatus::Continuing);
        if won_enough || continuing_empty {
            for c in elected_order.iter() { status[c.0] = CandidateStatus::WinnerSettled; }
            break;
        }

        // any winner whose tally still exceeds threshold gets a reduced keep
        // factor; recomputing it changes next round's walk, so loop again
        // rather than eliminate while surplus is still outstanding.
        let mut transferred = false;
        for c in 0..n {
            if status[c] == CandidateStatus::WinnerWithSurplus && tallies_fp[c].approx_gt(&threshold) {
                let ratio = threshold.to_rational() / tallies[c].clone();
                let new_kf_value = &kf[c] * &ratio;
                kf[c] = if options.nz_truncating_round {
                    FixedPoint::from_rational_rounding_down(&new_kf_value, scale).to_rational()
                } else {
                    FixedPoint::from_rational_rounding_up(&new_kf_value, scale).to_rational()
                };
                transferred = true;
            } else if status[c] == CandidateStatus::WinnerWithSurplus {
                status[c] = CandidateStatus::WinnerSettled;
            }
        }
        if transferred { continue; }

        let continuing: Vec<CandidateIndex> = (0..n).filter(|&c| status[c] == CandidateStatus::Continuing).map(CandidateIndex).collect();
        if continuing.is_empty() { continue; }
        let mut by_count: Vec<(CandidateIndex, BigRational)> = continuing.iter().map(|c| (*c, tallies[c.0].clone())).collect();
        by_count.sort_by(|a, b| a.1.cmp(&b.1));
        let min = by_count[0].1.clone();
        let lowest: Vec<CandidateIndex> = by_count.iter().take_while(|(_, v)| *v == min).map(|(c, _)| *c).collect();
        let narrowed = resolve_weak(&lowest, config.weak_tie_mode, &history, true);
        let who = resolve_strong(&narrowed, config.strong_tie_mode, roster, rng, tie_channel, "Meek stable-state elimination");
        status[who.0] = CandidateStatus::Loser;
        if let Some(last) = rounds.last_mut() {
            last.not_continuing.push(who);
            last.action = Action::Elimination(vec![who]);
        }
    }

    Transcript { method_name: if options.warren { "Warren".to_string() } else { "Meek".to_string() }, threshold: None, rounds, elected: elected_order }
}

fn walk_all_ballots(slots: &[crate::ballot_collection::BallotSlot], status: &[CandidateStatus], kf: &[BigRational], n: usize, warren: bool) -> Vec<BigRational> {
    let active: HashSet<CandidateIndex> = (0..n).filter(|&c| status[c] != CandidateStatus::Loser).map(CandidateIndex).collect();
    let mut tallies = vec![BigRational::zero(); n];
    for slot in slots {
        let mut remainder = BigRational::from_integer(1.into());
        for ranking in &slot.ballot.rankings {
            if remainder.is_zero() { break; }
            if let Ranking::Single(c) = ranking {
                if !active.contains(c) { continue; }
                let kept = if status[c.0].is_winner() {
                    if warren { remainder.clone().min(kf[c.0].clone()) } else { &remainder * &kf[c.0] }
                } else {
                    remainder.clone()
                };
                let weight = BigRational::from_integer(slot.weight.0.into());
                tallies[c.0] += &kept * &weight;
                remainder -= kept;
            }
        }
    }
    tallies
}
