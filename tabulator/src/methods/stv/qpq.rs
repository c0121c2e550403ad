// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Quota-Preferential by Quotient. Every ballot carries a cumulative
//! `contrib`: the quota-equivalent share it has already spent electing
//! earlier candidates. A candidate's quotient `q_c = v_c / (1 + t_c)`
//! discounts their apparent support by how much of it has already been
//! "used up" elsewhere, so a candidate is elected only once their
//! not-yet-spent support alone clears the quota.

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
use crate::tie_resolution::{resolve_strong, resolve_weak, TieBreakChannel};
use crate::transcript::{Action, CandidateElected, ElectionReason, EndCountStatus, PerCandidate, RoundRecord, Transcript};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, Default)]
pub struct QpqOptions {
    /// after any exclusion, move every already-elected candidate back to
    /// continuing and reset all ballots' contributions to zero.
    pub restart_after_exclusion: bool,
}

struct Slot {
    holder: Option<CandidateIndex>,
    cursor: usize,
    contrib: BigRational,
}

fn advance(ballot: &crate::ballot::Ballot, from: usize, continuing: &HashSet<CandidateIndex>) -> (Option<CandidateIndex>, usize) {
    for (i, r) in ballot.rankings.iter().enumerate().skip(from) {
        if let Ranking::Single(c) = r {
            if continuing.contains(c) { return (Some(*c), i + 1); }
        }
    }
    (None, ballot.rankings.len())
}

pub fn run(
    options: &QpqOptions,
    roster: &CandidateRoster,
    ballots: &BallotCollection,
    config: &TabulatorConfig,
    rng: &mut impl RngCore,
    tie_channel: Option<&TieBreakChannel>,
) -> Transcript<FixedPoint> {
    let n = roster.len().0;
    let seats = config.vacancies.0;
    let scale = config.scale;
    let slots_data = ballots.weighted_view();
    let mut status = vec![CandidateStatus::Continuing; n];
    let mut slots: Vec<Slot> = slots_data.iter().map(|_| Slot { holder: None, cursor: 0, contrib: BigRational::zero() }).collect();
    let mut elected_order: Vec<CandidateIndex> = Vec::new();
    let mut rounds = Vec::new();
    let mut history: Vec<Vec<(CandidateIndex, BigRational)>> = Vec::new();

    let continuing_set = |status: &[CandidateStatus]| -> HashSet<CandidateIndex> {
        (0..n).filter(|&i| status[i].is_continuing()).map(CandidateIndex).collect()
    };

    // step 1: distribute every ballot to its current top continuing choice.
    {
        let cont = continuing_set(&status);
        for (i, slot_data) in slots_data.iter().enumerate() {
            let (c, cursor) = advance(&slot_data.ballot, 0, &cont);
            slots[i].holder = c;
            slots[i].cursor = cursor;
        }
    }

    loop {
        let cont = continuing_set(&status);
        let mut v = vec![BigRational::zero(); n];
        let mut t = vec![BigRational::zero(); n];
        for (i, slot) in slots.iter().enumerate() {
            if let Some(c) = slot.holder {
                let weight = BigRational::from_integer(slots_data[i].weight.0.into());
                v[c.0] += &weight;
                t[c.0] += &weight * &slot.contrib;
            }
        }
        let q: Vec<Option<BigRational>> = (0..n).map(|c| {
            if cont.contains(&CandidateIndex(c)) { Some(v[c].clone() / (BigRational::from_integer(1.into()) + t[c].clone())) } else { None }
        }).collect();

        let v_active: BigRational = (0..n).filter(|&c| cont.contains(&CandidateIndex(c))).map(|c| v[c].clone()).fold(BigRational::zero(), |a, b| a + b);
        let t_inactive: BigRational = (0..n).filter(|&c| status[c].is_winner()).map(|c| t[c].clone()).fold(BigRational::zero(), |a, b| a + b);
        let quota = v_active.clone() / (BigRational::from_integer((1 + seats).into()) - t_inactive.clone());

        history.push((0..n).map(|c| (CandidateIndex(c), v[c].clone())).collect());

        let tallies_fp: Vec<FixedPoint> = v.iter().map(|x| FixedPoint::from_rational_rounding_down(x, scale)).collect();
        let assigned: BigRational = v.iter().cloned().fold(BigRational::zero(), |a, b| a + b);
        let total_rational = BigRational::from_integer(ballots.total_ballots().0.into());
        let exhausted_fp = FixedPoint::from_rational_rounding_down(&(&total_rational - &assigned), scale);

        let continuing_with_q: Vec<(CandidateIndex, BigRational)> = (0..n).filter_map(|c| q[c].clone().map(|qc| (CandidateIndex(c), qc))).collect();
        let mut newly_elected = Vec::new();
        let mut narrative = Vec::new();
        let mut action = Action::FirstPreferences;

        if continuing_with_q.is_empty() {
            rounds.push(RoundRecord {
                action,
                elected: newly_elected,
                not_continuing: vec![],
                created_transfer_value: None,
                decisions: vec![],
                status: EndCountStatus { tallies: PerCandidate { candidate: tallies_fp, exhausted: exhausted_fp, rounding: Default::default(), set_aside: None }, papers: PerCandidate::from_num_candidates(n, BallotPaperCount(0)), keep_factor: None },
                narrative,
                count_name: None,
            });
            break;
        }

        let max_q = continuing_with_q.iter().map(|(_, qc)| qc).max().unwrap().clone();
        if max_q > quota {
            let winners_at_max: Vec<CandidateIndex> = continuing_with_q.iter().filter(|(_, qc)| *qc == max_q).map(|(c, _)| *c).collect();
            let who = resolve_strong(&winners_at_max, config.strong_tie_mode, roster, rng, tie_channel, "QPQ: candidate clearing quota this round");
            status[who.0] = CandidateStatus::WinnerSettled;
            elected_order.push(who);
            newly_elected.push(CandidateElected { who, why: ElectionReason::ReachedThreshold });
            narrative.push(format!("{} elected (q={}, Q={})", roster.name(who), max_q, quota));
            action = Action::SurplusTransfer(who);

            let increment = BigRational::from_integer(1.into()) / max_q.clone();
            let cont_after = continuing_set(&status);
            for (i, slot) in slots.iter_mut().enumerate() {
                if slot.holder == Some(who) {
                    slot.contrib += &increment;
                    let (next, cursor) = advance(&slots_data[i].ballot, slot.cursor, &cont_after);
                    slot.holder = next;
                    slot.cursor = cursor;
                }
            }

            if options.restart_after_exclusion {
                // elections don't trigger a restart per the textual rule; only exclusions do.
            }
        } else {
            let min_q = continuing_with_q.iter().map(|(_, qc)| qc).min().unwrap().clone();
            let lowest: Vec<CandidateIndex> = continuing_with_q.iter().filter(|(_, qc)| *qc == min_q).map(|(c, _)| *c).collect();
            let narrowed = resolve_weak(&lowest, config.weak_tie_mode, &history, true);
            let who = resolve_strong(&narrowed, config.strong_tie_mode, roster, rng, tie_channel, "QPQ: candidate with smallest quotient to exclude");
            status[who.0] = CandidateStatus::Loser;
            narrative.push(format!("{} excluded (q={})", roster.name(who), min_q));
            action = Action::Elimination(vec![who]);

            let cont_after = continuing_set(&status);
            for (i, slot) in slots.iter_mut().enumerate() {
                if slot.holder == Some(who) {
                    let (next, cursor) = advance(&slots_data[i].ballot, slot.cursor, &cont_after);
                    slot.holder = next;
                    slot.cursor = cursor;
                }
            }

            if options.restart_after_exclusion {
                for c in 0..n {
                    if status[c].is_winner() { status[c] = CandidateStatus::Continuing; }
                }
                elected_order.clear();
                for slot in slots.iter_mut() { slot.contrib = BigRational::zero(); }
                let cont = continuing_set(&status);
                for (i, slot_data) in slots_data.iter().enumerate() {
                    let (c, cursor) = advance(&slot_data.ballot, 0, &cont);
                    slots[i].holder = c;
                    slots[i].cursor = cursor;
                }
                narrative.push("restarted: all winners returned to continuing, contributions reset".to_string());
                action = Action::Restart;
            }
        }

        rounds.push(RoundRecord {
            action,
            elected: newly_elected,
            not_continuing: vec![],
            created_transfer_value: None,
            decisions: vec![],
            status: EndCountStatus { tallies: PerCandidate { candidate: tallies_fp, exhausted: exhausted_fp, rounding: Default::default(), set_aside: None }, papers: PerCandidate::from_num_candidates(n, BallotPaperCount(0)), keep_factor: None },
            narrative,
            count_name: None,
        });

        let continuing_count = (0..n).filter(|&c| status[c].is_continuing()).count();
        if elected_order.len() >= seats || continuing_count == 0 {
            break;
        }
    }

    Transcript { method_name: "QPQ".to_string(), threshold: None, rounds, elected: elected_order }
}
