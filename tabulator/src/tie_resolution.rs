// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Tie resolution. A *strong* tie is between candidates equivalent by all
//! information available to the count; a *weak* tie is tied at the current round
//! but may be resolved by looking at other rounds' tallies.
//!
//! This is the sole place in the tabulator that is allowed to consult randomness
//! or block on a human decision - see [`TieBreakChannel`].

use std::sync::mpsc::{Receiver, Sender, SyncSender};
use rand::distributions::{Distribution, Uniform};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use crate::candidate::{CandidateIndex, CandidateRoster};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum StrongTieMode {
    /// choose uniformly at random among the tied candidates.
    Random,
    /// choose the candidate whose name sorts first.
    Alpha,
    /// choose the candidate with the lowest roster index.
    Index,
    /// ask an operator, via `TieBreakChannel`; falls back to `Random` on cancel.
    Manual,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum WeakTieMode {
    /// skip straight to the strong tie-break.
    Strong,
    /// walk rounds `1..r` in order; the first round at which the candidates'
    /// tallies differ breaks the tie.
    Forward,
    /// walk rounds `r-1..1` in reverse order.
    Backward,
}

/// A request sent to an operator when a strong tie needs a manual decision.
#[derive(Clone, Debug)]
pub struct TieBreakRequest {
    pub tied: Vec<CandidateIndex>,
    /// human-readable description of what the decision is for, e.g.
    /// "choosing who to exclude with the fewest votes".
    pub what: String,
}

/// The operator's answer: either a chosen candidate (which must be one of the
/// tied set) or a cancellation, which falls back to `StrongTieMode::Random`.
#[derive(Clone, Debug)]
pub enum TieBreakResponse {
    Chosen(CandidateIndex),
    Cancel,
}

/// The single suspension point in the tabulation core: two single-slot
/// request/response queues used for the manual tie-break rendezvous.
pub struct TieBreakChannel {
    request_tx: SyncSender<TieBreakRequest>,
    response_rx: Receiver<TieBreakResponse>,
}

/// The operator side of the same rendezvous, held by whatever external agent
/// answers tie-break requests (a UI, a test harness, or a scripted response list).
pub struct TieBreakOperator {
    request_rx: Receiver<TieBreakRequest>,
    response_tx: Sender<TieBreakResponse>,
}

pub fn tie_break_channel() -> (TieBreakChannel, TieBreakOperator) {
    let (request_tx, request_rx) = std::sync::mpsc::sync_channel(1);
    let (response_tx, response_rx) = std::sync::mpsc::channel();
    (TieBreakChannel { request_tx, response_rx }, TieBreakOperator { request_rx, response_tx })
}

impl TieBreakChannel {
    /// blocks until the operator answers.
    pub fn ask(&self, tied: Vec<CandidateIndex>, what: impl Into<String>) -> TieBreakResponse {
        if self.request_tx.send(TieBreakRequest { tied, what: what.into() }).is_err() {
            return TieBreakResponse::Cancel;
        }
        self.response_rx.recv().unwrap_or(TieBreakResponse::Cancel)
    }
}

impl TieBreakOperator {
    pub fn next_request(&self) -> Option<TieBreakRequest> { self.request_rx.recv().ok() }
    pub fn respond(&self, response: TieBreakResponse) { let _ = self.response_tx.send(response); }
}

/// Explicit tie resolutions supplied up-front by the returning officer (e.g. a
/// lot drawn before the count began), consulted before falling back to
/// `StrongTieMode`. Mirrors the ability of an EC to pre-declare how a tie will
/// be broken rather than leaving it to the count itself.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PredeclaredTieResolutions {
    /// each entry is a priority order among some subset of candidates: earlier
    /// entries in the inner vector are favoured over later ones.
    pub resolutions: Vec<Vec<CandidateIndex>>,
}

impl PredeclaredTieResolutions {
    /// If every candidate in `tied` appears in some predeclared resolution that
    /// covers the whole set, return the favoured one.
    pub fn resolve(&self, tied: &[CandidateIndex]) -> Option<CandidateIndex> {
        for resolution in &self.resolutions {
            if tied.iter().all(|c| resolution.contains(c)) {
                return resolution.iter().find(|c| tied.contains(c)).copied();
            }
        }
        None
    }
}

/// Resolve a strong tie among `tied` (must be non-empty) to a single candidate.
pub fn resolve_strong<R: RngCore>(
    tied: &[CandidateIndex],
    mode: StrongTieMode,
    roster: &CandidateRoster,
    rng: &mut R,
    channel: Option<&TieBreakChannel>,
    what: &str,
) -> CandidateIndex {
    assert!(!tied.is_empty());
    if tied.len() == 1 { return tied[0]; }
    match mode {
        StrongTieMode::Random => pick_random(tied, rng),
        StrongTieMode::Alpha => *tied.iter().min_by_key(|c| roster.name(**c)).unwrap(),
        StrongTieMode::Index => *tied.iter().min().unwrap(),
        StrongTieMode::Manual => {
            match channel {
                Some(channel) => match channel.ask(tied.to_vec(), what) {
                    TieBreakResponse::Chosen(c) if tied.contains(&c) => c,
                    _ => pick_random(tied, rng),
                },
                None => pick_random(tied, rng),
            }
        }
    }
}

fn pick_random<R: RngCore>(tied: &[CandidateIndex], rng: &mut R) -> CandidateIndex {
    let uniform = Uniform::from(0..tied.len());
    tied[uniform.sample(rng)]
}

/// Resolve a weak tie: tied candidates at the current round, possibly
/// distinguishable by some other round's tally. `history` is indexed by round,
/// each entry a lookup from candidate to tally at that round, oldest first.
/// Returns the subset of `tied` that remains tied after the scan (hopefully a
/// single candidate, but may still be more than one, in which case the caller
/// should fall back to a strong tie-break over the remainder).
pub fn resolve_weak<Tally: Ord + Clone>(
    tied: &[CandidateIndex],
    mode: WeakTieMode,
    history: &[Vec<(CandidateIndex, Tally)>],
    find_lowest: bool,
) -> Vec<CandidateIndex> {
    if tied.len() <= 1 || matches!(mode, WeakTieMode::Strong) { return tied.to_vec(); }
    let rounds: Box<dyn Iterator<Item = &Vec<(CandidateIndex, Tally)>>> = match mode {
        WeakTieMode::Forward => Box::new(history.iter()),
        WeakTieMode::Backward => Box::new(history.iter().rev()),
        WeakTieMode::Strong => unreachable!(),
    };
    for round in rounds {
        let tallies: Vec<(CandidateIndex, Tally)> = round.iter().filter(|(c, _)| tied.contains(c)).cloned().collect();
        if tallies.len() < tied.len() { continue; }
        let extreme = if find_lowest { tallies.iter().map(|(_, t)| t).min() } else { tallies.iter().map(|(_, t)| t).max() };
        if let Some(extreme) = extreme {
            let narrowed: Vec<CandidateIndex> = tallies.iter().filter(|(_, t)| t == extreme).map(|(c, _)| *c).collect();
            if narrowed.len() < tied.len() { return narrowed; }
        }
    }
    tied.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predeclared_resolution() {
        let decl = PredeclaredTieResolutions { resolutions: vec![vec![CandidateIndex(3), CandidateIndex(1)]] };
        assert_eq!(decl.resolve(&[CandidateIndex(1), CandidateIndex(3)]), Some(CandidateIndex(3)));
        assert_eq!(decl.resolve(&[CandidateIndex(1), CandidateIndex(2)]), None);
    }

    #[test]
    fn test_weak_tie_forward_scan_breaks_on_first_differing_round() {
        let history = vec![
            vec![(CandidateIndex(0), 5), (CandidateIndex(1), 5)],
            vec![(CandidateIndex(0), 3), (CandidateIndex(1), 7)],
        ];
        let narrowed = resolve_weak(&[CandidateIndex(0), CandidateIndex(1)], WeakTieMode::Forward, &history, true);
        assert_eq!(narrowed, vec![CandidateIndex(0)]);
    }
}
