// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Deduplicated, weighted storage of ballots. Physically a map from a ballot's
//! textual form to a slot holding the unique ballot, its accumulated weight, and
//! the original positional indices that mapped to it - the same dedup-index idea
//! the upstream rules use for piles of ballots sharing a transfer value, applied
//! here at the level of whole ballots.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use crate::ballot::{Ballot, Ranking};
use crate::candidate::{CandidateIndex, CandidateRoster};

/// A count of ballot papers - as opposed to a tally of votes, which may be
/// fractional under transfer values.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default)]
pub struct BallotPaperCount(pub usize);

impl fmt::Display for BallotPaperCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
impl fmt::Debug for BallotPaperCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
impl Add for BallotPaperCount {
    type Output = BallotPaperCount;
    fn add(self, rhs: Self) -> Self::Output { BallotPaperCount(self.0 + rhs.0) }
}
impl AddAssign for BallotPaperCount {
    fn add_assign(&mut self, rhs: Self) { self.0 += rhs.0; }
}
impl Sub for BallotPaperCount {
    type Output = BallotPaperCount;
    fn sub(self, rhs: Self) -> Self::Output { BallotPaperCount(self.0 - rhs.0) }
}
impl SubAssign for BallotPaperCount {
    fn sub_assign(&mut self, rhs: Self) { self.0 -= rhs.0; }
}

/// one distinct ballot (by ranking sequence) together with how many voters cast it.
#[derive(Clone, Debug)]
pub struct BallotSlot {
    pub ballot: Ballot,
    pub weight: BallotPaperCount,
    /// positions (0-based, in the order ballots were appended) that map to this slot.
    pub positions: Vec<usize>,
}

#[derive(Error, Debug)]
pub enum BallotCollectionError {
    #[error("ballot has a custom id but the collection is not in custom-id mode")]
    UnexpectedId,
    #[error("ballot has no id but the collection is in custom-id mode")]
    MissingId,
    #[error("duplicate ballot id {0} in custom-id mode")]
    DuplicateId(String),
}

/// A multiset of ballots, exposed through two equivalent views:
/// - the *positional view* (length = total ballot count) used by order-sensitive
///   methods (Cambridge decimation, Random-Transfer);
/// - the *weighted view* (length = number of unique ballots) used by
///   order-independent methods.
///
/// `custom_id_mode` is fixed by the first ballot appended: once set, every
/// subsequent ballot must (or must not) carry an id.
#[derive(Clone, Debug, Default)]
pub struct BallotCollection {
    // serialized as the flat positional list of ballots (see `Serialize`/`Deserialize`
    // below) - slots, positions and id-bookkeeping are all reconstructed on load.
    slots: HashMap<String, usize>,
    pub(crate) slot_list: Vec<BallotSlot>,
    /// positional_view[p] = index into slot_list for the ballot appended at position p.
    positional_view: Vec<usize>,
    custom_id_mode: Option<bool>,
    ids_seen: std::collections::HashSet<String>,
}

impl BallotCollection {
    pub fn new() -> Self { Self::default() }

    pub fn total_ballots(&self) -> BallotPaperCount { BallotPaperCount(self.positional_view.len()) }

    pub fn num_unique(&self) -> usize { self.slot_list.len() }

    /// the weighted view: one entry per unique ballot.
    pub fn weighted_view(&self) -> &[BallotSlot] { &self.slot_list }

    /// the positional view: the ballot (by slot) at each original position, in order.
    pub fn positional_ballots(&self) -> impl Iterator<Item = &Ballot> {
        self.positional_view.iter().map(move |&slot| &self.slot_list[slot].ballot)
    }

    pub fn append(&mut self, ballot: Ballot) -> Result<(), BallotCollectionError> {
        let has_id = ballot.id.is_some();
        match self.custom_id_mode {
            None => self.custom_id_mode = Some(has_id),
            Some(true) if !has_id => return Err(BallotCollectionError::MissingId),
            Some(false) if has_id => return Err(BallotCollectionError::UnexpectedId),
            _ => {}
        }
        if let Some(id) = &ballot.id {
            if !self.ids_seen.insert(id.clone()) {
                return Err(BallotCollectionError::DuplicateId(id.clone()));
            }
        }
        let key = ballot.dedup_key();
        let position = self.positional_view.len();
        match self.slots.get(&key) {
            Some(&slot_idx) => {
                let slot = &mut self.slot_list[slot_idx];
                slot.weight += BallotPaperCount(1);
                slot.positions.push(position);
                self.positional_view.push(slot_idx);
            }
            None => {
                let slot_idx = self.slot_list.len();
                self.slots.insert(key, slot_idx);
                self.slot_list.push(BallotSlot { ballot, weight: BallotPaperCount(1), positions: vec![position] });
                self.positional_view.push(slot_idx);
            }
        }
        Ok(())
    }

    /// How an equal-ranking (overvote) is to be handled while cleaning.
    pub fn clean(&self, roster: &CandidateRoster, options: CleaningOptions) -> BallotCollection {
        let (_, remap) = roster.compact_removing_withdrawn();
        let mut out = BallotCollection::new();
        for slot in &self.slot_list {
            let cleaned = clean_one_ballot(&slot.ballot, &remap, &options);
            if options.remove_empty && cleaned.is_empty() { continue; }
            for _ in 0..slot.weight.0 {
                // append once per original ballot so positional provenance and weight survive cleaning.
                let _ = out.append(cleaned.clone());
            }
        }
        out
    }
}

impl Serialize for BallotCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.positional_ballots().collect::<Vec<_>>().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BallotCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ballots = Vec::<Ballot>::deserialize(deserializer)?;
        let mut collection = BallotCollection::new();
        for ballot in ballots {
            collection.append(ballot).map_err(serde::de::Error::custom)?;
        }
        Ok(collection)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum OvervoteRule {
    /// drop the overvoted ranking, and continue on to the next ranking ("Cambridge").
    Cambridge,
    /// truncate the ballot at the overvote ("San Francisco").
    SanFrancisco,
    /// keep equal-rankings as-is (non-strict methods, e.g. Approval treats each
    /// candidate named as separately approved).
    Keep,
}

#[derive(Copy, Clone, Debug)]
pub struct CleaningOptions {
    pub remove_empty: bool,
    pub overvote_rule: OvervoteRule,
    pub remove_dupes: bool,
    pub remove_withdrawn: bool,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        CleaningOptions { remove_empty: true, overvote_rule: OvervoteRule::Cambridge, remove_dupes: true, remove_withdrawn: true }
    }
}

fn clean_one_ballot(ballot: &Ballot, remap: &[Option<CandidateIndex>], options: &CleaningOptions) -> Ballot {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for ranking in &ballot.rankings {
        match ranking {
            Ranking::Skip => continue,
            Ranking::Single(c) => {
                let resolved = if options.remove_withdrawn { remap.get(c.0).copied().flatten() } else { Some(*c) };
                if let Some(c) = resolved {
                    if options.remove_dupes && !seen.insert(c) { continue; }
                    out.push(Ranking::Single(c));
                }
            }
            Ranking::Equal(cs) => {
                let resolved: Vec<CandidateIndex> = cs.iter().filter_map(|c| {
                    if options.remove_withdrawn { remap.get(c.0).copied().flatten() } else { Some(*c) }
                }).filter(|c| !seen.contains(c)).collect();
                if resolved.is_empty() { continue; }
                match options.overvote_rule {
                    OvervoteRule::Cambridge => continue, // drop this ranking, move to next
                    OvervoteRule::SanFrancisco => break,  // truncate ballot here
                    OvervoteRule::Keep => {
                        for c in &resolved { seen.insert(*c); }
                        out.push(Ranking::Equal(resolved));
                    }
                }
            }
        }
    }
    Ballot { rankings: out, id: ballot.id.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(i: usize) -> CandidateIndex { CandidateIndex(i) }

    #[test]
    fn test_cambridge_vs_sanfrancisco_overvote() {
        let roster = CandidateRoster::new(["A", "B", "C", "D"].iter().map(|s| s.to_string()));
        let mut coll = BallotCollection::new();
        coll.append(Ballot::new(vec![
            Ranking::Single(c(0)),
            Ranking::Equal(vec![c(1), c(2)]),
            Ranking::Single(c(3)),
        ])).unwrap();
        let cambridge = coll.clean(&roster, CleaningOptions { overvote_rule: OvervoteRule::Cambridge, ..Default::default() });
        let only = &cambridge.weighted_view()[0].ballot;
        assert_eq!(only.rankings, vec![Ranking::Single(c(0)), Ranking::Single(c(3))]);

        let sf = coll.clean(&roster, CleaningOptions { overvote_rule: OvervoteRule::SanFrancisco, ..Default::default() });
        let only = &sf.weighted_view()[0].ballot;
        assert_eq!(only.rankings, vec![Ranking::Single(c(0))]);
    }

    #[test]
    fn test_clean_idempotent() {
        let roster = CandidateRoster::new(["A", "B"].iter().map(|s| s.to_string()));
        let mut coll = BallotCollection::new();
        coll.append(Ballot::new(vec![Ranking::Single(c(0)), Ranking::Skip, Ranking::Single(c(1))])).unwrap();
        let once = coll.clean(&roster, CleaningOptions::default());
        let twice = once.clean(&roster, CleaningOptions::default());
        assert_eq!(once.weighted_view()[0].ballot.rankings, twice.weighted_view()[0].ballot.rankings);
    }

    #[test]
    fn test_dedup_and_weight() {
        let mut coll = BallotCollection::new();
        coll.append(Ballot::new(vec![Ranking::Single(c(0)), Ranking::Single(c(1))])).unwrap();
        coll.append(Ballot::new(vec![Ranking::Single(c(0)), Ranking::Single(c(1))])).unwrap();
        coll.append(Ballot::new(vec![Ranking::Single(c(1))])).unwrap();
        assert_eq!(coll.total_ballots(), BallotPaperCount(3));
        assert_eq!(coll.num_unique(), 2);
        assert_eq!(coll.weighted_view().iter().find(|s| s.ballot.rankings.len() == 2).unwrap().weight, BallotPaperCount(2));
    }
}
