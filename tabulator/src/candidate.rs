// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

use std::fmt::{Debug, Display, Formatter};
use std::ops::Sub;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Index into the candidate roster. This is really a type alias - don't want a long
/// display when printed, so it has its own Display/Debug rather than deriving them.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default)]
pub struct CandidateIndex(pub usize);

impl Display for CandidateIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}
impl Debug for CandidateIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "Candidate#{}", self.0) }
}
impl FromStr for CandidateIndex {
    type Err = std::num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(CandidateIndex(s.parse()?)) }
}

/// A count of candidates, e.g. the number of seats or the number remaining.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default)]
pub struct NumberOfCandidates(pub usize);

impl Display for NumberOfCandidates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}
impl Debug for NumberOfCandidates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}
impl Sub for NumberOfCandidates {
    type Output = NumberOfCandidates;
    fn sub(self, rhs: Self) -> Self::Output { NumberOfCandidates(self.0 - rhs.0) }
}

/// One candidate on the roster.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    /// true if withdrawn before the count begins; withdrawn candidates are removed,
    /// and the remaining candidates renumbered, by `BallotCollection::clean`.
    #[serde(default)]
    pub withdrawn: bool,
}

impl Candidate {
    pub fn new(name: impl Into<String>) -> Self { Candidate { name: name.into(), withdrawn: false } }
}

/// The ordered list of candidates standing in an election. A candidate's index into
/// this list is its identity throughout the tabulation core.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CandidateRoster {
    pub candidates: Vec<Candidate>,
}

impl CandidateRoster {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        CandidateRoster { candidates: names.into_iter().map(Candidate::new).collect() }
    }

    pub fn len(&self) -> NumberOfCandidates { NumberOfCandidates(self.candidates.len()) }
    pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

    pub fn name(&self, c: CandidateIndex) -> &str { &self.candidates[c.0].name }

    pub fn withdrawn_indices(&self) -> Vec<CandidateIndex> {
        self.candidates.iter().enumerate().filter(|(_, c)| c.withdrawn).map(|(i, _)| CandidateIndex(i)).collect()
    }

    /// A roster with the withdrawn candidates removed, and a map from old index to
    /// new index (`None` for withdrawn candidates) for remapping ballots.
    pub fn compact_removing_withdrawn(&self) -> (CandidateRoster, Vec<Option<CandidateIndex>>) {
        let mut new_candidates = Vec::new();
        let mut map = Vec::with_capacity(self.candidates.len());
        for c in &self.candidates {
            if c.withdrawn {
                map.push(None);
            } else {
                map.push(Some(CandidateIndex(new_candidates.len())));
                new_candidates.push(c.clone());
            }
        }
        (CandidateRoster { candidates: new_candidates }, map)
    }
}

/// The status of a candidate at a given point in the count. Every candidate is in
/// exactly one of these at any time.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum CandidateStatus {
    Continuing,
    /// elected, and still holding surplus votes above the threshold to transfer.
    WinnerWithSurplus,
    /// elected, and fully settled (surplus, if any, already transferred).
    WinnerSettled,
    Loser,
}

impl CandidateStatus {
    pub fn is_winner(&self) -> bool { matches!(self, CandidateStatus::WinnerWithSurplus | CandidateStatus::WinnerSettled) }
    pub fn is_continuing(&self) -> bool { matches!(self, CandidateStatus::Continuing) }
}
