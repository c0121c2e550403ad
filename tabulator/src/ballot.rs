// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! The ballot data model: a ranking is one marked position on a ballot, a ballot is
//! an ordered sequence of rankings plus an optional voter-supplied identifier.

use serde::{Deserialize, Serialize};
use crate::candidate::CandidateIndex;

/// One marked position on a ballot.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Ranking {
    /// a single candidate marked at this position (the ordinary case).
    Single(CandidateIndex),
    /// two or more candidates marked equal at this position - an overvote under
    /// strict preferential rules, resolved by `BallotCollection::clean`.
    Equal(Vec<CandidateIndex>),
    /// the position was left blank.
    Skip,
}

impl Ranking {
    pub fn is_skip(&self) -> bool { matches!(self, Ranking::Skip) }
    pub fn is_equal(&self) -> bool { matches!(self, Ranking::Equal(_)) }

    /// the single candidate at this ranking, if unambiguous.
    pub fn single_candidate(&self) -> Option<CandidateIndex> {
        match self {
            Ranking::Single(c) => Some(*c),
            _ => None,
        }
    }
}

/// A voter's full list of ranked preferences, plus an optional opaque identifier
/// (used by ballot-file formats that support per-ballot ids, such as BLT's custom-id
/// mode). After `clean()`, every ranking in every ballot is `Ranking::Single` with
/// no repeats.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub struct Ballot {
    pub rankings: Vec<Ranking>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
}

impl Ballot {
    pub fn new(rankings: Vec<Ranking>) -> Self { Ballot { rankings, id: None } }

    pub fn with_id(rankings: Vec<Ranking>, id: impl Into<String>) -> Self {
        Ballot { rankings, id: Some(id.into()) }
    }

    pub fn is_empty(&self) -> bool { self.rankings.is_empty() }

    /// the textual key used by the deduplication index: the ordered list of
    /// candidate indices as a compact string. Only meaningful once cleaned, since
    /// an uncleaned ballot may contain equal-rankings/skips.
    pub fn dedup_key(&self) -> String {
        self.rankings.iter().map(|r| match r {
            Ranking::Single(c) => c.0.to_string(),
            Ranking::Equal(cs) => cs.iter().map(|c| c.0.to_string()).collect::<Vec<_>>().join("="),
            Ranking::Skip => "-".to_string(),
        }).collect::<Vec<_>>().join(",")
    }

    /// the first ranking naming a candidate in `among`, skipping equal-rankings and
    /// skips that don't resolve unambiguously to a single continuing candidate.
    pub fn top_choice(&self, among: &std::collections::HashSet<CandidateIndex>) -> Option<CandidateIndex> {
        for r in &self.rankings {
            if let Ranking::Single(c) = r {
                if among.contains(c) { return Some(*c); }
            }
        }
        None
    }

    /// all strict single-candidate rankings, in order, restricted to a continuing set.
    pub fn continuing_order(&self, among: &std::collections::HashSet<CandidateIndex>) -> Vec<CandidateIndex> {
        self.rankings.iter().filter_map(|r| r.single_candidate()).filter(|c| among.contains(c)).collect()
    }
}
