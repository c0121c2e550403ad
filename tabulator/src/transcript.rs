// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! The round-by-round record of a tabulation: what action was taken, the
//! resulting tallies, and enough narrative for a report formatter (an external
//! collaborator, not part of this crate) to render a transcript a returning
//! officer can publish.

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::ballot_collection::BallotPaperCount;
use crate::candidate::{CandidateIndex, NumberOfCandidates};
use crate::signed_version::SignedVersion;
use crate::transfer_value::TransferValue;

/// The index of a round. 0 is the first (the initial tally). Distinct from the
/// human-readable count name, which for some rules (ERS97) groups several
/// rounds ("sub-stages") under one "stage" number.
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CountIndex(pub usize);

impl Display for CountIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// A value that is primarily per-candidate, but some of it may instead have gone
/// to exhaustion, to rounding, or (for a few historical STV variants) been set
/// aside. The invariant `sum(candidate) + exhausted + rounding (+ set_aside) ==
/// total` should hold at every round.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
pub struct PerCandidate<X: PartialEq + Clone + Display + FromStr> {
    pub candidate: Vec<X>,
    pub exhausted: X,
    pub rounding: SignedVersion<X>,
    pub set_aside: Option<X>,
}

impl<X: Default + PartialEq + Clone + Display + FromStr> PerCandidate<X> {
    pub fn from_num_candidates(len: usize, unknown_value: X) -> Self {
        PerCandidate { candidate: vec![unknown_value; len], exhausted: X::default(), rounding: Default::default(), set_aside: None }
    }
}

/// Why a count happened.
#[derive(Clone, Serialize, Deserialize)]
pub enum Action {
    FirstPreferences,
    SurplusTransfer(CandidateIndex),
    Elimination(Vec<CandidateIndex>),
    /// QPQ and some recursive methods restart continuing candidates' contributions.
    Restart,
}

impl Action {
    pub fn is_elimination(&self) -> bool { matches!(self, Action::Elimination(_)) }
    pub fn is_surplus(&self) -> bool { matches!(self, Action::SurplusTransfer(_)) }
}

#[derive(Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum ElectionReason {
    ReachedThreshold,
    HighestOfLastTwoStanding,
    AllRemainingMustBeElected,
    OverwhelmingTally,
}

#[derive(Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct CandidateElected {
    pub who: CandidateIndex,
    pub why: ElectionReason,
}

/// How a transfer value came to be, for the surplus-transfer STV variants.
#[derive(Clone, Serialize, Deserialize)]
pub struct TransferValueCreation<Tally> {
    pub surplus: Tally,
    pub votes: Tally,
    pub transfer_value: TransferValue,
    /// papers considered for redistribution - may be all of the transferor's
    /// papers, or just the last parcel received (Gregory/ERS97).
    pub ballots_considered: BallotPaperCount,
    pub continuing_ballots: BallotPaperCount,
}

/// A decision the returning officer had to make (usually a tie resolution).
#[derive(Clone, Serialize, Deserialize)]
pub struct DecisionMadeByReturningOfficer {
    pub affected: Vec<CandidateIndex>,
    pub what: String,
}

impl Display for DecisionMadeByReturningOfficer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.what, self.affected.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(","))
    }
}

/// Tallies and papers at the end of a round.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct EndCountStatus<Tally: PartialEq + Clone + Display + FromStr> {
    pub tallies: PerCandidate<Tally>,
    pub papers: PerCandidate<BallotPaperCount>,
    /// recursive keep-factor methods (Meek/Warren) record each candidate's
    /// retained fraction at this round; `None` for methods that don't use one.
    pub keep_factor: Option<Vec<Tally>>,
}

/// One round's full record - the per-round record of the data model.
#[derive(Clone, Serialize, Deserialize)]
pub struct RoundRecord<Tally: PartialEq + Clone + Display + FromStr> {
    pub action: Action,
    pub elected: Vec<CandidateElected>,
    /// candidates who stopped being continuing for the first time this round
    /// (either just excluded, or elected and about to have surplus handled).
    pub not_continuing: Vec<CandidateIndex>,
    pub created_transfer_value: Option<TransferValueCreation<Tally>>,
    pub decisions: Vec<DecisionMadeByReturningOfficer>,
    pub status: EndCountStatus<Tally>,
    /// human-readable fragments describing what happened this round.
    pub narrative: Vec<String>,
    /// special name for the round (e.g. "3a") when a stage spans several rounds.
    /// No method currently groups rounds into named stages, so every round
    /// produced by this crate leaves this `None`; see `DESIGN.md`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub count_name: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ThresholdInfo<Tally: Debug> {
    pub papers: BallotPaperCount,
    pub vacancies: NumberOfCandidates,
    pub threshold: Tally,
}

impl<Tally: Display + Debug> Display for ThresholdInfo<Tally> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} papers)/({} seats+1) -> threshold {}", self.papers, self.vacancies, self.threshold)
    }
}

/// The full round-by-round transcript of a tabulation, plus the final winner set.
#[derive(Clone, Serialize, Deserialize)]
pub struct Transcript<Tally: PartialEq + Clone + Display + FromStr + Debug> {
    /// name of the method used, for the report header.
    pub method_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub threshold: Option<ThresholdInfo<Tally>>,
    pub rounds: Vec<RoundRecord<Tally>>,
    pub elected: Vec<CandidateIndex>,
}

impl<Tally: PartialEq + Clone + Display + FromStr + Debug> Transcript<Tally> {
    pub fn round(&self, index: CountIndex) -> &RoundRecord<Tally> { &self.rounds[index.0] }
}
