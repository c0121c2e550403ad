// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! The winning threshold for STV family methods, parameterised by three
//! orthogonal choices. The numbers here are quota-like: a candidate whose tally
//! reaches or exceeds the threshold is declared a winner.

use serde::{Deserialize, Serialize};
use crate::ballot_collection::BallotPaperCount;
use crate::fixed_point::{FixedPoint, Scale};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum NumeratorBase {
    /// `floor(papers/(seats+1)) + 1`
    Droop,
    /// `floor(papers/seats)` (no +1; used by some Hare-quota variants)
    Hare,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Dynamics {
    /// the numerator is fixed at the first-count total.
    Static,
    /// the numerator is reduced each round by the exhausted vote so far.
    Dynamic,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Form {
    /// round down to a whole vote, i.e. the smallest multiple of one whole vote
    /// strictly greater than the raw quotient.
    Whole,
    /// the smallest representable fractional amount greater than the raw quotient.
    Fractional,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub numerator_base: NumeratorBase,
    pub dynamics: Dynamics,
    pub form: Form,
    /// ERS97's special case: once the first winner is declared, the quota stops
    /// being recomputed and is frozen at its then-current value.
    pub freeze_after_first_winner: bool,
}

impl ThresholdPolicy {
    pub fn droop_static_whole() -> Self {
        ThresholdPolicy { numerator_base: NumeratorBase::Droop, dynamics: Dynamics::Static, form: Form::Whole, freeze_after_first_winner: false }
    }

    pub fn droop_dynamic_fractional() -> Self {
        ThresholdPolicy { numerator_base: NumeratorBase::Droop, dynamics: Dynamics::Dynamic, form: Form::Fractional, freeze_after_first_winner: false }
    }

    /// compute the threshold given the total first-preference papers, the running
    /// exhausted-vote tally (only used under `Dynamics::Dynamic`), and the number
    /// of seats. Done in exact scaled-integer arithmetic throughout, as befits a
    /// deterministic audit trail - no floating point involved.
    pub fn compute(&self, total_papers: BallotPaperCount, exhausted: FixedPoint, seats: usize, scale: Scale) -> FixedPoint {
        let effective_papers = match self.dynamics {
            Dynamics::Static => scale.from_usize(total_papers.0),
            Dynamics::Dynamic => scale.from_usize(total_papers.0) - exhausted,
        };
        let divisor = match self.numerator_base {
            NumeratorBase::Droop => seats + 1,
            NumeratorBase::Hare => seats,
        } as u64;
        let raw_scaled = effective_papers.scaled_raw() / divisor; // floor at full representable precision
        let p = scale.one().scaled_raw();
        let result_scaled = match self.form {
            Form::Whole => (raw_scaled / p + 1) * p,
            Form::Fractional => raw_scaled + 1,
        };
        FixedPoint::from_scaled_raw(result_scaled, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_droop_whole_quota() {
        let policy = ThresholdPolicy::droop_static_whole();
        let scale = Scale::plain(0);
        let t = policy.compute(BallotPaperCount(25), scale.zero(), 2, scale);
        assert_eq!(t.to_string(), "9"); // floor(25/3)+1 = 9
    }
}
