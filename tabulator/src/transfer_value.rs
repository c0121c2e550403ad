// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use num::rational::{BigRational, ParseRatioError};
use num::{One, Zero};
use serde::{Deserialize, Serialize};

/// The fraction of a paper's value retained as it transfers through a winner,
/// held as an exact rational so that chains of multiplication (Gregory/WIGM
/// scaling) never accumulate rounding error - only the final tally conversion
/// to fixed point rounds.
#[derive(Clone, Debug, Serialize, Deserialize, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct TransferValue(pub BigRational);

impl TransferValue {
    pub fn one() -> Self { TransferValue(BigRational::one()) }
    pub fn zero() -> Self { TransferValue(BigRational::zero()) }
    pub fn is_one(&self) -> bool { self.0.is_one() }

    pub fn from_surplus_and_votes(surplus: &BigRational, votes: &BigRational) -> Self {
        if votes.is_zero() { TransferValue::zero() } else { TransferValue(surplus / votes) }
    }
}

impl Display for TransferValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for TransferValue {
    type Err = ParseRatioError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(TransferValue(s.parse()?)) }
}

impl std::ops::Mul for &TransferValue {
    type Output = TransferValue;
    fn mul(self, rhs: Self) -> Self::Output { TransferValue(&self.0 * &rhs.0) }
}

/// a rational value serialized as a string, used for fields that are exact but not
/// necessarily a transfer value per se (e.g. exhausted-excluded tallies).
pub type StringSerializedRational = TransferValue;
