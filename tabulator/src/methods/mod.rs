// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! The family of tabulation methods. A method is a tagged value, not a trait
//! object: `TabulationMethod` selects which function in this module tree runs,
//! and carries just the configuration that method needs. This replaces a deep
//! generic rules hierarchy with a small enum plus a handful of composable
//! policy enums (see `stv::SurplusTransferPolicy`, `stv::EliminationPolicy`).

pub mod approval;
pub mod borda;
pub mod sntv;
pub mod bucklin;
pub mod condorcet;
pub mod stv;

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::candidate::CandidateRoster;
use crate::config::TabulatorConfig;
use crate::election::ElectionData;
use crate::error::Result;
use crate::fixed_point::FixedPoint;
use crate::tie_resolution::TieBreakChannel;
use crate::transcript::Transcript;
use condorcet::CondorcetCompletion;
use stv::StvVariant;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TabulationMethod {
    Approval,
    Borda { ballot_completion: bool },
    Sntv,
    Bucklin,
    Condorcet(CondorcetCompletion),
    Stv(StvVariant),
}

impl fmt::Display for TabulationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabulationMethod::Approval => write!(f, "Approval"),
            TabulationMethod::Borda { ballot_completion } => write!(f, "Borda{}", if *ballot_completion { " (completed)" } else { "" }),
            TabulationMethod::Sntv => write!(f, "SNTV"),
            TabulationMethod::Bucklin => write!(f, "Bucklin"),
            TabulationMethod::Condorcet(c) => write!(f, "Condorcet({:?})", c),
            TabulationMethod::Stv(v) => write!(f, "{}", v),
        }
    }
}

/// Run a tabulation end to end: clean the supplied election data under the
/// given cleaning options, then dispatch to the chosen method.
pub fn run(
    method: &TabulationMethod,
    election: &ElectionData,
    config: &TabulatorConfig,
    cleaning: crate::ballot_collection::CleaningOptions,
    rng: &mut impl rand::RngCore,
    tie_channel: Option<&TieBreakChannel>,
) -> Result<Transcript<FixedPoint>> {
    let (roster, ballots) = election.clean(config, cleaning)?;
    match method {
        TabulationMethod::Approval => Ok(approval::run(&roster, &ballots, config, rng, tie_channel)),
        TabulationMethod::Borda { ballot_completion } => Ok(borda::run(&roster, &ballots, config, *ballot_completion)),
        TabulationMethod::Sntv => Ok(sntv::run(&roster, &ballots, config, rng, tie_channel)),
        TabulationMethod::Bucklin => Ok(bucklin::run(&roster, &ballots, config, rng, tie_channel)),
        TabulationMethod::Condorcet(completion) => Ok(condorcet::run(&roster, &ballots, config, *completion, rng, tie_channel)),
        TabulationMethod::Stv(variant) => stv::run(variant, &roster, &ballots, config, rng, tie_channel),
    }
}

/// shared helper: the set of all candidate indices on the roster.
pub(crate) fn all_candidates(roster: &CandidateRoster) -> Vec<crate::candidate::CandidateIndex> {
    (0..roster.len().0).map(crate::candidate::CandidateIndex).collect()
}
