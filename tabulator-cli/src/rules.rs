// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Named rule presets the command line exposes, each resolving to a
//! [`TabulationMethod`] with its method-specific configuration already filled in.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tabulator::methods::condorcet::CondorcetCompletion;
use tabulator::methods::stv::StvVariant;
use tabulator::methods::TabulationMethod;

#[derive(Copy, Clone, Debug)]
pub enum Rules {
    Approval,
    Borda,
    BordaCompleted,
    Sntv,
    Bucklin,
    CondorcetSsd,
    CondorcetIrv,
    CondorcetBorda,
    Cambridge,
    RandomTransfer,
    Ers97,
    NIreland,
    Scottish,
    Ftstv,
    Minneapolis,
    Gpca2000,
    Irv,
    Coombs,
    SanFrancisco,
    SupplementalVote,
    Meek,
    Warren,
    MeekNz,
    Qpq,
}

impl FromStr for Rules {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Approval" => Ok(Rules::Approval),
            "Borda" => Ok(Rules::Borda),
            "BordaCompleted" => Ok(Rules::BordaCompleted),
            "SNTV" => Ok(Rules::Sntv),
            "Bucklin" => Ok(Rules::Bucklin),
            "CondorcetSSD" => Ok(Rules::CondorcetSsd),
            "CondorcetIRV" => Ok(Rules::CondorcetIrv),
            "CondorcetBorda" => Ok(Rules::CondorcetBorda),
            "Cambridge" => Ok(Rules::Cambridge),
            "RandomTransfer" => Ok(Rules::RandomTransfer),
            "ERS97" => Ok(Rules::Ers97),
            "NIreland" => Ok(Rules::NIreland),
            "Scottish" => Ok(Rules::Scottish),
            "FTSTV" => Ok(Rules::Ftstv),
            "Minneapolis" => Ok(Rules::Minneapolis),
            "GPCA2000" => Ok(Rules::Gpca2000),
            "IRV" => Ok(Rules::Irv),
            "Coombs" => Ok(Rules::Coombs),
            "SanFrancisco" => Ok(Rules::SanFrancisco),
            "SupplementalVote" => Ok(Rules::SupplementalVote),
            "Meek" => Ok(Rules::Meek),
            "Warren" => Ok(Rules::Warren),
            "MeekNZ" => Ok(Rules::MeekNz),
            "QPQ" => Ok(Rules::Qpq),
            _ => Err("No such rule supported"),
        }
    }
}

impl Display for Rules {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rules::Approval => "Approval",
            Rules::Borda => "Borda",
            Rules::BordaCompleted => "BordaCompleted",
            Rules::Sntv => "SNTV",
            Rules::Bucklin => "Bucklin",
            Rules::CondorcetSsd => "CondorcetSSD",
            Rules::CondorcetIrv => "CondorcetIRV",
            Rules::CondorcetBorda => "CondorcetBorda",
            Rules::Cambridge => "Cambridge",
            Rules::RandomTransfer => "RandomTransfer",
            Rules::Ers97 => "ERS97",
            Rules::NIreland => "NIreland",
            Rules::Scottish => "Scottish",
            Rules::Ftstv => "FTSTV",
            Rules::Minneapolis => "Minneapolis",
            Rules::Gpca2000 => "GPCA2000",
            Rules::Irv => "IRV",
            Rules::Coombs => "Coombs",
            Rules::SanFrancisco => "SanFrancisco",
            Rules::SupplementalVote => "SupplementalVote",
            Rules::Meek => "Meek",
            Rules::Warren => "Warren",
            Rules::MeekNz => "MeekNZ",
            Rules::Qpq => "QPQ",
        };
        f.write_str(s)
    }
}

impl Rules {
    pub fn to_method(&self) -> TabulationMethod {
        match self {
            Rules::Approval => TabulationMethod::Approval,
            Rules::Borda => TabulationMethod::Borda { ballot_completion: false },
            Rules::BordaCompleted => TabulationMethod::Borda { ballot_completion: true },
            Rules::Sntv => TabulationMethod::Sntv,
            Rules::Bucklin => TabulationMethod::Bucklin,
            Rules::CondorcetSsd => TabulationMethod::Condorcet(CondorcetCompletion::SchwartzSequentialDropping),
            Rules::CondorcetIrv => TabulationMethod::Condorcet(CondorcetCompletion::IrvOnSmithSet),
            Rules::CondorcetBorda => TabulationMethod::Condorcet(CondorcetCompletion::BordaOnSmithSet),
            Rules::Cambridge => TabulationMethod::Stv(StvVariant::cambridge()),
            Rules::RandomTransfer => TabulationMethod::Stv(StvVariant::random_transfer()),
            Rules::Ers97 => TabulationMethod::Stv(StvVariant::ers97()),
            Rules::NIreland => TabulationMethod::Stv(StvVariant::n_ireland()),
            Rules::Scottish => TabulationMethod::Stv(StvVariant::scottish()),
            Rules::Ftstv => TabulationMethod::Stv(StvVariant::ftstv()),
            Rules::Minneapolis => TabulationMethod::Stv(StvVariant::minneapolis(false)),
            Rules::Gpca2000 => TabulationMethod::Stv(StvVariant::gpca2000()),
            Rules::Irv => TabulationMethod::Stv(StvVariant::irv()),
            Rules::Coombs => TabulationMethod::Stv(StvVariant::coombs()),
            Rules::SanFrancisco => TabulationMethod::Stv(StvVariant::san_francisco()),
            Rules::SupplementalVote => TabulationMethod::Stv(StvVariant::supplemental_vote()),
            Rules::Meek => TabulationMethod::Stv(StvVariant::meek()),
            Rules::Warren => TabulationMethod::Stv(StvVariant::warren()),
            Rules::MeekNz => TabulationMethod::Stv(StvVariant::meek_nz()),
            Rules::Qpq => TabulationMethod::Stv(StvVariant::qpq()),
        }
    }
}
