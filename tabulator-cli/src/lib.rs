// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Glue between the file formats a user hands this tool (BLT, simple text,
//! or a previously-saved JSON `ElectionData`) and the tabulation core.

use std::path::Path;
use anyhow::{anyhow, Context};
use tabulator::election::ElectionData;

pub mod rules;

/// Load an [`ElectionData`] by sniffing the file extension: `.blt`/`.stv`
/// for the BLT/ERS format, `.txt` for the simple text format, anything else
/// is assumed to be a previously-saved `ElectionData` JSON document.
pub fn load_election_data(path: &Path) -> anyhow::Result<ElectionData> {
    let text_based = matches!(path.extension().and_then(|e| e.to_str()), Some("blt") | Some("stv") | Some("txt"));
    if text_based {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("txt") => Ok(tabulator::formats::read_simple_text(&text)?),
            _ => Ok(tabulator::formats::read_blt(&text)?),
        }
    } else {
        let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
        serde_json::from_reader(file).map_err(|e| anyhow!("parsing {} as election JSON: {e}", path.display()))
    }
}
