// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Ballot file adapters: readers that turn external formats into an
//! [`ElectionData`], and a BLT writer for the round-trip property.

use std::collections::HashMap;
use crate::ballot::{Ballot, Ranking};
use crate::ballot_collection::BallotCollection;
use crate::candidate::{Candidate, CandidateIndex, CandidateRoster};
use crate::election::ElectionData;
use crate::error::{Result, TabulationError};

fn parse_err(line: usize, message: impl Into<String>) -> TabulationError {
    TabulationError::Parse { line, message: message.into() }
}

/// Parse a BLT/ERS-format election file. Blank lines and `#` comments are
/// ignored throughout. A collection that opens with an ID-bearing ballot is
/// in custom-ID mode: every later ballot must also carry an id.
pub fn read_blt(text: &str) -> Result<ElectionData> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| {
        let t = l.trim();
        !t.is_empty() && !t.starts_with('#')
    });

    let (header_no, header) = lines.next().ok_or_else(|| parse_err(0, "empty file"))?;
    let mut header_fields = header.split_whitespace();
    let num_candidates: usize = header_fields.next().ok_or_else(|| parse_err(header_no, "missing candidate count"))?
        .parse().map_err(|_| parse_err(header_no, "candidate count is not a number"))?;
    let num_seats: usize = header_fields.next().ok_or_else(|| parse_err(header_no, "missing seat count"))?
        .parse().map_err(|_| parse_err(header_no, "seat count is not a number"))?;
    let _ = num_seats;

    let mut withdrawn: Vec<usize> = Vec::new();
    let mut ballots = BallotCollection::new();
    let mut custom_id_mode: Option<bool> = None;

    loop {
        let (line_no, line) = lines.next().ok_or_else(|| parse_err(header_no, "unexpected end of file before ballots terminator"))?;
        let trimmed = line.trim();

        // the first ballot-section line may instead be a withdrawn-candidate line: every token a negative integer.
        if withdrawn.is_empty() && custom_id_mode.is_none() {
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if !tokens.is_empty() && tokens.iter().all(|t| t.starts_with('-') && t[1..].chars().all(|c| c.is_ascii_digit())) {
                for t in tokens {
                    let idx: i64 = t.parse().map_err(|_| parse_err(line_no, "malformed withdrawn-candidate index"))?;
                    withdrawn.push((-idx - 1) as usize);
                }
                continue;
            }
        }

        if trimmed == "0" {
            break;
        }

        let (id, rest) = if let Some(stripped) = trimmed.strip_prefix('(') {
            let close = stripped.find(')').ok_or_else(|| parse_err(line_no, "unterminated ballot id"))?;
            (Some(stripped[..close].to_string()), stripped[close + 1..].trim_start())
        } else {
            (None, trimmed)
        };

        match custom_id_mode {
            None => custom_id_mode = Some(id.is_some()),
            Some(true) if id.is_none() => return Err(parse_err(line_no, "collection is in custom-id mode; ballot is missing an id")),
            Some(false) if id.is_some() => return Err(parse_err(line_no, "collection is not in custom-id mode; ballot has an id")),
            _ => {}
        }

        let mut tokens = rest.split_whitespace();
        let weight: usize = tokens.next().ok_or_else(|| parse_err(line_no, "missing ballot weight"))?
            .parse().map_err(|_| parse_err(line_no, "ballot weight is not a number"))?;
        if id.is_some() && weight != 1 {
            return Err(parse_err(line_no, "ballots with an id must have weight 1"));
        }

        let mut rankings = Vec::new();
        for tok in tokens.by_ref() {
            if tok == "0" { break; }
            if tok == "-" {
                rankings.push(Ranking::Skip);
                continue;
            }
            if tok.contains('=') {
                let mut group = Vec::new();
                for part in tok.split('=') {
                    let raw: i64 = part.parse().map_err(|_| parse_err(line_no, "malformed equal-ranking candidate index"))?;
                    group.push(candidate_index_from_one_based(raw, num_candidates, line_no)?);
                }
                rankings.push(Ranking::Equal(group));
            } else {
                let raw: i64 = tok.parse().map_err(|_| parse_err(line_no, "malformed candidate index"))?;
                rankings.push(Ranking::Single(candidate_index_from_one_based(raw, num_candidates, line_no)?));
            }
        }

        let ballot = match &id {
            Some(id) => Ballot::with_id(rankings, id.clone()),
            None => Ballot::new(rankings),
        };
        for _ in 0..weight {
            ballots.append(ballot.clone()).map_err(|e| TabulationError::ballot_data(e.to_string()))?;
        }
    }

    let mut names = Vec::with_capacity(num_candidates);
    for _ in 0..num_candidates {
        let (line_no, line) = lines.next().ok_or_else(|| parse_err(header_no, "missing candidate name"))?;
        names.push(unquote(line.trim()).map_err(|e| parse_err(line_no, e))?);
    }
    // the title line, if present, is not otherwise used by the tabulation core.
    let _title = lines.next().map(|(_, l)| unquote(l.trim()).unwrap_or_default());

    let mut candidates: Vec<Candidate> = names.into_iter().map(Candidate::new).collect();
    for &w in &withdrawn {
        if let Some(c) = candidates.get_mut(w) { c.withdrawn = true; }
    }
    let roster = CandidateRoster { candidates };
    Ok(ElectionData::new(roster, ballots))
}

fn candidate_index_from_one_based(raw: i64, num_candidates: usize, line: usize) -> Result<CandidateIndex> {
    if raw < 1 || raw as usize > num_candidates {
        return Err(TabulationError::ballot_data(format!("candidate index {} out of range at line {}", raw, line)));
    }
    Ok(CandidateIndex((raw - 1) as usize))
}

fn unquote(s: &str) -> std::result::Result<String, String> {
    let s = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s);
    Ok(s.to_string())
}

/// Write an election in BLT format, for the load/save round-trip property.
/// Withdrawn candidates are emitted as a negative-index line even though they
/// hold no ballots in `data.ballots` - the withdrawal already happened via
/// `ElectionData::clean` upstream of whatever wrote this collection.
pub fn write_blt(data: &ElectionData, num_seats: usize, title: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", data.roster.len().0, num_seats));
    let withdrawn = data.roster.withdrawn_indices();
    if !withdrawn.is_empty() {
        let line = withdrawn.iter().map(|c| format!("-{}", c.0 + 1)).collect::<Vec<_>>().join(" ");
        out.push_str(&line);
        out.push('\n');
    }
    for slot in data.ballots.weighted_view() {
        let mut parts = vec![slot.weight.0.to_string()];
        if let Some(id) = &slot.ballot.id {
            parts[0] = format!("({}) {}", id, slot.weight.0);
        }
        for r in &slot.ballot.rankings {
            match r {
                Ranking::Single(c) => parts.push((c.0 + 1).to_string()),
                Ranking::Equal(cs) => parts.push(cs.iter().map(|c| (c.0 + 1).to_string()).collect::<Vec<_>>().join("=")),
                Ranking::Skip => parts.push("-".to_string()),
            }
        }
        parts.push("0".to_string());
        out.push_str(&parts.join(" "));
        out.push('\n');
    }
    out.push_str("0\n");
    for c in &data.roster.candidates {
        out.push_str(&format!("\"{}\"\n", c.name));
    }
    out.push_str(&format!("\"{}\"\n", title));
    out
}

/// Parse the simple text format: each line is `<names...>` (weight 1) or
/// `<weight>: <names...>`. A two-pass loader discovers the candidate set on
/// the first pass, since candidates are named rather than indexed.
pub fn read_simple_text(text: &str) -> Result<ElectionData> {
    let lines: Vec<(usize, &str)> = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()).collect();

    let mut order: Vec<String> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (line_no, line) in &lines {
        let (_, names) = split_weight(line, *line_no)?;
        for name in names {
            if !seen.contains_key(name) {
                seen.insert(name.to_string(), order.len());
                order.push(name.to_string());
            }
        }
    }

    let roster = CandidateRoster::new(order);
    let mut ballots = BallotCollection::new();
    for (line_no, line) in &lines {
        let (weight, names) = split_weight(line, *line_no)?;
        let rankings: Vec<Ranking> = names.iter().map(|n| Ranking::Single(CandidateIndex(seen[*n]))).collect();
        let ballot = Ballot::new(rankings);
        for _ in 0..weight {
            ballots.append(ballot.clone()).map_err(|e| TabulationError::ballot_data(e.to_string()))?;
        }
    }
    Ok(ElectionData::new(roster, ballots))
}

fn split_weight(line: &str, line_no: usize) -> Result<(usize, Vec<&str>)> {
    let (weight, rest) = match line.split_once(':') {
        Some((w, rest)) => (w.trim().parse().map_err(|_| parse_err(line_no, "malformed weight"))?, rest),
        None => (1usize, line),
    };
    let names: Vec<&str> = rest.split_whitespace().collect();
    if names.is_empty() {
        return Err(parse_err(line_no, "ballot line names no candidates"));
    }
    for name in &names {
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(parse_err(line_no, format!("candidate name '{}' is not alphanumeric", name)));
        }
    }
    Ok((weight, names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_blt_basic() {
        let text = r#"
3 1
5 1 2 0
3 2 3 0
4 3 1 0
1 3 2 0
0
"A"
"B"
"C"
"Test election"
"#;
        let data = read_blt(text).unwrap();
        assert_eq!(data.roster.len().0, 3);
        assert_eq!(data.ballots.total_ballots().0, 13);
    }

    #[test]
    fn test_read_blt_withdrawn_and_equal_ranking() {
        let text = "4 1\n-2\n1 1 3=4 0\n0\n\"A\"\n\"B\"\n\"C\"\n\"D\"\n\"Title\"\n";
        let data = read_blt(text).unwrap();
        assert!(data.roster.candidates[1].withdrawn);
        assert_eq!(data.ballots.weighted_view()[0].ballot.rankings, vec![Ranking::Single(CandidateIndex(0)), Ranking::Equal(vec![CandidateIndex(2), CandidateIndex(3)])]);
    }

    #[test]
    fn test_blt_round_trip() {
        let text = "3 1\n5 1 2 0\n3 2 3 0\n0\n\"A\"\n\"B\"\n\"C\"\n\"T\"\n";
        let data = read_blt(text).unwrap();
        let saved = write_blt(&data, 1, "T");
        let reloaded = read_blt(&saved).unwrap();
        let original: Vec<_> = data.ballots.positional_ballots().cloned().collect();
        let round_tripped: Vec<_> = reloaded.ballots.positional_ballots().cloned().collect();
        assert_eq!(original, round_tripped);
    }

    #[test]
    fn test_blt_round_trip_custom_id_mode() {
        let mut ballots = BallotCollection::new();
        ballots.append(Ballot::with_id(vec![Ranking::Single(CandidateIndex(0)), Ranking::Single(CandidateIndex(1))], "A001".to_string())).unwrap();
        ballots.append(Ballot::with_id(vec![Ranking::Single(CandidateIndex(1))], "A002".to_string())).unwrap();
        let roster = CandidateRoster::new(vec!["A".to_string(), "B".to_string()]);
        let data = ElectionData::new(roster, ballots);

        let saved = write_blt(&data, 1, "T");
        let reloaded = read_blt(&saved).unwrap();

        let ids: Vec<_> = reloaded.ballots.weighted_view().iter().map(|s| s.ballot.id.clone()).collect();
        assert_eq!(ids, vec![Some("A001".to_string()), Some("A002".to_string())]);
        let original: Vec<_> = data.ballots.positional_ballots().cloned().collect();
        let round_tripped: Vec<_> = reloaded.ballots.positional_ballots().cloned().collect();
        assert_eq!(original, round_tripped);
    }

    #[test]
    fn test_read_simple_text() {
        let text = "2: alice bob\ncarol alice\n";
        let data = read_simple_text(text).unwrap();
        assert_eq!(data.roster.len().0, 3);
        assert_eq!(data.ballots.total_ballots().0, 3);
    }
}
