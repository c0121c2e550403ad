// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

use std::path::PathBuf;
use anyhow::anyhow;
use clap::Parser;
use rand::SeedableRng;
use tabulator::ballot_collection::CleaningOptions;
use tabulator::candidate::NumberOfCandidates;
use tabulator::config::TabulatorConfig;
use tabulator::fixed_point::Scale;
use tabulator_cli::load_election_data;
use tabulator_cli::rules::Rules;

#[derive(Parser)]
#[command(version, author = "Andrew Conway", about = "Count preferential-voting elections using a variety of tabulation rules.")]
struct Opts {
    /// The counting rules to use, e.g. Meek, ERS97, Scottish, IRV, Borda, Approval, CondorcetSSD.
    rules: Rules,

    /// The ballot file to count: .blt/.stv (BLT/ERS format), .txt (simple text format),
    /// or a previously-saved ElectionData JSON document.
    votes: PathBuf,

    /// The number of people to elect. If omitted, defaults to one less than the candidate count.
    #[arg(short, long)]
    vacancies: Option<usize>,

    /// Where to write the round-by-round transcript JSON.
    /// Defaults to `<votes>_<rules>.transcript.json`.
    #[arg(short, long)]
    transcript: Option<PathBuf>,

    /// Decimal digits of precision for fixed-point vote tallies.
    #[arg(long, default_value_t = 6)]
    precision: u32,

    /// Additional guard digits for quasi-exact equality (used by recursive keep-factor methods).
    #[arg(long, default_value_t = 0)]
    guard: u32,

    /// Random seed for tie-breaking, for reproducible counts.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let opt = Opts::parse();

    let election = load_election_data(&opt.votes)?;
    let num_candidates = election.roster.len();
    let vacancies = opt.vacancies.unwrap_or_else(|| num_candidates.0.saturating_sub(1).max(1));

    let scale = Scale::new(opt.precision, opt.guard);
    let title = opt.votes.file_name().map(|o| o.to_string_lossy().to_string()).unwrap_or_default();
    let config = TabulatorConfig::new(title, NumberOfCandidates(vacancies), scale);

    let method = opt.rules.to_method();
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(opt.seed);
    let transcript = tabulator::methods::run(&method, &election, &config, CleaningOptions::default(), &mut rng, None)
        .map_err(|e| anyhow!("tabulation failed: {e}"))?;

    let transcript_file = match &opt.transcript {
        Some(tf) => tf.clone(),
        None => {
            let votename = opt.votes.file_name().map(|o| o.to_string_lossy()).unwrap_or_default();
            let votename = votename.trim_end_matches(".blt").trim_end_matches(".stv").trim_end_matches(".txt");
            let combined = format!("{}_{}.transcript.json", votename, opt.rules);
            opt.votes.with_file_name(combined)
        }
    };

    if let Some(parent) = transcript_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    serde_json::to_writer_pretty(std::fs::File::create(&transcript_file)?, &transcript)?;
    println!("Elected: {:?}", transcript.elected.iter().map(|c| election.roster.name(*c)).collect::<Vec<_>>());
    println!("Transcript written to {}", transcript_file.display());

    Ok(())
}
