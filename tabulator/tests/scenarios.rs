// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Black-box scenarios run through the public API only, as a user of this
//! crate would: build a roster and a ballot collection, run a method, check
//! the transcript.

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tabulator::ballot::{Ballot, Ranking};
    use tabulator::ballot_collection::{BallotCollection, CleaningOptions};
    use tabulator::candidate::{CandidateIndex, CandidateRoster, NumberOfCandidates};
    use tabulator::config::TabulatorConfig;
    use tabulator::election::ElectionData;
    use tabulator::fixed_point::Scale;
    use tabulator::methods::condorcet::{self, CondorcetCompletion};
    use tabulator::methods::{borda, stv};
    use tabulator::methods::stv::StvVariant;

    fn roster(names: &[&str]) -> CandidateRoster {
        CandidateRoster::new(names.iter().map(|s| s.to_string()))
    }

    fn c(i: usize) -> CandidateIndex { CandidateIndex(i) }

    fn ballots_of(rankings: &[(usize, &[usize])]) -> BallotCollection {
        let mut coll = BallotCollection::new();
        for &(weight, order) in rankings {
            let ballot = Ballot::new(order.iter().map(|&i| Ranking::Single(c(i))).collect());
            for _ in 0..weight {
                coll.append(ballot.clone()).unwrap();
            }
        }
        coll
    }

    #[test]
    fn test_meek_convergence() {
        let roster = roster(&["X", "Y", "Z"]);
        let ballots = ballots_of(&[(3, &[0, 1]), (3, &[1, 0]), (1, &[2])]);
        let config = TabulatorConfig::new("meek convergence", NumberOfCandidates(2), Scale::new(6, 6));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let transcript = stv::run(&StvVariant::meek(), &roster, &ballots, &config, &mut rng, None).unwrap();

        let mut elected = transcript.elected.clone();
        elected.sort_by_key(|c| c.0);
        assert_eq!(elected, vec![c(0), c(1)]);
    }

    #[test]
    fn test_condorcet_ssd_three_way_tie() {
        let roster = roster(&["A", "B", "C"]);
        let ballots = ballots_of(&[(10, &[0, 1, 2]), (10, &[1, 2, 0]), (10, &[2, 0, 1])]);
        let config = TabulatorConfig::new("condorcet cycle", NumberOfCandidates(1), Scale::plain(0));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let transcript = condorcet::run(&roster, &ballots, &config, CondorcetCompletion::SchwartzSequentialDropping, &mut rng, None);

        assert_eq!(transcript.elected.len(), 1);
        assert!(transcript.elected[0].0 < 3);
        assert!(transcript.rounds[0].narrative[0].contains("Smith set {A,B,C}"));
    }

    #[test]
    fn test_borda_with_and_without_completion() {
        let roster = roster(&["P", "Q", "R", "S"]);
        let ballots = ballots_of(&[(1, &[0])]);
        let config = TabulatorConfig::new("borda single ballot", NumberOfCandidates(1), Scale::new(1, 0));

        let without = borda::run(&roster, &ballots, &config, false);
        let tallies = &without.rounds[0].status.tallies;
        assert_eq!(tallies.candidate[0].to_string(), "3");
        assert_eq!(tallies.candidate[1].to_string(), "0");
        assert_eq!(tallies.candidate[2].to_string(), "0");
        assert_eq!(tallies.candidate[3].to_string(), "0");
        assert_eq!(tallies.exhausted.to_string(), "3");
        assert_eq!(without.elected[0], c(0));

        let with = borda::run(&roster, &ballots, &config, true);
        let tallies = &with.rounds[0].status.tallies;
        assert_eq!(tallies.candidate[0].to_string(), "3");
        assert_eq!(tallies.candidate[1].to_string(), "1");
        assert_eq!(tallies.candidate[2].to_string(), "1");
        assert_eq!(tallies.candidate[3].to_string(), "1");
        assert_eq!(with.elected[0], c(0));
    }

    /// Withdrawing a candidate before the count, versus never having entered
    /// them in the first place, must produce the same cleaned ballots - the
    /// withdrawn candidate is placed last so the other three keep their
    /// indices across `compact_removing_withdrawn`.
    #[test]
    fn test_withdrawal_equivalence() {
        let mut roster = roster(&["A", "B", "C", "W"]);
        roster.candidates[3].withdrawn = true;
        let raw = ballots_of(&[(1, &[0, 3, 1]), (1, &[3, 1, 2]), (1, &[2, 0])]);
        let election = ElectionData::new(roster, raw);
        let config = TabulatorConfig::new("withdrawal", NumberOfCandidates(1), Scale::plain(0));

        let (cleaned_roster, cleaned_ballots) = election.clean(&config, CleaningOptions::default()).unwrap();

        let plain_roster = CandidateRoster::new(["A", "B", "C"].iter().map(|s| s.to_string()));
        let already_clean = ballots_of(&[(1, &[0, 1]), (1, &[1, 2]), (1, &[2, 0])]);

        assert_eq!(cleaned_roster.len(), plain_roster.len());
        let a: Vec<_> = cleaned_ballots.positional_ballots().map(|b| b.rankings.clone()).collect();
        let b: Vec<_> = already_clean.positional_ballots().map(|b| b.rankings.clone()).collect();
        assert_eq!(a, b);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let t1 = stv::run(&StvVariant::irv(), &cleaned_roster, &cleaned_ballots, &config, &mut rng, None).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let t2 = stv::run(&StvVariant::irv(), &plain_roster, &already_clean, &config, &mut rng, None).unwrap();
        assert_eq!(t1.elected, t2.elected);
    }
}
