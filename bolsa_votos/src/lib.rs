/*!
Comparison of the 2022 Brazilian presidential runoff with the payments of the
Bolsa Família program, state by state.

The computations are pure functions over the records loaded by the `bolsavotos`
program:

- [prepare] filters the votes, groups both tables by state and joins them,
- [summarize] and [margin_report] compute the national results,
- [rank_states] computes the margin between the two candidates in every state,
- [correlate] computes, for every candidate, the correlation between the votes
  received in a state and the amount paid in that state.

See the [manual] for the input files and the configuration of the program.
*/

mod config;
pub mod builder;
pub mod manual;

use log::{debug, info, warn};

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    ops::{Add, AddAssign},
};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct StateId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

/// Dictionary of all the strings used as keys, shared between the two tables.
///
/// Equal strings always get the same code, so the group-by and the join only compare
/// integers.
#[derive(Debug, Default)]
struct Categories {
    codes: HashMap<String, u32>,
    names: Vec<String>,
}

impl Categories {
    fn encode(&mut self, name: &str) -> u32 {
        if let Some(code) = self.codes.get(name) {
            return *code;
        }
        let code = self.names.len() as u32;
        self.names.push(name.to_string());
        self.codes.insert(name.to_string(), code);
        code
    }

    // Codes only come from encode()
    fn decode(&self, code: u32) -> &str {
        self.names[code as usize].as_str()
    }
}

fn join_key<'a>(state: &'a str, table: &str) -> Result<&'a str, AnalysisErrors> {
    let key = state.trim();
    if key.is_empty() {
        return Err(AnalysisErrors::DataShape {
            detail: format!("empty state code in the {} table, cannot join on it", table),
        });
    }
    Ok(key)
}

/// Builds the analysis table out of the raw records.
///
/// The votes are restricted to the round and the candidates given by the rules,
/// then the votes are summed by state and candidate, and the payments by state.
/// Only the states present in both tables are kept.
///
/// The rows are sorted by state, then by candidate.
pub fn prepare(
    votes: &[RawVoteRecord],
    welfare: &[RawWelfareRecord],
    rules: &AnalysisRules,
) -> Result<Vec<JoinedRow>, AnalysisErrors> {
    info!(
        "Processing {:?} vote records and {:?} welfare records, rules: {:?}",
        votes.len(),
        welfare.len(),
        rules
    );
    let codes: HashSet<u32> = rules.candidate_codes.iter().cloned().collect();
    let mut categories = Categories::default();

    let mut vote_groups: HashMap<(StateId, CandidateId), VoteCount> = HashMap::new();
    let mut filtered_out: usize = 0;
    for v in votes.iter() {
        if v.turn != rules.turn || !codes.contains(&v.candidate_code) {
            filtered_out += 1;
            continue;
        }
        let sid = StateId(categories.encode(join_key(&v.state, "votes")?));
        let cid = CandidateId(categories.encode(v.candidate_name.trim()));
        *vote_groups.entry((sid, cid)).or_insert(VoteCount::EMPTY) += VoteCount(v.votes);
    }
    debug!(
        "prepare: {:?} vote records filtered out, {:?} (state, candidate) groups",
        filtered_out,
        vote_groups.len()
    );

    let mut welfare_groups: HashMap<StateId, f64> = HashMap::new();
    for w in welfare.iter() {
        let sid = StateId(categories.encode(join_key(&w.state, "welfare")?));
        *welfare_groups.entry(sid).or_insert(0.0) += w.amount;
    }
    debug!("prepare: {:?} welfare groups", welfare_groups.len());

    let mut res: Vec<JoinedRow> = Vec::new();
    let mut vote_states: HashSet<StateId> = HashSet::new();
    let mut missing_welfare: BTreeSet<&str> = BTreeSet::new();
    for (&(sid, cid), &count) in vote_groups.iter() {
        vote_states.insert(sid);
        match welfare_groups.get(&sid) {
            Some(amount) => res.push(JoinedRow {
                state: categories.decode(sid.0).to_string(),
                candidate: categories.decode(cid.0).to_string(),
                votes: count.0,
                amount: *amount,
            }),
            None => {
                missing_welfare.insert(categories.decode(sid.0));
            }
        }
    }
    let missing_votes: BTreeSet<&str> = welfare_groups
        .keys()
        .filter(|sid| !vote_states.contains(*sid))
        .map(|sid| categories.decode(sid.0))
        .collect();
    if !missing_welfare.is_empty() {
        info!("States without welfare payments, left out: {:?}", missing_welfare);
    }
    if !missing_votes.is_empty() {
        info!("States without votes, left out: {:?}", missing_votes);
    }

    res.sort_by(|r1, r2| {
        r1.state
            .cmp(&r2.state)
            .then_with(|| r1.candidate.cmp(&r2.candidate))
    });
    info!("Prepared {:?} joined rows", res.len());
    Ok(res)
}

fn share(part: f64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part / (total as f64) * 100.0
    }
}

/// National number of votes for every candidate.
///
/// The percentages are relative to the votes of the candidates present in the rows,
/// not to all the votes cast in the country.
pub fn summarize(rows: &[JoinedRow]) -> NationalSummary {
    let mut by_candidate: HashMap<&str, VoteCount> = HashMap::new();
    for r in rows.iter() {
        *by_candidate
            .entry(r.candidate.as_str())
            .or_insert(VoteCount::EMPTY) += VoteCount(r.votes);
    }
    let total: VoteCount = by_candidate.values().cloned().sum();

    let mut sorted: Vec<(&str, VoteCount)> = by_candidate.into_iter().collect();
    sorted.sort_by(|(n1, c1), (n2, c2)| c2.cmp(c1).then_with(|| n1.cmp(n2)));

    let totals: Vec<CandidateTotal> = sorted
        .iter()
        .map(|(name, count)| CandidateTotal {
            candidate: name.to_string(),
            total_votes: count.0,
            percentage: share(count.0 as f64, total.0),
        })
        .collect();
    debug!("summarize: totals: {:?}", totals);
    NationalSummary {
        totals,
        total_valid_votes: total.0,
    }
}

fn find_total<'a>(
    summary: &'a NationalSummary,
    selector: &CandidateSelector,
) -> Result<&'a CandidateTotal, AnalysisErrors> {
    summary
        .totals
        .iter()
        .find(|t| selector.matches(&t.candidate))
        .ok_or_else(|| AnalysisErrors::CandidateNotFound {
            pattern: selector.pattern.clone(),
        })
}

/// The national difference of votes between the two candidates of the rules.
pub fn margin_report(
    summary: &NationalSummary,
    rules: &AnalysisRules,
) -> Result<MarginReport, AnalysisErrors> {
    if summary.totals.len() != 2 {
        warn!(
            "margin_report: expected 2 candidates in the summary, found {:?}",
            summary.totals.len()
        );
    }
    let first = find_total(summary, &rules.candidate_a)?;
    let second = find_total(summary, &rules.candidate_b)?;
    let absolute_margin = first.total_votes as i64 - second.total_votes as i64;
    Ok(MarginReport {
        first: first.candidate.clone(),
        first_votes: first.total_votes,
        second: second.candidate.clone(),
        second_votes: second.total_votes,
        absolute_margin,
        percentage_margin: share(absolute_margin as f64, summary.total_valid_votes),
        total_valid_votes: summary.total_valid_votes,
    })
}

/// Ranks the states by the margin of the first candidate over the second one.
///
/// Every state gets the first number of votes found for each candidate. The states
/// in which one candidate is absent follow the missing candidate policy of the
/// rules.
pub fn rank_states(
    rows: &[JoinedRow],
    rules: &AnalysisRules,
) -> Result<StateRanking, AnalysisErrors> {
    for selector in [&rules.candidate_a, &rules.candidate_b] {
        if !rows.iter().any(|r| selector.matches(&r.candidate)) {
            return Err(AnalysisErrors::CandidateNotFound {
                pattern: selector.pattern.clone(),
            });
        }
    }

    let mut pivot: BTreeMap<&str, (Option<u64>, Option<u64>)> = BTreeMap::new();
    for r in rows.iter() {
        let is_a = rules.candidate_a.matches(&r.candidate);
        let is_b = !is_a && rules.candidate_b.matches(&r.candidate);
        if !is_a && !is_b {
            continue;
        }
        let cols = pivot.entry(r.state.as_str()).or_insert((None, None));
        let col = if is_a { &mut cols.0 } else { &mut cols.1 };
        if col.is_none() {
            *col = Some(r.votes);
        }
    }
    debug!("rank_states: pivot: {:?}", pivot);

    let mut ranking = StateRanking {
        winners_a: Vec::new(),
        winners_b: Vec::new(),
        ties: Vec::new(),
        dropped: Vec::new(),
    };
    for (state, cols) in pivot {
        let (votes_a, votes_b) = match (cols, rules.missing_candidate_policy) {
            ((Some(a), Some(b)), _) => (a, b),
            ((a, b), MissingCandidatePolicy::TreatAsZero) => (a.unwrap_or(0), b.unwrap_or(0)),
            ((a, _), MissingCandidatePolicy::DropState) => {
                let absent = if a.is_none() {
                    &rules.candidate_a.label
                } else {
                    &rules.candidate_b.label
                };
                warn!("rank_states: no votes for {} in {}, dropping the state", absent, state);
                ranking.dropped.push(state.to_string());
                continue;
            }
        };
        let margin = votes_a as i64 - votes_b as i64;
        let sm = StateMargin {
            state: state.to_string(),
            margin,
        };
        match margin.cmp(&0) {
            Ordering::Greater => ranking.winners_a.push(sm),
            Ordering::Less => ranking.winners_b.push(sm),
            Ordering::Equal => ranking.ties.push(sm.state),
        }
    }

    ranking
        .winners_a
        .sort_by(|s1, s2| s2.margin.cmp(&s1.margin).then_with(|| s1.state.cmp(&s2.state)));
    ranking
        .winners_b
        .sort_by(|s1, s2| s1.margin.cmp(&s2.margin).then_with(|| s1.state.cmp(&s2.state)));
    info!(
        "Ranked states: {} won {:?}, {} won {:?}, ties {:?}, dropped {:?}",
        rules.candidate_a.label,
        ranking.winners_a.len(),
        rules.candidate_b.label,
        ranking.winners_b.len(),
        ranking.ties.len(),
        ranking.dropped.len()
    );
    Ok(ranking)
}

/// The Pearson correlation coefficient between the votes of each candidate and the
/// amount paid, across the states in which the candidate appears.
///
/// Fails on the first candidate (in name order) for which the coefficient does not
/// exist.
pub fn correlate(rows: &[JoinedRow]) -> Result<BTreeMap<String, f64>, AnalysisErrors> {
    let mut by_candidate: BTreeMap<&str, Vec<&JoinedRow>> = BTreeMap::new();
    for r in rows.iter() {
        by_candidate.entry(r.candidate.as_str()).or_default().push(r);
    }

    let mut res: BTreeMap<String, f64> = BTreeMap::new();
    for (candidate, mut cand_rows) in by_candidate {
        cand_rows.sort_by(|r1, r2| r1.state.cmp(&r2.state));
        let votes: Vec<f64> = cand_rows.iter().map(|r| r.votes as f64).collect();
        let amounts: Vec<f64> = cand_rows.iter().map(|r| r.amount).collect();
        let coefficient =
            pearson(&votes, &amounts).map_err(|reason| AnalysisErrors::CorrelationUndefined {
                candidate: candidate.to_string(),
                reason,
            })?;
        info!("Correlation for {}: {:.3}", candidate, coefficient);
        res.insert(candidate.to_string(), coefficient);
    }
    Ok(res)
}

/// Pearson's correlation coefficient of two series of the same length.
///
/// `xs` holds the votes and `ys` the paid amounts; the error tells which one is
/// degenerate.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64, DegenerateInput> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Err(DegenerateInput::TooFewStates(n));
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    // The mean of a constant series is not always exactly that constant.
    if xs.iter().all(|x| *x == xs[0]) {
        return Err(DegenerateInput::ConstantVotes);
    }
    if ys.iter().all(|y| *y == ys[0]) {
        return Err(DegenerateInput::ConstantAmounts);
    }
    let mean_x: f64 = xs.iter().sum::<f64>() / n as f64;
    let mean_y: f64 = ys.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let r = sxy / (sxx * syy).sqrt();
    if !r.is_finite() {
        return Err(DegenerateInput::NonFinite);
    }
    Ok(r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::builder::Builder;
    use super::*;

    const LULA: &str = "LUIZ INÁCIO LULA DA SILVA";
    const BOLSONARO: &str = "JAIR MESSIAS BOLSONARO";

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sp_rj() -> Builder {
        let mut b = Builder::new(&AnalysisRules::runoff_2022());
        b.add_votes(2, 13, "SP", LULA, 1000)
            .add_votes(2, 22, "SP", BOLSONARO, 800)
            .add_votes(2, 13, "RJ", LULA, 600)
            .add_votes(2, 22, "RJ", BOLSONARO, 900)
            .add_payment("SP", 500.0)
            .add_payment("RJ", 300.0);
        b
    }

    fn row(state: &str, candidate: &str, votes: u64, amount: f64) -> JoinedRow {
        JoinedRow {
            state: state.to_string(),
            candidate: candidate.to_string(),
            votes,
            amount,
        }
    }

    #[test]
    fn prepare_groups_and_joins() {
        init();
        let mut b = sp_rj();
        b.add_votes(2, 13, "SP", LULA, 50)
            .add_payment("SP", 100.0)
            .add_payment("SP", 25.5);
        let rows = b.prepare().unwrap();
        assert_eq!(
            rows,
            vec![
                row("RJ", BOLSONARO, 900, 300.0),
                row("RJ", LULA, 600, 300.0),
                row("SP", BOLSONARO, 800, 625.5),
                row("SP", LULA, 1050, 625.5),
            ]
        );
    }

    #[test]
    fn prepare_has_no_duplicate_keys() {
        let mut b = sp_rj();
        for state in ["SP", "RJ", "MG", "SP", "MG"] {
            b.add_votes(2, 13, state, LULA, 7)
                .add_votes(2, 22, state, BOLSONARO, 3)
                .add_payment(state, 1.0);
        }
        let rows = b.prepare().unwrap();
        let keys: HashSet<(String, String)> = rows
            .iter()
            .map(|r| (r.state.clone(), r.candidate.clone()))
            .collect();
        assert_eq!(keys.len(), rows.len());
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn prepare_filters_turn_and_codes() {
        let mut b = sp_rj();
        b.add_votes(1, 13, "SP", LULA, 1_000_000)
            .add_votes(2, 99, "SP", "NULO", 5_000)
            .add_votes(1, 99, "MG", "BRANCO", 12)
            .add_payment("MG", 42.0);
        let rows = b.prepare().unwrap();
        assert!(rows.iter().all(|r| r.candidate != "NULO" && r.candidate != "BRANCO"));
        assert!(rows.iter().all(|r| r.state != "MG"));
        let sp_lula = rows
            .iter()
            .find(|r| r.state == "SP" && r.candidate == LULA)
            .unwrap();
        assert_eq!(sp_lula.votes, 1000);
    }

    #[test]
    fn prepare_inner_join_drops_unmatched_states() {
        let mut b = sp_rj();
        b.add_votes(2, 13, "ZZ", LULA, 300)
            .add_votes(2, 22, "ZZ", BOLSONARO, 400)
            .add_payment("DF", 80.0);
        let rows = b.prepare().unwrap();
        let states: BTreeSet<&str> = rows.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, ["RJ", "SP"].into_iter().collect());
    }

    #[test]
    fn prepare_trims_join_keys() {
        let mut b = Builder::new(&AnalysisRules::default());
        b.add_votes(2, 13, " BA ", LULA, 10).add_payment("BA", 2.0);
        let rows = b.prepare().unwrap();
        assert_eq!(rows, vec![row("BA", LULA, 10, 2.0)]);
    }

    #[test]
    fn prepare_rejects_empty_state() {
        let mut b = sp_rj();
        b.add_payment("  ", 3.0);
        match b.prepare() {
            Err(AnalysisErrors::DataShape { detail }) => assert!(detail.contains("welfare")),
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn prepare_is_idempotent() {
        let b = sp_rj();
        let first = b.prepare().unwrap();
        let second = b.prepare().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn categories_share_codes() {
        let mut c = Categories::default();
        let sp = c.encode("SP");
        let rj = c.encode("RJ");
        assert_ne!(sp, rj);
        assert_eq!(c.encode("SP"), sp);
        assert_eq!(c.decode(rj), "RJ");
    }

    #[test]
    fn summarize_totals() {
        let rows = sp_rj().prepare().unwrap();
        let summary = summarize(&rows);
        assert_eq!(summary.total_valid_votes, 3300);
        assert_eq!(summary.totals[0].candidate, BOLSONARO);
        assert_eq!(summary.totals[0].total_votes, 1700);
        assert_eq!(summary.totals[1].candidate, LULA);
        assert_eq!(summary.totals[1].total_votes, 1600);
        let sum_votes: u64 = summary.totals.iter().map(|t| t.total_votes).sum();
        assert_eq!(sum_votes, summary.total_valid_votes);
        let sum_pct: f64 = summary.totals.iter().map(|t| t.percentage).sum();
        assert!((sum_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn summarize_empty() {
        let summary = summarize(&[]);
        assert!(summary.totals.is_empty());
        assert_eq!(summary.total_valid_votes, 0);
    }

    #[test]
    fn margin_report_national() {
        let rows = sp_rj().prepare().unwrap();
        let report = margin_report(&summarize(&rows), &AnalysisRules::runoff_2022()).unwrap();
        assert_eq!(report.first, LULA);
        assert_eq!(report.second, BOLSONARO);
        assert_eq!(report.absolute_margin, -100);
        assert!((report.percentage_margin - (-100.0 / 3300.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn margin_report_missing_candidate() {
        let rows = vec![row("SP", LULA, 10, 1.0)];
        let res = margin_report(&summarize(&rows), &AnalysisRules::runoff_2022());
        assert_eq!(
            res,
            Err(AnalysisErrors::CandidateNotFound {
                pattern: "BOLSONARO".to_string()
            })
        );
    }

    #[test]
    fn rank_states_sp_rj() {
        let rows = sp_rj().prepare().unwrap();
        let ranking = rank_states(&rows, &AnalysisRules::runoff_2022()).unwrap();
        assert_eq!(
            ranking.winners_a,
            vec![StateMargin {
                state: "SP".to_string(),
                margin: 200
            }]
        );
        assert_eq!(
            ranking.winners_b,
            vec![StateMargin {
                state: "RJ".to_string(),
                margin: -300
            }]
        );
        assert!(ranking.ties.is_empty());
        assert!(ranking.dropped.is_empty());
    }

    #[test]
    fn rank_states_order_and_ties() {
        let rows = vec![
            row("BA", LULA, 900, 1.0),
            row("BA", BOLSONARO, 100, 1.0),
            row("PE", LULA, 300, 1.0),
            row("PE", BOLSONARO, 200, 1.0),
            row("SC", LULA, 100, 1.0),
            row("SC", BOLSONARO, 700, 1.0),
            row("PR", LULA, 100, 1.0),
            row("PR", BOLSONARO, 300, 1.0),
            row("AP", LULA, 50, 1.0),
            row("AP", BOLSONARO, 50, 1.0),
        ];
        let ranking = rank_states(&rows, &AnalysisRules::runoff_2022()).unwrap();
        let a: Vec<(&str, i64)> = ranking
            .winners_a
            .iter()
            .map(|s| (s.state.as_str(), s.margin))
            .collect();
        let b: Vec<(&str, i64)> = ranking
            .winners_b
            .iter()
            .map(|s| (s.state.as_str(), s.margin))
            .collect();
        assert_eq!(a, vec![("BA", 800), ("PE", 100)]);
        assert_eq!(b, vec![("SC", -600), ("PR", -200)]);
        assert_eq!(ranking.ties, vec!["AP".to_string()]);
        let diverging: Vec<i64> = ranking.diverging().iter().map(|s| s.margin).collect();
        assert_eq!(diverging, vec![-600, -200, 0, 100, 800]);
    }

    #[test]
    fn rank_states_missing_side_dropped() {
        let rows = vec![
            row("SP", LULA, 1000, 1.0),
            row("SP", BOLSONARO, 800, 1.0),
            row("AC", BOLSONARO, 400, 1.0),
        ];
        let ranking = rank_states(&rows, &AnalysisRules::runoff_2022()).unwrap();
        assert_eq!(ranking.dropped, vec!["AC".to_string()]);
        assert_eq!(ranking.winners_a.len(), 1);
        assert!(ranking.winners_b.is_empty());
    }

    #[test]
    fn rank_states_missing_side_as_zero() {
        let rows = vec![
            row("SP", LULA, 1000, 1.0),
            row("SP", BOLSONARO, 800, 1.0),
            row("AC", BOLSONARO, 400, 1.0),
            row("PI", LULA, 30, 1.0),
        ];
        let mut rules = AnalysisRules::runoff_2022();
        rules.missing_candidate_policy = MissingCandidatePolicy::TreatAsZero;
        let ranking = rank_states(&rows, &rules).unwrap();
        assert!(ranking.dropped.is_empty());
        assert_eq!(
            ranking.winners_b,
            vec![StateMargin {
                state: "AC".to_string(),
                margin: -400
            }]
        );
        let a: Vec<&str> = ranking.winners_a.iter().map(|s| s.state.as_str()).collect();
        assert_eq!(a, vec!["SP", "PI"]);
    }

    #[test]
    fn rank_states_candidate_absent() {
        let rows = vec![row("SP", LULA, 1000, 1.0)];
        assert_eq!(
            rank_states(&rows, &AnalysisRules::runoff_2022()),
            Err(AnalysisErrors::CandidateNotFound {
                pattern: "BOLSONARO".to_string()
            })
        );
    }

    #[test]
    fn correlate_linear() {
        let rows = vec![
            row("SP", LULA, 100, 10.0),
            row("RJ", LULA, 200, 20.0),
            row("SP", BOLSONARO, 100, 20.0),
            row("RJ", BOLSONARO, 200, 10.0),
        ];
        let corr = correlate(&rows).unwrap();
        assert!((corr[LULA] - 1.0).abs() < 1e-12);
        assert!((corr[BOLSONARO] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlate_single_state() {
        let rows = vec![row("SP", LULA, 100, 10.0)];
        assert_eq!(
            correlate(&rows),
            Err(AnalysisErrors::CorrelationUndefined {
                candidate: LULA.to_string(),
                reason: DegenerateInput::TooFewStates(1)
            })
        );
    }

    #[test]
    fn correlate_constant_amounts() {
        let rows = vec![
            row("SP", LULA, 100, 10.0),
            row("RJ", LULA, 300, 10.0),
            row("MG", LULA, 200, 10.0),
        ];
        match correlate(&rows) {
            Err(AnalysisErrors::CorrelationUndefined { reason, .. }) => {
                assert_eq!(reason, DegenerateInput::ConstantAmounts)
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn pearson_values() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0]).unwrap();
        assert!((r - 0.6).abs() < 1e-12);
        assert_eq!(
            pearson(&[5.0, 5.0], &[1.0, 2.0]),
            Err(DegenerateInput::ConstantVotes)
        );
        assert_eq!(pearson(&[], &[]), Err(DegenerateInput::TooFewStates(0)));
    }

    #[test]
    fn constant_amounts_with_inexact_mean() {
        assert_eq!(
            pearson(&[1.0, 2.0, 4.0], &[0.1, 0.1, 0.1]),
            Err(DegenerateInput::ConstantAmounts)
        );
        assert_eq!(
            pearson(&[0.1, 0.1, 0.1], &[1.0, 2.0, 4.0]),
            Err(DegenerateInput::ConstantVotes)
        );
        let rows = vec![
            row("SP", LULA, 1, 0.1),
            row("RJ", LULA, 2, 0.1),
            row("MG", LULA, 4, 0.1),
        ];
        assert_eq!(
            correlate(&rows),
            Err(AnalysisErrors::CorrelationUndefined {
                candidate: LULA.to_string(),
                reason: DegenerateInput::ConstantAmounts
            })
        );
    }
}
