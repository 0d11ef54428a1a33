// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One line of the electoral results file (one voting section, one candidate).
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RawVoteRecord {
    /// The round of the election (`NR_TURNO`).
    pub turn: u32,
    /// The number of the candidate on the ballot (`NR_VOTAVEL`).
    pub candidate_code: u32,
    /// The state code (`SG_UF`).
    pub state: String,
    /// The name of the candidate (`NM_VOTAVEL`).
    pub candidate_name: String,
    /// The number of votes (`QT_VOTOS`).
    pub votes: u64,
}

/// One payment of the welfare program.
#[derive(PartialEq, Debug, Clone)]
pub struct RawWelfareRecord {
    /// The state code (`UF`).
    pub state: String,
    /// The amount paid (`VALOR PARCELA`).
    pub amount: f64,
}

// ******** Output data structures *********

/// The votes of one candidate in one state, next to the total paid in that state.
#[derive(PartialEq, Debug, Clone)]
pub struct JoinedRow {
    pub state: String,
    pub candidate: String,
    pub votes: u64,
    pub amount: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CandidateTotal {
    pub candidate: String,
    pub total_votes: u64,
    /// Share of the votes cast for the selected candidates only, in percent.
    pub percentage: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct NationalSummary {
    /// Sorted by decreasing number of votes.
    pub totals: Vec<CandidateTotal>,
    pub total_valid_votes: u64,
}

/// Difference between the two tracked candidates at the national level.
#[derive(PartialEq, Debug, Clone)]
pub struct MarginReport {
    pub first: String,
    pub first_votes: u64,
    pub second: String,
    pub second_votes: u64,
    /// first - second
    pub absolute_margin: i64,
    /// The absolute margin as a share of the valid votes, in percent.
    pub percentage_margin: f64,
    pub total_valid_votes: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StateMargin {
    pub state: String,
    /// Votes of the first candidate minus votes of the second one.
    pub margin: i64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StateRanking {
    /// States won by the first candidate, largest margin first.
    pub winners_a: Vec<StateMargin>,
    /// States won by the second candidate, largest loss first.
    pub winners_b: Vec<StateMargin>,
    /// States with exactly the same number of votes for both.
    pub ties: Vec<String>,
    /// States left out because one of the candidates had no votes recorded there.
    pub dropped: Vec<String>,
}

impl StateRanking {
    /// All the ranked states, from the largest loss to the largest win of the first
    /// candidate.
    pub fn diverging(&self) -> Vec<StateMargin> {
        let mut res: Vec<StateMargin> = self.winners_b.clone();
        res.extend(self.ties.iter().map(|s| StateMargin {
            state: s.clone(),
            margin: 0,
        }));
        res.extend(self.winners_a.iter().rev().cloned());
        res
    }
}

/// Errors that prevent the analysis from completing successfully.
#[derive(PartialEq, Debug, Clone)]
pub enum AnalysisErrors {
    /// The tables cannot be combined as expected.
    DataShape { detail: String },
    /// No candidate name contains the given pattern.
    CandidateNotFound { pattern: String },
    /// The correlation coefficient does not exist for this candidate.
    CorrelationUndefined {
        candidate: String,
        reason: DegenerateInput,
    },
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DegenerateInput {
    TooFewStates(usize),
    ConstantVotes,
    ConstantAmounts,
    NonFinite,
}

impl Display for DegenerateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegenerateInput::TooFewStates(n) => {
                write!(f, "at least 2 states are required, found {}", n)
            }
            DegenerateInput::ConstantVotes => write!(f, "the votes do not vary across states"),
            DegenerateInput::ConstantAmounts => {
                write!(f, "the paid amounts do not vary across states")
            }
            DegenerateInput::NonFinite => write!(f, "the coefficient is not a finite number"),
        }
    }
}

impl Error for AnalysisErrors {}

impl Display for AnalysisErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisErrors::DataShape { detail } => write!(f, "unexpected data shape: {}", detail),
            AnalysisErrors::CandidateNotFound { pattern } => {
                write!(f, "no candidate name contains {:?}", pattern)
            }
            AnalysisErrors::CorrelationUndefined { candidate, reason } => {
                write!(f, "correlation undefined for {}: {}", candidate, reason)
            }
        }
    }
}

// ********* Configuration **********

/// Identifies one of the two tracked candidates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateSelector {
    /// Short name used in reports.
    pub label: String,
    /// Substring looked up in the full candidate name.
    pub pattern: String,
}

impl CandidateSelector {
    pub fn new(label: &str, pattern: &str) -> CandidateSelector {
        CandidateSelector {
            label: label.to_string(),
            pattern: pattern.to_string(),
        }
    }

    pub fn matches(&self, candidate_name: &str) -> bool {
        candidate_name.contains(self.pattern.as_str())
    }
}

/// What to do with a state in which only one of the two candidates has votes.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum MissingCandidatePolicy {
    /// The state does not appear in the ranking.
    DropState,
    /// The missing candidate is counted with zero votes.
    TreatAsZero,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnalysisRules {
    /// Only the votes of this round are kept.
    pub turn: u32,
    /// Only the votes for these ballot numbers are kept.
    pub candidate_codes: Vec<u32>,
    pub candidate_a: CandidateSelector,
    pub candidate_b: CandidateSelector,
    pub missing_candidate_policy: MissingCandidatePolicy,
}

impl AnalysisRules {
    /// The runoff of 2022: Lula (13) against Bolsonaro (22).
    pub fn runoff_2022() -> AnalysisRules {
        AnalysisRules {
            turn: 2,
            candidate_codes: vec![13, 22],
            candidate_a: CandidateSelector::new("Lula", "LULA"),
            candidate_b: CandidateSelector::new("Bolsonaro", "BOLSONARO"),
            missing_candidate_policy: MissingCandidatePolicy::DropState,
        }
    }
}

impl Default for AnalysisRules {
    fn default() -> Self {
        AnalysisRules::runoff_2022()
    }
}
