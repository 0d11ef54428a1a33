pub use crate::config::*;

/// A builder for collecting the raw records before preparing the analysis table.
///
/// ```
/// use bolsa_votos::builder::Builder;
/// use bolsa_votos::{rank_states, AnalysisRules};
/// # use bolsa_votos::AnalysisErrors;
///
/// let mut builder = Builder::new(&AnalysisRules::runoff_2022());
/// builder
///     .add_votes(2, 13, "SP", "LUIZ INÁCIO LULA DA SILVA", 1000)
///     .add_votes(2, 22, "SP", "JAIR MESSIAS BOLSONARO", 800)
///     .add_payment("SP", 500.0);
///
/// let rows = builder.prepare()?;
/// let ranking = rank_states(&rows, builder.rules())?;
/// assert_eq!(ranking.winners_a[0].margin, 200);
///
/// # Ok::<(), AnalysisErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AnalysisRules,
    pub(crate) _votes: Vec<RawVoteRecord>,
    pub(crate) _welfare: Vec<RawWelfareRecord>,
}

impl Builder {
    pub fn new(rules: &AnalysisRules) -> Builder {
        Builder {
            _rules: rules.clone(),
            _votes: Vec::new(),
            _welfare: Vec::new(),
        }
    }

    pub fn rules(&self) -> &AnalysisRules {
        &self._rules
    }

    /// Adds the votes of one candidate in one voting section.
    pub fn add_votes(
        &mut self,
        turn: u32,
        candidate_code: u32,
        state: &str,
        candidate_name: &str,
        votes: u64,
    ) -> &mut Builder {
        self.add_vote_record(RawVoteRecord {
            turn,
            candidate_code,
            state: state.to_string(),
            candidate_name: candidate_name.to_string(),
            votes,
        })
    }

    pub fn add_vote_record(&mut self, record: RawVoteRecord) -> &mut Builder {
        self._votes.push(record);
        self
    }

    /// Adds one payment made in the given state.
    pub fn add_payment(&mut self, state: &str, amount: f64) -> &mut Builder {
        self.add_welfare_record(RawWelfareRecord {
            state: state.to_string(),
            amount,
        })
    }

    pub fn add_welfare_record(&mut self, record: RawWelfareRecord) -> &mut Builder {
        self._welfare.push(record);
        self
    }

    /// The joined table for all the records added so far.
    pub fn prepare(&self) -> Result<Vec<JoinedRow>, AnalysisErrors> {
        crate::prepare(&self._votes, &self._welfare, &self._rules)
    }
}
