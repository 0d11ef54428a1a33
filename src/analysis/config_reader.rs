use crate::analysis::*;

use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Parquet,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// `csv` or `parquet`. Guessed from the extension of the file if missing.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub delimiter: Option<String>,
    pub encoding: Option<String>,
}

impl FileSource {
    pub fn new(file_path: &str) -> FileSource {
        FileSource {
            provider: None,
            file_path: file_path.to_string(),
            delimiter: None,
            encoding: None,
        }
    }

    pub fn provider(&self, table: &str) -> BAResult<Provider> {
        match self.provider.as_deref() {
            Some("csv") => Ok(Provider::Csv),
            Some("parquet") => Ok(Provider::Parquet),
            Some(x) => Err(Box::new(
                InvalidOptionSnafu {
                    option: format!("sources.{}.provider", table),
                    value: x,
                }
                .build(),
            )),
            None => {
                let is_csv = Path::new(&self.file_path)
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false);
                if is_csv {
                    Ok(Provider::Csv)
                } else {
                    Ok(Provider::Parquet)
                }
            }
        }
    }

    /// The field delimiter, `;` by default.
    pub fn delimiter_byte(&self) -> BAResult<u8> {
        match self.delimiter.as_deref() {
            None => Ok(b';'),
            Some(d) if d.len() == 1 && d.is_ascii() => Ok(d.as_bytes()[0]),
            Some(d) => Err(Box::new(InvalidDelimiterSnafu { delimiter: d }.build())),
        }
    }

    /// The label of the text encoding, `iso-8859-1` by default.
    pub fn encoding_label(&self) -> &str {
        self.encoding.as_deref().unwrap_or("iso-8859-1")
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub votes: Option<FileSource>,
    pub welfare: Option<FileSource>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CandidateConfig {
    pub label: String,
    pub pattern: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    pub turn: Option<u32>,
    #[serde(rename = "candidateCodes")]
    pub candidate_codes: Option<Vec<u32>>,
    #[serde(rename = "candidateA")]
    pub candidate_a: Option<CandidateConfig>,
    #[serde(rename = "candidateB")]
    pub candidate_b: Option<CandidateConfig>,
    #[serde(rename = "missingCandidatePolicy")]
    pub missing_candidate_policy: Option<String>,
}

impl RulesConfig {
    /// The rules of the 2022 runoff, with the values of the configuration on top.
    pub fn to_rules(&self) -> BAResult<AnalysisRules> {
        let mut rules = AnalysisRules::runoff_2022();
        if let Some(turn) = self.turn {
            rules.turn = turn;
        }
        if let Some(codes) = &self.candidate_codes {
            rules.candidate_codes = codes.clone();
        }
        if let Some(c) = &self.candidate_a {
            rules.candidate_a = CandidateSelector::new(&c.label, &c.pattern);
        }
        if let Some(c) = &self.candidate_b {
            rules.candidate_b = CandidateSelector::new(&c.label, &c.pattern);
        }
        rules.missing_candidate_policy = match self.missing_candidate_policy.as_deref() {
            None | Some("dropState") => MissingCandidatePolicy::DropState,
            Some("treatAsZero") => MissingCandidatePolicy::TreatAsZero,
            Some(x) => {
                return Err(Box::new(
                    InvalidOptionSnafu {
                        option: "rules.missingCandidatePolicy",
                        value: x,
                    }
                    .build(),
                ))
            }
        };
        Ok(rules)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "chartsDirectory")]
    pub charts_directory: Option<String>,
    #[serde(rename = "chartFormat")]
    pub _chart_format: Option<String>,
    #[serde(rename = "renderCharts")]
    pub render_charts: Option<bool>,
}

impl OutputConfig {
    pub fn chart_format(&self) -> BAResult<ChartFormat> {
        match self._chart_format.as_deref() {
            None | Some("svg") => Ok(ChartFormat::Svg),
            Some("png") => Ok(ChartFormat::Png),
            Some(x) => Err(Box::new(
                InvalidOptionSnafu {
                    option: "output.chartFormat",
                    value: x,
                }
                .build(),
            )),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn read_config(path: &str) -> BAResult<AnalysisConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: AnalysisConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_has_runoff_rules() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.rules.to_rules().unwrap(), AnalysisRules::runoff_2022());
        assert_eq!(config.output.chart_format().unwrap(), ChartFormat::Svg);
        assert!(config.sources.votes.is_none());
    }

    #[test]
    fn custom_candidates() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{ "rules": {
                "turn": 1,
                "candidateCodes": [13, 22, 12],
                "candidateA": { "label": "Ciro", "pattern": "CIRO" }
            } }"#,
        )
        .unwrap();
        let rules = config.rules.to_rules().unwrap();
        assert_eq!(rules.turn, 1);
        assert_eq!(rules.candidate_codes, vec![13, 22, 12]);
        assert_eq!(rules.candidate_a, CandidateSelector::new("Ciro", "CIRO"));
        assert_eq!(rules.candidate_b.pattern, "BOLSONARO");
    }

    #[test]
    fn invalid_options() {
        let rules = RulesConfig {
            missing_candidate_policy: Some("guess".to_string()),
            ..RulesConfig::default()
        };
        assert!(matches!(
            *rules.to_rules().unwrap_err(),
            AnalysisError::InvalidOption { .. }
        ));
        let output = OutputConfig {
            _chart_format: Some("gif".to_string()),
            ..OutputConfig::default()
        };
        assert!(output.chart_format().is_err());
    }

    #[test]
    fn file_source_defaults() {
        let source = FileSource::new("bronze/bolsa_familia.parquet");
        assert_eq!(source.provider("welfare").unwrap(), Provider::Parquet);
        assert_eq!(source.delimiter_byte().unwrap(), b';');
        assert_eq!(source.encoding_label(), "iso-8859-1");
        assert_eq!(
            FileSource::new("votacao/VOTACAO.CSV").provider("votes").unwrap(),
            Provider::Csv
        );
        let bad = FileSource {
            delimiter: Some(";;".to_string()),
            provider: Some("xlsx".to_string()),
            ..FileSource::new("a.csv")
        };
        assert!(bad.delimiter_byte().is_err());
        assert!(bad.provider("votes").is_err());
    }

    #[test]
    fn unreadable_config() {
        let err = read_config("/nonexistent/config.json").unwrap_err();
        assert!(matches!(*err, AnalysisError::OpeningJson { .. }));
    }
}
