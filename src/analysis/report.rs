// Console and JSON outputs.

use std::fs;

use log::info;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::analysis::*;

fn group_digits(digits: &str) -> String {
    let mut res = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            res.push('.');
        }
        res.push(c);
    }
    res
}

/// A count with the Brazilian thousands separator: `1.234.567`.
pub fn format_count(n: u64) -> String {
    group_digits(&n.to_string())
}

pub fn format_signed(n: i64) -> String {
    let abs = group_digits(&n.unsigned_abs().to_string());
    if n < 0 {
        format!("-{}", abs)
    } else {
        abs
    }
}

/// A number in the Brazilian notation, with the given number of decimal places:
/// `1.234,56`.
pub fn format_decimal(x: f64, places: usize) -> String {
    let s = format!("{:.*}", places, x.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let mut res = String::new();
    if x < 0.0 {
        res.push('-');
    }
    res.push_str(&group_digits(int_part));
    if let Some(f) = frac_part {
        res.push(',');
        res.push_str(f);
    }
    res
}

/// The national results and the correlations, one line each.
pub fn summary_lines(analysis: &Analysis) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for ct in analysis.summary.totals.iter() {
        lines.push(format!(
            "{}: {} votes ({}%)",
            ct.candidate,
            format_count(ct.total_votes),
            format_decimal(ct.percentage, 2)
        ));
    }
    lines.push(format!(
        "Valid votes: {}",
        format_count(analysis.summary.total_valid_votes)
    ));
    let m = &analysis.margin;
    lines.push(format!(
        "Margin: {} ({} p.p.)",
        format_signed(m.absolute_margin),
        format_decimal(m.percentage_margin, 2)
    ));
    for (candidate, r) in analysis.correlations.iter() {
        lines.push(format!(
            "Correlation votes / payments, {}: {}",
            candidate,
            format_decimal(*r, 3)
        ));
    }
    lines
}

fn ranking_lines(analysis: &Analysis, rules: &AnalysisRules) -> Vec<String> {
    let ranking = &analysis.ranking;
    let mut lines: Vec<String> = Vec::new();
    let sides = [
        (&rules.candidate_a, &ranking.winners_a),
        (&rules.candidate_b, &ranking.winners_b),
    ];
    for (selector, winners) in sides {
        lines.push(format!("States won by {}:", selector.label));
        if winners.is_empty() {
            lines.push("  (none)".to_string());
        }
        for (idx, sm) in winners.iter().enumerate() {
            lines.push(format!(
                "  {:>2}. {} {}",
                idx + 1,
                sm.state,
                format_signed(sm.margin)
            ));
        }
    }
    if !ranking.ties.is_empty() {
        lines.push(format!("Tied states: {}", ranking.ties.join(", ")));
    }
    if !ranking.dropped.is_empty() {
        lines.push(format!(
            "States left out (one candidate without votes): {}",
            ranking.dropped.join(", ")
        ));
    }
    lines
}

pub fn print_report(analysis: &Analysis, rules: &AnalysisRules) {
    let m = &analysis.margin;
    println!("*** National results ***");
    for l in summary_lines(analysis) {
        println!("{}", l);
    }
    println!(
        "{} ({}) - {} ({})",
        m.first,
        format_count(m.first_votes),
        m.second,
        format_count(m.second_votes)
    );
    println!();
    println!(
        "*** Reverse ranking: {} - {} ***",
        rules.candidate_a.label, rules.candidate_b.label
    );
    for l in ranking_lines(analysis, rules) {
        println!("{}", l);
    }
}

fn margins_to_json(margins: &[StateMargin]) -> Vec<JSValue> {
    margins
        .iter()
        .map(|sm| json!({"state": sm.state, "margin": sm.margin}))
        .collect()
}

/// The results of the analysis, as written with `--out`.
pub fn summary_to_json(analysis: &Analysis, rules: &AnalysisRules) -> JSValue {
    let totals: Vec<JSValue> = analysis
        .summary
        .totals
        .iter()
        .map(|ct| {
            json!({
                "candidate": ct.candidate,
                "votes": ct.total_votes,
                "percentage": ct.percentage
            })
        })
        .collect();
    let m = &analysis.margin;
    let mut correlations: JSMap<String, JSValue> = JSMap::new();
    for (candidate, r) in analysis.correlations.iter() {
        correlations.insert(candidate.clone(), json!(r));
    }
    let ranking = &analysis.ranking;
    json!({
        "rules": {
            "turn": rules.turn,
            "candidateCodes": rules.candidate_codes,
            "candidateA": rules.candidate_a.label,
            "candidateB": rules.candidate_b.label,
        },
        "totals": totals,
        "totalValidVotes": analysis.summary.total_valid_votes,
        "margin": {
            "first": m.first,
            "firstVotes": m.first_votes,
            "second": m.second,
            "secondVotes": m.second_votes,
            "absolute": m.absolute_margin,
            "percentage": m.percentage_margin,
        },
        "ranking": {
            "winnersA": margins_to_json(&ranking.winners_a),
            "winnersB": margins_to_json(&ranking.winners_b),
            "ties": ranking.ties,
            "dropped": ranking.dropped,
        },
        "correlations": correlations,
    })
}

/// Writes the summary to the given file, or to the standard output for `stdout`.
pub fn write_summary(js: &JSValue, out: &str) -> BAResult<()> {
    let pretty = serde_json::to_string_pretty(js).context(SerializingSummarySnafu {})?;
    if out == "stdout" {
        println!("{}", pretty);
    } else {
        fs::write(out, pretty).context(WritingSummarySnafu { path: out })?;
        info!("Summary written to {}", out);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolsa_votos::builder::Builder;

    const LULA: &str = "LUIZ INÁCIO LULA DA SILVA";
    const BOLSONARO: &str = "JAIR MESSIAS BOLSONARO";

    fn analysis() -> Analysis {
        let rules = AnalysisRules::runoff_2022();
        let mut b = Builder::new(&rules);
        b.add_votes(2, 13, "SP", LULA, 1_000)
            .add_votes(2, 22, "SP", BOLSONARO, 800)
            .add_votes(2, 13, "RJ", LULA, 600)
            .add_votes(2, 22, "RJ", BOLSONARO, 900)
            .add_votes(2, 13, "MG", LULA, 700)
            .add_payment("SP", 500.0)
            .add_payment("RJ", 300.0)
            .add_payment("MG", 1_200.5);
        let rows = b.prepare().unwrap();
        let summary = summarize(&rows);
        Analysis {
            margin: margin_report(&summary, &rules).unwrap(),
            ranking: rank_states(&rows, &rules).unwrap(),
            correlations: correlate(&rows).unwrap(),
            summary,
            rows,
        }
    }

    #[test]
    fn brazilian_numbers() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1.000");
        assert_eq!(format_count(60_345_999), "60.345.999");
        assert_eq!(format_signed(-2_139_645), "-2.139.645");
        assert_eq!(format_signed(300), "300");
        assert_eq!(format_decimal(1234.5678, 2), "1.234,57");
        assert_eq!(format_decimal(-0.1234, 3), "-0,123");
        assert_eq!(format_decimal(50.0, 0), "50");
    }

    #[test]
    fn lines() {
        let a = analysis();
        let lines = summary_lines(&a);
        assert_eq!(lines[0], format!("{}: 2.300 votes (57,50%)", LULA));
        assert_eq!(lines[1], format!("{}: 1.700 votes (42,50%)", BOLSONARO));
        assert_eq!(lines[2], "Valid votes: 4.000");
        assert_eq!(lines[3], "Margin: 600 (15,00 p.p.)");
        assert_eq!(lines.len(), 6);

        let ranking = ranking_lines(&a, &AnalysisRules::runoff_2022());
        assert_eq!(ranking[0], "States won by Lula:");
        assert_eq!(ranking[1], "   1. SP 200");
        assert_eq!(ranking[2], "States won by Bolsonaro:");
        assert_eq!(ranking[3], "   1. RJ -300");
        assert_eq!(
            ranking[4],
            "States left out (one candidate without votes): MG"
        );
    }

    #[test]
    fn json_summary() {
        let a = analysis();
        let js = summary_to_json(&a, &AnalysisRules::runoff_2022());
        assert_eq!(js["totalValidVotes"], json!(4000));
        assert_eq!(js["margin"]["absolute"], json!(600));
        assert_eq!(js["ranking"]["winnersA"][0]["state"], json!("SP"));
        assert_eq!(js["ranking"]["dropped"], json!(["MG"]));
        assert!(js["correlations"][LULA].is_number());

        let dir = tempfile::TempDir::new().unwrap();
        let p = dir.path().join("summary.json");
        write_summary(&js, &p.display().to_string()).unwrap();
        let read: JSValue = serde_json::from_str(&fs::read_to_string(&p).unwrap()).unwrap();
        assert_eq!(read, js);
    }

    #[test]
    fn unwritable_summary() {
        let err = write_summary(&json!({}), "/nonexistent/dir/summary.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Output);
    }
}
