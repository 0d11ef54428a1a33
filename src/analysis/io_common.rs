use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use crate::analysis::*;

pub fn resolve_encoding(label: &str) -> BAResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .context(UnknownEncodingSnafu { label })
        .map_err(Box::new)
}

/// Decodes a raw field and trims the surrounding whitespace.
pub fn decode_field(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.trim().to_string()
}

/// The position of a column in the header, ignoring the case.
pub fn find_column(header: &[String], column: &str, path: &str) -> BAResult<usize> {
    header
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .context(MissingColumnSnafu { column, path })
        .map_err(Box::new)
}

/// Whether the dots of a number without a comma separate groups of thousands, as in
/// `1.200` or `1.234.567`.
fn is_grouped_by_dots(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split('.');
    let first = groups.next().unwrap_or("");
    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    let mut rest = groups.peekable();
    rest.peek().is_some()
        && (1..=3).contains(&first.len())
        && !first.starts_with('0')
        && all_digits(first)
        && rest.all(|g| g.len() == 3 && all_digits(g))
}

/// Reads an amount written either in the Brazilian notation (`1.234,56`, `1.200`) or
/// with a decimal point (`1234.56`).
///
/// Without a comma, dots that split the digits in groups of three are thousands
/// separators. Any other dot is a decimal point.
pub fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else if is_grouped_by_dots(s) {
        s.replace('.', "")
    } else {
        s.to_string()
    };
    normalized.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Resolves a path of the configuration file against the directory of that file.
pub fn resolve_path(root: Option<&Path>, path: &str) -> String {
    match root {
        Some(r) if Path::new(path).is_relative() => {
            let p: PathBuf = r.join(path);
            p.display().to_string()
        }
        _ => path.to_string(),
    }
}
