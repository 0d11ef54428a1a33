// Primitives for reading the CSV files.

use std::fs::File;

use csv::{ByteRecord, ByteRecordsIntoIter};
use encoding_rs::Encoding;
use log::{debug, info, warn};

use crate::analysis::io_common::{decode_field, find_column, parse_amount, resolve_encoding};
use crate::analysis::*;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

// What is needed to make sense of the lines of a file.
struct TableInfo {
    path: String,
    encoding: &'static Encoding,
    header: Vec<String>,
}

fn open_table(cfs: &FileSource) -> BAResult<(TableInfo, ByteRecordsIntoIter<File>)> {
    let path = cfs.file_path.clone();
    let encoding = resolve_encoding(cfs.encoding_label())?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(cfs.delimiter_byte()?)
        .flexible(true)
        .from_path(&path)
        .context(CsvOpenSnafu { path: path.as_str() })?;
    let header: Vec<String> = rdr
        .byte_headers()
        .context(CsvLineParseSnafu {
            path: path.as_str(),
            lineno: 1_u64,
        })?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            let h = if idx == 0 {
                h.strip_prefix(UTF8_BOM).unwrap_or(h)
            } else {
                h
            };
            decode_field(encoding, h)
        })
        .collect();
    debug!("open_table: {:?}: header: {:?}", path, header);
    let info = TableInfo {
        path,
        encoding,
        header,
    };
    Ok((info, rdr.into_byte_records()))
}

// A column of the table, located by its name in the header.
struct Column<'a> {
    name: &'a str,
    idx: usize,
}

impl<'a> Column<'a> {
    fn find(table: &TableInfo, name: &'a str) -> BAResult<Column<'a>> {
        let idx = find_column(&table.header, name, &table.path)?;
        Ok(Column { name, idx })
    }

    fn text(&self, table: &TableInfo, record: &ByteRecord, lineno: u64) -> BAResult<String> {
        let bytes = record.get(self.idx).context(CsvLineTooShortSnafu {
            path: table.path.as_str(),
            lineno,
            column: self.name,
        })?;
        Ok(decode_field(table.encoding, bytes))
    }

    fn number<T: std::str::FromStr>(
        &self,
        table: &TableInfo,
        record: &ByteRecord,
        lineno: u64,
    ) -> BAResult<T> {
        let value = self.text(table, record, lineno)?;
        match value.parse::<T>() {
            Ok(x) => Ok(x),
            Err(_) => Err(Box::new(
                CsvNumberSnafu {
                    path: table.path.as_str(),
                    lineno,
                    column: self.name,
                    value,
                }
                .build(),
            )),
        }
    }
}

/// Reads the results by voting section.
///
/// All the lines are returned: the filtering on the turn and the candidates happens
/// when the data is prepared.
pub fn read_votes_csv(cfs: &FileSource) -> BAResult<Vec<RawVoteRecord>> {
    info!("Attempting to read votes file {:?}", cfs.file_path);
    let (table, records) = open_table(cfs)?;
    let turn_c = Column::find(&table, "NR_TURNO")?;
    let code_c = Column::find(&table, "NR_VOTAVEL")?;
    let state_c = Column::find(&table, "SG_UF")?;
    let name_c = Column::find(&table, "NM_VOTAVEL")?;
    let votes_c = Column::find(&table, "QT_VOTOS")?;

    let mut res: Vec<RawVoteRecord> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is the first line.
        let lineno = (idx + 2) as u64;
        let line = line_r.context(CsvLineParseSnafu {
            path: table.path.as_str(),
            lineno,
        })?;
        res.push(RawVoteRecord {
            turn: turn_c.number(&table, &line, lineno)?,
            candidate_code: code_c.number(&table, &line, lineno)?,
            state: state_c.text(&table, &line, lineno)?,
            candidate_name: name_c.text(&table, &line, lineno)?,
            votes: votes_c.number(&table, &line, lineno)?,
        });
    }
    Ok(res)
}

/// Reads the payments from a CSV export. Lines without a state or without an amount are
/// skipped.
pub fn read_welfare_csv(cfs: &FileSource) -> BAResult<Vec<RawWelfareRecord>> {
    info!("Attempting to read welfare file {:?}", cfs.file_path);
    let (table, records) = open_table(cfs)?;
    let state_c = Column::find(&table, "UF")?;
    let amount_c = Column::find(&table, "VALOR PARCELA")?;

    let mut res: Vec<RawWelfareRecord> = Vec::new();
    let mut skipped: usize = 0;
    for (idx, line_r) in records.enumerate() {
        let lineno = (idx + 2) as u64;
        let line = line_r.context(CsvLineParseSnafu {
            path: table.path.as_str(),
            lineno,
        })?;
        let state = state_c.text(&table, &line, lineno)?;
        let amount_s = amount_c.text(&table, &line, lineno)?;
        if state.is_empty() || amount_s.is_empty() {
            skipped += 1;
            continue;
        }
        let amount = parse_amount(&amount_s).context(AmountParseSnafu {
            path: table.path.as_str(),
            value: amount_s.as_str(),
        })?;
        res.push(RawWelfareRecord { state, amount });
    }
    if skipped > 0 {
        warn!(
            "read_welfare_csv: {:?}: skipped {} lines without state or amount",
            table.path, skipped
        );
    }
    Ok(res)
}
