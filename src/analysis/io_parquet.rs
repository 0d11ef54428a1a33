// Reading the welfare payments from a parquet file.

use std::fs::File;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use snafu::ensure;

use crate::analysis::io_common::{find_column, parse_amount};
use crate::analysis::*;

const STATE_COLUMN: &str = "UF";
const AMOUNT_COLUMN: &str = "VALOR PARCELA";

// How the values of the amount column are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountEncoding {
    Text,
    Number,
}

fn is_text(dt: &DataType) -> bool {
    match dt {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => true,
        DataType::Dictionary(_, values) => is_text(values),
        _ => false,
    }
}

fn amount_encoding(dt: &DataType) -> Option<AmountEncoding> {
    if is_text(dt) {
        return Some(AmountEncoding::Text);
    }
    match dt {
        DataType::Dictionary(_, values) => amount_encoding(values),
        x if x.is_numeric() => Some(AmountEncoding::Number),
        _ => None,
    }
}

fn unsupported(column: &str, path: &str, dt: &DataType) -> Box<AnalysisError> {
    Box::new(
        UnsupportedColumnTypeSnafu {
            column,
            path,
            data_type: dt.to_string(),
        }
        .build(),
    )
}

/// Reads the state and the amount of each payment.
///
/// The state can be any kind of text column, including dictionary-encoded ones. The
/// amount can be numeric or text. Only these two columns are read from the file.
pub fn read_welfare_parquet(cfs: &FileSource) -> BAResult<Vec<RawWelfareRecord>> {
    let path = cfs.file_path.as_str();
    info!("Attempting to read welfare file {:?}", path);
    let file = File::open(path).context(OpeningFileSnafu { path })?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context(ParquetReadSnafu { path })?;

    let schema = builder.schema().clone();
    let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    debug!("read_welfare_parquet: {:?}: columns: {:?}", path, names);
    let state_idx = find_column(&names, STATE_COLUMN, path)?;
    let amount_idx = find_column(&names, AMOUNT_COLUMN, path)?;

    let state_type = schema.field(state_idx).data_type();
    ensure!(
        is_text(state_type),
        UnsupportedColumnTypeSnafu {
            column: STATE_COLUMN,
            path,
            data_type: state_type.to_string(),
        }
    );
    let amount_type = schema.field(amount_idx).data_type();
    let encoding = amount_encoding(amount_type)
        .ok_or_else(|| unsupported(AMOUNT_COLUMN, path, amount_type))?;

    let mask = ProjectionMask::roots(builder.parquet_schema(), [state_idx, amount_idx]);
    let reader = builder
        .with_projection(mask)
        .with_batch_size(8192)
        .build()
        .context(ParquetReadSnafu { path })?;

    let mut res: Vec<RawWelfareRecord> = Vec::new();
    let mut skipped: usize = 0;
    for batch_r in reader {
        let batch = batch_r.context(ArrowReadSnafu { path })?;
        let states_a: &ArrayRef = batch
            .column_by_name(&names[state_idx])
            .context(MissingColumnSnafu {
                column: STATE_COLUMN,
                path,
            })?;
        let amounts_a: &ArrayRef = batch
            .column_by_name(&names[amount_idx])
            .context(MissingColumnSnafu {
                column: AMOUNT_COLUMN,
                path,
            })?;

        let states_c = cast(states_a, &DataType::Utf8).context(ArrowReadSnafu { path })?;
        let states = states_c.as_string::<i32>();
        let amounts: Vec<Option<f64>> = match encoding {
            AmountEncoding::Text => {
                let amounts_c =
                    cast(amounts_a, &DataType::Utf8).context(ArrowReadSnafu { path })?;
                let mut l: Vec<Option<f64>> = Vec::with_capacity(amounts_c.len());
                for s in amounts_c.as_string::<i32>().iter() {
                    match s.map(str::trim) {
                        None | Some("") => l.push(None),
                        Some(x) => {
                            let amount =
                                parse_amount(x).context(AmountParseSnafu { path, value: x })?;
                            l.push(Some(amount));
                        }
                    }
                }
                l
            }
            AmountEncoding::Number => {
                let amounts_c =
                    cast(amounts_a, &DataType::Float64).context(ArrowReadSnafu { path })?;
                amounts_c.as_primitive::<Float64Type>().iter().collect()
            }
        };

        for (state_o, amount_o) in states.iter().zip(amounts) {
            match (state_o.map(str::trim), amount_o) {
                (Some(state), Some(amount)) if !state.is_empty() && amount.is_finite() => {
                    res.push(RawWelfareRecord {
                        state: state.to_string(),
                        amount,
                    });
                }
                _ => {
                    skipped += 1;
                }
            }
        }
    }
    if skipped > 0 {
        warn!(
            "read_welfare_parquet: {:?}: skipped {} rows without state or amount",
            path, skipped
        );
    }
    Ok(res)
}
