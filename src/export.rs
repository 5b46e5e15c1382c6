use std::io::Write;

use csv::Writer;

use crate::error::KiraError;
use crate::table::{ExpressionTable, MetadataTable};

pub fn write_metadata_csv<W: Write>(table: &MetadataTable, out: W) -> Result<(), KiraError> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(table.columns()).map_err(export_error)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .map_err(export_error)?;
    }
    writer.flush().map_err(|err| KiraError::Export(err.to_string()))
}

pub fn write_expression_csv<W: Write>(table: &ExpressionTable, out: W) -> Result<(), KiraError> {
    let mut writer = Writer::from_writer(out);
    let header = std::iter::once(table.index_name().unwrap_or(""))
        .chain(table.columns().iter().map(String::as_str));
    writer.write_record(header).map_err(export_error)?;
    for (row_id, values) in table.row_ids().iter().zip(table.values()) {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(row_id.clone());
        record.extend(
            values
                .iter()
                .map(|value| value.map(|value| value.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record).map_err(export_error)?;
    }
    writer.flush().map_err(|err| KiraError::Export(err.to_string()))
}

pub fn metadata_csv_bytes(table: &MetadataTable) -> Result<Vec<u8>, KiraError> {
    let mut buffer = Vec::new();
    write_metadata_csv(table, &mut buffer)?;
    Ok(buffer)
}

pub fn expression_csv_bytes(table: &ExpressionTable) -> Result<Vec<u8>, KiraError> {
    let mut buffer = Vec::new();
    write_expression_csv(table, &mut buffer)?;
    Ok(buffer)
}

fn export_error(err: csv::Error) -> KiraError {
    KiraError::Export(err.to_string())
}
