//! Public conversion entry points.

use std::io::{Read, Write};
use std::path::Path;

use tracing::{info, info_span};

use rios_ingest::{RecordReader, RecordSource};
use rios_validate::Validator;

use crate::assembler::PageAssembler;
use crate::document::check_documents;
use crate::error::{ConversionError, Result};
use crate::log::{ConversionLog, SUCCESS_MESSAGE};
use crate::options::{
    ConversionStats, FromRiosOptions, FromRiosResponse, RiosDocuments, ToRiosOptions,
    ToRiosResponse,
};
use crate::reverse::ReverseAssembler;

/// Converts a REDCap data dictionary (CSV) into RIOS documents.
///
/// Row-level problems are logged in the response. Fatal errors are returned,
/// or reported in [`ToRiosResponse::failure`] when `options.suppress` is set.
pub fn redcap_to_rios<R: Read>(
    reader: R,
    options: &ToRiosOptions,
    validator: &dyn Validator,
) -> Result<ToRiosResponse> {
    convert_opened(RecordReader::new(reader), options, validator)
}

/// Converts the REDCap data dictionary stored at `path`.
///
/// A file that cannot be opened is a fatal error, like an unreadable header.
pub fn redcap_file_to_rios(
    path: &Path,
    options: &ToRiosOptions,
    validator: &dyn Validator,
) -> Result<ToRiosResponse> {
    convert_opened(RecordReader::from_path(path), options, validator)
}

fn convert_opened<R: Read>(
    opened: rios_ingest::Result<RecordReader<R>>,
    options: &ToRiosOptions,
    validator: &dyn Validator,
) -> Result<ToRiosResponse> {
    match opened {
        Ok(mut source) => convert_records(&mut source, options, validator),
        Err(err) => to_rios_failure(
            err.into(),
            options,
            ConversionStats::default(),
            ConversionLog::new(),
        ),
    }
}

/// Converts any canonical record stream into RIOS documents.
pub fn convert_records(
    source: &mut dyn RecordSource,
    options: &ToRiosOptions,
    validator: &dyn Validator,
) -> Result<ToRiosResponse> {
    let span = info_span!("to_rios", instrument_id = %options.id);
    let _guard = span.enter();
    let mut assembler = PageAssembler::new(options);
    let outcome = assembler.run(source, validator);
    let (stats, mut log) = assembler.into_report();
    match outcome {
        Ok(documents) => {
            log.info(SUCCESS_MESSAGE);
            Ok(ToRiosResponse {
                documents: Some(documents),
                stats,
                logs: log,
                failure: None,
            })
        }
        Err(err) => to_rios_failure(err, options, stats, log),
    }
}

fn to_rios_failure(
    err: ConversionError,
    options: &ToRiosOptions,
    stats: ConversionStats,
    mut log: ConversionLog,
) -> Result<ToRiosResponse> {
    let message = format!("Unable to convert REDCap data dictionary. Error: {err}");
    log.error(message.clone());
    if !options.suppress {
        return Err(err);
    }
    Ok(ToRiosResponse {
        documents: None,
        stats,
        logs: log,
        failure: Some(message),
    })
}

/// Converts RIOS documents into a REDCap data dictionary written to `writer`.
///
/// The documents are checked for matching instrument references and
/// validated before any row is produced.
pub fn rios_to_redcap<W: Write>(
    documents: &RiosDocuments,
    options: &FromRiosOptions,
    validator: &dyn Validator,
    writer: W,
) -> Result<FromRiosResponse> {
    let span = info_span!("from_rios", instrument_id = %documents.instrument.id);
    let _guard = span.enter();
    let mut log = ConversionLog::new();

    if let Err(err) = check_documents(documents, validator) {
        let message = format!("The supplied RIOS configurations are invalid: {err}");
        return from_rios_failure(err, message, options, log);
    }

    let rows = ReverseAssembler::new(documents, &options.localization).assemble(&mut log);
    if let Err(err) = write_rows(&rows, writer) {
        let message = format!("Unable to convert RIOS data dictionary. Error: {err}");
        return from_rios_failure(err, message, options, log);
    }
    info!(rows = rows.len() - 1, "REDCap rows written");
    log.info(SUCCESS_MESSAGE);
    Ok(FromRiosResponse {
        rows,
        logs: log,
        failure: None,
    })
}

fn from_rios_failure(
    err: ConversionError,
    message: String,
    options: &FromRiosOptions,
    mut log: ConversionLog,
) -> Result<FromRiosResponse> {
    log.error(message.clone());
    if !options.suppress {
        return Err(err);
    }
    Ok(FromRiosResponse {
        rows: Vec::new(),
        logs: log,
        failure: Some(message),
    })
}

fn write_rows<W: Write>(rows: &[Vec<String>], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer
            .write_record(row)
            .map_err(|source| ConversionError::Write { source })?;
    }
    writer.flush().map_err(|source| ConversionError::Write {
        source: source.into(),
    })?;
    Ok(())
}
