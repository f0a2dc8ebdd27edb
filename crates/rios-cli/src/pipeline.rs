//! File-level conversion runs behind the `to-rios` and `from-rios` commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use rios_convert::{
    FromRiosOptions, FromRiosResponse, RiosDocuments, ToRiosOptions, ToRiosResponse,
    redcap_file_to_rios, rios_to_redcap,
};
use rios_model::{CalculationSet, Form, Instrument};
use rios_validate::StructuralValidator;

use crate::documents::{DocumentFormat, OutputPaths, read_document, write_document};

/// Inputs of a REDCap to RIOS run.
#[derive(Debug, Clone)]
pub struct ToRiosRequest {
    pub infile: PathBuf,
    pub outfile_prefix: PathBuf,
    pub format: DocumentFormat,
    pub options: ToRiosOptions,
}

#[derive(Debug)]
pub struct ToRiosOutcome {
    pub response: ToRiosResponse,
    /// Document files written, in instrument, form, calculations order.
    pub written: Vec<PathBuf>,
}

/// Inputs of a RIOS to REDCap run.
#[derive(Debug, Clone)]
pub struct FromRiosRequest {
    pub instrument: PathBuf,
    pub form: PathBuf,
    pub calculations: Option<PathBuf>,
    pub outfile: PathBuf,
    /// Used for input files without a recognized extension.
    pub format: DocumentFormat,
    pub options: FromRiosOptions,
}

#[derive(Debug)]
pub struct FromRiosOutcome {
    pub response: FromRiosResponse,
    /// `None` when nothing was written.
    pub outfile: Option<PathBuf>,
}

/// Converts a REDCap CSV file and writes the RIOS documents next to the prefix.
pub fn to_rios(request: &ToRiosRequest) -> Result<ToRiosOutcome> {
    let span = info_span!("to_rios_files", infile = %request.infile.display());
    let _guard = span.enter();

    let response = redcap_file_to_rios(
        &request.infile,
        &request.options,
        &StructuralValidator::new(),
    )
    .context("convert REDCap data dictionary")?;

    let mut written = Vec::new();
    if let Some(documents) = &response.documents {
        let paths = OutputPaths::new(&request.outfile_prefix, request.format);
        write_document(&paths.instrument, &documents.instrument, request.format)?;
        written.push(paths.instrument);
        write_document(&paths.form, &documents.form, request.format)?;
        written.push(paths.form);
        if let Some(calculations) = &documents.calculations {
            write_document(&paths.calculations, calculations, request.format)?;
            written.push(paths.calculations);
        }
    }
    info!(files = written.len(), "RIOS documents written");
    Ok(ToRiosOutcome { response, written })
}

/// Reads RIOS documents and writes a REDCap CSV file.
///
/// The CSV is only created once the conversion succeeded.
pub fn from_rios(request: &FromRiosRequest) -> Result<FromRiosOutcome> {
    let span = info_span!("from_rios_files", outfile = %request.outfile.display());
    let _guard = span.enter();

    let documents = load_documents(request)?;
    let mut buffer = Vec::new();
    let response = rios_to_redcap(
        &documents,
        &request.options,
        &StructuralValidator::new(),
        &mut buffer,
    )
    .context("convert RIOS documents")?;
    if !response.is_success() {
        return Ok(FromRiosOutcome {
            response,
            outfile: None,
        });
    }
    write_csv(&request.outfile, &buffer)?;
    info!(rows = response.rows.len().saturating_sub(1), "REDCap data dictionary written");
    Ok(FromRiosOutcome {
        response,
        outfile: Some(request.outfile.clone()),
    })
}

fn load_documents(request: &FromRiosRequest) -> Result<RiosDocuments> {
    let instrument: Instrument = read_document(&request.instrument, request.format)?;
    let form: Form = read_document(&request.form, request.format)?;
    let calculations = request
        .calculations
        .as_deref()
        .map(|path| read_document::<CalculationSet>(path, request.format))
        .transpose()?;
    Ok(RiosDocuments::new(instrument, form).with_calculations(calculations))
}

fn write_csv(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
