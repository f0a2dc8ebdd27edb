//! JSON / YAML encoding of RIOS documents on disk.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Structured text format of a RIOS document file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    #[default]
    Yaml,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Format implied by a `.json`, `.yaml` or `.yml` extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Output paths `<prefix>_i`, `<prefix>_f` and `<prefix>_c` for one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub instrument: PathBuf,
    pub form: PathBuf,
    pub calculations: PathBuf,
}

impl OutputPaths {
    pub fn new(prefix: &Path, format: DocumentFormat) -> Self {
        let with_suffix = |suffix: &str| {
            let mut name = prefix.as_os_str().to_os_string();
            name.push(format!("_{suffix}.{}", format.extension()));
            PathBuf::from(name)
        };
        Self {
            instrument: with_suffix("i"),
            form: with_suffix("f"),
            calculations: with_suffix("c"),
        }
    }
}

/// Reads a document; the extension wins over `fallback`.
pub fn read_document<T: DeserializeOwned>(path: &Path, fallback: DocumentFormat) -> Result<T> {
    let format = DocumentFormat::from_path(path).unwrap_or(fallback);
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);
    let document = match format {
        DocumentFormat::Json => serde_json::from_reader(reader)
            .with_context(|| format!("parse JSON {}", path.display()))?,
        DocumentFormat::Yaml => serde_yaml::from_reader(reader)
            .with_context(|| format!("parse YAML {}", path.display()))?,
    };
    debug!(path = %path.display(), format = format.extension(), "read document");
    Ok(document)
}

pub fn write_document<T: Serialize>(path: &Path, document: &T, format: DocumentFormat) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("output path is empty");
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    match format {
        DocumentFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, document)
                .with_context(|| format!("encode JSON {}", path.display()))?;
            writeln!(writer)?;
        }
        DocumentFormat::Yaml => serde_yaml::to_writer(&mut writer, document)
            .with_context(|| format!("encode YAML {}", path.display()))?,
    }
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}
