use std::io::Write;

use rios_ingest::{IngestError, RecordReader, RecordSource, check_redcap_headers};

const DICTIONARY: &str = "\u{feff}\"Variable / Field Name\",\"Form Name\",\"Section Header\",\"Field Type\",\"Field Label\",\"Choices, Calculations, OR Slider Labels\"\n\
record_id,demographics,,text,Record ID,\n\
color,demographics,Preferences,radio,\"Favorite color, if any\",\"1, Red | 2, Blue\"\n";

#[test]
fn test_reads_redcap_dictionary_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(DICTIONARY.as_bytes()).expect("write file");

    let reader = RecordReader::from_path(file.path()).expect("open dictionary");
    check_redcap_headers(reader.headers()).expect("redcap headers");
    assert_eq!(reader.headers()[5], "choices_or_calculations");

    let records: Vec<_> = reader.collect::<Result<_, _>>().expect("read records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("variable_field_name"), "record_id");
    assert_eq!(records[1].get("field_label"), "Favorite color, if any");
    assert_eq!(records[1].get("choices_or_calculations"), "1, Red | 2, Blue");
    assert_eq!(records[1].get("section_header"), "Preferences");
}

#[test]
fn test_missing_file_is_reported() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let result = RecordReader::from_path(&dir.path().join("missing.csv"));
    assert!(matches!(result, Err(IngestError::FileRead { .. })));
}

#[test]
fn test_unknown_format_is_rejected() {
    let reader = RecordReader::new("name,value\nx,1\n".as_bytes()).expect("read header");
    let err = check_redcap_headers(reader.headers()).unwrap_err();
    assert!(err.to_string().starts_with("Input has unknown format"));
}
