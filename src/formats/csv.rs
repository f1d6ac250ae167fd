//! CSV adapter.
//!
//! Requires a header row. The phrase column is mandatory; the definition
//! column is optional and defaults every row to an empty definition.

use super::{DEFINITION_KEYS, Format, FormatError, PHRASE_KEYS, resolve_key};
use crate::terms::RawTerm;
use ::csv::ReaderBuilder;
use tracing::debug;

pub fn parse(text: &str, file: &str) -> Result<Vec<RawTerm>, FormatError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| syntax(file, e))?.clone();
    let names: Vec<&str> = headers.iter().collect();

    let phrase_col = resolve_key(PHRASE_KEYS, names.iter().copied()).ok_or_else(|| {
        FormatError::MissingPhraseColumn {
            file: file.to_string(),
            available: names.join(", "),
        }
    })?;
    let definition_col = resolve_key(DEFINITION_KEYS, names.iter().copied());
    if definition_col.is_none() {
        debug!(file, "No definition column; definitions default to empty");
    }

    let mut raw = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| syntax(file, e))?;
        // Short rows are allowed; missing cells count as missing fields
        let phrase = record.get(phrase_col).map(str::to_string);
        let definition = definition_col
            .and_then(|col| record.get(col))
            .map(str::to_string);
        raw.push(RawTerm::new(phrase, definition));
    }

    debug!(file, rows = raw.len(), "Parsed CSV rows");
    Ok(raw)
}

fn syntax(file: &str, err: ::csv::Error) -> FormatError {
    FormatError::Syntax {
        file: file.to_string(),
        format: Format::Csv,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_header() {
        let text = "phrase,definition\nAPI,Application Programming Interface\nREST,Representational State Transfer\n";
        let raw = parse(text, "t.csv").unwrap();
        assert_eq!(
            raw,
            vec![
                RawTerm::pair("API", "Application Programming Interface"),
                RawTerm::pair("REST", "Representational State Transfer"),
            ]
        );
    }

    #[test]
    fn resolves_alternate_headers_case_insensitively() {
        let text = "ID, Term ,Meaning\n1,SOAP,Simple Object Access Protocol\n";
        let raw = parse(text, "t.csv").unwrap();
        assert_eq!(raw, vec![RawTerm::pair("SOAP", "Simple Object Access Protocol")]);
    }

    #[test]
    fn handles_quoted_fields_with_commas_and_quotes() {
        let text = "word,desc\n\"JSON, the format\",\"Data \"\"interchange\"\" format, lightweight\"\n";
        let raw = parse(text, "t.csv").unwrap();
        assert_eq!(
            raw,
            vec![RawTerm::pair(
                "JSON, the format",
                "Data \"interchange\" format, lightweight"
            )]
        );
    }

    #[test]
    fn missing_definition_column_yields_no_definitions() {
        let text = "name,category\nGraphQL,api\n";
        let raw = parse(text, "t.csv").unwrap();
        assert_eq!(raw, vec![RawTerm::new(Some("GraphQL".into()), None)]);
    }

    #[test]
    fn missing_phrase_column_is_an_error() {
        let err = parse("definition,notes\nfoo,bar\n", "t.csv").unwrap_err();
        match err {
            FormatError::MissingPhraseColumn { available, .. } => {
                assert_eq!(available, "definition, notes");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_file_has_no_phrase_column() {
        let err = parse("", "empty.csv").unwrap_err();
        assert!(matches!(err, FormatError::MissingPhraseColumn { .. }));
    }

    #[test]
    fn short_rows_leave_fields_missing() {
        let text = "phrase,definition\nLonely\n";
        let raw = parse(text, "t.csv").unwrap();
        assert_eq!(raw, vec![RawTerm::new(Some("Lonely".into()), None)]);
    }

    #[test]
    fn case_variant_rows_are_kept_in_order() {
        let text = "phrase,definition\napi,Application Programming Interface\nAPI,Application Programming Interface (v2)\n";
        let raw = parse(text, "t.csv").unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1].phrase.as_deref(), Some("API"));
    }
}
