use std::path::Path;

use crate::util::basic::SError;

use super::{parse::parse_cas_text, value::CasValue};

/// Something which can turn a statement file into a CasValue tree.
///
/// Implementations own everything about the statement format. Callers only
/// ever see the tree, or an error message suitable for showing to the user.
pub trait CasReader {
    fn read(&self, filepath: &Path, password: &str) -> Result<CasValue, SError>;
}

/// Reads CAMS and KFintech detailed statements.
///
/// Files ending in .txt are treated as text already extracted from the PDF
/// (see the cas-pdf-text tool), and the password is ignored for them.
#[derive(Default)]
pub struct StatementReader {}

impl StatementReader {
    pub fn new() -> Self {
        StatementReader {}
    }
}

fn is_text_export(filepath: &Path) -> bool {
    filepath
        .extension()
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

fn read_text_export(filepath: &Path) -> Result<String, SError> {
    let text = std::fs::read_to_string(filepath)
        .map_err(|e| format!("Unable to read {}: {}", filepath.display(), e))?;
    // Page markers are just noise to the line parser.
    Ok(page_marker_re().replace_all(&text, "\n").into_owned())
}

#[cfg(feature = "pdf_parse")]
fn page_marker_re() -> regex::Regex {
    crate::peripheral::pdf::get_page_marker_pattern()
}

#[cfg(not(feature = "pdf_parse"))]
fn page_marker_re() -> regex::Regex {
    regex::Regex::new(r"PAGE_BREAK<(\d+)>").unwrap()
}

#[cfg(feature = "pdf_parse")]
fn read_pdf_text(filepath: &Path, password: &str) -> Result<String, SError> {
    let pages = crate::peripheral::pdf::get_all_pages_text_from_path(filepath, password)?;
    Ok(pages.join("\n"))
}

#[cfg(not(feature = "pdf_parse"))]
fn read_pdf_text(filepath: &Path, _password: &str) -> Result<String, SError> {
    Err(format!(
        "Unable to read {}: PDF support is not enabled in this build",
        filepath.display()
    ))
}

/// Loads the text of the statement at filepath.
pub fn load_statement_text(filepath: &Path, password: &str) -> Result<String, SError> {
    if is_text_export(filepath) {
        tracing::debug!("Reading {} as extracted text", filepath.display());
        read_text_export(filepath)
    } else {
        read_pdf_text(filepath, password)
    }
}

impl CasReader for StatementReader {
    fn read(&self, filepath: &Path, password: &str) -> Result<CasValue, SError> {
        let text = load_statement_text(filepath, password)?;
        let data = parse_cas_text(&text)
            .map_err(|e| format!("Failed to parse {}: {}", filepath.display(), e))?;
        tracing::info!(
            "Parsed {} folios from {}",
            data.folios.len(),
            filepath.display()
        );
        Ok(data.into())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::cas::value::CasValue;
    use crate::testlib::NonAutoCreatingTestDir;

    use super::{is_text_export, load_statement_text, CasReader, StatementReader};

    const STATEMENT: &str = "PAGE_BREAK<1>Consolidated Account Statement
KFINCASWS-20240401
01-Apr-2023 To 31-Mar-2024
Email Id: investor@example.com
JOHN DOE
12 MG ROAD
Mobile: +919876543210
Axis Mutual Fund
Folio No: 9101 / 0   PAN: ABCDE1234F   KYC: OK   PAN: OK
J75D-Axis ELSS Fund - Direct Growth - ISIN: INF846K01EW2(Advisor: DIRECT) Registrar : KFINTECH
Opening Unit Balance: 0.000
PAGE_BREAK<2>15-Jan-2024   Purchase   1,000.00   10.000   100.0000   10.000
Closing Unit Balance: 10.000
";

    #[test]
    fn test_is_text_export() {
        assert!(is_text_export(Path::new("a/b.txt")));
        assert!(is_text_export(Path::new("b.TXT")));
        assert!(!is_text_export(Path::new("b.pdf")));
        assert!(!is_text_export(Path::new("txt")));
    }

    #[test]
    fn test_read_text_export() {
        let dir = NonAutoCreatingTestDir::new();
        let path = dir.write_file("ok.txt", STATEMENT.as_bytes());
        let text = load_statement_text(&path, "").unwrap();
        assert!(!text.contains("PAGE_BREAK"));
        // Marker in front of a transaction does not hide it
        assert!(text.contains("\n15-Jan-2024   Purchase"));

        let v = StatementReader::new().read(&path, "ignored").unwrap();
        assert_eq!(v.get("file_type"), Some(&CasValue::from("KFINTECH")));
        assert_eq!(v.get("cas_type"), Some(&CasValue::from("DETAILED")));
        match v.get("folios") {
            Some(CasValue::List(folios)) => assert_eq!(folios.len(), 1),
            other => panic!("Unexpected folios {other:?}"),
        }
    }

    #[test]
    fn test_read_errors() {
        let err = StatementReader::new()
            .read(Path::new("./no/such/statement.txt"), "")
            .unwrap_err();
        assert!(err.starts_with("Unable to read ./no/such/statement.txt: "), "{err}");

        let dir = NonAutoCreatingTestDir::new();
        let path = dir.write_file("bad.txt", b"Some other document");
        let err = StatementReader::new().read(&path, "").unwrap_err();
        assert_eq!(
            err,
            format!(
                "Failed to parse {}: Unable to determine CAS type",
                path.display()
            )
        );
    }

    #[cfg(feature = "pdf_parse")]
    #[test]
    fn test_read_encrypted_pdf() {
        let dir = NonAutoCreatingTestDir::new();
        let path = dir.write_file("locked.pdf", b"");
        crate::testlib::write_encrypted_pdf_stub(&path, 1, 2);

        let err = StatementReader::new().read(&path, "ABCDE1234F").unwrap_err();
        assert_eq!(
            err,
            format!("Incorrect Password: unable to decrypt {}", path.display())
        );
    }
}
