use std::{io::Write, path::PathBuf};

use clap::Parser;

use casparse::peripheral::pdf;

/// Dumps the text of a CAS PDF, as seen by the statement parser.
///
/// Mainly for generating .txt test files, which parse-cas accepts in place of
/// the PDF. Contributors should sanitize personal details (names, PAN,
/// folio numbers, addresses) before committing a dump as a test file.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// Input file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Password of the PDF
    #[arg(long, default_value = "")]
    pub password: String,

    /// Show pretty page deliniators
    #[arg(short = 'n', long)]
    pub show_page_numbers: bool,

    /// Inserts page deliniators that can be parsed back out.
    /// Generally for generating test data.
    #[arg(short = 'm', long)]
    pub parsable_page_markers: bool,

    /// Can be provided multiple times
    #[arg(short = 'p', long = "page", value_name = "PAGE")]
    pub pages: Option<Vec<u32>>,
}

/// page_num should be one-based
fn page_marker_line(page_num: u32) -> String {
    format!("---------- Page {page_num} ----------")
}

fn dump(args: Args) -> Result<(), String> {
    let mut pdf_doc = pdf::load_document(&args.input, &args.password)?;
    let mut out = std::io::stdout();

    if args.show_page_numbers || args.parsable_page_markers {
        let n_pages = pdf_doc.get_pages().len() as u32;
        let mut has_printed = false;
        for page_num in 1..=n_pages {
            if let Some(pages_to_show) = &args.pages {
                if !pages_to_show.contains(&page_num) {
                    continue;
                }
            }

            let res = if args.parsable_page_markers {
                write!(out, "{}", pdf::parseable_page_marker(page_num))
            } else {
                writeln!(out, "{}{}",
                    if !has_printed { "" } else { "\n" },
                    page_marker_line(page_num))
            };
            res.map_err(|e| e.to_string())?;
            pdf::write_page_text(&pdf_doc, page_num, &mut out)?;
            out.flush().map_err(|e| e.to_string())?;
            has_printed = true;
        }
    } else {
        if let Some(pages_to_show) = args.pages {
            pdf::filter_pdf_pages(&mut pdf_doc, &pages_to_show);
        }
        pdf::write_doc_text(&pdf_doc, &mut out)?;
    }
    Ok(())
}

fn main() {
    casparse::tracing::setup_tracing();
    if let Err(e) = dump(Args::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
