use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    path::Path,
};

use lopdf::{encryption::DecryptionError, Document};

use crate::util::{basic::SError, rw::StringBuffer};

/// page_num should be one-based
pub fn parseable_page_marker(page_num: u32) -> String {
    format!("PAGE_BREAK<{page_num}>")
}

pub fn get_page_marker_pattern() -> regex::Regex {
    regex::Regex::new(r"PAGE_BREAK<(\d+)>").unwrap()
}

/// Loads the PDF at path, decrypting it with password if it is encrypted.
/// An empty password is valid, and is what unprotected-but-encrypted
/// documents use.
///
/// Only a rejected password is reported as "Incorrect Password". Other
/// decryption failures carry lopdf's own message.
pub fn load_document(path: &Path, password: &str) -> Result<Document, SError> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Unable to read {}: {}", path.display(), e))?;
    let mut doc = Document::load_mem(&bytes)
        .map_err(|e| format!("Unable to load PDF {}: {}", path.display(), e))?;

    if doc.is_encrypted() {
        tracing::debug!("{} is encrypted", path.display());
        doc.decrypt(password).map_err(|e| {
            tracing::debug!("Decrypting {} failed: {:?}", path.display(), e);
            match e {
                lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => {
                    format!("Incorrect Password: unable to decrypt {}", path.display())
                }
                // eg. AES (V4/V5) encryption, which lopdf cannot open.
                _ => format!("Unable to decrypt {}: {}", path.display(), e),
            }
        })?;
    }
    Ok(doc)
}

/// Remove pages not in page_numbers_to_keep.
/// These page numbers should be 1-based.
pub fn filter_pdf_pages(doc: &mut Document, page_numbers_to_keep: &[u32]) -> (u32, u32) {
    let mut total_pages = 0;
    let mut pages_remaining = 0;

    let mut undesired_page_numbers = Vec::<u32>::new();
    for (i, _) in doc.page_iter().enumerate() {
        total_pages += 1;
        let page_num = i as u32 + 1;
        if !page_numbers_to_keep.contains(&page_num) {
            undesired_page_numbers.push(page_num);
        } else {
            pages_remaining += 1;
        }
    }

    doc.delete_pages(&undesired_page_numbers);
    (total_pages, pages_remaining)
}

fn panic_message(e: &Box<dyn Any + Send>) -> String {
    if let Some(s) = e.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = e.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}

/// pdf_extract will panic on some fonts and encodings it does not handle.
/// Turn those into regular errors, and keep the panic message off of stderr.
fn catch_extract_panic<T, F>(f: F) -> Result<T, SError>
where
    F: FnOnce() -> Result<T, SError>,
{
    let prev_hook = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        tracing::debug!("PDF text extraction panicked: {info}");
    }));
    let res = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(prev_hook);

    match res {
        Ok(r) => r,
        Err(e) => Err(format!("PDF text extraction failed: {}", panic_message(&e))),
    }
}

pub fn write_doc_text(doc: &Document, w: &mut dyn std::io::Write) -> Result<(), SError> {
    catch_extract_panic(|| {
        let mut output = pdf_extract::PlainTextOutput::new(w);
        pdf_extract::output_doc(doc, &mut output).map_err(|e| format!("{e:?}"))
    })
}

pub fn write_page_text(doc: &Document, page: u32, w: &mut dyn std::io::Write)
    -> Result<(), SError> {
    let mut copy = doc.clone();
    filter_pdf_pages(&mut copy, &[page]);
    write_doc_text(&copy, w)
}

pub fn get_page_text(doc: &Document, page: u32) -> Result<String, SError> {
    let mut buf = StringBuffer::new();
    write_page_text(doc, page, &mut buf)?;
    Ok(buf.export_string())
}

pub fn get_all_pages_text(doc: &Document) -> Result<Vec<String>, SError> {
    let n_pages = doc.get_pages().len() as u32;
    (1..=n_pages)
        .map(|page| {
            get_page_text(doc, page).map_err(|e| format!("Page {page}: {e}"))
        })
        .collect()
}

pub fn get_all_pages_text_from_path(path: &Path, password: &str)
    -> Result<Vec<String>, SError> {
    let doc = load_document(path, password)?;
    tracing::debug!("Extracting text from {} pages", doc.get_pages().len());
    get_all_pages_text(&doc)
}
