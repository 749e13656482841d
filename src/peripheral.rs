pub mod parse_cas_impl;

#[cfg(feature = "pdf_parse")]
pub mod pdf;
