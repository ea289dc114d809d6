//! PDF text extraction via `pdf-extract`.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::{ExtractedText, Extractor};
use desk_core::Error;

/// Every PDF starts with this signature (possibly after a few junk bytes).
const PDF_MAGIC: &[u8] = b"%PDF-";

/// How far into the file the signature may appear.
const MAGIC_SEARCH_WINDOW: usize = 1024;

/// Extracts page text from PDF bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn has_pdf_signature(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(MAGIC_SEARCH_WINDOW)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

impl Extractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8], source: &str) -> Result<ExtractedText, Error> {
        if !has_pdf_signature(bytes) {
            return Err(Error::Format(format!("{source}: not a PDF ({} bytes, no %PDF- header)", bytes.len())));
        }

        // pdf-extract panics on some malformed fonts and streams
        let pages = match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem_by_pages(bytes))) {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                tracing::warn!(document = source, error = %e, "PDF parse failed");
                return Err(Error::Format(format!("{source}: {e}")));
            }
            Err(_) => {
                tracing::warn!(document = source, "PDF parser panicked");
                return Err(Error::Format(format!("{source}: PDF parser panicked")));
            }
        };

        ExtractedText::from_pages(pages, source)
    }
}
