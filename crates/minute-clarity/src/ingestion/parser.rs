//! Format-dispatched text extraction

use calamine::Reader;

use crate::error::{Error, Result};
use crate::types::FileType;

/// Multi-format file parser
///
/// A fixed dispatch from file type to a pure `(bytes) -> text` extraction
/// routine; adding a format means adding an arm.
pub struct FileParser;

impl FileParser {
    /// Extract the full text of a file using the extraction routine for its
    /// type
    pub fn extract(file_type: FileType, filename: &str, data: &[u8]) -> Result<String> {
        match file_type {
            FileType::Pdf => Self::extract_pdf(filename, data),
            FileType::Docx => Self::extract_docx(filename, data),
            FileType::Txt => Ok(Self::extract_text(data)),
            FileType::Xlsx => Self::extract_xlsx(filename, data),
            FileType::Unknown => Err(Error::UnsupportedFileType(filename.to_string())),
        }
    }

    /// Extract PDF text
    fn extract_pdf(filename: &str, data: &[u8]) -> Result<String> {
        let content = match pdf_extract::extract_text_from_mem(data) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("pdf-extract failed for '{}': {}, trying fallback", filename, e);
                Self::extract_pdf_fallback(filename, data)?
            }
        };

        // Strip null chars and collapse the whitespace noise PDF extraction
        // tends to produce
        let content = content
            .replace('\0', "")
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if content.is_empty() {
            return Err(Error::file_parse(
                filename,
                "no text content could be extracted from PDF",
            ));
        }

        Ok(content)
    }

    /// Fallback PDF text extraction using lopdf directly
    fn extract_pdf_fallback(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("failed to load PDF: {}", e)))?;

        let mut all_text = String::new();
        for (page_num, page_id) in doc.get_pages() {
            match doc.get_page_content(page_id) {
                Ok(content) => {
                    let text = Self::extract_text_from_content(&content);
                    if !text.is_empty() {
                        all_text.push_str(&text);
                        all_text.push('\n');
                    }
                }
                Err(e) => {
                    tracing::debug!("Could not get content for page {}: {}", page_num, e);
                }
            }
        }

        if all_text.trim().is_empty() {
            return Err(Error::file_parse(
                filename,
                "PDF appears to be image-based or has no extractable text",
            ));
        }

        Ok(all_text)
    }

    /// Extract text from a PDF content stream
    ///
    /// Reads text-show operators between BT and ET blocks. Covers simple
    /// PDFs that pdf-extract chokes on.
    fn extract_text_from_content(content: &[u8]) -> String {
        let content_str = String::from_utf8_lossy(content);
        let mut text = String::new();
        let mut in_text_block = false;
        let mut current_text = String::new();

        for line in content_str.lines() {
            let line = line.trim();

            if line == "BT" {
                in_text_block = true;
                continue;
            }

            if line == "ET" {
                in_text_block = false;
                if !current_text.is_empty() {
                    text.push_str(&current_text);
                    text.push(' ');
                    current_text.clear();
                }
                continue;
            }

            if in_text_block && (line.ends_with("Tj") || line.ends_with("TJ")) {
                if let Some(start) = line.find('(') {
                    if let Some(end) = line.rfind(')') {
                        let extracted = &line[start + 1..end];
                        let decoded = extracted
                            .replace("\\n", "\n")
                            .replace("\\r", "\r")
                            .replace("\\t", "\t")
                            .replace("\\(", "(")
                            .replace("\\)", ")")
                            .replace("\\\\", "\\");
                        current_text.push_str(&decoded);
                    }
                }
            }
        }

        text
    }

    /// Extract DOCX text
    fn extract_docx(filename: &str, data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut content = String::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                content.push_str(&t.text);
                            }
                        }
                    }
                }
                content.push('\n');
            }
        }

        Ok(content)
    }

    /// Extract plain text
    fn extract_text(data: &[u8]) -> String {
        String::from_utf8_lossy(data).to_string()
    }

    /// Extract spreadsheet text, one block per sheet with rows joined by
    /// column separators
    fn extract_xlsx(filename: &str, data: &[u8]) -> Result<String> {
        let cursor = std::io::Cursor::new(data);
        let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut content = String::new();
        for sheet_name in workbook.sheet_names().to_vec() {
            if let Ok(range) = workbook.worksheet_range(&sheet_name) {
                content.push_str(&format!("Sheet: {}\n", sheet_name));

                for row in range.rows() {
                    let row_text: Vec<String> = row
                        .iter()
                        .map(|cell| match cell {
                            calamine::Data::Empty => String::new(),
                            calamine::Data::String(s) => s.clone(),
                            calamine::Data::Float(f) => f.to_string(),
                            calamine::Data::Int(i) => i.to_string(),
                            calamine::Data::Bool(b) => b.to_string(),
                            calamine::Data::DateTime(dt) => dt.to_string(),
                            _ => String::new(),
                        })
                        .collect();

                    if !row_text.iter().all(|s| s.is_empty()) {
                        content.push_str(&row_text.join(" | "));
                        content.push('\n');
                    }
                }
                content.push('\n');
            }
        }

        Ok(content)
    }
}
