//! Minimal paginated text PDF writer.
//!
//! Produces a PDF 1.4 file with one Helvetica font (WinAnsi encoding) and
//! fixed-height lines on A4 pages. Enough for plain reports, nothing more.

use crate::types::Result;
use std::path::Path;

const PAGE_WIDTH: f64 = 595.28;
const PAGE_HEIGHT: f64 = 841.89;
const MARGIN: f64 = 28.35;
const LINE_HEIGHT: f64 = 28.35;
const FONT_SIZE: f64 = 12.0;

/// Text document laid out one line at a time.
#[derive(Debug, Clone, Default)]
pub struct PdfDocument {
    title: String,
    lines: Vec<String>,
}

impl PdfDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    /// Lines that fit on one page.
    pub fn lines_per_page() -> usize {
        ((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT).floor() as usize
    }

    pub fn page_count(&self) -> usize {
        self.lines.len().div_ceil(Self::lines_per_page()).max(1)
    }

    /// Write the document to `path`.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let pages: Vec<&[String]> = if self.lines.is_empty() {
            vec![&self.lines[..0]]
        } else {
            self.lines.chunks(Self::lines_per_page()).collect()
        };

        // 1: catalog, 2: page tree, 3: font, 4: info, then (page, content) pairs
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| 5 + 2 * i).collect();
        let mut objects: Vec<Vec<u8>> = Vec::with_capacity(4 + 2 * pages.len());

        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
        objects.push(
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            )
            .into_bytes(),
        );

        objects.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );

        let mut info = b"<< /Title ".to_vec();
        info.extend(pdf_string(&self.title));
        info.extend(
            format!(
                " /Producer (tabsh) /CreationDate (D:{}) >>",
                chrono::Local::now().format("%Y%m%d%H%M%S")
            )
            .into_bytes(),
        );
        objects.push(info);

        for (page, id) in pages.iter().zip(&page_ids) {
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                    PAGE_WIDTH,
                    PAGE_HEIGHT,
                    id + 1
                )
                .into_bytes(),
            );

            let content = page_content(page);
            let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
            stream.extend(content);
            stream.extend(b"\nendstream");
            objects.push(stream);
        }

        let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend(format!("{} 0 obj\n", i + 1).into_bytes());
            out.extend(body);
            out.extend(b"\nendobj\n");
        }

        let xref = out.len();
        out.extend(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).into_bytes());
        for offset in offsets {
            out.extend(format!("{:010} 00000 n \n", offset).into_bytes());
        }
        out.extend(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R /Info 4 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref
            )
            .into_bytes(),
        );
        out
    }
}

fn page_content(lines: &[String]) -> Vec<u8> {
    let mut content = format!("BT\n/F1 {} Tf\n", FONT_SIZE).into_bytes();
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = PAGE_HEIGHT - MARGIN - (i as f64 + 0.7) * LINE_HEIGHT;
        content.extend(format!("1 0 0 1 {:.2} {:.2} Tm ", MARGIN, y).into_bytes());
        content.extend(pdf_string(line));
        content.extend(b" Tj\n");
    }
    content.extend(b"ET");
    content
}

/// Encode text as a PDF literal string.
///
/// Characters outside Latin-1 are replaced by `?`.
fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = vec![b'('];
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            c if (c as u32) < 0x20 => out.push(b' '),
            c if (c as u32) <= 0xFF => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out.push(b')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_single_page_document() {
        let mut doc = PdfDocument::new("Report");
        doc.line("Project: Alpha").blank().line("Task: (draft)");

        let bytes = doc.to_bytes();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert!(contains(&bytes, b"/Count 1"));
        assert!(contains(&bytes, b"(Task: \\(draft\\)) Tj"));
    }

    #[test]
    fn test_pagination() {
        let mut doc = PdfDocument::new("Long");
        for i in 0..(PdfDocument::lines_per_page() * 2 + 1) {
            doc.line(format!("line {}", i));
        }
        assert_eq!(doc.page_count(), 3);
        assert!(contains(&doc.to_bytes(), b"/Count 3"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut doc = PdfDocument::new("Offsets");
        doc.line("one").line("two");
        let bytes = doc.to_bytes();
        let text = String::from_utf8_lossy(&bytes);

        let xref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(bytes[xref..].starts_with(b"xref\n"));

        let entries: Vec<usize> = text[xref..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert!(!entries.is_empty());
        for (i, offset) in entries.iter().enumerate() {
            let header = format!("{} 0 obj\n", i + 1);
            assert!(bytes[*offset..].starts_with(header.as_bytes()));
        }
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let doc = PdfDocument::new("Empty");
        assert_eq!(doc.page_count(), 1);
        assert!(contains(&doc.to_bytes(), b"/Count 1"));
    }

    #[test]
    fn test_latin1_encoding() {
        assert_eq!(pdf_string("Não"), vec![b'(', b'N', 0xE3, b'o', b')']);
        assert_eq!(pdf_string("→"), b"(?)".to_vec());
    }
}
