//! Minimal PDF support: a plain-text page writer and a page counter.
//!
//! The writer produces the simplest valid PDF that viewers accept: one
//! Helvetica-set text block per page, US Letter media box. It exists so the
//! in-process fallback strategy can emit a readable document without an
//! external renderer.

use std::path::Path;

use crate::error::{Error, Result};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 50.0;
const FONT_SIZE: f32 = 12.0;
const LEADING: f32 = 16.0;
const MAX_LINE_CHARS: usize = 90;

/// Write `pages` as a text PDF, one entry per page, one string per line.
pub fn write_text_pdf(path: &Path, pages: &[Vec<String>]) -> Result<()> {
    if pages.is_empty() {
        return Err(Error::failed("cannot write a PDF with no pages"));
    }

    let mut buf: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();
    buf.extend_from_slice(b"%PDF-1.4\n");

    // Object 1: catalog. Object 2: page tree. Object 3: shared font.
    // Objects 4.. alternate page/content per input page.
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();

    push_object(
        &mut buf,
        &mut offsets,
        1,
        "<< /Type /Catalog /Pages 2 0 R >>",
    );
    push_object(
        &mut buf,
        &mut offsets,
        2,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
    );
    push_object(
        &mut buf,
        &mut offsets,
        3,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>",
    );

    for (i, lines) in pages.iter().enumerate() {
        let page_id = 4 + 2 * i;
        let content_id = page_id + 1;

        push_object(
            &mut buf,
            &mut offsets,
            page_id,
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {content_id} 0 R >>"
            ),
        );

        let stream = content_stream(lines);
        offsets.push(buf.len());
        buf.extend_from_slice(
            format!(
                "{content_id} 0 obj\n<< /Length {} >>\nstream\n{stream}\nendstream\nendobj\n",
                stream.len()
            )
            .as_bytes(),
        );
    }

    let object_count = offsets.len() + 1;
    let xref_offset = buf.len();
    buf.extend_from_slice(format!("xref\n0 {object_count}\n").as_bytes());
    buf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        buf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    buf.extend_from_slice(
        format!(
            "trailer\n<< /Size {object_count} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        )
        .as_bytes(),
    );

    std::fs::write(path, buf)?;
    Ok(())
}

fn push_object(buf: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, body: &str) {
    offsets.push(buf.len());
    buf.extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
}

fn content_stream(lines: &[String]) -> String {
    let max_lines = ((PAGE_HEIGHT - 2.0 * MARGIN) / LEADING) as usize;
    let start_y = PAGE_HEIGHT - MARGIN;
    let mut stream = format!("BT\n/F1 {FONT_SIZE} Tf\n{LEADING} TL\n{MARGIN} {start_y} Td\n");
    for line in lines.iter().take(max_lines) {
        let mut line = line.as_str();
        if line.len() > MAX_LINE_CHARS {
            let mut end = MAX_LINE_CHARS;
            while end > 0 && !line.is_char_boundary(end) {
                end -= 1;
            }
            line = &line[..end];
        }
        stream.push_str(&format!("({}) Tj\nT*\n", escape_pdf_text(line)));
    }
    stream.push_str("ET");
    stream
}

fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            // The writer sets no encoding beyond Latin-1; drop anything wider.
            c if (c as u32) < 256 => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Count pages by scanning for `/Type /Page` dictionary entries.
///
/// Works on uncompressed page dictionaries, which covers LibreOffice output
/// and this module's own writer. Returns 0 when no page objects are found.
pub fn page_count(path: &Path) -> Result<usize> {
    let bytes = std::fs::read(path)?;
    if !bytes.starts_with(b"%PDF") {
        return Err(Error::failed(format!(
            "{} is not a PDF document",
            path.display()
        )));
    }

    let mut count = 0usize;
    let mut i = 0;
    while let Some(pos) = find(&bytes[i..], b"/Type") {
        let mut j = i + pos + b"/Type".len();
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes[j..].starts_with(b"/Page")
            && bytes.get(j + b"/Page".len()) != Some(&b's')
        {
            count += 1;
        }
        i += pos + b"/Type".len();
    }
    Ok(count)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
