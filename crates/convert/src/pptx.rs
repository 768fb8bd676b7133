//! Text extraction from OOXML presentations.
//!
//! A `.pptx` file is a zip archive holding one `ppt/slides/slideN.xml` part
//! per slide, with visible text in `<a:t>` runs grouped by `<a:p>`
//! paragraphs. Only stored and DEFLATE members occur in practice, so this
//! module walks the zip central directory directly instead of pulling in a
//! full archive crate.

use std::{io::Read, path::Path};

use {
    flate2::read::DeflateDecoder,
    quick_xml::{Reader, events::Event},
};

use crate::error::{Error, Result};

const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
const CENTRAL_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];
const LOCAL_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// Extract the paragraphs of every slide, in slide order.
pub fn slide_texts(path: &Path) -> Result<Vec<Vec<String>>> {
    let bytes = std::fs::read(path)?;
    let mut slides: Vec<(u32, Vec<String>)> = Vec::new();

    for entry in central_directory(&bytes)? {
        let Some(number) = slide_number(&entry.name) else {
            continue;
        };
        let xml = member_data(&bytes, &entry)?;
        slides.push((number, paragraphs(&xml)?));
    }

    if slides.is_empty() {
        return Err(Error::failed("no slides found in presentation"));
    }
    slides.sort_by_key(|(number, _)| *number);
    Ok(slides.into_iter().map(|(_, text)| text).collect())
}

struct CentralEntry {
    name: String,
    method: u16,
    compressed_size: usize,
    local_offset: usize,
}

fn central_directory(bytes: &[u8]) -> Result<Vec<CentralEntry>> {
    // The end-of-central-directory record sits in the trailing 64 KB
    // (22-byte fixed part plus an optional comment).
    let tail_start = bytes.len().saturating_sub(66_000);
    let eocd = bytes[tail_start..]
        .windows(4)
        .rposition(|w| w == EOCD_SIGNATURE)
        .map(|p| tail_start + p)
        .ok_or_else(|| Error::failed("not a zip archive (missing end record)"))?;

    let entry_count = u16_at(bytes, eocd + 10)? as usize;
    let mut offset = u32_at(bytes, eocd + 16)? as usize;

    let mut entries = Vec::with_capacity(entry_count);
    for _ in 0..entry_count {
        if bytes.get(offset..offset + 4) != Some(&CENTRAL_SIGNATURE) {
            return Err(Error::failed("malformed zip central directory"));
        }
        let method = u16_at(bytes, offset + 10)?;
        let compressed_size = u32_at(bytes, offset + 20)? as usize;
        let name_len = u16_at(bytes, offset + 28)? as usize;
        let extra_len = u16_at(bytes, offset + 30)? as usize;
        let comment_len = u16_at(bytes, offset + 32)? as usize;
        let local_offset = u32_at(bytes, offset + 42)? as usize;
        let name = bytes
            .get(offset + 46..offset + 46 + name_len)
            .ok_or_else(|| Error::failed("truncated zip entry name"))?;

        entries.push(CentralEntry {
            name: String::from_utf8_lossy(name).into_owned(),
            method,
            compressed_size,
            local_offset,
        });
        offset += 46 + name_len + extra_len + comment_len;
    }
    Ok(entries)
}

fn member_data(bytes: &[u8], entry: &CentralEntry) -> Result<Vec<u8>> {
    let p = entry.local_offset;
    if bytes.get(p..p + 4) != Some(&LOCAL_SIGNATURE) {
        return Err(Error::failed("malformed zip local header"));
    }
    let name_len = u16_at(bytes, p + 26)? as usize;
    let extra_len = u16_at(bytes, p + 28)? as usize;
    let start = p + 30 + name_len + extra_len;
    let data = bytes
        .get(start..start + entry.compressed_size)
        .ok_or_else(|| Error::failed("truncated zip member"))?;

    match entry.method {
        0 => Ok(data.to_vec()),
        8 => {
            let mut out = Vec::new();
            DeflateDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| Error::failed(format!("bad DEFLATE stream in {}: {e}", entry.name)))?;
            Ok(out)
        },
        method => Err(Error::failed(format!(
            "unsupported zip compression method {method} for {}",
            entry.name
        ))),
    }
}

/// `ppt/slides/slide7.xml` → `Some(7)`.
fn slide_number(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("ppt/slides/slide")?;
    let digits = rest.strip_suffix(".xml")?;
    digits.parse().ok()
}

/// Collect `<a:t>` runs grouped into `<a:p>` paragraphs.
fn paragraphs(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::failed(format!("malformed slide XML: {e}")))?
        {
            Event::Start(ref e) if e.name().as_ref() == b"a:t" => in_text_run = true,
            Event::End(ref e) if e.name().as_ref() == b"a:t" => in_text_run = false,
            Event::End(ref e) if e.name().as_ref() == b"a:p" => {
                let paragraph = current.trim();
                if !paragraph.is_empty() {
                    out.push(paragraph.to_owned());
                }
                current.clear();
            },
            Event::Text(ref t) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::failed(format!("malformed slide XML: {e}")))?;
                current.push_str(&text);
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_owned());
    }
    Ok(out)
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a stored (uncompressed) zip archive from (name, data) pairs.
    pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut central = Vec::new();
        let mut offsets = Vec::new();

        for (name, data) in entries {
            offsets.push(buf.len() as u32);
            buf.extend_from_slice(&LOCAL_SIGNATURE);
            buf.extend_from_slice(&[20, 0, 0, 0, 0, 0, 0, 0, 0, 0]); // version, flags, method, time, date
            buf.extend_from_slice(&[0, 0, 0, 0]); // crc (unchecked by the reader)
            buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
            buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
            buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
            buf.extend_from_slice(&0u16.to_le_bytes());
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(data);
        }

        let cd_offset = buf.len() as u32;
        for ((name, data), offset) in entries.iter().zip(&offsets) {
            central.extend_from_slice(&CENTRAL_SIGNATURE);
            central.extend_from_slice(&[20, 0, 20, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
            central.extend_from_slice(&[0, 0, 0, 0]); // crc
            central.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central.extend_from_slice(&[0; 12]); // extra, comment, disk, attrs
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(name.as_bytes());
        }
        buf.extend_from_slice(&central);

        buf.extend_from_slice(&EOCD_SIGNATURE);
        buf.extend_from_slice(&[0, 0, 0, 0]);
        buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        buf.extend_from_slice(&(central.len() as u32).to_le_bytes());
        buf.extend_from_slice(&cd_offset.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf
    }

    pub(crate) fn slide_xml(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{p}</a:t></a:r></a:p>"))
            .collect();
        format!(
            "<?xml version=\"1.0\"?><p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
             <p:cSld><p:spTree><p:sp><p:txBody>{body}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"
        )
    }

    pub(crate) fn build_pptx(slides: &[&[&str]]) -> Vec<u8> {
        let xmls: Vec<(String, String)> = slides
            .iter()
            .enumerate()
            .map(|(i, paragraphs)| {
                (format!("ppt/slides/slide{}.xml", i + 1), slide_xml(paragraphs))
            })
            .collect();
        let mut entries: Vec<(&str, &[u8])> =
            vec![("[Content_Types].xml", b"<Types/>".as_slice())];
        for (name, xml) in &xmls {
            entries.push((name.as_str(), xml.as_bytes()));
        }
        build_zip(&entries)
    }

    #[test]
    fn extracts_paragraphs_in_slide_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        std::fs::write(
            &path,
            build_pptx(&[&["Title", "First point"], &["Second slide"]]),
        )
        .unwrap();

        let slides = slide_texts(&path).unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0], vec!["Title", "First point"]);
        assert_eq!(slides[1], vec!["Second slide"]);
    }

    #[test]
    fn entities_are_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        std::fs::write(&path, build_pptx(&[&["Q &amp; A"]])).unwrap();
        let slides = slide_texts(&path).unwrap();
        assert_eq!(slides[0], vec!["Q & A"]);
    }

    #[test]
    fn archive_without_slides_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pptx");
        std::fs::write(&path, build_zip(&[("docProps/app.xml", b"<x/>")])).unwrap();
        assert!(matches!(slide_texts(&path), Err(Error::Failed(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.pptx");
        std::fs::write(&path, b"this is not a zip").unwrap();
        assert!(slide_texts(&path).is_err());
    }
}

fn u16_at(bytes: &[u8], offset: usize) -> Result<u16> {
    bytes
        .get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| Error::failed("truncated zip archive"))
}

fn u32_at(bytes: &[u8], offset: usize) -> Result<u32> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| Error::failed("truncated zip archive"))
}
