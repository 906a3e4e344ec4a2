//! Text extraction for Office Open XML uploads (.docx, .pptx).
//!
//! Both formats are zip archives of XML parts. Visible text runs are kept,
//! one line per paragraph, with tabs and line breaks preserved.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::LazyLock;
use zip::ZipArchive;

use crate::reader::{FileKind, ReadError};

static SLIDE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("valid regex"));

/// Element names that carry paragraph text in one OOXML dialect.
struct Markup {
    paragraph: &'static [u8],
    text: &'static [u8],
    tab: Option<&'static [u8]>,
    breaks: &'static [&'static [u8]],
    hidden: &'static [&'static [u8]],
}

const WORDPROCESSING: Markup = Markup {
    paragraph: b"w:p",
    text: b"w:t",
    tab: Some(b"w:tab"),
    breaks: &[b"w:br", b"w:cr"],
    hidden: &[b"w:instrText", b"w:delText"],
};

// a:tab only appears as a tab stop definition inside paragraph properties.
const DRAWING: Markup = Markup {
    paragraph: b"a:p",
    text: b"a:t",
    tab: None,
    breaks: &[b"a:br"],
    hidden: &[],
};

impl Markup {
    /// Property blocks (`w:pPr`, `a:rPr`, ...) and deleted or field-code text.
    fn is_hidden(&self, name: &[u8]) -> bool {
        name.ends_with(b"Pr") || self.hidden.iter().any(|h| *h == name)
    }
}

pub fn extract_docx(bytes: &[u8]) -> Result<String, ReadError> {
    let mut archive = open_archive(FileKind::Docx, bytes)?;
    let part = "word/document.xml";
    let xml = read_part(&mut archive, FileKind::Docx, part)?;
    let lines = paragraph_lines(&xml, &WORDPROCESSING).map_err(|e| ReadError::Archive {
        kind: FileKind::Docx,
        message: format!("{}: {}", part, e),
    })?;

    Ok(lines.join("\n"))
}

pub fn extract_pptx(bytes: &[u8]) -> Result<String, ReadError> {
    let mut archive = open_archive(FileKind::Pptx, bytes)?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = SLIDE_PART.captures(name)?.get(1)?.as_str().parse().ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    let mut text = String::new();
    for (_, part) in &slides {
        let xml = read_part(&mut archive, FileKind::Pptx, part)?;
        let lines = paragraph_lines(&xml, &DRAWING).map_err(|e| ReadError::Archive {
            kind: FileKind::Pptx,
            message: format!("{}: {}", part, e),
        })?;
        for line in lines {
            text.push_str(&line);
            text.push('\n');
        }
    }

    Ok(text)
}

fn open_archive(kind: FileKind, bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>, ReadError> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| ReadError::Archive {
        kind,
        message: e.to_string(),
    })
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    kind: FileKind,
    name: &str,
) -> Result<String, ReadError> {
    let mut part = archive.by_name(name).map_err(|e| ReadError::Archive {
        kind,
        message: format!("{}: {}", name, e),
    })?;

    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(|e| ReadError::Archive {
        kind,
        message: format!("{}: {}", name, e),
    })?;

    Ok(xml)
}

/// One string per paragraph, in document order.
///
/// Text directly inside a paragraph counts as well as text inside run
/// elements. Whitespace-only text between tags is layout and is skipped.
fn paragraph_lines(xml: &str, markup: &Markup) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut lines = Vec::new();
    // Open paragraphs (text boxes nest them) with the element depth inside each.
    let mut open: Vec<(String, usize)> = Vec::new();
    let mut hidden_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                let name = name.as_ref();
                if name == markup.paragraph {
                    open.push((String::new(), 0));
                } else if let Some((_, depth)) = open.last_mut() {
                    *depth += 1;
                    if hidden_depth > 0 || markup.is_hidden(name) {
                        hidden_depth += 1;
                    } else if name == markup.text {
                        in_text = true;
                    }
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                let name = name.as_ref();
                if name == markup.paragraph {
                    lines.push(String::new());
                } else if let Some((line, _)) = open.last_mut() {
                    if hidden_depth == 0 {
                        if markup.tab.is_some_and(|tab| tab == name) {
                            line.push('\t');
                        } else if markup.breaks.iter().any(|b| *b == name) {
                            line.push('\n');
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let Some((line, depth)) = open.last_mut() {
                    if hidden_depth == 0 {
                        let text = t.unescape()?;
                        if in_text || (*depth == 0 && !text.trim().is_empty()) {
                            line.push_str(&text);
                        }
                    }
                }
            }
            Event::End(e) => {
                let name = e.name();
                let name = name.as_ref();
                if name == markup.paragraph {
                    if let Some((line, _)) = open.pop() {
                        lines.push(line);
                    }
                } else if let Some((_, depth)) = open.last_mut() {
                    *depth = depth.saturating_sub(1);
                    if hidden_depth > 0 {
                        hidden_depth -= 1;
                    } else if name == markup.text {
                        in_text = false;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(lines)
}
