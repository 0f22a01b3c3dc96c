//! Splitting reference texts into searchable passages.
//!
//! Text is first cut into sections at markdown headings; each section is then
//! packed into passages of roughly `passage_size` characters, preferring
//! paragraph, line, sentence and word boundaries in that order. Every passage
//! remembers the heading of the section it came from.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default passage size in chars.
pub const DEFAULT_PASSAGE_SIZE: usize = 512;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+?)[ \t#]*$").unwrap());

/// A passage ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPassage {
    pub text: String,
    pub heading: Option<String>,
    pub index: usize,
    pub char_start: usize,
    pub char_end: usize,
}

/// Packs text into passages along natural boundaries.
pub struct RecursiveChunker {
    pub passage_size: usize,
    separators: Vec<&'static str>,
}

impl RecursiveChunker {
    pub fn new(passage_size: usize) -> Self {
        Self {
            passage_size: passage_size.max(16),
            separators: vec!["\n\n", "\n", ". ", " "],
        }
    }

    /// Split `text` into pieces of at most `passage_size` chars.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if char_len(text) <= self.passage_size {
            return vec![text.to_string()];
        }
        let Some((separator, remaining)) = separators.split_first() else {
            return hard_split(text, self.passage_size);
        };

        let mut pieces = Vec::new();
        let mut current = String::new();

        for part in text.split(separator) {
            if char_len(part) > self.passage_size {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
                pieces.extend(self.split_with(part, remaining));
            } else if !current.is_empty()
                && char_len(&current) + char_len(separator) + char_len(part) > self.passage_size
            {
                pieces.push(std::mem::replace(&mut current, part.to_string()));
            } else {
                if !current.is_empty() {
                    current.push_str(separator);
                }
                current.push_str(part);
            }
        }
        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new(DEFAULT_PASSAGE_SIZE)
    }
}

/// Sizes are measured in chars so non-Latin scripts get the same passage size.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Last resort for unbroken runs: cut on char boundaries.
fn hard_split(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

/// A heading-delimited section of a document.
struct Section<'a> {
    heading: Option<String>,
    body: &'a str,
    start: usize,
}

fn split_sections(text: &str) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    let mut heading: Option<String> = None;
    let mut start = 0;

    for caps in HEADING_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        sections.push(Section {
            heading: heading.take(),
            body: &text[start..whole.start()],
            start,
        });
        heading = caps.get(1).map(|m| m.as_str().trim().to_string());
        start = whole.end();
    }
    sections.push(Section {
        heading,
        body: &text[start..],
        start,
    });
    sections
}

/// Split a document into passages tagged with their section heading.
pub fn chunk_document(text: &str, chunker: &RecursiveChunker) -> Vec<TextPassage> {
    let mut passages = Vec::new();

    for section in split_sections(text) {
        let mut cursor = 0;
        for piece in chunker.split(section.body) {
            // Locate the piece to report approximate source offsets.
            let offset = section.body[cursor..]
                .find(piece.as_str())
                .map(|o| cursor + o)
                .unwrap_or(cursor);
            cursor = (offset + piece.len()).min(section.body.len());
            passages.push(TextPassage {
                char_start: section.start + offset,
                char_end: section.start + offset + piece.len(),
                heading: section.heading.clone(),
                index: passages.len(),
                text: piece,
            });
        }
    }
    passages
}

/// Passage size tuned to the file type.
pub fn passage_size_for(file_extension: Option<&str>) -> usize {
    match file_extension.map(|e| e.trim_start_matches('.').to_lowercase()) {
        Some(ext) if ext == "md" || ext == "markdown" => 600,
        _ => DEFAULT_PASSAGE_SIZE,
    }
}
