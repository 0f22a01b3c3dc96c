//! Formatting retrieved material into prompt context.

use arogya_knowledge::Passage;
use arogya_tools::SearchResult;

use crate::types::Source;

const NO_PASSAGES: &str = "No reference passages were found.";
const NO_RESULTS: &str = "No web results were found.";

/// Numbered passage block, one entry per passage.
pub fn format_passages(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return NO_PASSAGES.to_string();
    }
    passages
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let title = match &p.heading {
                Some(h) if h != &p.title => format!("{} / {}", p.title, h),
                _ => p.title.clone(),
            };
            format!("[{}] {}\n{}", i + 1, title, p.text.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Numbered web result block with urls.
pub fn format_search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[{}] {}\n{}\n{}", i + 1, r.title, r.url, r.snippet.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One source per distinct document, in retrieval order.
pub fn passage_sources(passages: &[Passage]) -> Vec<Source> {
    let mut seen = Vec::new();
    let mut sources = Vec::new();
    for p in passages {
        if seen.contains(&p.doc_id) {
            continue;
        }
        seen.push(p.doc_id);
        sources.push(Source {
            title: p.title.clone(),
            url: None,
        });
    }
    sources
}

pub fn search_sources(results: &[SearchResult]) -> Vec<Source> {
    results
        .iter()
        .map(|r| Source {
            title: r.title.clone(),
            url: Some(r.url.clone()),
        })
        .collect()
}

/// User prompt that pairs a question with its grounding material.
pub fn grounded_prompt(context_label: &str, context: &str, query: &str) -> String {
    format!(
        "{}:\n{}\n\nUser request:\n{}",
        context_label,
        context,
        query.trim()
    )
}
