//! What a caller does with search results before prompt assembly: decide
//! whether local knowledge is enough, cite sources and bound passage length.
use serde::Serialize;

use maintdb_core::config::SearchConfig;
use maintdb_core::types::{DocType, SearchResult};

/// Context blocks joined into one prompt at most.
pub const MAX_CONTEXT_BLOCKS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalPolicy {
    pub k: usize,
    /// Fewer local passages than this and the caller should consult its
    /// fallback source as well.
    pub min_local_passages: usize,
    pub passage_char_limit: usize,
    pub citation_base: String,
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for RetrievalPolicy {
    fn from(config: &SearchConfig) -> Self {
        Self {
            k: config.default_k,
            min_local_passages: config.min_local_passages,
            passage_char_limit: config.passage_char_limit,
            citation_base: config.citation_base.clone(),
        }
    }
}

/// User-facing link to the page a passage came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub name: String,
    pub page: u32,
    pub doc_type: DocType,
    pub href: String,
}

impl RetrievalPolicy {
    pub fn needs_fallback(&self, results: &[SearchResult]) -> bool {
        results.len() < self.min_local_passages
    }

    pub fn citation(&self, result: &SearchResult) -> Citation {
        let name = result.chunk.file_name().to_string();
        let href = format!("{}{}#page={}", self.citation_base, urlencoding::encode(&name), result.chunk.page);
        Citation { name, page: result.chunk.page, doc_type: result.chunk.doc_type, href }
    }

    /// First `passage_char_limit` characters of `text`.
    pub fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.passage_char_limit) {
            Some((end, _)) => &text[..end],
            None => text,
        }
    }

    /// `[Source: <name> • <.ext> • p.<page>]` followed by the bounded passage.
    pub fn context_block(&self, result: &SearchResult) -> String {
        format!(
            "[Source: {} • {} • p.{}]\n{}",
            result.chunk.file_name(),
            result.chunk.doc_type.extension_label(),
            result.chunk.page,
            self.truncate(&result.chunk.text)
        )
    }

    /// Context blocks of the leading results, separated by `---` rules.
    pub fn render_context(&self, results: &[SearchResult]) -> String {
        results
            .iter()
            .take(MAX_CONTEXT_BLOCKS)
            .map(|r| self.context_block(r))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}
