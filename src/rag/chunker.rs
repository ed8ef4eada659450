// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document chunking engine
//!
//! Splits raw document text into an ordered sequence of chunks using one of
//! three strategies:
//! - **Fixed**: sliding character window with overlap
//! - **Recursive** (default): structural splitting on paragraph, line,
//!   sentence, word and finally character boundaries
//! - **Semantic**: whole-paragraph accumulation, oversized paragraphs kept
//!   intact
//!
//! Chunking is a pure function of its inputs: the same text, strategy and
//! size parameters always produce the same chunks with the same ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::rag::errors::RagError;

/// Separator hierarchy for recursive chunking, highest semantic value first.
/// The empty string is the last resort: splitting into single characters.
const SEPARATORS: [&str; 7] = ["\n\n", "\n", ". ", "! ", "? ", " ", ""];

/// Strategy used to split document text into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Sliding window of `chunk_size` characters advancing by
    /// `chunk_size - chunk_overlap`
    Fixed,
    /// Structure-aware splitting on paragraph > line > sentence > word >
    /// character boundaries; no overlap
    Recursive,
    /// Paragraph accumulation; a single paragraph larger than `chunk_size`
    /// is kept intact as an oversized chunk
    Semantic,
}

impl ChunkStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStrategy::Fixed => "fixed",
            ChunkStrategy::Recursive => "recursive",
            ChunkStrategy::Semantic => "semantic",
        }
    }
}

impl fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkStrategy {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(ChunkStrategy::Fixed),
            "recursive" => Ok(ChunkStrategy::Recursive),
            "semantic" => Ok(ChunkStrategy::Semantic),
            other => Err(RagError::Configuration {
                reason: format!(
                    "unknown chunking strategy '{}' (expected fixed, recursive or semantic)",
                    other
                ),
            }),
        }
    }
}

/// One retrievable unit of a document
///
/// `chunk_id` is derived from `doc_id` and `chunk_index` and is stable across
/// runs for the same input. `chunk_index` is contiguous starting at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub doc_id: String,
    pub chunk_index: usize,
    pub page_num: Option<u32>,
    pub text: String,
    pub char_count: usize,
    /// Rough approximation: 1 token ~ 4 characters. Not a tokenizer.
    pub token_estimate: usize,
}

impl Chunk {
    /// Build a chunk record for text that has already been split,
    /// deriving the id and size fields
    pub fn assemble(doc_id: &str, chunk_index: usize, text: String, page_num: Option<u32>) -> Self {
        let char_count = char_len(&text);
        Self {
            chunk_id: format!("{}_chunk_{}", doc_id, chunk_index),
            doc_id: doc_id.to_string(),
            chunk_index,
            page_num,
            char_count,
            token_estimate: char_count / 4,
            text,
        }
    }
}

/// Split `text` into chunks using the given strategy
///
/// # Arguments
/// * `text` - Raw document text; may be empty (produces zero chunks)
/// * `doc_id` - Document identifier baked into each chunk_id
/// * `strategy` - One of fixed / recursive / semantic
/// * `chunk_size` - Maximum chunk length in characters (must be > 0)
/// * `chunk_overlap` - Overlap between consecutive fixed-size windows
///   (must be < chunk_size; ignored by the other strategies)
/// * `page_nums` - Optional page numbers aligned positionally: the i-th
///   chunk gets `page_nums[i]` when in range. Callers needing exact page
///   attribution must chunk page-segmented text instead.
///
/// # Errors
/// `RagError::Configuration` when `chunk_size` is 0 or
/// `chunk_overlap >= chunk_size`.
pub fn chunk(
    text: &str,
    doc_id: &str,
    strategy: ChunkStrategy,
    chunk_size: usize,
    chunk_overlap: usize,
    page_nums: Option<&[u32]>,
) -> Result<Vec<Chunk>, RagError> {
    if chunk_size == 0 {
        return Err(RagError::Configuration {
            reason: "chunk_size must be greater than zero".to_string(),
        });
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::Configuration {
            reason: format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            ),
        });
    }

    let pieces = match strategy {
        ChunkStrategy::Fixed => fixed_pieces(text, chunk_size, chunk_overlap),
        ChunkStrategy::Recursive => split_recursive(text, chunk_size, 0),
        ChunkStrategy::Semantic => semantic_pieces(text, chunk_size),
    };

    let chunks: Vec<Chunk> = pieces
        .into_iter()
        .filter(|piece| !piece.trim().is_empty())
        .enumerate()
        .map(|(i, text)| {
            let page_num = page_nums.and_then(|pages| pages.get(i).copied());
            Chunk::assemble(doc_id, i, text, page_num)
        })
        .collect();

    tracing::debug!(
        "{} chunking produced {} chunks for {}",
        strategy,
        chunks.len(),
        doc_id
    );
    Ok(chunks)
}

/// Length in characters, not bytes. Sizes and offsets are specified in
/// characters so multi-byte text never splits inside a code point.
fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Sliding window over the text's characters. Stops at the first window
/// that is empty or all-whitespace, dropping any remainder.
fn fixed_pieces(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - chunk_overlap;

    let mut pieces = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();

        if window.trim().is_empty() {
            break;
        }

        pieces.push(window);
        start += step;
    }
    pieces
}

/// Hierarchical splitting: accumulate separator-delimited parts until the
/// buffer would exceed `chunk_size`, re-splitting any single oversized part
/// with the next separator down. No text is dropped beyond whitespace
/// trimmed at chunk edges.
fn split_recursive(text: &str, chunk_size: usize, sep_index: usize) -> Vec<String> {
    if sep_index >= SEPARATORS.len() {
        return vec![text.to_string()];
    }

    let separator = SEPARATORS[sep_index];
    let parts: Vec<String> = if separator.is_empty() {
        tracing::debug!(
            "splitting oversized token of {} chars at character granularity",
            char_len(text)
        );
        text.chars().map(String::from).collect()
    } else {
        // Each part keeps its separator so recombination loses nothing.
        text.split(separator)
            .map(|part| format!("{}{}", part, separator))
            .collect()
    };

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for part in parts {
        let part_len = char_len(&part);

        if current_len + part_len <= chunk_size {
            current.push_str(&part);
            current_len += part_len;
            continue;
        }

        if !current.trim().is_empty() {
            pieces.push(current.trim().to_string());
        }
        current.clear();
        current_len = 0;

        if part_len > chunk_size {
            pieces.extend(split_recursive(&part, chunk_size, sep_index + 1));
        } else {
            current = part;
            current_len = part_len;
        }
    }

    if !current.trim().is_empty() {
        pieces.push(current.trim().to_string());
    }

    pieces
}

/// Whole-paragraph accumulation. Splitting on "\n\n" and skipping blank
/// paragraphs collapses longer newline runs as well.
fn semantic_pieces(text: &str, chunk_size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for para in text.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        let para_len = char_len(para);

        if !current.is_empty() && current_len + para_len > chunk_size {
            pieces.push(current.trim().to_string());
            current.clear();
            current_len = 0;
        }

        current.push_str(para);
        current.push_str("\n\n");
        current_len += para_len + 2;
    }

    if !current.trim().is_empty() {
        pieces.push(current.trim().to_string());
    }

    pieces
}
