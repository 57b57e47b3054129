//! Sentence-aware text chunking with overlap and position tracking.
//!
//! Input text is normalized first (whitespace collapsed, characters outside
//! letters/digits/basic punctuation stripped). The normalization is lossy and
//! irreversible; every span produced here indexes the *normalized* text, not
//! the original. All lengths and positions are char counts.

use docret_config::{ChunkingConfig, ConfigError, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?;:\-()]").unwrap());
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// One chunk of normalized text with its char span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextChunk {
    pub content: String,
    /// Content length in chars, equals `end - start`
    pub length: usize,
    /// Half-open char span `[start, end)` into the normalized text
    pub start: usize,
    pub end: usize,
}

/// Splits normalized text into overlapping, position-tracked chunks.
///
/// Sentences are accumulated greedily up to `chunk_size` chars; when a chunk
/// closes, the next one is seeded with the last `overlap` chars of it. A
/// single sentence longer than `chunk_size` is emitted whole: chunks never
/// split inside a sentence.
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Build a chunker from validated configuration.
    ///
    /// Fails with `ConfigError` when `overlap >= chunk_size` or
    /// `chunk_size == 0`.
    pub fn new(config: ChunkingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.overlap,
        })
    }

    /// Strip characters outside letters, digits and basic punctuation, then
    /// collapse whitespace runs to single spaces.
    ///
    /// Stripping runs first so removed characters cannot leave whitespace
    /// runs behind; the output never contains consecutive spaces.
    pub fn clean_text(text: &str) -> String {
        let stripped = DISALLOWED_CHARS.replace_all(text, "");
        let collapsed = WHITESPACE_RUNS.replace_all(&stripped, " ");
        collapsed.trim().to_string()
    }

    /// Split normalized text into sentences at boundaries after `.`, `!` or
    /// `?` followed by whitespace. Text with no boundary is one sentence.
    fn split_sentences(text: &str) -> Vec<&str> {
        let mut sentences = Vec::new();
        let mut last = 0;
        for boundary in SENTENCE_BOUNDARY.find_iter(text) {
            // The terminator is single-byte, keep it on the sentence.
            let sentence = text[last..boundary.start() + 1].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            last = boundary.end();
        }
        let tail = text[last..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
        sentences
    }

    /// Chunk `text` into overlapping pieces.
    ///
    /// Deterministic for identical input and configuration. Empty or
    /// whitespace-only input yields zero chunks. Output order is the
    /// authoritative chunk order.
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let cleaned = Self::clean_text(text);
        let sentences = Self::split_sentences(&cleaned);
        if sentences.is_empty() {
            return Vec::new();
        }

        let mut chunks: Vec<TextChunk> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;
        // Char cursor into the cleaned text; each consumed sentence advances
        // it by its length plus the joining space.
        let mut cursor = 0usize;
        let mut chunk_start = 0usize;

        for sentence in sentences {
            let sentence_len = char_len(sentence);
            let candidate_len = if current.is_empty() {
                sentence_len
            } else {
                current_len + 1 + sentence_len
            };

            if candidate_len <= self.chunk_size {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(sentence);
                current_len = candidate_len;
            } else {
                if !current.is_empty() {
                    chunks.push(TextChunk {
                        content: current.clone(),
                        length: current_len,
                        start: chunk_start,
                        end: chunk_start + current_len,
                    });
                }

                match chunks.last() {
                    Some(prev) if self.overlap > 0 => {
                        // Seed the new chunk with the previous chunk's tail;
                        // the span overlaps the previous chunk physically.
                        let seed = tail_chars(&current, self.overlap);
                        let seed_len = char_len(&seed);
                        chunk_start = prev.end - seed_len;
                        current = format!("{} {}", seed, sentence);
                        current_len = seed_len + 1 + sentence_len;
                    }
                    _ => {
                        current = sentence.to_string();
                        current_len = sentence_len;
                        chunk_start = cursor;
                    }
                }
            }

            cursor += sentence_len + 1;
        }

        if !current.is_empty() {
            chunks.push(TextChunk {
                content: current,
                length: current_len,
                start: chunk_start,
                end: chunk_start + current_len,
            });
        }

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` chars of `s`, or all of it when shorter.
fn tail_chars(s: &str, n: usize) -> String {
    let len = char_len(s);
    if len > n {
        s.chars().skip(len - n).collect()
    } else {
        s.to_string()
    }
}
