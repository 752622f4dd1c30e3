//! Context assembly from retrieved chunks

use crate::models::RetrievedChunk;

/// Default context budget in characters
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 8000;

/// Assembler for creating the LLM context from ranked chunks
pub struct ContextAssembler {
    max_context_chars: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_chars: usize) -> Self {
        Self { max_context_chars }
    }

    #[must_use]
    pub const fn max_context_chars(&self) -> usize {
        self.max_context_chars
    }

    /// Concatenate chunks in rank order as `[Chunk n]\n<content>\n`
    #[must_use]
    pub fn assemble(&self, chunks: &[RetrievedChunk]) -> String {
        self.assemble_with_sources(chunks).0
    }

    /// Assemble context and return the chunks that made it in
    ///
    /// Stops before the budget would be exceeded. The best chunk is always
    /// included, cut to the budget if it is too long on its own.
    #[must_use]
    pub fn assemble_with_sources(&self, chunks: &[RetrievedChunk]) -> (String, Vec<RetrievedChunk>) {
        let mut context = String::new();
        let mut total_chars = 0;
        let mut used = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let entry = format!("[Chunk {}]\n{}\n", idx + 1, chunk.content().trim());
            let entry_chars = entry.chars().count();

            if total_chars + entry_chars > self.max_context_chars {
                if idx == 0 {
                    context.push_str(truncate_chars(&entry, self.max_context_chars));
                    used.push(chunk.clone());
                }
                break;
            }

            context.push_str(&entry);
            total_chars += entry_chars;
            used.push(chunk.clone());
        }

        (context, used)
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXT_CHARS)
    }
}

/// Longest prefix of `text` with at most `max_chars` characters
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChunkRecord;

    fn chunk(index: i32, content: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk: ChunkRecord::new("alice", "doc", index, content.to_string()),
            similarity: 0.9 - f64::from(index) * 0.1,
        }
    }

    #[test]
    fn test_formats_chunks_in_rank_order() {
        let assembler = ContextAssembler::default();
        let context = assembler.assemble(&[chunk(0, "First."), chunk(1, " Second. ")]);
        assert_eq!(context, "[Chunk 1]\nFirst.\n[Chunk 2]\nSecond.\n");
    }

    #[test]
    fn test_stops_before_budget() {
        // "[Chunk 1]\n" + 10 chars + "\n" = 21 chars per entry
        let assembler = ContextAssembler::new(50);
        let chunks = vec![chunk(0, "aaaaaaaaaa"), chunk(1, "bbbbbbbbbb"), chunk(2, "cccccccccc")];
        let (context, used) = assembler.assemble_with_sources(&chunks);

        assert_eq!(used.len(), 2);
        assert!(context.contains("bbbbbbbbbb"));
        assert!(!context.contains("cccccccccc"));
        assert!(context.chars().count() <= 50);
    }

    #[test]
    fn test_oversized_first_chunk_is_truncated() {
        let assembler = ContextAssembler::new(20);
        let (context, used) = assembler.assemble_with_sources(&[chunk(0, &"é".repeat(100))]);

        assert_eq!(used.len(), 1);
        assert_eq!(context.chars().count(), 20);
        assert!(context.starts_with("[Chunk 1]\n"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(ContextAssembler::default().assemble(&[]), "");
    }
}
