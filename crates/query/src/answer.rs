use std::fmt::Write;

use communities::CommunitySummary;
use ingest::Chunk;

use crate::Scored;

/// Resolve a fused ranking against the chunk table. Ids are read as chunk
/// ids; ids without a chunk behind them (community ids surviving the
/// fusion) are skipped, and at most `limit` chunks are kept in ranked
/// order. `chunks` must be indexed by chunk id, as the chunker produces
/// them.
pub fn select_evidence<'a>(ranked: &[Scored], chunks: &'a [Chunk], limit: usize) -> Vec<&'a Chunk> {
    ranked
        .iter()
        .filter_map(|s| chunks.get(s.id))
        .take(limit)
        .collect()
}

/// Assemble the answer prompt: community summaries first for broad
/// context, then the selected chunks, each piece tagged with the id the
/// model is told to cite.
pub fn build_answer_prompt(
    question: &str,
    evidence: &[&Chunk],
    summaries: &[&CommunitySummary],
) -> String {
    let mut prompt = String::from(
        "You are an expert assistant answering questions about the indexed document.\n\
         Use the provided context to answer the question accurately.\n\n",
    );

    if !summaries.is_empty() {
        prompt.push_str("=== Community Summaries (Broad Context) ===\n");
        for summary in summaries {
            let _ = writeln!(prompt, "[Community-{}] {}\n", summary.community_id, summary.summary);
        }
    }

    if !evidence.is_empty() {
        prompt.push_str("=== Relevant Chunks (Specific Context) ===\n");
        for chunk in evidence {
            let _ = writeln!(prompt, "[Chunk-{}] {}\n", chunk.id, chunk.text);
        }
    }

    let _ = write!(
        prompt,
        "=== Question ===\n{question}\n\n\
         Instructions:\n\
         1. Answer based ONLY on the provided context\n\
         2. Cite sources using [Chunk-ID] or [Community-ID] notation\n\
         3. If the context is insufficient to answer, state this clearly\n\
         4. Be comprehensive but concise\n\n\
         Answer:"
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: usize, text: &str) -> Chunk {
        Chunk::new(id, text.to_string())
    }

    #[test]
    fn evidence_skips_ids_without_chunks() {
        let chunks = vec![chunk(0, "first"), chunk(1, "second")];
        let ranked = vec![Scored::new(7, 0.9), Scored::new(1, 0.8), Scored::new(0, 0.1)];

        let evidence = select_evidence(&ranked, &chunks, 5);

        let ids: Vec<usize> = evidence.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn evidence_is_limited_after_skipping() {
        let chunks = vec![chunk(0, "first"), chunk(1, "second")];
        let ranked = vec![Scored::new(9, 0.9), Scored::new(1, 0.8), Scored::new(0, 0.1)];

        let evidence = select_evidence(&ranked, &chunks, 1);

        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].id, 1);
    }

    #[test]
    fn prompt_tags_every_source() {
        let chunks = vec![chunk(3, "Ambedkar drafted the Constitution.")];
        let summary = CommunitySummary {
            community_id: 1,
            entity_count: 2,
            summary: "Constitutional history.".to_string(),
            key_entities: vec!["ambedkar".to_string()],
        };
        let evidence: Vec<&Chunk> = chunks.iter().collect();

        let prompt = build_answer_prompt("Who drafted it?", &evidence, &[&summary]);

        assert!(prompt.contains("=== Community Summaries (Broad Context) ==="));
        assert!(prompt.contains("[Community-1] Constitutional history."));
        assert!(prompt.contains("=== Relevant Chunks (Specific Context) ==="));
        assert!(prompt.contains("[Chunk-3] Ambedkar drafted the Constitution."));
        assert!(prompt.contains("Who drafted it?"));
        assert!(prompt.contains("ONLY"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let prompt = build_answer_prompt("Anything?", &[], &[]);

        assert!(!prompt.contains("=== Community Summaries"));
        assert!(!prompt.contains("=== Relevant Chunks"));
        assert!(prompt.contains("=== Question ==="));
    }
}
