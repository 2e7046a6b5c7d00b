use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

use crate::normalizer::{normalize, normalize_all};
use crate::schema::RelationTriple;
use crate::{EntityExtractor, RelationExtractor};

/// Words excluded both as entity candidates and as connecting words.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "then", "this", "that", "these", "those", "it",
    "its", "he", "she", "they", "we", "i", "in", "on", "at", "of", "for", "to", "with", "was",
    "is", "are", "were",
];

/// Offline extractor for runs without a generation model.
///
/// Entities are maximal spans of capitalized words. A relation is recorded
/// when exactly one non-stopword separates two entity mentions within a
/// sentence; that word becomes the relation label.
pub struct HeuristicExtractor {
    entity_pattern: Regex,
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self {
            entity_pattern: Regex::new(r"[A-Z][A-Za-z0-9]*(?:\s+[A-Z][A-Za-z0-9]*)*").unwrap(),
        }
    }

    fn is_stopword(word: &str) -> bool {
        STOPWORDS.contains(&word)
    }
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityExtractor for HeuristicExtractor {
    async fn extract_entities(&self, text: &str) -> Result<Vec<String>> {
        let spans = self
            .entity_pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string());

        Ok(normalize_all(spans)
            .into_iter()
            .filter(|name| !Self::is_stopword(name.as_str()))
            .collect())
    }
}

#[async_trait]
impl RelationExtractor for HeuristicExtractor {
    async fn extract_relations(
        &self,
        text: &str,
        entities: &[String],
    ) -> Result<Vec<RelationTriple>> {
        if entities.len() < 2 {
            return Ok(Vec::new());
        }

        // Longest entities first so "columbia university" wins over "columbia".
        let mut entity_words: Vec<(Vec<&str>, &str)> = entities
            .iter()
            .map(|e| (e.split_whitespace().collect(), e.as_str()))
            .collect();
        entity_words.sort_by_key(|(words, _)| std::cmp::Reverse(words.len()));

        let mut triples = Vec::new();
        for sentence in text.split(['.', '!', '?']) {
            let words: Vec<String> = sentence
                .split_whitespace()
                .map(normalize)
                .filter(|w| !w.is_empty())
                .collect();

            let mentions = find_mentions(&words, &entity_words);
            for pair in mentions.windows(2) {
                let (_, prev_end, prev_name) = &pair[0];
                let (next_start, _, next_name) = &pair[1];
                if *next_start != prev_end + 1 {
                    continue;
                }
                let connector = words[*prev_end].as_str();
                if Self::is_stopword(connector) {
                    continue;
                }
                triples.push(RelationTriple::new(*prev_name, *next_name, connector));
            }
        }

        Ok(triples)
    }
}

/// Scan a normalized word sequence for entity mentions, matching the longest
/// entity at each position. Returns (start, end, name) in sentence order.
fn find_mentions<'a>(
    words: &[String],
    entity_words: &[(Vec<&str>, &'a str)],
) -> Vec<(usize, usize, &'a str)> {
    let mut mentions = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let mut matched = None;
        for (candidate, name) in entity_words {
            let end = i + candidate.len();
            if end <= words.len()
                && words[i..end].iter().map(String::as_str).eq(candidate.iter().copied())
            {
                matched = Some((i, end, *name));
                break;
            }
        }
        match matched {
            Some(mention) => {
                i = mention.1;
                mentions.push(mention);
            }
            None => i += 1,
        }
    }
    mentions
}
