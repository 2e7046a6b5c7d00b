use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use graph::KnowledgeGraph;
use llm::TextGenerator;

use crate::partition::Partition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunitySummary {
    pub community_id: usize,
    pub entity_count: usize,
    pub summary: String,
    /// Up to five members, highest degree first.
    pub key_entities: Vec<String>,
}

/// Generates a prose summary per community from its entities and the
/// relations among them.
pub struct CommunitySummarizer {
    generator: Arc<dyn TextGenerator>,
}

impl CommunitySummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Summarize every community in the partition, in community id order.
    pub async fn summarize_all(
        &self,
        graph: &KnowledgeGraph,
        partition: &Partition,
    ) -> Result<Vec<CommunitySummary>> {
        let names = graph.entity_names();
        let mut summaries = Vec::with_capacity(partition.community_count());

        for (community_id, members) in partition.groups().iter().enumerate() {
            debug!(community_id, members = members.len(), "summarizing community");
            let summary = self
                .summarize_community(graph, &names, community_id, members)
                .await?;
            summaries.push(summary);
        }

        Ok(summaries)
    }

    async fn summarize_community(
        &self,
        graph: &KnowledgeGraph,
        names: &[&str],
        community_id: usize,
        members: &[usize],
    ) -> Result<CommunitySummary> {
        let mut ranked: Vec<&str> = members.iter().map(|&i| names[i]).collect();
        ranked.sort_by_key(|name| std::cmp::Reverse(graph.degree(name)));

        let prompt = build_summary_prompt(graph, &ranked);
        let summary_text = self
            .generator
            .generate(&prompt)
            .await
            .context("Failed to generate community summary")?;

        Ok(CommunitySummary {
            community_id,
            entity_count: members.len(),
            summary: summary_text.trim().to_string(),
            key_entities: ranked.iter().take(5).map(|s| s.to_string()).collect(),
        })
    }
}

fn build_summary_prompt(graph: &KnowledgeGraph, ranked: &[&str]) -> String {
    let mut prompt =
        String::from("You are analyzing a community of related entities from a knowledge graph.\n\n");

    prompt.push_str("ENTITIES IN THIS COMMUNITY:\n");
    for name in ranked.iter().take(10) {
        let mentions = graph.mentions(name).map(|m| m.len()).unwrap_or(0);
        prompt.push_str(&format!("- {} (mentioned in {} chunks)\n", name, mentions));
    }

    let member_set: HashSet<&str> = ranked.iter().copied().collect();
    let relations: Vec<String> = graph
        .edges()
        .filter(|(s, t, _)| member_set.contains(s) && member_set.contains(t))
        .take(10)
        .map(|(s, t, e)| {
            let labels: Vec<&str> = e.relations.iter().map(String::as_str).collect();
            format!("- {} {} {} (weight {})\n", s, labels.join("/"), t, e.weight)
        })
        .collect();

    if !relations.is_empty() {
        prompt.push_str("\nKEY RELATIONSHIPS:\n");
        for line in &relations {
            prompt.push_str(line);
        }
    }

    prompt.push_str(
        "\nTASK: Write a 2-3 paragraph summary describing:\n\
        1. The main theme or topic of this community\n\
        2. Key entities and their roles\n\
        3. Important relationships and patterns\n\n\
        Keep it concise and factual. Do NOT use markdown formatting.\n\n\
        SUMMARY:",
    );

    prompt
}
