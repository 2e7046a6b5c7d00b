pub fn build_entity_prompt(chunk_text: &str) -> String {
    format!(
        r#"Extract the key entities mentioned in the following text.

INSTRUCTIONS:
1. Identify people, organizations, concepts, locations and events
2. Output ONLY valid JSON, nothing else
3. Use the exact schema below

SCHEMA:
{{
  "entities": ["entity name", "another entity"]
}}

RULES:
- Use the surface form that appears in the text
- Extract 3-10 entities
- Output ONLY the JSON object, no markdown, no explanations

TEXT:
{}

JSON OUTPUT:"#,
        chunk_text
    )
}

pub fn build_relation_prompt(chunk_text: &str, entities: &[String]) -> String {
    format!(
        r#"Extract relationships between the listed entities from the following text.

INSTRUCTIONS:
1. Only use entities from the ENTITIES list as source and target
2. Output ONLY valid JSON, nothing else
3. Use the exact schema below

SCHEMA:
{{
  "relations": [
    {{"source": "entity name", "target": "entity name", "relation": "relationship_type"}}
  ]
}}

RULES:
- Relation types should be short verbs: "founded", "opposed", "studied", "influenced", etc.
- Only include relationships stated in the text
- Output ONLY the JSON object, no markdown, no explanations

ENTITIES:
{}

TEXT:
{}

JSON OUTPUT:"#,
        entities.join(", "),
        chunk_text
    )
}

pub fn build_retry_prompt(invalid_json: &str) -> String {
    format!(
        r#"The following JSON is invalid:

{}

Fix this JSON. Output only valid JSON with no markdown formatting, no code blocks, no explanations. Just the raw JSON object."#,
        invalid_json
    )
}
