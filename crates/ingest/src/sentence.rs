use unicode_segmentation::UnicodeSegmentation;

/// Split text into sentences using Unicode sentence boundaries.
///
/// Each sentence is trimmed; empty results are dropped. Newlines inside a
/// sentence are preserved as-is because the chunker joins buffered windows
/// with spaces anyway.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
