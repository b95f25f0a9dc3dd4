use crate::types::TranscriptEntry;

/// Characters of transcript text submitted for analysis.
pub const MAX_TRANSCRIPT_CHARS: usize = 4000;

/// Join entry texts with single spaces and trim the ends.
pub fn concat_transcript(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// First `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(texts: &[&str]) -> Vec<TranscriptEntry> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| TranscriptEntry {
                start: i as f64,
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn joins_with_single_spaces_and_trims() {
        let text = concat_transcript(&entries(&["  hello", "big", "world  "]));
        assert_eq!(text, "hello big world");
    }

    #[test]
    fn empty_texts_keep_their_separators() {
        let text = concat_transcript(&entries(&["a", "", "b"]));
        assert_eq!(text, "a  b");
    }

    #[test]
    fn concatenation_splits_at_any_point() {
        let all = entries(&["one", "two", "three", "four"]);
        let whole = concat_transcript(&all);

        for k in 1..all.len() {
            let joined = format!(
                "{} {}",
                concat_transcript(&all[..k]),
                concat_transcript(&all[k..])
            );
            assert_eq!(joined.trim(), whole);
        }
    }

    #[test]
    fn truncation_caps_length_without_failing() {
        let long = "x".repeat(MAX_TRANSCRIPT_CHARS * 2);
        assert_eq!(
            truncate_chars(&long, MAX_TRANSCRIPT_CHARS).chars().count(),
            MAX_TRANSCRIPT_CHARS
        );
        assert_eq!(truncate_chars("short", MAX_TRANSCRIPT_CHARS), "short");
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let text = "héllo wörld";
        assert_eq!(truncate_chars(text, 2), "hé");
        assert_eq!(truncate_chars(text, 0), "");
    }
}
