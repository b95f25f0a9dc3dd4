use crate::types::TranscriptEntry;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format one entry as `[12.5s] text`
pub fn format_entry(entry: &TranscriptEntry) -> String {
    format!("[{}s] {}", entry.start, entry.text.trim())
}

/// Preview the first `limit` entries, one per line
pub fn format_preview(entries: &[TranscriptEntry], limit: usize) -> String {
    entries
        .iter()
        .take(limit)
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n")
}
