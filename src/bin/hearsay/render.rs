use std::io::{self, Write};

/// Finals below this confidence carry a percentage tag so shaky lines
/// are visible at a glance.
pub(crate) const CONFIDENCE_DISPLAY_FLOOR: f32 = 0.8;

/// Rewrites one console line in place for partial captions and drops to a
/// fresh line whenever an utterance is finalized.
pub(crate) struct TransientLine {
    rendered_width: usize,
}

impl TransientLine {
    pub(crate) fn new() -> Self {
        Self { rendered_width: 0 }
    }

    /// Repaint the in-progress caption. Empty partials are skipped so the
    /// last visible text stays on screen between updates.
    pub(crate) fn show_partial(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let line = format!("   ... {text}");
        let width = line.chars().count();
        let pad = self.rendered_width.saturating_sub(width);
        print!("\r{line}{:pad$}", "");
        let _ = io::stdout().flush();
        self.rendered_width = width;
    }

    /// Commit a finalized utterance on its own line.
    pub(crate) fn show_final(&mut self, text: &str, confidence: f32) {
        if text.is_empty() {
            return;
        }
        let line = format_final(text, confidence);
        let pad = self.rendered_width.saturating_sub(line.chars().count());
        println!("\r{line}{:pad$}", "");
        self.rendered_width = 0;
    }
}

fn format_final(text: &str, confidence: f32) -> String {
    if confidence < CONFIDENCE_DISPLAY_FLOOR {
        format!(">> {text} [{:.0}%]", confidence * 100.0)
    } else {
        format!(">> {text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confident_final_omits_percentage() {
        assert_eq!(format_final("hello world", 0.93), ">> hello world");
        assert_eq!(format_final("hello world", 0.8), ">> hello world");
    }

    #[test]
    fn shaky_final_carries_percentage() {
        assert_eq!(format_final("hello world", 0.72), ">> hello world [72%]");
        assert_eq!(format_final("hm", 0.0), ">> hm [0%]");
    }
}
