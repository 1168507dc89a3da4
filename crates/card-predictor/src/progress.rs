//! Round progress markers.

/// Markers the feed uses while a round is still being dealt.
pub const PROVISIONAL_MARKERS: [&str; 4] = ["\u{23F0}", "\u{25B6}", "\u{1F550}", "\u{27A1}\u{FE0F}"];

/// Markers the feed uses once a round is complete.
pub const FINAL_MARKERS: [&str; 2] = ["\u{2705}", "\u{1F530}"];

/// True if the message reports a round still in progress.
pub fn is_provisional(text: &str) -> bool {
    PROVISIONAL_MARKERS.iter().any(|m| text.contains(m))
}

/// True if the message reports a completed round.
pub fn is_final(text: &str) -> bool {
    FINAL_MARKERS.iter().any(|m| text.contains(m))
}
