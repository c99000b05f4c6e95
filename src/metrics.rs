//! Pure scoring functions. No session state, no side effects; both the
//! session engine and tests call these directly.

/// Percentage of typed characters matching the phrase at the same index.
///
/// An empty input scores 100 by design (vacuous full accuracy). Typing past
/// the end of the phrase counts as a mismatch.
pub fn accuracy(phrase: &str, input: &str) -> u8 {
    if input.is_empty() {
        return 100;
    }

    let phrase_chars: Vec<char> = phrase.chars().collect();
    let total = input.chars().count();
    let correct = input
        .chars()
        .enumerate()
        .filter(|(idx, c)| phrase_chars.get(*idx) == Some(c))
        .count();

    let pct = ((correct as f64 / total as f64) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Words per minute for the input typed so far.
///
/// A word is a non-empty whitespace-delimited token. Elapsed time is floored
/// to one second so a burst in the opening instant can't divide by zero.
pub fn wpm(input: &str, elapsed_secs: u64) -> u64 {
    let words = input.split_whitespace().count();
    let elapsed = elapsed_secs.max(1);

    let rate = words as f64 / (elapsed as f64 / 60.0);
    if rate.is_finite() && rate > 0.0 {
        rate.round() as u64
    } else {
        0
    }
}
