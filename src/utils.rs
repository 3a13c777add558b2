// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Utility functions for the form tracker

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Pluralize a noun for a count, e.g. `1 rep`, `3 reps`, `2 squats`.
#[must_use]
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        return format!("{count} {word}");
    }
    let plural = if word.ends_with('s') || word.ends_with("ch") || word.ends_with("sh") {
        format!("{word}es")
    } else if word.ends_with('y') && !word.ends_with("ey") && !word.ends_with("ay") {
        format!("{}ies", &word[..word.len() - 1])
    } else {
        format!("{word}s")
    };
    format!("{count} {plural}")
}
