/// Cap on suggestions offered for one input, to bound rendering cost.
pub const MAX_SUGGESTIONS: usize = 5;

/// Filter stored suggestions against the in-progress input.
///
/// Case-insensitive substring match, preserving backend order. A suggestion
/// equal to the input (ignoring case) is dropped so the user's own text is
/// never echoed back at them.
pub fn filter_suggestions(all: &[String], query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    all.iter()
        .filter(|suggestion| {
            let lowered = suggestion.to_lowercase();
            lowered.contains(&needle) && lowered != needle
        })
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}
