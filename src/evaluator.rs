/// A sentence split into the parts the typing view colours differently.
///
/// `correct` and `remaining` are slices of the sentence. `incorrect` is the
/// slice of the input that was typed wrong, clamped to the sentence length,
/// so the view shows the mistake the user actually made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub correct: &'a str,
    pub incorrect: &'a str,
    pub remaining: &'a str,
}

/// Compare `input` against `sentence` character by character.
///
/// `correct` is the longest matching prefix, `incorrect` runs from the first
/// mismatch up to the end of the input (clamped to the sentence), and
/// `remaining` is whatever the input has not reached yet.
pub fn highlight<'a>(sentence: &'a str, input: &'a str) -> Highlight<'a> {
    let typed = input.chars().count();

    let matched = sentence
        .chars()
        .zip(input.chars())
        .take_while(|(expected, actual)| expected == actual)
        .count();
    let compared = typed.min(sentence.chars().count());

    let correct_end = byte_offset(sentence, matched);
    let incorrect_start = byte_offset(input, matched);
    let incorrect_end = byte_offset(input, compared);
    let remaining_start = byte_offset(sentence, typed);

    Highlight {
        correct: &sentence[..correct_end],
        incorrect: &input[incorrect_start..incorrect_end],
        remaining: &sentence[remaining_start..],
    }
}

/// Number of whitespace separated words.
pub fn word_count(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}

/// Words per minute for typing `sentence` in `elapsed_secs`.
///
/// Returns `0.0` for a zero, negative or non-finite duration.
pub fn typing_speed(sentence: &str, elapsed_secs: f64) -> f64 {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return 0.0;
    }

    word_count(sentence) as f64 / (elapsed_secs / 60.0)
}

fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}
