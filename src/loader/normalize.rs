//! Line normalization for pasted deck lists

/// Split raw input into trimmed, non-empty lines
///
/// Any mix of `\r` and `\n` counts as a line break.
pub fn split_lines(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// Strip set/collector metadata from a deck line
///
/// Everything from the first parenthesized group onward is removed:
/// `"1 Lightning Bolt (2X2) 133"` -> `"1 Lightning Bolt"`.
/// An opening paren with no closing paren after it is left alone.
pub fn remove_extra_info(line: &str) -> &str {
    let Some(open) = line.find('(') else {
        return line.trim();
    };
    if line[open + 1..].contains(')') {
        line[..open].trim()
    } else {
        line.trim()
    }
}

/// Remove the word "Deck" from a commander name
///
/// Some exports put the commander and the `Deck` header on the same line.
pub fn strip_deck_word(name: &str) -> String {
    name.split_whitespace()
        .filter(|word| *word != "Deck")
        .collect::<Vec<_>>()
        .join(" ")
}
