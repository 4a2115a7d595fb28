//! Splitting a line into its command text, operand and terminator

use crate::instruction::Terminator;

/// Separate the trailing terminator character from the command text.
///
/// Only lines of two or more characters can carry a terminator, a line made
/// of a lone `!` is a command.
pub fn split_terminator(line: &str) -> (&str, Terminator) {
    let mut chars = line.chars();

    let last = match chars.next_back() {
        Some(ch) if !chars.as_str().is_empty() => ch,
        _ => return (line, Terminator::None),
    };

    let terminator = match last {
        '?' => Terminator::Input,
        '!' => Terminator::Next,
        ';' => Terminator::Previous,
        ',' => Terminator::Increment,
        '.' => Terminator::Decrement,
        _ => return (line, Terminator::None),
    };

    (chars.as_str(), terminator)
}

/// Match `command` against a keyword phrase and extract the operand.
///
/// Commas count as spaces and case is ignored, using full Unicode lower
/// casing. The command must be the phrase alone (operand 0) or the phrase,
/// one space, then free text whose length in characters is the operand.
/// `None` means the keyword doesn't match.
pub fn operand(keyword: &str, command: &str) -> Option<usize> {
    let keyword = keyword.to_lowercase();
    let normalized = command.replace(',', " ");

    // Lower-case just enough of the command to cover the keyword, keeping
    // track of where that prefix ends in the original text.
    let mut head = String::with_capacity(keyword.len());
    let mut head_end = 0;
    for (i, ch) in normalized.char_indices() {
        if head.len() >= keyword.len() {
            break;
        }
        head.extend(ch.to_lowercase());
        head_end = i + ch.len_utf8();
    }

    if head != keyword {
        return None;
    }

    let rest = &normalized[head_end..];
    if rest.is_empty() {
        return Some(0);
    }

    rest.strip_prefix(' ').map(|text| text.chars().count())
}
