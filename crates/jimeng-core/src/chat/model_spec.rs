//! `model:WxH` model strings

use crate::generation::types::DEFAULT_DIMENSION;

/// Model name and output size parsed from a chat model string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub model: String,
    pub width: u32,
    pub height: u32,
}

/// Parse `name[:WxH]`.
///
/// The size is the first two digit runs separated by any single character
/// (`1024x768`, `1024*768`, `1024:768`). Without a usable size the output is
/// 1024×1024. Parsed dimensions are rounded up to the next even number.
pub fn parse_model(model: &str) -> ModelSpec {
    let (name, size) = match model.split_once(':') {
        Some((name, size)) => (name, Some(size)),
        None => (model, None),
    };

    let (width, height) = size
        .and_then(parse_size)
        .unwrap_or((DEFAULT_DIMENSION, DEFAULT_DIMENSION));

    ModelSpec {
        model: name.to_string(),
        width,
        height,
    }
}

/// Find the first `<digits><any char><digits>` and round both numbers to even
fn parse_size(size: &str) -> Option<(u32, u32)> {
    let chars: Vec<(usize, char)> = size.char_indices().collect();

    for start in 0..chars.len() {
        if !chars[start].1.is_ascii_digit() {
            continue;
        }
        // longest digit run from here
        let mut end = start;
        while end < chars.len() && chars[end].1.is_ascii_digit() {
            end += 1;
        }
        // shrink the first run until a separator and a second run fit after it
        for first_end in (start + 1..=end).rev() {
            let sep = first_end;
            let second_start = sep + 1;
            if second_start >= chars.len() || !chars[second_start].1.is_ascii_digit() {
                continue;
            }
            let mut second_end = second_start;
            while second_end < chars.len() && chars[second_end].1.is_ascii_digit() {
                second_end += 1;
            }
            let first = slice(size, &chars, start, first_end);
            let second = slice(size, &chars, second_start, second_end);
            return Some((round_even(first)?, round_even(second)?));
        }
    }
    None
}

fn slice<'a>(text: &'a str, chars: &[(usize, char)], from: usize, to: usize) -> &'a str {
    let begin = chars[from].0;
    let end = chars.get(to).map(|(idx, _)| *idx).unwrap_or(text.len());
    &text[begin..end]
}

fn round_even(digits: &str) -> Option<u32> {
    let value: u64 = digits.parse().ok()?;
    let even = value.checked_add(1)? / 2 * 2;
    u32::try_from(even).ok()
}
