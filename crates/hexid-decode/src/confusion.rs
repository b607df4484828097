//! Glyph confusion and ambiguity tables.
//!
//! `CONFUSIONS` rewrites glyphs that can never be part of a hex id into the
//! digit they are usually misread for. Glyphs that are already hex digits
//! (`B`, `D`, lowercase `b`, ...) are left alone here; their look-alikes are
//! only explored by [`ambiguity_pool`].

/// `(observed, most likely digit)`.
const CONFUSIONS: &[(char, char)] = &[
    ('O', '0'),
    ('o', '0'),
    ('Q', '0'),
    ('I', '1'),
    ('i', '1'),
    ('l', '1'),
    ('!', '1'),
    ('|', '1'),
    ('S', '5'),
    ('s', '5'),
    ('Z', '2'),
    ('z', '2'),
    ('G', '6'),
    ('g', '9'),
    ('q', '9'),
    ('P', '9'),
    ('T', '7'),
    ('t', '7'),
];

/// Per-glyph substitution pools, the glyph itself first.
const AMBIGUITY: &[&[char]] = &[
    &['0', 'O', 'D'],
    &['O', '0'],
    &['Q', '0'],
    &['D', '0'],
    &['1', 'I', 'l'],
    &['I', '1', 'l'],
    &['l', '1'],
    &['5', 'S'],
    &['S', '5'],
    &['2', 'Z'],
    &['Z', '2'],
    &['8', 'B'],
    &['B', '8'],
    &['6', 'G'],
    &['G', '6'],
    &['9', 'P'],
    &['P', '9'],
    &['q', '9', 'Q'],
    &['7', 'T'],
    &['T', '7'],
];

/// Digit a confusable glyph most likely stands for.
#[inline]
pub fn confusion_digit(c: char) -> Option<char> {
    CONFUSIONS
        .iter()
        .find_map(|&(from, to)| (from == c).then_some(to))
}

/// Substitution pool for `c`, or `None` when `c` has no look-alikes.
pub fn ambiguity_pool(c: char) -> Option<&'static [char]> {
    AMBIGUITY.iter().copied().find(|pool| pool[0] == c)
}

/// Strip whitespace, apply the confusion table and uppercase.
pub fn normalize_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| confusion_digit(c).unwrap_or(c))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Fraction of characters in `0-9A-F`. Empty strings have purity 0.
pub fn hex_purity(s: &str) -> f32 {
    let mut total = 0usize;
    let mut hex = 0usize;
    for c in s.chars() {
        total += 1;
        if is_upper_hex(c) {
            hex += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        hex as f32 / total as f32
    }
}

/// Exactly `len` uppercase hexadecimal characters.
pub fn is_hex_id(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(is_upper_hex)
}

#[inline]
pub(crate) fn is_upper_hex(c: char) -> bool {
    c.is_ascii_digit() || ('A'..='F').contains(&c)
}
