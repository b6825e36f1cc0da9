//! Hiragana → katakana folding / ひらがな → カタカナ変換

const HIRAGANA_START: u32 = 0x3041;
const HIRAGANA_END: u32 = 0x3096;
const KATAKANA_OFFSET: u32 = 0x60;

/// Fold a single character; anything outside the hiragana block passes through
fn fold_char(c: char) -> char {
    let code = c as u32;
    if (HIRAGANA_START..=HIRAGANA_END).contains(&code) {
        char::from_u32(code + KATAKANA_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// Map every hiragana character of a query to its katakana counterpart
pub fn to_katakana(text: &str) -> String {
    text.chars().map(fold_char).collect()
}
