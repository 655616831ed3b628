//! Unicode to LaTeX escaping
//!
//! Accented letters are decomposed and rebuilt from accent macros
//! (`é` → `\'{e}`), letters without a decomposition come from a fixed
//! table (`ø` → `{\o}`), and LaTeX special characters are escaped.
//! Characters with no known equivalent pass through unchanged.

use unicode_normalization::UnicodeNormalization;

/// Accent macro for a combining mark
fn accent_macro(mark: char) -> Option<&'static str> {
    Some(match mark {
        '\u{0300}' => "`",
        '\u{0301}' => "'",
        '\u{0302}' => "^",
        '\u{0303}' => "~",
        '\u{0304}' => "=",
        '\u{0306}' => "u",
        '\u{0307}' => ".",
        '\u{0308}' => "\"",
        '\u{030A}' => "r",
        '\u{030B}' => "H",
        '\u{030C}' => "v",
        '\u{0323}' => "d",
        '\u{0327}' => "c",
        '\u{0328}' => "k",
        '\u{0331}' => "b",
        _ => return None,
    })
}

fn is_combining(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Replacement for a single base character, if it needs one
fn escape_char(c: char) -> Option<&'static str> {
    Some(match c {
        '\\' => "\\textbackslash{}",
        '{' => "\\{",
        '}' => "\\}",
        '$' => "\\$",
        '&' => "\\&",
        '#' => "\\#",
        '%' => "\\%",
        '_' => "\\_",
        '^' => "\\textasciicircum{}",
        '~' => "\\textasciitilde{}",
        '\u{00A0}' => "~",
        '\u{200B}' => "",
        'ø' => "{\\o}",
        'Ø' => "{\\O}",
        'ß' => "{\\ss}",
        'æ' => "{\\ae}",
        'Æ' => "{\\AE}",
        'œ' => "{\\oe}",
        'Œ' => "{\\OE}",
        'ł' => "{\\l}",
        'Ł' => "{\\L}",
        'ı' => "{\\i}",
        'đ' => "{\\dj}",
        'Đ' => "{\\DJ}",
        'ð' => "{\\dh}",
        'Ð' => "{\\DH}",
        'þ' => "{\\th}",
        'Þ' => "{\\TH}",
        '–' => "--",
        '—' => "---",
        '‘' => "`",
        '’' => "'",
        '“' => "``",
        '”' => "''",
        '…' => "\\ldots{}",
        '°' => "\\textdegree{}",
        '€' => "\\texteuro{}",
        '£' => "\\pounds{}",
        '§' => "\\S{}",
        '©' => "\\copyright{}",
        _ => return None,
    })
}

/// Escape a unicode string for inclusion in a LaTeX document
pub fn unicode_to_latex(s: &str) -> String {
    let chars: Vec<char> = s.nfd().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < chars.len() {
        let base = chars[i];
        let mut j = i + 1;
        while j < chars.len() && is_combining(chars[j]) {
            j += 1;
        }
        let marks = &chars[i + 1..j];

        let mut rendered = if !marks.is_empty() && (base == 'i' || base == 'j') {
            format!("\\{}", base)
        } else if let Some(esc) = escape_char(base) {
            esc.to_string()
        } else {
            base.to_string()
        };

        for &mark in marks {
            match accent_macro(mark) {
                Some(cmd) => rendered = format!("\\{}{{{}}}", cmd, rendered),
                None => rendered.push(mark),
            }
        }

        out.push_str(&rendered);
        i = j;
    }

    out
}
