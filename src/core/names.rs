//! Name and address renderings
//!
//! Every string that ends up in the canonical document exists in several
//! forms: ASCII-folded, literal unicode, HTML/XML-escaped and LaTeX-escaped.
//! All transforms here are pure and deterministic.

use unicode_normalization::UnicodeNormalization;

use crate::core::latex::unicode_to_latex;

/// Non-breaking space used to glue name parts together in LaTeX output
pub const NBSP: char = '\u{00A0}';

/// Compatibility-decompose and drop everything outside ASCII, then trim
pub fn asciify(s: &str) -> String {
    s.nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Collapse runs of whitespace to a single ordinary space
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape markup characters and turn remaining non-ASCII into numeric
/// character references
pub fn htmlify(s: &str) -> String {
    let escaped = html_escape::encode_quoted_attribute(s);
    let mut out = String::with_capacity(escaped.len());
    for c in escaped.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&format!("&#{};", c as u32));
        }
    }
    out
}

/// XML flavour of [`htmlify`]; the escaping rules coincide
pub fn xmlify(s: &str) -> String {
    htmlify(s)
}

/// Join whitespace-separated parts with `&nbsp;`
pub fn nbspify(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("&nbsp;")
}

/// "First Last" in ASCII
pub fn author_asciified(firstname: &str, lastname: &str) -> String {
    asciify(&author_unicode(firstname, lastname))
}

/// "First Last" with whitespace normalized
pub fn author_unicode(firstname: &str, lastname: &str) -> String {
    collapse_whitespace(&format!("{} {}", firstname, lastname))
}

/// "First&nbsp;Last" with entities for anything outside ASCII
pub fn author_html(firstname: &str, lastname: &str) -> String {
    nbspify(&format!("{} {}", htmlify(firstname), htmlify(lastname)))
}

/// "First~Last" with LaTeX escapes
pub fn author_latex(firstname: &str, lastname: &str) -> String {
    let joined = format!("{} {}", firstname, lastname);
    let glued = joined
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(&NBSP.to_string());
    unicode_to_latex(&glued)
}

/// Abbreviate a name to the "Lastname, I. N." signature form.
///
/// Hyphenated first names are abbreviated per segment, so "Jean-Paul"
/// becomes "J.-P.".
pub fn format_author_name(firstname: &str, lastname: &str) -> String {
    let mut name = format!("{},", collapse_whitespace(lastname));
    for token in firstname.split_whitespace() {
        let abbreviated = if token.contains('-') {
            token
                .split('-')
                .map(initial)
                .collect::<Vec<_>>()
                .join("-")
        } else {
            initial(token)
        };
        name.push(' ');
        name.push_str(&abbreviated);
    }
    name
}

fn initial(token: &str) -> String {
    match token.chars().next() {
        Some(c) => format!("{}.", c),
        None => String::new(),
    }
}

/// Split a "Lastname, F. I." signature into (firstname, lastname)
pub fn split_signature(signature: &str) -> Option<(String, String)> {
    let (last, first) = signature.split_once(',')?;
    if first.contains(',') {
        return None;
    }
    Some((first.trim().to_string(), last.trim().to_string()))
}

/// Sort key for a signature: ASCII-folded and lower-cased
pub fn sort_key(signature: &str) -> String {
    asciify(signature).to_lowercase()
}

/// ASCII alphanumeric slug of a place short name
pub fn place_slug(short_name: &str) -> String {
    asciify(short_name)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Loose surname comparison used to sanity-check opt-in submissions.
///
/// Both names are folded to lower-case ASCII with hyphens read as spaces;
/// they match when either contains the other.
pub fn surnames_overlap(a: &str, b: &str) -> bool {
    let fold = |s: &str| asciify(s).to_lowercase().replace('-', " ");
    let (a, b) = (fold(a), fold(b));
    a.contains(&b) || b.contains(&a)
}
