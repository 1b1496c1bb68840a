//! Text selection helpers: what part of an incoming payload a run animates.
//!
//! Everything here works on `char`s, never bytes, so multi-byte input cannot split a glyph.

use fastrand::Rng;

/// How a line window treats leading whitespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indent {
    /// Trim every line on both ends.
    Trimmed,
    /// Strip the indentation common to the window, keep the rest.
    Relative,
}

/// Collapse every whitespace run (spaces, tabs, newlines) to one ASCII space.
pub fn compact(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// A random contiguous window of `len` chars, or the whole text when it is not longer than that.
pub fn random_substring(text: &str, len: usize, rng: &mut Rng) -> String {
    let count = text.chars().count();
    if count <= len {
        return text.to_string();
    }
    let start = rng.usize(..=count - len);
    text.chars().skip(start).take(len).collect()
}

fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}

fn window<'a>(lines: &'a [&'a str], n: usize, rng: &mut Rng) -> &'a [&'a str] {
    if lines.len() <= n {
        return lines;
    }
    let start = rng.usize(..=lines.len() - n);
    &lines[start..start + n]
}

fn leading_indent(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// A random run of `n` consecutive non-blank lines joined by `\n`.
pub fn random_line_window(text: &str, n: usize, indent: Indent, rng: &mut Rng) -> String {
    let lines = non_blank_lines(text);
    let picked = window(&lines, n, rng);
    match indent {
        Indent::Trimmed => picked
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n"),
        Indent::Relative => {
            let common = picked.iter().map(|line| leading_indent(line)).min().unwrap_or(0);
            picked
                .iter()
                .map(|line| {
                    let body: String = line.chars().skip(common).collect();
                    body.trim_end().to_string()
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Like [`random_line_window`] but keeps the lines separate, each trimmed.
pub fn random_lines(text: &str, n: usize, rng: &mut Rng) -> Vec<String> {
    let lines = non_blank_lines(text);
    window(&lines, n, rng)
        .iter()
        .map(|line| line.trim().to_string())
        .collect()
}

/// The first `limit` chars of `text`.
pub fn bounded_prefix(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// The first `limit` lines of `text`, newline-joined.
pub fn bounded_line_prefix(text: &str, limit: usize) -> String {
    text.lines().take(limit).collect::<Vec<_>>().join("\n")
}
