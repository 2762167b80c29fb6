//! Substitution, splitting and pattern quoting.
//!
//! Replacement templates understand `\0`..`\9` (numbered groups), `\k<name>`
//! (named group; duplicate names resolve as in [`Captures::name`]) and `\\`.
//! Any other backslash sequence is copied through unchanged. Groups that did
//! not participate expand to nothing.

use memchr::memchr;

use crate::captures::Captures;
use crate::compile::CompiledPattern;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(Vec<u8>),
    Group(usize),
    Named(Vec<u8>),
}

/// Parsed replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(template: &[u8]) -> Self {
        let mut pieces = Vec::new();
        let mut literal = Vec::new();
        let mut rest = template;

        while let Some(pos) = memchr(b'\\', rest) {
            literal.extend_from_slice(&rest[..pos]);
            let after = &rest[pos + 1..];
            match after.first() {
                Some(&d) if d.is_ascii_digit() => {
                    flush(&mut pieces, &mut literal);
                    pieces.push(Piece::Group((d - b'0') as usize));
                    rest = &after[1..];
                }
                Some(b'\\') => {
                    literal.push(b'\\');
                    rest = &after[1..];
                }
                Some(b'k') if after.get(1) == Some(&b'<') => {
                    match memchr(b'>', &after[2..]) {
                        Some(close) => {
                            flush(&mut pieces, &mut literal);
                            pieces.push(Piece::Named(after[2..2 + close].to_vec()));
                            rest = &after[2 + close + 1..];
                        }
                        None => {
                            literal.push(b'\\');
                            rest = after;
                        }
                    }
                }
                _ => {
                    literal.push(b'\\');
                    rest = after;
                }
            }
        }
        literal.extend_from_slice(rest);
        flush(&mut pieces, &mut literal);
        Self { pieces }
    }

    /// Append the expansion of this template for `caps` to `out`.
    pub fn expand(&self, caps: &Captures<'_, '_>, out: &mut Vec<u8>) {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(bytes) => out.extend_from_slice(bytes),
                Piece::Group(idx) => {
                    if let Some(bytes) = caps.get(*idx) {
                        out.extend_from_slice(bytes);
                    }
                }
                Piece::Named(name) => {
                    if let Some(bytes) = caps.name(name) {
                        out.extend_from_slice(bytes);
                    }
                }
            }
        }
    }
}

fn flush(pieces: &mut Vec<Piece>, literal: &mut Vec<u8>) {
    if !literal.is_empty() {
        pieces.push(Piece::Literal(std::mem::take(literal)));
    }
}

/// Replace every match of `pattern` in `subject` with `template`.
pub fn replace_all(pattern: &CompiledPattern, subject: &[u8], template: &[u8]) -> Result<Vec<u8>> {
    let template = Template::parse(template);
    replace_all_with(pattern, subject, |caps, out| template.expand(caps, out))
}

/// Replace every match with whatever `replacer` appends to the output.
pub fn replace_all_with<F>(pattern: &CompiledPattern, subject: &[u8], mut replacer: F) -> Result<Vec<u8>>
where
    F: FnMut(&Captures<'_, '_>, &mut Vec<u8>),
{
    let mut out = Vec::with_capacity(subject.len());
    let mut last = 0;
    for caps in pattern.captures_iter(subject) {
        let caps = caps?;
        let Some(span) = caps.span(0) else {
            continue;
        };
        out.extend_from_slice(&subject[last..span.start]);
        replacer(&caps, &mut out);
        last = span.end;
    }
    out.extend_from_slice(&subject[last..]);
    Ok(out)
}

/// Pieces of `subject` between matches of `pattern`.
pub fn split<'s>(pattern: &CompiledPattern, subject: &'s [u8]) -> Result<Vec<&'s [u8]>> {
    let mut out = Vec::new();
    let mut last = 0;
    for span in pattern.find_iter(subject) {
        let span = span?;
        out.push(&subject[last..span.start]);
        last = span.end;
    }
    out.push(&subject[last..]);
    Ok(out)
}

/// Escape every metacharacter so the result matches `literal` verbatim.
pub fn quote_meta(literal: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(literal.len() * 2);
    for &b in literal {
        if matches!(
            b,
            b'\\' | b'.' | b'+' | b'*' | b'?' | b'(' | b')' | b'|' | b'[' | b']' | b'{' | b'}' | b'^' | b'$'
        ) {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}

impl CompiledPattern {
    /// See [`replace_all`].
    pub fn replace_all(&self, subject: &[u8], template: &[u8]) -> Result<Vec<u8>> {
        replace_all(self, subject, template)
    }

    /// See [`split`].
    pub fn split<'s>(&self, subject: &'s [u8]) -> Result<Vec<&'s [u8]>> {
        split(self, subject)
    }
}
