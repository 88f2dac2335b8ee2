//! Minimal PHP tokenizer and whitespace stripper.
//!
//! The tokenizer only distinguishes what is needed to strip a file safely:
//! inline HTML, open / close tags, whitespace, comments and literals (quoted
//! strings, heredoc / nowdoc). Everything else is emitted as
//! [TokenKind::Other] and passed through untouched. The input is treated as
//! bytes, so files in any ASCII compatible encoding are handled.

/// Kind of [Token].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    /// Anything outside of `<?php ... ?>`.
    InlineHtml,
    /// `<?php` together with all whitespace following it.
    OpenTag,
    /// `<?=`.
    OpenTagWithEcho,
    /// `?>` with a single following newline, if present.
    CloseTag,
    /// Run of spaces, tabs and newlines.
    Whitespace,
    /// `// ...`, `# ...` or `/* ... */`.
    Comment,
    /// `/** ... */`.
    DocComment,
    /// Quoted string, backtick string, heredoc or nowdoc.
    Literal,
    /// Identifiers, variables, numbers, operators etc.
    Other,
}

/// Single token, borrowing its text from the input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token<'a> {
    /// Token kind.
    pub kind: TokenKind,
    /// Raw token text.
    pub text: &'a [u8],
}

/// Iterator over [Token]s of PHP source. Concatenating texts of all tokens
/// gives back the input.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    input: &'a [u8],
    position: usize,
    in_code: bool,
}
impl<'a> Tokenizer<'a> {
    /// Creates [self] starting in inline HTML mode, as PHP does.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: 0,
            in_code: false,
        }
    }

    fn next_inline_html(
        &mut self,
        rest: &[u8],
    ) -> (TokenKind, usize) {
        let open_tag = (0..rest.len()).find_map(|index| {
            open_tag_at(&rest[index..]).map(|open_tag| (index, open_tag))
        });

        match open_tag {
            Some((0, (kind, length))) => {
                self.in_code = true;
                (kind, length)
            }
            Some((index, _)) => (TokenKind::InlineHtml, index),
            None => (TokenKind::InlineHtml, rest.len()),
        }
    }

    fn next_code(
        &mut self,
        rest: &[u8],
    ) -> (TokenKind, usize) {
        let first = rest[0];

        if rest.starts_with(b"?>") {
            self.in_code = false;
            let newline = newline_length(&rest[2..]);
            return (TokenKind::CloseTag, 2 + newline);
        }

        if is_whitespace(first) {
            let length = rest.iter().take_while(|byte| is_whitespace(**byte)).count();
            return (TokenKind::Whitespace, length);
        }

        if rest.starts_with(b"#[") {
            // attribute, not a comment
            return (TokenKind::Other, 2);
        }

        if first == b'#' || rest.starts_with(b"//") {
            let length = (0..rest.len())
                .find(|index| {
                    matches!(rest[*index], b'\n' | b'\r') || rest[*index..].starts_with(b"?>")
                })
                .unwrap_or(rest.len());
            return (TokenKind::Comment, length);
        }

        if rest.starts_with(b"/*") {
            let length = find(&rest[2..], b"*/")
                .map(|index| 2 + index + 2)
                .unwrap_or(rest.len());
            let kind = if rest.starts_with(b"/**")
                && rest.get(3).copied().is_some_and(is_whitespace)
            {
                TokenKind::DocComment
            } else {
                TokenKind::Comment
            };
            return (kind, length);
        }

        if matches!(first, b'\'' | b'"' | b'`') {
            return (TokenKind::Literal, quoted_length(rest));
        }

        if rest.starts_with(b"<<<") {
            return match heredoc_length(rest) {
                Some(length) => (TokenKind::Literal, length),
                None => (TokenKind::Other, 3),
            };
        }

        if is_word(first) {
            let length = rest.iter().take_while(|byte| is_word(**byte)).count();
            return (TokenKind::Other, length);
        }

        (TokenKind::Other, 1)
    }
}
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.input;
        let rest = &input[self.position..];
        if rest.is_empty() {
            return None;
        }

        let (kind, length) = if self.in_code {
            self.next_code(rest)
        } else {
            self.next_inline_html(rest)
        };

        self.position += length;

        Some(Token {
            kind,
            text: &rest[..length],
        })
    }
}

/// Removes comments and collapses whitespace of PHP source.
///
/// Comments (including doc comments) are dropped. In whitespace tokens, runs
/// of newline characters become single `\n` and runs of spaces / tabs become
/// single space. `<?php` keeps exactly one newline after it. Literals and
/// inline HTML are never modified.
pub fn strip_whitespace(content: &[u8]) -> Vec<u8> {
    let mut stripped = Vec::with_capacity(content.len());

    for token in Tokenizer::new(content) {
        match token.kind {
            TokenKind::Comment | TokenKind::DocComment => {}
            TokenKind::Whitespace => collapse_whitespace(token.text, &mut stripped),
            TokenKind::OpenTag => {
                let (tag, trailing) = token.text.split_at(OPEN_TAG.len());
                stripped.extend_from_slice(tag);
                if trailing.iter().any(|byte| matches!(byte, b'\n' | b'\r')) {
                    stripped.push(b'\n');
                } else if !trailing.is_empty() {
                    stripped.push(b' ');
                }
            }
            _ => stripped.extend_from_slice(token.text),
        }
    }

    stripped
}

const OPEN_TAG: &[u8] = b"<?php";

fn collapse_whitespace(
    text: &[u8],
    output: &mut Vec<u8>,
) {
    let mut previous = None;
    for byte in text {
        let newline = matches!(byte, b'\n' | b'\r');
        if previous != Some(newline) {
            output.push(if newline { b'\n' } else { b' ' });
        }
        previous = Some(newline);
    }
}

/// Recognizes open tag at the beginning of `rest`.
fn open_tag_at(rest: &[u8]) -> Option<(TokenKind, usize)> {
    if rest.len() >= OPEN_TAG.len()
        && rest[..OPEN_TAG.len()].eq_ignore_ascii_case(OPEN_TAG)
        && rest.get(OPEN_TAG.len()).is_none_or(|byte| is_whitespace(*byte))
    {
        let trailing = rest[OPEN_TAG.len()..]
            .iter()
            .take_while(|byte| is_whitespace(**byte))
            .count();
        return Some((TokenKind::OpenTag, OPEN_TAG.len() + trailing));
    }

    if rest.starts_with(b"<?=") {
        return Some((TokenKind::OpenTagWithEcho, 3));
    }

    None
}

/// Length of quoted literal starting at `rest[0]` (the quote). Interpolated
/// expressions (`{$...}`, `${...}`) inside double quotes and backticks may
/// contain quotes on their own, they are skipped as a whole.
fn quoted_length(rest: &[u8]) -> usize {
    let quote = rest[0];
    let interpolates = quote != b'\'';

    let mut index = 1;
    while index < rest.len() {
        match rest[index] {
            b'\\' => index += 2,
            byte if byte == quote => return index + 1,
            b'{' if interpolates && rest.get(index + 1) == Some(&b'$') => {
                index += interpolation_length(&rest[index..]);
            }
            b'$' if interpolates && rest.get(index + 1) == Some(&b'{') => {
                index += 1 + interpolation_length(&rest[index + 1..]);
            }
            _ => index += 1,
        }
    }

    rest.len()
}

/// Length of `{ ... }` block starting at `rest[0]`, with nested braces and
/// quoted literals.
fn interpolation_length(rest: &[u8]) -> usize {
    let mut depth = 0_usize;
    let mut index = 0;
    while index < rest.len() {
        match rest[index] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return index + 1;
                }
            }
            b'\'' | b'"' => {
                index += quoted_length(&rest[index..]);
                continue;
            }
            _ => {}
        }
        index += 1;
    }

    rest.len()
}

/// Length of heredoc / nowdoc starting at `rest` (`<<<`), including the
/// closing label. [None] if header is not a valid heredoc header.
fn heredoc_length(rest: &[u8]) -> Option<usize> {
    let mut index = 3;
    index += rest[index..]
        .iter()
        .take_while(|byte| matches!(byte, b' ' | b'\t'))
        .count();

    let quote = match rest.get(index) {
        Some(quote @ (b'\'' | b'"')) => {
            index += 1;
            Some(*quote)
        }
        _ => None,
    };

    let label_start = index;
    if !rest.get(index).copied().is_some_and(is_label_start) {
        return None;
    }
    index += rest[index..].iter().take_while(|byte| is_label(**byte)).count();
    let label = &rest[label_start..index];

    if let Some(quote) = quote {
        if rest.get(index) != Some(&quote) {
            return None;
        }
        index += 1;
    }

    let newline = newline_length(&rest[index..]);
    if newline == 0 {
        return None;
    }
    index += newline;

    // closing label may be indented, it must not be followed by label chars
    let mut line_start = index;
    while line_start < rest.len() {
        let label_position = line_start
            + rest[line_start..]
                .iter()
                .take_while(|byte| matches!(byte, b' ' | b'\t'))
                .count();
        let label_end = label_position + label.len();
        if rest[label_position..].starts_with(label)
            && !rest.get(label_end).copied().is_some_and(is_label)
        {
            return Some(label_end);
        }

        match rest[line_start..].iter().position(|byte| *byte == b'\n') {
            Some(position) => line_start += position + 1,
            None => break,
        }
    }

    Some(rest.len())
}

fn newline_length(rest: &[u8]) -> usize {
    if rest.starts_with(b"\r\n") {
        2
    } else if rest.starts_with(b"\n") || rest.starts_with(b"\r") {
        1
    } else {
        0
    }
}

fn find(
    haystack: &[u8],
    needle: &[u8],
) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}
fn is_label_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte >= 0x80
}
fn is_label(byte: u8) -> bool {
    is_label_start(byte) || byte.is_ascii_digit()
}
fn is_word(byte: u8) -> bool {
    is_label(byte) || byte == b'$'
}
