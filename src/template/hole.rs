//! Placeholders standing in for template interpolations.
//!
//! Interpolation `i` becomes the identifier `<prefix><i>` in the text given to
//! the processor. The prefix is chosen so that it never occurs in the file.

const BASE_PREFIX: &str = "__css_hole_";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    Code { braces: usize },
    Quoted(char),
    Template,
}

/// Formats the placeholder identifier for interpolation `id`.
pub(crate) fn hole_name(prefix: &str, id: usize) -> String {
    format!("{prefix}{id}")
}

/// Returns the interpolation index encoded in `name`, if it is a placeholder.
pub(crate) fn hole_index(name: &str, prefix: &str) -> Option<usize> {
    if prefix.is_empty() {
        return None;
    }
    let digits = name.strip_prefix(prefix)?;
    if !is_canonical_index(digits) {
        return None;
    }
    digits.parse().ok()
}

/// Picks a placeholder prefix that does not occur anywhere in `code`.
pub(crate) fn unique_prefix(code: &str) -> String {
    let mut prefix = BASE_PREFIX.to_string();
    while code.contains(&prefix) {
        prefix.push('_');
    }
    prefix
}

/// Joins the static strings with a placeholder between each pair.
pub(crate) fn interleave(strings: &[String], count: usize, prefix: &str) -> String {
    let mut css = String::new();

    for (index, text) in strings.iter().enumerate() {
        css.push_str(text);
        if index < count {
            css.push_str(&hole_name(prefix, index));
        }
    }

    css
}

/// A run of string literal text, split at placeholders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Hole(usize),
}

/// Rewrites placeholders inside template literals in the processor's `output`
/// into `${}` substitutions.
///
/// Bare placeholders already parse as identifiers, and placeholders inside
/// quoted strings are left for [`split_holes`] once the output is parsed.
/// Placeholders in comments and indices `>= count` are left alone.
pub(crate) fn embed_holes(output: &str, prefix: &str, count: usize) -> String {
    let mut out = String::with_capacity(output.len());
    let mut scopes = vec![Scope::Code { braces: 0 }];
    let mut prev: Option<char> = None;
    let mut rest = output;

    while let Some(c) = rest.chars().next() {
        let scope = scopes
            .last()
            .copied()
            .unwrap_or(Scope::Code { braces: 0 });

        if let Some((id, len)) = match_hole(rest, prefix, count) {
            let bounded =
                !prev.is_some_and(is_ident_char) && !rest[len..].starts_with(is_ident_char);

            let rewrite = match scope {
                Scope::Code { .. } => bounded,
                Scope::Quoted(_) => false,
                Scope::Template => true,
            };
            if rewrite {
                let name = hole_name(prefix, id);
                match scope {
                    Scope::Template => out.push_str(&format!("${{{name}}}")),
                    _ => out.push_str(&name),
                }
                prev = rest[..len].chars().last();
                rest = &rest[len..];
                continue;
            }
        }

        let mut step = c.len_utf8();
        match scope {
            Scope::Code { braces } => match c {
                '\'' | '"' => scopes.push(Scope::Quoted(c)),
                '`' => scopes.push(Scope::Template),
                '{' => set_top(&mut scopes, Scope::Code { braces: braces + 1 }),
                '}' if braces > 0 => set_top(&mut scopes, Scope::Code { braces: braces - 1 }),
                // closes a `${` substitution
                '}' if scopes.len() > 1 => {
                    scopes.pop();
                }
                '/' if rest.starts_with("//") => {
                    step = rest.find('\n').unwrap_or(rest.len());
                }
                '/' if rest.starts_with("/*") => {
                    step = rest.find("*/").map_or(rest.len(), |end| end + 2);
                }
                _ => {}
            },
            Scope::Quoted(q) => {
                if c == '\\' {
                    step += next_char_len(&rest[step..]);
                } else if c == q {
                    scopes.pop();
                }
            }
            Scope::Template => match c {
                '\\' => step += next_char_len(&rest[step..]),
                '`' => {
                    scopes.pop();
                }
                '$' if rest[1..].starts_with('{') => {
                    scopes.push(Scope::Code { braces: 0 });
                    step = 2;
                }
                _ => {}
            },
        }

        out.push_str(&rest[..step]);
        prev = rest[..step].chars().last();
        rest = &rest[step..];
    }

    out
}

/// Splits the value of a string literal at every placeholder with an index
/// below `count`.
pub(crate) fn split_holes<'a>(text: &'a str, prefix: &str, count: usize) -> Vec<Segment<'a>> {
    if prefix.is_empty() {
        return vec![Segment::Text(text)];
    }

    let mut segments = Vec::new();
    let mut start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(prefix) {
        let at = cursor + offset;
        match match_hole(&text[at..], prefix, count) {
            Some((id, len)) => {
                if start < at {
                    segments.push(Segment::Text(&text[start..at]));
                }
                segments.push(Segment::Hole(id));
                cursor = at + len;
                start = cursor;
            }
            None => cursor = at + prefix.len(),
        }
    }

    if start < text.len() || segments.is_empty() {
        segments.push(Segment::Text(&text[start..]));
    }
    segments
}

fn match_hole(text: &str, prefix: &str, count: usize) -> Option<(usize, usize)> {
    let after = text.strip_prefix(prefix)?;
    let digits_len = after
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after.len());
    let digits = &after[..digits_len];

    if !is_canonical_index(digits) {
        return None;
    }
    let id: usize = digits.parse().ok()?;
    (id < count).then_some((id, prefix.len() + digits_len))
}

fn is_canonical_index(digits: &str) -> bool {
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits.len() == 1 || !digits.starts_with('0'))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn next_char_len(text: &str) -> usize {
    text.chars().next().map_or(0, char::len_utf8)
}

fn set_top(scopes: &mut [Scope], scope: Scope) {
    if let Some(top) = scopes.last_mut() {
        *top = scope;
    }
}
