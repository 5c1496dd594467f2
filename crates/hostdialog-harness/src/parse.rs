#![forbid(unsafe_code)]

//! Just enough HTML and CSS-selector parsing for the in-memory document.
//!
//! Entities are left as written; the fake document never decodes them.

/// One lexical piece of an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open {
        tag: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

/// Elements that never have children.
pub fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "br" | "hr" | "img" | "input" | "meta" | "link" | "source" | "wbr"
    )
}

/// Split `markup` into tokens. Malformed tags degrade to text.
pub fn tokenize(markup: &str) -> Vec<Token> {
    let chars: Vec<char> = markup.chars().collect();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos] == '<' {
            if starts_with(&chars, pos, "<!--") {
                let end = find(&chars, pos + 4, "-->").map_or(chars.len(), |end| end + 3);
                pos = end;
                continue;
            }
            if let Some((token, next)) = read_tag(&chars, pos) {
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                tokens.push(token);
                pos = next;
                continue;
            }
        }
        text.push(chars[pos]);
        pos += 1;
    }
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

fn starts_with(chars: &[char], pos: usize, needle: &str) -> bool {
    needle
        .chars()
        .enumerate()
        .all(|(i, c)| chars.get(pos + i) == Some(&c))
}

fn find(chars: &[char], from: usize, needle: &str) -> Option<usize> {
    (from..chars.len()).find(|&pos| starts_with(chars, pos, needle))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')
}

fn read_name(chars: &[char], mut pos: usize) -> (String, usize) {
    let start = pos;
    while pos < chars.len() && is_name_char(chars[pos]) {
        pos += 1;
    }
    (chars[start..pos].iter().collect::<String>().to_ascii_lowercase(), pos)
}

fn skip_ws(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && chars[pos].is_whitespace() {
        pos += 1;
    }
    pos
}

fn read_tag(chars: &[char], start: usize) -> Option<(Token, usize)> {
    let mut pos = start + 1;
    if chars.get(pos) == Some(&'/') {
        let (tag, next) = read_name(chars, pos + 1);
        let close = find(chars, next, ">")?;
        return (!tag.is_empty()).then(|| (Token::Close(tag), close + 1));
    }
    if !chars.get(pos)?.is_ascii_alphabetic() {
        return None;
    }

    let (tag, next) = read_name(chars, pos);
    pos = next;
    let mut attrs = Vec::new();
    loop {
        pos = skip_ws(chars, pos);
        match chars.get(pos)? {
            '>' => {
                return Some((
                    Token::Open {
                        tag,
                        attrs,
                        self_closing: false,
                    },
                    pos + 1,
                ));
            }
            '/' if chars.get(pos + 1) == Some(&'>') => {
                return Some((
                    Token::Open {
                        tag,
                        attrs,
                        self_closing: true,
                    },
                    pos + 2,
                ));
            }
            _ => {}
        }

        let (name, next) = read_name(chars, pos);
        if name.is_empty() {
            return None;
        }
        pos = skip_ws(chars, next);
        let mut value = String::new();
        if chars.get(pos) == Some(&'=') {
            pos = skip_ws(chars, pos + 1);
            match chars.get(pos)? {
                quote @ ('"' | '\'') => {
                    let quote = *quote;
                    let end = (pos + 1..chars.len()).find(|&i| chars[i] == quote)?;
                    value = chars[pos + 1..end].iter().collect();
                    pos = end + 1;
                }
                _ => {
                    let end = (pos..chars.len())
                        .find(|&i| chars[i].is_whitespace() || chars[i] == '>')
                        .unwrap_or(chars.len());
                    value = chars[pos..end].iter().collect();
                    pos = end;
                }
            }
        }
        attrs.push((name, value));
    }
}

/// Parse an inline `style` attribute into property/value pairs.
pub fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            (!property.is_empty()).then(|| (property.to_ascii_lowercase(), value.trim().to_owned()))
        })
        .collect()
}

/// One compound selector: `tag#id.class.class`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

/// Parse a descendant-combinator selector into its compounds,
/// outermost first. Returns `None` for anything unsupported.
pub fn parse_selector(selector: &str) -> Option<Vec<Compound>> {
    let compounds = selector
        .split_whitespace()
        .map(parse_compound)
        .collect::<Option<Vec<_>>>()?;
    (!compounds.is_empty()).then_some(compounds)
}

fn parse_compound(input: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = input;

    let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
    if tag_end > 0 {
        let tag = &rest[..tag_end];
        if tag != "*" {
            if !tag.chars().all(is_name_char) {
                return None;
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }
    }
    rest = &rest[tag_end..];

    while let Some(kind) = rest.chars().next() {
        let body = &rest[1..];
        let end = body.find(['#', '.']).unwrap_or(body.len());
        let name = &body[..end];
        if name.is_empty() || !name.chars().all(is_name_char) {
            return None;
        }
        match kind {
            '#' => compound.id = Some(name.to_owned()),
            '.' => compound.classes.push(name.to_owned()),
            _ => return None,
        }
        rest = &body[end..];
    }
    Some(compound)
}
