//! Markdown → block list, the intermediate form the layout engine consumes.
//!
//! Covers what the generator actually emits for resumes and letters:
//! ATX headings, paragraphs, bullet and numbered lists, rules, quotes and
//! fenced code. Inline emphasis is flattened; a paragraph that is entirely
//! bold keeps a bold flag.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Levels deeper than 3 are clamped to 3.
    Heading { level: u8, text: String },
    Paragraph { text: String, bold: bool },
    ListItem { marker: String, depth: u8, text: String },
    Rule,
}

const MAX_LIST_DEPTH: u8 = 3;

pub fn parse_markdown(markup: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut in_fence = false;

    for raw_line in markup.lines() {
        let trimmed = raw_line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            flush_paragraph(&mut paragraph, &mut blocks);
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            if !trimmed.is_empty() {
                blocks.push(Block::Paragraph {
                    text: transliterate(trimmed),
                    bold: false,
                });
            }
            continue;
        }

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            continue;
        }

        if is_rule(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Rule);
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let text = clean_inline(text);
            if !text.is_empty() {
                blocks.push(Block::Heading { level, text });
            }
            continue;
        }

        if let Some((marker, text)) = list_item(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let indent = raw_line.len() - raw_line.trim_start().len();
            let depth = (indent / 2).min(MAX_LIST_DEPTH as usize - 1) as u8 + 1;
            blocks.push(Block::ListItem {
                marker,
                depth,
                text: clean_inline(text),
            });
            continue;
        }

        let text = trimmed.trim_start_matches('>').trim();

        // An indented line directly under a list item continues that item.
        let continues_item = paragraph.is_empty()
            && raw_line.starts_with(' ')
            && matches!(blocks.last(), Some(Block::ListItem { .. }));
        if continues_item {
            if let Some(Block::ListItem { text: item, .. }) = blocks.last_mut() {
                item.push(' ');
                item.push_str(&clean_inline(text));
            }
            continue;
        }

        paragraph.push(text.to_string());
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
}

fn flush_paragraph(lines: &mut Vec<String>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    let joined = lines.join(" ");
    lines.clear();

    let bold = is_fully_bold(&joined);
    let text = clean_inline(&joined);
    if !text.is_empty() {
        blocks.push(Block::Paragraph { text, bold });
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim();
    Some(((hashes as u8).min(3), text))
}

fn list_item(line: &str) -> Option<(String, &str)> {
    for bullet in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return Some(("-".to_string(), rest.trim()));
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && digits <= 3 {
        let rest = &line[digits..];
        if let Some(text) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some((format!("{}.", &line[..digits]), text.trim()));
        }
    }
    None
}

fn is_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|rule_char| compact.chars().all(|c| c == *rule_char))
}

fn is_fully_bold(text: &str) -> bool {
    let text = text.trim();
    ["**", "__"].iter().any(|delim| {
        text.len() > 4
            && text.starts_with(delim)
            && text.ends_with(delim)
            && !text[2..text.len() - 2].contains(delim)
    })
}

/// Flattens inline markdown: emphasis markers, code spans, links and images.
pub fn clean_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' | '`' => {
                i += 1;
            }
            '_' if is_emphasis_underscore(&chars, i) => {
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'[') => {
                i += 1;
            }
            '[' => match link_text_end(&chars, i) {
                Some((label_end, after)) => {
                    out.extend(&chars[i + 1..label_end]);
                    i = after;
                }
                None => {
                    out.push(c);
                    i += 1;
                }
            },
            '\\' if chars.get(i + 1).is_some_and(|n| n.is_ascii_punctuation()) => {
                out.push(chars[i + 1]);
                i += 2;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
    transliterate(&collapsed)
}

/// `_` is emphasis only at a word boundary; `snake_case` and e-mail addresses keep theirs.
fn is_emphasis_underscore(chars: &[char], i: usize) -> bool {
    let before = i.checked_sub(1).map(|p| chars[p]);
    let after = chars.get(i + 1).copied();
    let word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric());
    !(word(before) && word(after))
}

/// For `[label](url)` starting at `start`, returns (index of `]`, index after `)`).
fn link_text_end(chars: &[char], start: usize) -> Option<(usize, usize)> {
    let close = chars[start..].iter().position(|c| *c == ']')? + start;
    if chars.get(close + 1) != Some(&'(') {
        return None;
    }
    let paren = chars[close + 1..].iter().position(|c| *c == ')')? + close + 1;
    Some((close, paren + 1))
}

/// Maps text onto the ASCII range the built-in PDF fonts can draw.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c),
            '\t' => out.push(' '),
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{25AA}' | '\u{25CF}' | '\u{00B7}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' => out.push(' '),
            '\u{2192}' => out.push_str("->"),
            '\u{00A9}' => out.push_str("(c)"),
            '\u{00AE}' => out.push_str("(R)"),
            '\u{2122}' => out.push_str("(TM)"),
            _ => out.push(fold_latin(c)),
        }
    }
    out
}

fn fold_latin(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        'ý' | 'ÿ' => 'y',
        _ => '?',
    }
}
