//! Splits formatted turn text into display lines for a non-HTML renderer.
//!
//! Only the restricted subset the persona emits is understood: `<strong>`
//! (and `<b>`) toggle emphasis, `<br/>` and newlines end a line. Any other
//! tag is kept as literal text.

/// A run of text sharing one emphasis state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub strong: bool,
}

impl Segment {
    fn new(text: impl Into<String>, strong: bool) -> Self {
        Self {
            text: text.into(),
            strong,
        }
    }
}

enum Tag {
    Open,
    Close,
    Break,
}

const TAGS: &[(&str, Tag)] = &[
    ("<strong>", Tag::Open),
    ("</strong>", Tag::Close),
    ("<b>", Tag::Open),
    ("</b>", Tag::Close),
    ("<br/>", Tag::Break),
    ("<br />", Tag::Break),
    ("<br>", Tag::Break),
];

fn match_tag(rest: &str) -> Option<(&'static Tag, usize)> {
    TAGS.iter().find_map(|(name, tag)| {
        let candidate = rest.get(..name.len())?;
        candidate.eq_ignore_ascii_case(name).then_some((tag, name.len()))
    })
}

/// Parse turn text into lines of segments. Empty lines are kept so that
/// paragraph spacing survives.
pub fn parse_markup(text: &str) -> Vec<Vec<Segment>> {
    let mut lines: Vec<Vec<Segment>> = Vec::new();
    let mut line: Vec<Segment> = Vec::new();
    let mut current = String::new();
    let mut strong = false;
    let mut rest = text;

    fn flush(line: &mut Vec<Segment>, current: &mut String, strong: bool) {
        if !current.is_empty() {
            line.push(Segment::new(std::mem::take(current), strong));
        }
    }

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some((tag, len)) = match_tag(rest) {
                flush(&mut line, &mut current, strong);
                match tag {
                    Tag::Open => strong = true,
                    Tag::Close => strong = false,
                    Tag::Break => lines.push(std::mem::take(&mut line)),
                }
                rest = &rest[len..];
                continue;
            }
        }

        if c == '\n' {
            flush(&mut line, &mut current, strong);
            lines.push(std::mem::take(&mut line));
        } else if c != '\r' {
            current.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    flush(&mut line, &mut current, strong);
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Markup with tags removed and breaks turned into newlines, for plain output
pub fn to_plain_text(text: &str) -> String {
    parse_markup(text)
        .iter()
        .map(|line| line.iter().map(|s| s.text.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
