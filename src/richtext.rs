//! Inline rich text used by report paragraphs and table cells.
//!
//! Report content is authored as short markup strings (see [`parse_markup`]) and turned into
//! [`Span`]s.  A span only carries the attributes that differ from the paragraph's role style;
//! the renderer layers the span style over the role style with [`Span::style_over`].

use std::fmt;

use genpdf::style::{Color, Style, StyledString};

/// A run of text with inline overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    color: Option<Color>,
    size: Option<u8>,
}

impl Span {
    /// Creates a span without any inline overrides.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns the raw text of the span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span forces a bold face.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns whether the span forces an italic face.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns the color override, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Returns the font size override in points, if any.
    pub fn size(&self) -> Option<u8> {
        self.size
    }

    /// Marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Marks the span as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Overrides the text color.
    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Overrides the font size.
    pub fn sized(mut self, size: u8) -> Self {
        self.size = Some(size);
        self
    }

    /// Returns `base` with this span's overrides applied on top.
    pub fn style_over(&self, base: Style) -> Style {
        let mut style = base;
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if let Some(size) = self.size {
            style.set_font_size(size);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span into a styled string layered over `base`.
    pub fn to_styled_string(&self, base: Style) -> StyledString {
        StyledString::new(self.text.clone(), self.style_over(base))
    }
}

/// Concatenates the text of all spans.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}

/// Errors produced by [`parse_markup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    index: usize,
    message: String,
}

impl ParseError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte offset in the input where the problem was found.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, Default)]
struct Inherited {
    bold: bool,
    italic: bool,
    color: Option<Color>,
    size: Option<u8>,
}

impl Inherited {
    fn matches(&self, span: &Span) -> bool {
        span.bold == self.bold
            && span.italic == self.italic
            && span.color == self.color
            && span.size == self.size
    }

    fn span(&self, text: String) -> Span {
        Span {
            text,
            bold: self.bold,
            italic: self.italic,
            color: self.color,
            size: self.size,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    Bold,
    Italic,
    Directive,
}

impl Scope {
    fn closing(self) -> &'static str {
        match self {
            Scope::Bold => "**",
            Scope::Italic => "*",
            Scope::Directive => "}",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Scope::Bold => "bold span",
            Scope::Italic => "italic span",
            Scope::Directive => "directive body",
        }
    }
}

/// Parses report markup into spans.
///
/// Supported syntax:
///
/// - `**bold**` and `*italic*`, which may nest
/// - `[color=#RRGGBB]{text}` for colored text
/// - `[size=N]{text}` for a font size override in points
///
/// Adjacent text with identical attributes is emitted as a single span.
pub fn parse_markup(input: &str) -> Result<Vec<Span>, ParseError> {
    let mut parser = Parser {
        input,
        index: 0,
        spans: Vec::new(),
    };
    parser.parse_scope(Inherited::default(), None)?;
    Ok(parser.spans)
}

struct Parser<'a> {
    input: &'a str,
    index: usize,
    spans: Vec<Span>,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.index..]
    }

    fn parse_scope(&mut self, state: Inherited, scope: Option<Scope>) -> Result<(), ParseError> {
        let mut buffer = String::new();

        while self.index < self.input.len() {
            let rest = self.rest();

            if let Some(scope) = scope {
                // `**` closes bold before it can open a nested italic.
                if rest.starts_with(scope.closing()) {
                    self.flush(&mut buffer, state);
                    self.index += scope.closing().len();
                    return Ok(());
                }
            }

            if rest.starts_with("**") {
                self.flush(&mut buffer, state);
                self.index += 2;
                let nested = Inherited {
                    bold: true,
                    ..state
                };
                self.parse_scope(nested, Some(Scope::Bold))?;
            } else if rest.starts_with('*') {
                self.flush(&mut buffer, state);
                self.index += 1;
                let nested = Inherited {
                    italic: true,
                    ..state
                };
                self.parse_scope(nested, Some(Scope::Italic))?;
            } else if rest.starts_with('[') {
                let nested = self.parse_directive(state)?;
                self.flush(&mut buffer, state);
                self.parse_scope(nested, Some(Scope::Directive))?;
            } else if rest.starts_with(']') || rest.starts_with('}') {
                return Err(ParseError::new(
                    self.index,
                    format!("unexpected `{}`", &rest[..1]),
                ));
            } else if let Some(ch) = rest.chars().next() {
                buffer.push(ch);
                self.index += ch.len_utf8();
            }
        }

        match scope {
            Some(scope) => Err(ParseError::new(
                self.index,
                format!("unterminated {}", scope.name()),
            )),
            None => {
                self.flush(&mut buffer, state);
                Ok(())
            }
        }
    }

    /// Parses `[name=value]{` and returns the state for the directive body.
    fn parse_directive(&mut self, state: Inherited) -> Result<Inherited, ParseError> {
        let start = self.index;
        let rest = self.rest();
        let close = rest
            .find(']')
            .ok_or_else(|| ParseError::new(start, "unterminated directive, expected `]`"))?;
        let directive = &rest[1..close];
        let (name, value) = directive.split_once('=').ok_or_else(|| {
            ParseError::new(start + 1, "expected `name=value` inside directive")
        })?;

        let value_index = start + 1 + name.len() + 1;
        let mut nested = state;
        match name {
            "color" => nested.color = Some(parse_hex_color(value, value_index)?),
            "size" => {
                let size = value
                    .parse::<u8>()
                    .ok()
                    .filter(|size| *size > 0)
                    .ok_or_else(|| {
                        ParseError::new(value_index, "font size must be a positive integer")
                    })?;
                nested.size = Some(size);
            }
            other => {
                return Err(ParseError::new(
                    start + 1,
                    format!("unsupported directive `{}`", other),
                ))
            }
        }

        let brace = start + close + 1;
        if !self.input[brace..].starts_with('{') {
            return Err(ParseError::new(brace, "expected `{` after directive"));
        }
        self.index = brace + 1;
        Ok(nested)
    }

    fn flush(&mut self, buffer: &mut String, state: Inherited) {
        if buffer.is_empty() {
            return;
        }
        let text = std::mem::take(buffer);
        match self.spans.last_mut() {
            Some(last) if state.matches(last) => last.text.push_str(&text),
            _ => self.spans.push(state.span(text)),
        }
    }
}

/// Parses a `#RRGGBB` value.
pub fn parse_hex_color(value: &str, index: usize) -> Result<Color, ParseError> {
    let hex = value
        .strip_prefix('#')
        .ok_or_else(|| ParseError::new(index, "expected `#` followed by six hex digits"))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ParseError::new(
            index + 1,
            "invalid RGB specification; expected six hexadecimal digits",
        ));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| ParseError::new(index + 1, "invalid hexadecimal digit"))
    };
    Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_style_layers_over_base() {
        let base = Style::new().with_font_size(10);
        let style = Span::new("Hi")
            .bold()
            .sized(14)
            .colored(Color::Rgb(1, 2, 3))
            .style_over(base);
        assert!(style.is_bold());
        assert!(!style.is_italic());
        assert_eq!(style.font_size(), 14);
        assert_eq!(style.color(), Some(Color::Rgb(1, 2, 3)));
    }

    #[test]
    fn plain_markup_is_one_span() {
        let spans = parse_markup("All tip money stays on the platform.").unwrap();
        assert_eq!(spans, vec![Span::new("All tip money stays on the platform.")]);
    }

    #[test]
    fn bold_lead_in() {
        let spans = parse_markup("**TipUs** is a digital tipping platform").unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text(), "TipUs");
        assert!(spans[0].is_bold());
        assert_eq!(spans[1].text(), " is a digital tipping platform");
        assert!(!spans[1].is_bold());
    }

    #[test]
    fn nested_bold_and_italic() {
        let spans = parse_markup("a **b *c*** d").unwrap();
        let texts: Vec<_> = spans.iter().map(Span::text).collect();
        assert_eq!(texts, ["a ", "b ", "c", " d"]);
        assert!(spans[2].is_bold() && spans[2].is_italic());
    }

    #[test]
    fn color_and_size_directives() {
        let spans = parse_markup("[color=#d4856a]{[size=9]{note}} tail").unwrap();
        assert_eq!(spans[0].text(), "note");
        assert_eq!(spans[0].color(), Some(Color::Rgb(0xd4, 0x85, 0x6a)));
        assert_eq!(spans[0].size(), Some(9));
        assert_eq!(spans[1].text(), " tail");
        assert_eq!(spans[1].size(), None);
    }

    #[test]
    fn plain_text_joins_spans() {
        let spans = parse_markup("**Role** and *duty*").unwrap();
        assert_eq!(plain_text(&spans), "Role and duty");
    }

    #[test]
    fn unterminated_bold_is_reported() {
        let err = parse_markup("**oops").unwrap_err();
        assert!(err.message().contains("unterminated bold"));
        assert_eq!(err.index(), 6);
    }

    #[test]
    fn bad_color_is_reported() {
        let err = parse_markup("[color=#12FG34]{x}").unwrap_err();
        assert!(err.message().contains("invalid RGB"));
    }

    #[test]
    fn unknown_directive_is_reported() {
        let err = parse_markup("[font=Courier]{x}").unwrap_err();
        assert!(err.message().contains("unsupported directive"));
    }

    #[test]
    fn stray_closing_brace_is_reported() {
        let err = parse_markup("done}").unwrap_err();
        assert_eq!(err.index(), 4);
    }
}
