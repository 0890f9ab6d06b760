//! Named text roles, their display styles and page geometry.

use std::collections::BTreeMap;

use genpdf::style::{Color, Style};
use genpdf::{Alignment, Margins, PaperSize, Size};

use crate::model::HorizontalAlignment;

const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Converts typographic points to millimetres.
pub fn pt(points: f64) -> f64 {
    points * MM_PER_POINT
}

/// Named role a paragraph or cell is rendered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleRole {
    Title,
    Subtitle,
    /// Date or audience line under the title rule.
    Meta,
    Heading,
    Subheading,
    Body,
    BodyMuted,
    ListItem,
    DetailTitle,
    Detail,
    Note,
    /// Highlighted one-liners such as links.
    Accent,
    Small,
    Footer,
    TableHeader,
    TableCell,
    CellNote,
}

impl StyleRole {
    /// Every role, in declaration order.
    pub const ALL: [StyleRole; 17] = [
        StyleRole::Title,
        StyleRole::Subtitle,
        StyleRole::Meta,
        StyleRole::Heading,
        StyleRole::Subheading,
        StyleRole::Body,
        StyleRole::BodyMuted,
        StyleRole::ListItem,
        StyleRole::DetailTitle,
        StyleRole::Detail,
        StyleRole::Note,
        StyleRole::Accent,
        StyleRole::Small,
        StyleRole::Footer,
        StyleRole::TableHeader,
        StyleRole::TableCell,
        StyleRole::CellNote,
    ];

    /// Kebab-case role name.
    pub fn name(self) -> &'static str {
        match self {
            StyleRole::Title => "title",
            StyleRole::Subtitle => "subtitle",
            StyleRole::Meta => "meta",
            StyleRole::Heading => "heading",
            StyleRole::Subheading => "subheading",
            StyleRole::Body => "body",
            StyleRole::BodyMuted => "body-muted",
            StyleRole::ListItem => "list-item",
            StyleRole::DetailTitle => "detail-title",
            StyleRole::Detail => "detail",
            StyleRole::Note => "note",
            StyleRole::Accent => "accent",
            StyleRole::Small => "small",
            StyleRole::Footer => "footer",
            StyleRole::TableHeader => "table-header",
            StyleRole::TableCell => "table-cell",
            StyleRole::CellNote => "cell-note",
        }
    }
}

/// Display attributes of a role. Spacing values are millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: u8,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
    pub line_spacing: f64,
    pub space_before: f64,
    pub space_after: f64,
    pub indent: f64,
    pub alignment: HorizontalAlignment,
}

impl TextStyle {
    /// Regular text of the given size and color with no spacing.
    pub fn new(font_size: u8, color: Color) -> Self {
        Self {
            font_size,
            bold: false,
            italic: false,
            color,
            line_spacing: 1.0,
            space_before: 0.0,
            space_after: 0.0,
            indent: 0.0,
            alignment: HorizontalAlignment::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_space_before(mut self, mm: f64) -> Self {
        self.space_before = mm;
        self
    }

    pub fn with_space_after(mut self, mm: f64) -> Self {
        self.space_after = mm;
        self
    }

    pub fn with_indent(mut self, mm: f64) -> Self {
        self.indent = mm;
        self
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// The `genpdf` style spans are layered on.
    pub fn to_style(&self) -> Style {
        let mut style = Style::new()
            .with_font_size(self.font_size)
            .with_color(self.color)
            .with_line_spacing(self.line_spacing);
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }
}

/// Immutable role-to-style mapping used for one render.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSheet {
    body: TextStyle,
    roles: BTreeMap<StyleRole, TextStyle>,
}

impl StyleSheet {
    /// Creates a sheet whose unmapped roles render like `body`.
    pub fn new(body: TextStyle) -> Self {
        let mut roles = BTreeMap::new();
        roles.insert(StyleRole::Body, body);
        Self { body, roles }
    }

    /// Maps `role` to `style`.
    pub fn with(mut self, role: StyleRole, style: TextStyle) -> Self {
        if role == StyleRole::Body {
            self.body = style;
        }
        self.roles.insert(role, style);
        self
    }

    /// Returns the style of `role`, falling back to the body style.
    pub fn get(&self, role: StyleRole) -> &TextStyle {
        self.roles.get(&role).unwrap_or(&self.body)
    }

    /// Returns whether `role` has its own entry.
    pub fn defines(&self, role: StyleRole) -> bool {
        self.roles.contains_key(&role)
    }
}

/// A line stroke: thickness in points and color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub thickness: f64,
    pub color: Color,
}

impl Stroke {
    pub fn new(thickness: f64, color: Color) -> Self {
        Self { thickness, color }
    }

    /// Thickness converted to millimetres.
    pub fn thickness_mm(&self) -> f64 {
        pt(self.thickness)
    }
}

/// Paper size and margins of a report, in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSetup {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl PageSetup {
    /// A4 portrait with the given margins.
    pub fn a4(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        let size: Size = PaperSize::A4.into();
        Self {
            width: crate::elements::mm_to_f64(size.width),
            height: crate::elements::mm_to_f64(size.height),
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn paper_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn margins(&self) -> Margins {
        Margins::trbl(self.top, self.right, self.bottom, self.left)
    }

    /// Width available to content between the side margins.
    pub fn content_width(&self) -> f64 {
        self.width - self.left - self.right
    }

    /// Height of a fresh page between the top and bottom margins.
    pub fn content_height(&self) -> f64 {
        self.height - self.top - self.bottom
    }
}

impl From<HorizontalAlignment> for Alignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left => Alignment::Left,
            HorizontalAlignment::Center => Alignment::Center,
            HorizontalAlignment::Right => Alignment::Right,
        }
    }
}
