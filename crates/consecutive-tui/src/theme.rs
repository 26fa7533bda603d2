use ratatui::style::Color;

use crate::demo::RegionKind;

/// Colors for the playground, Gruvbox Material dark
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub surface: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,

    pub header: Color,
    pub bar: Color,
    pub banner: Color,
    pub list: Color,
    pub footer: Color,

    /// Border of a region that is currently pinned
    pub pinned: Color,
    /// Area uncovered by over-drag
    pub over_drag: Color,

    pub idle: Color,
    pub dragging: Color,
    pub settling: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(0x28, 0x28, 0x28),
            surface: Color::Rgb(0x32, 0x30, 0x2f),
            border: Color::Rgb(0x50, 0x49, 0x45),
            text: Color::Rgb(0xd4, 0xbe, 0x98),
            dim: Color::Rgb(0x92, 0x83, 0x74),
            header: Color::Rgb(0x7d, 0xae, 0xa3),
            bar: Color::Rgb(0xd8, 0xa6, 0x57),
            banner: Color::Rgb(0xd3, 0x86, 0x9b),
            list: Color::Rgb(0xa9, 0xb6, 0x65),
            footer: Color::Rgb(0x89, 0xb4, 0x82),
            pinned: Color::Rgb(0xe7, 0x8a, 0x4e),
            over_drag: Color::Rgb(0x45, 0x40, 0x3d),
            idle: Color::Rgb(0xa9, 0xb6, 0x65),
            dragging: Color::Rgb(0xd8, 0xa6, 0x57),
            settling: Color::Rgb(0x7d, 0xae, 0xa3),
        }
    }
}

impl Theme {
    pub fn region(&self, kind: RegionKind) -> Color {
        match kind {
            RegionKind::Header => self.header,
            RegionKind::Bar => self.bar,
            RegionKind::Banner => self.banner,
            RegionKind::List { .. } => self.list,
            RegionKind::Footer => self.footer,
        }
    }
}
