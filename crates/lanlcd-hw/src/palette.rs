//! Named RGB565 colors understood by the display firmware.

/// A palette entry mapping a human-readable name to an RGB565 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    /// Uppercase color name.
    pub name: &'static str,
    /// RGB565 value.
    pub rgb565: u16,
}

impl NamedColor {
    const fn new(name: &'static str, rgb565: u16) -> Self {
        Self { name, rgb565 }
    }

    /// Returns the 4-digit uppercase hex code sent on the wire.
    pub fn hex(&self) -> String {
        format!("{:04X}", self.rgb565)
    }
}

impl std::fmt::Display for NamedColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:04X})", self.name, self.rgb565)
    }
}

/// Predefined colors, in display order.
pub const PALETTE: [NamedColor; 18] = [
    NamedColor::new("BLACK", 0x0000),
    NamedColor::new("NAVY", 0x000F),
    NamedColor::new("BLUE", 0x001F),
    NamedColor::new("TEAL", 0x07EF),
    NamedColor::new("GREEN", 0x07E0),
    NamedColor::new("CYAN", 0x07FF),
    NamedColor::new("MAROON", 0x7800),
    NamedColor::new("RED", 0xF800),
    NamedColor::new("PURPLE", 0x780F),
    NamedColor::new("OLIVE", 0x7BE0),
    NamedColor::new("YELLOW", 0xFFE0),
    NamedColor::new("ORANGE", 0xFD20),
    NamedColor::new("PINK", 0xF81F),
    NamedColor::new("BROWN", 0x79E0),
    NamedColor::new("GRAY", 0x8410),
    NamedColor::new("DARKGRAY", 0x4208),
    NamedColor::new("LIGHTGRAY", 0xC618),
    NamedColor::new("WHITE", 0xFFFF),
];

/// Looks up a palette entry by name, ignoring case.
pub fn lookup(name: &str) -> Option<&'static NamedColor> {
    PALETTE.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Resolves a color value to its wire form.
///
/// Palette names become their hex code; anything else (including raw hex
/// codes) is returned unchanged.
pub fn resolve(value: &str) -> String {
    match lookup(value) {
        Some(color) => color.hex(),
        None => value.to_string(),
    }
}
