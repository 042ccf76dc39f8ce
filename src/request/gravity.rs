//! Gravity shorthand codes.

use std::fmt;

/// Anchor point requested alongside a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gravity {
    NorthWest,
    North,
    NorthEast,
    West,
    #[default]
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

/// Shorthand codes accepted in request paths, two-letter codes first so that
/// prefix matching prefers `ne` over `n`.
pub const GRAVITY_CODES: [&str; 9] = ["nw", "ne", "sw", "se", "n", "w", "c", "e", "s"];

impl Gravity {
    /// Resolve a shorthand code. Absent or unknown codes resolve to `Center`.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("nw") => Gravity::NorthWest,
            Some("n") => Gravity::North,
            Some("ne") => Gravity::NorthEast,
            Some("w") => Gravity::West,
            Some("c") => Gravity::Center,
            Some("e") => Gravity::East,
            Some("sw") => Gravity::SouthWest,
            Some("s") => Gravity::South,
            Some("se") => Gravity::SouthEast,
            _ => Gravity::Center,
        }
    }

    /// Named anchor, e.g. `southeast`.
    pub fn name(&self) -> &'static str {
        match self {
            Gravity::NorthWest => "northwest",
            Gravity::North => "north",
            Gravity::NorthEast => "northeast",
            Gravity::West => "west",
            Gravity::Center => "center",
            Gravity::East => "east",
            Gravity::SouthWest => "southwest",
            Gravity::South => "south",
            Gravity::SouthEast => "southeast",
        }
    }

    /// Shorthand code, the inverse of [`Gravity::from_code`].
    pub fn code(&self) -> &'static str {
        match self {
            Gravity::NorthWest => "nw",
            Gravity::North => "n",
            Gravity::NorthEast => "ne",
            Gravity::West => "w",
            Gravity::Center => "c",
            Gravity::East => "e",
            Gravity::SouthWest => "sw",
            Gravity::South => "s",
            Gravity::SouthEast => "se",
        }
    }
}

impl fmt::Display for Gravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
