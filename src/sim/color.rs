//! Beam colors and additive blending
//!
//! Every color is a set of primaries. Blending unions the sets and maps the
//! result back through a fixed table, so it is commutative and idempotent.

use serde::{Deserialize, Serialize};

/// Primary and secondary beam colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "l-red")]
    Red,
    #[serde(rename = "l-green")]
    Green,
    #[serde(rename = "l-blue")]
    Blue,
    /// Red + Green
    #[serde(rename = "l-orange")]
    Orange,
    /// Red + Blue
    #[serde(rename = "l-purple")]
    Purple,
    /// Green + Blue
    #[serde(rename = "l-yellow")]
    Yellow,
    /// Red + Green + Blue
    #[serde(rename = "l-white")]
    White,
}

const RED_BIT: u8 = 0b001;
const GREEN_BIT: u8 = 0b010;
const BLUE_BIT: u8 = 0b100;

/// Primary-mask to color lookup (index 0 is "no light")
const BLEND_TABLE: [Option<Color>; 8] = [
    None,
    Some(Color::Red),
    Some(Color::Green),
    Some(Color::Orange),
    Some(Color::Blue),
    Some(Color::Purple),
    Some(Color::Yellow),
    Some(Color::White),
];

impl Color {
    pub const PRIMARIES: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

    /// Bitmask of the primaries this color is made of
    pub fn mask(self) -> u8 {
        match self {
            Color::Red => RED_BIT,
            Color::Green => GREEN_BIT,
            Color::Blue => BLUE_BIT,
            Color::Orange => RED_BIT | GREEN_BIT,
            Color::Purple => RED_BIT | BLUE_BIT,
            Color::Yellow => GREEN_BIT | BLUE_BIT,
            Color::White => RED_BIT | GREEN_BIT | BLUE_BIT,
        }
    }

    pub fn from_mask(mask: u8) -> Option<Self> {
        BLEND_TABLE.get(mask as usize).copied().flatten()
    }

    pub fn is_primary(self) -> bool {
        self.mask().count_ones() == 1
    }

    /// The primaries that make up this color
    pub fn primaries(self) -> impl Iterator<Item = Color> {
        let mask = self.mask();
        Self::PRIMARIES
            .into_iter()
            .filter(move |p| mask & p.mask() != 0)
    }

    /// True if every primary of `other` is present in `self`
    pub fn contains(self, other: Color) -> bool {
        self.mask() & other.mask() == other.mask()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "l-red",
            Color::Green => "l-green",
            Color::Blue => "l-blue",
            Color::Orange => "l-orange",
            Color::Purple => "l-purple",
            Color::Yellow => "l-yellow",
            Color::White => "l-white",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "l-red" | "red" => Some(Color::Red),
            "l-green" | "green" => Some(Color::Green),
            "l-blue" | "blue" => Some(Color::Blue),
            "l-orange" | "orange" => Some(Color::Orange),
            "l-purple" | "purple" => Some(Color::Purple),
            "l-yellow" | "yellow" => Some(Color::Yellow),
            "l-white" | "white" => Some(Color::White),
            _ => None,
        }
    }
}

/// Blend any number of colors into one (None if nothing was given)
pub fn blend<I>(colors: I) -> Option<Color>
where
    I: IntoIterator<Item = Color>,
{
    let mask = colors.into_iter().fold(0u8, |acc, c| acc | c.mask());
    Color::from_mask(mask)
}
