//! Closed color taxonomies and the RGB sample they are assigned from.
//!
//! Variant order is significant: ordinal `j` is the `j`-th score produced by
//! the learned classifier, so reordering variants breaks every exported model.

use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// A closed, ordinal-indexed enumeration of named colors
pub trait ColorClass:
    Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Number of members, equal to the classifier output width
    const CLASS_COUNT: usize;

    /// Position of this member in the enumeration
    fn ordinal(self) -> usize;

    /// Member at `ordinal`, if any
    fn from_ordinal(ordinal: usize) -> Option<Self>;

    /// Human-readable name
    fn name(self) -> &'static str;

    /// All members in ordinal order
    fn members() -> Vec<Self> {
        (0..Self::CLASS_COUNT).filter_map(Self::from_ordinal).collect()
    }
}

/// Base color taxonomy used for dominant-color samples
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumCount,
    EnumString,
    Display,
    IntoStaticStr,
)]
pub enum BaseColor {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Pink,
    Purple,
    Brown,
    Grey,
    Black,
    White,
}

/// Object color taxonomy used when whole object crops are classified.
///
/// Shares its member set with [`BaseColor`] because both are scored by the same
/// RGB model, but the two are kept as separate types so maps produced for one
/// context cannot be mixed with the other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumCount,
    EnumString,
    Display,
    IntoStaticStr,
)]
pub enum ObjectColor {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Pink,
    Purple,
    Brown,
    Grey,
    Black,
    White,
}

macro_rules! impl_color_class {
    ($ty:ty) => {
        impl ColorClass for $ty {
            const CLASS_COUNT: usize = <$ty as EnumCount>::COUNT;

            fn ordinal(self) -> usize {
                self as usize
            }

            fn from_ordinal(ordinal: usize) -> Option<Self> {
                <$ty>::iter().nth(ordinal)
            }

            fn name(self) -> &'static str {
                self.into()
            }
        }
    };
}

impl_color_class!(BaseColor);
impl_color_class!(ObjectColor);

/// One extracted dominant color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbSample {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance in RGB space
    pub fn distance(self, other: RgbSample) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Input vector for the learned classifier, raw 0-255 channel values
    pub fn to_input(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }
}

impl From<Rgb<u8>> for RgbSample {
    fn from(pixel: Rgb<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }
}

impl From<RgbSample> for Rgb<u8> {
    fn from(sample: RgbSample) -> Self {
        Rgb([sample.r, sample.g, sample.b])
    }
}

impl fmt::Display for RgbSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
