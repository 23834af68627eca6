//! Station categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown station category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown station category: {input}")]
pub struct InvalidCategory {
    input: String,
}

/// The kind of fuel a station sells.
///
/// The category decides the per-vehicle wait rate and the top-level folder
/// the station's images live under in object storage.
///
/// # Examples
///
/// ```
/// use fuelq_server::domain::Category;
///
/// let ev = Category::parse("ev").unwrap();
/// assert_eq!(ev.folder(), "EV");
///
/// // Diesel stations share the petrol folder
/// assert_eq!(Category::parse("Diesel").unwrap(), Category::Petrol);
///
/// assert!(Category::parse("LPG").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Category {
    Ev,
    Cng,
    Petrol,
}

impl Category {
    /// All categories, in the order the station list toggles through them.
    pub const ALL: [Category; 3] = [Category::Ev, Category::Petrol, Category::Cng];

    /// Parse a category name, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidCategory> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EV" => Ok(Category::Ev),
            "CNG" => Ok(Category::Cng),
            "PETROL" | "DIESEL" => Ok(Category::Petrol),
            _ => Err(InvalidCategory {
                input: s.to_string(),
            }),
        }
    }

    /// The storage folder holding this category's station folders.
    pub fn folder(&self) -> &'static str {
        match self {
            Category::Ev => "EV",
            Category::Cng => "CNG",
            Category::Petrol => "PETROL",
        }
    }

    /// Estimated minutes each queued vehicle adds to the wait.
    pub fn minutes_per_vehicle(&self) -> f64 {
        match self {
            Category::Ev => 10.0,
            Category::Petrol => 0.5,
            Category::Cng => 3.0,
        }
    }

    /// Human-readable label for page headings.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Ev => "EV",
            Category::Cng => "CNG",
            Category::Petrol => "Petrol",
        }
    }

    /// Index into per-category tables.
    pub(crate) fn index(&self) -> usize {
        match self {
            Category::Ev => 0,
            Category::Cng => 1,
            Category::Petrol => 2,
        }
    }
}

impl FromStr for Category {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s)
    }
}

impl TryFrom<String> for Category {
    type Error = InvalidCategory;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Category::parse(&s)
    }
}

impl From<Category> for &'static str {
    fn from(c: Category) -> Self {
        c.folder()
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Category({})", self.folder())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder())
    }
}
