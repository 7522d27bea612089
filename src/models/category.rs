use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Document classification.
///
/// The backend classifies documents into a fixed set, but nothing stops it from
/// returning a name outside that set (older databases, manual imports). Such
/// values are kept verbatim in [`Category::Other`] instead of failing the load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    General,
    Legislation,
    Jurisprudence,
    Government,
    CivilRights,
    Scraped,
    Other(String),
}

impl Category {
    /// The fixed category set, in display order
    pub const ALL: [Category; 6] = [
        Category::General,
        Category::Legislation,
        Category::Jurisprudence,
        Category::Government,
        Category::CivilRights,
        Category::Scraped,
    ];

    /// Wire name used by the backend
    pub fn as_str(&self) -> &str {
        match self {
            Category::General => "general",
            Category::Legislation => "legislation",
            Category::Jurisprudence => "jurisprudence",
            Category::Government => "government",
            Category::CivilRights => "civil_rights",
            Category::Scraped => "scraped",
            Category::Other(name) => name,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> String {
        match self {
            Category::CivilRights => "Civil rights".to_string(),
            Category::Other(name) => name.clone(),
            known => {
                let name = known.as_str();
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    /// Next category in the fixed set, wrapping around.
    ///
    /// `Other` values step onto the first known category.
    pub fn next(&self) -> Category {
        match Category::ALL.iter().position(|c| c == self) {
            Some(idx) => Category::ALL[(idx + 1) % Category::ALL.len()].clone(),
            None => Category::ALL[0].clone(),
        }
    }

    /// Previous category in the fixed set, wrapping around
    pub fn prev(&self) -> Category {
        let len = Category::ALL.len();
        match Category::ALL.iter().position(|c| c == self) {
            Some(idx) => Category::ALL[(idx + len - 1) % len].clone(),
            None => Category::ALL[len - 1].clone(),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "general" => Category::General,
            "legislation" => Category::Legislation,
            "jurisprudence" => Category::Jurisprudence,
            "government" => Category::Government,
            "civil_rights" => Category::CivilRights,
            "scraped" => Category::Scraped,
            _ => Category::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Category::from(s.trim().to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
