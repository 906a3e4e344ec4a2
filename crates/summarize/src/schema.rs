use serde::{Deserialize, Serialize};
use std::fmt;

/// Document classification selecting the summary template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Reading Materials", alias = "ReadingMaterials", alias = "reading_materials")]
    ReadingMaterials,
    #[serde(alias = "homework")]
    Homework,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReadingMaterials => "Reading Materials",
            Self::Homework => "Homework",
        }
    }

    /// Parse a user-supplied label, ignoring case, spaces and underscores.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "readingmaterials" => Some(Self::ReadingMaterials),
            "homework" => Some(Self::Homework),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!(Category::from_label("Reading Materials"), Some(Category::ReadingMaterials));
        assert_eq!(Category::from_label("ReadingMaterials"), Some(Category::ReadingMaterials));
        assert_eq!(Category::from_label("reading_materials"), Some(Category::ReadingMaterials));
        assert_eq!(Category::from_label("HOMEWORK"), Some(Category::Homework));
        assert_eq!(Category::from_label("Unknown"), None);
        assert_eq!(Category::from_label(""), None);
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Category::ReadingMaterials).unwrap();
        assert_eq!(json, "\"Reading Materials\"");

        let parsed: Category = serde_json::from_str("\"ReadingMaterials\"").unwrap();
        assert_eq!(parsed, Category::ReadingMaterials);
        let parsed: Category = serde_json::from_str("\"Homework\"").unwrap();
        assert_eq!(parsed, Category::Homework);
    }
}
