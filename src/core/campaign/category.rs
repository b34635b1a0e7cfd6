//! Campaign category catalog.
//!
//! The wizard's first step selects exactly one entry from this fixed set.
//! The `id` is what travels to the backend in the `category` form field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Medical,
    Education,
    Emergency,
    Community,
    Arts,
    Environment,
    Technology,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Medical,
        Category::Education,
        Category::Emergency,
        Category::Community,
        Category::Arts,
        Category::Environment,
        Category::Technology,
        Category::Other,
    ];

    /// Wire identifier sent to the backend.
    pub fn id(&self) -> &'static str {
        match self {
            Category::Medical => "medical",
            Category::Education => "education",
            Category::Emergency => "emergency",
            Category::Community => "community",
            Category::Arts => "arts",
            Category::Environment => "environment",
            Category::Technology => "technology",
            Category::Other => "other",
        }
    }

    /// Display name shown in the category picker.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Medical => "Medical & Health",
            Category::Education => "Education",
            Category::Emergency => "Emergency & Disaster Relief",
            Category::Community => "Community & Social",
            Category::Arts => "Arts & Culture",
            Category::Environment => "Environment",
            Category::Technology => "Technology",
            Category::Other => "Other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Medical => "Medical treatments, surgeries, and health emergencies",
            Category::Education => "School fees, educational programs, and learning resources",
            Category::Emergency => "Natural disasters, accidents, and urgent situations",
            Category::Community => "Community projects, social causes, and local initiatives",
            Category::Arts => "Creative projects, cultural events, and artistic endeavors",
            Category::Environment => "Environmental protection, conservation, and sustainability",
            Category::Technology => "Tech projects, innovation, and digital solutions",
            Category::Other => "Unique projects that don't fit other categories",
        }
    }

    /// Position in [`Category::ALL`].
    pub fn index(&self) -> usize {
        Category::ALL
            .iter()
            .position(|c| c == self)
            .unwrap_or(0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.id() == s.trim())
            .ok_or_else(|| format!("Unknown campaign category: {}", s))
    }
}
