//! Static health tips by category

use serde::{Deserialize, Serialize};
use std::fmt;

const NUTRITION_TIPS: &[&str] = &[
    "Drink water before meals to help control appetite",
    "Include protein in every meal to maintain satiety",
    "Eat colorful vegetables to ensure diverse nutrients",
    "Practice portion control using smaller plates",
    "Limit processed foods and choose whole foods instead",
];

const EXERCISE_TIPS: &[&str] = &[
    "Start with 10-minute workouts if you're a beginner",
    "Include both cardio and strength training",
    "Take the stairs instead of elevators when possible",
    "Do bodyweight exercises during TV commercial breaks",
    "Schedule workouts like important appointments",
];

const SLEEP_TIPS: &[&str] = &[
    "Maintain a consistent sleep schedule",
    "Create a relaxing bedtime routine",
    "Keep your bedroom cool and dark",
    "Avoid screens 1 hour before bedtime",
    "Limit caffeine intake after 2 PM",
];

const GENERAL_TIPS: &[&str] = &[
    "Take regular breaks from sitting every hour",
    "Practice deep breathing exercises daily",
    "Spend time outdoors for vitamin D and fresh air",
    "Keep a gratitude journal for mental health",
    "Stay socially connected with friends and family",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipCategory {
    Nutrition,
    Exercise,
    Sleep,
    General,
}

impl TipCategory {
    /// Resolve a requested category; unknown names fall back to `General`
    pub fn resolve(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "nutrition" => TipCategory::Nutrition,
            "exercise" => TipCategory::Exercise,
            "sleep" => TipCategory::Sleep,
            _ => TipCategory::General,
        }
    }

    pub fn tips(self) -> &'static [&'static str] {
        match self {
            TipCategory::Nutrition => NUTRITION_TIPS,
            TipCategory::Exercise => EXERCISE_TIPS,
            TipCategory::Sleep => SLEEP_TIPS,
            TipCategory::General => GENERAL_TIPS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TipCategory::Nutrition => "nutrition",
            TipCategory::Exercise => "exercise",
            TipCategory::Sleep => "sleep",
            TipCategory::General => "general",
        }
    }
}

impl fmt::Display for TipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tip plus the full list it was drawn from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipResponse {
    /// Category as requested
    pub category: String,
    pub resolved_category: TipCategory,
    pub tip: String,
    pub all_tips: Vec<String>,
}

impl TipResponse {
    /// Build the response for `requested`, picking the tip at `index` modulo
    /// the list length
    pub fn pick(requested: &str, index: usize) -> Self {
        let resolved = TipCategory::resolve(requested);
        let tips = resolved.tips();
        Self {
            category: requested.to_string(),
            resolved_category: resolved,
            tip: tips[index % tips.len()].to_string(),
            all_tips: tips.iter().map(|t| t.to_string()).collect(),
        }
    }
}
