//! Fallback category for taxonomy rows that leave the `category` column blank.
//!
//! Keyword groups are checked in a fixed order (social, cognitive, physical,
//! technical) against the lowercased name + description; the first group with a
//! hit wins. Rows matching nothing are treated as cognitive skills.

const SOCIAL_KEYWORDS: &[&str] = &[
    "communication",
    "leadership",
    "teamwork",
    "management",
    "coordination",
    "negotiation",
    "persuasion",
    "social",
    "interpersonal",
    "service",
    "listening",
    "people",
    "others",
    "attention to what",
];

const COGNITIVE_KEYWORDS: &[&str] = &[
    "reasoning",
    "problem solving",
    "critical thinking",
    "learning",
    "memory",
    "attention",
    "decision making",
    "creativity",
    "comprehension",
    "reading",
    "understanding",
    "logic",
    "thinking",
];

const PHYSICAL_KEYWORDS: &[&str] = &[
    "physical",
    "strength",
    "dexterity",
    "stamina",
    "vision",
    "hearing",
    "motor",
    "manual",
];

const TECHNICAL_KEYWORDS: &[&str] = &[
    "programming",
    "software",
    "computer",
    "system",
    "database",
    "web",
    "network",
    "technical",
    "engineering",
    "analysis",
    "data",
    "technology",
];

pub const SOCIAL: &str = "Social";
pub const COGNITIVE: &str = "Cognitive";
pub const PHYSICAL: &str = "Physical";
pub const TECHNICAL: &str = "Technical";

/// Infers a broad category from a skill's name and description.
pub fn infer_category(name: &str, description: &str) -> &'static str {
    let text = format!("{name} {description}").to_lowercase();
    let hit = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if hit(SOCIAL_KEYWORDS) {
        SOCIAL
    } else if hit(COGNITIVE_KEYWORDS) {
        COGNITIVE
    } else if hit(PHYSICAL_KEYWORDS) {
        PHYSICAL
    } else if hit(TECHNICAL_KEYWORDS) {
        TECHNICAL
    } else {
        COGNITIVE
    }
}
