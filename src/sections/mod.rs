//! Section classification
//!
//! One ordered rule table maps folder names (or hand-edited manifest values)
//! to the learning-stage labels shown on the site. The builder and every
//! consumer-side re-normalization go through [`classify`] so they never
//! disagree. New sections are added as new rows in [`SECTION_RULES`].

/// A keyword matched case-insensitively as a substring, and the label it maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRule {
    pub keyword: &'static str,
    pub label: &'static str,
}

/// Rules are evaluated in order; the first match wins
pub const SECTION_RULES: &[SectionRule] = &[
    SectionRule { keyword: "static", label: "Static" },
    SectionRule { keyword: "responsive", label: "Responsive" },
    SectionRule { keyword: "dynamic", label: "Dynamic" },
    SectionRule { keyword: "react", label: "React" },
];

/// Label for values that carry no usable text
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Map a raw folder name or section value to its display label
pub fn classify(raw: &str) -> String {
    if raw.trim().is_empty() {
        return UNCATEGORIZED.to_string();
    }

    let lowered = raw.to_lowercase();
    if let Some(rule) = SECTION_RULES.iter().find(|r| lowered.contains(r.keyword)) {
        return rule.label.to_string();
    }

    let first = raw
        .split(['-', '_'])
        .next()
        .filter(|token| !token.is_empty())
        .unwrap_or(raw);
    capitalize(first)
}

/// True when a label is already what [`classify`] would produce for it
pub fn is_canonical(label: &str) -> bool {
    classify(label) == label
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
