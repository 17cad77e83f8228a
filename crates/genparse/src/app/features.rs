//! Keyword heuristics that tag generated content with feature highlights.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::model::Feature;

/// Tailwind-style breakpoint prefix at the start of a class name.
static BREAKPOINT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[\s"'`{(])(?:sm|md|lg|xl|2xl):[A-Za-z0-9\[\-]"#)
        .expect("breakpoint pattern is valid")
});

/// What makes a rule fire.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Any of the terms appears, ignoring ASCII case. Terms are lowercase.
    Keywords(&'static [&'static str]),
    /// Custom predicate over the original, case-preserved content.
    Pattern(fn(&str) -> bool),
}

/// One row of the detection table.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRule {
    pub name: &'static str,
    pub description: &'static str,
    pub trigger: Trigger,
}

impl FeatureRule {
    /// `lowered` must be `content` converted to lowercase.
    fn matches(&self, content: &str, lowered: &str) -> bool {
        match self.trigger {
            Trigger::Keywords(terms) => terms.iter().any(|term| lowered.contains(term)),
            Trigger::Pattern(predicate) => predicate(content),
        }
    }

    pub fn feature(&self) -> Feature {
        Feature::new(self.name, self.description)
    }
}

/// Detection rules in reporting order.
pub static RULES: &[FeatureRule] = &[
    FeatureRule {
        name: "Authentication",
        description: "User sign-in, sign-up, and session handling",
        trigger: Trigger::Keywords(&[
            "auth", "login", "log in", "signin", "sign in", "sign-in", "signup", "sign up",
            "sign-up", "signout", "sign out",
        ]),
    },
    FeatureRule {
        name: "Dark Mode",
        description: "Theme switching between light and dark color schemes",
        trigger: Trigger::Keywords(&[
            "dark mode",
            "dark-mode",
            "darkmode",
            "themeprovider",
            "usetheme",
            "next-themes",
        ]),
    },
    FeatureRule {
        name: "Responsive Design",
        description: "Layouts that adapt across mobile, tablet, and desktop breakpoints",
        trigger: Trigger::Pattern(has_breakpoint_prefix),
    },
    FeatureRule {
        name: "Interactive Forms",
        description: "Forms with input handling and submission logic",
        trigger: Trigger::Keywords(&["<form", "onsubmit", "handlesubmit", "useform"]),
    },
    FeatureRule {
        name: "API Integration",
        description: "Server routes for fetching and mutating data",
        trigger: Trigger::Keywords(&["/api/", "api route", "route.ts", "route.js", "route handler"]),
    },
    FeatureRule {
        name: "Database Integration",
        description: "Persistent storage backed by a database",
        trigger: Trigger::Keywords(&[
            "database",
            "prisma",
            "drizzle",
            "mongoose",
            "mongodb",
            "postgres",
            "mysql",
            "sqlite",
            "supabase",
            "firebase",
            "planetscale",
        ]),
    },
];

/// Reported when no rule fires.
pub static FALLBACK_FEATURES: &[(&str, &str)] = &[
    ("Modern UI", "Clean interface built from reusable components"),
    (
        "Component Architecture",
        "Modular React components organized by responsibility",
    ),
    (
        "Production Ready",
        "Typed, structured code ready to deploy on Vercel",
    ),
];

/// Detect features against the built-in rule table.
pub fn detect(content: &str) -> Vec<Feature> {
    detect_with(RULES, content)
}

/// Evaluate `rules` in order; every firing rule contributes one feature.
/// Returns [`FALLBACK_FEATURES`] when nothing fires.
pub fn detect_with(rules: &[FeatureRule], content: &str) -> Vec<Feature> {
    let lowered = content.to_lowercase();
    let detected: Vec<Feature> = rules
        .iter()
        .filter(|rule| rule.matches(content, &lowered))
        .map(FeatureRule::feature)
        .collect();

    if detected.is_empty() {
        debug!("no feature rule matched, using fallback highlights");
        return fallback_features();
    }

    debug!(count = detected.len(), "detected features");
    detected
}

pub fn fallback_features() -> Vec<Feature> {
    FALLBACK_FEATURES
        .iter()
        .map(|(name, description)| Feature::new(*name, *description))
        .collect()
}

fn has_breakpoint_prefix(content: &str) -> bool {
    BREAKPOINT_PREFIX.is_match(content)
}
