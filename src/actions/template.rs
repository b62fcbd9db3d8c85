//! `${group}` replacement templates for mask actions.
//!
//! Only the `${name}` form is a placeholder; every other character,
//! including a bare `$`, is copied literally.

use regex::Captures;

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Literal(String),
    Group(String),
}

/// Replacement template parsed once at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceTemplate {
    parts: Vec<Part>,
}

impl ReplaceTemplate {
    pub fn parse(template: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(start) = rest.find("${") {
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    literal.push_str(&rest[..start]);
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(Part::Group(after[..end].to_string()));
                    rest = &after[end + 1..];
                }
                None => break,
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Self { parts }
    }

    /// Group names referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            Part::Group(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Render against a match. Groups that did not participate render empty.
    pub fn expand(&self, caps: &Captures<'_>) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(s) => out.push_str(s),
                Part::Group(name) => {
                    if let Some(m) = caps.name(name) {
                        out.push_str(m.as_str());
                    }
                }
            }
        }
        out
    }
}
