// src/assemble.rs
// Orders synthesized sections into the final digest: fixed category order
// from config, empty categories omitted, lead section first. Constructed
// once per run and never mutated after.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::DigestConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSection {
    pub label: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Digest {
    pub lead: String,
    pub sections: Vec<DigestSection>,
    pub accepted_count: usize,
    pub new_count: usize,
    pub generated_at: DateTime<Utc>,
}

/// Join synthesized bodies in config order. `bodies` is keyed by category
/// tag; tags with no body (or a blank one) produce no section, not an empty
/// header.
pub fn assemble(
    config: &DigestConfig,
    lead: String,
    mut bodies: HashMap<String, String>,
    accepted_count: usize,
    new_count: usize,
) -> Digest {
    let mut sections = Vec::new();
    for cat in &config.categories {
        if let Some(body) = bodies.remove(&cat.tag) {
            if !body.trim().is_empty() {
                sections.push(DigestSection {
                    label: cat.label.clone(),
                    body,
                });
            }
        }
    }
    Digest {
        lead,
        sections,
        accepted_count,
        new_count,
        generated_at: Utc::now(),
    }
}

impl Digest {
    /// Flat markdown document; rendering downstream is a pure transform of
    /// this text.
    pub fn to_markdown(&self, title: &str) -> String {
        let mut out = format!(
            "# {} - {}\n\n{}\n\n---\n\n",
            title,
            self.generated_at.format("%Y-%m-%d %H:%M"),
            self.lead
        );
        let body = self
            .sections
            .iter()
            .map(|s| format!("## {}\n\n{}", s.label, s.body))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");
        if body.is_empty() {
            out.push_str("No articles to summarize.");
        } else {
            out.push_str(&body);
        }
        out.push_str(&format!(
            "\n\n---\n*Generated from {} filtered articles (of {} new)*\n",
            self.accepted_count, self.new_count
        ));
        out
    }
}
