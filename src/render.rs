// src/render.rs
// Output sink: markdown-subset -> HTML as a pure transform, plus the
// archiver that writes the primary documents, the dated snapshot, and the
// regenerated archive index.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

/// Newest-first cap on the archive index.
const ARCHIVE_INDEX_CAP: usize = 100;

fn re(cell: &'static OnceCell<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// Documented markdown subset -> HTML. Pure function; no core logic depends
/// on its internals.
pub fn markdown_to_html(md: &str) -> String {
    static RE_H2: OnceCell<Regex> = OnceCell::new();
    static RE_H1: OnceCell<Regex> = OnceCell::new();
    static RE_BOLD: OnceCell<Regex> = OnceCell::new();
    static RE_URL: OnceCell<Regex> = OnceCell::new();
    static RE_LI: OnceCell<Regex> = OnceCell::new();
    static RE_UL: OnceCell<Regex> = OnceCell::new();
    static RE_PARA: OnceCell<Regex> = OnceCell::new();
    static RE_P_EMPTY: OnceCell<Regex> = OnceCell::new();
    static RE_P_H_OPEN: OnceCell<Regex> = OnceCell::new();
    static RE_P_H_CLOSE: OnceCell<Regex> = OnceCell::new();
    static RE_P_HR: OnceCell<Regex> = OnceCell::new();
    static RE_P_UL_OPEN: OnceCell<Regex> = OnceCell::new();
    static RE_P_UL_CLOSE: OnceCell<Regex> = OnceCell::new();

    let mut html = md.to_string();

    html = re(&RE_H2, r"(?m)^## (.+)$")
        .replace_all(&html, "<h2>$1</h2>")
        .to_string();
    html = re(&RE_H1, r"(?m)^# (.+)$")
        .replace_all(&html, "<h1>$1</h1>")
        .to_string();
    html = re(&RE_BOLD, r"\*\*(.+?)\*\*")
        .replace_all(&html, "<strong>$1</strong>")
        .to_string();
    html = re(&RE_URL, r"(?m)^(https?://\S+)$")
        .replace_all(&html, r#"<a href="$1">Read more →</a>"#)
        .to_string();
    html = re(&RE_LI, r"(?m)^\* (.+)$")
        .replace_all(&html, "<li>$1</li>")
        .to_string();
    html = re(&RE_UL, r"(?s)((?:<li>.*?</li>\s*)+)")
        .replace_all(&html, "<ul>$1</ul>")
        .to_string();
    html = html.replace("---", "<hr>");

    // Double newline = paragraph break.
    html = re(&RE_PARA, r"\n\n+")
        .replace_all(&html, "</p>\n<p>")
        .to_string();
    html = format!("<p>{html}</p>");

    // Unwrap block elements that ended up inside paragraph tags.
    html = re(&RE_P_EMPTY, r"<p>\s*</p>").replace_all(&html, "").to_string();
    html = re(&RE_P_H_OPEN, r"<p>\s*<h").replace_all(&html, "<h").to_string();
    html = re(&RE_P_H_CLOSE, r"</h(\d)>\s*</p>")
        .replace_all(&html, "</h${1}>")
        .to_string();
    html = re(&RE_P_HR, r"<p>\s*<hr>\s*</p>")
        .replace_all(&html, "<hr>")
        .to_string();
    html = re(&RE_P_UL_OPEN, r"<p>\s*<ul>").replace_all(&html, "<ul>").to_string();
    html = re(&RE_P_UL_CLOSE, r"</ul>\s*</p>").replace_all(&html, "</ul>").to_string();

    html
}

/// Full page shell around a rendered body.
pub fn page_html(
    title: &str,
    body_html: &str,
    generated_at: DateTime<Utc>,
    accepted_count: usize,
    new_count: usize,
) -> String {
    let timestamp = generated_at.format("%A, %B %d, %Y at %I:%M %p");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: Georgia, 'Times New Roman', serif; max-width: 700px; margin: 0 auto; padding: 20px; background: #1a1a1a; color: #e0e0e0; line-height: 1.6; }}
        h1 {{ color: #ff6b6b; border-bottom: 2px solid #333; padding-bottom: 10px; font-size: 1.8em; }}
        h2 {{ color: #4ecdc4; margin-top: 2em; font-size: 1.3em; }}
        strong {{ color: #ffe66d; }}
        a {{ color: #4ecdc4; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        hr {{ border: none; border-top: 1px solid #333; margin: 2em 0; }}
        ul {{ padding-left: 0; list-style: none; }}
        li {{ margin: 0.5em 0; padding-left: 1.5em; position: relative; }}
        li:before {{ content: "•"; color: #ff6b6b; position: absolute; left: 0; }}
        .meta {{ color: #888; font-size: 0.9em; margin-top: 3em; padding-top: 1em; border-top: 1px solid #333; }}
        .timestamp {{ color: #666; font-size: 0.85em; margin-bottom: 1em; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <div class="timestamp">{timestamp} · <a href="archive/">Past editions</a></div>
    {body_html}
    <div class="meta">Generated from {accepted_count} filtered articles (of {new_count} new)</div>
</body>
</html>"#
    )
}

/// Writes the rendered digest: `digest.md` and `index.html` overwritten each
/// run, one immutable dated snapshot per run under `archive/`, and a
/// regenerated archive index.
pub struct Archiver {
    out_dir: PathBuf,
}

impl Archiver {
    pub fn new<P: Into<PathBuf>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.out_dir.join("archive")
    }

    pub fn publish(
        &self,
        title: &str,
        markdown: &str,
        generated_at: DateTime<Utc>,
        accepted_count: usize,
        new_count: usize,
    ) -> Result<()> {
        fs::create_dir_all(self.archive_dir())
            .with_context(|| format!("creating {}", self.archive_dir().display()))?;

        let md_path = self.out_dir.join("digest.md");
        fs::write(&md_path, markdown)
            .with_context(|| format!("writing {}", md_path.display()))?;

        let page = page_html(
            title,
            &markdown_to_html(markdown),
            generated_at,
            accepted_count,
            new_count,
        );
        let index_path = self.out_dir.join("index.html");
        fs::write(&index_path, &page)
            .with_context(|| format!("writing {}", index_path.display()))?;

        let snapshot = self
            .archive_dir()
            .join(format!("{}.html", generated_at.format("%Y%m%d_%H%M")));
        fs::write(&snapshot, &page)
            .with_context(|| format!("writing {}", snapshot.display()))?;
        tracing::info!(path = %snapshot.display(), "archived edition");

        let count = self.write_archive_index()?;
        tracing::info!(editions = count, "archive index updated");
        Ok(())
    }

    /// Rebuild `archive/index.html`: snapshots newest-first, capped. Stamp
    /// filenames parse back into display dates; anything unparseable shows
    /// its bare stem.
    pub fn write_archive_index(&self) -> Result<usize> {
        let dir = self.archive_dir();
        let mut names: Vec<String> = fs::read_dir(&dir)
            .with_context(|| format!("reading {}", dir.display()))?
            .flatten()
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                (name.ends_with(".html") && name != "index.html").then_some(name)
            })
            .collect();
        names.sort();
        names.reverse();
        names.truncate(ARCHIVE_INDEX_CAP);

        let links = names
            .iter()
            .map(|name| {
                let stem = name.trim_end_matches(".html");
                let display = NaiveDateTime::parse_from_str(stem, "%Y%m%d_%H%M")
                    .map(|dt| dt.format("%A, %B %d, %Y at %I:%M %p").to_string())
                    .unwrap_or_else(|_| stem.to_string());
                format!(r#"<li><a href="{name}">{display}</a></li>"#)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let index = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Archive</title>
    <style>
        body {{ font-family: Georgia, 'Times New Roman', serif; max-width: 700px; margin: 0 auto; padding: 20px; background: #1a1a1a; color: #e0e0e0; line-height: 1.6; }}
        h1 {{ color: #ff6b6b; border-bottom: 2px solid #333; padding-bottom: 10px; }}
        a {{ color: #4ecdc4; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ margin: 0.8em 0; padding-left: 1.5em; position: relative; }}
        li:before {{ content: "→"; color: #ff6b6b; position: absolute; left: 0; }}
        .back {{ margin-bottom: 2em; }}
    </style>
</head>
<body>
    <div class="back"><a href="../">← Current edition</a></div>
    <h1>Archive</h1>
    <ul>
{links}
    </ul>
</body>
</html>"#
        );
        fs::write(dir.join("index.html"), index)
            .with_context(|| format!("writing {}", dir.join("index.html").display()))?;
        Ok(names.len())
    }
}
