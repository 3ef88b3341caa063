//! Note files: naming, frontmatter and per-type templates.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Characters that are not allowed in note file names.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Kind of note, which selects the body template.
///
/// Unknown names deserialize to [`NoteType::General`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NoteType {
    #[default]
    General,
    Idea,
    Project,
    Daily,
    Reference,
    Meeting,
}

impl From<String> for NoteType {
    fn from(name: String) -> Self {
        match name.trim().to_lowercase().as_str() {
            "idea" => NoteType::Idea,
            "project" => NoteType::Project,
            "daily" => NoteType::Daily,
            "reference" => NoteType::Reference,
            "meeting" => NoteType::Meeting,
            _ => NoteType::General,
        }
    }
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::General => "general",
            NoteType::Idea => "idea",
            NoteType::Project => "project",
            NoteType::Daily => "daily",
            NoteType::Reference => "reference",
            NoteType::Meeting => "meeting",
        }
    }

    /// Section skeleton placed between the heading and the caller's content.
    fn template(&self, now: &DateTime<Local>) -> String {
        match self {
            NoteType::Project => "## Overview\n\n\n## Goals\n- [ ] \n\n## Tasks\n- [ ] \n\n\
                                  ## Resources\n\n\n## Notes\n\n"
                .to_string(),
            NoteType::Meeting => format!(
                "## Meeting Details\n**Date**: {}\n**Attendees**: \n**Purpose**: \n\n\
                 ## Agenda\n\n\n## Discussion\n\n\n## Action Items\n- [ ] \n\n## Next Steps\n\n\n",
                now.format("%Y-%m-%d")
            ),
            NoteType::Daily => format!(
                "## {}\n\n### Morning Thoughts\n\n\n### Today's Tasks\n- [ ] \n\n\
                 ### Notes\n\n\n### Reflection\n\n\n",
                now.format("%A, %B %d, %Y")
            ),
            NoteType::Idea => "## The Idea\n\n\n## Why This Matters\n\n\n\
                               ## Implementation Thoughts\n\n\n## Next Steps\n\
                               - [ ] Research\n- [ ] Prototype\n- [ ] Validate\n\n"
                .to_string(),
            NoteType::General | NoteType::Reference => String::new(),
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Make a title safe to use as a note file name. Path separators are kept;
/// [`NoteVault::create_note`](super::NoteVault::create_note) rejects them.
pub fn sanitize_filename(title: &str) -> String {
    let mut name: String = title
        .chars()
        .map(|c| {
            if INVALID_FILENAME_CHARS.contains(&c) {
                '-'
            } else {
                c
            }
        })
        .collect();

    if !name.ends_with(".md") {
        name.push_str(".md");
    }
    name
}

/// Split a comma-separated tag list, dropping blanks.
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Full text of a new note: frontmatter, heading, template, content, footer.
pub fn render_note(
    title: &str,
    content: &str,
    tags: &[String],
    note_type: NoteType,
    now: &DateTime<Local>,
) -> String {
    let stamp = now.format("%Y-%m-%d %H:%M:%S");
    let tag_line = tags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "---\ntitle: {title}\ncreated: {stamp}\nmodified: {stamp}\ntype: {note_type}\ntags: {tag_line}\n---\n\n\
         # {title}\n\n{template}{content}\n\n---\n*Created via invite-server on {footer}*\n",
        template = note_type.template(now),
        footer = now.format("%Y-%m-%d at %H:%M:%S"),
    )
}

/// Display title of a note: frontmatter `title:`, else the first `# `
/// heading, else the file stem.
pub fn note_title(content: &str, path: &Path) -> String {
    let mut lines = content.lines();

    if content.starts_with("---") && lines.next() == Some("---") {
        for line in lines.by_ref() {
            if line == "---" {
                break;
            }
            if let Some(title) = line.strip_prefix("title:") {
                let title = title.trim();
                if !title.is_empty() {
                    return title.to_string();
                }
            }
        }
    }

    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 9, 25, 9, 30, 0).unwrap()
    }

    #[test]
    fn sanitize_replaces_invalid_characters() {
        assert_eq!(sanitize_filename("Q3: plan <draft>?"), "Q3- plan -draft--.md");
        assert_eq!(sanitize_filename("a|b*c\"d"), "a-b-c-d.md");
        assert_eq!(sanitize_filename("already.md"), "already.md");
    }

    #[test]
    fn unknown_note_type_falls_back_to_general() {
        let t: NoteType = serde_json::from_str(r#""journal""#).unwrap();
        assert_eq!(t, NoteType::General);

        let t: NoteType = serde_json::from_str(r#""Meeting""#).unwrap();
        assert_eq!(t, NoteType::Meeting);
        assert_eq!(serde_json::to_string(&t).unwrap(), r#""meeting""#);
    }

    #[test]
    fn tags_are_trimmed_and_blank_ones_dropped() {
        assert_eq!(parse_tags(" mcp, rust ,,ai "), vec!["mcp", "rust", "ai"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn rendered_note_has_frontmatter_template_and_footer() {
        let text = render_note(
            "Roadmap",
            "First milestone",
            &["planning".to_string(), "q4".to_string()],
            NoteType::Project,
            &now(),
        );

        assert!(text.starts_with(
            "---\ntitle: Roadmap\ncreated: 2025-09-25 09:30:00\nmodified: 2025-09-25 09:30:00\n\
             type: project\ntags: #planning #q4\n---\n\n# Roadmap\n\n## Overview"
        ));
        assert!(text.contains("## Notes\n\nFirst milestone\n\n---\n"));
        assert!(text.ends_with("*Created via invite-server on 2025-09-25 at 09:30:00*\n"));
    }

    #[test]
    fn daily_template_names_the_day() {
        let text = render_note("Today", "", &[], NoteType::Daily, &now());
        assert!(text.contains("## Thursday, September 25, 2025"));
    }

    #[test]
    fn title_prefers_frontmatter_then_heading_then_stem() {
        let path = PathBuf::from("Projects/roadmap-v2.md");

        assert_eq!(
            note_title("---\ntitle: Roadmap\n---\n# Other\n", &path),
            "Roadmap"
        );
        assert_eq!(note_title("intro\n# Heading Title\n", &path), "Heading Title");
        assert_eq!(note_title("no heading here", &path), "roadmap-v2");
    }
}
