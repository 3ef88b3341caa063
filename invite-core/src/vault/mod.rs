//! A folder of markdown notes.
//!
//! Every path handed in by a caller is relative to the vault root and must
//! stay inside it.

mod note;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::VaultConfig;
use crate::error::{InviteError, InviteResult};

pub use note::{NoteType, note_title, parse_tags, render_note, sanitize_filename};

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 50;
const MAX_SUGGESTIONS: usize = 5;

/// Folder label used for notes directly under the vault root.
const ROOT_FOLDER: &str = "Root";

#[derive(Debug, Clone)]
pub struct NoteVault {
    root: PathBuf,
}

/// A note read back from disk.
#[derive(Debug, Clone)]
pub struct NoteContent {
    pub name: String,
    pub path: PathBuf,
    pub modified: DateTime<Local>,
    pub size: u64,
    pub content: String,
}

impl fmt::Display for NoteContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "**Note: {}**\n\n**Last Modified**: {}\n**Size**: {} bytes\n**Location**: {}\n\n---\n\n{}",
            self.name,
            self.modified.format("%Y-%m-%d %H:%M:%S"),
            self.size,
            self.path.display(),
            self.content
        )
    }
}

/// A note that was just written.
#[derive(Debug, Clone)]
pub struct CreatedNote {
    pub title: String,
    /// Path relative to the vault root.
    pub location: PathBuf,
    pub path: PathBuf,
    pub tags: Vec<String>,
    pub note_type: NoteType,
    pub created: DateTime<Local>,
}

impl fmt::Display for CreatedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags = if self.tags.is_empty() {
            "none".to_string()
        } else {
            self.tags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(", ")
        };

        write!(
            f,
            "**Note Created**\n\n**Title**: {}\n**Location**: {}\n**Tags**: {}\n**Type**: {}\n\
             **Created**: {}\n\n**Full Path**: {}\n",
            self.title,
            self.location.display(),
            tags,
            self.note_type,
            self.created.format("%Y-%m-%d %H:%M:%S"),
            self.path.display()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub title: String,
    /// Path relative to the vault root.
    pub path: PathBuf,
    pub modified: DateTime<Local>,
}

/// One page of `list_notes`, newest first.
#[derive(Debug, Clone)]
pub struct NoteListing {
    pub folder: String,
    /// Number of notes found before the limit was applied.
    pub total: usize,
    pub notes: Vec<NoteEntry>,
}

impl fmt::Display for NoteListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.notes.is_empty() {
            return if self.folder.is_empty() {
                write!(f, "No notes found in vault")
            } else {
                write!(f, "No notes found in folder: {}", self.folder)
            };
        }

        if self.folder.is_empty() {
            writeln!(f, "**Notes in your vault**\n")?;
        } else {
            writeln!(f, "**Notes in folder: {}**\n", self.folder)?;
        }
        writeln!(
            f,
            "Found {} notes (showing {})\n",
            self.total,
            self.notes.len()
        )?;

        for (i, note) in self.notes.iter().enumerate() {
            writeln!(f, "{}. **{}**", i + 1, note.title)?;
            writeln!(f, "   Path: `{}`", note.path.display())?;
            writeln!(f, "   Modified: {}\n", note.modified.format("%Y-%m-%d %H:%M"))?;
        }

        if self.total > self.notes.len() {
            write!(
                f,
                "*Showing {} of {} notes. Increase limit or specify a folder to see more.*",
                self.notes.len(),
                self.total
            )?;
        }
        Ok(())
    }
}

/// Vault statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultInfo {
    pub location: PathBuf,
    pub total_notes: usize,
    pub total_size: u64,
    /// Note count per folder, keyed by path relative to the root.
    pub folders: BTreeMap<String, usize>,
}

impl NoteVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        NoteVault { root: root.into() }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(config.root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a caller-supplied relative path onto the root.
    pub fn resolve(&self, relative: &str) -> InviteResult<PathBuf> {
        let path = Path::new(relative);
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(InviteError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }

    pub fn read_note(&self, name: &str) -> InviteResult<NoteContent> {
        let mut path = self.resolve(name)?;
        if path.extension().is_none_or(|e| e != "md") {
            path.as_mut_os_string().push(".md");
        }

        if !path.is_file() {
            return Err(InviteError::NoteNotFound {
                name: name.to_string(),
                suggestions: self.similar_notes(name)?,
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let metadata = std::fs::metadata(&path)?;

        Ok(NoteContent {
            name: name.to_string(),
            modified: DateTime::from(metadata.modified()?),
            size: metadata.len(),
            path,
            content,
        })
    }

    /// Up to five notes whose file stem contains the stem of `name`.
    fn similar_notes(&self, name: &str) -> InviteResult<Vec<String>> {
        let wanted = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if wanted.is_empty() || !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut matches: Vec<String> = self
            .markdown_files(&self.root)?
            .into_iter()
            .filter(|p| {
                p.file_stem()
                    .is_some_and(|s| s.to_string_lossy().to_lowercase().contains(&wanted))
            })
            .filter_map(|p| self.relative(&p))
            .map(|p| p.display().to_string())
            .collect();

        matches.sort();
        matches.truncate(MAX_SUGGESTIONS);
        Ok(matches)
    }

    pub fn create_note(
        &self,
        title: &str,
        content: &str,
        folder: &str,
        tags: &str,
        note_type: NoteType,
    ) -> InviteResult<CreatedNote> {
        self.create_note_at(title, content, folder, tags, note_type, Local::now())
    }

    /// Like [`create_note`](Self::create_note), with the clock supplied.
    pub fn create_note_at(
        &self,
        title: &str,
        content: &str,
        folder: &str,
        tags: &str,
        note_type: NoteType,
        now: DateTime<Local>,
    ) -> InviteResult<CreatedNote> {
        let dir = self.resolve(folder)?;
        let filename = sanitize_filename(title);
        if !is_single_component(&filename) {
            return Err(InviteError::InvalidPath(title.to_string()));
        }
        let path = dir.join(&filename);
        let location = Path::new(folder).join(&filename);

        if path.exists() {
            return Err(InviteError::NoteExists(location.display().to_string()));
        }

        std::fs::create_dir_all(&dir)?;

        let tags = parse_tags(tags);
        std::fs::write(&path, render_note(title, content, &tags, note_type, &now))?;

        tracing::debug!(path = %path.display(), "created note");

        Ok(CreatedNote {
            title: title.to_string(),
            location,
            path,
            tags,
            note_type,
            created: now,
        })
    }

    /// Notes under `folder` (the whole vault when empty), newest first.
    ///
    /// `limit` defaults to 20 and is capped at 50.
    pub fn list_notes(&self, folder: &str, limit: Option<usize>) -> InviteResult<NoteListing> {
        let dir = self.resolve(folder)?;
        if !dir.is_dir() {
            return Err(InviteError::FolderNotFound(folder.to_string()));
        }

        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

        let mut notes = Vec::new();
        for path in self.markdown_files(&dir)? {
            let modified = std::fs::metadata(&path)?.modified()?;
            notes.push((path, DateTime::<Local>::from(modified)));
        }
        notes.sort_by(|(a_path, a_time), (b_path, b_time)| {
            b_time.cmp(a_time).then_with(|| a_path.cmp(b_path))
        });

        let total = notes.len();
        let notes = notes
            .into_iter()
            .take(limit)
            .map(|(path, modified)| {
                let title = std::fs::read_to_string(&path)
                    .map(|text| note_title(&text, &path))
                    .unwrap_or_else(|_| note_title("", &path));
                NoteEntry {
                    title,
                    path: self.relative(&path).unwrap_or(path),
                    modified,
                }
            })
            .collect();

        Ok(NoteListing {
            folder: folder.to_string(),
            total,
            notes,
        })
    }

    pub fn info(&self) -> InviteResult<VaultInfo> {
        if !self.root.is_dir() {
            return Err(InviteError::FolderNotFound(self.root.display().to_string()));
        }

        let mut total_size = 0;
        let mut folders = BTreeMap::new();
        let files = self.markdown_files(&self.root)?;

        for path in &files {
            total_size += std::fs::metadata(path)?.len();

            let folder = path
                .parent()
                .and_then(|p| self.relative(p))
                .map(|p| p.display().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| ROOT_FOLDER.to_string());
            *folders.entry(folder).or_insert(0) += 1;
        }

        Ok(VaultInfo {
            location: self.root.clone(),
            total_notes: files.len(),
            total_size,
            folders,
        })
    }

    fn relative(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root).ok().map(Path::to_path_buf)
    }

    /// All `.md` files below `dir`, skipping hidden directories.
    fn markdown_files(&self, dir: &Path) -> InviteResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            for entry in std::fs::read_dir(&current)? {
                let path = entry?.path();
                if path.is_dir() {
                    let hidden = path
                        .file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with('.'));
                    if !hidden {
                        pending.push(path);
                    }
                } else if path.extension().is_some_and(|e| e == "md") {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }
}

/// Whether `name` is one plain path component, so joining it to a folder
/// cannot climb out of that folder.
fn is_single_component(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
