//! Unified-diff parsing and the per-step delta shown by the output process.
//!
//! [`parse`] is a single-pass line classifier over `git diff` output. The
//! lesson script of a module (`<module-branch>.md`) is treated specially: links
//! of the form `[label](/path#L<start>-<end>)` on its added lines are
//! [`Citation`]s, resolved against the working tree and printed as snippets.
//!
//! # Public API
//! - [`parse`]: diff text into [`DiffFile`]s
//! - [`find_citations`] / [`read_snippet`]: citation extraction and resolution
//! - [`build_delta`] / [`render_delta`]: what the output process prints per step

use crate::core::{
    backend::VersionControl, colors::get_change_color_style, error::Result, naming,
    state::NavigationState,
};
use colored::*;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const NO_INFORMATION: &str = "No information to show.";

static CITATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\[([^\]]*)\]\((/[/\\\w, .-]+)#L(\d+)-L?(\d+)\)").ok()
});

static BOLD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").ok());
static EMPHASIS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:\*([^*]+)\*|\b_([^_]+)_\b)").ok());
static CODE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"`([^`]+)`").ok());

/// Classification of a single line of diff output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Index,
    FromFile,
    ToFile,
    HunkHeader,
    Context,
    Added,
    Removed,
    NoNewline,
    /// Extended header lines: modes, similarity, `rename from/to`
    Meta,
}

impl LineKind {
    /// Classify `line`; `in_hunk` disambiguates `---`/`+++` from changed lines.
    pub fn classify(line: &str, in_hunk: bool) -> Self {
        if line.starts_with("diff --git ") {
            return Self::Header;
        }

        if in_hunk {
            return match line.as_bytes().first() {
                Some(b'@') if line.starts_with("@@") => Self::HunkHeader,
                Some(b'+') => Self::Added,
                Some(b'-') => Self::Removed,
                Some(b'\\') => Self::NoNewline,
                Some(b' ') | None => Self::Context,
                Some(_) => Self::Meta,
            };
        }

        if line.starts_with("index ") {
            Self::Index
        } else if line.starts_with("--- ") {
            Self::FromFile
        } else if line.starts_with("+++ ") {
            Self::ToFile
        } else if line.starts_with("@@") {
            Self::HunkHeader
        } else {
            Self::Meta
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Context,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: Change,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffHunk {
    pub header: String,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub section: String,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffFile {
    pub old_name: String,
    pub new_name: String,
    pub renamed: bool,
    pub new_file: bool,
    pub deleted: bool,
    pub hunks: Vec<DiffHunk>,
}

impl DiffFile {
    pub fn added_lines(&self) -> impl Iterator<Item = &str> {
        self.hunks
            .iter()
            .flat_map(|hunk| hunk.lines.iter())
            .filter(|line| line.kind == Change::Added)
            .map(|line| line.content.as_str())
    }

    pub fn changed_line_count(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|hunk| hunk.lines.iter())
            .filter(|line| line.kind != Change::Context)
            .count()
    }
}

/// `a/old b/new` from a `diff --git` line.
fn parse_header(line: &str) -> (String, String) {
    let paths = line.trim_start_matches("diff --git ");
    let (old, new) = match paths.rsplit_once(" b/") {
        Some((old, new)) => (old, new),
        None => paths.split_once(' ').unwrap_or((paths, paths)),
    };
    let old = old.strip_prefix("a/").unwrap_or(old);
    let new = new.strip_prefix("b/").unwrap_or(new);
    (old.to_string(), new.to_string())
}

/// `start[,count]`; a missing count means one line.
fn parse_range(range: &str) -> Option<(u32, u32)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

fn parse_hunk_header(line: &str) -> DiffHunk {
    let parsed = (|| {
        let rest = line.strip_prefix("@@ ")?;
        let (ranges, section) = rest.split_once(" @@")?;
        let (old, new) = ranges.split_once(' ')?;
        let (old_start, old_lines) = parse_range(old.strip_prefix('-')?)?;
        let (new_start, new_lines) = parse_range(new.strip_prefix('+')?)?;
        Some(DiffHunk {
            header: line.to_string(),
            old_start,
            old_lines,
            new_start,
            new_lines,
            section: section.trim_start().to_string(),
            lines: Vec::new(),
        })
    })();

    parsed.unwrap_or_else(|| {
        log::debug!("malformed hunk header: {line}");
        DiffHunk {
            header: line.to_string(),
            ..Default::default()
        }
    })
}

/// Parse `git diff` output. Lines before the first `diff --git` are ignored.
pub fn parse(diff: &str) -> Vec<DiffFile> {
    let mut files: Vec<DiffFile> = Vec::new();
    let mut in_hunk = false;

    for line in diff.lines() {
        let kind = LineKind::classify(line, in_hunk);

        if kind == LineKind::Header {
            let (old_name, new_name) = parse_header(line);
            files.push(DiffFile {
                renamed: old_name != new_name,
                old_name,
                new_name,
                ..Default::default()
            });
            in_hunk = false;
            continue;
        }

        let Some(file) = files.last_mut() else {
            continue;
        };

        match kind {
            LineKind::Meta if !in_hunk => {
                if let Some(name) = line.strip_prefix("rename from ") {
                    file.old_name = name.to_string();
                    file.renamed = true;
                } else if let Some(name) = line.strip_prefix("rename to ") {
                    file.new_name = name.to_string();
                    file.renamed = true;
                } else if line.starts_with("new file mode") {
                    file.new_file = true;
                } else if line.starts_with("deleted file mode") {
                    file.deleted = true;
                }
            }
            LineKind::HunkHeader => {
                file.hunks.push(parse_hunk_header(line));
                in_hunk = true;
            }
            LineKind::Context | LineKind::Added | LineKind::Removed => {
                let change = match kind {
                    LineKind::Added => Change::Added,
                    LineKind::Removed => Change::Removed,
                    _ => Change::Context,
                };
                if let Some(hunk) = file.hunks.last_mut() {
                    hunk.lines.push(DiffLine {
                        kind: change,
                        content: line.get(1..).unwrap_or("").to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    files
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub label: String,
    pub path: String,
    pub start: usize,
    pub end: usize,
    pub snippet: Option<String>,
}

impl Citation {
    pub fn banner(&self) -> String {
        format!("< {}:{}-{} >", self.path, self.start, self.end)
    }
}

/// Citations on one line, unresolved.
pub fn find_citations(line: &str) -> Vec<Citation> {
    let Some(pattern) = CITATION.as_ref() else {
        return Vec::new();
    };

    pattern
        .captures_iter(line)
        .filter_map(|caps| {
            Some(Citation {
                label: caps[1].to_string(),
                path: caps[2].to_string(),
                start: caps[3].parse().ok()?,
                end: caps[4].parse().ok()?,
                snippet: None,
            })
        })
        .collect()
}

/// Lines `start..=end` (1-indexed) of `path` under `root`.
pub fn read_snippet(root: &Path, path: &str, start: usize, end: usize) -> Option<String> {
    let file = root.join(path.trim_start_matches(['/', '\\']));
    let content = match fs::read_to_string(&file) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Cannot read cited file {}: {e}", file.display());
            return None;
        }
    };

    let lines: Vec<&str> = content.lines().collect();
    if start == 0 || end < start || end > lines.len() {
        log::warn!(
            "Citation range {start}-{end} is outside {} ({} lines)",
            file.display(),
            lines.len()
        );
        return None;
    }

    Some(lines[start - 1..end].join("\n"))
}

/// Citations on the added lines of a script, with snippets read from `root`.
pub fn resolve_citations(script: &DiffFile, root: &Path) -> Vec<Citation> {
    script
        .added_lines()
        .flat_map(find_citations)
        .map(|mut citation| {
            citation.snippet = read_snippet(root, &citation.path, citation.start, citation.end);
            citation
        })
        .collect()
}

/// Everything the output process shows for one step.
#[derive(Debug, Clone, Default)]
pub struct Delta {
    pub script: Option<DiffFile>,
    pub citations: Vec<Citation>,
    pub files: Vec<DiffFile>,
}

/// Split a parsed diff into the module's lesson script and the other files.
pub fn split_delta(mut files: Vec<DiffFile>, module_branch: &str, root: &Path) -> Delta {
    let script_name = format!("{module_branch}.md");
    let script = files
        .iter()
        .position(|file| file.new_name.ends_with(&script_name))
        .map(|index| files.remove(index));
    let citations = script
        .as_ref()
        .map(|script| resolve_citations(script, root))
        .unwrap_or_default();

    Delta {
        script,
        citations,
        files,
    }
}

/// The delta of the step `state` points at; `None` outside a step.
pub fn build_delta<B: VersionControl + ?Sized>(
    backend: &B,
    state: &NavigationState,
) -> Result<Option<Delta>> {
    let (Some(_), Some(commit)) = (&state.step, &state.commit) else {
        return Ok(None);
    };

    let diff = backend.diff(commit)?;
    let module = state
        .module
        .as_deref()
        .map(naming::module_to_branch)
        .unwrap_or_default();
    let files = parse(&diff);
    log::debug!("delta of {commit}: {} files", files.len());

    Ok(Some(split_delta(files, &module, &backend.root_dir()?)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownStyle {
    pub active: bool,
    pub symbols: bool,
}

impl Default for MarkdownStyle {
    fn default() -> Self {
        Self {
            active: true,
            symbols: false,
        }
    }
}

fn replace_styled(
    pattern: &LazyLock<Option<Regex>>,
    line: &str,
    symbols: bool,
    style: fn(&str) -> ColoredString,
) -> String {
    let Some(pattern) = pattern.as_ref() else {
        return line.to_string();
    };

    pattern
        .replace_all(line, |caps: &regex::Captures| {
            let inner = caps
                .iter()
                .skip(1)
                .flatten()
                .next()
                .map(|m| m.as_str())
                .unwrap_or("");
            if symbols {
                style(&caps[0]).to_string()
            } else {
                style(inner).to_string()
            }
        })
        .into_owned()
}

/// Terminal rendering of one line of a lesson script.
pub fn style_markdown(line: &str, style: MarkdownStyle) -> String {
    if !style.active {
        return line.to_string();
    }

    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        let heading = if style.symbols {
            line
        } else {
            trimmed.trim_start_matches('#').trim_start()
        };
        return heading.bold().to_string();
    }

    let line = replace_styled(&BOLD, line, style.symbols, |s| s.bold());
    let line = replace_styled(&EMPHASIS, &line, style.symbols, |s| s.italic());
    replace_styled(&CODE, &line, style.symbols, |s| s.cyan())
}

/// `text` padded on both sides with `fill` to `width` characters.
pub fn center(text: &str, fill: char, width: usize) -> String {
    let len = text.chars().count();
    let sides = width.saturating_sub(len).div_ceil(2);
    if sides == 0 {
        return text.to_string();
    }

    let pad = fill.to_string().repeat(sides);
    format!("{pad}{text}{pad}").chars().take(width).collect()
}

fn render_file(file: &DiffFile, width: usize, out: &mut Vec<String>) {
    out.push("=".repeat(width));
    if file.renamed {
        out.push(format!("{} -> {}", file.old_name.red(), file.new_name.green()));
    } else {
        out.push(file.new_name.blue().to_string());
    }

    for hunk in &file.hunks {
        out.push("-".repeat(width));
        if !hunk.section.is_empty() {
            out.push(hunk.section.bright_black().to_string());
        }
        for line in &hunk.lines {
            let color_fn = get_change_color_style(line.kind);
            out.push(color_fn(&line.content).to_string());
        }
    }
}

/// Lines printed for a delta; `None` renders the empty-state message.
pub fn render_delta(delta: Option<&Delta>, style: MarkdownStyle, width: usize) -> Vec<String> {
    let Some(delta) = delta else {
        return vec![NO_INFORMATION.to_string()];
    };

    let mut out = vec![format!(
        "Updated at {}",
        chrono::Local::now().format("%H:%M:%S")
    )];

    if let Some(script) = &delta.script {
        out.extend(script.added_lines().map(|line| style_markdown(line, style)));
    }

    // Citations whose lines could not be read are left out
    for citation in &delta.citations {
        if let Some(snippet) = &citation.snippet {
            out.push(center(&citation.banner(), '-', width));
            out.push(snippet.cyan().to_string());
        }
    }

    for file in &delta.files {
        render_file(file, width, &mut out);
    }

    out
}

/// Build and render the delta of `state`, degrading to the empty message.
pub fn show_delta<B: VersionControl + ?Sized>(
    backend: &B,
    state: &NavigationState,
    style: MarkdownStyle,
    width: usize,
) -> Vec<String> {
    match build_delta(backend, state) {
        Ok(delta) => render_delta(delta.as_ref(), style, width),
        Err(e) => {
            log::warn!("Could not compute delta: {e}");
            render_delta(None, style, width)
        }
    }
}
