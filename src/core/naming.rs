//! Branch naming conventions that map the course hierarchy onto git branches.
//!
//! - the course root lives on [`ROOT_BRANCH`]
//! - a module lives on `module-<slug>`
//! - a chapter lives on `<module-slug>-chapter-<chapter-slug>`
//!
//! Turning a branch back into a human name is lossy: `module-c-plus-plus` reads
//! as "C Plus Plus" whatever the author typed. A branch description in the git
//! config always wins over [`deslug`].

pub const ROOT_BRANCH: &str = "main";
pub const MODULE_PREFIX: &str = "module-";
pub const CHAPTER_SEPARATOR: &str = "-chapter-";
pub const STEP_MARKER: &str = "step:";

/// Lowercase and hyphenate a human name.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Capitalize every hyphen-separated token and join with spaces.
pub fn deslug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the string already looks like a branch name rather than a title.
pub fn is_branch(value: &str) -> bool {
    !value.is_empty() && !value.contains(' ') && value.contains('-')
}

pub fn module_to_branch(module: &str) -> String {
    if is_branch(module) {
        module.to_string()
    } else {
        format!("{MODULE_PREFIX}{}", slugify(module))
    }
}

/// Slug of a module, whether given as a branch or as a title.
pub fn module_slug(module: &str) -> String {
    match module.strip_prefix(MODULE_PREFIX) {
        Some(slug) if is_branch(module) => slug.to_string(),
        _ => slugify(module),
    }
}

pub fn chapter_to_branch(module: &str, chapter: &str) -> String {
    if is_branch(chapter) {
        return chapter.to_string();
    }

    format!("{}{CHAPTER_SEPARATOR}{}", module_slug(module), slugify(chapter))
}

/// Prefix shared by every chapter branch of a module.
pub fn chapter_prefix(module: &str) -> String {
    format!("{}{CHAPTER_SEPARATOR}", module_slug(module))
}

pub fn is_module_branch(branch: &str) -> bool {
    branch.starts_with(MODULE_PREFIX) && !branch.contains(CHAPTER_SEPARATOR)
}

pub fn is_chapter_branch(branch: &str) -> bool {
    branch.contains(CHAPTER_SEPARATOR)
}

/// Split a chapter branch into its module branch and chapter slug.
pub fn split_chapter_branch(branch: &str) -> Option<(String, String)> {
    let (module, chapter) = branch.split_once(CHAPTER_SEPARATOR)?;
    Some((format!("{MODULE_PREFIX}{module}"), chapter.to_string()))
}

/// Fallback display name of a module branch.
pub fn module_display_name(branch: &str) -> String {
    deslug(branch.strip_prefix(MODULE_PREFIX).unwrap_or(branch))
}

/// Fallback display name of a chapter branch.
pub fn chapter_display_name(branch: &str) -> String {
    match split_chapter_branch(branch) {
        Some((_, chapter)) => deslug(&chapter),
        None => deslug(branch),
    }
}

/// Menu key for the entry at `index`: 1..9 then 0, nothing past the tenth.
pub fn display_key(index: usize) -> Option<char> {
    if index >= 10 {
        return None;
    }
    char::from_digit(((index + 1) % 10) as u32, 10)
}

pub fn is_step_message(message: &str) -> bool {
    message.starts_with(STEP_MARKER)
}

/// Label of a step commit: first line of the message without the marker.
pub fn step_label(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("");
    first_line
        .strip_prefix(STEP_MARKER)
        .unwrap_or(first_line)
        .trim()
        .to_string()
}
