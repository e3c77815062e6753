//! In-memory [`VersionControl`] used by unit tests.
//!
//! Commits form linear chains (one parent each), which is all the course
//! conventions need.

use crate::core::{
    backend::{BranchInfo, CommitInfo, VersionControl},
    error::{LearnitError, Result},
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

struct MemoryCommit {
    parent: Option<String>,
    message: String,
}

pub struct MemoryRepo {
    commits: RefCell<HashMap<String, MemoryCommit>>,
    branches: RefCell<BTreeMap<String, String>>,
    config: RefCell<HashMap<String, String>>,
    diffs: RefCell<HashMap<String, String>>,
    head: RefCell<String>,
    next_id: Cell<u64>,
    pub refuse_checkout: Cell<bool>,
    pub checkouts: RefCell<Vec<String>>,
    root: PathBuf,
}

impl MemoryRepo {
    /// A repository with `main` holding one initial commit.
    pub fn new() -> Self {
        let repo = Self {
            commits: RefCell::new(HashMap::new()),
            branches: RefCell::new(BTreeMap::new()),
            config: RefCell::new(HashMap::new()),
            diffs: RefCell::new(HashMap::new()),
            head: RefCell::new("main".to_string()),
            next_id: Cell::new(1),
            refuse_checkout: Cell::new(false),
            checkouts: RefCell::new(Vec::new()),
            root: PathBuf::from("/courses/rust-course"),
        };
        let hash = repo.new_commit(None, "Initial commit");
        repo.branches.borrow_mut().insert("main".to_string(), hash);
        repo
    }

    fn new_commit(&self, parent: Option<String>, message: &str) -> String {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let hash = format!("{id:040x}");
        self.commits.borrow_mut().insert(
            hash.clone(),
            MemoryCommit {
                parent,
                message: message.to_string(),
            },
        );
        hash
    }

    /// Create `name` pointing at the tip of `from`.
    pub fn branch(&self, name: &str, from: &str) {
        let tip = self.branches.borrow()[from].clone();
        self.branches.borrow_mut().insert(name.to_string(), tip);
    }

    /// Append a commit to `branch`, returning its hash.
    pub fn commit(&self, branch: &str, message: &str) -> String {
        let parent = self.branches.borrow().get(branch).cloned();
        let hash = self.new_commit(parent, message);
        self.branches
            .borrow_mut()
            .insert(branch.to_string(), hash.clone());
        hash
    }

    pub fn describe(&self, branch: &str, description: &str) {
        self.config.borrow_mut().insert(
            format!("branch.{branch}.description"),
            description.to_string(),
        );
    }

    pub fn set_diff(&self, hash: &str, diff: &str) {
        self.diffs
            .borrow_mut()
            .insert(hash.to_string(), diff.to_string());
    }

    pub fn head(&self) -> String {
        self.head.borrow().clone()
    }

    fn ancestors(&self, hash: &str) -> Vec<String> {
        let commits = self.commits.borrow();
        let mut chain = Vec::new();
        let mut current = Some(hash.to_string());
        while let Some(hash) = current {
            current = commits.get(&hash).and_then(|c| c.parent.clone());
            chain.push(hash);
        }
        chain
    }

    fn unknown(reference: &str) -> LearnitError {
        LearnitError::Git(git2::Error::from_str(&format!(
            "unknown revision '{reference}'"
        )))
    }
}

impl VersionControl for MemoryRepo {
    fn list_branches(&self, prefix: &str) -> Result<Vec<BranchInfo>> {
        let config = self.config.borrow();
        Ok(self
            .branches
            .borrow()
            .keys()
            .filter(|name| name.starts_with(prefix))
            .map(|name| BranchInfo {
                name: name.clone(),
                description: config.get(&format!("branch.{name}.description")).cloned(),
            })
            .collect())
    }

    fn log(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>> {
        let hidden: HashSet<String> = self.ancestors(&self.rev_parse(from)?).into_iter().collect();
        let commits = self.commits.borrow();
        let mut log: Vec<CommitInfo> = self
            .ancestors(&self.rev_parse(to)?)
            .into_iter()
            .take_while(|hash| !hidden.contains(hash))
            .map(|hash| CommitInfo {
                message: commits[&hash].message.clone(),
                hash,
            })
            .collect();
        log.reverse();
        Ok(log)
    }

    fn current_ref(&self) -> Result<String> {
        Ok(self.head())
    }

    fn rev_parse(&self, reference: &str) -> Result<String> {
        if let Some(base) = reference.strip_suffix('^') {
            let hash = self.rev_parse(base)?;
            return self
                .commits
                .borrow()
                .get(&hash)
                .and_then(|c| c.parent.clone())
                .ok_or_else(|| Self::unknown(reference));
        }

        if let Some(tip) = self.branches.borrow().get(reference) {
            return Ok(tip.clone());
        }

        if self.commits.borrow().contains_key(reference) {
            return Ok(reference.to_string());
        }

        Err(Self::unknown(reference))
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        if self.refuse_checkout.get() {
            return Err(LearnitError::checkout_conflict(
                reference,
                "Your local changes would be overwritten by checkout",
            ));
        }

        let target = if self.branches.borrow().contains_key(reference) {
            reference.to_string()
        } else {
            self.rev_parse(reference)?
        };

        self.checkouts.borrow_mut().push(target.clone());
        *self.head.borrow_mut() = target;
        Ok(())
    }

    fn diff(&self, reference: &str) -> Result<String> {
        let hash = self.rev_parse(reference)?;
        Ok(self.diffs.borrow().get(&hash).cloned().unwrap_or_default())
    }

    fn get_config(&self, key: &str) -> Result<Option<String>> {
        Ok(self.config.borrow().get(key).cloned())
    }

    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.config
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn root_dir(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }
}

/// Two modules; `module-intro` (described "Getting Started") has a three-step
/// chapter and a chapter without steps, `module-advanced` a two-step chapter.
pub fn sample_course() -> MemoryRepo {
    let repo = MemoryRepo::new();

    repo.branch("module-intro", "main");
    repo.commit("module-intro", "save: module intro");
    repo.describe("module-intro", "Getting Started");

    repo.branch("intro-chapter-basics", "module-intro");
    repo.commit("intro-chapter-basics", "save: initial commit for Basics");
    repo.commit("intro-chapter-basics", "step: one");
    repo.commit("intro-chapter-basics", "step: two");
    repo.commit("intro-chapter-basics", "step: three");

    repo.branch("intro-chapter-wrap-up", "module-intro");
    repo.commit("intro-chapter-wrap-up", "save: initial commit for Wrap Up");

    repo.branch("module-advanced", "main");
    repo.branch("advanced-chapter-async", "module-advanced");
    repo.commit("advanced-chapter-async", "step: spawn");
    repo.commit("advanced-chapter-async", "step: join");

    repo
}
