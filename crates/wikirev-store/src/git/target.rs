use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use git2::{build::CheckoutBuilder, ErrorCode, Oid, Repository, ResetType, Signature, Sort, Time};
use tracing::debug;
use wikirev_core::message::Author;

use crate::atomic::atomic_write;
use crate::errors::{git_error, io_error_at, Result};

/// Identity used for bookkeeping commits that replay no revision
pub const TOOL_NAME: &str = "wikirev";
pub const TOOL_EMAIL: &str = "wikirev@localhost";

/// One commit of the target history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    /// Author time, Unix epoch seconds
    pub author_time: i64,
    pub committer_time: i64,
}

/// A local git repository receiving replayed revisions
pub struct GitTarget {
    repo: Repository,
    root: PathBuf,
}

impl GitTarget {
    /// Open the repository at `root`, creating it when absent
    ///
    /// Returns the target and whether it was just created.
    pub fn open_or_init(root: &Path) -> Result<(Self, bool)> {
        if root.join(".git").exists() {
            let repo = Repository::open(root).map_err(|e| git_error("open_repo", e))?;
            debug!(root = %root.display(), "Opened target repository");
            return Ok((Self::from_repo(repo, root), false));
        }

        fs::create_dir_all(root).map_err(|e| io_error_at("create_target_dir", root, e))?;
        let repo = Repository::init(root).map_err(|e| git_error("init_repo", e))?;
        debug!(root = %root.display(), "Initialized target repository");
        Ok((Self::from_repo(repo, root), true))
    }

    fn from_repo(repo: Repository, root: &Path) -> Self {
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        Self { repo, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether HEAD points at a commit
    pub fn has_commits(&self) -> bool {
        self.repo.head().is_ok()
    }

    /// Whether `rel` exists in the working tree
    pub fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).is_file()
    }

    pub fn read(&self, rel: &str) -> Result<String> {
        let path = self.root.join(rel);
        fs::read_to_string(&path).map_err(|e| io_error_at("read_target_file", &path, e))
    }

    /// Replace the full content of `rel` in the working tree
    pub fn write(&self, rel: &str, content: &str) -> Result<()> {
        atomic_write(&self.root.join(rel), content.as_bytes())
    }

    /// Move `from` to `to` in the working tree and drop `from` from the index
    ///
    /// `to` still has to be staged.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let source = self.root.join(from);
        fs::rename(&source, self.root.join(to))
            .map_err(|e| io_error_at("rename_target_file", &source, e))?;

        let mut index = self.repo.index().map_err(|e| git_error("open_index", e))?;
        index
            .remove_path(Path::new(from))
            .map_err(|e| git_error("unstage_renamed", e))?;
        index.write().map_err(|e| git_error("write_index", e))?;
        Ok(())
    }

    /// Stage the given working-tree paths
    pub fn stage(&self, paths: &[&str]) -> Result<()> {
        let mut index = self.repo.index().map_err(|e| git_error("open_index", e))?;
        for rel in paths {
            index
                .add_path(Path::new(rel))
                .map_err(|e| git_error("stage_path", e))?;
        }
        index.write().map_err(|e| git_error("write_index", e))?;
        Ok(())
    }

    /// Commit the index as `author`, with author and committer time both
    /// set to the replayed revision's time
    pub fn commit(&self, message: &str, author: &Author) -> Result<Oid> {
        let time = Time::new(author.time, 0);
        let sig = Signature::new(&author.name, &author.email, &time)
            .map_err(|e| git_error("build_signature", e))?;
        self.commit_with(&sig, message)
    }

    /// Commit the index under the tool's own identity at the current time
    pub fn commit_as_tool(&self, message: &str) -> Result<Oid> {
        let sig = Signature::now(TOOL_NAME, TOOL_EMAIL).map_err(|e| git_error("build_signature", e))?;
        self.commit_with(&sig, message)
    }

    fn commit_with(&self, sig: &Signature<'_>, message: &str) -> Result<Oid> {
        let mut index = self.repo.index().map_err(|e| git_error("open_index", e))?;
        let tree_oid = index.write_tree().map_err(|e| git_error("write_tree", e))?;
        let tree = self
            .repo
            .find_tree(tree_oid)
            .map_err(|e| git_error("find_tree", e))?;

        let parents = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().map_err(|e| git_error("peel_head", e))?],
            Err(e) if is_unborn(&e) => vec![],
            Err(e) => return Err(git_error("read_head", e)),
        };
        let parent_refs: Vec<_> = parents.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), sig, sig, message, &tree, &parent_refs)
            .map_err(|e| git_error("commit", e))?;
        debug!(commit = %oid, "Committed");
        Ok(oid)
    }

    /// Discard every uncommitted change to tracked files
    ///
    /// Index and working tree are reset to HEAD, except for the files in
    /// `keep`, whose working-tree content survives. A repository without
    /// commits is left alone.
    pub fn restore_head(&self, keep: &[&str]) -> Result<()> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if is_unborn(&e) => return Ok(()),
            Err(e) => return Err(git_error("read_head", e)),
        };
        let commit = head.peel_to_commit().map_err(|e| git_error("peel_head", e))?;

        let mut kept = Vec::new();
        for rel in keep {
            let path = self.root.join(rel);
            match fs::read(&path) {
                Ok(bytes) => kept.push((path, bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_error_at("read_kept_file", &path, e)),
            }
        }

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo
            .reset(commit.as_object(), ResetType::Hard, Some(&mut checkout))
            .map_err(|e| git_error("reset_hard", e))?;

        for (path, bytes) in kept {
            atomic_write(&path, &bytes)?;
        }
        Ok(())
    }

    /// Full history, oldest commit first
    pub fn history(&self) -> Result<Vec<CommitSummary>> {
        if !self.has_commits() {
            return Ok(Vec::new());
        }
        let mut walk = self.repo.revwalk().map_err(|e| git_error("revwalk", e))?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)
            .map_err(|e| git_error("revwalk", e))?;
        walk.push_head().map_err(|e| git_error("revwalk", e))?;

        let mut commits = Vec::new();
        for oid in walk {
            let oid = oid.map_err(|e| git_error("revwalk", e))?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|e| git_error("find_commit", e))?;
            let author = commit.author();
            commits.push(CommitSummary {
                id: oid.to_string(),
                message: commit.message().unwrap_or_default().to_string(),
                author_name: author.name().unwrap_or_default().to_string(),
                author_email: author.email().unwrap_or_default().to_string(),
                author_time: author.when().seconds(),
                committer_time: commit.committer().when().seconds(),
            });
        }
        Ok(commits)
    }

    /// Content of `rel` as committed in `rev` (a commit id or `HEAD`),
    /// if the file exists there
    pub fn file_at(&self, rev: &str, rel: &str) -> Result<Option<String>> {
        let commit = self
            .repo
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| git_error("find_commit", e))?;
        let tree = commit.tree().map_err(|e| git_error("commit_tree", e))?;
        let entry = match tree.get_path(Path::new(rel)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(git_error("tree_lookup", e)),
        };
        let blob = entry
            .to_object(&self.repo)
            .and_then(|obj| obj.peel_to_blob())
            .map_err(|e| git_error("peel_blob", e))?;
        Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
    }
}

fn is_unborn(err: &git2::Error) -> bool {
    matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}
