//! Corpus data model: repository identifiers, per-entry fragments and per-repository corpora.

use serde::Serialize;
use std::fmt;

/// `(owner, name)` pair identifying one repository on the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryIdentifier {
    pub owner: String,
    pub name: String,
}

impl RepositoryIdentifier {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a listing link such as `/owner/repo` or `https://github.com/owner/repo`.
    pub fn from_href(href: &str) -> Option<Self> {
        let href = href.trim();
        let path = match href.find("://") {
            Some(idx) => {
                let after_scheme = &href[idx + 3..];
                &after_scheme[after_scheme.find('/')?..]
            }
            None => href,
        };
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [owner, name] => Some(Self::new(*owner, *name)),
            _ => None,
        }
    }
}

impl fmt::Display for RepositoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Why an entry contributed nothing without being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Binary,
    LowValue,
    UnsupportedKind,
}

/// Outcome of extracting one tree entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Fragment {
    /// Extracted text; may legitimately be empty.
    Text { path: String, text: String },
    Skipped { path: String, reason: SkipReason },
    Failed { path: String, reason: String },
}

impl Fragment {
    pub fn path(&self) -> &str {
        match self {
            Fragment::Text { path, .. }
            | Fragment::Skipped { path, .. }
            | Fragment::Failed { path, .. } => path,
        }
    }

    /// Text this fragment contributes to the corpus.
    pub fn text(&self) -> &str {
        match self {
            Fragment::Text { text, .. } => text,
            _ => "",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Fragment::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorpusStatus {
    /// Every entry was visited.
    Complete,
    /// Root listing was small enough to short-circuit with a sentinel.
    Trivial,
    /// The walk could not finish; the corpus is a placeholder.
    Failed { reason: String },
}

/// Aggregated extracted text for one repository, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Corpus {
    pub repository: RepositoryIdentifier,
    pub status: CorpusStatus,
    fragments: Vec<Fragment>,
}

impl Corpus {
    pub fn complete(repository: RepositoryIdentifier, fragments: Vec<Fragment>) -> Self {
        Self {
            repository,
            status: CorpusStatus::Complete,
            fragments,
        }
    }

    /// Sentinel corpus for a repository whose root listing has at most `threshold` entries.
    pub fn trivial(repository: RepositoryIdentifier, threshold: usize) -> Self {
        let text = format!(
            "Project = {} is fairly simple as it contains {} or fewer top-level entries",
            repository.name, threshold
        );
        Self {
            fragments: vec![Fragment::Text {
                path: String::new(),
                text,
            }],
            repository,
            status: CorpusStatus::Trivial,
        }
    }

    /// Placeholder corpus recording why a repository could not be walked.
    pub fn failed(repository: RepositoryIdentifier, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let text = format!(
            "Project = {} could not be crawled: {}",
            repository.name, reason
        );
        Self {
            fragments: vec![Fragment::Text {
                path: String::new(),
                text,
            }],
            repository,
            status: CorpusStatus::Failed { reason },
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Concatenation of every fragment's text, in traversal order.
    pub fn text(&self) -> String {
        self.fragments.iter().map(Fragment::text).collect()
    }

    /// Text handed to the analyzer: full corpora get a project header.
    pub fn document(&self) -> String {
        match self.status {
            CorpusStatus::Complete => {
                format!("Project Name = '{}' {}", self.repository.name, self.text())
            }
            _ => self.text(),
        }
    }

    pub fn failed_fragments(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_failed()).count()
    }
}

/// Corpora for every repository of one user, in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct UserCorpusSet {
    pub profile: String,
    pub corpora: Vec<Corpus>,
    /// Set when discovery failed or found no repositories.
    pub discovery_note: Option<String>,
}

/// Analyzer output for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryAnalysis {
    pub repository: RepositoryIdentifier,
    pub analysis: String,
}
