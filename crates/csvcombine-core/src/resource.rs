//! Resource catalog and content access
//!
//! A resource is a named, project-scoped text file. Stores expose the full
//! catalog and raw content; every call carries an explicit [`Session`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Identifies one addressable resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Project the resource belongs to
    pub project: String,
    /// Resource name within the project (e.g., "sales-2024.csv")
    pub name: String,
}

impl ResourceRef {
    /// Create a new resource reference
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.name)
    }
}

/// Access context for catalog and fetch calls
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// User the session acts on behalf of, if any
    pub user: Option<String>,
    /// Projects this session may read; `None` means all projects
    pub projects: Option<Vec<String>>,
}

impl Session {
    /// Unscoped session without a user
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Unscoped session for a named user
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            projects: None,
        }
    }

    /// Restrict the session to the given projects
    pub fn with_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projects = Some(projects.into_iter().map(Into::into).collect());
        self
    }

    /// Whether this session may read from `project`
    pub fn allows(&self, project: &str) -> bool {
        match &self.projects {
            Some(projects) => projects.iter().any(|p| p == project),
            None => true,
        }
    }

    fn check(&self, project: &str) -> Result<()> {
        if self.allows(project) {
            Ok(())
        } else {
            Err(Error::AccessDenied {
                project: project.to_string(),
            })
        }
    }
}

/// Catalog listing and content retrieval for resources
pub trait ResourceStore {
    /// List every resource visible to the session, unfiltered
    fn list_resources(&self, session: &Session) -> Result<Vec<ResourceRef>>;

    /// Retrieve the raw bytes of one resource
    fn fetch_resource(&self, session: &Session, resource: &ResourceRef) -> Result<Vec<u8>>;
}

/// In-memory store, catalog order is insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<(ResourceRef, Vec<u8>)>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource
    pub fn insert(
        &mut self,
        project: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) {
        let resource = ResourceRef::new(project, name);
        let content = content.into();
        match self.entries.iter_mut().find(|(r, _)| *r == resource) {
            Some(entry) => entry.1 = content,
            None => self.entries.push((resource, content)),
        }
    }

    /// Builder-style variant of [`MemoryStore::insert`]
    pub fn with(
        mut self,
        project: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(project, name, content);
        self
    }

    /// Number of stored resources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no resources
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceStore for MemoryStore {
    fn list_resources(&self, session: &Session) -> Result<Vec<ResourceRef>> {
        Ok(self
            .entries
            .iter()
            .filter(|(r, _)| session.allows(&r.project))
            .map(|(r, _)| r.clone())
            .collect())
    }

    fn fetch_resource(&self, session: &Session, resource: &ResourceRef) -> Result<Vec<u8>> {
        session.check(&resource.project)?;
        self.entries
            .iter()
            .find(|(r, _)| r == resource)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| Error::ResourceNotFound {
                project: resource.project.clone(),
                name: resource.name.clone(),
            })
    }
}

/// Filesystem store rooted at a directory
///
/// Layout: `<root>/<project>/<name>`. Each immediate subdirectory of the root
/// is a project; files nested deeper keep their relative path as the name,
/// joined with `/`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a store over `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, resource: &ResourceRef) -> Option<PathBuf> {
        let mut path = self.root.join(plain_component(&resource.project)?);
        for part in resource.name.split('/') {
            path.push(plain_component(part)?);
        }
        Some(path)
    }
}

/// Accept only a single normal path segment (no separators, `..`, or roots)
fn plain_component(segment: &str) -> Option<&str> {
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(segment),
        _ => None,
    }
}

impl ResourceStore for DirectoryStore {
    fn list_resources(&self, session: &Session) -> Result<Vec<ResourceRef>> {
        let mut resources = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(2)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let mut parts = relative
                .components()
                .filter_map(|c| c.as_os_str().to_str());
            let Some(project) = parts.next() else {
                continue;
            };
            if !session.allows(project) {
                continue;
            }
            let name = parts.collect::<Vec<_>>().join("/");
            resources.push(ResourceRef::new(project, name));
        }

        Ok(resources)
    }

    fn fetch_resource(&self, session: &Session, resource: &ResourceRef) -> Result<Vec<u8>> {
        session.check(&resource.project)?;

        let not_found = || Error::ResourceNotFound {
            project: resource.project.clone(),
            name: resource.name.clone(),
        };
        let path = self.resolve(resource).ok_or_else(not_found)?;
        if !path.is_file() {
            return Err(not_found());
        }

        Ok(fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with("sales", "a.csv", "x\n1\n")
            .with("hr", "b.csv", "y\n2\n")
    }

    #[test]
    fn test_memory_store_lists_in_insertion_order() {
        let listed = store().list_resources(&Session::anonymous()).unwrap();
        assert_eq!(
            listed,
            vec![
                ResourceRef::new("sales", "a.csv"),
                ResourceRef::new("hr", "b.csv"),
            ]
        );
    }

    #[test]
    fn test_memory_store_insert_replaces_content() {
        let mut store = store();
        store.insert("sales", "a.csv", "x\n9\n");

        assert_eq!(store.len(), 2);
        let content = store
            .fetch_resource(&Session::anonymous(), &ResourceRef::new("sales", "a.csv"))
            .unwrap();
        assert_eq!(content, b"x\n9\n");
    }

    #[test]
    fn test_fetch_missing_resource() {
        let err = store()
            .fetch_resource(&Session::anonymous(), &ResourceRef::new("sales", "nope.csv"))
            .unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound { .. }));
    }

    #[test]
    fn test_scoped_session_hides_other_projects() {
        let session = Session::for_user("alice").with_projects(["hr"]);
        let listed = store().list_resources(&session).unwrap();
        assert_eq!(listed, vec![ResourceRef::new("hr", "b.csv")]);

        let err = store()
            .fetch_resource(&session, &ResourceRef::new("sales", "a.csv"))
            .unwrap_err();
        assert!(matches!(err, Error::AccessDenied { project } if project == "sales"));
    }

    #[test]
    fn test_resource_ref_display() {
        assert_eq!(ResourceRef::new("p", "f.csv").to_string(), "p/f.csv");
    }

    #[test]
    fn test_plain_component_rejects_traversal() {
        assert_eq!(plain_component("data.csv"), Some("data.csv"));
        assert_eq!(plain_component(".."), None);
        assert_eq!(plain_component("a/b"), None);
        assert_eq!(plain_component(""), None);
    }
}
