//! Filesystem orchestrator service contracts.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use super::types::{FsMoveRequest, FsNode, FsNodeKind};

/// Object-safe boxed future used by [`FilesystemService`] async methods.
pub type FsFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for the prompt/folder tree backing desktop icons.
pub trait FilesystemService {
    /// Lists the direct children of `parent_id` (`None` lists the root).
    fn load_children<'a>(
        &'a self,
        parent_id: Option<&'a str>,
    ) -> FsFuture<'a, Result<Vec<FsNode>, String>>;

    /// Moves a record into `target_folder_id` (`None` moves it to the root).
    fn move_node<'a>(
        &'a self,
        kind: FsNodeKind,
        id: &'a str,
        target_folder_id: Option<&'a str>,
    ) -> FsFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op filesystem adapter for hosts without a backend.
pub struct NoopFilesystemService;

impl FilesystemService for NoopFilesystemService {
    fn load_children<'a>(
        &'a self,
        _parent_id: Option<&'a str>,
    ) -> FsFuture<'a, Result<Vec<FsNode>, String>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn move_node<'a>(
        &'a self,
        _kind: FsNodeKind,
        _id: &'a str,
        _target_folder_id: Option<&'a str>,
    ) -> FsFuture<'a, Result<(), String>> {
        Box::pin(async { Err("filesystem unavailable: move_node".to_string()) })
    }
}

#[derive(Debug, Default)]
struct MemoryFsInner {
    nodes: Vec<FsNode>,
    moves: Vec<FsMoveRequest>,
    offline: bool,
}

#[derive(Debug, Clone, Default)]
/// In-memory filesystem used by tests and offline hosts.
///
/// Every `move_node` call is recorded, including rejected ones.
pub struct MemoryFilesystemService {
    inner: Rc<RefCell<MemoryFsInner>>,
}

impl MemoryFilesystemService {
    /// Creates a filesystem seeded with `nodes`.
    pub fn with_nodes(nodes: Vec<FsNode>) -> Self {
        let service = Self::default();
        service.inner.borrow_mut().nodes = nodes;
        service
    }

    /// Inserts or replaces a record.
    pub fn upsert(&self, node: FsNode) {
        let mut inner = self.inner.borrow_mut();
        match inner.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => *existing = node,
            None => inner.nodes.push(node),
        }
    }

    /// Removes a record by id.
    pub fn remove(&self, id: &str) {
        self.inner.borrow_mut().nodes.retain(|n| n.id != id);
    }

    /// Simulates a backend outage: every call fails while `offline` is set.
    pub fn set_offline(&self, offline: bool) {
        self.inner.borrow_mut().offline = offline;
    }

    /// Returns the recorded `move_node` calls in call order.
    pub fn recorded_moves(&self) -> Vec<FsMoveRequest> {
        self.inner.borrow().moves.clone()
    }

    /// Returns a record by id.
    pub fn node(&self, id: &str) -> Option<FsNode> {
        self.inner.borrow().nodes.iter().find(|n| n.id == id).cloned()
    }
}

impl FilesystemService for MemoryFilesystemService {
    fn load_children<'a>(
        &'a self,
        parent_id: Option<&'a str>,
    ) -> FsFuture<'a, Result<Vec<FsNode>, String>> {
        Box::pin(async move {
            let inner = self.inner.borrow();
            if inner.offline {
                return Err("filesystem offline".to_string());
            }
            Ok(inner
                .nodes
                .iter()
                .filter(|n| n.parent_id.as_deref() == parent_id)
                .cloned()
                .collect())
        })
    }

    fn move_node<'a>(
        &'a self,
        kind: FsNodeKind,
        id: &'a str,
        target_folder_id: Option<&'a str>,
    ) -> FsFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let mut inner = self.inner.borrow_mut();
            inner.moves.push(FsMoveRequest {
                kind,
                id: id.to_string(),
                target_folder_id: target_folder_id.map(str::to_string),
            });
            if inner.offline {
                return Err("filesystem offline".to_string());
            }
            if let Some(target) = target_folder_id {
                let target_is_folder = inner
                    .nodes
                    .iter()
                    .any(|n| n.id == target && n.kind == FsNodeKind::Folder);
                if !target_is_folder {
                    return Err(format!("target folder `{target}` not found"));
                }
            }
            let node = inner
                .nodes
                .iter_mut()
                .find(|n| n.id == id && n.kind == kind)
                .ok_or_else(|| format!("{kind} `{id}` not found"))?;
            node.parent_id = target_folder_id.map(str::to_string);
            Ok(())
        })
    }
}
