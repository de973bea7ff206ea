//! Run-scoped index of managed remote items
//!
//! The [`Index`] records every remote folder and file that the current run
//! found or created. It answers two questions cheaply:
//!
//! - "which ancestor of this path do we already know?" ([`Index::get_path`]),
//!   so the sync engine only asks Drive about folders it has not seen yet;
//! - "did this run touch that remote ID?" ([`Index::contains`]), which is
//!   how reconciliation decides an item is unmanaged.
//!
//! Items live in an arena and refer to their parent by handle, so the tree
//! has no ownership cycles. The index is append-only: nothing is removed or
//! renamed once registered, and it is dropped at the end of the run.

use std::collections::HashMap;

use tracing::trace;

use super::errors::IndexError;
use super::newtypes::{validate_segment, ItemPath, RemoteId};

/// Position of an item in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Handle(usize);

/// Whether an indexed item is a folder or a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    File,
}

#[derive(Debug)]
enum Node {
    Folder {
        entry: Entry,
        children: HashMap<String, Handle>,
    },
    File {
        entry: Entry,
    },
}

#[derive(Debug)]
struct Entry {
    name: String,
    id: RemoteId,
    parent: Option<Handle>,
}

impl Node {
    fn entry(&self) -> &Entry {
        match self {
            Node::Folder { entry, .. } | Node::File { entry } => entry,
        }
    }

    fn children(&self) -> Option<&HashMap<String, Handle>> {
        match self {
            Node::Folder { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }
}

/// In-memory tree of the remote items managed by one run
#[derive(Debug, Default)]
pub struct Index {
    nodes: Vec<Node>,
    roots: HashMap<String, Handle>,
    ids: HashMap<RemoteId, Handle>,
}

impl Index {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a folder under `parent_id`, or as a root when `parent_id` is `None`
    ///
    /// # Errors
    /// Returns an [`IndexError`] if the parent is unknown or is a file, the
    /// ID is already indexed, or the parent already holds an item by that name.
    pub fn add_folder(
        &mut self,
        name: &str,
        id: RemoteId,
        parent_id: Option<&RemoteId>,
    ) -> Result<ItemRef<'_>, IndexError> {
        self.add_item(name, id, parent_id, ItemKind::Folder)
    }

    /// Register a file under `parent_id`, or as a root when `parent_id` is `None`
    ///
    /// # Errors
    /// Same conditions as [`Index::add_folder`].
    pub fn add_file(
        &mut self,
        name: &str,
        id: RemoteId,
        parent_id: Option<&RemoteId>,
    ) -> Result<ItemRef<'_>, IndexError> {
        self.add_item(name, id, parent_id, ItemKind::File)
    }

    fn add_item(
        &mut self,
        name: &str,
        id: RemoteId,
        parent_id: Option<&RemoteId>,
        kind: ItemKind,
    ) -> Result<ItemRef<'_>, IndexError> {
        validate_segment(name)?;
        if self.ids.contains_key(&id) {
            return Err(IndexError::DuplicateId(id));
        }

        let parent = match parent_id {
            None => {
                if self.roots.contains_key(name) {
                    return Err(IndexError::NameTaken(name.to_string()));
                }
                None
            }
            Some(parent_id) => {
                let handle = *self
                    .ids
                    .get(parent_id)
                    .ok_or_else(|| IndexError::ParentNotFound(parent_id.clone()))?;
                let children = self.nodes[handle.0]
                    .children()
                    .ok_or_else(|| IndexError::ParentNotFolder(parent_id.clone()))?;
                if children.contains_key(name) {
                    let taken = self.item(handle).path().join(name)?;
                    return Err(IndexError::NameTaken(taken.to_string()));
                }
                Some(handle)
            }
        };

        let handle = Handle(self.nodes.len());
        let entry = Entry {
            name: name.to_string(),
            id: id.clone(),
            parent,
        };
        self.nodes.push(match kind {
            ItemKind::Folder => Node::Folder {
                entry,
                children: HashMap::new(),
            },
            ItemKind::File => Node::File { entry },
        });

        match parent {
            None => {
                self.roots.insert(name.to_string(), handle);
            }
            Some(parent) => {
                if let Node::Folder { children, .. } = &mut self.nodes[parent.0] {
                    children.insert(name.to_string(), handle);
                }
            }
        }
        self.ids.insert(id, handle);

        let item = self.item(handle);
        trace!(path = %item.path(), id = %item.id(), ?kind, "Indexed item");
        Ok(item)
    }

    /// Longest known ancestor of `segments`
    ///
    /// Follows the segments from the roots through folder children while
    /// they match and returns the deepest item reached. Returns `None` when
    /// the first segment is not a known root. Running out of segments or of
    /// tree is not an error.
    pub fn get_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<ItemRef<'_>> {
        let mut parts = segments.iter();
        let first = parts.next()?;
        let mut cursor = *self.roots.get(first.as_ref())?;

        for part in parts {
            let next = self.nodes[cursor.0]
                .children()
                .and_then(|children| children.get(part.as_ref()));
            match next {
                Some(&child) => cursor = child,
                None => break,
            }
        }

        Some(self.item(cursor))
    }

    /// Exact lookup by remote ID
    ///
    /// # Errors
    /// Returns [`IndexError::NotFound`] if the ID was never registered.
    pub fn get_item(&self, id: &RemoteId) -> Result<ItemRef<'_>, IndexError> {
        self.ids
            .get(id)
            .map(|&handle| self.item(handle))
            .ok_or_else(|| IndexError::NotFound(id.clone()))
    }

    /// Returns true if this run registered `id`
    #[must_use]
    pub fn contains(&self, id: &RemoteId) -> bool {
        self.ids.contains_key(id)
    }

    /// Every indexed folder, in registration order
    ///
    /// Each call starts a fresh iteration.
    pub fn folders(&self) -> impl Iterator<Item = ItemRef<'_>> + '_ {
        self.items().filter(ItemRef::is_folder)
    }

    /// Every indexed item, in registration order
    pub fn items(&self) -> impl Iterator<Item = ItemRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| self.item(Handle(i)))
    }

    /// Number of indexed items
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing has been indexed yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn item(&self, handle: Handle) -> ItemRef<'_> {
        ItemRef {
            index: self,
            handle,
        }
    }
}

/// Borrowed view of one indexed item
#[derive(Clone, Copy)]
pub struct ItemRef<'a> {
    index: &'a Index,
    handle: Handle,
}

impl<'a> ItemRef<'a> {
    fn node(&self) -> &'a Node {
        &self.index.nodes[self.handle.0]
    }

    /// The item's own name
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.node().entry().name
    }

    /// The item's remote ID
    #[must_use]
    pub fn id(&self) -> &'a RemoteId {
        &self.node().entry().id
    }

    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self.node() {
            Node::Folder { .. } => ItemKind::Folder,
            Node::File { .. } => ItemKind::File,
        }
    }

    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind() == ItemKind::Folder
    }

    /// The owning folder, or `None` for a root
    #[must_use]
    pub fn parent(&self) -> Option<ItemRef<'a>> {
        self.node().entry().parent.map(|handle| self.index.item(handle))
    }

    /// Structural path: the parent's path plus this item's name
    #[must_use]
    pub fn path(&self) -> ItemPath {
        let mut segments = vec![self.name().to_string()];
        let mut cursor = self.parent();
        while let Some(item) = cursor {
            segments.push(item.name().to_string());
            cursor = item.parent();
        }
        segments.reverse();
        ItemPath::from_validated(segments)
    }

    /// Direct child by name (always `None` for files)
    #[must_use]
    pub fn child(&self, name: &str) -> Option<ItemRef<'a>> {
        self.node()
            .children()
            .and_then(|children| children.get(name))
            .map(|&handle| self.index.item(handle))
    }

    /// Direct children, in no particular order (empty for files)
    pub fn children(&self) -> impl Iterator<Item = ItemRef<'a>> + 'a {
        let index = self.index;
        self.node()
            .children()
            .into_iter()
            .flat_map(|children| children.values())
            .map(move |&handle| index.item(handle))
    }
}

impl std::fmt::Debug for ItemRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemRef")
            .field("id", self.id())
            .field("path", &self.path().to_string())
            .field("kind", &self.kind())
            .finish()
    }
}
