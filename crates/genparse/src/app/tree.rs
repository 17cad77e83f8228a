//! Render a flat list of file paths as an indented directory tree.

use tracing::warn;

use crate::domain::model::{ConflictResolution, GeneratedFile, TreeConflict};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const CONTINUATION: &str = "│   ";
const LAST_CONTINUATION: &str = "    ";

/// A node in the file tree. Directory and file kinds never share a name
/// within one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Directory {
        name: String,
        children: Vec<TreeNode>,
    },
    File {
        name: String,
    },
}

impl TreeNode {
    fn directory(name: &str) -> Self {
        TreeNode::Directory {
            name: name.to_owned(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::Directory { name, .. } | TreeNode::File { name } => name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }

    fn is_dir_named(&self, segment: &str) -> bool {
        self.is_dir() && self.name() == segment
    }

    fn is_file_named(&self, segment: &str) -> bool {
        !self.is_dir() && self.name() == segment
    }

    fn children_mut(&mut self) -> Option<&mut Vec<TreeNode>> {
        match self {
            TreeNode::Directory { children, .. } => Some(children),
            TreeNode::File { .. } => None,
        }
    }
}

/// Nested view of file paths, keeping first-seen order at every level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    roots: Vec<TreeNode>,
    conflicts: Vec<TreeConflict>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files(files: &[GeneratedFile]) -> Self {
        Self::from_paths(files.iter().map(|file| file.path.as_str()))
    }

    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tree = Self::new();
        for path in paths {
            tree.insert(path);
        }
        tree
    }

    /// Insert one file path. Empty segments are skipped.
    ///
    /// A file leaf that later needs children becomes a directory in place; a
    /// file whose name is already taken by a directory is dropped. Both cases
    /// are recorded in [`FileTree::conflicts`].
    pub fn insert(&mut self, path: &str) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };

        let conflicts = &mut self.conflicts;
        let mut level = &mut self.roots;
        for (depth, segment) in parents.iter().enumerate() {
            let index = match level.iter().position(|node| node.is_dir_named(segment)) {
                Some(index) => index,
                None => match level.iter().position(|node| node.is_file_named(segment)) {
                    Some(index) => {
                        level[index] = TreeNode::directory(segment);
                        level.retain(|node| !node.is_file_named(segment));
                        let conflict = conflict(path, &segments[..=depth], ConflictResolution::LeafPromoted);
                        warn!(path, segment = %conflict.segment, "file path reused as directory");
                        conflicts.push(conflict);
                        index
                    }
                    None => {
                        level.push(TreeNode::directory(segment));
                        level.len() - 1
                    }
                },
            };
            level = match level[index].children_mut() {
                Some(children) => children,
                None => return,
            };
        }

        if level.iter().any(|node| node.is_dir_named(leaf)) {
            let conflict = conflict(path, &segments, ConflictResolution::LeafDropped);
            warn!(path, "file path collides with a directory, leaf dropped");
            conflicts.push(conflict);
            return;
        }
        level.push(TreeNode::File {
            name: (*leaf).to_owned(),
        });
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn conflicts(&self) -> &[TreeConflict] {
        &self.conflicts
    }

    pub fn into_conflicts(self) -> Vec<TreeConflict> {
        self.conflicts
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Render depth-first, one line per node, without a root line.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        render_level(&self.roots, "", &mut lines);
        lines.join("\n")
    }
}

/// Render the tree for `files`.
pub fn build_tree(files: &[GeneratedFile]) -> String {
    FileTree::from_files(files).render()
}

fn render_level(nodes: &[TreeNode], prefix: &str, lines: &mut Vec<String>) {
    for (index, node) in nodes.iter().enumerate() {
        let last = index + 1 == nodes.len();
        let (branch, continuation) = if last {
            (LAST_BRANCH, LAST_CONTINUATION)
        } else {
            (BRANCH, CONTINUATION)
        };
        lines.push(format!("{prefix}{branch}{}", node.name()));

        if let TreeNode::Directory { children, .. } = node {
            render_level(children, &format!("{prefix}{continuation}"), lines);
        }
    }
}

fn conflict(path: &str, segments: &[&str], resolution: ConflictResolution) -> TreeConflict {
    TreeConflict {
        path: path.to_owned(),
        segment: segments.join("/"),
        resolution,
    }
}
