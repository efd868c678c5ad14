// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory mirror of a remote tree.
//!
//! `Vfs<T>` is an ordered tree keyed by path segment. The sync engine uses
//! `Vfs<Signature>` as its model of what the agent's filesystem contains:
//! every update the engine sends to the agent is applied here predictively
//! at send time, so the next diff runs against the intended post-state.
//!
//! The tree is owned by a single actor and never shared.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
struct Node<T> {
    /// Value recorded at this path. Interior nodes created implicitly
    /// while inserting a deeper path have no value until one is set.
    value: Option<T>,
    children: BTreeMap<String, Node<T>>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Node { value: None, children: BTreeMap::new() }
    }
}

/// Ordered path-keyed tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Vfs<T> {
    root: Node<T>,
}

impl<T> Default for Vfs<T> {
    fn default() -> Self {
        Vfs { root: Node::default() }
    }
}

impl<T> Vfs<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally set or clear the node at `path`.
    ///
    /// `Some(value)` replaces whatever is there, creating implicit parent
    /// nodes as needed. `None` removes the node and its whole subtree.
    /// An empty path addresses the root value.
    pub fn update(&mut self, path: &Path, value: Option<T>) {
        match value {
            Some(v) => {
                let mut node = &mut self.root;
                for seg in segments(path) {
                    node = node.children.entry(seg).or_default();
                }
                node.value = Some(v);
            }
            None => self.remove(path),
        }
    }

    fn remove(&mut self, path: &Path) {
        let mut segs: Vec<String> = segments(path).collect();
        let Some(last) = segs.pop() else {
            self.root = Node::default();
            return;
        };
        let mut node = &mut self.root;
        for seg in &segs {
            match node.children.get_mut(seg) {
                Some(n) => node = n,
                None => return,
            }
        }
        node.children.remove(&last);
    }

    /// Value recorded at `path`, if any.
    pub fn get(&self, path: &Path) -> Option<&T> {
        let mut node = &self.root;
        for seg in segments(path) {
            node = node.children.get(&seg)?;
        }
        node.value.as_ref()
    }

    /// Depth-first traversal in path order, yielding every valued node.
    pub fn iter(&self) -> impl Iterator<Item = (PathBuf, &T)> {
        let mut out = Vec::new();
        collect(&self.root, PathBuf::new(), &mut out);
        out.into_iter()
    }

    /// True when no value is recorded anywhere in the tree.
    pub fn is_empty(&self) -> bool {
        self.root.value.is_none() && self.iter().next().is_none()
    }
}

fn collect<'a, T>(node: &'a Node<T>, prefix: PathBuf, out: &mut Vec<(PathBuf, &'a T)>) {
    if let Some(v) = &node.value {
        out.push((prefix.clone(), v));
    }
    for (seg, child) in &node.children {
        collect(child, prefix.join(seg), out);
    }
}

/// Normal path segments of `path`; `.` and root components are dropped.
fn segments(path: &Path) -> impl Iterator<Item = String> + '_ {
    path.components().filter_map(|c| match c {
        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        _ => None,
    })
}

#[cfg(test)]
#[path = "vfs_tests.rs"]
mod tests;
