//! Discovery Tree: an ordered, mutable tree of URL strings recording the
//! order and nesting in which the crawl discovered each URL.
//!
//! `add_at` and `render` both take a single `Mutex` for their duration, so
//! inserts and renders serialize against each other without needing a
//! dedicated actor task.

use std::sync::Mutex;

/// Opaque handle to a tree node, returned by `add_at` and later used as
/// the insertion point for deeper descendants. Callers must not assume
/// anything about its internal representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

struct Node {
    url: String,
    children: Vec<NodeId>,
}

struct Inner {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

#[derive(Default)]
pub struct DiscoveryTree {
    inner: Mutex<Inner>,
}

impl Default for Inner {
    fn default() -> Self {
        Inner {
            nodes: Vec::new(),
            root: None,
        }
    }
}

impl DiscoveryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url` under `parent` (or as the root, if `parent` is
    /// `None`) and returns a handle to the new node. Passing `None` is
    /// only meaningful for the first call on a fresh tree: later calls
    /// with `None` would create an unreachable second root, which no
    /// caller in this crate does — engines build a fresh tree per
    /// `start()` instead of ever re-rooting one in place.
    pub fn add_at(&self, parent: Option<NodeId>, url: impl Into<String>) -> NodeId {
        let mut inner = self.inner.lock().expect("tree mutex poisoned");
        let id = NodeId(inner.nodes.len());
        inner.nodes.push(Node {
            url: url.into(),
            children: Vec::new(),
        });
        match parent {
            None => {
                inner.root.get_or_insert(id);
            }
            Some(p) => inner.nodes[p.0].children.push(id),
        }
        id
    }

    /// Discards every node, leaving the tree as if freshly constructed.
    /// Used by `Engine::start()` so a restarted crawl renders only its
    /// own results.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("tree mutex poisoned");
        inner.nodes.clear();
        inner.root = None;
    }

    /// Renders the tree as a human-readable, box-drawn string. Produces a
    /// consistent snapshot: the whole tree is read under one lock
    /// acquisition, so concurrent inserts never tear a render.
    pub fn render(&self) -> String {
        let inner = self.inner.lock().expect("tree mutex poisoned");
        let mut out = String::new();
        if let Some(root) = inner.root {
            render_node(&inner.nodes, root, "", true, true, &mut out);
        }
        out
    }
}

fn render_node(nodes: &[Node], id: NodeId, prefix: &str, is_root: bool, is_last: bool, out: &mut String) {
    let node = &nodes[id.0];
    if is_root {
        out.push_str(&node.url);
    } else {
        out.push_str(prefix);
        out.push_str(if is_last { "└── " } else { "├── " });
        out.push_str(&node.url);
    }
    out.push('\n');

    let child_prefix = if is_root {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    let last_index = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate() {
        render_node(nodes, *child, &child_prefix, false, i == last_index, out);
    }
}

