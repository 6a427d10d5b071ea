//! This module contains the hierarchical benchmark result container
//!
//! A benchmark campaign usually explores a parameter grid (workload,
//! file system, disk count, thread count...) and produces one or more
//! metrics for every point in the grid. The natural shape for this data is
//! an unordered tree of mappings in which interior nodes are the parameter
//! values and the leaves are the measured metrics, addressed by paths such
//! as "workload.filesystem.disks.threads.iops".
//!
//! The ResultTree provided here is that container. It is deliberately
//! forgiving: reading a path that was never written reports absence rather
//! than failing, and writing to an arbitrarily deep path creates all the
//! missing intermediate levels along the way. During an incremental
//! benchmark run, partial trees are the norm rather than the exception, and
//! report-building code should not have to guard every lookup.
//!
//! There is no internal synchronization: a benchmark run is a sequential
//! script, and concurrent mutation of one tree is the caller's problem.

use std::collections::BTreeMap;
use std::collections::btree_map;


/// Build a key path from a comma-separated list of literals
///
/// Path components can be anything that converts to a Key, and do not need
/// to be homogeneous. For example, path!["ext4", 4, "iops"] designates the
/// iops metric of the 4-disk configuration of the ext4 file system.
///
#[macro_export]
macro_rules! path {
    ($($component:expr),+ $(,)*) => {
        [ $( $crate::results::Key::from($component) ),+ ]
    };
}


/// One component of a key path
///
/// Result trees are keyed by benchmark parameters, which in practice are
/// either names (file system, workload...) or numbers (disk count, thread
/// count...). Both kinds can be freely mixed inside one tree, and even
/// inside one mapping. The derived ordering is only used to make tree
/// traversal deterministic, so the fact that it sorts all integers before
/// all text is harmless.
///
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Key {
    /// Numeric parameter, e.g. a disk or thread count
    Int(i64),

    /// Textual parameter, e.g. a workload or file system name
    Text(String),
}
//
impl From<i32> for Key {
    fn from(key: i32) -> Self { Key::Int(i64::from(key)) }
}
//
impl From<i64> for Key {
    fn from(key: i64) -> Self { Key::Int(key) }
}
//
impl From<u32> for Key {
    fn from(key: u32) -> Self { Key::Int(i64::from(key)) }
}
//
impl From<usize> for Key {
    fn from(key: usize) -> Self { Key::Int(key as i64) }
}
//
impl<'a> From<&'a str> for Key {
    fn from(key: &'a str) -> Self { Key::Text(key.to_owned()) }
}
//
impl From<String> for Key {
    fn from(key: String) -> Self { Key::Text(key) }
}


/// Terminal value stored at the end of a key path
///
/// Metrics are mostly numbers, but the occasional textual annotation (say,
/// the kernel version a run was acquired on) also has its place in a result
/// tree, so we support that as well.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Integer metric, e.g. an operation count
    Int(i64),

    /// Fractional metric, e.g. a throughput or an average latency
    Float(f64),

    /// Textual annotation
    Text(String),
}
//
impl From<i32> for Value {
    fn from(value: i32) -> Self { Value::Int(i64::from(value)) }
}
//
impl From<i64> for Value {
    fn from(value: i64) -> Self { Value::Int(value) }
}
//
impl From<u32> for Value {
    fn from(value: u32) -> Self { Value::Int(i64::from(value)) }
}
//
impl From<usize> for Value {
    fn from(value: usize) -> Self { Value::Int(value as i64) }
}
//
impl From<f64> for Value {
    fn from(value: f64) -> Self { Value::Float(value) }
}
//
impl<'a> From<&'a str> for Value {
    fn from(value: &'a str) -> Self { Value::Text(value.to_owned()) }
}
//
impl From<String> for Value {
    fn from(value: String) -> Self { Value::Text(value) }
}


/// One node of a result tree
///
/// A node is either an interior mapping from keys to child nodes, or a
/// terminal value. It is never both: writing a value in the middle of an
/// existing branch replaces the branch, and writing a path through an
/// existing leaf replaces the leaf.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Interior node, mapping keys to children in sorted key order
    Branch(BTreeMap<Key, Node>),

    /// Terminal value
    Leaf(Value),
}
//
impl Node {
    /// Access the children of an interior node, or None for a leaf
    pub fn as_branch(&self) -> Option<&BTreeMap<Key, Node>> {
        match *self {
            Node::Branch(ref children) => Some(children),
            Node::Leaf(_) => None,
        }
    }

    /// Access the value of a terminal node, or None for a branch
    pub fn as_leaf(&self) -> Option<&Value> {
        match *self {
            Node::Branch(_) => None,
            Node::Leaf(ref value) => Some(value),
        }
    }

    /// Access the children of a node for writing, turning a leaf which
    /// stands in the way of a deeper write into an empty branch
    fn branch_mut(&mut self) -> &mut BTreeMap<Key, Node> {
        if let Node::Leaf(_) = *self {
            *self = Node::Branch(BTreeMap::new());
        }
        match *self {
            Node::Branch(ref mut children) => children,
            Node::Leaf(_) => unreachable!(),
        }
    }
}


/// Hierarchical container for benchmark results
pub struct ResultTree {
    /// Root of the tree (always a branch, possibly empty)
    root: Node,

    /// Length of the longest key path ever written
    ///
    /// This is a monotonic counter maintained on the write path, not a
    /// structural property: it is intentionally never recomputed by walking
    /// the tree, so overwriting a deep subtree with a shallow one does not
    /// shrink it.
    ///
    depth: usize,

    /// Descriptive labels for the semantic meaning of each tree level
    ///
    /// This is documentation for humans and plotting code. Nothing checks
    /// that the actual tree shape matches these labels.
    ///
    meta: Vec<String>,
}
//
impl ResultTree {
    /// Create an empty result tree
    pub fn new() -> Self {
        Self {
            root: Node::Branch(BTreeMap::new()),
            depth: 0,
            meta: Vec::new(),
        }
    }

    /// Create an empty result tree, tagged with a dot-separated description
    /// of its levels, e.g. "workload.filesystem.disks.threads.iops"
    pub fn with_meta(meta: &str) -> Self {
        let mut tree = Self::new();
        tree.meta = meta.split('.').map(str::to_owned).collect();
        tree
    }

    /// Read the node at a given key path
    ///
    /// Returns None when the path does not fully resolve. This is the
    /// normal way of probing a partially populated tree and is not an
    /// error. Reads never create intermediate structure: only writes do.
    ///
    /// An empty path resolves to the root branch.
    ///
    pub fn get(&self, path: &[Key]) -> Option<&Node> {
        let mut node = &self.root;
        for key in path {
            match *node {
                Node::Branch(ref children) => {
                    match children.get(key) {
                        Some(child) => node = child,
                        None => return None,
                    }
                },
                // The path tries to descend through a terminal value
                Node::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    /// Read the terminal value at a given key path
    ///
    /// Returns None when the path does not resolve, or resolves to an
    /// interior node rather than a value.
    ///
    pub fn get_value(&self, path: &[Key]) -> Option<&Value> {
        self.get(path).and_then(Node::as_leaf)
    }

    /// Write a terminal value at a given key path
    ///
    /// All path components except the last act as directories: any which
    /// does not exist yet is created on the fly, and any which currently
    /// holds a terminal value is replaced by an empty branch. The final
    /// component is overwritten unconditionally, old contents be damned.
    ///
    /// Writes never fail. The path must contain at least one key.
    ///
    pub fn set<V: Into<Value>>(&mut self, path: &[Key], value: V) {
        // Split the path into directory components and the final slot
        let (last, dirs) = path.split_last()
                               .expect("Key paths must not be empty");

        // Walk down the directory components, vivifying as needed
        let mut node = &mut self.root;
        for key in dirs {
            node = node.branch_mut()
                       .entry(key.clone())
                       .or_insert_with(|| Node::Branch(BTreeMap::new()));
        }

        // Store the value in the final slot
        node.branch_mut().insert(last.clone(), Node::Leaf(value.into()));

        // Record the deepest write ever made
        if path.len() > self.depth {
            self.depth = path.len();
        }
    }

    /// Tell how long the longest key path ever written was
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Access the per-level description labels (empty if none were given)
    pub fn meta(&self) -> &[String] {
        &self.meta
    }

    /// Snapshot the top-level keys of the tree
    pub fn keys(&self) -> Vec<&Key> {
        self.iter().collect()
    }

    /// Iterate over the top-level keys of the tree, in sorted order
    ///
    /// The iterator is finite and borrows the tree; calling this again
    /// produces a fresh iterator reflecting the current tree contents.
    ///
    pub fn iter(&self) -> btree_map::Keys<Key, Node> {
        self.root.as_branch()
                 .expect("The tree root is always a branch")
                 .keys()
    }

    /// Collect the terminal values below a given key path
    ///
    /// The subtree designated by the path is traversed depth-first, in
    /// sorted key order at every level, so the result is deterministic no
    /// matter in which order the tree was populated. When a filter key is
    /// provided, only the leaves stored under that key are retained: this
    /// answers queries like "every iops value anywhere under ext4".
    ///
    /// A path which does not resolve, or resolves to a terminal value,
    /// yields an empty collection.
    ///
    pub fn collect(&self, path: &[Key], filter: Option<&Key>) -> Vec<&Value> {
        let mut leaves = Vec::new();
        if let Some(&Node::Branch(ref children)) = self.get(path) {
            collect_leaves(children, filter, &mut leaves);
        }
        leaves
    }
}


/// Recursive part of ResultTree::collect
fn collect_leaves<'a>(children: &'a BTreeMap<Key, Node>,
                      filter: Option<&Key>,
                      leaves: &mut Vec<&'a Value>) {
    // BTreeMap iteration order is sorted key order, which is what makes the
    // overall traversal deterministic
    for (key, node) in children.iter() {
        match *node {
            Node::Branch(ref grandchildren) => {
                collect_leaves(grandchildren, filter, leaves)
            },
            Node::Leaf(ref value) => {
                if filter.map_or(true, |wanted| wanted == key) {
                    leaves.push(value);
                }
            },
        }
    }
}


/// Unit tests
#[cfg(test)]
mod tests {
    use super::{Key, Node, ResultTree, Value};

    /// Check that a freshly built tree is empty
    #[test]
    fn init_tree() {
        let tree = ResultTree::new();
        assert_eq!(tree.depth(), 0);
        assert!(tree.meta().is_empty());
        assert!(tree.keys().is_empty());
        assert_eq!(tree.iter().count(), 0);
    }

    /// Check that level descriptions are split on dots
    #[test]
    fn level_descriptions() {
        let tree = ResultTree::with_meta("workload.filesystem.disks.iops");
        assert_eq!(tree.meta(),
                   ["workload", "filesystem", "disks", "iops"]);
    }

    /// Check that a value written at a deep path reads back exactly, and
    /// that prefixes of the path resolve to the intermediate branches
    #[test]
    fn deep_write_and_read_back() {
        let mut tree = ResultTree::new();
        tree.set(&path![1, 2, 3], 4);

        // The full path resolves to the value
        assert_eq!(tree.get_value(&path![1, 2, 3]), Some(&Value::Int(4)));

        // A prefix resolves to the auto-created intermediate branch
        let prefix = tree.get(&path![1, 2]).expect("Prefix should resolve");
        let children = prefix.as_branch().expect("Prefix should be a branch");
        assert_eq!(children.len(), 1);
        assert_eq!(children.get(&Key::from(3)),
                   Some(&Node::Leaf(Value::Int(4))));

        // The depth counter recorded the three-component write
        assert_eq!(tree.depth(), 3);
    }

    /// Check that a tree can be used as a plain one-level mapping
    #[test]
    fn shallow_writes() {
        let mut tree = ResultTree::new();
        tree.set(&path![1], 1);
        tree.set(&path![2], 2);
        assert_eq!(tree.get_value(&path![2]), Some(&Value::Int(2)));
        assert_eq!(tree.get_value(&path![1]), Some(&Value::Int(1)));
        assert_eq!(tree.depth(), 1);
    }

    /// Check that reading a path that was never written reports absence
    #[test]
    fn absent_paths() {
        let tree = ResultTree::new();
        assert_eq!(tree.get(&path![1, 2, 4]), None);
        assert_eq!(tree.get_value(&path!["nope"]), None);
        assert_eq!(tree.depth(), 0);

        // Probing below an existing leaf is also absence, not an error
        let mut tree = ResultTree::new();
        tree.set(&path!["a"], 1);
        assert_eq!(tree.get(&path!["a", "b"]), None);
    }

    /// Check that writes to unrelated paths do not disturb each other
    #[test]
    fn no_cross_path_interference() {
        let mut tree = ResultTree::new();
        tree.set(&path!["ext4", 4, "iops"], 1500);
        tree.set(&path!["xfs", 4, "iops"], 1800.5);
        assert_eq!(tree.get_value(&path!["ext4", 4, "iops"]),
                   Some(&Value::Int(1500)));
        assert_eq!(tree.get_value(&path!["xfs", 4, "iops"]),
                   Some(&Value::Float(1800.5)));
    }

    /// Check that the last write to one path wins
    #[test]
    fn overwrite() {
        let mut tree = ResultTree::new();
        tree.set(&path!["a", "b"], 1);
        tree.set(&path!["a", "b"], 2);
        assert_eq!(tree.get_value(&path!["a", "b"]), Some(&Value::Int(2)));

        // Writing a shallower value through an existing branch replaces
        // the branch...
        tree.set(&path!["a"], 9);
        assert_eq!(tree.get_value(&path!["a"]), Some(&Value::Int(9)));
        assert_eq!(tree.get(&path!["a", "b"]), None);

        // ...and writing a deeper path through an existing leaf replaces
        // the leaf. Neither write fails.
        tree.set(&path!["a", "c"], 3);
        assert_eq!(tree.get_value(&path!["a", "c"]), Some(&Value::Int(3)));

        // The depth counter never shrank along the way
        assert_eq!(tree.depth(), 2);
    }

    /// Check that the depth counter tracks the longest write, in whichever
    /// order the writes happen
    #[test]
    fn depth_is_order_independent() {
        let mut deep_first = ResultTree::new();
        deep_first.set(&path![1, 2, 3, 4], 0);
        deep_first.set(&path![1], 0);
        assert_eq!(deep_first.depth(), 4);

        let mut shallow_first = ResultTree::new();
        shallow_first.set(&path![1], 0);
        shallow_first.set(&path![1, 2, 3, 4], 0);
        assert_eq!(shallow_first.depth(), 4);
    }

    /// Check that top-level key enumeration works and stays current
    #[test]
    fn top_level_keys() {
        let mut tree = ResultTree::new();
        tree.set(&path!["b", 1], 0);
        tree.set(&path!["a", 1], 0);
        assert_eq!(tree.keys(),
                   vec![&Key::from("a"), &Key::from("b")]);

        // A fresh iterator sees subsequently added keys
        tree.set(&path![7], 0);
        let keys: Vec<&Key> = tree.iter().collect();
        assert_eq!(keys,
                   vec![&Key::from(7), &Key::from("a"), &Key::from("b")]);
    }

    /// Build the two-branch tree used by the leaf collection tests
    fn collection_test_tree() -> ResultTree {
        let mut tree = ResultTree::new();
        tree.set(&path!["a", 1], 2);
        tree.set(&path!["a", 3], 4);
        tree.set(&path!["b", "b0", "m"], 5);
        tree.set(&path!["b", "b0", "n"], 10);
        tree.set(&path!["b", "b1", "m"], 15);
        tree.set(&path!["b", "b1", "n"], 20);
        tree
    }

    /// Check unfiltered leaf collection below a subtree
    #[test]
    fn collect_all_leaves() {
        let tree = collection_test_tree();

        // All leaves below "b", in sorted-key traversal order
        assert_eq!(tree.collect(&path!["b"], None),
                   vec![&Value::Int(5), &Value::Int(10),
                        &Value::Int(15), &Value::Int(20)]);

        // Narrowing the path narrows the collection
        assert_eq!(tree.collect(&path!["b", "b0"], None),
                   vec![&Value::Int(5), &Value::Int(10)]);
    }

    /// Check leaf collection with a leaf key filter
    #[test]
    fn collect_filtered_leaves() {
        let tree = collection_test_tree();
        assert_eq!(tree.collect(&path!["b"], Some(&Key::from("m"))),
                   vec![&Value::Int(5), &Value::Int(15)]);
        assert_eq!(tree.collect(&path!["b"], Some(&Key::from("q"))),
                   Vec::<&Value>::new());
    }

    /// Check that collecting below a missing or terminal path yields
    /// nothing rather than failing
    #[test]
    fn collect_degenerate_paths() {
        let tree = collection_test_tree();
        assert!(tree.collect(&path!["nonexistent"], None).is_empty());
        assert!(tree.collect(&path!["a", 1], None).is_empty());
    }

    /// Check that repeated collections return identical results
    #[test]
    fn collect_is_deterministic() {
        let tree = collection_test_tree();
        let first = tree.collect(&path!["b"], None);
        for _ in 0..10 {
            assert_eq!(tree.collect(&path!["b"], None), first);
        }
    }

    /// Check that an empty path collects every leaf in the tree
    #[test]
    fn collect_from_root() {
        let tree = collection_test_tree();
        assert_eq!(tree.collect(&[], None).len(), 6);
    }
}
