//! An ordered set backed by a plain, unbalanced Binary Search Tree (BST), with cursors for
//! in-order, pre-order, and post-order traversal.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored values. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a value and
//! sometimes has child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching takes `O(height)`. This tree never rebalances, so adding values
//! in sorted order produces a chain whose height is the number of values.
//! Nothing here recurses on the height of the tree though: searches loop,
//! traversals and `Drop` keep explicit stacks on the heap.
//!
//! # Examples
//!
//! ```
//! use ordered_tree::Tree;
//!
//! let mut tree: Tree<_> = [50, 30, 70, 20, 40, 60, 80].into_iter().collect();
//!
//! assert!(tree.remove(&50));
//! assert!(!tree.contains(&50));
//! assert_eq!(tree.size(), 6);
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [20, 30, 40, 60, 70, 80]);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod cursor;
pub mod error;
pub mod tree;

#[cfg(test)]
mod test;

pub use cursor::{Cursor, InOrder, PostOrder, PreOrder};
pub use error::{Error, Result};
pub use tree::{Node, Tree};
