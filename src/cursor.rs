//! Forward-only cursors over a [`Tree`](crate::Tree) in the three classic depth-first orders.
//!
//! None of them recurse: each keeps its pending nodes on an explicit stack, so the memory used is
//! proportional to the height of the tree and lives on the heap. A cursor borrows the tree it
//! came from, so the tree can't be modified while the cursor is alive.
//!
//! Cursors are also [`Iterator`]s yielding the value under the cursor and then advancing.
//!
//! # Examples
//!
//! ```
//! use ordered_tree::{Cursor, Error, Tree};
//!
//! let tree: Tree<_> = [5, 3, 8].into_iter().collect();
//!
//! assert_eq!(tree.inorder().copied().collect::<Vec<_>>(), [3, 5, 8]);
//! assert_eq!(tree.preorder().copied().collect::<Vec<_>>(), [5, 3, 8]);
//! assert_eq!(tree.postorder().copied().collect::<Vec<_>>(), [3, 8, 5]);
//!
//! let mut cursor = tree.preorder();
//! while !cursor.is_exhausted() {
//!     cursor.advance();
//! }
//! assert_eq!(cursor.get(), Err(Error::InvalidState));
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::{Error, Result};
use crate::tree::{Link, Node};

type NodePtr<T> = NonNull<Node<T>>;

/// What every traversal order supports. The order itself is fixed when the cursor is created.
pub trait Cursor<'a, T: 'a> {
    /// Moves to the next node. Does nothing once the cursor is exhausted.
    fn advance(&mut self);

    /// The node under the cursor, or `None` once exhausted.
    fn node(&self) -> Option<&'a Node<T>>;

    /// The value under the cursor.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if the cursor is exhausted.
    fn get(&self) -> Result<&'a T> {
        self.node().map(Node::value).ok_or(Error::InvalidState)
    }

    /// Whether the cursor has moved past the last node.
    fn is_exhausted(&self) -> bool {
        self.node().is_none()
    }
}

/// # Safety
///
/// `ptr` must point at a node that stays alive and unmodified for `'a`.
unsafe fn deref<'a, T>(ptr: NodePtr<T>) -> &'a Node<T> {
    &*ptr.as_ptr()
}

/// Visits values in ascending order: left subtree, node, right subtree.
pub struct InOrder<'a, T> {
    current: Option<NodePtr<T>>,
    /// Nodes whose left subtree is being visited, deepest on top.
    stack: Vec<NodePtr<T>>,
    _tree: PhantomData<&'a Node<T>>,
}

impl<'a, T: 'a> InOrder<'a, T> {
    pub(crate) fn new(root: Option<&'a Node<T>>) -> Self {
        let mut cursor = Self::default();
        if let Some(root) = root {
            cursor.push_left_spine(NonNull::from(root));
        }
        cursor.settle();
        cursor
    }

    /// Makes the top of the stack current. If it has a right child, it is popped and replaced by
    /// the left spine of that child, which comes after it.
    fn settle(&mut self) {
        self.current = self.stack.last().copied();
        if let Some(next) = self.current {
            // SAFETY: See `push_left_spine`.
            if let Some(right) = unsafe { deref(next) }.right.0 {
                self.stack.pop();
                self.push_left_spine(right);
            }
        }
    }

    /// Pushes `node` and then every left child below it, ending with the smallest value of the
    /// subtree on top.
    fn push_left_spine(&mut self, mut node: NodePtr<T>) {
        self.stack.push(node);
        // SAFETY: Nodes reachable from the borrowed tree live for `'a`.
        while let Some(left) = unsafe { deref(node) }.left.0 {
            self.stack.push(left);
            node = left;
        }
    }
}

impl<'a, T: 'a> Cursor<'a, T> for InOrder<'a, T> {
    fn advance(&mut self) {
        if self.current.is_none() {
            return;
        }
        if self.stack.last() == self.current.as_ref() {
            self.stack.pop();
        }
        self.settle();
    }

    fn node(&self) -> Option<&'a Node<T>> {
        // SAFETY: See `push_left_spine`.
        self.current.map(|ptr| unsafe { deref(ptr) })
    }
}

impl<T> Default for InOrder<'_, T> {
    /// An exhausted cursor.
    fn default() -> Self {
        Self {
            current: None,
            stack: Vec::new(),
            _tree: PhantomData,
        }
    }
}

impl<T> Clone for InOrder<'_, T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current,
            stack: self.stack.clone(),
            _tree: PhantomData,
        }
    }
}

/// Visits each node before its subtrees: node, left subtree, right subtree.
pub struct PreOrder<'a, T> {
    current: Option<NodePtr<T>>,
    /// Roots of subtrees still to visit, the next one on top.
    stack: Vec<NodePtr<T>>,
    _tree: PhantomData<&'a Node<T>>,
}

impl<'a, T: 'a> PreOrder<'a, T> {
    pub(crate) fn new(root: Option<&'a Node<T>>) -> Self {
        let mut cursor = Self::default();
        cursor.current = root.map(NonNull::from);
        if let Some(root) = cursor.current {
            cursor.push_children(root);
        }
        cursor
    }

    /// Right first so the left child is popped first.
    fn push_children(&mut self, node: NodePtr<T>) {
        // SAFETY: Nodes reachable from the borrowed tree live for `'a`.
        let node = unsafe { deref(node) };
        self.stack.extend(node.right.0);
        self.stack.extend(node.left.0);
    }
}

impl<'a, T: 'a> Cursor<'a, T> for PreOrder<'a, T> {
    fn advance(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.current = self.stack.pop();
        if let Some(next) = self.current {
            self.push_children(next);
        }
    }

    fn node(&self) -> Option<&'a Node<T>> {
        // SAFETY: See `push_children`.
        self.current.map(|ptr| unsafe { deref(ptr) })
    }
}

impl<T> Default for PreOrder<'_, T> {
    /// An exhausted cursor.
    fn default() -> Self {
        Self {
            current: None,
            stack: Vec::new(),
            _tree: PhantomData,
        }
    }
}

impl<T> Clone for PreOrder<'_, T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current,
            stack: self.stack.clone(),
            _tree: PhantomData,
        }
    }
}

/// Visits each node after its subtrees: left subtree, right subtree, node.
///
/// A node with children is reached twice: once on the way down, when its children get expanded,
/// and once on the way back up, when it is emitted. The return stack tells the two apart.
pub struct PostOrder<'a, T> {
    current: Option<NodePtr<T>>,
    /// Nodes waiting to be expanded or emitted. The current node is always on top.
    stack: Vec<NodePtr<T>>,
    /// Nodes whose children have been expanded but which haven't been emitted yet.
    returns: Vec<NodePtr<T>>,
    _tree: PhantomData<&'a Node<T>>,
}

impl<'a, T: 'a> PostOrder<'a, T> {
    pub(crate) fn new(root: Option<&'a Node<T>>) -> Self {
        Self::start(root.map(NonNull::from))
    }

    /// Starts a cursor over nodes that no tree is borrowed for. Used to free nodes children
    /// first: once the cursor has advanced past a node it never reads that node again, so the
    /// caller may free it.
    ///
    /// # Safety
    ///
    /// Every node reachable from `root` must stay alive until the cursor has advanced past it.
    pub(crate) unsafe fn from_link(root: Link<T>) -> Self {
        Self::start(root.0)
    }

    pub(crate) fn current_ptr(&self) -> Option<NodePtr<T>> {
        self.current
    }

    fn start(root: Option<NodePtr<T>>) -> Self {
        let mut cursor = Self::default();
        if let Some(root) = root {
            cursor.stack.push(root);
            cursor.current = Some(cursor.descend(root));
        }
        cursor
    }

    /// Expands `node` down to its first leaf in post-order, remembering every node passed on
    /// the return stack. Returns that leaf, which is left on top of the stack.
    fn descend(&mut self, mut node: NodePtr<T>) -> NodePtr<T> {
        loop {
            // SAFETY: Nodes the cursor hasn't advanced past are alive (see `from_link`).
            let expanded = unsafe { deref(node) };
            let Some(next) = expanded.left.0.or(expanded.right.0) else {
                return node;
            };
            self.returns.push(node);
            self.stack.extend(expanded.right.0);
            self.stack.extend(expanded.left.0);
            node = next;
        }
    }
}

impl<'a, T: 'a> Cursor<'a, T> for PostOrder<'a, T> {
    fn advance(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.stack.pop();

        self.current = match self.stack.last().copied() {
            // Both subtrees are done, it's the parent's turn.
            Some(next) if self.returns.last() == Some(&next) => {
                self.returns.pop();
                Some(next)
            }
            Some(next) => Some(self.descend(next)),
            None => None,
        };
    }

    fn node(&self) -> Option<&'a Node<T>> {
        // SAFETY: See `descend`.
        self.current.map(|ptr| unsafe { deref(ptr) })
    }
}

impl<T> Default for PostOrder<'_, T> {
    /// An exhausted cursor.
    fn default() -> Self {
        Self {
            current: None,
            stack: Vec::new(),
            returns: Vec::new(),
            _tree: PhantomData,
        }
    }
}

impl<T> Clone for PostOrder<'_, T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current,
            stack: self.stack.clone(),
            returns: self.returns.clone(),
            _tree: PhantomData,
        }
    }
}

/// Implements the traits every cursor shares on top of [`Cursor`].
macro_rules! cursor_traits {
    ($($cursor:ident),*) => {$(
        impl<'a, T: 'a> Iterator for $cursor<'a, T> {
            type Item = &'a T;

            fn next(&mut self) -> Option<Self::Item> {
                let value = self.node()?.value();
                self.advance();
                Some(value)
            }
        }

        impl<'a, T: 'a> FusedIterator for $cursor<'a, T> {}

        /// Two cursors are equal when they are on the same node. All exhausted cursors are equal.
        impl<T> PartialEq for $cursor<'_, T> {
            fn eq(&self, other: &Self) -> bool {
                self.current == other.current
            }
        }

        impl<T> Eq for $cursor<'_, T> {}

        impl<'a, T> fmt::Debug for $cursor<'a, T>
        where
            T: fmt::Debug + 'a,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($cursor))
                    .field("current", &self.node().map(Node::value))
                    .field("pending", &self.stack.len())
                    .finish()
            }
        }

        // SAFETY: A cursor only reads through shared references, like `&Tree<T>`.
        unsafe impl<T: Sync> Send for $cursor<'_, T> {}
        // SAFETY: As above.
        unsafe impl<T: Sync> Sync for $cursor<'_, T> {}
    )*};
}

cursor_traits!(InOrder, PreOrder, PostOrder);
