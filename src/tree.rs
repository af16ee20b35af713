//! An unbalanced BST storing each value at most once. Nodes are linked with raw pointers and
//! never know their parent; every mutation recomputes the path it needs with [`Tree::locate`].
//!
//! # Examples
//!
//! ```
//! use ordered_tree::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert!(!tree.contains(&1));
//!
//! tree.add(1);
//! assert!(tree.contains(&1));
//!
//! // Adding a value twice is a no-op.
//! tree.add(1);
//! assert_eq!(tree.size(), 1);
//!
//! // Removing reports whether anything was removed.
//! assert!(tree.remove(&1));
//! assert!(!tree.remove(&1));
//! assert!(tree.is_empty());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::cursor::{Cursor, InOrder, PostOrder, PreOrder};

/// A Binary Search Tree without any balancing. Inserting values in sorted order degenerates it
/// into a chain, which every operation here (including `Drop`) handles without recursing.
pub struct Tree<T> {
    root: Link<T>,
    size: usize,
    _owns: PhantomData<Box<Node<T>>>,
}

// SAFETY: A `Tree` owns its nodes exactly like a `Box` owns its contents, nothing is shared with
// other trees.
unsafe impl<T: Send> Send for Tree<T> {}
// SAFETY: `&Tree` only hands out shared references to values.
unsafe impl<T: Sync> Sync for Tree<T> {}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Clone for Tree<T>
where
    T: Clone + Ord,
{
    /// Re-adds every value in pre-order, which reproduces the shape of `self` exactly.
    fn clone(&self) -> Self {
        self.preorder().cloned().collect()
    }
}

impl<T> fmt::Debug for Tree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for Tree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for Tree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = InOrder<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inorder()
    }
}

impl<T> Tree<T> {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            root: Link(None),
            size: 0,
            _owns: PhantomData,
        }
    }

    /// The number of values in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The root node, if any. Useful for inspecting the shape of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::Tree;
    ///
    /// let tree: Tree<_> = [10, 20, 30].into_iter().collect();
    ///
    /// // Sorted input gives a chain leaning right.
    /// let root = tree.root().unwrap();
    /// assert_eq!(root.value(), &10);
    /// assert!(root.left().is_none());
    /// assert_eq!(root.right().and_then(|n| n.right()).map(|n| *n.value()), Some(30));
    /// ```
    pub fn root(&self) -> Option<&Node<T>> {
        // SAFETY: The root is owned by `self` and can't be mutated while `&self` is borrowed.
        unsafe { self.root.node() }
    }

    /// Inserts `value` unless an equal value is already stored, in which case `value` is dropped
    /// and the tree is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::Tree;
    ///
    /// let mut tree = Tree::new();
    ///
    /// tree.add(2);
    /// tree.add(1);
    /// tree.add(2);
    ///
    /// assert_eq!(tree.size(), 2);
    /// assert_eq!(tree.iter().collect::<Vec<_>>(), [&1, &2]);
    /// ```
    pub fn add(&mut self, value: T)
    where
        T: Ord,
    {
        let mut slot = &mut self.root;
        while let Some(mut ptr) = slot.0 {
            // SAFETY: Every link reachable from the root points at a live node owned by this tree
            // and `&mut self` rules out any other reference into it.
            let node = unsafe { ptr.as_mut() };
            slot = match value.cmp(&node.value) {
                Ordering::Less => &mut node.left,
                Ordering::Equal => return,
                Ordering::Greater => &mut node.right,
            };
        }
        *slot = Link::from_box(Node::new_boxed(value));
        self.size += 1;
    }

    /// Potentially finds the node holding a value equal to `value`. If no node holds it, `None`
    /// is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::Tree;
    ///
    /// let tree: Tree<_> = [2, 1, 3].into_iter().collect();
    ///
    /// assert_eq!(tree.find(&3).map(|n| *n.value()), Some(3));
    /// assert!(tree.find(&42).is_none());
    /// ```
    pub fn find(&self, value: &T) -> Option<&Node<T>>
    where
        T: Ord,
    {
        // SAFETY: `locate` only returns links into this tree, which `&self` keeps alive and
        // unmodified.
        unsafe { self.locate(value).target.node() }
    }

    /// Whether a value equal to `value` is stored.
    pub fn contains(&self, value: &T) -> bool
    where
        T: Ord,
    {
        self.find(value).is_some()
    }

    /// Removes the node holding `value`. Returns `false` if there was no such node.
    ///
    /// When the node has two children it is replaced by its in-order predecessor. The
    /// predecessor node itself is moved, not copied, so it stays at the same address.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::Tree;
    ///
    /// let mut tree: Tree<_> = [50, 30, 70, 20, 40, 60, 80].into_iter().collect();
    ///
    /// assert!(tree.remove(&50));
    /// assert_eq!(tree.root().map(|n| *n.value()), Some(40));
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [20, 30, 40, 60, 70, 80]);
    ///
    /// assert!(!tree.remove(&50));
    /// ```
    pub fn remove(&mut self, value: &T) -> bool
    where
        T: Ord,
    {
        self.take(value).is_some()
    }

    /// Like [`Tree::remove`] but hands back the removed value.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::Tree;
    ///
    /// let mut tree: Tree<_> = ["b", "a"].into_iter().collect();
    ///
    /// assert_eq!(tree.take(&"a"), Some("a"));
    /// assert_eq!(tree.take(&"a"), None);
    /// ```
    pub fn take(&mut self, value: &T) -> Option<T>
    where
        T: Ord,
    {
        let located = self.locate(value);
        let target = located.target.0?;

        let kind = located.kind();
        tracing::trace!(?kind, direction = ?located.direction, "removing node");
        match kind {
            NodeKind::NoChildren => self.unlink_leaf(located),
            NodeKind::OneChild => self.unlink_single(located),
            NodeKind::TwoChildren => {
                let replacement = self.splice_predecessor(located);
                if cfg!(debug_assertions) {
                    // SAFETY: The replacement is a live node of this tree.
                    if let Some(node) = unsafe { replacement.node() } {
                        node.check_local_order();
                    }
                }
            }
        }
        self.size -= 1;

        // SAFETY: The target was unlinked above so nothing in the tree points at it anymore.
        Some(unsafe { Node::free(target) })
    }

    /// Removes every value. Nodes are freed children first by walking them in post-order with an
    /// explicit stack, so even a degenerate tree never recurses.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::Tree;
    ///
    /// let mut tree: Tree<_> = (0..100).collect();
    /// tree.clear();
    ///
    /// assert_eq!(tree.size(), 0);
    /// assert!(tree.find(&42).is_none());
    /// ```
    pub fn clear(&mut self) {
        let root = self.root.take();
        let size = std::mem::replace(&mut self.size, 0);
        if root.0.is_none() {
            return;
        }
        tracing::debug!(size, "clearing tree");

        // SAFETY: `root` was detached above so the nodes below it are only reachable through
        // this cursor.
        let mut drain = unsafe { PostOrder::from_link(root) };
        let mut freed = 0;
        while let Some(node) = drain.current_ptr() {
            // The cursor never looks at a node again once it has moved past it, and post-order
            // guarantees both children were moved past (and freed) already.
            drain.advance();
            // SAFETY: `node` was allocated by `Node::new_boxed`, is unreachable from the tree and
            // is no longer referenced by the cursor.
            drop(unsafe { Node::free(node) });
            freed += 1;
        }

        if cfg!(debug_assertions) {
            assert_eq!(freed, size);
        }
    }

    /// Iterates over the values in ascending order. This is the same cursor as
    /// [`Tree::inorder`].
    pub fn iter(&self) -> InOrder<'_, T> {
        self.inorder()
    }

    /// A cursor over the values in ascending order (left, node, right).
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::{Cursor, Tree};
    ///
    /// let tree: Tree<_> = [2, 1, 3].into_iter().collect();
    /// let mut cursor = tree.inorder();
    ///
    /// assert_eq!(cursor.get(), Ok(&1));
    /// cursor.advance();
    /// assert_eq!(cursor.get(), Ok(&2));
    /// ```
    pub fn inorder(&self) -> InOrder<'_, T> {
        InOrder::new(self.root())
    }

    /// A cursor visiting each node before its subtrees (node, left, right).
    pub fn preorder(&self) -> PreOrder<'_, T> {
        PreOrder::new(self.root())
    }

    /// A cursor visiting each node after its subtrees (left, right, node).
    pub fn postorder(&self) -> PostOrder<'_, T> {
        PostOrder::new(self.root())
    }

    /// Finds the node holding `value` along with the parent slot pointing at it.
    fn locate(&self, value: &T) -> Locator<T>
    where
        T: Ord,
    {
        let mut parent = Link(None);
        let mut current = self.root;
        let mut direction = Direction::Root;

        // SAFETY: Links reachable from the root point at live nodes of this tree.
        while let Some(node) = unsafe { current.node() } {
            let next = match value.cmp(&node.value) {
                Ordering::Less => Direction::Left,
                Ordering::Equal => {
                    return Locator {
                        parent,
                        target: current,
                        direction,
                    }
                }
                Ordering::Greater => Direction::Right,
            };
            parent = current;
            direction = next;
            current = node.child(next);
        }

        Locator::missing()
    }

    /// Points the slot described by `located` (the parent's child link, or the root) at
    /// `replacement`.
    fn relink(&mut self, located: Locator<T>, replacement: Link<T>) {
        match (located.direction, located.parent.0) {
            (Direction::Root, _) => self.root = replacement,
            // SAFETY: The parent is a live node of this tree and `&mut self` rules out any other
            // reference to it.
            (Direction::Left, Some(mut parent)) => unsafe { parent.as_mut().left = replacement },
            (Direction::Right, Some(mut parent)) => unsafe { parent.as_mut().right = replacement },
            (_, None) => panic!("Child locator without a parent"),
        }
    }

    fn unlink_leaf(&mut self, located: Locator<T>) {
        self.relink(located, Link(None));
    }

    fn unlink_single(&mut self, located: Locator<T>) {
        // SAFETY: The target is a live node of this tree.
        let target = unsafe { located.target.node() }.expect("Unlinking implies a target");
        let child = if target.left.0.is_some() {
            target.left
        } else {
            target.right
        };
        self.relink(located, child);
    }

    /// Replaces the two-child node at `located` with its in-order predecessor. The predecessor
    /// is detached from its own spot first and then takes over the target's children and slot.
    ///
    /// # Diagram
    ///
    /// ```text
    ///       target               pred
    ///       /    \              /    \
    ///      a      z    ->      a      z
    ///     / \                 / \
    ///    x   pred            x   w
    ///        /
    ///       w
    /// ```
    fn splice_predecessor(&mut self, located: Locator<T>) -> Link<T> {
        let mut target = located.target.0.expect("Splicing implies a target");
        // SAFETY: The target is a live node of this tree. The reference is dropped before any
        // link is rewritten.
        let left = unsafe { target.as_ref() }.left;
        let predecessor = Self::locate_max(left, located.target, Direction::Left);

        let kind = predecessor.kind();
        tracing::trace!(?kind, direction = ?predecessor.direction, "splicing predecessor");
        match kind {
            NodeKind::NoChildren => self.unlink_leaf(predecessor),
            NodeKind::OneChild => self.unlink_single(predecessor),
            NodeKind::TwoChildren => panic!("In-order predecessor has two children"),
        }

        let mut pred = predecessor.target.0.expect("Two children => predecessor");
        // SAFETY: Both are distinct live nodes and no other references to them exist here. Taking
        // the target's links after unlinking picks up the adjusted left link when the predecessor
        // was the target's direct left child.
        unsafe {
            let target = target.as_mut();
            let pred = pred.as_mut();
            pred.left = target.left.take();
            pred.right = target.right.take();
        }
        self.relink(located, predecessor.target);
        predecessor.target
    }

    /// Walks right from `subtree` until a node without a right child, returning where it was
    /// found.
    fn locate_max(subtree: Link<T>, parent: Link<T>, direction: Direction) -> Locator<T> {
        let mut located = Locator {
            parent,
            target: subtree,
            direction,
        };

        // SAFETY: `subtree` belongs to a live tree that isn't modified during the walk.
        while let Some(node) = unsafe { located.target.node() } {
            if node.right.0.is_none() {
                break;
            }
            located = Locator {
                parent: located.target,
                target: node.right,
                direction: Direction::Right,
            };
        }

        located
    }
}

pub(crate) struct Link<T>(pub(crate) Option<NonNull<Node<T>>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}
impl<T> Copy for Link<T> {}

impl<T> Link<T> {
    fn from_box(node: Box<Node<T>>) -> Self {
        Self(Some(NonNull::from(Box::leak(node))))
    }

    fn take(&mut self) -> Self {
        Self(self.0.take())
    }

    /// # Safety
    ///
    /// If the link is not empty it must point at a live node which is not mutated for `'a`.
    pub(crate) unsafe fn node<'a>(self) -> Option<&'a Node<T>> {
        self.0.map(|ptr| &*ptr.as_ptr())
    }
}

/// Which of its parent's slots a located node sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
    /// The node is the root and has no parent.
    Root,
}

/// A node's classification by child count, which decides how it is unlinked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeKind {
    NoChildren,
    OneChild,
    TwoChildren,
}

/// Result of [`Tree::locate`]: the node holding a value, its parent, and which of the parent's
/// links leads to it. Only valid until the next mutation.
struct Locator<T> {
    parent: Link<T>,
    target: Link<T>,
    direction: Direction,
}

impl<T> Clone for Locator<T> {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent,
            target: self.target,
            direction: self.direction,
        }
    }
}
impl<T> Copy for Locator<T> {}

impl<T> Locator<T> {
    fn missing() -> Self {
        Self {
            parent: Link(None),
            target: Link(None),
            direction: Direction::Root,
        }
    }

    fn kind(&self) -> NodeKind {
        // SAFETY: Locators are only used before the tree they came from is modified.
        let node = unsafe { self.target.node() }.expect("Classifying implies a target");
        match (node.left.0, node.right.0) {
            (None, None) => NodeKind::NoChildren,
            (Some(_), Some(_)) => NodeKind::TwoChildren,
            _ => NodeKind::OneChild,
        }
    }
}

/// A node of a [`Tree`]. It holds one value and up to two children: everything in the left
/// subtree is smaller, everything in the right subtree is larger.
pub struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

// SAFETY: Shared access to a node only gives out shared access to its value and subtrees.
unsafe impl<T: Sync> Sync for Node<T> {}

impl<T> fmt::Debug for Node<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("left", &self.left().map(Node::value))
            .field("right", &self.right().map(Node::value))
            .finish()
    }
}

impl<T> Node<T> {
    fn new_boxed(value: T) -> Box<Self> {
        Box::new(Self {
            value,
            left: Link(None),
            right: Link(None),
        })
    }

    /// The value stored in this node.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The root of the subtree holding smaller values.
    pub fn left(&self) -> Option<&Self> {
        // SAFETY: Children live as long as their parent and can't change while it's borrowed.
        unsafe { self.left.node() }
    }

    /// The root of the subtree holding larger values.
    pub fn right(&self) -> Option<&Self> {
        // SAFETY: See `Node::left`.
        unsafe { self.right.node() }
    }

    /// Asserts the ordering invariant between this node and its direct children.
    fn check_local_order(&self)
    where
        T: Ord,
    {
        if let Some(left) = self.left() {
            assert!(left.value < self.value);
        }
        if let Some(right) = self.right() {
            assert!(self.value < right.value);
        }
    }

    fn child(&self, direction: Direction) -> Link<T> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Root => panic!("The root is nobody's child"),
        }
    }

    /// Frees a node and returns its value. `Node` has no drop glue for its children, so this
    /// never touches the subtrees it linked to.
    ///
    /// # Safety
    ///
    /// `node` must come from `Node::new_boxed`, be unreachable from any tree, and never be used
    /// again.
    unsafe fn free(node: NonNull<Self>) -> T {
        let Node { value, .. } = *Box::from_raw(node.as_ptr());
        value
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and a `BTreeSet`.
    /// This way we can ensure that after a random smattering of adds
    /// and removes we have the same values in both.
    fn do_ops<T>(ops: &[Op<T>], bst: &mut Tree<T>, set: &mut BTreeSet<T>)
    where
        T: Ord + Clone + fmt::Debug,
    {
        for op in ops {
            match op {
                Op::Add(v) => {
                    bst.add(v.clone());
                    set.insert(v.clone());
                }
                Op::Remove(v) => {
                    assert_eq!(bst.remove(v), set.remove(v));
                }
                Op::Clear => {
                    bst.clear();
                    set.clear();
                }
                Op::Iter => {
                    assert!(bst.iter().eq(set.iter()));
                }
            }
            assert_eq!(bst.size(), set.len());
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut set = BTreeSet::new();

            do_ops(&ops, &mut tree, &mut set);
            tree.iter().eq(set.iter())
        }
    }

    quickcheck::quickcheck! {
        fn every_order_visits_every_node(xs: Vec<i16>) -> bool {
            let tree: Tree<_> = xs.iter().copied().collect();
            let expected: Vec<_> = tree.iter().copied().collect();

            let mut pre: Vec<_> = tree.preorder().copied().collect();
            let mut post: Vec<_> = tree.postorder().copied().collect();
            pre.sort_unstable();
            post.sort_unstable();

            pre == expected && post == expected && expected.len() == tree.size()
        }
    }

    quickcheck::quickcheck! {
        fn removal_keeps_relative_order(xs: Vec<i8>, victim: i8) -> bool {
            let mut tree: Tree<_> = xs.iter().copied().collect();
            let before: Vec<_> = tree.iter().copied().filter(|x| *x != victim).collect();
            let size = tree.size();
            let removed = tree.remove(&victim);

            let expected_size = if removed { size - 1 } else { size };
            let after: Vec<_> = tree.iter().copied().collect();
            after == before
                && removed == xs.contains(&victim)
                && !tree.contains(&victim)
                && tree.size() == expected_size
        }
    }
}
