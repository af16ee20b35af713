use ordered_tree::{Cursor, Error, Tree};

use std::collections::{BTreeSet, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a `BTreeSet`.
/// This way we can ensure that after a random smattering of adds
/// and removes we have the same set of values in both.
fn do_ops<T>(ops: &[Op<T>], bst: &mut Tree<T>, set: &mut BTreeSet<T>)
where
    T: Ord + Clone,
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
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = Tree::new();
    let mut set = BTreeSet::new();

    do_ops(&ops, &mut tree, &mut set);
    tree.size() == set.len() && tree.iter().eq(set.iter())
}

#[quickcheck]
fn inorder_is_strictly_ascending(xs: Vec<i32>) -> bool {
    let tree: Tree<_> = xs.into_iter().collect();
    let values: Vec<_> = tree.iter().collect();

    values.windows(2).all(|w| w[0] < w[1]) && values.len() == tree.size()
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();

    xs.iter().all(|x| tree.contains(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.find(x).is_none())
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: Tree<_> = xs.iter().copied().collect();
    for delete in &deletes {
        tree.remove(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have added the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| !tree.contains(x)) && still_present.iter().all(|x| tree.contains(x))
}

#[quickcheck]
fn adding_duplicates_changes_nothing(xs: Vec<u8>) -> bool {
    let mut tree: Tree<_> = xs.iter().copied().collect();
    let size = tree.size();
    let shape: Vec<_> = tree.preorder().copied().collect();

    tree.extend(xs.iter().copied());

    tree.size() == size && tree.preorder().copied().eq(shape)
}

#[quickcheck]
fn clone_has_same_shape(xs: Vec<i16>) -> bool {
    let tree: Tree<_> = xs.into_iter().collect();
    let copy = tree.clone();

    copy.size() == tree.size()
        && copy.preorder().eq(tree.preorder())
        && copy.postorder().eq(tree.postorder())
}

#[quickcheck]
fn clear_forgets_everything(xs: Vec<i8>) -> bool {
    let mut tree: Tree<_> = xs.iter().copied().collect();
    tree.clear();

    tree.size() == 0 && xs.iter().all(|x| tree.find(x).is_none())
}

#[test]
fn exhausted_cursor_signals_invalid_state() {
    let tree: Tree<_> = [5, 3, 8].into_iter().collect();
    let mut cursor = tree.preorder();
    while !cursor.is_exhausted() {
        cursor.advance();
    }

    assert_eq!(cursor.get(), Err(Error::InvalidState));
}
