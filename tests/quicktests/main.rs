#[macro_use]
extern crate quickcheck_macros;

use quickcheck::{Arbitrary, Gen};

mod tree;

/// An enum for the various kinds of "things" to do to
/// a tree in a quicktest.
#[derive(Clone, Debug)]
enum Op<T> {
    /// Add the value to the tree
    Add(T),
    /// Remove the value from the tree
    Remove(T),
}

impl<T> Arbitrary for Op<T>
where
    T: Arbitrary,
{
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            Op::Add(T::arbitrary(g))
        } else {
            Op::Remove(T::arbitrary(g))
        }
    }
}
