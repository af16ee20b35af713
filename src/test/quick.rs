use quickcheck::{Arbitrary, Gen};

/// An enum for the various kinds of "things" to do to
/// a tree in a quicktest.
#[derive(Clone, Debug)]
pub(crate) enum Op<T> {
    /// Add the value to the data structure
    Add(T),
    /// Remove the value from the data structure
    Remove(T),
    /// Empty the data structure
    Clear,
    /// Compare iterators
    Iter,
}

impl<T> Arbitrary for Op<T>
where
    T: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation. Clearing is rare so
    /// trees get a chance to grow.
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 0, 0, 1, 1, 2, 3, 3]).unwrap() {
            0 => Op::Add(T::arbitrary(g)),
            1 => Op::Remove(T::arbitrary(g)),
            2 => Op::Clear,
            3 => Op::Iter,
            _ => unreachable!(),
        }
    }
}
