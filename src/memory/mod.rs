//! Dense, index-keyed storage used as the forest's arena.
//!
//! Values live in contiguous columns addressed by small integer handles.
//! Handles are never exposed in the public forest API; callers address nodes
//! through their own ids, which the forest resolves to handles.
pub mod map;

pub use map::DenseMap;

/// A small integer handle into a dense column.
pub trait EntityIndex: Copy + Eq {
    /// Creates a handle from a raw position.
    ///
    /// # Panics
    ///
    /// Panics when `index` does not fit into the handle's backing type.
    fn new(index: usize) -> Self {
        match Self::try_new(index) {
            Some(entity) => entity,
            None => panic!("index {index} exceeds the range of the entity type"),
        }
    }

    fn try_new(index: usize) -> Option<Self>;
    fn index(self) -> usize;
}

/// Implements [`EntityIndex`] for a newtype around an unsigned integer.
///
/// Based on [`cranelift_entity`'s `entity_impl!`](https://docs.rs/cranelift-entity/0.89.2/cranelift_entity/macro.entity_impl.html)
macro_rules! entity_impl {
    ($entity:ident, $backing:ty) => {
        impl $crate::memory::EntityIndex for $entity {
            #[inline(always)]
            fn try_new(ix: usize) -> Option<Self> {
                <$backing>::try_from(ix).ok().map($entity)
            }

            #[inline(always)]
            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}
pub(crate) use entity_impl;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Small(u8);
    entity_impl!(Small, u8);

    #[test]
    fn newtype_range() {
        assert_eq!(Small::try_new(255), Some(Small(255)));
        assert_eq!(Small::try_new(256), None);
        assert_eq!(Small::new(7).index(), 7);
    }

    #[test]
    #[should_panic(expected = "exceeds the range")]
    fn newtype_overflow_panics() {
        Small::new(300);
    }
}
