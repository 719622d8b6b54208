use std::{
    collections::TryReserveError,
    iter::FusedIterator,
    marker::PhantomData,
    ops::{Index, IndexMut},
    slice,
};

use super::EntityIndex;

/// A push-only column of values addressed by dense handles.
///
/// Handles are handed out in order by [`DenseMap::push`], so a handle is
/// valid exactly when its index is below [`DenseMap::len`]. Several columns
/// filled in lockstep share the same handle space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseMap<K, V> {
    values: Vec<V>,
    phantom: PhantomData<K>,
}

impl<K, V> DenseMap<K, V> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            phantom: PhantomData,
        }
    }

    /// Returns the number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
    }

    /// Tries to reserve room for `additional` more values, failing instead
    /// of panicking when the request overflows or cannot be allocated.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.values.try_reserve(additional)
    }
}

impl<K: EntityIndex, V> DenseMap<K, V> {
    /// Appends a value and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics when the handle space of `K` is exhausted.
    pub fn push(&mut self, value: V) -> K {
        let key = K::new(self.values.len());
        self.values.push(value);
        key
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.values.get(key.index())
    }

    /// Iterates over handles and values in push order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.values.iter().enumerate(),
            phantom: PhantomData,
        }
    }
}

impl<K, V> Default for DenseMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityIndex, V> Index<K> for DenseMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &Self::Output {
        &self.values[key.index()]
    }
}

impl<K: EntityIndex, V> IndexMut<K> for DenseMap<K, V> {
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        &mut self.values[key.index()]
    }
}

pub struct Iter<'a, K, V> {
    inner: std::iter::Enumerate<slice::Iter<'a, V>>,
    phantom: PhantomData<K>,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            phantom: PhantomData,
        }
    }
}

impl<'a, K: EntityIndex, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(index, value)| (K::new(index), value))
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: EntityIndex, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K: EntityIndex, V> FusedIterator for Iter<'a, K, V> {}
