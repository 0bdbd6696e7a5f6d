//! Amortized-doubling storage.
//!
//! Every growable sequence of the crate (`code`, `lines`, the constant pool)
//! tracks its logical `capacity` next to its length and grows on the same rule:
//! `capacity < MIN_CAPACITY ? MIN_CAPACITY : capacity * GROWTH_FACTOR`.
//! Reservation is fallible and split from the commit so that a caller growing
//! two buffers in lockstep can reserve both before touching either.

use std::collections::TryReserveError;

use crate::{ChunkError, ChunkResult};

/// First capacity allocated by an empty buffer.
pub const MIN_CAPACITY: usize = 8;

/// Multiplier applied once the buffer is at least `MIN_CAPACITY` wide.
pub const GROWTH_FACTOR: usize = 2;

/// Next capacity step after `capacity`.
pub const fn grow_capacity(capacity: usize) -> usize {
    if capacity < MIN_CAPACITY {
        MIN_CAPACITY
    } else {
        capacity.saturating_mul(GROWTH_FACTOR)
    }
}

/// Growth counters of one buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthStats {
    /// Number of capacity steps taken.
    pub reallocations: usize,
    /// Elements moved into new storage across all steps.
    pub elements_copied: usize,
}

/// Growable sequence with an explicit capacity tracker.
#[derive(Debug, Clone)]
pub(crate) struct GrowBuf<T> {
    name: &'static str,
    items: Vec<T>,
    capacity: usize,
    stats: GrowthStats,
    #[cfg(test)]
    fail_next: bool,
}

impl<T> GrowBuf<T> {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
            capacity: 0,
            stats: GrowthStats { reallocations: 0, elements_copied: 0 },
            #[cfg(test)]
            fail_next: false,
        }
    }

    pub(crate) fn len(&self) -> usize { self.items.len() }

    pub(crate) fn capacity(&self) -> usize { self.capacity }

    pub(crate) fn stats(&self) -> GrowthStats { self.stats }

    pub(crate) fn as_slice(&self) -> &[T] { &self.items }

    /// Bounds-checked read.
    pub(crate) fn get(&self, index: usize) -> ChunkResult<&T> {
        self.items
            .get(index)
            .ok_or_else(|| ChunkError::out_of_range(self.name, index, self.items.len()))
    }

    /// Makes room for `additional` more elements without changing the logical capacity.
    ///
    /// Returns the capacity the next writes need; pass it to [`GrowBuf::commit`].
    /// The capacity steps along `grow_capacity` until the elements fit.
    pub(crate) fn reserve(&mut self, additional: usize) -> ChunkResult<usize> {
        let len = self.items.len();
        let needed = len.saturating_add(additional);
        if needed <= self.capacity {
            return Ok(self.capacity);
        }
        let mut requested = grow_capacity(self.capacity);
        while requested < needed {
            requested = grow_capacity(requested);
        }
        if let Err(source) = self.try_reserve_exact(requested - len) {
            #[cfg(feature = "tracing")]
            tracing::warn!(buffer = self.name, requested, "capacity reservation failed");
            return Err(ChunkError::OutOfCapacity { buffer: self.name, requested, source });
        }
        Ok(requested)
    }

    #[cfg(not(test))]
    fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.items.try_reserve_exact(additional)
    }

    /// Same as `Vec::try_reserve_exact`, unless a failure was armed.
    #[cfg(test)]
    fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError> {
        if std::mem::take(&mut self.fail_next) {
            return Vec::<u8>::new().try_reserve_exact(usize::MAX);
        }
        self.items.try_reserve_exact(additional)
    }

    /// Makes the next reservation that has to grow the buffer fail.
    #[cfg(test)]
    pub(crate) fn fail_next_reservation(&mut self) { self.fail_next = true; }

    /// Records a capacity step previously reserved by [`GrowBuf::reserve`].
    pub(crate) fn commit(&mut self, capacity: usize) {
        if capacity == self.capacity {
            return;
        }
        let copied = self.items.len();
        #[cfg(feature = "tracing")]
        tracing::trace!(buffer = self.name, from = self.capacity, to = capacity, copied, "grow");
        self.stats.reallocations += 1;
        self.stats.elements_copied += copied;
        self.capacity = capacity;
    }

    /// Writes into a slot made available by `reserve` + `commit`.
    pub(crate) fn write_slot(&mut self, value: T) {
        debug_assert!(self.items.len() < self.capacity, "{} written past its capacity", self.name);
        self.items.push(value);
    }

    /// Reserve, commit and write in one step.
    pub(crate) fn push(&mut self, value: T) -> ChunkResult<usize> {
        let capacity = self.reserve(1)?;
        self.commit(capacity);
        let index = self.items.len();
        self.write_slot(value);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_steps() {
        assert_eq!(grow_capacity(0), 8);
        assert_eq!(grow_capacity(7), 8);
        assert_eq!(grow_capacity(8), 16);
        assert_eq!(grow_capacity(16), 32);
        assert_eq!(grow_capacity(usize::MAX), usize::MAX);
    }

    #[test]
    fn filling_capacity_does_not_grow() -> ChunkResult<()> {
        let mut buf = GrowBuf::new("test");
        for i in 0..MIN_CAPACITY {
            buf.push(i)?;
        }
        assert_eq!(buf.capacity(), MIN_CAPACITY);
        assert_eq!(buf.stats().reallocations, 1);
        assert_eq!(buf.stats().elements_copied, 0);

        buf.push(MIN_CAPACITY)?;
        assert_eq!(buf.capacity(), 16);
        assert_eq!(buf.stats().reallocations, 2);
        assert_eq!(buf.stats().elements_copied, MIN_CAPACITY);
        assert_eq!(buf.as_slice(), (0..=MIN_CAPACITY).collect::<Vec<_>>().as_slice());
        Ok(())
    }

    #[test]
    fn thousand_appends_copy_linear() -> ChunkResult<()> {
        let mut buf = GrowBuf::new("test");
        for i in 0..1000u32 {
            buf.push(i)?;
        }
        let stats = buf.stats();
        assert_eq!(buf.capacity(), 1024);
        // 0 -> 8 -> 16 -> ... -> 1024
        assert_eq!(stats.reallocations, 8);
        assert_eq!(stats.elements_copied, 8 + 16 + 32 + 64 + 128 + 256 + 512);
        assert!(stats.elements_copied <= 2 * 1000);
        Ok(())
    }

    #[test]
    fn reserve_without_commit_keeps_capacity() -> ChunkResult<()> {
        let mut buf: GrowBuf<u8> = GrowBuf::new("test");
        let next = buf.reserve(1)?;
        assert_eq!(next, MIN_CAPACITY);
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.stats(), GrowthStats::default());
        Ok(())
    }

    #[test]
    fn reserve_steps_until_elements_fit() -> ChunkResult<()> {
        let mut buf: GrowBuf<u8> = GrowBuf::new("test");
        for i in 0..7 {
            buf.push(i)?;
        }
        assert_eq!(buf.reserve(1)?, 8);
        assert_eq!(buf.reserve(2)?, 16);
        assert_eq!(buf.reserve(20)?, 32);
        assert_eq!(buf.capacity(), 8);
        Ok(())
    }

    #[test]
    fn armed_failure_fires_only_on_growth() -> ChunkResult<()> {
        let mut buf = GrowBuf::new("test");
        buf.push(1u8)?;
        buf.fail_next_reservation();
        buf.push(2)?;
        assert_eq!(buf.as_slice(), &[1, 2]);

        for i in 3..=8 {
            buf.push(i)?;
        }
        let stats = buf.stats();
        let err = buf.push(9);
        assert!(matches!(
            err,
            Err(ChunkError::OutOfCapacity { buffer: "test", requested: 16, .. })
        ));
        assert_eq!(buf.len(), 8);
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.stats(), stats);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        buf.push(9)?;
        assert_eq!(buf.capacity(), 16);
        Ok(())
    }

    #[test]
    fn get_out_of_range() {
        let buf: GrowBuf<u8> = GrowBuf::new("test");
        assert_eq!(buf.get(0), Err(ChunkError::out_of_range("test", 0, 0)));
    }
}
