// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! GPU surface pool.
//!
//! A pool owns a fixed array of decoder surfaces. The decode thread hands
//! them out with [`SurfacePool::acquire`]; the returned [`BufferLease`] may
//! travel to any thread and returns its slot when dropped.
//!
//! Each slot keeps its state in one atomic word: the top bit marks the slot
//! in use, the remaining bits hold the age stamped at the last assignment.
//! A lease only clears the in-use bit if the word still carries its own
//! stamp, so a lease whose slot was silently reused under exhaustion
//! releases nothing.

use crate::{
    platform::{DecoderService, VideoDesc},
    Error,
};
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// Hard upper bound on surfaces per pool.
pub const MAX_SURFACES: usize = 64;

const IN_USE: u64 = 1 << 63;
const AGE_MASK: u64 = !IN_USE;

/// Age of a slot that was never assigned.
const UNUSED_AGE: u64 = AGE_MASK;

struct Slot<S> {
    surface: S,
    state: AtomicU64,
}

struct Shared<S> {
    slots: Box<[Slot<S>]>,
}

impl<S> Shared<S> {
    /// Clears the in-use bit if the slot still carries `stamp`.
    fn release_stamp(&self, index: usize, stamp: u64) -> bool {
        self.slots[index]
            .state
            .compare_exchange(stamp | IN_USE, stamp, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }
}

/// Fixed-size array of decoder surfaces with age-based reuse.
pub struct SurfacePool<S> {
    shared: Arc<Shared<S>>,
    next_age: u64,
    desc: VideoDesc,
}

impl<S: Clone + Send + Sync + 'static> SurfacePool<S> {
    /// Allocates `count` surfaces from `service` and clears each to black.
    ///
    /// A surface that fails to clear is still usable and only logged.
    pub fn create<D>(service: &D, desc: VideoDesc, count: usize) -> Result<Self, Error>
    where
        D: DecoderService<Surface = S>,
    {
        check_count(count)?;

        let surfaces = service.create_surfaces(&desc, count).map_err(|err| {
            log::error!("Failed to create {} video surfaces: {}", count, err);
            Error::AllocationFailed("video surfaces")
        })?;

        if surfaces.len() != count {
            log::error!(
                "Requested {} video surfaces, platform returned {}",
                count,
                surfaces.len()
            );
            return Err(Error::AllocationFailed("video surfaces"));
        }

        for (index, surface) in surfaces.iter().enumerate() {
            if let Err(err) = service.clear_surface(surface) {
                log::warn!("Failed to clear surface {}: {}", index, err);
            }
        }

        log::debug!(
            "Created {} surfaces of {}x{} {}",
            count,
            desc.width,
            desc.height,
            desc.format
        );

        Self::from_surfaces(surfaces, desc)
    }

    /// Wraps already allocated surfaces; between 1 and [`MAX_SURFACES`]
    /// are accepted.
    pub fn from_surfaces(surfaces: Vec<S>, desc: VideoDesc) -> Result<Self, Error> {
        check_count(surfaces.len())?;
        let slots = surfaces
            .into_iter()
            .map(|surface| Slot {
                surface,
                state: AtomicU64::new(UNUSED_AGE),
            })
            .collect();
        Ok(SurfacePool {
            shared: Arc::new(Shared { slots }),
            next_age: 0,
            desc,
        })
    }

    /// Hands out the least recently assigned free slot, or the least
    /// recently assigned slot overall when every slot is leased.
    ///
    /// `keep_alive` travels with the lease and is dropped with it.
    pub fn acquire<K>(&mut self, keep_alive: K) -> BufferLease<S, K> {
        // Pools hold at least one slot, so slot 0 seeds the oldest search
        let mut free: Option<(usize, u64)> = None;
        let mut oldest = (0, u64::MAX);

        for (index, slot) in self.shared.slots.iter().enumerate() {
            let state = slot.state.load(Ordering::Acquire);
            let age = state & AGE_MASK;
            if state & IN_USE == 0 && free.map_or(true, |(_, best)| age < best) {
                free = Some((index, age));
            }
            if age < oldest.1 {
                oldest = (index, age);
            }
        }

        let index = match free {
            Some((index, _)) => index,
            None => {
                log::warn!(
                    "All {} surfaces in use, reusing surface {}",
                    self.shared.slots.len(),
                    oldest.0
                );
                oldest.0
            }
        };

        let stamp = self.next_age & AGE_MASK;
        self.next_age = self.next_age.wrapping_add(1);
        self.shared.slots[index]
            .state
            .store(stamp | IN_USE, Ordering::Release);

        log::trace!("Leased surface {} age {}", index, stamp);
        BufferLease {
            shared: self.shared.clone(),
            index,
            stamp,
            keep_alive,
        }
    }

    /// Clones of every surface handle, in slot order.
    pub fn surfaces(&self) -> Vec<S> {
        self.shared.slots.iter().map(|slot| slot.surface.clone()).collect()
    }
}

fn check_count(count: usize) -> Result<(), Error> {
    if count == 0 || count > MAX_SURFACES {
        return Err(Error::InvalidArgument("surface count must be 1..=64"));
    }
    Ok(())
}

impl<S> SurfacePool<S> {
    /// Marks a slot free regardless of which lease holds it. Repeated calls
    /// and out of range indices do nothing.
    pub fn release(&self, index: usize) {
        if let Some(slot) = self.shared.slots.get(index) {
            slot.state.fetch_and(AGE_MASK, Ordering::AcqRel);
        }
    }

    pub fn len(&self) -> usize {
        self.shared.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.slots.is_empty()
    }

    pub fn desc(&self) -> &VideoDesc {
        &self.desc
    }

    pub fn in_use(&self, index: usize) -> bool {
        self.shared
            .slots
            .get(index)
            .is_some_and(|slot| slot.state.load(Ordering::Acquire) & IN_USE != 0)
    }

    /// Age stamped at the last assignment, `None` if never assigned.
    pub fn age(&self, index: usize) -> Option<u64> {
        let slot = self.shared.slots.get(index)?;
        let age = slot.state.load(Ordering::Acquire) & AGE_MASK;
        (age != UNUSED_AGE).then_some(age)
    }

    pub fn leased(&self) -> usize {
        (0..self.len()).filter(|&index| self.in_use(index)).count()
    }
}

impl<S> fmt::Debug for SurfacePool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfacePool")
            .field("len", &self.len())
            .field("leased", &self.leased())
            .field("desc", &self.desc)
            .finish()
    }
}

/// One frame's claim on a pool slot.
///
/// Dropping the lease returns the slot exactly once. The lease keeps the
/// pool's surfaces alive, so it stays valid after the pool is replaced.
pub struct BufferLease<S, K = ()> {
    shared: Arc<Shared<S>>,
    index: usize,
    stamp: u64,
    keep_alive: K,
}

impl<S, K> BufferLease<S, K> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn surface(&self) -> &S {
        &self.shared.slots[self.index].surface
    }

    pub fn keep_alive(&self) -> &K {
        &self.keep_alive
    }

    /// False once the slot was handed to another lease under exhaustion or
    /// force released.
    pub fn is_current(&self) -> bool {
        self.shared.slots[self.index].state.load(Ordering::Acquire) == self.stamp | IN_USE
    }
}

impl<S, K> Drop for BufferLease<S, K> {
    fn drop(&mut self) {
        if !self.shared.release_stamp(self.index, self.stamp) {
            log::trace!("Surface {} was reassigned, nothing to release", self.index);
        }
    }
}

impl<S, K> fmt::Debug for BufferLease<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferLease")
            .field("index", &self.index)
            .field("age", &self.stamp)
            .finish()
    }
}
