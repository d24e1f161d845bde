//! Generational handle tables.
//!
//! Objects handed across the C boundary never leave Rust: the caller gets an
//! opaque `u64` and the object stays in a table slot. A handle packs the
//! slot index and the slot's generation:
//!
//! ```text
//!  63            32 31             0
//! +----------------+----------------+
//! |   generation   |   index + 1    |
//! +----------------+----------------+
//! ```
//!
//! Releasing a slot keeps its generation until the slot is reused, at which
//! point the generation is bumped. That is enough to tell the three misuse
//! cases apart:
//!
//! - same generation, slot empty: the handle was released (double release or
//!   use after release, depending on the operation);
//! - older generation: released and the slot since reused, same diagnosis;
//! - zero, out-of-range index, or a generation the slot never had: never
//!   issued.

use assetchain_protocol::error::{TxError, TxResult};

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// A table of live objects addressed by generational handles.
pub struct HandleTable<T> {
    what: &'static str,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

enum Lookup {
    Live(usize),
    Released,
    Unknown,
}

fn pack(index: u32, generation: u32) -> u64 {
    (u64::from(generation) << 32) | (u64::from(index) + 1)
}

fn unpack(handle: u64) -> Option<(usize, u32)> {
    let low = (handle & 0xFFFF_FFFF) as u32;
    let generation = (handle >> 32) as u32;
    if low == 0 || generation == 0 {
        return None;
    }
    Some(((low - 1) as usize, generation))
}

impl<T> HandleTable<T> {
    /// Creates an empty table. `what` names the object kind in errors.
    pub fn new(what: &'static str) -> Self {
        Self {
            what,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores `value` and returns its handle. Never returns 0.
    pub fn insert(&mut self, value: T) -> u64 {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1).max(1);
            slot.value = Some(value);
            return pack(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        pack(index, 1)
    }

    fn lookup(&self, handle: u64) -> Lookup {
        let Some((index, generation)) = unpack(handle) else {
            return Lookup::Unknown;
        };
        let Some(slot) = self.slots.get(index) else {
            return Lookup::Unknown;
        };
        if generation > slot.generation {
            Lookup::Unknown
        } else if generation < slot.generation || slot.value.is_none() {
            Lookup::Released
        } else {
            Lookup::Live(index)
        }
    }

    fn use_error(&self, handle: u64, released: bool) -> TxError {
        let what = format!("{} handle {:#x}", self.what, handle);
        if released {
            TxError::UseAfterRelease { what }
        } else {
            TxError::InvalidHandle { what }
        }
    }

    /// Borrows the object behind `handle`.
    pub fn get(&self, handle: u64) -> TxResult<&T> {
        match self.lookup(handle) {
            Lookup::Live(index) => self.slots[index]
                .value
                .as_ref()
                .ok_or_else(|| self.use_error(handle, true)),
            Lookup::Released => Err(self.use_error(handle, true)),
            Lookup::Unknown => Err(self.use_error(handle, false)),
        }
    }

    /// Mutably borrows the object behind `handle`.
    pub fn get_mut(&mut self, handle: u64) -> TxResult<&mut T> {
        match self.lookup(handle) {
            Lookup::Live(index) => {
                let what = self.what;
                self.slots[index]
                    .value
                    .as_mut()
                    .ok_or_else(|| TxError::UseAfterRelease {
                        what: format!("{} handle {:#x}", what, handle),
                    })
            }
            Lookup::Released => Err(self.use_error(handle, true)),
            Lookup::Unknown => Err(self.use_error(handle, false)),
        }
    }

    /// Takes the object out of the table, invalidating `handle`.
    pub fn remove(&mut self, handle: u64) -> TxResult<T> {
        let what = format!("{} handle {:#x}", self.what, handle);
        match self.lookup(handle) {
            Lookup::Live(index) => {
                let value = self.slots[index]
                    .value
                    .take()
                    .ok_or_else(|| TxError::DoubleRelease { what: what.clone() })?;
                self.free.push(index as u32);
                Ok(value)
            }
            Lookup::Released => Err(TxError::DoubleRelease { what }),
            Lookup::Unknown => Err(TxError::InvalidHandle { what }),
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut table = HandleTable::new("thing");
        let h = table.insert(7u32);
        assert_ne!(h, 0);
        assert_eq!(*table.get(h).unwrap(), 7);
        *table.get_mut(h).unwrap() = 8;
        assert_eq!(table.remove(h).unwrap(), 8);
        assert!(table.is_empty());
    }

    #[test]
    fn double_release_is_detected() {
        let mut table = HandleTable::new("thing");
        let h = table.insert(1u32);
        table.remove(h).unwrap();
        assert!(matches!(
            table.remove(h),
            Err(TxError::DoubleRelease { .. })
        ));
    }

    #[test]
    fn use_after_release_is_detected() {
        let mut table = HandleTable::new("thing");
        let h = table.insert(1u32);
        table.remove(h).unwrap();
        assert!(matches!(table.get(h), Err(TxError::UseAfterRelease { .. })));
        assert!(matches!(
            table.get_mut(h),
            Err(TxError::UseAfterRelease { .. })
        ));
    }

    #[test]
    fn stale_handle_stays_stale_after_slot_reuse() {
        let mut table = HandleTable::new("thing");
        let old = table.insert(1u32);
        table.remove(old).unwrap();
        let new = table.insert(2u32);
        assert_ne!(old, new);

        assert!(matches!(table.get(old), Err(TxError::UseAfterRelease { .. })));
        assert!(matches!(
            table.remove(old),
            Err(TxError::DoubleRelease { .. })
        ));
        assert_eq!(*table.get(new).unwrap(), 2);
    }

    #[test]
    fn unknown_handles_are_invalid() {
        let mut table: HandleTable<u32> = HandleTable::new("thing");
        assert!(matches!(table.get(0), Err(TxError::InvalidHandle { .. })));
        assert!(matches!(
            table.remove(12345),
            Err(TxError::InvalidHandle { .. })
        ));

        let h = table.insert(1);
        // Same index, a generation that was never issued.
        let forged = h + (5 << 32);
        assert!(matches!(table.get(forged), Err(TxError::InvalidHandle { .. })));
    }

    #[test]
    fn error_names_the_object_kind() {
        let table: HandleTable<u32> = HandleTable::new("fee schedule");
        let err = table.get(99).unwrap_err();
        assert!(err.to_string().contains("fee schedule"));
    }
}
