use crate::error::{ProcessingError, Result};
use crate::models::decimal::{Decimal1, DecimalLookupTable};
use crate::models::StationStats;
use crate::processors::arena::{AllocationMode, KeyArena, KeyRef};
use crate::readers::RecordScanner;
use crate::utils::constants::{DEFAULT_TABLE_SLOTS, MAX_LOAD_DENOMINATOR, MAX_LOAD_NUMERATOR};
use rustc_hash::FxHasher;
use std::hash::Hasher;

const EMPTY: u32 = u32::MAX;
const MIN_SLOTS: usize = 16;

struct Entry {
    hash: u64,
    key: KeyRef,
    stats: StationStats,
}

/// Open-addressed station name → [`StationStats`] table.
///
/// Slots hold indices into a dense entry list, so iteration follows first
/// insertion order and growing only rehashes the slot array. Names live in
/// the table's own [`KeyArena`]; nothing borrows from the scanned input.
pub struct StationTable {
    slots: Vec<u32>,
    entries: Vec<Entry>,
    arena: KeyArena,
    mode: AllocationMode,
}

#[inline]
fn hash_name(name: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(name);
    hasher.finish()
}

impl StationTable {
    pub fn new(mode: AllocationMode) -> Result<Self> {
        Self::with_capacity(DEFAULT_TABLE_SLOTS, mode)
    }

    /// Slot count is rounded up to a power of two. The table grows past half
    /// full, so any capacity is correct; it only affects rehash work.
    pub fn with_capacity(slots: usize, mode: AllocationMode) -> Result<Self> {
        let slots = slots
            .max(MIN_SLOTS)
            .checked_next_power_of_two()
            .ok_or_else(|| {
                ProcessingError::Capacity(format!("{} station table slots requested", slots))
            })?;

        let mut slot_vec = Vec::new();
        mode.reserve(&mut slot_vec, slots, "station table slots")?;
        slot_vec.resize(slots, EMPTY);

        let mut entries = Vec::new();
        mode.reserve(&mut entries, Self::max_entries(slots), "station table entries")?;

        Ok(Self {
            slots: slot_vec,
            entries,
            arena: KeyArena::new(mode)?,
            mode,
        })
    }

    fn max_entries(slots: usize) -> usize {
        slots / MAX_LOAD_DENOMINATOR * MAX_LOAD_NUMERATOR
    }

    /// Fold one partition's bytes into a fresh table.
    pub fn aggregate_partition(
        data: &[u8],
        lookup: &DecimalLookupTable,
        slots: usize,
        mode: AllocationMode,
    ) -> Result<Self> {
        let mut table = Self::with_capacity(slots, mode)?;
        table.aggregate(RecordScanner::new(data, lookup))?;
        Ok(table)
    }

    pub fn aggregate<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a [u8], Decimal1)>,
    {
        for (name, value) in records {
            self.record(name, value)?;
        }
        Ok(())
    }

    /// Add one observation for `name`.
    #[inline]
    pub fn record(&mut self, name: &[u8], value: Decimal1) -> Result<()> {
        let hash = hash_name(name);
        match self.find(name, hash) {
            Ok(index) => {
                self.entries[index].stats.add(value);
                Ok(())
            }
            Err(slot) => self.insert(slot, name, hash, StationStats::new(value)),
        }
    }

    /// Combine every station of `other` into this table.
    ///
    /// Associative and commutative: the resulting (name, stats) set does not
    /// depend on merge order.
    pub fn merge_from(&mut self, other: StationTable) -> Result<()> {
        for entry in &other.entries {
            let name = other.arena.get(entry.key);
            match self.find(name, entry.hash) {
                Ok(index) => self.entries[index].stats.combine(&entry.stats),
                Err(slot) => self.insert(slot, name, entry.hash, entry.stats)?,
            }
        }
        Ok(())
    }

    /// `Ok(entry index)` when present, otherwise `Err(empty slot)` where the
    /// name belongs.
    #[inline]
    fn find(&self, name: &[u8], hash: u64) -> std::result::Result<usize, usize> {
        let mask = self.slots.len() - 1;
        let mut slot = hash as usize & mask;
        loop {
            let index = self.slots[slot];
            if index == EMPTY {
                return Err(slot);
            }
            let entry = &self.entries[index as usize];
            if entry.hash == hash && self.arena.get(entry.key) == name {
                return Ok(index as usize);
            }
            slot = (slot + 1) & mask;
        }
    }

    fn insert(&mut self, slot: usize, name: &[u8], hash: u64, stats: StationStats) -> Result<()> {
        let mut slot = slot;
        if self.entries.len() + 1 > Self::max_entries(self.slots.len()) {
            self.grow()?;
            slot = self.empty_slot_for(hash);
        }

        let index = u32::try_from(self.entries.len())
            .ok()
            .filter(|&i| i != EMPTY)
            .ok_or_else(|| ProcessingError::Capacity("too many distinct stations".to_string()))?;

        if self.entries.len() == self.entries.capacity() {
            let additional = self.entries.len().max(MIN_SLOTS);
            self.mode
                .reserve(&mut self.entries, additional, "station table entries")?;
        }

        let key = self.arena.alloc(name)?;
        self.entries.push(Entry { hash, key, stats });
        self.slots[slot] = index;
        Ok(())
    }

    fn empty_slot_for(&self, hash: u64) -> usize {
        let mask = self.slots.len() - 1;
        let mut slot = hash as usize & mask;
        while self.slots[slot] != EMPTY {
            slot = (slot + 1) & mask;
        }
        slot
    }

    fn grow(&mut self) -> Result<()> {
        let new_len = self.slots.len().checked_mul(2).ok_or_else(|| {
            ProcessingError::Capacity("station table slot count overflow".to_string())
        })?;

        let mut slots = Vec::new();
        self.mode.reserve(&mut slots, new_len, "station table slots")?;
        slots.resize(new_len, EMPTY);
        self.slots = slots;

        for (index, entry) in self.entries.iter().enumerate() {
            let slot = self.empty_slot_for(entry.hash);
            self.slots[slot] = index as u32;
        }
        Ok(())
    }

    pub fn get(&self, name: &[u8]) -> Option<&StationStats> {
        self.find(name, hash_name(name))
            .ok()
            .map(|index| &self.entries[index].stats)
    }

    /// Stations in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &StationStats)> + '_ {
        self.entries
            .iter()
            .map(move |entry| (self.arena.get(entry.key), &entry.stats))
    }

    /// Stations ordered by name bytes.
    pub fn sorted(&self) -> Vec<(&[u8], &StationStats)> {
        let mut stations: Vec<_> = self.iter().collect();
        stations.sort_unstable_by(|a, b| a.0.cmp(b.0));
        stations
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Total observations across all stations.
    pub fn total_records(&self) -> u64 {
        self.entries.iter().map(|entry| entry.stats.count).sum()
    }

    pub fn arena(&self) -> &KeyArena {
        &self.arena
    }
}
