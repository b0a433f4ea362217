use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DEFAULT_ARENA_CHUNK, HEAP_HINT, HUGE_PAGES_HINT, HUGE_PAGE_SIZE};
use memmap2::MmapMut;

/// Where aggregation storage comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationMode {
    /// Regular heap allocation, failures reported through `try_reserve`.
    #[default]
    Heap,
    /// Anonymous huge-page mappings (Linux `MAP_HUGETLB`). Never falls back to
    /// the heap when the kernel refuses.
    HugePages,
}

impl AllocationMode {
    pub fn hint(&self) -> &'static str {
        match self {
            AllocationMode::Heap => HEAP_HINT,
            AllocationMode::HugePages => HUGE_PAGES_HINT,
        }
    }

    /// Reserve exactly `additional` more elements, surfacing failure.
    pub fn reserve<T>(&self, vec: &mut Vec<T>, additional: usize, what: &'static str) -> Result<()> {
        vec.try_reserve_exact(additional).map_err(|e| {
            ProcessingError::allocation(
                what,
                additional.saturating_mul(std::mem::size_of::<T>()),
                e,
                self.hint(),
            )
        })
    }
}

enum Region {
    Heap(Vec<u8>),
    Mapped(MmapMut),
}

impl Region {
    fn allocate(bytes: usize, mode: AllocationMode) -> Result<Self> {
        match mode {
            AllocationMode::Heap => {
                let mut buf = Vec::new();
                mode.reserve(&mut buf, bytes, "key arena")?;
                buf.resize(bytes, 0);
                Ok(Region::Heap(buf))
            }
            AllocationMode::HugePages => Self::allocate_huge(bytes),
        }
    }

    #[cfg(target_os = "linux")]
    fn allocate_huge(bytes: usize) -> Result<Self> {
        let bytes = bytes.div_ceil(HUGE_PAGE_SIZE) * HUGE_PAGE_SIZE;
        // 2^21 = 2MB pages
        memmap2::MmapOptions::new()
            .len(bytes)
            .huge(Some(21))
            .map_anon()
            .map(Region::Mapped)
            .map_err(|e| ProcessingError::allocation("key arena", bytes, e, HUGE_PAGES_HINT))
    }

    #[cfg(not(target_os = "linux"))]
    fn allocate_huge(bytes: usize) -> Result<Self> {
        Err(ProcessingError::allocation(
            "key arena",
            bytes,
            "huge pages are only supported on Linux",
            HUGE_PAGES_HINT,
        ))
    }

    fn as_slice(&self) -> &[u8] {
        match self {
            Region::Heap(buf) => buf.as_slice(),
            Region::Mapped(map) => &map[..],
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Region::Heap(buf) => buf.as_mut_slice(),
            Region::Mapped(map) => &mut map[..],
        }
    }
}

struct Chunk {
    region: Region,
    used: usize,
}

impl Chunk {
    fn capacity(&self) -> usize {
        self.region.as_slice().len()
    }

    fn free(&self) -> usize {
        self.capacity() - self.used
    }
}

/// Handle to bytes stored in a [`KeyArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRef {
    chunk: u32,
    offset: u32,
    len: u32,
}

impl KeyRef {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump allocator for station names. Bytes are never freed individually; the
/// whole arena goes away with its table.
pub struct KeyArena {
    chunks: Vec<Chunk>,
    chunk_size: usize,
    mode: AllocationMode,
}

impl KeyArena {
    pub fn new(mode: AllocationMode) -> Result<Self> {
        Self::with_chunk_size(DEFAULT_ARENA_CHUNK, mode)
    }

    /// The first chunk is allocated eagerly so an unavailable region fails the
    /// worker before it touches any input.
    pub fn with_chunk_size(chunk_size: usize, mode: AllocationMode) -> Result<Self> {
        let chunk_size = chunk_size.clamp(1, u32::MAX as usize);
        let mut arena = Self {
            chunks: Vec::new(),
            chunk_size,
            mode,
        };
        arena.push_chunk(chunk_size)?;
        Ok(arena)
    }

    fn push_chunk(&mut self, bytes: usize) -> Result<()> {
        if self.chunks.len() >= u32::MAX as usize {
            return Err(ProcessingError::Capacity(
                "key arena chunk count exceeded".to_string(),
            ));
        }
        let region = Region::allocate(bytes, self.mode)?;
        self.mode.reserve(&mut self.chunks, 1, "key arena index")?;
        self.chunks.push(Chunk { region, used: 0 });
        Ok(())
    }

    /// Copy `bytes` into the arena.
    pub fn alloc(&mut self, bytes: &[u8]) -> Result<KeyRef> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            ProcessingError::Capacity(format!("station name of {} bytes", bytes.len()))
        })?;

        let fits = self
            .chunks
            .last()
            .is_some_and(|chunk| chunk.free() >= bytes.len());
        if !fits {
            self.push_chunk(self.chunk_size.max(bytes.len()))?;
        }

        let chunk_index = self.chunks.len() - 1;
        let chunk = &mut self.chunks[chunk_index];
        let offset = chunk.used;
        chunk.region.as_mut_slice()[offset..offset + bytes.len()].copy_from_slice(bytes);
        chunk.used += bytes.len();

        Ok(KeyRef {
            chunk: chunk_index as u32,
            offset: offset as u32,
            len,
        })
    }

    #[inline]
    pub fn get(&self, key: KeyRef) -> &[u8] {
        let start = key.offset as usize;
        &self.chunks[key.chunk as usize].region.as_slice()[start..start + key.len as usize]
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn used_bytes(&self) -> usize {
        self.chunks.iter().map(|c| c.used).sum()
    }

    pub fn reserved_bytes(&self) -> usize {
        self.chunks.iter().map(|c| c.capacity()).sum()
    }

    pub fn mode(&self) -> AllocationMode {
        self.mode
    }
}
