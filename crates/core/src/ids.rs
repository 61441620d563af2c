use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of one `%{` or `%[` block.
///
/// Unique for the lifetime of the [`BlockIdGen`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Monotonic source of [`BlockId`]s.
///
/// One generator is shared by every file compiled in a run, so generated
/// names never collide across files. The counter is atomic; compiling files
/// on several threads against the same generator keeps ids unique.
#[derive(Debug, Default)]
pub struct BlockIdGen {
    next: AtomicU64,
}

impl BlockIdGen {
    /// A generator whose first id is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn next_id(&self) -> BlockId {
        BlockId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// The id the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self) -> BlockId {
        BlockId(self.next.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_sequential() {
        let ids = BlockIdGen::new();
        assert_eq!(ids.next_id(), BlockId(0));
        assert_eq!(ids.next_id(), BlockId(1));
        assert_eq!(ids.peek(), BlockId(2));
    }

    #[test]
    fn display_is_bare_number() {
        let ids = BlockIdGen::new();
        ids.next_id();
        assert_eq!(ids.next_id().to_string(), "1");
    }

    #[test]
    fn shared_across_threads_stays_unique() {
        let ids = BlockIdGen::new();
        let seen: Vec<BlockId> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| (0..250).map(|_| ids.next_id()).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), 1000);
        assert_eq!(ids.peek(), BlockId(1000));
    }
}
