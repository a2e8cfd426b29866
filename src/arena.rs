use crate::span::ArenaSpan;

/// Append-only storage for all text a document creates.
///
/// Strings are copied in and are never moved relative to each other or freed
/// one by one: a span handed out stays valid for as long as the arena exists.
/// Reassigning a value allocates fresh storage; the old bytes stay behind as
/// unreachable garbage until the whole arena is dropped.
#[derive(Debug, Default, Clone)]
pub(crate) struct StringArena {
    data: String,
}

impl StringArena {
    pub(crate) fn new() -> Self {
        StringArena {
            data: String::new(),
        }
    }

    /// Copy `s` into the arena.
    pub(crate) fn allocate(&mut self, s: &str) -> ArenaSpan {
        let start = self.data.len();
        self.data.push_str(s);
        ArenaSpan {
            start,
            len: s.len(),
        }
    }

    #[inline]
    pub(crate) fn get(&self, span: ArenaSpan) -> &str {
        &self.data[span.start..span.end()]
    }

    /// Total bytes allocated, garbage included.
    pub(crate) fn allocated_bytes(&self) -> usize {
        self.data.len()
    }
}
