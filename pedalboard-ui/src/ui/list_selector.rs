//! Selection state for a list in which some rows cannot be selected.

#[derive(Debug, Clone, Default)]
pub struct ListSelector {
    pub selected: usize,
}

impl ListSelector {
    pub fn new(initial: usize) -> Self {
        Self { selected: initial }
    }

    /// First row not matching `skip`, or 0 when every row is skipped.
    pub fn first<F>(len: usize, skip: F) -> Self
    where
        F: Fn(usize) -> bool,
    {
        Self::new((0..len).find(|&i| !skip(i)).unwrap_or(0))
    }

    /// Move to the next row not matching `skip`, wrapping at the end.
    pub fn select_next<F>(&mut self, len: usize, skip: F)
    where
        F: Fn(usize) -> bool,
    {
        if len == 0 {
            return;
        }
        let mut next = (self.selected + 1) % len;
        let start = next;
        while skip(next) {
            next = (next + 1) % len;
            if next == start {
                break;
            }
        }
        self.selected = next;
    }

    /// Move to the previous row not matching `skip`, wrapping at the start.
    pub fn select_prev<F>(&mut self, len: usize, skip: F)
    where
        F: Fn(usize) -> bool,
    {
        if len == 0 {
            return;
        }
        let mut prev = if self.selected == 0 { len - 1 } else { self.selected - 1 };
        let start = prev;
        while skip(prev) {
            prev = if prev == 0 { len - 1 } else { prev - 1 };
            if prev == start {
                break;
            }
        }
        self.selected = prev;
    }
}
