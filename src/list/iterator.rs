//! List Iterator
//!
//! Walks every entry of a list in append order.

use crate::error::Result;

use super::ListDict;

/// Iterator over list payloads
pub struct ListIter<'a> {
    dict: &'a ListDict,
    next: u64,
    end: u64,
}

impl<'a> ListIter<'a> {
    pub(super) fn new(dict: &'a ListDict) -> Self {
        Self {
            dict,
            next: 0,
            end: dict.len(),
        }
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let item = self.dict.get(self.next);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ListIter<'_> {}
