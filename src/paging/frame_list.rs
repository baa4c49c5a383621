//! Intrusive ordering list over the frame arena.
//!
//! Replacement policies order frames by insertion age. The list stores
//! explicit prev/next indices into a fixed-size link array instead of
//! heap-allocated nodes, so frames can be unlinked from the middle (the
//! clean-preferring policy splices victims out of arbitrary positions) and
//! moved between lists without any allocation to leak.

/// Per-frame link state.
#[derive(Debug, Clone, Copy, Default)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

/// A FIFO-ordered list of frame indices with arbitrary-node removal.
///
/// The head is the oldest entry. A frame appears at most once; pushing a
/// frame that is already linked is a no-op.
#[derive(Debug)]
pub struct FrameList {
    links: Vec<Link>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl FrameList {
    /// Creates an empty list able to track frames `0..nframes`.
    #[must_use]
    pub fn new(nframes: usize) -> Self {
        Self {
            links: vec![Link::default(); nframes],
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of linked frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns whether `frame` is linked.
    #[must_use]
    pub fn contains(&self, frame: usize) -> bool {
        self.links[frame].linked
    }

    /// Returns the oldest frame without removing it.
    #[must_use]
    pub fn front(&self) -> Option<usize> {
        self.head
    }

    /// Returns the frame linked after `frame`, toward the newest end.
    #[must_use]
    pub fn next_of(&self, frame: usize) -> Option<usize> {
        self.links[frame].next
    }

    /// Appends `frame` at the newest end. Idempotent per frame.
    pub fn push_back(&mut self, frame: usize) {
        if self.links[frame].linked {
            return;
        }

        self.links[frame] = Link {
            prev: self.tail,
            next: None,
            linked: true,
        };

        match self.tail {
            Some(tail) => self.links[tail].next = Some(frame),
            None => self.head = Some(frame),
        }
        self.tail = Some(frame);
        self.len += 1;
    }

    /// Removes and returns the oldest frame.
    pub fn pop_front(&mut self) -> Option<usize> {
        let head = self.head?;
        self.unlink(head);
        Some(head)
    }

    /// Splices `frame` out of the list, wherever it sits.
    ///
    /// Returns whether the frame was linked.
    pub fn unlink(&mut self, frame: usize) -> bool {
        if !self.links[frame].linked {
            return false;
        }

        let Link { prev, next, .. } = self.links[frame];

        match prev {
            Some(p) => self.links[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.links[n].prev = prev,
            None => self.tail = prev,
        }

        self.links[frame] = Link::default();
        self.len -= 1;
        true
    }

    /// Iterates frames from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |&f| self.links[f].next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut list = FrameList::new(4);

        list.push_back(2);
        list.push_back(0);
        list.push_back(3);

        assert_eq!(list.len(), 3);
        assert_eq!(list.pop_front(), Some(2)); // Oldest first
        assert_eq!(list.pop_front(), Some(0));
        assert_eq!(list.pop_front(), Some(3));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_push_is_idempotent() {
        let mut list = FrameList::new(3);

        list.push_back(1);
        list.push_back(1);
        list.push_back(1);

        assert_eq!(list.len(), 1);
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_front(), None);
    }

    #[test]
    fn test_unlink_middle() {
        let mut list = FrameList::new(4);
        list.push_back(0);
        list.push_back(1);
        list.push_back(2);

        assert!(list.unlink(1));
        assert!(!list.contains(1));
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_unlink_head_and_tail() {
        let mut list = FrameList::new(4);
        list.push_back(0);
        list.push_back(1);
        list.push_back(2);

        assert!(list.unlink(0));
        assert_eq!(list.front(), Some(1));

        assert!(list.unlink(2));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![1]);

        // Tail is maintained: pushing again lands at the end.
        list.push_back(3);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_unlink_unlinked_frame() {
        let mut list = FrameList::new(2);
        assert!(!list.unlink(0));

        list.push_back(0);
        list.pop_front();
        assert!(!list.unlink(0));
    }

    #[test]
    fn test_relink_after_unlink() {
        let mut list = FrameList::new(3);
        list.push_back(0);
        list.push_back(1);

        list.unlink(0);
        list.push_back(0); // Moves to the newest end

        assert_eq!(list.iter().collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn test_next_of_walks_toward_newest() {
        let mut list = FrameList::new(3);
        list.push_back(2);
        list.push_back(1);
        list.push_back(0);

        assert_eq!(list.next_of(2), Some(1));
        assert_eq!(list.next_of(1), Some(0));
        assert_eq!(list.next_of(0), None);
    }
}
