//! On-screen message queue
//!
//! Messages carry a priority and a lifetime in frames. Every pull returns
//! the highest-priority message and uses up one frame of its lifetime.

/// Default queue capacity
pub const MESSAGE_QUEUE_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
struct Message {
    text: String,
    priority: u32,
    frames_left: u32,
    /// Insertion order, breaks priority ties in favour of older messages
    seq: u64,
}

/// Bounded priority queue of on-screen messages
#[derive(Debug, Clone)]
pub struct MessageQueue {
    messages: Vec<Message>,
    capacity: usize,
    next_seq: u64,
}

impl MessageQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Vec::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Queue `text` for `duration` frames. Dropped when the queue is full.
    pub fn push(&mut self, text: impl Into<String>, priority: u32, duration: u32) -> bool {
        if self.messages.len() >= self.capacity || duration == 0 {
            return false;
        }
        self.messages.push(Message {
            text: text.into(),
            priority,
            frames_left: duration,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        true
    }

    /// Message to show this frame
    pub fn pull(&mut self) -> Option<String> {
        let (idx, _) = self
            .messages
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.priority.cmp(&b.priority).then(b.seq.cmp(&a.seq)))?;

        let message = &mut self.messages[idx];
        message.frames_left -= 1;
        if message.frames_left == 0 {
            Some(self.messages.remove(idx).text)
        } else {
            Some(message.text.clone())
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new(MESSAGE_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_and_expiry() {
        let mut queue = MessageQueue::default();
        queue.push("low", 1, 1);
        queue.push("high", 2, 2);

        assert_eq!(queue.pull().as_deref(), Some("high"));
        assert_eq!(queue.pull().as_deref(), Some("high"));
        assert_eq!(queue.pull().as_deref(), Some("low"));
        assert_eq!(queue.pull(), None);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut queue = MessageQueue::default();
        queue.push("first", 1, 1);
        queue.push("second", 1, 1);
        assert_eq!(queue.pull().as_deref(), Some("first"));
        assert_eq!(queue.pull().as_deref(), Some("second"));
    }

    #[test]
    fn test_bounded() {
        let mut queue = MessageQueue::new(1);
        assert!(queue.push("a", 1, 10));
        assert!(!queue.push("b", 1, 10));
        assert_eq!(queue.len(), 1);
    }
}
