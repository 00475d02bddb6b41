use std::collections::VecDeque;

use tokio::sync::Mutex;

/// Bounded in-memory queue of pending reports. When a push overflows
/// the capacity, the whole backlog (including the new item) is handed
/// back to the caller for an immediate flush.
pub struct Buffer<T> {
    capacity: usize,
    queue: Mutex<VecDeque<T>>,
}

pub enum PushOutcome<T> {
    Buffered,
    Overflowed { backlog: Vec<T> },
}

impl<T> Buffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub async fn push(&self, item: T) -> PushOutcome<T> {
        let mut queue = self.queue.lock().await;
        if queue.len() >= self.capacity {
            let mut backlog: Vec<T> = queue.drain(..).collect();
            backlog.push(item);
            PushOutcome::Overflowed { backlog }
        } else {
            queue.push_back(item);
            PushOutcome::Buffered
        }
    }

    pub async fn drain(&self) -> Vec<T> {
        let mut queue = self.queue.lock().await;
        queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn holds_items_until_drained() {
        let buffer = Buffer::new(4);
        assert!(matches!(buffer.push(1).await, PushOutcome::Buffered));
        assert!(matches!(buffer.push(2).await, PushOutcome::Buffered));
        assert_eq!(buffer.drain().await, vec![1, 2]);
        assert!(buffer.drain().await.is_empty());
    }

    #[tokio::test]
    async fn overflow_returns_the_whole_backlog() {
        let buffer = Buffer::new(2);
        buffer.push(1).await;
        buffer.push(2).await;
        match buffer.push(3).await {
            PushOutcome::Overflowed { backlog } => assert_eq!(backlog, vec![1, 2, 3]),
            PushOutcome::Buffered => panic!("expected overflow"),
        }
        assert!(buffer.drain().await.is_empty());
    }
}
