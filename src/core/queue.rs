use slotmap::{SlotMap, new_key_type};
use std::fmt;

new_key_type! {
    struct NodeId;
}

/// Anything stored in a [`FifoQueue`] that should show up in queue snapshots.
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyQueueError;

impl fmt::Display for EmptyQueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is empty")
    }
}

impl std::error::Error for EmptyQueueError {}

#[derive(Debug)]
struct Node<T> {
    value: T,
    next: Option<NodeId>,
}

/// Singly-linked FIFO queue whose nodes live in a slot arena.
///
/// Links are arena keys rather than boxes, so there is no recursive drop and
/// no cycles; a dequeued node's slot is recycled with a fresh version.
#[derive(Debug)]
pub struct FifoQueue<T> {
    nodes: SlotMap<NodeId, Node<T>>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl<T> Default for FifoQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FifoQueue<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn enqueue(&mut self, value: T) {
        let id = self.nodes.insert(Node { value, next: None });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    pub fn dequeue(&mut self) -> Result<T, EmptyQueueError> {
        let head = self.head.ok_or(EmptyQueueError)?;
        let node = self.nodes.remove(head).ok_or(EmptyQueueError)?;

        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        Ok(node.value)
    }

    pub fn peek_front(&self) -> Result<&T, EmptyQueueError> {
        self.head
            .and_then(|id| self.nodes.get(id))
            .map(|node| &node.value)
            .ok_or(EmptyQueueError)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Walks the queue head to tail without consuming it.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            queue: self,
            cursor: self.head,
        }
    }
}

impl<T: Identified> FifoQueue<T> {
    pub fn ids(&self) -> Vec<String> {
        self.iter().map(|item| item.id().to_owned()).collect()
    }
}

impl<T> Extend<T> for FifoQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.enqueue(value);
        }
    }
}

impl<T> FromIterator<T> for FifoQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

pub struct Iter<'a, T> {
    queue: &'a FifoQueue<T>,
    cursor: Option<NodeId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.nodes.get(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.value)
    }
}

impl<'a, T> IntoIterator for &'a FifoQueue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
