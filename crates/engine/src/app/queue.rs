use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use super::Entity;

static QUEUE_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_queue_lock_poison_once(operation: &'static str) {
    if QUEUE_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "entity queue lock poisoned; recovered inner value");
    }
}

/// Heap slot ordered by expiry, then spawn id so equal expiries stay FIFO.
#[derive(Debug, Clone, Copy)]
struct QueuedEntity(Entity);

impl QueuedEntity {
    fn key(&self) -> (u64, u64) {
        (self.0.expiry_ms(), self.0.id().0)
    }
}

impl PartialEq for QueuedEntity {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedEntity {}

impl PartialOrd for QueuedEntity {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEntity {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.key().cmp(&other.key())
    }
}

type Heap = BinaryHeap<Reverse<QueuedEntity>>;

fn lock_heap<'a>(heap: &'a Mutex<Heap>, operation: &'static str) -> MutexGuard<'a, Heap> {
    match heap.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn_queue_lock_poison_once(operation);
            poisoned.into_inner()
        }
    }
}

fn copy_sorted(heap: &Mutex<Heap>, target: &mut Vec<Entity>) {
    {
        let guard = lock_heap(heap, "snapshot");
        target.clear();
        target.extend(guard.iter().map(|Reverse(slot)| slot.0));
    }
    target.sort_by_key(|entity| (entity.expiry_ms(), entity.id().0));
}

/// Live entities ordered by ascending expiry.
///
/// Every call is one critical section. There is no combined "pop if
/// expired": the owner peeks, decides, then removes, which is only sound
/// while this handle is the single writer. It is not `Clone`;
/// readers get an [`EntityQueueReader`].
#[derive(Debug, Default)]
pub struct EntityQueue {
    heap: Arc<Mutex<Heap>>,
}

impl EntityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader(&self) -> EntityQueueReader {
        EntityQueueReader {
            heap: Arc::clone(&self.heap),
        }
    }

    pub fn insert(&mut self, entity: Entity) {
        lock_heap(&self.heap, "insert").push(Reverse(QueuedEntity(entity)));
    }

    pub fn peek_earliest(&self) -> Option<Entity> {
        lock_heap(&self.heap, "peek")
            .peek()
            .map(|Reverse(slot)| slot.0)
    }

    /// Removes the earliest entity, which is the one the last
    /// [`peek_earliest`](Self::peek_earliest) returned as long as the caller
    /// is the only writer. Returns `None` on an empty queue.
    pub fn remove_earliest(&mut self) -> Option<Entity> {
        lock_heap(&self.heap, "remove")
            .pop()
            .map(|Reverse(slot)| slot.0)
    }

    pub fn snapshot_into(&self, target: &mut Vec<Entity>) {
        copy_sorted(&self.heap, target);
    }

    pub fn len(&self) -> usize {
        lock_heap(&self.heap, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only view of an [`EntityQueue`], safe to hand to other threads.
#[derive(Debug, Clone)]
pub struct EntityQueueReader {
    heap: Arc<Mutex<Heap>>,
}

impl EntityQueueReader {
    /// Replaces `target` with a point-in-time copy, sorted by expiry.
    pub fn snapshot_into(&self, target: &mut Vec<Entity>) {
        copy_sorted(&self.heap, target);
    }

    pub fn len(&self) -> usize {
        lock_heap(&self.heap, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU64;
    use std::thread;

    use super::*;
    use crate::app::{Direction, EntityId, EntityVariant};

    fn entity(id: u64, expiry_ms: u64) -> Entity {
        Entity::new(
            EntityId(id),
            expiry_ms,
            NonZeroU64::new(500).expect("lifetime"),
            Direction::ALL[(id % 4) as usize],
            EntityVariant::Jittered,
        )
    }

    fn poison(queue: &EntityQueue) {
        let heap = Arc::clone(&queue.heap);
        let _ = thread::spawn(move || {
            let _guard = heap.lock().expect("heap guard");
            panic!("poison entity queue");
        })
        .join();
    }

    #[test]
    fn peek_returns_smallest_expiry() {
        let mut queue = EntityQueue::new();
        assert_eq!(queue.peek_earliest(), None);

        for (id, expiry) in [(1, 900), (2, 300), (3, 1_200), (4, 600)] {
            queue.insert(entity(id, expiry));
            let smallest = queue.peek_earliest().expect("non-empty");
            let mut snapshot = Vec::new();
            queue.snapshot_into(&mut snapshot);
            let expected = snapshot.iter().map(Entity::expiry_ms).min();
            assert_eq!(Some(smallest.expiry_ms()), expected);
        }
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn removals_come_out_in_expiry_order() {
        let mut queue = EntityQueue::new();
        for (id, expiry) in [(1, 50), (2, 10), (3, 40), (4, 20), (5, 30)] {
            queue.insert(entity(id, expiry));
        }

        let mut drained = Vec::new();
        while let Some(peeked) = queue.peek_earliest() {
            let removed = queue.remove_earliest().expect("peeked entity present");
            assert_eq!(peeked, removed);
            drained.push(removed.expiry_ms());
        }

        assert_eq!(drained, vec![10, 20, 30, 40, 50]);
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_expiries_resolve_in_spawn_order() {
        let mut queue = EntityQueue::new();
        queue.insert(entity(9, 100));
        queue.insert(entity(3, 100));
        queue.insert(entity(5, 100));

        let ids: Vec<u64> = std::iter::from_fn(|| queue.remove_earliest())
            .map(|e| e.id().0)
            .collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }

    #[test]
    fn remove_on_empty_queue_is_none() {
        let mut queue = EntityQueue::new();
        assert_eq!(queue.remove_earliest(), None);
    }

    #[test]
    fn snapshot_replaces_previous_contents() {
        let mut queue = EntityQueue::new();
        queue.insert(entity(1, 30));
        queue.insert(entity(2, 10));

        let mut target = vec![entity(99, 1), entity(98, 2), entity(97, 3)];
        queue.reader().snapshot_into(&mut target);

        let ids: Vec<u64> = target.iter().map(|e| e.id().0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn reader_sees_writer_changes() {
        let mut queue = EntityQueue::new();
        let reader = queue.reader();
        assert!(reader.is_empty());

        queue.insert(entity(1, 10));
        assert_eq!(reader.len(), 1);

        assert!(queue.remove_earliest().is_some());
        assert!(reader.is_empty());
    }

    #[test]
    fn operations_recover_after_poison() {
        let mut queue = EntityQueue::new();
        queue.insert(entity(1, 10));
        poison(&queue);

        queue.insert(entity(2, 5));
        assert_eq!(queue.peek_earliest().map(|e| e.id()), Some(EntityId(2)));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn concurrent_snapshots_see_whole_states_only() {
        // The writer keeps the live ids a contiguous range `low..high`, so any
        // serialization point yields a gap-free, duplicate-free id run.
        const TOTAL: u64 = 2_000;
        let mut queue = EntityQueue::new();
        let reader = queue.reader();
        let done = AtomicBool::new(false);

        thread::scope(|scope| {
            let done = &done;
            scope.spawn(move || {
                let mut snapshot = Vec::new();
                let mut observed = 0usize;
                loop {
                    let finished = done.load(Ordering::Acquire);
                    reader.snapshot_into(&mut snapshot);
                    let ids: Vec<u64> = snapshot.iter().map(|e| e.id().0).collect();
                    for pair in ids.windows(2) {
                        assert_eq!(pair[1], pair[0] + 1, "snapshot not contiguous: {ids:?}");
                    }
                    observed += 1;
                    if finished {
                        break;
                    }
                }
                assert!(observed > 0);
            });

            for id in 0..TOTAL {
                queue.insert(entity(id, id * 10));
                if id % 3 == 2 {
                    let earliest = queue.peek_earliest().expect("non-empty");
                    let removed = queue.remove_earliest().expect("non-empty");
                    assert_eq!(earliest, removed);
                }
            }
            done.store(true, Ordering::Release);
        });

        let mut remaining = Vec::new();
        queue.snapshot_into(&mut remaining);
        assert_eq!(remaining.len() as u64, TOTAL - TOTAL / 3);
    }
}
