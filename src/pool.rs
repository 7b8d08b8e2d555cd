use crate::particle::Particle;

/// Default pool capacity
pub const DEFAULT_CAPACITY: usize = 1000;

/// Fixed-capacity particle storage.
///
/// Slots never move and the pool never grows. Free slots sit on a stack so
/// acquiring one is O(1); the stack starts reversed so a fresh pool hands
/// out slot 0 first.
pub struct ParticlePool {
    slots: Vec<Particle>,
    free: Vec<usize>,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::default(); capacity],
            free: (0..capacity).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Take a free slot, or `None` once every slot is live
    pub fn acquire(&mut self) -> Option<usize> {
        self.free.pop()
    }

    /// Return a retired slot to the free stack. The slot must already be
    /// inactive.
    pub fn release(&mut self, slot: usize) {
        debug_assert!(!self.slots[slot].active, "release of live slot {}", slot);
        self.free.push(slot);
    }

    /// Retire every particle at once
    pub fn clear(&mut self) {
        for p in &mut self.slots {
            p.active = false;
        }
        self.free.clear();
        self.free.extend((0..self.slots.len()).rev());
    }

    pub fn get(&self, slot: usize) -> Option<&Particle> {
        self.slots.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Particle> {
        self.slots.get_mut(slot)
    }

    pub fn slots_mut(&mut self) -> &mut [Particle] {
        &mut self.slots
    }

    /// Live particles in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter(|p| p.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_hands_out_low_slots_first() {
        let mut pool = ParticlePool::new(3);
        assert_eq!(pool.acquire(), Some(0));
        assert_eq!(pool.acquire(), Some(1));
        assert_eq!(pool.acquire(), Some(2));
        assert_eq!(pool.acquire(), None);
        assert!(pool.is_full());
    }

    #[test]
    fn test_release_makes_slot_reusable() {
        let mut pool = ParticlePool::new(2);
        let a = pool.acquire().unwrap();
        pool.get_mut(a).unwrap().active = true;
        let _b = pool.acquire().unwrap();
        assert_eq!(pool.acquire(), None);

        pool.get_mut(a).unwrap().active = false;
        pool.release(a);
        assert_eq!(pool.acquire(), Some(a));
    }

    #[test]
    fn test_clear_frees_everything() {
        let mut pool = ParticlePool::new(4);
        for _ in 0..4 {
            let slot = pool.acquire().unwrap();
            pool.get_mut(slot).unwrap().active = true;
        }
        assert_eq!(pool.iter_active().count(), 4);

        pool.clear();
        assert_eq!(pool.iter_active().count(), 0);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.acquire(), Some(0));
    }

    #[test]
    fn test_zero_capacity_pool() {
        let mut pool = ParticlePool::new(0);
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.acquire(), None);
    }
}
