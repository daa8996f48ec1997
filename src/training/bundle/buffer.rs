//! Cutting-plane buffer with inactive-plane eviction.
//!
//! Working state local to one solver run; never shared across training calls
//! or exposed to callers.

use ndarray::Array1;
use thiserror::Error;

/// Dual weight below which a plane counts as inactive for one master solve.
pub(crate) const ACTIVE_EPS: f64 = 1e-12;

/// One cutting plane: a linear lower bound `a·w + b` on the risk.
#[derive(Debug, Clone)]
pub(crate) struct Plane {
    /// Subgradient of the risk at the iterate that produced this plane.
    pub a: Array1<f64>,
    /// Offset: `risk(w) - a·w`.
    pub b: f64,
    /// Consecutive master solves since this plane was last binding.
    pub age: u32,
}

impl Plane {
    pub fn new(a: Array1<f64>, b: f64) -> Self {
        Self { a, b, age: 0 }
    }
}

/// The buffer is full and the cleanup policy found nothing to evict.
#[derive(Debug, Error)]
#[error("cutting-plane buffer is full ({capacity}) and no plane is eligible for eviction")]
pub(crate) struct BufferFull {
    pub capacity: usize,
}

/// Bounded plane storage in admission order.
///
/// Planes accumulate up to `capacity`. When the buffer is full and
/// `remove_inactive` is set, the plane that has been inactive the longest
/// (and past `age_threshold`) is evicted before a new plane is admitted. The
/// most recently admitted plane is never evicted.
#[derive(Debug)]
pub(crate) struct CuttingPlaneBuffer {
    planes: Vec<Plane>,
    capacity: usize,
    remove_inactive: bool,
    age_threshold: u32,
}

impl CuttingPlaneBuffer {
    pub fn new(capacity: usize, remove_inactive: bool, age_threshold: u32) -> Self {
        debug_assert!(capacity > 0, "buffer capacity must be positive");
        Self {
            planes: Vec::new(),
            capacity,
            remove_inactive,
            age_threshold,
        }
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Admit a plane, evicting an over-age inactive plane if the buffer is
    /// full.
    pub fn insert(&mut self, plane: Plane) -> Result<(), BufferFull> {
        if self.planes.len() >= self.capacity {
            if !self.remove_inactive {
                return Err(BufferFull {
                    capacity: self.capacity,
                });
            }
            // Oldest evictable plane; the newest (last admitted) is excluded.
            let evict = self.planes[..self.planes.len() - 1]
                .iter()
                .enumerate()
                .filter(|(_, p)| p.age > self.age_threshold)
                .max_by_key(|(_, p)| p.age)
                .map(|(i, _)| i);
            match evict {
                Some(index) => {
                    self.planes.remove(index);
                }
                None => {
                    return Err(BufferFull {
                        capacity: self.capacity,
                    })
                }
            }
        }
        self.planes.push(plane);
        Ok(())
    }

    /// Age every plane by one master solve; planes with positive dual weight
    /// are reset to age zero.
    pub fn update_activity(&mut self, alpha: &[f64]) {
        debug_assert_eq!(alpha.len(), self.planes.len());
        for (plane, &weight) in self.planes.iter_mut().zip(alpha) {
            if weight > ACTIVE_EPS {
                plane.age = 0;
            } else {
                plane.age = plane.age.saturating_add(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn plane(tag: f64) -> Plane {
        Plane::new(array![tag], tag)
    }

    fn aged_plane(tag: f64, age: u32) -> Plane {
        let mut p = plane(tag);
        p.age = age;
        p
    }

    #[test]
    fn fills_to_capacity() {
        let mut buffer = CuttingPlaneBuffer::new(3, true, 0);
        for i in 0..3 {
            buffer.insert(plane(i as f64)).unwrap();
        }
        assert_eq!(buffer.planes().len(), 3);
    }

    #[test]
    fn evicts_oldest_inactive_when_full() {
        let mut buffer = CuttingPlaneBuffer::new(3, true, 1);
        buffer.insert(aged_plane(0.0, 5)).unwrap();
        buffer.insert(aged_plane(1.0, 3)).unwrap();
        buffer.insert(plane(2.0)).unwrap();

        buffer.insert(plane(3.0)).unwrap();

        // Plane 0 (age 5) was evicted; size stays at capacity.
        assert_eq!(buffer.planes().len(), 3);
        let tags: Vec<f64> = buffer.planes().iter().map(|p| p.b).collect();
        assert_eq!(tags, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn newest_plane_never_evicted() {
        let mut buffer = CuttingPlaneBuffer::new(2, true, 0);
        buffer.insert(aged_plane(0.0, 10)).unwrap();
        // The newest plane is old enough to evict, but must be excluded.
        buffer.insert(aged_plane(1.0, 10)).unwrap();

        buffer.insert(plane(2.0)).unwrap();

        let tags: Vec<f64> = buffer.planes().iter().map(|p| p.b).collect();
        assert_eq!(tags, vec![1.0, 2.0]);
    }

    #[test]
    fn full_without_cleanup_errors() {
        let mut buffer = CuttingPlaneBuffer::new(1, false, 0);
        buffer.insert(plane(0.0)).unwrap();
        assert!(buffer.insert(plane(1.0)).is_err());
        assert_eq!(buffer.planes().len(), 1);
    }

    #[test]
    fn full_with_no_evictable_plane_errors() {
        let mut buffer = CuttingPlaneBuffer::new(2, true, 10);
        buffer.insert(aged_plane(0.0, 2)).unwrap();
        buffer.insert(aged_plane(1.0, 2)).unwrap();
        // All planes under the age threshold.
        assert!(buffer.insert(plane(2.0)).is_err());
        assert_eq!(buffer.planes().len(), 2);
    }

    #[test]
    fn activity_resets_age() {
        let mut buffer = CuttingPlaneBuffer::new(3, true, 0);
        buffer.insert(plane(0.0)).unwrap();
        buffer.insert(plane(1.0)).unwrap();

        buffer.update_activity(&[0.7, 0.0]);
        assert_eq!(buffer.planes()[0].age, 0);
        assert_eq!(buffer.planes()[1].age, 1);

        buffer.update_activity(&[0.0, 1.0]);
        assert_eq!(buffer.planes()[0].age, 1);
        assert_eq!(buffer.planes()[1].age, 0);
    }

    #[test]
    fn size_bounded_after_many_inserts() {
        let mut buffer = CuttingPlaneBuffer::new(4, true, 0);
        for i in 0..20 {
            // Everything inactive, so eviction always finds a candidate.
            let inserted = buffer.insert(aged_plane(i as f64, 0)).is_ok();
            if inserted {
                let n = buffer.planes().len();
                buffer.update_activity(&vec![0.0; n]);
            }
            assert!(buffer.planes().len() <= 4);
        }
    }
}
