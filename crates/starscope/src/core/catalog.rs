use std::sync::Arc;

use crate::api::types::{StarId, StarRecord};

/// Immutable snapshot of stars from one generator call.
///
/// Indices are stable for the lifetime of the snapshot: a catalog is never
/// mutated, only replaced wholesale. Clones share storage, so handing a
/// snapshot to a reader is cheap.
#[derive(Debug, Clone)]
pub struct Catalog {
    epoch: u64,
    stars: Arc<[StarRecord]>,
}

impl Catalog {
    pub fn new(epoch: u64, stars: Vec<StarRecord>) -> Self {
        Self {
            epoch,
            stars: stars.into(),
        }
    }

    /// An empty snapshot, meaning "no data yet".
    pub fn empty(epoch: u64) -> Self {
        Self::new(epoch, Vec::new())
    }

    /// Generation epoch shared by every record in this snapshot.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StarRecord> {
        self.stars.get(index)
    }

    pub fn stars(&self) -> &[StarRecord] {
        &self.stars
    }

    pub fn iter(&self) -> impl Iterator<Item = &StarRecord> {
        self.stars.iter()
    }

    /// Linear lookup by id.
    pub fn find(&self, id: StarId) -> Option<(usize, &StarRecord)> {
        self.stars.iter().enumerate().find(|(_, s)| s.id == id)
    }

    /// Whether two snapshots hold the same records in the same order,
    /// regardless of epoch.
    pub fn same_stars(&self, other: &Catalog) -> bool {
        self.stars[..] == other.stars[..]
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::StarType;
    use glam::DVec3;

    fn star(id: u64, x: f64) -> StarRecord {
        StarRecord {
            id: StarId(id),
            position: DVec3::new(x, 0.0, 0.0),
            luminosity: 1.0,
            temperature: 5700.0,
            mass: 1.0,
            star_type: StarType::G,
        }
    }

    #[test]
    fn find_returns_index() {
        let catalog = Catalog::new(1, vec![star(10, 0.0), star(11, 1.0)]);
        let (idx, s) = catalog.find(StarId(11)).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(s.position.x, 1.0);
        assert!(catalog.find(StarId(12)).is_none());
    }

    #[test]
    fn clones_share_storage() {
        let catalog = Catalog::new(3, vec![star(1, 0.0)]);
        let reader = catalog.clone();
        assert!(std::ptr::eq(catalog.stars().as_ptr(), reader.stars().as_ptr()));
        assert_eq!(reader.epoch(), 3);
    }

    #[test]
    fn same_stars_ignores_epoch() {
        let a = Catalog::new(1, vec![star(1, 0.0)]);
        let b = Catalog::new(2, vec![star(1, 0.0)]);
        assert!(a.same_stars(&b));
        assert!(!a.same_stars(&Catalog::empty(1)));
    }
}
