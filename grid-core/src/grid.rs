use crate::types::ElementId;
use glam::Vec3;

/// Origins of a cubic lattice of `edge_size³` elements.
///
/// Index order is x outer, y middle, z inner, and never changes after
/// [`Grid::generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub edge_size: usize,
    pub spacing: f32,
    pub origins: Vec<Vec3>,
}

impl Grid {
    /// Builds the lattice centered on the `z = 0` plane in x and y:
    /// `origin(x, y, z) = (x, y, z) * spacing - (E * spacing / 2, E * spacing / 2, 0)`.
    pub fn generate(edge_size: usize, spacing: f32) -> Self {
        Self::generate_into(
            edge_size,
            spacing,
            Vec::with_capacity(edge_size * edge_size * edge_size),
        )
    }

    /// Same as [`Grid::generate`], reusing the allocation of `origins`.
    ///
    /// Existing contents are discarded. Callers that reserve `edge_size³`
    /// slots up front get a lattice without further allocation.
    pub fn generate_into(edge_size: usize, spacing: f32, mut origins: Vec<Vec3>) -> Self {
        let half = edge_size as f32 * spacing * 0.5;
        let shift = Vec3::new(half, half, 0.0);

        origins.clear();
        for x in 0..edge_size {
            for y in 0..edge_size {
                for z in 0..edge_size {
                    origins.push(Vec3::new(x as f32, y as f32, z as f32) * spacing - shift);
                }
            }
        }

        Self {
            edge_size,
            spacing,
            origins,
        }
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Element index of lattice coordinate `(x, y, z)`.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize, z: usize) -> ElementId {
        (x * self.edge_size + y) * self.edge_size + z
    }

    /// Lattice coordinate of an element index; inverse of [`Grid::index_of`].
    ///
    /// ### Panics
    /// Panics if `id` is out of range.
    pub fn lattice_coords(&self, id: ElementId) -> (usize, usize, usize) {
        assert!(id < self.len(), "element {id} out of range {}", self.len());
        let e = self.edge_size;
        (id / (e * e), (id / e) % e, id % e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_two_matches_reference_positions() {
        let grid = Grid::generate(2, 5.0);

        assert_eq!(grid.len(), 8);
        assert_eq!(grid.origins[0], Vec3::new(-5.0, -5.0, 0.0));
        assert_eq!(grid.origins[1], Vec3::new(-5.0, -5.0, 5.0));
        assert_eq!(grid.origins[2], Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(grid.origins[4], Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(grid.origins[7], Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn edge_zero_is_empty() {
        let grid = Grid::generate(0, 5.0);
        assert!(grid.is_empty());
    }

    #[test]
    fn generation_is_reproducible() {
        let a = Grid::generate(7, 5.0);
        let b = Grid::generate(7, 5.0);
        let bits = |g: &Grid| -> Vec<[u32; 3]> {
            g.origins
                .iter()
                .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
                .collect()
        };
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn generate_into_discards_old_contents_and_keeps_capacity() {
        let stale = vec![Vec3::splat(9.0); 3];
        let mut reserved = Vec::with_capacity(27);
        reserved.extend_from_slice(&stale);

        let grid = Grid::generate_into(3, 5.0, reserved);
        assert_eq!(grid, Grid::generate(3, 5.0));
        assert!(grid.origins.capacity() >= 27);
    }

    #[test]
    fn index_of_and_lattice_coords_are_inverse() {
        let grid = Grid::generate(4, 5.0);
        for id in 0..grid.len() {
            let (x, y, z) = grid.lattice_coords(id);
            assert_eq!(grid.index_of(x, y, z), id);
        }
        assert_eq!(grid.lattice_coords(grid.index_of(1, 2, 3)), (1, 2, 3));
    }

    #[test]
    #[should_panic]
    fn lattice_coords_panics_out_of_range() {
        let grid = Grid::generate(2, 5.0);
        grid.lattice_coords(8);
    }
}
