//! Dense simulation grid: per-node mass, velocity, and surface tension.

use glam::{IVec3, Vec3};

/// State accumulated on one grid node during a substep.
///
/// `velocity` holds momentum while P2G accumulates and becomes a velocity
/// once the grid operator divides by mass.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridNode {
    pub mass: f32,
    pub velocity: Vec3,
    pub tension: Vec3,
}

/// Uniform collocated grid over the unit cube, `num` nodes per axis.
///
/// All node state is scratch: it is zeroed and rebuilt inside every substep
/// and carries no meaning across substeps.
pub struct SimGrid {
    num: usize,
    nodes: Vec<GridNode>,
}

impl SimGrid {
    pub fn new(num: usize) -> Self {
        assert!(num > 1, "grid needs at least 2 nodes per axis, got {}", num);
        Self {
            num,
            nodes: vec![GridNode::default(); num * num * num],
        }
    }

    /// Nodes per axis.
    #[inline]
    pub fn num(&self) -> usize {
        self.num
    }

    #[inline]
    pub fn node_index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.num + j) * self.num + k
    }

    /// Whether an integer coordinate lies on the lattice.
    #[inline]
    pub fn contains(&self, coord: IVec3) -> bool {
        let n = self.num as i32;
        coord.x >= 0 && coord.x < n && coord.y >= 0 && coord.y < n && coord.z >= 0 && coord.z < n
    }

    #[inline]
    pub fn node(&self, coord: IVec3) -> &GridNode {
        &self.nodes[self.node_index(coord.x as usize, coord.y as usize, coord.z as usize)]
    }

    #[inline]
    pub fn node_mut(&mut self, coord: IVec3) -> &mut GridNode {
        let idx = self.node_index(coord.x as usize, coord.y as usize, coord.z as usize);
        &mut self.nodes[idx]
    }

    pub fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [GridNode] {
        &mut self.nodes
    }

    /// Zero mass and momentum before P2G accumulation.
    pub fn reset_mass_and_velocity(&mut self) {
        for node in &mut self.nodes {
            node.mass = 0.0;
            node.velocity = Vec3::ZERO;
        }
    }

    /// Zero accumulated surface tension before the tension scatter pass.
    pub fn reset_tension(&mut self) {
        for node in &mut self.nodes {
            node.tension = Vec3::ZERO;
        }
    }

    /// Total mass currently accumulated on the grid.
    pub fn total_mass(&self) -> f32 {
        self.nodes.iter().map(|n| n.mass).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_round_trips() {
        let grid = SimGrid::new(8);
        let idx = grid.node_index(3, 4, 5);
        assert_eq!(idx, (3 * 8 + 4) * 8 + 5);
        assert!(grid.contains(IVec3::new(7, 7, 7)));
        assert!(!grid.contains(IVec3::new(8, 0, 0)));
        assert!(!grid.contains(IVec3::new(-1, 0, 0)));
    }

    #[test]
    fn resets_are_selective() {
        let mut grid = SimGrid::new(4);
        let coord = IVec3::new(1, 2, 3);
        grid.node_mut(coord).mass = 1.0;
        grid.node_mut(coord).velocity = Vec3::ONE;
        grid.node_mut(coord).tension = Vec3::ONE;

        grid.reset_mass_and_velocity();
        assert_eq!(grid.node(coord).mass, 0.0);
        assert_eq!(grid.node(coord).velocity, Vec3::ZERO);
        assert_eq!(grid.node(coord).tension, Vec3::ONE);

        grid.reset_tension();
        assert_eq!(grid.node(coord).tension, Vec3::ZERO);
    }
}
