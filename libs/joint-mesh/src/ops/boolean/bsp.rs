//! # BSP Tree
//!
//! Binary Space Partitioning tree for CSG boolean operations.
//! Based on the csg.js algorithm by Evan Wallace.
//!
//! ## Algorithm
//!
//! Each BSP node contains:
//! - A dividing plane
//! - Polygons coplanar with the plane
//! - Front subtree (polygons in front of plane)
//! - Back subtree (polygons behind plane)
//!
//! ## Storage
//!
//! Nodes live in a flat arena and reference children by index, so every
//! traversal is an explicit loop or work stack. Deep trees from finely
//! tessellated solids cannot overflow the call stack.

use super::plane::Plane;
use super::polygon::Polygon;

#[derive(Debug, Clone)]
struct Node {
    plane: Plane,
    polygons: Vec<Polygon>,
    front: Option<usize>,
    back: Option<usize>,
}

/// A BSP tree stored as an arena of nodes. Index 0 is the root.
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<Node>,
    epsilon: f64,
}

impl BspTree {
    /// Builds a BSP tree from polygons.
    ///
    /// The splitting plane of each node is the plane of the first polygon
    /// routed to it.
    pub fn new(polygons: Vec<Polygon>, epsilon: f64) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            epsilon,
        };
        if polygons.is_empty() {
            return tree;
        }

        let root_plane = polygons[0].plane;
        tree.nodes.push(Node::new(root_plane));

        let mut stack: Vec<(usize, Vec<Polygon>)> = vec![(0, polygons)];
        while let Some((index, polys)) = stack.pop() {
            let plane = tree.nodes[index].plane;

            let mut coplanar = Vec::new();
            let mut front = Vec::with_capacity(polys.len() / 2 + 1);
            let mut back = Vec::with_capacity(polys.len() / 2 + 1);
            let mut coplanar_back = Vec::new();
            for poly in polys {
                poly.split(
                    &plane,
                    epsilon,
                    &mut coplanar,
                    &mut coplanar_back,
                    &mut front,
                    &mut back,
                );
            }
            coplanar.append(&mut coplanar_back);
            tree.nodes[index].polygons.extend(coplanar);

            if !front.is_empty() {
                let child = tree.child(index, true, front[0].plane);
                stack.push((child, front));
            }
            if !back.is_empty() {
                let child = tree.child(index, false, back[0].plane);
                stack.push((child, back));
            }
        }

        tree
    }

    /// Returns the front or back child of `index`, creating it if needed.
    fn child(&mut self, index: usize, front: bool, plane: Plane) -> usize {
        let existing = if front {
            self.nodes[index].front
        } else {
            self.nodes[index].back
        };
        if let Some(child) = existing {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(Node::new(plane));
        if front {
            self.nodes[index].front = Some(child);
        } else {
            self.nodes[index].back = Some(child);
        }
        child
    }

    /// Converts solid space to empty space and vice versa.
    pub fn invert(&mut self) {
        for node in &mut self.nodes {
            for poly in &mut node.polygons {
                poly.flip();
            }
            node.plane = node.plane.flipped();
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Removes the parts of `polygons` that lie inside this tree's solid.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        if self.nodes.is_empty() {
            return polygons;
        }

        let mut result = Vec::new();
        let mut stack: Vec<(usize, Vec<Polygon>)> = vec![(0, polygons)];

        while let Some((index, polys)) = stack.pop() {
            if polys.is_empty() {
                continue;
            }
            let node = &self.nodes[index];

            let mut front = Vec::new();
            let mut back = Vec::new();
            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            for poly in polys {
                poly.split(
                    &node.plane,
                    self.epsilon,
                    &mut coplanar_front,
                    &mut coplanar_back,
                    &mut front,
                    &mut back,
                );
            }
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);

            match node.front {
                Some(child) => stack.push((child, front)),
                None => result.extend(front),
            }
            // Without a back subtree the back side is solid; drop those pieces.
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }

        result
    }

    /// Removes all polygons in this tree that are inside `other`.
    pub fn clip_to(&mut self, other: &BspTree) {
        for node in &mut self.nodes {
            let polygons = std::mem::take(&mut node.polygons);
            node.polygons = other.clip_polygons(polygons);
        }
    }

    /// Consumes the tree and returns its polygons.
    pub fn into_polygons(self) -> Vec<Polygon> {
        self.nodes
            .into_iter()
            .flat_map(|node| node.polygons)
            .collect()
    }
}

impl Node {
    fn new(plane: Plane) -> Self {
        Self {
            plane,
            polygons: Vec::new(),
            front: None,
            back: None,
        }
    }
}

// Inspection helpers for the tests below.
#[cfg(test)]
impl BspTree {
    fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        self.nodes
            .iter()
            .flat_map(|node| node.polygons.iter().cloned())
            .collect()
    }

    /// Returns the number of polygons in this tree.
    fn polygon_count(&self) -> usize {
        self.nodes.iter().map(|node| node.polygons.len()).sum()
    }

    /// Returns the depth of this tree.
    fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        let mut max_depth = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let node = &self.nodes[index];
            stack.extend(node.front.map(|c| (c, depth + 1)));
            stack.extend(node.back.map(|c| (c, depth + 1)));
        }
        max_depth
    }
}
