//! The KD-tree module
//! Provide build, k-nearest-neighbor queries and introspection for the index

use crate::point::Point;
use std::collections::VecDeque;

/// One node of the tree.
///
/// Each node owns its stored point and, exclusively, its two optional
/// subtrees. Dropping a node drops its whole subtree; there is no sharing
/// and no back-reference anywhere in the structure.
struct KDNode {
    point: Point,
    left: Option<Box<KDNode>>,
    right: Option<Box<KDNode>>,
}

impl KDNode {
    fn new(point: Point) -> KDNode {
        KDNode { point, left: None, right: None }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// A KD-tree over fixed-dimension points, built once and queried repeatedly.
///
/// The tree partitions points by cycling the splitting axis with depth
/// (`axis = depth % k`) and storing the median point at each internal node.
/// Queries walk a single root-to-leaf path toward the target and never
/// backtrack into the far branch, so results are approximate: the true
/// nearest neighbor may lie across a splitting plane and be missed. This
/// trade-off is intentional.
///
/// The tree is immutable after construction. Concurrent read-only queries
/// from multiple threads are safe; no operation mutates node contents.
///
/// # Examples
///
/// ```
/// use kdnn::{KDTree, Point};
///
/// let points: Vec<Point> = vec![
///     vec![2.0, 3.0].into(),
///     vec![5.0, 4.0].into(),
///     vec![9.0, 6.0].into(),
///     vec![4.0, 7.0].into(),
///     vec![8.0, 1.0].into(),
///     vec![7.0, 2.0].into(),
/// ];
///
/// let tree = KDTree::new(&points);
/// let results = tree.knn(&vec![9.0, 2.0].into(), 1);
/// assert_eq!(results[0].as_slice(), &[8.0, 1.0]);
/// ```
pub struct KDTree {
    root: Option<Box<KDNode>>,
    leaf_size: usize,
}

impl KDTree {
    /// Builds a tree with the default leaf size of 1 (partition down to
    /// individual points).
    pub fn new(points: &[Point]) -> KDTree {
        KDTree::build(points, 1)
    }

    /// Builds a tree from a collection of points.
    ///
    /// All points must have the same dimension; mixing dimensions is a
    /// programming error and panics during construction.
    ///
    /// # Arguments
    ///
    /// * `points` - Points to index. An empty slice yields an empty tree.
    /// * `leaf_size` - Minimum point count at which partitioning stops and a
    ///   leaf is emitted. Values below 1 are clamped to 1.
    ///
    /// Once a partition's size falls to `leaf_size` or below, a leaf is
    /// created from the *first* point of the partition and the remaining
    /// points are dropped. A leaf never stores more than one point, so with
    /// `leaf_size > 1` the tree may contain fewer nodes than there were
    /// input points. This lossy behavior is preserved from the reference
    /// implementation on purpose.
    pub fn build(points: &[Point], leaf_size: usize) -> KDTree {
        let leaf_size = leaf_size.max(1);

        KDTree {
            root: Self::build_node(points.to_vec(), 0, leaf_size),
            leaf_size,
        }
    }

    /// Returns the configured leaf size.
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    fn build_node(mut points: Vec<Point>, depth: usize, leaf_size: usize) -> Option<Box<KDNode>> {
        if points.is_empty() {
            return None;
        }

        // Threshold reached: keep only the first point, drop the rest
        if points.len() <= leaf_size {
            return Some(Box::new(KDNode::new(points.swap_remove(0))));
        }

        let k = points[0].dim();
        let axis = depth % k;

        // Stable sort keeps construction deterministic for equal axis values
        points.sort_by(|a, b| a[axis].total_cmp(&b[axis]));

        let median = points.len() / 2;
        let right_points = points.split_off(median + 1);
        let median_point = points.pop().unwrap();
        let left_points = points;

        let mut node = Box::new(KDNode::new(median_point));
        node.left = Self::build_node(left_points, depth + 1, leaf_size);
        node.right = Self::build_node(right_points, depth + 1, leaf_size);

        Some(node)
    }

    /// Single-path descent toward `target`.
    ///
    /// Every visited node appends its (squared distance, point) pair to
    /// `visited`; the return value is the minimum distance observed along
    /// the path. An absent node contributes the `f32::MAX` sentinel. The far
    /// child is never explored, which is what makes the search approximate.
    fn min_search<'a>(
        node: Option<&'a KDNode>,
        target: &Point,
        depth: usize,
        visited: &mut Vec<(f32, &'a Point)>,
    ) -> f32 {
        let Some(node) = node else {
            return f32::MAX;
        };

        let dist = node.point.distance_squared(target);
        visited.push((dist, &node.point));

        if node.is_leaf() {
            return dist;
        }

        let axis = depth % target.dim();
        let near = if target[axis] < node.point[axis] {
            node.left.as_deref()
        } else {
            node.right.as_deref()
        };

        let child_dist = Self::min_search(near, target, depth + 1, visited);
        dist.min(child_dist)
    }

    /// Returns up to `k` points near `target`, ordered by ascending squared
    /// distance.
    ///
    /// Candidates are drawn only from the nodes visited along one single-path
    /// descent, never from the whole tree, so fewer than `k` points may be
    /// returned and the true nearest neighbor is not guaranteed to appear.
    /// An empty tree yields an empty result and a diagnostic on stderr.
    ///
    /// # Examples
    ///
    /// ```
    /// use kdnn::{KDTree, Point};
    ///
    /// let points: Vec<Point> = vec![
    ///     vec![1.0, 0.0].into(),
    ///     vec![0.0, 1.0].into(),
    ///     vec![2.0, 2.0].into(),
    /// ];
    /// let tree = KDTree::new(&points);
    ///
    /// let results = tree.knn(&vec![2.0, 2.0].into(), 2);
    /// assert!(results.len() <= 2);
    /// ```
    pub fn knn(&self, target: &Point, k: usize) -> Vec<Point> {
        let Some(root) = self.root.as_deref() else {
            eprintln!("Error: KDTree is empty. Cannot perform knn.");
            return Vec::new();
        };

        let mut visited = Vec::new();
        Self::min_search(Some(root), target, 0, &mut visited);

        visited.sort_by(|a, b| a.0.total_cmp(&b.0));

        visited.iter()
            .take(k)
            .map(|(_, point)| (*point).clone())
            .collect()
    }

    /// Runs [`knn`](KDTree::knn) for every target and concatenates the
    /// results in target order.
    ///
    /// The output is flat: each target contributes at most `k` consecutive
    /// entries and no other segmentation information is retained. An empty
    /// tree or an empty target collection yields an empty result and a
    /// diagnostic on stderr.
    pub fn knn_batch(&self, targets: &[Point], k: usize) -> Vec<Point> {
        if self.root.is_none() {
            eprintln!("Error: KDTree is empty. Cannot perform knn.");
            return Vec::new();
        }

        if targets.is_empty() {
            eprintln!("Error: Input data is empty. Cannot perform knn.");
            return Vec::new();
        }

        targets.iter()
            .flat_map(|target| self.knn(target, k))
            .collect()
    }

    /// Returns the path-minimum squared distance from `target` to the tree.
    ///
    /// This is the scalar form of [`knn`](KDTree::knn): the smallest squared
    /// distance among the nodes visited on one single-path descent, which is
    /// not guaranteed to be the true global nearest distance. An empty tree
    /// returns the `f32::MAX` sentinel.
    pub fn nearest_distance(&self, target: &Point) -> f32 {
        let mut visited = Vec::new();
        Self::min_search(self.root.as_deref(), target, 0, &mut visited)
    }

    /// Returns a depth-indented pre-order listing of every stored point.
    ///
    /// Parent before children, left before right, two spaces of indentation
    /// per level. An empty tree produces a single "KDTree is empty." line.
    pub fn dump(&self) -> Vec<String> {
        match self.root.as_deref() {
            None => vec!["KDTree is empty.".to_string()],
            Some(root) => {
                let mut lines = Vec::new();
                Self::dump_node(root, 0, &mut lines);
                lines
            }
        }
    }

    fn dump_node(node: &KDNode, depth: usize, lines: &mut Vec<String>) {
        lines.push(format!("{}Point: {:?}", "  ".repeat(depth), node.point.as_slice()));

        if let Some(left) = node.left.as_deref() {
            Self::dump_node(left, depth + 1, lines);
        }
        if let Some(right) = node.right.as_deref() {
            Self::dump_node(right, depth + 1, lines);
        }
    }

    /// Prints the structural dump to stdout. Purely diagnostic.
    pub fn print(&self) {
        for line in self.dump() {
            println!("{}", line);
        }
    }

    /// Returns the number of nodes in the tree.
    pub fn count(&self) -> usize {
        fn count_nodes(node: Option<&KDNode>) -> usize {
            match node {
                None => 0,
                Some(n) => 1 + count_nodes(n.left.as_deref()) + count_nodes(n.right.as_deref()),
            }
        }

        count_nodes(self.root.as_deref())
    }

    /// Approximate in-memory footprint of the tree in bytes.
    ///
    /// Walks every reachable node breadth-first (queue-based, so deep trees
    /// do not grow the stack) and sums a fixed per-node size. The point
    /// vectors' own backing storage is not counted; this reproduces the
    /// reference accounting policy exactly rather than improving on it.
    /// Returns 0 for an empty tree.
    pub fn memory_footprint(&self) -> usize {
        let Some(root) = self.root.as_deref() else {
            return 0;
        };

        let mut total = 0;
        let mut queue = VecDeque::new();
        queue.push_back(root);

        while let Some(node) = queue.pop_front() {
            total += std::mem::size_of::<KDNode>();

            if let Some(left) = node.left.as_deref() {
                queue.push_back(left);
            }
            if let Some(right) = node.right.as_deref() {
                queue.push_back(right);
            }
        }

        total
    }
}
