use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::kdtree::{KDTree, Node};
use crate::{Point, PointIndexError, SpatialIndex};

fn random_points<const D: usize>(rng: &mut StdRng, n: usize, max: i32) -> Vec<Point<i32, D>> {
    (0..n)
        .map(|_| Point::new(std::array::from_fn(|_| rng.gen_range(-max..=max))))
        .collect()
}

fn subtree_points<const D: usize>(node: Node<'_, i32, D>, out: &mut Vec<Point<i32, D>>) {
    out.push(node.point());
    if let Some(left) = node.left() {
        subtree_points(left, out);
    }
    if let Some(right) = node.right() {
        subtree_points(right, out);
    }
}

/// Checks the ordering invariant and the cached heights, returning the real height.
fn check_node<const D: usize>(node: Node<'_, i32, D>) -> usize {
    let axis = node.axis();
    let value = node.point().coord(axis);
    let mut height = 0;

    if let Some(left) = node.left() {
        let mut below = vec![];
        subtree_points(left, &mut below);
        assert!(below.iter().all(|p| p.coord(axis) < value));
        height = height.max(1 + check_node(left));
    }
    if let Some(right) = node.right() {
        let mut below = vec![];
        subtree_points(right, &mut below);
        assert!(below.iter().all(|p| p.coord(axis) >= value));
        height = height.max(1 + check_node(right));
    }

    assert_eq!(node.height(), height, "cached height at depth {}", node.depth());
    height
}

fn check_tree<const D: usize>(tree: &KDTree<i32, D>) {
    match tree.root() {
        Some(root) => {
            let height = check_node(root);
            assert_eq!(tree.height(), height as isize);
        }
        None => assert_eq!(tree.height(), -1),
    }
    assert_eq!(tree.points().len(), tree.len());
}

fn sorted_distances<const D: usize>(anchor: &Point<i32, D>, points: &[Point<i32, D>]) -> Vec<f64> {
    let mut distances: Vec<f64> = points.iter().map(|p| anchor.distance(p)).collect();
    distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
    distances
}

fn sorted(mut points: Vec<Point<i32, 2>>) -> Vec<Point<i32, 2>> {
    points.sort_by_key(|p| *p.coords());
    points
}

#[test]
fn small_scenario() {
    let mut tree = KDTree::<i32, 2>::new();
    for coords in [[5, 5], [3, 3], [8, 8], [1, 1]] {
        tree.insert(Point::new(coords)).unwrap();
    }
    check_tree(&tree);

    assert!(tree.search(&Point::new([3, 3])));
    assert!(!tree.search(&Point::new([9, 9])));

    let found = tree.range(&Point::new([5, 5]), 3.);
    assert_eq!(
        sorted(found),
        vec![Point::new([3, 3]), Point::new([5, 5])],
        "range includes the anchor itself"
    );

    assert!(tree.delete(&Point::new([5, 5])));
    check_tree(&tree);
    assert!(!tree.search(&Point::new([5, 5])));
    for coords in [[3, 3], [8, 8], [1, 1]] {
        assert!(tree.search(&Point::new(coords)));
    }
    assert_eq!(tree.len(), 3);
}

#[test]
fn empty_tree() {
    let tree = KDTree::<i32, 3>::new();
    let anchor = Point::new([0, 0, 0]);
    assert!(tree.is_empty());
    assert_eq!(tree.height(), -1);
    assert!(!tree.search(&anchor));
    assert!(tree.range(&anchor, 100.).is_empty());
    assert_eq!(tree.nearest_neighbor(&anchor), None);
    assert!(tree.k_nearest_neighbors(3, &anchor).unwrap().is_empty());
    assert_eq!(tree.minimum(0), Err(PointIndexError::EmptyStructure));
}

#[test]
fn heights_follow_insertion_order() {
    let mut tree = KDTree::<i32, 2>::new();
    tree.insert(Point::new([0, 0])).unwrap();
    assert_eq!(tree.height(), 0);
    tree.insert(Point::new([1, 0])).unwrap();
    assert_eq!(tree.height(), 1);
    tree.insert(Point::new([-1, 0])).unwrap();
    assert_eq!(tree.height(), 1);
    tree.insert(Point::new([2, 5])).unwrap();
    assert_eq!(tree.height(), 2);

    let root = tree.root().unwrap();
    assert_eq!(root.point(), Point::new([0, 0]));
    assert_eq!(root.left().unwrap().point(), Point::new([-1, 0]));
    assert_eq!(root.right().unwrap().point(), Point::new([1, 0]));
    assert_eq!(root.right().unwrap().right().unwrap().axis(), 0);
}

#[test]
fn ties_go_right() {
    let tree: KDTree<i32, 2> = [[4, 1], [4, 9], [4, -3]].into_iter().map(Point::new).collect();
    let root = tree.root().unwrap();
    assert!(root.left().is_none());
    let right = root.right().unwrap();
    assert_eq!(right.point(), Point::new([4, 9]));
    assert_eq!(right.left().unwrap().point(), Point::new([4, -3]));
    check_tree(&tree);
}

#[test]
fn delete_leaf_and_inner_nodes() {
    let mut tree = KDTree::<i32, 2>::new();
    let points = [[50, 50], [20, 70], [80, 10], [10, 60], [30, 90], [70, 20], [90, 5]];
    tree.insert_all(points.map(Point::new)).unwrap();
    check_tree(&tree);

    // Leaf.
    assert!(tree.delete(&Point::new([70, 20])));
    check_tree(&tree);
    // Node with only a left child: its subtree moves to the right.
    assert!(tree.delete(&Point::new([80, 10])));
    check_tree(&tree);
    let right = tree.root().unwrap().right().unwrap();
    assert_eq!(right.point(), Point::new([90, 5]));
    assert!(right.is_leaf());
    // Root with two children.
    assert!(tree.delete(&Point::new([50, 50])));
    check_tree(&tree);
    assert_eq!(tree.root().unwrap().point(), Point::new([90, 5]));

    assert!(!tree.delete(&Point::new([50, 50])));
    assert_eq!(tree.len(), 4);
}

#[test]
fn delete_last_point() {
    let mut tree = KDTree::<i32, 1>::new();
    tree.insert(Point::new([3])).unwrap();
    assert!(tree.delete(&Point::new([3])));
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
    assert_eq!(tree.height(), -1);
}

#[test]
fn duplicates_are_deleted_one_at_a_time() {
    let mut tree = KDTree::<i32, 2>::new();
    for _ in 0..3 {
        tree.insert(Point::new([1, 1])).unwrap();
    }
    tree.insert(Point::new([0, 2])).unwrap();
    for remaining in (0..3).rev() {
        assert!(tree.delete(&Point::new([1, 1])));
        check_tree(&tree);
        assert_eq!(tree.search(&Point::new([1, 1])), remaining > 0);
    }
    assert_eq!(tree.len(), 1);
}

#[test]
fn random_inserts_and_deletes_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut tree = KDTree::<i32, 3>::new();
    let mut stored = vec![];

    for _ in 0..60 {
        for p in random_points::<3>(&mut rng, 10, 20) {
            tree.insert(p).unwrap();
            stored.push(p);
        }
        for _ in 0..6 {
            let index = rng.gen_range(0..stored.len());
            let p = stored.swap_remove(index);
            assert!(tree.delete(&p));
        }
        check_tree(&tree);
        assert_eq!(tree.len(), stored.len());
    }

    for p in &stored {
        assert!(tree.search(p));
    }
    for p in random_points::<3>(&mut rng, 200, 30) {
        assert_eq!(tree.search(&p), stored.contains(&p));
    }
}

#[test]
fn range_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(1);
    let points = random_points::<2>(&mut rng, 500, 100);
    let tree: KDTree<i32, 2> = points.iter().copied().collect();

    for anchor in random_points::<2>(&mut rng, 50, 120) {
        let radius = rng.gen_range(0.0..40.0);
        let expected: Vec<_> = points
            .iter()
            .copied()
            .filter(|p| anchor.distance(p) <= radius)
            .collect();
        assert_eq!(sorted(tree.range(&anchor, radius)), sorted(expected));
    }
}

#[test]
fn nearest_neighbor_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(2);
    let points = random_points::<3>(&mut rng, 400, 50);
    let tree: KDTree<i32, 3> = points.iter().copied().collect();

    // Anchors drawn from the tree must not find themselves.
    let anchors = points.iter().take(20).copied().chain(random_points::<3>(&mut rng, 30, 60));
    for anchor in anchors {
        let expected = points
            .iter()
            .filter(|p| **p != anchor)
            .map(|p| anchor.distance(p))
            .fold(f64::INFINITY, f64::min);
        let found = tree.nearest_neighbor(&anchor).unwrap();
        assert_ne!(found, anchor);
        assert_eq!(anchor.distance(&found), expected);
    }
}

#[test]
fn k_nearest_neighbors_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(3);
    let points = random_points::<2>(&mut rng, 300, 40);
    let tree: KDTree<i32, 2> = points.iter().copied().collect();

    for anchor in points.iter().take(10).copied().chain(random_points::<2>(&mut rng, 20, 50)) {
        for k in [1, 4, 25, 1000] {
            let others: Vec<_> = points.iter().copied().filter(|p| *p != anchor).collect();
            let mut expected = sorted_distances(&anchor, &others);
            expected.truncate(k);

            let found = tree.k_nearest_neighbors(k, &anchor).unwrap();
            assert!(found.iter().all(|p| *p != anchor));
            let distances: Vec<f64> = found.iter().map(|p| anchor.distance(p)).collect();
            assert_eq!(distances, expected);
        }
    }
}

#[test]
fn k_must_be_positive() {
    let tree = KDTree::<i32, 2>::new();
    assert!(matches!(
        tree.k_nearest_neighbors(0, &Point::new([0, 0])),
        Err(PointIndexError::InvalidConfiguration(_))
    ));
}

#[test]
fn minimum_per_axis() {
    let mut rng = StdRng::seed_from_u64(4);
    let points = random_points::<3>(&mut rng, 200, 1000);
    let tree: KDTree<i32, 3> = points.iter().copied().collect();
    for axis in 0..3 {
        let expected = points.iter().map(|p| p.coord(axis)).min().unwrap();
        assert_eq!(tree.minimum(axis).unwrap().coord(axis), expected);
    }
    assert!(matches!(
        tree.minimum(3),
        Err(PointIndexError::InvalidConfiguration(_))
    ));
}

#[test]
fn sorted_input_degenerates_without_overflowing_queries() {
    let n = 5_000;
    let tree: KDTree<i64, 1> = (0..n).map(|i| Point::new([i])).collect();
    assert_eq!(tree.height(), n as isize - 1);

    assert!(tree.search(&Point::new([n - 1])));
    assert_eq!(tree.range(&Point::new([n - 1]), 2.).len(), 3);
    assert_eq!(
        tree.nearest_neighbor(&Point::new([n - 1])),
        Some(Point::new([n - 2]))
    );
    assert_eq!(
        tree.k_nearest_neighbors(2, &Point::new([n + 10])).unwrap(),
        vec![Point::new([n - 1]), Point::new([n - 2])]
    );
    assert_eq!(tree.minimum(0).unwrap(), Point::new([0]));
    assert_eq!(tree.points().len(), n as usize);
}

#[test]
fn search_through_coord_trait() {
    let tree: KDTree<i32, 2> = [[1, 2], [3, 4]].into_iter().map(Point::new).collect();
    let probe = Point::new([3, 4]);
    assert!(tree.search_coord(&probe).unwrap());

    let wrong = Point::new([3, 4, 5]);
    assert_eq!(
        tree.search_coord(&wrong),
        Err(PointIndexError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    );
    assert_eq!(
        tree.k_nearest_neighbors_coord(1, &probe).unwrap(),
        vec![Point::new([1, 2])]
    );
}

#[test]
fn sorted_input_deletes_and_clones_on_a_small_stack() {
    let worker = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(|| {
            let n = 10_000i64;
            let mut tree: KDTree<i64, 1> = (0..n).map(|i| Point::new([i])).collect();
            let copy = tree.clone();
            assert_eq!(copy.height(), n as isize - 1);
            assert_eq!(copy.points(), tree.points());

            assert!(tree.delete(&Point::new([n - 1])));
            assert_eq!(tree.height(), n as isize - 2);

            // Every node on the chain takes its successor's point.
            assert!(tree.delete(&Point::new([0])));
            assert_eq!(tree.len(), n as usize - 2);
            assert_eq!(tree.height(), n as isize - 3);
            assert_eq!(tree.minimum(0).unwrap(), Point::new([1]));
            assert!(!tree.search(&Point::new([0])));
            assert!(!tree.delete(&Point::new([n + 5])));

            assert_eq!(copy.len(), n as usize);
            assert!(copy.search(&Point::new([0])));
            assert!(copy.search(&Point::new([n - 1])));
        })
        .unwrap();
    worker.join().unwrap();
}

#[test]
fn clone_is_independent() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut tree: KDTree<i32, 3> = random_points::<3>(&mut rng, 300, 50).into_iter().collect();
    let copy = tree.clone();
    check_tree(&copy);
    assert_eq!(copy.points(), tree.points());

    for p in copy.points().iter().take(100) {
        assert!(tree.delete(p));
    }
    check_tree(&tree);
    assert_eq!(copy.len(), 300);
    assert_eq!(tree.len(), 200);
    assert!(copy.points().iter().all(|p| copy.search(p)));
}
