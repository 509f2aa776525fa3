use crate::common::{Ray, Transform};
use crate::graph::SceneGraph;
use crate::node::NodeId;

use super::HitContext;

/// A node hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    /// Ray parameter of the hit; with a unit direction this is the distance
    /// from the ray origin.
    pub distance: f64,
}

/// Collects every visible node under `root` that the ray passes through,
/// sorted by distance (closest first).
///
/// The ray must be expressed in the frame of `root`; the root's own
/// transform is not applied. Invisible nodes hide their whole subtree.
pub fn intersections(graph: &SceneGraph, ray: &Ray, root: NodeId) -> Vec<Intersection> {
    let mut results = Vec::new();
    if ray.is_degenerate() {
        log::debug!("Degenerate ray, nothing to pick");
        return results;
    }

    collect_hits(graph, ray, root, Transform::identity(), &mut results);

    results.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    log::debug!("Ray from {:?} hit {} node(s)", ray.origin, results.len());
    results
}

/// Tests `node_id` with `to_world` mapping it into the ray's frame, then
/// recurses into its children.
fn collect_hits(
    graph: &SceneGraph,
    ray: &Ray,
    node_id: NodeId,
    to_world: Transform,
    results: &mut Vec<Intersection>,
) {
    let Some(node) = graph.get_node(node_id) else {
        return;
    };
    if !node.visible() {
        return;
    }

    let ctx = HitContext::new(ray, &to_world);
    if let Some(distance) = node.kind().passes_through(&ctx) {
        results.push(Intersection {
            node: node_id,
            distance,
        });
    }

    for &child_id in node.children() {
        if let Some(child) = graph.get_node(child_id) {
            collect_hits(graph, ray, child_id, to_world * *child.transform(), results);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EPSILON;
    use crate::geometry::{Mesh, Points, Scaling};
    use crate::node::NodeDescriptor;
    use cgmath::{Point3, Vector3};

    fn down_ray(x: f64, y: f64) -> Ray {
        Ray::new(Point3::new(x, y, 1.0), Vector3::new(0.0, 0.0, -1.0))
    }

    fn sphere_at(x: f64, y: f64, z: f64) -> Points {
        Points::new(vec![Point3::new(x, y, z)])
            .with_size(1.0)
            .with_edge_width(0.0)
            .with_scaling(Scaling::Scene)
    }

    #[test]
    fn test_intersections_sorted_nearest_first() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(None, NodeDescriptor::scene()).unwrap();
        let far = graph.add_node(Some(root), sphere_at(0.0, 0.0, -5.0)).unwrap();
        let near = graph.add_node(Some(root), sphere_at(0.0, 0.0, 0.0)).unwrap();

        let hits = intersections(&graph, &down_ray(0.0, 0.0), root);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert!((hits[0].distance - 0.5).abs() < EPSILON);
        assert_eq!(hits[1].node, far);
        assert!((hits[1].distance - 5.5).abs() < EPSILON);
    }

    #[test]
    fn test_child_transforms_compose() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(None, NodeDescriptor::scene()).unwrap();
        let group = graph
            .add_node(
                Some(root),
                NodeDescriptor::scene()
                    .with_transform(Transform::identity().translated(Vector3::new(2.0, 0.0, 0.0))),
            )
            .unwrap();
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let triangle = graph
            .add_node(
                Some(group),
                NodeDescriptor::from(mesh)
                    .with_transform(Transform::identity().translated(Vector3::new(0.0, 3.0, 0.0))),
            )
            .unwrap();

        assert!(intersections(&graph, &down_ray(0.25, 0.25), root).is_empty());
        let hits = intersections(&graph, &down_ray(2.25, 3.25), root);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, triangle);
        assert!((hits[0].distance - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_root_transform_is_not_applied() {
        let mut graph = SceneGraph::new();
        let root = graph
            .add_node(
                None,
                NodeDescriptor::scene()
                    .with_transform(Transform::identity().translated(Vector3::new(100.0, 0.0, 0.0))),
            )
            .unwrap();
        graph.add_node(Some(root), sphere_at(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(intersections(&graph, &down_ray(0.0, 0.0), root).len(), 1);
    }

    #[test]
    fn test_invisible_node_hides_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(None, NodeDescriptor::scene()).unwrap();
        let hidden = graph
            .add_node(Some(root), NodeDescriptor::scene().with_visible(false))
            .unwrap();
        graph.add_node(Some(hidden), sphere_at(0.0, 0.0, 0.0)).unwrap();
        assert!(intersections(&graph, &down_ray(0.0, 0.0), root).is_empty());

        graph.node_mut(hidden).unwrap().set_visible(true);
        assert_eq!(intersections(&graph, &down_ray(0.0, 0.0), root).len(), 1);
    }

    #[test]
    fn test_degenerate_ray_hits_nothing() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(None, NodeDescriptor::scene()).unwrap();
        graph.add_node(Some(root), sphere_at(0.0, 0.0, 0.0)).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 0.0));
        assert!(intersections(&graph, &ray, root).is_empty());
    }

    #[test]
    fn test_unknown_root_hits_nothing() {
        let graph = SceneGraph::new();
        assert!(intersections(&graph, &down_ray(0.0, 0.0), 42).is_empty());
    }
}
