//! Depth-first traversal of the node hierarchy.
//!
//! Nodes are visited in pre-order: a node before its children, and each
//! child subtree completely before the next sibling. The node graph must be
//! a forest; a cycle recurses without bound.

use super::error::ImportError;
use super::source::SceneDescription;

/// Receives `(node, parent)` pairs from [`walk_scene`].
///
/// Traversal state lives in the visitor itself, so one walker serves both
/// the counting pass and the import pass.
pub trait NodeVisitor {
    /// Called once per reachable node. `parent` is `None` for scene roots.
    fn visit(
        &mut self,
        scene: &SceneDescription,
        node: usize,
        parent: Option<usize>,
    ) -> Result<(), ImportError>;
}

/// Walk the active scene (`default_scene`, or scene 0).
///
/// A description without scenes visits nothing.
pub fn walk_scene(
    scene: &SceneDescription,
    visitor: &mut impl NodeVisitor,
) -> Result<(), ImportError> {
    if scene.scenes.is_empty() {
        return Ok(());
    }
    let index = scene.active_scene();
    let active = scene
        .scenes
        .get(index)
        .ok_or(ImportError::InvalidReference {
            kind: "scene",
            index,
        })?;
    walk_roots(scene, &active.nodes, visitor)
}

/// Walk the subtrees rooted at `roots`, in order.
pub fn walk_roots(
    scene: &SceneDescription,
    roots: &[usize],
    visitor: &mut impl NodeVisitor,
) -> Result<(), ImportError> {
    for &root in roots {
        walk_node(scene, root, None, visitor)?;
    }
    Ok(())
}

fn walk_node(
    scene: &SceneDescription,
    node: usize,
    parent: Option<usize>,
    visitor: &mut impl NodeVisitor,
) -> Result<(), ImportError> {
    let desc = scene.node(node)?;
    visitor.visit(scene, node, parent)?;
    for &child in &desc.children {
        walk_node(scene, child, Some(node), visitor)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::source::NodeDesc;

    #[derive(Default)]
    struct Recorder(Vec<(usize, Option<usize>)>);

    impl NodeVisitor for Recorder {
        fn visit(
            &mut self,
            _scene: &SceneDescription,
            node: usize,
            parent: Option<usize>,
        ) -> Result<(), ImportError> {
            self.0.push((node, parent));
            Ok(())
        }
    }

    /// Two roots: 0 -> {1 -> {3}, 2}, and 4.
    fn forest() -> SceneDescription {
        let mut scene = SceneDescription::new();
        scene.push_node(NodeDesc::default().with_children(vec![1, 2]));
        scene.push_node(NodeDesc::default().with_children(vec![3]));
        scene.push_node(NodeDesc::default());
        scene.push_node(NodeDesc::default());
        scene.push_node(NodeDesc::default());
        scene.push_scene(vec![0, 4]);
        scene
    }

    #[test]
    fn test_pre_order() {
        let scene = forest();
        let mut recorder = Recorder::default();
        walk_scene(&scene, &mut recorder).unwrap();
        assert_eq!(
            recorder.0,
            vec![
                (0, None),
                (1, Some(0)),
                (3, Some(1)),
                (2, Some(0)),
                (4, None)
            ]
        );
    }

    #[test]
    fn test_default_scene_selects_roots() {
        let mut scene = forest();
        scene.push_scene(vec![2]);
        scene.default_scene = Some(1);
        let mut recorder = Recorder::default();
        walk_scene(&scene, &mut recorder).unwrap();
        assert_eq!(recorder.0, vec![(2, None)]);
    }

    #[test]
    fn test_no_scenes_visits_nothing() {
        let mut scene = forest();
        scene.scenes.clear();
        let mut recorder = Recorder::default();
        walk_scene(&scene, &mut recorder).unwrap();
        assert!(recorder.0.is_empty());
    }

    #[test]
    fn test_missing_scene_is_an_error() {
        let mut scene = forest();
        scene.default_scene = Some(7);
        let mut recorder = Recorder::default();
        assert!(matches!(
            walk_scene(&scene, &mut recorder),
            Err(ImportError::InvalidReference {
                kind: "scene",
                index: 7
            })
        ));
    }

    #[test]
    fn test_dangling_child_is_an_error() {
        let mut scene = forest();
        scene.nodes[2].children.push(42);
        let mut recorder = Recorder::default();
        assert!(walk_scene(&scene, &mut recorder).is_err());
    }
}
