use virtual_office::entity::{Entity, EntityEvent, FilingCabinet, Pick, DRAWERS, DRAWER_CLOSED_Z, DRAWER_OPEN_Z};
use virtual_office::scene::SceneGraph;

fn built() -> (SceneGraph, FilingCabinet) {
    let mut graph = SceneGraph::new();
    let mut cabinet = FilingCabinet::new();
    cabinet.build(&mut graph).unwrap();
    (graph, cabinet)
}

#[test]
fn test_opening_another_drawer_closes_the_first() {
    let (mut graph, mut cabinet) = built();

    for i in 0..DRAWERS.len() {
        for j in (0..DRAWERS.len()).filter(|&j| j != i) {
            if cabinet.open_drawer().is_some() {
                let open = cabinet.open_drawer().unwrap();
                cabinet.toggle(&mut graph, open).unwrap();
            }
            assert!(cabinet.toggle(&mut graph, i).unwrap());
            assert!(cabinet.toggle(&mut graph, j).unwrap());
            assert!(!cabinet.is_open(i), "drawer {i} should close when {j} opens");
            assert!(cabinet.is_open(j));
            assert_eq!(cabinet.open_drawer(), Some(j));
        }
    }
}

#[test]
fn test_documents_follow_the_open_drawer() {
    let (mut graph, mut cabinet) = built();
    assert_eq!(cabinet.document_count(), 0);

    cabinet.toggle(&mut graph, 0).unwrap();
    assert_eq!(cabinet.document_count(), DRAWERS[0].items.len());
    let nodes_with_docs = graph.live_nodes();

    cabinet.toggle(&mut graph, 1).unwrap();
    assert_eq!(cabinet.document_count(), DRAWERS[1].items.len());
    assert_eq!(graph.live_nodes(), nodes_with_docs - DRAWERS[0].items.len() + DRAWERS[1].items.len());

    cabinet.toggle(&mut graph, 1).unwrap();
    assert_eq!(cabinet.document_count(), 0);
}

#[test]
fn test_drawer_click_reports_new_state() {
    let (mut graph, mut cabinet) = built();
    let drawer = cabinet
        .interactive_surfaces()
        .into_iter()
        .find(|s| s.pick == Pick::Drawer { index: 2 })
        .unwrap();

    let event = cabinet.on_click(&mut graph, drawer.pick).unwrap();
    assert_eq!(event, Some(EntityEvent::DrawerToggled { index: 2, open: true }));

    let docs: Vec<_> = cabinet
        .interactive_surfaces()
        .into_iter()
        .filter(|s| matches!(s.pick, Pick::Document { drawer: 2, .. }))
        .collect();
    assert_eq!(docs.len(), DRAWERS[2].items.len(), "open drawer documents become pickable");
}

#[test]
fn test_closed_drawer_slides_back() {
    let (mut graph, mut cabinet) = built();
    cabinet.toggle(&mut graph, 3).unwrap();
    for _ in 0..240 {
        cabinet.tick(&mut graph, 1.0 / 60.0).unwrap();
    }
    assert!((cabinet.drawer_offset(3).unwrap() - DRAWER_OPEN_Z).abs() < 1e-3);

    cabinet.toggle(&mut graph, 0).unwrap();
    for _ in 0..240 {
        cabinet.tick(&mut graph, 1.0 / 60.0).unwrap();
    }
    assert!((cabinet.drawer_offset(3).unwrap() - DRAWER_CLOSED_Z).abs() < 1e-3);
    assert!((cabinet.drawer_offset(0).unwrap() - DRAWER_OPEN_Z).abs() < 1e-3);
}

#[test]
fn test_toggle_before_build_fails() {
    let mut graph = SceneGraph::new();
    let mut cabinet = FilingCabinet::new();
    assert!(cabinet.toggle(&mut graph, 0).is_err());
}
