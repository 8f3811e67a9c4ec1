use std::cell::RefCell;
use std::rc::Rc;

use causal_view::{CausalStore, CausalViewStore, ExplorationKey, Fid, Field, NodeSelectionMode};
use proptest::prelude::*;

const UNIVERSE: usize = 6;

fn universe() -> Vec<Field> {
    (0..UNIVERSE)
        .map(|i| Field::new(format!("f{i}"), format!("field {i}")))
        .collect()
}

fn fid(i: usize) -> Fid {
    Fid::new(format!("f{i}"))
}

fn session() -> (CausalStore, CausalViewStore) {
    let upstream = CausalStore::new(universe());
    let store = CausalViewStore::new(&upstream);
    (upstream, store)
}

fn sorted(mut fids: Vec<Fid>) -> Vec<Fid> {
    fids.sort();
    fids
}

fn multiple_selection(toggles: &[usize]) -> (CausalStore, CausalViewStore) {
    let (upstream, mut store) = session();
    store.set_exploration_key(ExplorationKey::CrossFilter);
    for i in toggles {
        store.toggle_node_selected(&fid(*i));
    }
    (upstream, store)
}

fn any_key() -> impl Strategy<Value = ExplorationKey> {
    prop::sample::select(ExplorationKey::ALL.to_vec())
}

proptest! {
    #[test]
    fn single_mode_keeps_at_most_one(toggles in prop::collection::vec(0..UNIVERSE, 0..40)) {
        let (_upstream, mut store) = session();
        prop_assert_eq!(store.node_selection_mode(), NodeSelectionMode::Single);

        for i in toggles {
            let before = store.selected_fids();
            let selected = store.toggle_node_selected(&fid(i));
            let after = store.selected_fids();

            prop_assert!(after.len() <= 1);
            if before == vec![fid(i)] {
                prop_assert_eq!(selected, Some(false));
                prop_assert!(after.is_empty());
            } else {
                prop_assert_eq!(selected, Some(true));
                prop_assert_eq!(after, vec![fid(i)]);
            }
        }
    }

    #[test]
    fn multiple_mode_toggle_is_its_own_inverse(
        toggles in prop::collection::vec(0..UNIVERSE, 0..30),
        twice in 0..UNIVERSE,
    ) {
        let (_upstream, mut store) = multiple_selection(&toggles);
        let before = sorted(store.selected_fids());

        prop_assert_eq!(store.toggle_node_selected(&fid(twice)), None);
        prop_assert_ne!(sorted(store.selected_fids()), before.clone());
        store.toggle_node_selected(&fid(twice));

        prop_assert_eq!(sorted(store.selected_fids()), before);
    }

    #[test]
    fn switching_to_single_keeps_the_last_selected(toggles in prop::collection::vec(0..UNIVERSE, 0..30)) {
        let (_upstream, mut store) = multiple_selection(&toggles);
        let before = store.selected_fids();

        store.set_node_selection_mode(NodeSelectionMode::Single);
        let expected: Vec<Fid> = before.last().cloned().into_iter().collect();
        prop_assert_eq!(store.selected_fids(), expected);
    }

    #[test]
    fn switching_to_none_empties(toggles in prop::collection::vec(0..UNIVERSE, 0..30)) {
        let (_upstream, mut store) = multiple_selection(&toggles);
        store.set_node_selection_mode(NodeSelectionMode::None);
        prop_assert!(store.selected_fids().is_empty());
        prop_assert_eq!(store.toggle_node_selected(&fid(0)), None);
        prop_assert!(store.selected_fids().is_empty());
    }

    #[test]
    fn switching_to_multiple_keeps_selection(toggles in prop::collection::vec(0..UNIVERSE, 0..30)) {
        let (_upstream, mut store) = multiple_selection(&toggles);
        let before = store.selected_fids();
        store.set_node_selection_mode(NodeSelectionMode::Multiple);
        prop_assert_eq!(store.selected_fids(), before);
    }

    #[test]
    fn universe_change_clears_selection(toggles in prop::collection::vec(0..UNIVERSE, 1..30)) {
        let (upstream, store) = multiple_selection(&toggles);
        upstream.set_fields(universe());
        prop_assert!(store.selected_field_group().is_empty());
        prop_assert!(store.selected_field().is_none());
    }

    #[test]
    fn exploration_key_forces_mode(keys in prop::collection::vec(any_key(), 0..10)) {
        let (_upstream, mut store) = session();
        for key in keys {
            store.set_exploration_key(key);
        }

        store.set_exploration_key(ExplorationKey::CrossFilter);
        prop_assert_eq!(store.node_selection_mode(), NodeSelectionMode::Multiple);

        store.set_exploration_key(ExplorationKey::Predict);
        prop_assert_eq!(store.node_selection_mode(), NodeSelectionMode::Single);
    }
}

#[test]
fn graph_recompute_clears_selection() {
    let (upstream, mut store) = session();
    store.toggle_node_selected(&fid(2));
    assert_eq!(store.selected_field().map(|f| f.name().to_string()).as_deref(), Some("field 2"));

    assert_eq!(upstream.notify_graph_recomputed(), 1);
    assert!(store.selected_field_group().is_empty());
}

#[test]
fn new_universe_is_adopted() {
    let (upstream, mut store) = session();
    let mut fields = universe();
    fields.push(Field::new("extra", "extra"));
    upstream.set_fields(fields);

    assert_eq!(store.toggle_node_selected(&Fid::from("extra")), Some(true));
    assert_eq!(store.selected_fids(), vec![Fid::from("extra")]);
}

#[test]
fn auto_visualize_keeps_an_explicit_mode() {
    let (_upstream, mut store) = session();
    store.set_exploration_key(ExplorationKey::GraphicWalker);
    assert_eq!(store.node_selection_mode(), NodeSelectionMode::None);

    store.set_exploration_key(ExplorationKey::AutoVisualize);
    assert_eq!(store.node_selection_mode(), NodeSelectionMode::Single);

    store.set_node_selection_mode(NodeSelectionMode::Multiple);
    store.set_exploration_key(ExplorationKey::AutoVisualize);
    assert_eq!(store.node_selection_mode(), NodeSelectionMode::Multiple);
}

#[test]
fn selection_changes_are_announced() {
    let (upstream, mut store) = session();
    let seen: Rc<RefCell<Vec<Vec<Fid>>>> = Rc::default();
    let _subscription = store.selection_changed().connect({
        let seen = Rc::clone(&seen);
        move |fields: &Vec<Field>| {
            seen.borrow_mut()
                .push(fields.iter().map(|f| f.fid().clone()).collect());
        }
    });

    store.toggle_node_selected(&fid(1));
    store.clear_selected();
    upstream.notify_graph_recomputed();

    assert_eq!(*seen.borrow(), vec![vec![fid(1)], vec![], vec![]]);
}

#[test]
fn destroyed_store_ignores_upstream() {
    let (upstream, mut store) = session();
    store.toggle_node_selected(&fid(3));
    store.destroy();
    store.destroy();
    assert!(store.is_destroyed());

    upstream.set_fields(universe());
    upstream.notify_graph_recomputed();
    assert_eq!(store.selected_fids(), vec![fid(3)]);
}
