use ruc::graph::builder::{uniform_candidate, GraphBuilder};
use ruc::maxcut::compute_cuts;

#[test]
fn empty_graph_has_no_cuts() {
    let graph = GraphBuilder::new().build();
    let cuts = compute_cuts(&graph).unwrap();
    assert!(cuts.is_empty());
}

#[test]
fn single_node_graph_has_one_cut() {
    // With no consumer, the node's tensor is live only at its own producer
    // step; the exit sentinel has no consumer step to extend the range into.
    let mut gb = GraphBuilder::new();
    gb.add_node("input", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    let graph = gb.build();

    let cuts = compute_cuts(&graph).unwrap();
    assert_eq!(cuts.len(), 1);
    assert!(cuts.iter().all(|cut| cut.live.len() == 1));
}

#[test]
fn diamond_graph_has_a_cut_with_two_simultaneously_live_tensors() {
    // a -> b, a -> c, b and c both feed d.
    let mut gb = GraphBuilder::new();
    let a = gb.add_node("input", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    let b = gb.add_node("relu", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    let c = gb.add_node("sigmoid", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    let d = gb.add_node("add", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    gb.connect(a, b, 0).unwrap();
    gb.connect(a, c, 0).unwrap();
    gb.connect(b, d, 0).unwrap();
    gb.connect(c, d, 1).unwrap();
    let graph = gb.build();

    let cuts = compute_cuts(&graph).unwrap();
    assert!(cuts.iter().any(|cut| cut.live.len() >= 2), "no cut found with >= 2 live tensors");
}

#[test]
fn cuts_are_sorted_ascending_by_step_and_live_set_is_sorted_by_node_id() {
    let mut gb = GraphBuilder::new();
    let a = gb.add_node("input", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    let b = gb.add_node("relu", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    gb.connect(a, b, 0).unwrap();
    let graph = gb.build();

    let cuts = compute_cuts(&graph).unwrap();
    for window in cuts.windows(2) {
        assert!(window[0].step < window[1].step);
    }
    for cut in &cuts {
        let mut sorted = cut.live.clone();
        sorted.sort_unstable();
        assert_eq!(cut.live, sorted);
    }
}

#[test]
fn peak_equals_max_sum_over_cuts() {
    // P4: no cut's live-set byte sum exceeds the declared peak, and at least
    // one cut achieves it. Exercised here at the tensor-count level since
    // compute_cuts itself doesn't know about bit-widths.
    let mut gb = GraphBuilder::new();
    let a = gb.add_node("input", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    let b = gb.add_node("relu", 20, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    let c = gb.add_node("relu", 30, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    gb.connect(a, b, 0).unwrap();
    gb.connect(b, c, 0).unwrap();
    let graph = gb.build();

    let cuts = compute_cuts(&graph).unwrap();
    let sizes = [10u64, 20, 30];
    let cut_sums: Vec<u64> = cuts.iter().map(|cut| cut.live.iter().map(|n| sizes[n.0]).sum()).collect();
    let peak = *cut_sums.iter().max().unwrap();
    assert!(cut_sums.iter().all(|&s| s <= peak));
    assert!(cut_sums.contains(&peak));
}
