use std::collections::BTreeMap;

use ruc::graph::builder::{uniform_candidate, GraphBuilder, WeightAttrSpec};
use ruc::graph::CandidateConfig;
use ruc::types::{AttrKey, BitSetting};
use ruc::RucError;

#[test]
fn rejects_empty_candidate_set() {
    let mut gb = GraphBuilder::new();
    let err = gb.add_node("input", 10, vec![], vec![]).unwrap_err();
    assert!(matches!(err, RucError::InvariantViolation(_)));
}

#[test]
fn rejects_more_than_one_kernel_attribute() {
    let mut gb = GraphBuilder::new();
    let a = AttrKey::named("a");
    let b = AttrKey::named("b");
    let candidate = uniform_candidate(&[(a.clone(), 8), (b.clone(), 8)], 8);
    let err = gb
        .add_node(
            "conv2d",
            10,
            vec![WeightAttrSpec::kernel(a, 4), WeightAttrSpec::kernel(b, 4)],
            vec![candidate],
        )
        .unwrap_err();
    assert!(matches!(err, RucError::InvariantViolation(_)));
}

#[test]
fn rejects_candidate_missing_a_declared_attribute() {
    let mut gb = GraphBuilder::new();
    let kernel = AttrKey::named("kernel");
    let candidate = CandidateConfig { weights: BTreeMap::new(), activation: BitSetting::new(8, true) };
    let err = gb
        .add_node("conv2d", 10, vec![WeightAttrSpec::kernel(kernel, 4)], vec![candidate])
        .unwrap_err();
    assert!(matches!(err, RucError::InvariantViolation(_)));
}

#[test]
fn rejects_duplicate_edge_sink_port() {
    let mut gb = GraphBuilder::new();
    let a = gb.add_node("input", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    let b = gb.add_node("input", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    let c = gb.add_node("add", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    gb.connect(a, c, 0).unwrap();
    let err = gb.connect(b, c, 0).unwrap_err();
    assert!(matches!(err, RucError::InvariantViolation(_)));
}

#[test]
fn derives_configurable_flag_from_candidate_set() {
    let mut gb = GraphBuilder::new();
    let kernel = AttrKey::named("kernel");

    // A single enabled candidate: quantization enabled, not configurable.
    let single = uniform_candidate(&[(kernel.clone(), 8)], 8);
    let fixed =
        gb.add_node("conv2d", 10, vec![WeightAttrSpec::kernel(kernel.clone(), 4)], vec![single]).unwrap();

    // Two distinct enabled bit-widths: configurable.
    let mut w4 = BTreeMap::new();
    w4.insert(kernel.clone(), BitSetting::new(4, true));
    let mut w8 = BTreeMap::new();
    w8.insert(kernel.clone(), BitSetting::new(8, true));
    let mixed_candidates = vec![
        CandidateConfig { weights: w4, activation: BitSetting::new(8, true) },
        CandidateConfig { weights: w8, activation: BitSetting::new(8, true) },
    ];
    let mixed =
        gb.add_node("conv2d", 10, vec![WeightAttrSpec::kernel(kernel.clone(), 4)], mixed_candidates).unwrap();

    let graph = gb.build();
    let fixed_attr = graph.node(fixed).unwrap().weight_attr(&kernel).unwrap();
    assert!(fixed_attr.is_quantization_enabled);
    assert!(!fixed_attr.is_configurable);

    let mixed_attr = graph.node(mixed).unwrap().weight_attr(&kernel).unwrap();
    assert!(mixed_attr.is_quantization_enabled);
    assert!(mixed_attr.is_configurable);
}

#[test]
fn mark_reused_flags_node_and_group() {
    use ruc::types::ReuseGroupId;

    let mut gb = GraphBuilder::new();
    let n = gb.add_node("conv2d", 10, vec![], vec![uniform_candidate(&[], 8)]).unwrap();
    gb.mark_reused(n, ReuseGroupId(1)).unwrap();
    let graph = gb.build();
    let node = graph.node(n).unwrap();
    assert!(node.reuse);
    assert_eq!(node.reuse_group, Some(ReuseGroupId(1)));
}
