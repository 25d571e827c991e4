//! Region → line → insurer premium flow, as a node arena plus weighted links.

use serde::Serialize;

use crate::analysis::FirstSeen;
use crate::types::{Record, Stage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

/// A node label tagged with its stage, so equal names in different stages stay distinct.
type StageLabel = (Stage, String);

struct PendingLink {
    source: StageLabel,
    target: StageLabel,
    value: f64,
}

/// Build the premium flow graph for `rows`.
///
/// Every record with a non-zero premium contributes `region → line` and
/// `line → insurer`, weighted by that premium. Links between the same pair of
/// tagged labels are merged by summing. Node indices follow the order in which
/// links are first discovered (source before target), so every node is an
/// endpoint of at least one link.
pub fn build_flow_graph(rows: &[Record], fallback: &str) -> FlowGraph {
    let mut links: FirstSeen<(StageLabel, StageLabel), PendingLink> = FirstSeen::new();
    let mut add = |source: StageLabel, target: StageLabel, value: f64| {
        let key = (source, target);
        let (_, link) = links.entry(&key, || PendingLink {
            source: key.0.clone(),
            target: key.1.clone(),
            value: 0.0,
        });
        link.value += value;
    };

    for r in rows {
        let value = r.prime_or_zero();
        if value == 0.0 {
            continue;
        }
        let tag = |stage: Stage, field: &Option<String>| {
            (stage, field.clone().unwrap_or_else(|| fallback.to_string()))
        };
        let region = tag(Stage::Region, &r.region);
        let ligne = tag(Stage::Line, &r.ligne);
        let assureur = tag(Stage::Insurer, &r.assureur);
        add(region, ligne.clone(), value);
        add(ligne, assureur, value);
    }

    let mut nodes: FirstSeen<StageLabel, FlowNode> = FirstSeen::new();
    let mut graph = FlowGraph::default();
    for pending in links.into_vec() {
        let (source, _) = nodes.entry(&pending.source, || detag(&pending.source));
        let (target, _) = nodes.entry(&pending.target, || detag(&pending.target));
        graph.links.push(FlowLink { source, target, value: pending.value });
    }
    graph.nodes = nodes.into_vec();
    graph
}

fn detag((stage, label): &StageLabel) -> FlowNode {
    FlowNode { name: format!("{}{}", stage.display_prefix(), label) }
}
