//! Complexity roll-up and per-file health scoring

use crate::graph::GraphBuilder;
use crate::model::{NodeType, Relation};
use serde::{Deserialize, Serialize};

/// Linear penalty weights for the file health score.
///
/// Changing any weight is a new scoring version; graphs scored under different
/// versions are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthPolicy {
    pub version: u32,
    /// Penalty per unit of file complexity.
    pub complexity_weight: f64,
    /// Penalty per outgoing import edge.
    pub import_weight: f64,
    /// Lines of code per point of penalty.
    pub loc_divisor: f64,
}

impl HealthPolicy {
    pub const V1: HealthPolicy = HealthPolicy {
        version: 1,
        complexity_weight: 6.0,
        import_weight: 8.0,
        loc_divisor: 200.0,
    };

    /// Score in `[0, 100]`, rounding half up.
    pub fn score(&self, complexity: u32, import_count: usize, lines_of_code: u64) -> u8 {
        let raw = 100.0
            - complexity as f64 * self.complexity_weight
            - import_count as f64 * self.import_weight
            - lines_of_code as f64 / self.loc_divisor;
        (raw + 0.5).floor().clamp(0.0, 100.0) as u8
    }
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self::V1
    }
}

/// Add every function node's complexity to the file node that owns it.
pub fn roll_up_complexity(builder: &mut GraphBuilder) {
    let contributions: Vec<(String, u32)> = builder
        .nodes()
        .filter(|n| n.node_type == NodeType::Function)
        .map(|n| (n.owning_file.clone(), n.complexity))
        .collect();

    for (file, complexity) in contributions {
        match builder.node_mut(&file) {
            Some(node) if node.node_type == NodeType::File => {
                node.complexity = node.complexity.saturating_add(complexity);
            }
            _ => tracing::debug!("No file node {} to own function complexity", file),
        }
    }
}

/// Compute the health score of every file node. Run after [`roll_up_complexity`].
pub fn score_health(builder: &mut GraphBuilder, policy: &HealthPolicy) {
    let scores: Vec<(String, u8)> = builder
        .nodes()
        .filter(|n| n.node_type == NodeType::File)
        .map(|n| {
            let imports = builder.out_degree(&n.id, Relation::Import);
            (n.id.clone(), policy.score(n.complexity, imports, n.lines_of_code))
        })
        .collect();

    for (id, score) in scores {
        if let Some(node) = builder.node_mut(&id) {
            node.health_score = Some(score);
        }
    }
}
