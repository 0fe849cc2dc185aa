use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Average path length of an unsuccessful BST search over n points:
// c(n) = 2·H(n−1) − 2(n−1)/n, with H(i) ≈ ln(i) + γ.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Scores above this offset vote "outlier". Matches the automatic
/// contamination estimate of the reference ensemble.
pub const OUTLIER_OFFSET: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub trees: usize,
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            trees: 200,
            sample_size: 256,
            seed: 42,
        }
    }
}

#[derive(Debug)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

/// Isolation forest over dense feature rows. Fitting consumes a batch
/// once; scoring is read-only, so a fitted forest is safe to share.
#[derive(Debug)]
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit on a non-empty batch. Each tree isolates a seeded random
    /// subsample of at most `sample_size` rows, splitting on a random
    /// feature at a random threshold up to a height of ceil(log2(psi)).
    pub fn fit(data: &[Vec<f64>], config: &ForestConfig) -> IsolationForest {
        let n = data.len();
        let psi = config.sample_size.min(n).max(1);
        let height_limit = (psi as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut trees = Vec::with_capacity(config.trees);
        for _ in 0..config.trees {
            let indices: Vec<usize> = if psi < n {
                rand::seq::index::sample(&mut rng, n, psi).into_vec()
            } else {
                (0..n).collect()
            };
            trees.push(build_tree(data, &indices, 0, height_limit, &mut rng));
        }
        IsolationForest {
            trees,
            sample_size: psi,
        }
    }

    /// Anomaly measure in (0, 1]: 2^(−E[h(x)]/c(psi)). Higher = easier
    /// to isolate = more anomalous. This is already the negation of the
    /// raw path-length convention, so callers never re-invert.
    pub fn score(&self, point: &[f64]) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| path_length(tree, point, 0))
            .sum();
        let mean_path = total / self.trees.len() as f64;
        let denom = average_path_length(self.sample_size);
        // c(1) = 0; clamp so a single-row fit stays defined.
        let denom = if denom > 0.0 { denom } else { 1.0 };
        2f64.powf(-mean_path / denom)
    }

    pub fn is_outlier(&self, score: f64) -> bool {
        score > OUTLIER_OFFSET
    }
}

fn build_tree(
    data: &[Vec<f64>],
    indices: &[usize],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // Only features with spread in this node are splittable.
    let dims = data[indices[0]].len();
    let mut candidates: Vec<(usize, f64, f64)> = Vec::new();
    for feature in 0..dims {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &i in indices {
            let v = data[i][feature];
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if hi > lo {
            candidates.push((feature, lo, hi));
        }
    }
    if candidates.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(lo..hi);
    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| data[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(data, &left_idx, depth + 1, height_limit, rng)),
        right: Box::new(build_tree(data, &right_idx, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &Node, point: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if point[*feature] < *threshold {
                path_length(left, point, depth + 1)
            } else {
                path_length(right, point, depth + 1)
            }
        }
    }
}

pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let nf = n as f64;
            2.0 * ((nf - 1.0).ln() + EULER_GAMMA) - 2.0 * (nf - 1.0) / nf
        }
    }
}
