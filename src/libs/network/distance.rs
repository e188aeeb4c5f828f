//! All-vs-all edit distances per sequence layer, and their combination into
//! one total matrix.

use crate::libs::network::seqs::Layers;
use crate::libs::network::NetworkError;
use indexmap::IndexMap;

/// Dense, square, symmetric distance matrix with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    /// Sets both `(i, j)` and `(j, i)`
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.size + j] = value;
        self.data[j * self.size + i] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    /// The square sub-matrix over `indices`, in the given order
    pub fn sub_matrix(&self, indices: &[usize]) -> DistanceMatrix {
        let mut sub = DistanceMatrix::new(indices.len());
        for (a, &i) in indices.iter().enumerate() {
            for (b, &j) in indices.iter().enumerate() {
                sub.data[a * sub.size + b] = self.get(i, j);
            }
        }
        sub
    }

    /// `self += factor * other`
    pub fn add_scaled(&mut self, other: &DistanceMatrix, factor: f64) {
        for (x, y) in self.data.iter_mut().zip(other.data.iter()) {
            *x += factor * y;
        }
    }
}

/// Unit cost Levenshtein distance over characters
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Distance between two possibly absent sequences.
///
/// Two absent values are identical. An absent value against a present one
/// costs the full length of the present sequence.
pub fn seq_distance(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (None, None) => 0.0,
        (Some(s), None) | (None, Some(s)) => s.chars().count() as f64,
        (Some(x), Some(y)) => levenshtein(x, y) as f64,
    }
}

pub fn pairwise(values: &[Option<String>]) -> DistanceMatrix {
    let n = values.len();
    let mut mat = DistanceMatrix::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            mat.set(i, j, seq_distance(values[i].as_deref(), values[j].as_deref()));
        }
    }
    mat
}

/// One matrix per layer, keyed by layer name. Layers without any sequence
/// are skipped.
pub fn layer_distances(layers: &Layers) -> IndexMap<String, DistanceMatrix> {
    let mut dmat = IndexMap::new();
    for layer in &layers.layers {
        if layer.is_empty() {
            tracing::debug!("Layer {} has no sequences, skipped", layer.name);
            continue;
        }
        tracing::debug!("Calculating distances for layer {}", layer.name);
        dmat.insert(layer.name.clone(), pairwise(&layer.values));
    }
    dmat
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    /// Plain sum of all layers
    #[default]
    Simple,
    /// Weighted sum; even `1/n` weights unless given
    Weighted,
}

impl DistanceMode {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "simple" => Ok(DistanceMode::Simple),
            "weighted" => Ok(DistanceMode::Weighted),
            _ => Err(anyhow::anyhow!("Unknown distance mode: {}", s)),
        }
    }
}

/// Combines the per-layer matrices into the total distance matrix.
///
/// `size` is the number of cells; with no layer at all the total is a zero
/// matrix of that size.
pub fn combine(
    size: usize,
    matrices: &[&DistanceMatrix],
    mode: DistanceMode,
    weights: Option<&[f64]>,
) -> Result<DistanceMatrix, NetworkError> {
    let n = matrices.len();
    let factors: Vec<f64> = match (mode, weights) {
        (DistanceMode::Simple, _) => vec![1.0; n],
        (DistanceMode::Weighted, None) => vec![1.0 / n as f64; n],
        (DistanceMode::Weighted, Some(w)) => {
            if w.len() != n {
                return Err(NetworkError::WeightsLength {
                    expected: n,
                    found: w.len(),
                });
            }
            if let Some(&bad) = w.iter().find(|x| !x.is_finite() || **x < 0.0) {
                return Err(NetworkError::InvalidWeight(bad));
            }
            w.to_vec()
        }
    };

    let mut total = DistanceMatrix::new(size);
    for (mat, factor) in matrices.iter().zip(factors) {
        total.add_scaled(mat, factor);
    }
    Ok(total)
}

/// Compressed sparse row encoding of a distance matrix. Zeros are not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    pub size: usize,
    pub indptr: Vec<usize>,
    pub indices: Vec<usize>,
    pub data: Vec<f64>,
}

impl SparseMatrix {
    pub fn from_dense(mat: &DistanceMatrix) -> Self {
        let mut indptr = vec![0];
        let mut indices = vec![];
        let mut data = vec![];
        for i in 0..mat.size() {
            for (j, &v) in mat.row(i).iter().enumerate() {
                if v != 0.0 {
                    indices.push(j);
                    data.push(v);
                }
            }
            indptr.push(indices.len());
        }
        Self {
            size: mat.size(),
            indptr,
            indices,
            data,
        }
    }

    pub fn to_dense(&self) -> DistanceMatrix {
        let mut mat = DistanceMatrix::new(self.size);
        for i in 0..self.size {
            for p in self.indptr[i]..self.indptr[i + 1] {
                mat.data[i * self.size + self.indices[p]] = self.data[p];
            }
        }
        mat
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        let row = &self.indices[self.indptr[i]..self.indptr[i + 1]];
        match row.binary_search(&j) {
            Ok(p) => self.data[self.indptr[i] + p],
            Err(_) => 0.0,
        }
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.data.len()
    }
}
