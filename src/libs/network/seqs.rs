use crate::libs::airr::{CloneData, Locus};
use crate::libs::network::NetworkError;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeqType {
    #[default]
    Aa,
    Nt,
}

impl SeqType {
    /// `None` falls back to amino acids
    pub fn parse(s: Option<&str>) -> Result<Self, NetworkError> {
        match s {
            None | Some("aa") => Ok(SeqType::Aa),
            Some("nt") => Ok(SeqType::Nt),
            Some(other) => Err(NetworkError::InvalidSeqType(other.to_string())),
        }
    }
}

/// One sequence slot across all cells; `None` marks an absent chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub values: Vec<Option<String>>,
}

impl Layer {
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.is_none())
    }
}

/// Per-cell sequences split into `heavy`, `light_0`, `light_1`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct Layers {
    pub cells: Vec<String>,
    pub layers: Vec<Layer>,
}

/// Splits the contigs of every cell into the heavy layer and as many light
/// layers as the cell with the most light chains needs.
///
/// Light chains of a cell take slots in `sequence_id` order. At least one
/// light layer is always present, possibly all absent.
pub fn extract_layers(data: &CloneData, seq_type: SeqType) -> Layers {
    let cells = data.cells();
    let index: IndexMap<&str, usize> = cells
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut heavy: Vec<Option<String>> = vec![None; cells.len()];
    let mut lights: Vec<Vec<(&str, &str)>> = vec![vec![]; cells.len()];

    for contig in &data.contigs {
        let seq = match seq_type {
            SeqType::Aa => contig.sequence_alignment_aa.as_deref(),
            SeqType::Nt => contig.sequence_alignment.as_deref(),
        };
        let (Some(seq), Some(&i)) = (seq, index.get(contig.cell_id.as_str())) else {
            continue;
        };

        match contig.locus {
            Locus::Heavy => {
                if heavy[i].is_none() {
                    heavy[i] = Some(seq.to_string());
                }
            }
            Locus::Light => lights[i].push((contig.sequence_id.as_str(), seq)),
            Locus::Other => {}
        }
    }

    for l in lights.iter_mut() {
        l.sort_by(|a, b| a.0.cmp(b.0));
    }
    let n_light = lights.iter().map(|l| l.len()).max().unwrap_or(0).max(1);

    let mut layers = vec![Layer {
        name: "heavy".to_string(),
        values: heavy,
    }];
    for slot in 0..n_light {
        let values = lights
            .iter()
            .map(|l| l.get(slot).map(|(_, s)| s.to_string()))
            .collect();
        layers.push(Layer {
            name: format!("light_{}", slot),
            values,
        });
    }

    Layers { cells, layers }
}
