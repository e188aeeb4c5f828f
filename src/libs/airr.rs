//! AIRR/changeo contig tables.
//!
//! One row per chain. Only the columns needed to build clone networks are
//! kept; everything else in the table is ignored.

use crate::libs::network::NetworkError;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locus {
    /// IGH, TRB, TRD
    Heavy,
    /// IGK, IGL, TRA, TRG
    Light,
    Other,
}

impl Locus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "IGH" | "TRB" | "TRD" => Locus::Heavy,
            "IGK" | "IGL" | "TRA" | "TRG" => Locus::Light,
            _ => Locus::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contig {
    pub sequence_id: String,
    pub cell_id: String,
    pub locus: Locus,
    /// Gapped nucleotide alignment
    pub sequence_alignment: Option<String>,
    /// Gapped amino acid alignment
    pub sequence_alignment_aa: Option<String>,
    /// Value of the clone column
    pub clone: Option<String>,
    /// Value of the `<clone>_group` column, if the table has one
    pub clone_group: Option<String>,
}

impl Contig {
    /// A contig with the given ids and an aa sequence; handy for building tables in code.
    pub fn new(sequence_id: &str, cell_id: &str, locus: &str, aa: &str, clone: &str) -> Self {
        Self {
            sequence_id: sequence_id.to_string(),
            cell_id: cell_id.to_string(),
            locus: Locus::parse(locus),
            sequence_alignment: None,
            sequence_alignment_aa: non_empty(aa),
            clone: non_empty(clone),
            clone_group: None,
        }
    }

    pub fn with_nt(mut self, nt: &str) -> Self {
        self.sequence_alignment = non_empty(nt);
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.clone_group = non_empty(group);
        self
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() || s == "NA" || s == "nan" {
        None
    } else {
        Some(s.to_string())
    }
}

/// Cell-level summary of a contig table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellMeta {
    /// Distinct clone ids of the cell's contigs, joined by `|`
    pub clone: Option<String>,
    pub clone_group: Option<String>,
}

/// A contig table plus its cell-indexed metadata.
///
/// Cells are kept in order of first appearance in the table, which is also
/// the row/column order of every distance matrix.
#[derive(Debug, Clone, Default)]
pub struct CloneData {
    pub contigs: Vec<Contig>,
    pub metadata: IndexMap<String, CellMeta>,
}

impl CloneData {
    pub fn from_contigs(contigs: Vec<Contig>) -> Self {
        let mut clones: IndexMap<String, (Vec<String>, Vec<String>)> = IndexMap::new();
        for contig in &contigs {
            let entry = clones
                .entry(contig.cell_id.clone())
                .or_insert_with(|| (vec![], vec![]));
            if let Some(c) = &contig.clone {
                if !entry.0.contains(c) {
                    entry.0.push(c.clone());
                }
            }
            if let Some(g) = &contig.clone_group {
                if !entry.1.contains(g) {
                    entry.1.push(g.clone());
                }
            }
        }

        let join = |v: &Vec<String>| {
            if v.is_empty() {
                None
            } else {
                Some(v.join("|"))
            }
        };
        let metadata = clones
            .iter()
            .map(|(cell, (c, g))| {
                (
                    cell.clone(),
                    CellMeta {
                        clone: join(c),
                        clone_group: join(g),
                    },
                )
            })
            .collect();

        Self { contigs, metadata }
    }

    pub fn cells(&self) -> Vec<String> {
        self.metadata.keys().cloned().collect()
    }

    pub fn has_groups(&self) -> bool {
        self.contigs.iter().any(|c| c.clone_group.is_some())
    }
}

/// Input to the network builder: a raw contig table, or data already
/// assembled into cells.
#[derive(Debug, Clone)]
pub enum NetworkInput {
    Table(Vec<Contig>),
    Assembled(CloneData),
}

impl NetworkInput {
    pub fn into_clone_data(self) -> CloneData {
        match self {
            NetworkInput::Table(contigs) => CloneData::from_contigs(contigs),
            NetworkInput::Assembled(data) => data,
        }
    }
}

/// Reads a tab-separated AIRR/changeo table.
///
/// `sequence_id`, `cell_id`, `locus` and `clone_key` are required columns.
/// `<clone_key>_group`, `sequence_alignment` and `sequence_alignment_aa` are
/// optional.
pub fn load_contigs(infile: &str, clone_key: &str) -> anyhow::Result<Vec<Contig>> {
    let reader = crate::reader(infile)?;
    let mut tsv = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);

    let headers = tsv.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| column(name).ok_or_else(|| NetworkError::MissingColumn(name.to_string()));

    let idx_seq = required("sequence_id")?;
    let idx_cell = required("cell_id")?;
    let idx_locus = required("locus")?;
    let idx_clone = required(clone_key)?;
    let idx_group = column(&format!("{}_group", clone_key));
    let idx_nt = column("sequence_alignment");
    let idx_aa = column("sequence_alignment_aa");

    let mut contigs = vec![];
    for (i, result) in tsv.records().enumerate() {
        let record = result?;
        let line = i + 2;
        let field = |idx: usize| get_field(&record, idx, line);
        let optional = |idx: Option<usize>| idx.and_then(|i| record.get(i)).and_then(non_empty);

        let cell_id = field(idx_cell)?.trim();
        if cell_id.is_empty() {
            return Err(NetworkError::ParseError {
                line,
                message: "empty cell_id".to_string(),
            }
            .into());
        }

        contigs.push(Contig {
            sequence_id: field(idx_seq)?.trim().to_string(),
            cell_id: cell_id.to_string(),
            locus: Locus::parse(field(idx_locus)?),
            sequence_alignment: optional(idx_nt),
            sequence_alignment_aa: optional(idx_aa),
            clone: non_empty(field(idx_clone)?),
            clone_group: optional(idx_group),
        });
    }
    tracing::info!("Loaded {} contigs from {}", contigs.len(), infile);

    Ok(contigs)
}

fn get_field(record: &csv::StringRecord, idx: usize, line: usize) -> Result<&str, NetworkError> {
    record.get(idx).ok_or_else(|| NetworkError::ParseError {
        line,
        message: format!("expected at least {} fields", idx + 1),
    })
}
