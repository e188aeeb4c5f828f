use crate::libs::network::distance::DistanceMatrix;
use indexmap::IndexMap;
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Unions spanning-tree edges with fallback edges.
///
/// Edges are `(source, target)` cell indices and are keyed by their
/// unordered pair. A spanning-tree edge keeps its orientation when the
/// fallback also has the pair. Self-loops are dropped. Every weight is read
/// from `total`.
///
/// Clusters of single cells contribute nothing; with no edge at all the
/// result is simply empty.
pub fn merge_edges(
    mst: &[(usize, usize)],
    fallback: &[(usize, usize)],
    total: &DistanceMatrix,
    cells: &[String],
) -> Vec<Edge> {
    if mst.is_empty() && fallback.is_empty() {
        tracing::debug!("No edges in any cluster");
        return vec![];
    }

    let mut merged: IndexMap<(usize, usize), (usize, usize)> = IndexMap::new();
    for &(s, t) in mst.iter().chain(fallback.iter()) {
        if s == t {
            continue;
        }
        let key = (s.min(t), s.max(t));
        if !merged.contains_key(&key) {
            merged.insert(key, (s, t));
        }
    }

    merged
        .values()
        .map(|&(s, t)| Edge {
            source: cells[s].clone(),
            target: cells[t].clone(),
            weight: total.get(s, t),
        })
        .collect()
}

pub fn write_edges(writer: &mut dyn Write, edges: &[Edge]) -> anyhow::Result<()> {
    writer.write_fmt(format_args!("source\ttarget\tweight\n"))?;
    for e in edges {
        writer.write_fmt(format_args!("{}\t{}\t{}\n", e.source, e.target, e.weight))?;
    }
    Ok(())
}

/// Reads `source\ttarget[\tweight]` lines. A header line starting with
/// `source` is skipped; a missing weight is 1.
pub fn read_edges(infile: &str) -> anyhow::Result<Vec<Edge>> {
    let reader = crate::reader(infile)?;
    let mut tsv = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut edges = vec![];
    for (i, result) in tsv.records().enumerate() {
        let record = result?;
        if i == 0 && record.get(0) == Some("source") {
            continue;
        }
        if record.len() < 2 {
            return Err(anyhow::anyhow!(
                "Line {}: expected at least 2 fields, got {}",
                i + 1,
                record.len()
            ));
        }
        let weight = match record.get(2) {
            Some(w) if !w.is_empty() => w.parse::<f64>()?,
            _ => 1.0,
        };
        edges.push(Edge {
            source: record[0].to_string(),
            target: record[1].to_string(),
            weight,
        });
    }

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::network::distance::pairwise;

    fn cells(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{}", i)).collect()
    }

    #[test]
    fn test_merge_edges() {
        let total = pairwise(&[
            Some("AAA".to_string()),
            Some("AAB".to_string()),
            Some("ABB".to_string()),
            Some("CCC".to_string()),
        ]);
        // tree edge (2, 1) reversed against the fallback (1, 2)
        let mst = vec![(0, 1), (2, 1)];
        let fallback = vec![(0, 1), (0, 2), (1, 2), (3, 3)];
        let edges = merge_edges(&mst, &fallback, &total, &cells(4));

        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0], Edge { source: "c0".into(), target: "c1".into(), weight: 1.0 });
        assert_eq!(edges[1], Edge { source: "c2".into(), target: "c1".into(), weight: 1.0 });
        assert_eq!(edges[2], Edge { source: "c0".into(), target: "c2".into(), weight: 2.0 });

        let mut pairs: Vec<_> = edges
            .iter()
            .map(|e| {
                let mut p = [e.source.clone(), e.target.clone()];
                p.sort();
                p
            })
            .collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), edges.len());
        assert!(edges.iter().all(|e| e.source != e.target));
    }

    #[test]
    fn test_merge_edges_empty() {
        let total = DistanceMatrix::new(3);
        assert!(merge_edges(&[], &[], &total, &cells(3)).is_empty());
    }

    #[test]
    fn test_write_edges() {
        let edges = vec![Edge { source: "a".into(), target: "b".into(), weight: 1.5 }];
        let mut buf: Vec<u8> = vec![];
        write_edges(&mut buf, &edges).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "source\ttarget\tweight\na\tb\t1.5\n");
    }
}
