use crate::libs::network::distance::SparseMatrix;
use crate::libs::network::NetworkError;
use indexmap::IndexMap;

/// Weighted degree of every cell.
///
/// All layer matrices are summed into one adjacency; a cell's degree is the
/// sum of its distances to every other cell.
pub fn clone_degree(
    cells: &[String],
    distance: &IndexMap<String, SparseMatrix>,
) -> Result<IndexMap<String, f64>, NetworkError> {
    if distance.is_empty() {
        return Err(NetworkError::MissingDistance);
    }

    let mut degree = vec![0.0; cells.len()];
    for (layer, mat) in distance {
        tracing::debug!("Adding layer {} to clone degree", layer);
        for (i, d) in degree.iter_mut().enumerate().take(mat.size) {
            for p in mat.indptr[i]..mat.indptr[i + 1] {
                if mat.indices[p] != i {
                    *d += mat.data[p];
                }
            }
        }
    }

    Ok(cells.iter().cloned().zip(degree).collect())
}

pub fn write_degree(writer: &mut dyn std::io::Write, degree: &IndexMap<String, f64>) -> anyhow::Result<()> {
    writer.write_fmt(format_args!("cell_id\tclone_degree\n"))?;
    for (cell, d) in degree {
        writer.write_fmt(format_args!("{}\t{}\n", cell, d))?;
    }
    Ok(())
}
