use crate::libs::airr::{CellMeta, CloneData};
use indexmap::IndexMap;

/// Which cell attribute defines a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterKey {
    #[default]
    Clone,
    /// The `<clone>_group` column, or a prefix of the clone id
    Group,
}

/// How a clone group is cut out of a clone id: field `index` after
/// splitting at `sep`. `A_1` and `A_2` both belong to group `A` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClonesSep {
    pub index: usize,
    pub sep: String,
}

impl Default for ClonesSep {
    fn default() -> Self {
        Self {
            index: 0,
            sep: "_".to_string(),
        }
    }
}

impl ClonesSep {
    /// Parses `index,sep`, e.g. `0,_`
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let (index, sep) = s
            .split_once(',')
            .ok_or_else(|| anyhow::anyhow!("Expected `index,separator`, got {}", s))?;
        if sep.is_empty() {
            return Err(anyhow::anyhow!("Empty clone separator in {}", s));
        }
        Ok(Self {
            index: index.trim().parse()?,
            sep: sep.to_string(),
        })
    }

    pub fn group_of(&self, clone: &str) -> String {
        let mut groups: Vec<&str> = vec![];
        for part in clone.split('|') {
            let g = part.split(self.sep.as_str()).nth(self.index).unwrap_or(part);
            if !groups.contains(&g) {
                groups.push(g);
            }
        }
        groups.join("|")
    }
}

pub fn cluster_of(meta: &CellMeta, key: ClusterKey, sep: &ClonesSep) -> Option<String> {
    match key {
        ClusterKey::Clone => meta.clone.clone(),
        ClusterKey::Group => meta
            .clone_group
            .clone()
            .or_else(|| meta.clone.as_deref().map(|c| sep.group_of(c))),
    }
}

/// Cluster key to member cell indices, both in cell order. Cells without a
/// clone id join no cluster.
pub fn clusters(data: &CloneData, key: ClusterKey, sep: &ClonesSep) -> IndexMap<String, Vec<usize>> {
    let mut members: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (i, meta) in data.metadata.values().enumerate() {
        let Some(cx) = cluster_of(meta, key, sep) else {
            continue;
        };
        match members.get_mut(&cx) {
            Some(m) => m.push(i),
            None => {
                members.insert(cx, vec![i]);
            }
        }
    }
    members
}

/// Drops clusters with fewer than two members
pub fn retained(clusters: IndexMap<String, Vec<usize>>) -> IndexMap<String, Vec<usize>> {
    clusters.into_iter().filter(|(_, m)| m.len() > 1).collect()
}
