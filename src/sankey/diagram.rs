use serde::Serialize;
use serde_json::json;

// ---------------------------------------------------------------------------
// Diagram description handed to renderers
// ---------------------------------------------------------------------------

/// A weighted link between two nodes, referenced by label index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Links as parallel arrays, the shape chart widgets usually take.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkArrays {
    pub source: Vec<usize>,
    pub target: Vec<usize>,
    pub value: Vec<f64>,
}

/// Immutable result of an aggregation: node labels, node colours and the
/// edge list, ordered by `(source, target)` with no zero-value edges.
///
/// Node indices are laid out stage after stage: `0` is the root, then the
/// level-1 nodes, level-2 nodes and level-3 nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyDiagram {
    labels: Vec<String>,
    colors: Vec<String>,
    edges: Vec<Edge>,
    stage_sizes: [usize; 4],
}

impl SankeyDiagram {
    pub(crate) fn new(
        labels: Vec<String>,
        colors: Vec<String>,
        edges: Vec<Edge>,
        stage_sizes: [usize; 4],
    ) -> Self {
        debug_assert_eq!(labels.len(), colors.len());
        debug_assert_eq!(labels.len(), stage_sizes.iter().sum::<usize>());
        SankeyDiagram {
            labels,
            colors,
            edges,
            stage_sizes,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Node counts per stage: `[1, D1, D2, D3]`.
    pub fn stage_sizes(&self) -> [usize; 4] {
        self.stage_sizes
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Stage (0..=3) a node index belongs to.
    pub fn stage_of(&self, node: usize) -> usize {
        let mut end = 0;
        for (stage, size) in self.stage_sizes.iter().enumerate() {
            end += size;
            if node < end {
                return stage;
            }
        }
        self.stage_sizes.len() - 1
    }

    /// Split the edge list into parallel `source` / `target` / `value` arrays.
    pub fn links(&self) -> LinkArrays {
        let mut links = LinkArrays::default();
        for e in &self.edges {
            links.source.push(e.source);
            links.target.push(e.target);
            links.value.push(e.value);
        }
        links
    }

    /// A Plotly `sankey` trace describing this diagram.
    pub fn to_plotly_json(&self) -> serde_json::Value {
        let links = self.links();
        json!({
            "type": "sankey",
            "node": {
                "pad": 15,
                "thickness": 20,
                "line": { "color": "black", "width": 0.5 },
                "label": self.labels,
                "color": self.colors,
            },
            "link": {
                "source": links.source,
                "target": links.target,
                "value": links.value,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SankeyDiagram {
        SankeyDiagram::new(
            vec!["Total".into(), "A".into(), "X".into(), "P".into()],
            vec!["#1".into(), "#2".into(), "#3".into(), "#4".into()],
            vec![
                Edge { source: 0, target: 1, value: 4.0 },
                Edge { source: 1, target: 2, value: 4.0 },
                Edge { source: 2, target: 3, value: 1.5 },
            ],
            [1, 1, 1, 1],
        )
    }

    #[test]
    fn stage_lookup() {
        let d = SankeyDiagram::new(
            vec!["T".into(), "a".into(), "b".into(), "x".into(), "p".into()],
            vec![String::new(); 5],
            Vec::new(),
            [1, 2, 1, 1],
        );
        let stages: Vec<usize> = (0..d.node_count()).map(|n| d.stage_of(n)).collect();
        assert_eq!(stages, vec![0, 1, 1, 2, 3]);
    }

    #[test]
    fn links_are_parallel_arrays() {
        let links = small().links();
        assert_eq!(links.source, vec![0, 1, 2]);
        assert_eq!(links.target, vec![1, 2, 3]);
        assert_eq!(links.value, vec![4.0, 4.0, 1.5]);
    }

    #[test]
    fn plotly_trace_shape() {
        let trace = small().to_plotly_json();
        assert_eq!(trace["type"], "sankey");
        assert_eq!(trace["node"]["label"][0], "Total");
        assert_eq!(trace["node"]["color"][3], "#4");
        assert_eq!(trace["link"]["target"][2], 3);
        assert_eq!(trace["link"]["value"][2], 1.5);
    }
}
