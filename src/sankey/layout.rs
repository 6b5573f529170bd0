use serde::{Deserialize, Serialize};

use super::diagram::SankeyDiagram;

const STAGES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Horizontal size of a node bar.
    pub node_width: f32,
    /// Vertical gap between nodes of the same stage.
    pub node_padding: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            node_width: 20.0,
            node_padding: 15.0,
        }
    }
}

/// A node bar in layout coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRect {
    pub node: usize,
    pub stage: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Larger of inflow and outflow.
    pub throughput: f64,
}

impl NodeRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A link band leaving the right side of its source bar at `y0` and
/// entering the left side of its target bar at `y1` (both top edges).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkBand {
    pub source: usize,
    pub target: usize,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub thickness: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SankeyLayout {
    pub nodes: Vec<NodeRect>,
    pub links: Vec<LinkBand>,
}

impl SankeyLayout {
    /// Node under a point, if any.
    pub fn node_at(&self, x: f32, y: f32) -> Option<usize> {
        self.nodes.iter().find(|n| n.contains(x, y)).map(|n| n.node)
    }
}

/// Place nodes in one column per stage and route every edge as a band.
///
/// Heights are proportional to throughput with one scale shared by all
/// stages, chosen so the fullest column fits `height`.  Nodes keep label
/// order top to bottom and each column is centred vertically.  Bands are
/// stacked on their source and target in edge order.
pub fn compute(diagram: &SankeyDiagram, width: f32, height: f32, options: &LayoutOptions) -> SankeyLayout {
    let n = diagram.node_count();
    let mut inflow = vec![0.0f64; n];
    let mut outflow = vec![0.0f64; n];
    for e in diagram.edges() {
        outflow[e.source] += e.value;
        inflow[e.target] += e.value;
    }
    let throughput: Vec<f64> = inflow.iter().zip(&outflow).map(|(i, o)| i.max(*o)).collect();

    let sizes = diagram.stage_sizes();
    let mut starts = [0usize; STAGES];
    for s in 1..STAGES {
        starts[s] = starts[s - 1] + sizes[s - 1];
    }
    let stage_nodes = |s: usize| starts[s]..starts[s] + sizes[s];

    let mut scale = f64::INFINITY;
    for s in 0..STAGES {
        let total: f64 = stage_nodes(s).map(|i| throughput[i]).sum();
        if total > 0.0 {
            let gaps = options.node_padding * sizes[s].saturating_sub(1) as f32;
            let room = (height - gaps).max(0.0) as f64;
            scale = scale.min(room / total);
        }
    }
    if !scale.is_finite() {
        scale = 0.0;
    }

    let node_width = options.node_width.min(width.max(0.0));
    let column_step = (width - node_width).max(0.0) / (STAGES - 1) as f32;

    let mut nodes = Vec::with_capacity(n);
    for s in 0..STAGES {
        let x = s as f32 * column_step;
        let heights: Vec<f32> = stage_nodes(s).map(|i| (throughput[i] * scale) as f32).collect();
        let used = heights.iter().sum::<f32>() + options.node_padding * heights.len().saturating_sub(1) as f32;
        let mut y = ((height - used) / 2.0).max(0.0);
        for (i, h) in stage_nodes(s).zip(heights) {
            nodes.push(NodeRect {
                node: i,
                stage: s,
                x,
                y,
                width: node_width,
                height: h,
                throughput: throughput[i],
            });
            y += h + options.node_padding;
        }
    }

    let mut out_offset = vec![0.0f32; n];
    let mut in_offset = vec![0.0f32; n];
    let links = diagram
        .edges()
        .iter()
        .map(|e| {
            let src = &nodes[e.source];
            let dst = &nodes[e.target];
            let thickness = (e.value * scale) as f32;
            let band = LinkBand {
                source: e.source,
                target: e.target,
                x0: src.x + src.width,
                y0: src.y + out_offset[e.source],
                x1: dst.x,
                y1: dst.y + in_offset[e.target],
                thickness,
            };
            out_offset[e.source] += thickness;
            in_offset[e.target] += thickness;
            band
        })
        .collect();

    SankeyLayout { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, Table};
    use crate::sankey::{aggregate, LevelSelector};

    fn scenario() -> SankeyDiagram {
        let col = |name: &str, vals: [&str; 3]| {
            Column::new(name, vals.iter().map(|v| CellValue::from(*v)).collect())
        };
        let table = Table::new(vec![
            col("L1", ["A", "A", "B"]),
            col("L2", ["X", "Y", "X"]),
            col("L3", ["P", "P", "Q"]),
            Column::new("V", vec![10.0.into(), 5.0.into(), 3.0.into()]),
        ])
        .unwrap();
        aggregate(&table, &LevelSelector::new("L1", "L2", "L3", "V")).unwrap()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn columns_span_the_width() {
        let layout = compute(&scenario(), 320.0, 200.0, &LayoutOptions::default());
        let xs: Vec<f32> = layout.nodes.iter().map(|n| n.x).collect();
        assert_eq!(xs, vec![0.0, 100.0, 100.0, 200.0, 200.0, 300.0, 300.0]);
        assert!(layout.nodes.iter().all(|n| n.width == 20.0));
    }

    #[test]
    fn fullest_column_fits_height() {
        let opts = LayoutOptions {
            node_width: 10.0,
            node_padding: 10.0,
        };
        let layout = compute(&scenario(), 400.0, 190.0, &opts);
        // Every column carries 18 units over two nodes: (190 - 10) / 18 = 10 per unit.
        let root = &layout.nodes[0];
        assert!(approx(root.height, 180.0));
        assert!(approx(root.y, 5.0));
        let a = &layout.nodes[1];
        let b = &layout.nodes[2];
        assert!(approx(a.height, 150.0));
        assert!(approx(a.y, 0.0));
        assert!(approx(b.y, 160.0));
    }

    #[test]
    fn bands_stack_on_both_ends() {
        let opts = LayoutOptions {
            node_width: 10.0,
            node_padding: 10.0,
        };
        let layout = compute(&scenario(), 400.0, 190.0, &opts);
        // A → X then A → Y leave A one after the other.
        let ax = layout.links.iter().find(|l| l.source == 1 && l.target == 3).unwrap();
        let ay = layout.links.iter().find(|l| l.source == 1 && l.target == 4).unwrap();
        assert!(approx(ay.y0, ax.y0 + ax.thickness));
        // A → X and B → X arrive at X stacked in source order.
        let bx = layout.links.iter().find(|l| l.source == 2 && l.target == 3).unwrap();
        assert!(approx(bx.y1, ax.y1 + ax.thickness));
        assert!(approx(ax.x0, 140.0));
    }

    #[test]
    fn hit_testing() {
        let layout = compute(&scenario(), 320.0, 200.0, &LayoutOptions::default());
        let root = layout.nodes[0];
        assert_eq!(layout.node_at(root.x + 1.0, root.y + 1.0), Some(0));
        assert_eq!(layout.node_at(50.0, 1.0), None);
    }

    #[test]
    fn degenerate_sizes_do_not_panic() {
        let layout = compute(&scenario(), 0.0, 0.0, &LayoutOptions::default());
        assert_eq!(layout.nodes.len(), 7);
        assert!(layout.links.iter().all(|l| l.thickness == 0.0));
    }
}
