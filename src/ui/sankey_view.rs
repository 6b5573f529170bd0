use eframe::egui::{self, Align2, Color32, FontId, Mesh, Pos2, Rect, Sense, Shape, Ui, Vec2};

use sankey_tool::color;
use sankey_tool::sankey::layout::{self, LinkBand};

use crate::state::AppState;

/// Horizontal space kept free right of the last column for its labels.
const LABEL_ROOM: f32 = 140.0;
const BAND_STEPS: u32 = 24;

// ---------------------------------------------------------------------------
// Sankey chart (central panel)
// ---------------------------------------------------------------------------

/// Render the generated diagram in the central panel.
pub fn sankey_chart(ui: &mut Ui, state: &mut AppState) {
    let Some(diagram) = &state.diagram else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file, pick the columns and press “Generate Sankey Chart”");
        });
        return;
    };

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let area = response.rect.shrink(16.0);
    let layout = layout::compute(
        diagram,
        (area.width() - LABEL_ROOM).max(0.0),
        area.height(),
        &state.config.layout,
    );
    let origin = area.min;

    let node_colors: Vec<Color32> = diagram.colors().iter().map(|c| color::node_color(c)).collect();
    let hovered = response
        .hover_pos()
        .and_then(|p| layout.node_at(p.x - origin.x, p.y - origin.y));

    for band in &layout.links {
        let alpha = match hovered {
            None => 110,
            Some(h) if h == band.source || h == band.target => 200,
            Some(_) => 35,
        };
        let fill = color::link_color(node_colors[band.source], alpha);
        painter.add(Shape::mesh(band_mesh(band, origin, fill)));
    }

    let text_color = ui.visuals().text_color();
    for node in &layout.nodes {
        let rect = Rect::from_min_size(
            origin + Vec2::new(node.x, node.y),
            Vec2::new(node.width, node.height.max(1.0)),
        );
        painter.rect_filled(rect, 1.0, node_colors[node.node]);
        painter.text(
            rect.right_center() + Vec2::new(4.0, 0.0),
            Align2::LEFT_CENTER,
            &diagram.labels()[node.node],
            FontId::proportional(12.0),
            text_color,
        );
    }

    if let (Some(h), Some(pointer)) = (hovered, response.hover_pos()) {
        let node = &layout.nodes[h];
        painter.text(
            pointer + Vec2::new(12.0, -12.0),
            Align2::LEFT_BOTTOM,
            format!("{}: {}", diagram.labels()[h], format_value(node.throughput)),
            FontId::proportional(13.0),
            text_color,
        );
    }

    state.hovered_node = hovered;
}

/// Filled band following a horizontal S-curve from source to target.
fn band_mesh(band: &LinkBand, origin: Pos2, fill: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    for i in 0..=BAND_STEPS {
        let t = i as f32 / BAND_STEPS as f32;
        let ease = t * t * (3.0 - 2.0 * t);
        let x = band.x0 + (band.x1 - band.x0) * t;
        let y = band.y0 + (band.y1 - band.y0) * ease;
        mesh.colored_vertex(origin + Vec2::new(x, y), fill);
        mesh.colored_vertex(origin + Vec2::new(x, y + band.thickness), fill);
        if i > 0 {
            let b = 2 * i;
            mesh.add_triangle(b - 2, b - 1, b);
            mesh.add_triangle(b - 1, b + 1, b);
        }
    }
    mesh
}

/// Whole numbers without decimals, everything else with two.
fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_mesh_is_a_triangle_strip() {
        let band = LinkBand {
            source: 0,
            target: 1,
            x0: 0.0,
            y0: 10.0,
            x1: 100.0,
            y1: 50.0,
            thickness: 5.0,
        };
        let mesh = band_mesh(&band, egui::pos2(1.0, 2.0), Color32::RED);
        assert_eq!(mesh.vertices.len(), 2 * (BAND_STEPS as usize + 1));
        assert_eq!(mesh.indices.len(), 6 * BAND_STEPS as usize);
        assert!(mesh.is_valid());

        let first = mesh.vertices[0].pos;
        let last_top = mesh.vertices[mesh.vertices.len() - 2].pos;
        assert_eq!(first, egui::pos2(1.0, 12.0));
        assert_eq!(last_top, egui::pos2(101.0, 52.0));
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(15.0), "15");
        assert_eq!(format_value(2.5), "2.50");
    }
}
