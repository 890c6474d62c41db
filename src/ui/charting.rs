use taptime::window::PlotCanvas;

/// Flip plot points (y grows downwards from the top of the canvas) into chart
/// space, where y grows upwards from the floor.
pub fn to_chart_points(polyline: &[(f64, f64)], canvas: &PlotCanvas) -> Vec<(f64, f64)> {
    polyline
        .iter()
        .map(|&(x, y)| (x, canvas.floor_y - y))
        .collect()
}

/// X and Y axis bounds covering the whole plot area
pub fn chart_bounds(canvas: &PlotCanvas) -> ([f64; 2], [f64; 2]) {
    ([0.0, canvas.width.max(1.0)], [0.0, canvas.floor_y.max(1.0)])
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: PlotCanvas = PlotCanvas {
        width: 80.0,
        floor_y: 20.0,
        rise: 10.0,
    };

    #[test]
    fn flips_y_axis() {
        let points = to_chart_points(&[(0.0, 20.0), (80.0, 10.0)], &CANVAS);
        assert_eq!(points, vec![(0.0, 0.0), (80.0, 10.0)]);
    }

    #[test]
    fn bounds_never_collapse() {
        let empty = PlotCanvas {
            width: 0.0,
            floor_y: 0.0,
            rise: 0.0,
        };
        assert_eq!(chart_bounds(&empty), ([0.0, 1.0], [0.0, 1.0]));
        assert_eq!(chart_bounds(&CANVAS), ([0.0, 80.0], [0.0, 20.0]));
    }
}
