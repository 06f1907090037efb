//! Reference path parsing
//!
//! Reference paths are authored as SVG path data (`M 150,50 L 150,250 ...`)
//! and parsed with kurbo. Arcs come back as cubic Béziers, so every drawable
//! segment is a line, a quadratic or a cubic.

use crate::error::EngineError;
use crate::types::Point;
use kurbo::{BezPath, PathEl, PathSeg};

/// An immutable reference path plus its declared coordinate extent
#[derive(Debug, Clone)]
pub struct ReferencePath {
    data: String,
    extent: f64,
    path: BezPath,
}

impl ReferencePath {
    /// Parse path data authored inside a square box of side `extent`
    pub fn parse(data: &str, extent: f64) -> Result<Self, EngineError> {
        match data.trim_start().chars().next() {
            None => return Err(EngineError::PathSyntax("empty path data".to_string())),
            Some('M') | Some('m') => {}
            Some(_) => {
                return Err(EngineError::PathSyntax(
                    "path must start with a move command".to_string(),
                ))
            }
        }

        let path = BezPath::from_svg(data).map_err(|e| EngineError::PathSyntax(e.to_string()))?;

        Ok(Self {
            data: data.to_string(),
            extent,
            path,
        })
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn bez_path(&self) -> &BezPath {
        &self.path
    }

    /// Drawable segments in order; moves split subpaths and are never bridged
    pub fn segments(&self) -> impl Iterator<Item = PathSeg> + '_ {
        self.path.segments()
    }

    /// First point the pen touches, used as the fallback for degenerate paths
    pub fn start_point(&self) -> Point {
        self.path
            .elements()
            .iter()
            .find_map(|el| match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(Point::from(*p)),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::ParamCurve;
    use pretty_assertions::assert_eq;

    fn parse(data: &str) -> ReferencePath {
        ReferencePath::parse(data, 300.0).unwrap()
    }

    #[test]
    fn test_moves_split_segments() {
        let path = parse("M 150,50 L 150,250 M 50,150 L 250,150");
        let segments: Vec<PathSeg> = path.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(Point::from(segments[1].start()), Point::new(50.0, 150.0));
    }

    #[test]
    fn test_relative_and_shorthand_commands() {
        let path = parse("m10 10 h20 v-5 l5,5 z");
        let ends: Vec<Point> = path.segments().map(|s| Point::from(s.end())).collect();
        assert_eq!(
            ends,
            vec![
                Point::new(30.0, 10.0),
                Point::new(30.0, 5.0),
                Point::new(35.0, 10.0),
                Point::new(10.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_arcs_become_curves() {
        let path = parse("M 150,50 A 100,100 0 1,1 150,250");
        let segments: Vec<PathSeg> = path.segments().collect();
        assert!(!segments.is_empty());
        assert!(segments.iter().all(|s| matches!(s, PathSeg::Cubic(_))));
        let end = Point::from(segments[segments.len() - 1].end());
        assert!(end.distance_to(Point::new(150.0, 250.0)) < 1e-6);
    }

    #[test]
    fn test_rejects_missing_move() {
        let err = ReferencePath::parse("L 10 10", 300.0).unwrap_err();
        assert!(matches!(err, EngineError::PathSyntax(_)));
        assert!(ReferencePath::parse("   ", 300.0).is_err());
    }

    #[test]
    fn test_rejects_unknown_command() {
        assert!(ReferencePath::parse("M 0 0 X 5 5", 300.0).is_err());
    }

    #[test]
    fn test_start_point() {
        let path = parse("M 100,50 L 150,150");
        assert_eq!(path.start_point(), Point::new(100.0, 50.0));
        assert_eq!(path.extent(), 300.0);
        assert_eq!(path.data(), "M 100,50 L 150,150");
    }
}
