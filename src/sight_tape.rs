//! Printable sight tape built from a sight-angle table.
//!
//! The archer measures how far apart the sight pin sits for two known
//! ranges. That fixes the tape scale in inches per degree of launch angle,
//! and every other range is placed by its angle relative to the longest
//! range on the tape.

use std::collections::BTreeMap;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::POINTS_PER_INCH;
use crate::error::{Result, SightError};

// Letter page, rendered at 720 px/in (a 6120 x 7920 px canvas)
const RENDER_DPI: f64 = 720.0;
const PAGE_WIDTH_IN: f64 = 8.5;
const PAGE_HEIGHT_IN: f64 = 11.0;
const PAGE_PADDING_IN: f64 = 0.5;
const TAPE_TOP_IN: f64 = 1.0;
const TAPE_WIDTH_IN: f64 = 0.32;

const TABLE_TOP_IN: f64 = 42.0 / 72.0;
const TABLE_WIDTH_IN: f64 = 300.0 / 72.0;
const TABLE_ROW_PT: f64 = 20.0;

// ISO/IEC 7810 ID-1 card and a US quarter dollar
const CARD_WIDTH_IN: f64 = 3.375;
const CARD_HEIGHT_IN: f64 = 2.125;
const QUARTER_DIAMETER_IN: f64 = 0.955;

const BOTTOM_LEFT: Pos = Pos {
    h_pos: HPos::Left,
    v_pos: VPos::Bottom,
};

// Mark lengths are shortened from the full tape width by these amounts (pt)
const MID_MARK_INSET_PT: f64 = 10.0;
const MINOR_MARK_INSET_PT: f64 = 15.0;

/// Measurements taken on the bow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapeSetup {
    pub range_1: u32,
    pub range_2: u32,
    /// Distance between the sight marks for `range_1` and `range_2` (in)
    pub mark_separation_in: f64,
    pub min_range: u32,
    pub max_range: u32,
}

impl TapeSetup {
    pub fn validate(&self) -> Result<()> {
        if self.range_1 == self.range_2 {
            return Err(SightError::invalid(
                "reference ranges",
                "range 1 and range 2 must differ",
            ));
        }
        if !self.mark_separation_in.is_finite() || self.mark_separation_in <= 0.0 {
            return Err(SightError::invalid(
                "mark_separation_in",
                format!("must be a positive finite number, got {}", self.mark_separation_in),
            ));
        }
        if self.min_range > self.max_range {
            return Err(SightError::invalid(
                "tape range",
                format!("min {} is past max {}", self.min_range, self.max_range),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkKind {
    /// Every 10 yards, full width with a label
    Major,
    /// Every 5 yards, labelled
    Mid,
    Minor,
}

impl MarkKind {
    pub fn for_distance(yards: u32) -> Self {
        if yards % 10 == 0 {
            MarkKind::Major
        } else if yards % 5 == 0 {
            MarkKind::Mid
        } else {
            MarkKind::Minor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapeMark {
    pub distance_yards: u32,
    /// Distance from the max-range end of the tape (in)
    pub offset_in: f64,
    pub kind: MarkKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightTape {
    pub setup: TapeSetup,
    pub inches_per_degree: f64,
    pub length_in: f64,
    pub marks: Vec<TapeMark>,
}

fn angle_for(angles: &BTreeMap<u32, Option<f64>>, yards: u32) -> Result<f64> {
    angles
        .get(&yards)
        .copied()
        .flatten()
        .ok_or(SightError::MissingDistance(yards))
}

impl SightTape {
    /// Lay out the tape for `setup` from a distance → angle table.
    ///
    /// Every distance from `min_range` to `max_range`, plus both reference
    /// ranges, needs an angle.
    pub fn build(angles: &BTreeMap<u32, Option<f64>>, setup: &TapeSetup) -> Result<Self> {
        setup.validate()?;

        let angle_1 = angle_for(angles, setup.range_1)?;
        let angle_2 = angle_for(angles, setup.range_2)?;
        let spread = (angle_1 - angle_2).abs();
        if spread == 0.0 {
            return Err(SightError::DegenerateTape {
                range_1: setup.range_1,
                range_2: setup.range_2,
            });
        }
        let inches_per_degree = setup.mark_separation_in / spread;

        let max_angle = angle_for(angles, setup.max_range)?;
        let marks = (setup.min_range..=setup.max_range)
            .map(|yards| {
                let angle = angle_for(angles, yards)?;
                Ok(TapeMark {
                    distance_yards: yards,
                    offset_in: (max_angle - angle) * inches_per_degree,
                    kind: MarkKind::for_distance(yards),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            setup: *setup,
            inches_per_degree,
            length_in: max_angle * inches_per_degree,
            marks,
        })
    }
}

fn px(inches: f64) -> i32 {
    (inches * RENDER_DPI).round() as i32
}

fn pt_to_in(points: f64) -> f64 {
    points / POINTS_PER_INCH
}

fn render_err(err: impl std::fmt::Display) -> SightError {
    SightError::Render(err.to_string())
}

fn draw_line<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    from: (f64, f64),
    to: (f64, f64),
    color: RGBColor,
) -> Result<()> {
    area.draw(&PathElement::new(
        vec![(px(from.0), px(from.1)), (px(to.0), px(to.1))],
        color.stroke_width(2),
    ))
    .map_err(render_err)
}

/// Draw `text` anchored at `at` (in), with the font size given in points.
fn draw_label<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    text: &str,
    at: (f64, f64),
    size_pt: f64,
    anchor: Pos,
) -> Result<()> {
    let style = ("sans-serif", pt_to_in(size_pt) * RENDER_DPI)
        .into_font()
        .color(&BLACK)
        .pos(anchor);
    area.draw(&Text::new(text, (px(at.0), px(at.1)), style))
        .map_err(render_err)
}

/// Draw a dashed line, 4 pt on and 2 pt off.
fn dashed_line<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    from: (f64, f64),
    to: (f64, f64),
) -> Result<()> {
    let (dash, gap) = (pt_to_in(4.0), pt_to_in(2.0));
    let length = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
    if length == 0.0 {
        return Ok(());
    }
    let dir = ((to.0 - from.0) / length, (to.1 - from.1) / length);

    let mut start = 0.0;
    while start < length {
        let end = (start + dash).min(length);
        draw_line(
            area,
            (from.0 + dir.0 * start, from.1 + dir.1 * start),
            (from.0 + dir.0 * end, from.1 + dir.1 * end),
            BLACK,
        )?;
        start = end + gap;
    }
    Ok(())
}

/// Setup measurements and the derived scale, as a three-column table.
fn draw_setup_table<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    tape: &SightTape,
) -> Result<()> {
    let setup = &tape.setup;
    let rows = [
        ("Range 1", setup.range_1.to_string(), "yds"),
        ("Range 2", setup.range_2.to_string(), "yds"),
        ("Difference of 1 & 2", setup.mark_separation_in.to_string(), "in"),
        ("Min range", setup.min_range.to_string(), "yds"),
        ("Max range", setup.max_range.to_string(), "yds"),
        ("Scale", format!("{:.4}", tape.inches_per_degree), "in/deg"),
        ("Tape length", format!("{:.3}", tape.length_in), "in"),
    ];

    let left = PAGE_PADDING_IN;
    let top = TABLE_TOP_IN;
    let row = pt_to_in(TABLE_ROW_PT);
    let column = TABLE_WIDTH_IN / 3.0;
    let bottom = top + row * rows.len() as f64;

    draw_label(area, "Setup Specs", (left, top - pt_to_in(4.0)), 12.0, BOTTOM_LEFT)?;
    for i in 0..=rows.len() {
        let y = top + row * i as f64;
        draw_line(area, (left, y), (left + TABLE_WIDTH_IN, y), BLACK)?;
    }
    for i in 0..=3 {
        let x = left + column * f64::from(i);
        draw_line(area, (x, top), (x, bottom), BLACK)?;
    }

    for (i, (name, value, unit)) in rows.iter().enumerate() {
        let baseline = top + row * (i + 1) as f64 - pt_to_in(5.0);
        let inset = pt_to_in(5.0);
        draw_label(area, name, (left + inset, baseline), 10.0, BOTTOM_LEFT)?;
        draw_label(area, value, (left + column + inset, baseline), 10.0, BOTTOM_LEFT)?;
        draw_label(area, unit, (left + 2.0 * column + inset, baseline), 10.0, BOTTOM_LEFT)?;
    }
    Ok(())
}

/// Credit-card outline with a US quarter inside. Both have known sizes, so
/// holding them against the print shows whether it came out at true scale.
fn draw_scale_check<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> Result<()> {
    let left = PAGE_PADDING_IN;
    let bottom = PAGE_HEIGHT_IN - PAGE_PADDING_IN;
    let top = bottom - CARD_HEIGHT_IN;
    let center = (left + CARD_WIDTH_IN / 2.0, top + CARD_HEIGHT_IN / 2.0);

    draw_label(area, "Scale Check", (left, top - pt_to_in(15.0)), 12.0, BOTTOM_LEFT)?;
    area.draw(&Rectangle::new(
        [(px(left), px(top)), (px(left + CARD_WIDTH_IN), px(bottom))],
        BLACK.stroke_width(2),
    ))
    .map_err(render_err)?;
    area.draw(&Circle::new(
        (px(center.0), px(center.1)),
        px(QUARTER_DIAMETER_IN / 2.0),
        BLACK.stroke_width(2),
    ))
    .map_err(render_err)?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    draw_label(area, "Credit card", (center.0, center.1 - pt_to_in(50.0)), 10.0, centered)?;
    draw_label(area, "US Quarter", center, 10.0, centered)
}

/// Render the tape on a letter page as SVG, with the setup table and a
/// scale check beside it.
pub fn render_svg(tape: &SightTape, path: &Path) -> Result<()> {
    let size = (px(PAGE_WIDTH_IN) as u32, px(PAGE_HEIGHT_IN) as u32);
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    draw_setup_table(&root, tape)?;
    draw_scale_check(&root)?;

    let left = PAGE_WIDTH_IN - PAGE_PADDING_IN - TAPE_WIDTH_IN;
    let right = left + TAPE_WIDTH_IN;
    let top = TAPE_TOP_IN;
    let bottom = top + tape.length_in;

    root.draw(&Rectangle::new(
        [(px(left), px(top)), (px(right), px(bottom))],
        WHITE.filled(),
    ))
    .map_err(render_err)?;
    dashed_line(&root, (left, top), (right, top))?;
    dashed_line(&root, (right, top), (right, bottom))?;
    dashed_line(&root, (right, bottom), (left, bottom))?;
    dashed_line(&root, (left, bottom), (left, top))?;

    for mark in &tape.marks {
        let y = bottom - mark.offset_in;
        let (color, inset_pt, label) = match mark.kind {
            MarkKind::Major => (RED, 0.0, Some(6.0)),
            MarkKind::Mid => (GREEN, MID_MARK_INSET_PT, Some(5.0)),
            MarkKind::Minor => (BLUE, MINOR_MARK_INSET_PT, None),
        };

        let end = (right - pt_to_in(inset_pt)).max(left);
        draw_line(&root, (left, y), (end, y), color)?;

        if let Some(font_pt) = label {
            let at = (right - pt_to_in(8.0), y - pt_to_in(1.0));
            draw_label(&root, &mark.distance_yards.to_string(), at, font_pt, BOTTOM_LEFT)?;
        }
    }

    root.present().map_err(render_err)?;
    info!(path = %path.display(), marks = tape.marks.len(), "sight tape rendered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_angles() -> BTreeMap<u32, Option<f64>> {
        // 0.1 degree per yard starting at 1 degree for 10 yards
        (10..=60)
            .map(|yards| (yards, Some(1.0 + 0.1 * f64::from(yards - 10))))
            .collect()
    }

    fn setup() -> TapeSetup {
        TapeSetup {
            range_1: 20,
            range_2: 40,
            mark_separation_in: 1.0,
            min_range: 10,
            max_range: 50,
        }
    }

    #[test]
    fn test_mark_kinds() {
        assert_eq!(MarkKind::for_distance(30), MarkKind::Major);
        assert_eq!(MarkKind::for_distance(35), MarkKind::Mid);
        assert_eq!(MarkKind::for_distance(37), MarkKind::Minor);
    }

    #[test]
    fn test_build_scale_and_offsets() {
        let tape = SightTape::build(&linear_angles(), &setup()).unwrap();

        // angles 2.0 and 4.0 are one inch apart
        assert!((tape.inches_per_degree - 0.5).abs() < 1e-12);
        // max range angle 5.0
        assert!((tape.length_in - 2.5).abs() < 1e-12);
        assert_eq!(tape.marks.len(), 41);

        let first = tape.marks.first().unwrap();
        assert_eq!(first.distance_yards, 10);
        assert!((first.offset_in - 2.0).abs() < 1e-12);

        let last = tape.marks.last().unwrap();
        assert_eq!(last.distance_yards, 50);
        assert!(last.offset_in.abs() < 1e-12);
        assert_eq!(last.kind, MarkKind::Major);
    }

    #[test]
    fn test_missing_distance() {
        let mut angles = linear_angles();
        angles.insert(33, None);
        assert!(matches!(
            SightTape::build(&angles, &setup()),
            Err(SightError::MissingDistance(33))
        ));

        let far = TapeSetup {
            max_range: 80,
            ..setup()
        };
        assert!(matches!(
            SightTape::build(&linear_angles(), &far),
            Err(SightError::MissingDistance(80))
        ));
    }

    #[test]
    fn test_degenerate_scale() {
        let mut angles = linear_angles();
        angles.insert(40, Some(2.0));
        assert!(matches!(
            SightTape::build(&angles, &setup()),
            Err(SightError::DegenerateTape { .. })
        ));
    }

    #[test]
    fn test_invalid_setup() {
        let same = TapeSetup {
            range_2: 20,
            ..setup()
        };
        assert!(same.validate().is_err());

        let reversed = TapeSetup {
            min_range: 60,
            max_range: 50,
            ..setup()
        };
        assert!(reversed.validate().is_err());

        let flat = TapeSetup {
            mark_separation_in: 0.0,
            ..setup()
        };
        assert!(flat.validate().is_err());
    }

    #[test]
    fn test_render_svg() {
        let tape = SightTape::build(&linear_angles(), &setup()).unwrap();
        let path = std::env::temp_dir()
            .join(format!("arrow-sight-tape-{}.svg", std::process::id()));

        render_svg(&tape, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("\n50\n"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_render_svg_has_scale_check_and_setup() {
        let tape = SightTape::build(&linear_angles(), &setup()).unwrap();
        let path = std::env::temp_dir()
            .join(format!("arrow-sight-scale-{}.svg", std::process::id()));

        render_svg(&tape, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        // card and coin outlines
        assert!(svg.contains("<circle"));
        assert!(svg.contains("\nCredit card\n"));
        assert!(svg.contains("\nUS Quarter\n"));
        assert!(svg.contains("\nScale Check\n"));

        assert!(svg.contains("\nSetup Specs\n"));
        assert!(svg.contains("\nMax range\n"));
        assert!(svg.contains("\n0.5000\n"));
        assert!(svg.contains("\nin/deg\n"));
    }
}
