// Placement behaviour of the stitching engine on boards built in code
use via_stitch::board::{
    Board, BoardRegion, Coord, Drawing, GeometryError, KeepoutRules, NewVia, Pad, Point, Polygon, Rect, Track,
    Via, ViaId, Zone,
};
use via_stitch::stitch::{
    accept_target_areas, clear_distance, plan_placement, run, run_with_rng, CellGrid, CellState, GridMapper,
    RejectReason, RunMode, StitchConfig, StitchError, StitchParams, STITCH_VIA_MARKER,
};

const MM: Coord = 1_000_000;

fn rect_poly(x0: Coord, y0: Coord, x1: Coord, y1: Coord) -> Polygon {
    Polygon::new(vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ])
}

fn copper(net: &str, priority: u32, outline: Polygon) -> Zone {
    Zone {
        net_name: net.to_string(),
        layer: "F.Cu".to_string(),
        priority,
        outline: outline.clone(),
        filled_polygons: vec![outline],
        ..Default::default()
    }
}

fn keepout(outline: Polygon) -> Zone {
    Zone {
        layer: "F.Cu".to_string(),
        keepout: Some(KeepoutRules::default()),
        outline,
        ..Default::default()
    }
}

/// 0.2 mm clearance + 0.8 mm via: 1 mm pitch
fn params(step_mm: f64) -> StitchParams {
    StitchParams {
        clearance_mm: 0.2,
        via_size_mm: 0.8,
        drill_mm: 0.4,
        step_mm,
        seed: Some(7),
        ..Default::default()
    }
}

/// 10 x 10 mm GND plane
fn gnd_board() -> Board {
    let mut board = Board::new();
    board.add_net("GND");
    board.zones.push(copper("GND", 0, rect_poly(0, 0, 10 * MM, 10 * MM)));
    board
}

fn positions_mm(board: &Board) -> Vec<(Coord, Coord)> {
    board.vias.iter().map(|v| (v.position.x / MM, v.position.y / MM)).collect()
}

/// Host that has no inside-zone hit test
struct NoInsideTest(Board);

impl BoardRegion for NoInsideTest {
    fn bounding_box(&self) -> Rect {
        self.0.bounding_box()
    }
    fn has_net(&self, name: &str) -> bool {
        self.0.has_net(name)
    }
    fn zones(&self) -> &[Zone] {
        self.0.zones()
    }
    fn pads(&self) -> &[Pad] {
        self.0.pads()
    }
    fn tracks(&self) -> &[Track] {
        self.0.tracks()
    }
    fn drawings(&self) -> &[Drawing] {
        self.0.drawings()
    }
    fn vias(&self) -> &[Via] {
        self.0.vias()
    }
    fn zone_hit_filled(&self, zone: &Zone, p: Point) -> bool {
        self.0.zone_hit_filled(zone, p)
    }
    fn zone_hit_edge(&self, zone: &Zone, p: Point, accuracy: Coord) -> bool {
        self.0.zone_hit_edge(zone, p, accuracy)
    }
    fn supports_zone_inside_test(&self) -> bool {
        false
    }
    fn zone_hit_inside(&self, _zone: &Zone, _p: Point) -> bool {
        panic!("inside test called on a host that does not support it");
    }
    fn pad_hits_rect(&self, pad: &Pad, rect: &Rect) -> Result<bool, GeometryError> {
        self.0.pad_hits_rect(pad, rect)
    }
    fn track_hits_rect(&self, track: &Track, rect: &Rect) -> Result<bool, GeometryError> {
        self.0.track_hits_rect(track, rect)
    }
    fn add_via(&mut self, via: NewVia) -> ViaId {
        self.0.add_via(via)
    }
    fn remove_via(&mut self, id: ViaId) -> Option<Via> {
        self.0.remove_via(id)
    }
    fn add_zone(&mut self, zone: Zone) {
        self.0.add_zone(zone)
    }
    fn refill_zones(&mut self) {
        self.0.refill_zones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_plain_plane_fills_interior() {
        let mut board = gnd_board();
        let config = params(0.0).validate().unwrap();

        let report = run(&config, &mut board).expect("run failed");
        assert_eq!(report.mode, RunMode::Place);
        assert_eq!(report.vias_placed, 81);
        assert_eq!((report.grid_width, report.grid_height), (11, 11));

        let mut expected = Vec::new();
        for x in 1..=9 {
            for y in 1..=9 {
                expected.push((x, y));
            }
        }
        assert_eq!(positions_mm(&board), expected, "vias are emitted in column scan order");
        assert!(board.vias.iter().all(|v| v.net_name == "GND"
            && v.marker == Some(STITCH_VIA_MARKER)
            && v.diameter == 800_000
            && v.drill == 400_000));
        println!("✓ {} vias on a {}x{} grid", report.vias_placed, report.grid_width, report.grid_height);
    }

    #[test]
    fn test_strip_two_pitches_wide_holds_one_column() {
        let mut board = Board::new();
        board.add_net("GND");
        board.zones.push(copper("GND", 0, rect_poly(0, 0, 2 * MM, 10 * MM)));
        let config = params(0.0).validate().unwrap();

        let plan = plan_placement(&board, &config).unwrap();
        assert_eq!(plan.mapper.width_cells, 3);
        let columns: Vec<usize> = plan.grid.candidates().iter().map(|c| c.i).collect();
        assert_eq!(columns.len(), 9);
        assert!(columns.iter().all(|&i| i == 1), "only the middle column fits: {:?}", columns);
    }

    #[test]
    fn test_pass_one_order_does_not_change_acceptance() {
        let outer = copper("GND", 1, rect_poly(0, 0, 10 * MM, 10 * MM));
        let inner = copper("GND", 2, rect_poly(2 * MM, 2 * MM, 8 * MM, 8 * MM));
        let config = params(0.0).validate().unwrap();

        let mut grids = Vec::new();
        for zones in [vec![outer.clone(), inner.clone()], vec![inner, outer]] {
            let mut board = Board::new();
            board.add_net("GND");
            board.zones = zones;
            let mapper = GridMapper::new(&board.bounding_box(), config.pitch());
            let mut grid = CellGrid::new(mapper.width_cells, mapper.height_cells);
            let accepted = accept_target_areas(&board, &config, &mapper, &mut grid);
            assert_eq!(accepted, 81);
            grids.push(grid);
        }
        // A cell accepted by the first area is not re-evaluated by the second
        assert_eq!(grids[0], grids[1]);
    }

    #[test]
    fn test_keepout_precedence_over_other_net() {
        let square = rect_poly(3 * MM, 3 * MM, 6 * MM, 6 * MM);
        for keepout_first in [true, false] {
            let mut board = gnd_board();
            board.add_net("VCC");
            let foreign = copper("VCC", 0, square.clone());
            if keepout_first {
                board.zones.push(keepout(square.clone()));
                board.zones.push(foreign);
            } else {
                board.zones.push(foreign);
                board.zones.push(keepout(square.clone()));
            }
            let config = params(0.0).validate().unwrap();
            let plan = plan_placement(&board, &config).unwrap();

            // Cells 3..=6 overlap the square
            assert_eq!(plan.grid.get(4, 4), CellState::Rejected(RejectReason::Keepout));
            let counts = plan.grid.counts();
            assert_eq!(counts.keepout, 16);
            assert_eq!(counts.other_signal, 0);
            assert_eq!(counts.candidate, 65);
        }
    }

    #[test]
    fn test_host_without_inside_test_treats_it_as_no_hit() {
        let mut board = gnd_board();
        // Keepout with no poured copper and no outline edge near any via corner
        board.zones.push(keepout(rect_poly(3 * MM, 3 * MM, 6 * MM, 6 * MM)));
        let config = params(0.0).validate().unwrap();

        let mut with_test = board.clone();
        assert_eq!(run(&config, &mut with_test).unwrap().vias_placed, 65);

        let mut host = NoInsideTest(board);
        let report = run(&config, &mut host).unwrap();
        assert_eq!(report.vias_placed, 81);
    }

    #[test]
    fn test_obstacles_reject_with_their_reason() {
        let mut board = gnd_board();
        board.pads.push(Pad {
            position: Point::new(2 * MM, 2 * MM),
            width: MM,
            height: MM,
            net_name: Some("SIG".to_string()),
            ..Default::default()
        });
        board.tracks.push(Track {
            start: Point::new(8 * MM, MM),
            end: Point::new(8 * MM, 9 * MM),
            width: 0,
            layer: "B.Cu".to_string(),
            ..Default::default()
        });
        board.drawings.push(Drawing {
            kind: via_stitch::board::DrawingKind::Text,
            layer: "B.Cu".to_string(),
            bbox: Rect::new(Point::new(5 * MM, 5 * MM), 0, 0),
            text: Some("GND".to_string()),
        });
        let config = params(0.0).validate().unwrap();

        let plan = plan_placement(&board, &config).unwrap();
        assert_eq!(plan.grid.get(2, 2), CellState::Rejected(RejectReason::Pad));
        assert_eq!(plan.grid.get(8, 5), CellState::Rejected(RejectReason::Track));
        assert_eq!(plan.grid.get(5, 5), CellState::Rejected(RejectReason::Drawing));
        assert!(plan.grid.get(4, 8).is_candidate());
    }

    #[test]
    fn test_copper_text_over_pad_reports_drawing() {
        let mut board = gnd_board();
        board.pads.push(Pad {
            position: Point::new(5 * MM, 5 * MM),
            width: MM,
            height: MM,
            ..Default::default()
        });
        board.drawings.push(Drawing {
            kind: via_stitch::board::DrawingKind::Text,
            layer: "F.Cu".to_string(),
            bbox: Rect::new(Point::new(5 * MM, 5 * MM), 0, 0),
            text: Some("U1".to_string()),
        });
        let config = params(0.0).validate().unwrap();

        let plan = plan_placement(&board, &config).unwrap();
        assert_eq!(plan.grid.get(5, 5), CellState::Rejected(RejectReason::Drawing));
        let counts = plan.grid.counts();
        assert_eq!((counts.drawing, counts.pad), (9, 0));
    }

    #[test]
    fn test_every_cell_has_exactly_one_state() {
        let mut board = gnd_board();
        board.add_net("VCC");
        board.zones.push(copper("VCC", 0, rect_poly(0, 0, 4 * MM, 4 * MM)));
        board.pads.push(Pad {
            position: Point::new(7 * MM, 7 * MM),
            width: MM,
            height: 2 * MM,
            ..Default::default()
        });
        let config = params(1.0).validate().unwrap();

        let plan = plan_placement(&board, &config).unwrap();
        let c = plan.grid.counts();
        let total = c.empty + c.candidate + c.keepout + c.other_signal + c.track + c.pad + c.drawing + c.step;
        assert_eq!(total, plan.mapper.width_cells * plan.mapper.height_cells);
        assert!(c.other_signal > 0 && c.pad > 0 && c.step > 0);
    }

    #[test]
    fn test_step_spacing_radius() {
        let mut board = gnd_board();
        // 1 mm step on a 1 mm pitch: neighbourhood radius 2 cells
        let config = params(1.0).validate().unwrap();
        let distance = clear_distance(config.step, config.pitch()) as f64;
        assert_eq!(distance, 2.0);

        run(&config, &mut board).unwrap();
        let placed = positions_mm(&board);
        assert_eq!(placed, vec![(1, 1), (1, 4), (1, 7), (4, 1), (4, 4), (4, 7), (7, 1), (7, 4), (7, 7)]);
        for (n, a) in placed.iter().enumerate() {
            for b in &placed[n + 1..] {
                let d = (((a.0 - b.0).pow(2) + (a.1 - b.1).pow(2)) as f64).sqrt();
                assert!(d >= distance, "{:?} and {:?} are {} cells apart", a, b, d);
            }
        }
    }

    #[test]
    fn test_star_spacing_staggers() {
        let mut board = gnd_board();
        let config = StitchConfig {
            star: true,
            ..params(1.0).validate().unwrap()
        };
        run(&config, &mut board).unwrap();
        let placed = positions_mm(&board);

        // Columns alternate between two row phases
        assert!(placed.contains(&(1, 1)) && placed.contains(&(1, 4)));
        assert!(placed.contains(&(3, 2)));
        for (n, a) in placed.iter().enumerate() {
            for b in &placed[n + 1..] {
                let manhattan = (a.0 - b.0).abs() + (a.1 - b.1).abs();
                assert!(manhattan > 2, "{:?} and {:?} too close", a, b);
            }
        }
    }

    #[test]
    fn test_jitter_is_reproducible_with_seed() {
        let config = StitchConfig {
            randomize: true,
            ..params(0.0).validate().unwrap()
        };
        let mut first = gnd_board();
        let mut second = gnd_board();
        run_with_rng(&config, &mut first, &mut StdRng::seed_from_u64(3)).unwrap();
        run_with_rng(&config, &mut second, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(first.vias, second.vias);

        let quarter = config.pitch() / 4;
        let mut grid_positions = Vec::new();
        for x in 1..=9 {
            for y in 1..=9 {
                grid_positions.push(Point::new(x * MM, y * MM));
            }
        }
        for (via, cell) in first.vias.iter().zip(grid_positions) {
            assert!((via.position.x - cell.x).abs() <= quarter);
            assert!((via.position.y - cell.y).abs() <= quarter);
        }
    }

    #[test]
    fn test_missing_net_is_an_error() {
        let mut board = gnd_board();
        let config = StitchParams {
            net_name: "AGND".to_string(),
            ..params(0.0)
        }
        .validate()
        .unwrap();
        assert_eq!(run(&config, &mut board), Err(StitchError::NetNotFound("AGND".to_string())));
        assert!(board.vias.is_empty());
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let cases = [
            StitchParams { clearance_mm: 0.0, ..params(0.0) },
            StitchParams { via_size_mm: -1.0, ..params(0.0) },
            StitchParams { drill_mm: f64::NAN, ..params(0.0) },
            StitchParams { step_mm: -2.54, ..params(0.0) },
            StitchParams { step_mm: 1e13, ..params(0.0) },
            StitchParams { clearance_mm: 5e6, ..params(0.0) },
        ];
        for case in cases {
            assert!(
                matches!(case.validate(), Err(StitchError::InvalidParameter { .. })),
                "accepted {:?}",
                case
            );
        }
    }

    #[test]
    fn test_zones_refilled_after_run() {
        let mut board = gnd_board();
        board.zones[0].filled_polygons.push(rect_poly(0, 0, MM, MM));
        let config = params(0.0).validate().unwrap();
        run(&config, &mut board).unwrap();
        assert_eq!(board.zones[0].filled_polygons, vec![board.zones[0].outline.clone()]);
    }
}
