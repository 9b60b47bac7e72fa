// Load, stitch, save and reload an XML board document
use std::path::PathBuf;
use std::time::Instant;
use via_stitch::board::{load_board, BoardRegion};
use via_stitch::parse_xml::parse_xml_file;
use via_stitch::stitch::{run, StitchParams, STITCH_VIA_MARKER};

const FIXTURE: &str = "tests/fixtures/ground_plane.xml";

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("via_stitch_{}_{}.xml", name, std::process::id()))
}

fn fixture_params() -> StitchParams {
    StitchParams {
        clearance_mm: 0.2,
        via_size_mm: 0.8,
        drill_mm: 0.4,
        step_mm: 0.0,
        seed: Some(1),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_fixture() {
        let doc = load_board(FIXTURE).expect("Failed to load fixture");
        assert_eq!(doc.board.zones.len(), 1);
        assert_eq!(doc.board.pads.len(), 1);
        assert_eq!(doc.board.vias.len(), 1);
        assert!(doc.board.has_net("GND") && doc.board.has_net("SIG"));
        assert_eq!(StitchParams::for_board(&doc.board).net_name, "GND");
    }

    #[test]
    fn test_stitch_save_and_reload() {
        let mut doc = load_board(FIXTURE).expect("Failed to load fixture");
        let config = StitchParams {
            net_name: StitchParams::for_board(&doc.board).net_name,
            ..fixture_params()
        }
        .validate()
        .unwrap();

        let start = Instant::now();
        let report = run(&config, &mut doc.board).unwrap();
        let elapsed = start.elapsed();
        // 9 x 9 interior cells minus the 3 x 3 block around the centre pad
        assert_eq!(report.vias_placed, 72);

        let out = scratch_path("reload");
        doc.save(&out).expect("Failed to save board");

        let reloaded = load_board(&out).expect("Failed to reload board");
        assert_eq!(reloaded.board.vias.len(), 73);
        assert_eq!(reloaded.board.vias_with_marker("GND", STITCH_VIA_MARKER).count(), 72);
        assert_eq!(reloaded.board.vias, doc.board.vias);

        // Elements the board model does not know survive the cycle
        let root = parse_xml_file(&out).unwrap();
        assert_eq!(root.attr("units"), Some("mm"));
        let title = root.child("Title").expect("Title element dropped");
        assert_eq!(title.text_content, "Stitching fixture");

        std::fs::remove_file(&out).ok();
        println!("✓ stitched {} vias in {:.3}ms", report.vias_placed, elapsed.as_secs_f64() * 1000.0);
    }

    #[test]
    fn test_delete_from_saved_document() {
        let mut doc = load_board(FIXTURE).unwrap();
        run(&fixture_params().validate().unwrap(), &mut doc.board).unwrap();
        let out = scratch_path("delete");
        doc.save(&out).unwrap();

        let mut reloaded = load_board(&out).unwrap();
        let delete = StitchParams {
            delete_vias: true,
            ..fixture_params()
        }
        .validate()
        .unwrap();
        let report = run(&delete, &mut reloaded.board).unwrap();
        assert_eq!(report.vias_removed, 72);
        assert_eq!(reloaded.board.vias.len(), 1);
        assert_eq!(reloaded.board.vias[0].id, 1);

        std::fs::remove_file(&out).ok();
    }
}
