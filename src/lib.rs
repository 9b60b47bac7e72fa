//! Automatic via stitching for PCB copper areas
//!
//! Loads a board document, fills the zones of one net (normally ground)
//! with a regular grid of vias that stays clear of every obstacle, and
//! writes the board back. Vias placed here carry a marker so a later run
//! can remove exactly those vias again.
//!
//! # Modules
//! - `parse_xml` - XML tree reader
//! - `serialize_xml` - XML tree writer
//! - `board` - Board model, geometry and the `BoardRegion` host interface
//! - `stitch` - The placement engine
//! - `keepout` - Clearance keepouts around selected tracks

pub mod parse_xml;
pub mod serialize_xml;
pub mod board;
pub mod stitch;
pub mod keepout;

pub use board::{Board, BoardDocument, BoardRegion, load_board};
pub use keepout::add_track_keepouts;
pub use stitch::{
    run, run_with_rng, plan_placement,
    StitchParams, StitchConfig, StitchError,
    PlacementReport, PlacementPlan, RunMode,
};
