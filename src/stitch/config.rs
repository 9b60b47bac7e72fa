//! Run configuration
//!
//! `StitchParams` is what a user types in (millimetres, possibly as text);
//! `StitchConfig` is the validated snapshot a run consumes. A config is
//! never modified once built.

use crate::board::{from_mm, to_mm, BoardRegion, Coord, IU_PER_MM, MAX_LENGTH};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::StitchError;

/// Sentinel stored on every via this tool creates
pub const STITCH_VIA_MARKER: u32 = 33;

/// Nets tried, in order, when no net name is given
pub const DEFAULT_NET_CANDIDATES: &[&str] = &["GND", "/GND"];

/// User-facing parameters in millimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchParams {
    pub net_name: String,
    pub step_mm: f64,
    pub via_size_mm: f64,
    pub drill_mm: f64,
    pub clearance_mm: f64,
    pub only_selected_area: bool,
    pub delete_vias: bool,
    pub randomize: bool,
    pub star: bool,
    pub debug: bool,
    pub seed: Option<u64>,
}

impl Default for StitchParams {
    fn default() -> Self {
        Self {
            net_name: "GND".to_string(),
            step_mm: 2.54,
            via_size_mm: 0.46,
            drill_mm: 0.20,
            clearance_mm: 0.2,
            only_selected_area: false,
            delete_vias: false,
            randomize: false,
            star: false,
            debug: false,
            seed: None,
        }
    }
}

/// Parse a length typed by a user, in millimetres
pub fn parse_length_mm(field: &'static str, value: &str) -> Result<f64, StitchError> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| StitchError::invalid(field, format!("'{}' is not a number", value)))?;
    if !parsed.is_finite() {
        return Err(StitchError::invalid(field, format!("'{}' is not finite", value)));
    }
    Ok(parsed)
}

/// Convert to internal units, refusing lengths at or above [`MAX_LENGTH`]
fn bounded(field: &'static str, mm: f64) -> Result<Coord, StitchError> {
    if mm * IU_PER_MM >= MAX_LENGTH as f64 {
        return Err(StitchError::invalid(
            field,
            format!("{} mm exceeds the maximum of {} mm", mm, to_mm(MAX_LENGTH)),
        ));
    }
    Ok(from_mm(mm))
}

fn positive(field: &'static str, mm: f64) -> Result<Coord, StitchError> {
    if !mm.is_finite() || mm <= 0.0 {
        return Err(StitchError::invalid(field, format!("must be positive, got {}", mm)));
    }
    let value = bounded(field, mm)?;
    if value <= 0 {
        return Err(StitchError::invalid(field, format!("{} mm is below resolution", mm)));
    }
    Ok(value)
}

impl StitchParams {
    /// Defaults with the net picked from the board (`GND`, then `/GND`)
    pub fn for_board<B: BoardRegion + ?Sized>(board: &B) -> Self {
        let mut params = Self::default();
        if let Some(net) = DEFAULT_NET_CANDIDATES.iter().find(|n| board.has_net(n)) {
            params.net_name = net.to_string();
        }
        params
    }

    /// Overlay a JSON object of parameters onto these ones
    ///
    /// # Arguments
    /// * `json` - A JSON object using the field names of `StitchParams`
    ///
    /// # Returns
    /// * `Result<StitchParams>` - Keys present in `json` replace the current
    ///   values; absent keys keep them, so a resolved net name or flags set
    ///   earlier survive
    pub fn merged_with_json(&self, json: &str) -> Result<Self, serde_json::Error> {
        let overlay: Map<String, Value> = serde_json::from_str(json)?;
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        merged.extend(overlay);
        serde_json::from_value(Value::Object(merged))
    }

    /// Validate into an immutable run configuration
    pub fn validate(&self) -> Result<StitchConfig, StitchError> {
        if self.net_name.trim().is_empty() {
            return Err(StitchError::invalid("net name", "must not be empty"));
        }
        let via_diameter = positive("via size", self.via_size_mm)?;
        let drill = positive("drill", self.drill_mm)?;
        let clearance = positive("clearance", self.clearance_mm)?;
        if drill > via_diameter {
            return Err(StitchError::invalid(
                "drill",
                format!("{} mm exceeds via size {} mm", self.drill_mm, self.via_size_mm),
            ));
        }
        if !self.step_mm.is_finite() || self.step_mm < 0.0 {
            return Err(StitchError::invalid(
                "step",
                format!("must be zero or positive, got {}", self.step_mm),
            ));
        }
        let step = bounded("step", self.step_mm)?;

        Ok(StitchConfig {
            net_name: self.net_name.clone(),
            step,
            via_diameter,
            drill,
            clearance,
            only_selected_area: self.only_selected_area,
            delete_vias: self.delete_vias,
            randomize: self.randomize,
            star: self.star,
            debug: self.debug,
            seed: self.seed,
        })
    }
}

/// Validated run configuration, lengths in internal units
#[derive(Debug, Clone, PartialEq)]
pub struct StitchConfig {
    pub net_name: String,
    /// Minimum spacing between stitched vias; 0 disables spacing
    pub step: Coord,
    pub via_diameter: Coord,
    pub drill: Coord,
    pub clearance: Coord,
    pub only_selected_area: bool,
    pub delete_vias: bool,
    pub randomize: bool,
    pub star: bool,
    pub debug: bool,
    /// Seed for position jitter; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl StitchConfig {
    /// Grid pitch: one via plus its clearance
    pub fn pitch(&self) -> Coord {
        self.clearance + self.via_diameter
    }
}
