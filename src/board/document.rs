//! Board document mapping between the XML tree and [`Board`]
//!
//! Lengths are stored in millimetres in the document and converted to
//! internal units on load. Top-level elements this module does not know
//! are carried through a load/save cycle untouched.

use super::model::Board;
use super::types::*;
use crate::parse_xml::{parse_xml_file, XmlNode};
use crate::serialize_xml::xml_node_to_file;
use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use tracing::{debug, info};

const ROOT: &str = "Board";
const MANAGED: &[&str] = &["Net", "Zone", "Pad", "Track", "Via", "Text", "Graphic"];

/// A loaded board plus the tree it came from
#[derive(Debug, Clone)]
pub struct BoardDocument {
    pub root: XmlNode,
    pub board: Board,
}

impl BoardDocument {
    pub fn from_xml(root: XmlNode) -> Result<Self> {
        let board = board_from_xml(&root)?;
        Ok(Self { root, board })
    }

    /// Regenerate the tree from the current board state
    pub fn to_xml(&self) -> XmlNode {
        board_to_xml(&self.board, Some(&self.root))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        xml_node_to_file(&self.to_xml(), &path)?;
        info!("Saved board to {}", path.as_ref().display());
        Ok(())
    }
}

/// Load a board document from disk
pub fn load_board<P: AsRef<Path>>(path: P) -> Result<BoardDocument> {
    let root = parse_xml_file(&path)?;
    let doc = BoardDocument::from_xml(root)
        .with_context(|| format!("Invalid board document {}", path.as_ref().display()))?;
    info!(
        "Loaded board {}: {} zones, {} pads, {} tracks, {} vias, {} drawings",
        path.as_ref().display(),
        doc.board.zones.len(),
        doc.board.pads.len(),
        doc.board.tracks.len(),
        doc.board.vias.len(),
        doc.board.drawings.len()
    );
    Ok(doc)
}

fn required<'a>(node: &'a XmlNode, key: &str) -> Result<&'a str> {
    node.attr(key)
        .ok_or_else(|| anyhow!("<{}> is missing attribute '{}'", node.name, key))
}

fn parse_mm(node: &XmlNode, key: &str, value: &str) -> Result<Coord> {
    let mm: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("<{}> attribute '{}' is not a number: '{}'", node.name, key, value))?;
    if !mm.is_finite() {
        bail!("<{}> attribute '{}' is not finite", node.name, key);
    }
    Ok(from_mm(mm))
}

fn mm(node: &XmlNode, key: &str) -> Result<Coord> {
    parse_mm(node, key, required(node, key)?)
}

fn mm_or(node: &XmlNode, key: &str, default: Coord) -> Result<Coord> {
    match node.attr(key) {
        Some(v) => parse_mm(node, key, v),
        None => Ok(default),
    }
}

fn flag(node: &XmlNode, key: &str) -> bool {
    matches!(node.attr(key), Some(v) if v.eq_ignore_ascii_case("true") || v == "1")
}

fn point(node: &XmlNode, kx: &str, ky: &str) -> Result<Point> {
    Ok(Point::new(mm(node, kx)?, mm(node, ky)?))
}

fn ring(node: &XmlNode) -> Result<Vec<Point>> {
    node.children_named("Pt").map(|pt| point(pt, "x", "y")).collect()
}

fn polygon(node: &XmlNode) -> Result<Polygon> {
    Ok(Polygon {
        outer_ring: ring(node)?,
        holes: node.children_named("Hole").map(ring).collect::<Result<_>>()?,
    })
}

fn optional_net(node: &XmlNode) -> Option<String> {
    node.attr("net").filter(|n| !n.is_empty()).map(str::to_string)
}

fn parse_zone(node: &XmlNode) -> Result<Zone> {
    let keepout = flag(node, "keepout").then(|| KeepoutRules {
        no_copper_pour: node.attr("noCopperPour").map_or(true, |_| flag(node, "noCopperPour")),
        no_vias: node.attr("noVias").map_or(true, |_| flag(node, "noVias")),
        no_tracks: node.attr("noTracks").map_or(true, |_| flag(node, "noTracks")),
    });
    let outline = node
        .child("Outline")
        .map(polygon)
        .transpose()?
        .ok_or_else(|| anyhow!("<Zone> has no <Outline>"))?;
    let filled_polygons = match node.child("Filled") {
        Some(filled) => filled.children_named("Polygon").map(polygon).collect::<Result<_>>()?,
        None => Vec::new(),
    };

    Ok(Zone {
        net_name: node.attr("net").unwrap_or_default().to_string(),
        layer: required(node, "layer")?.to_string(),
        priority: node
            .attr("priority")
            .map(|p| p.parse::<u32>())
            .transpose()
            .context("<Zone> priority is not an unsigned integer")?
            .unwrap_or(0),
        clearance: mm_or(node, "clearance", 0)?,
        keepout,
        selected: flag(node, "selected"),
        outline,
        filled_polygons,
    })
}

fn parse_pad(node: &XmlNode) -> Result<Pad> {
    let shape = match node.attr("shape").unwrap_or("rect") {
        "circle" => PadShape::Circle,
        "oval" => PadShape::Oval,
        "rect" | "roundrect" => PadShape::Rect,
        other => bail!("<Pad> has unknown shape '{}'", other),
    };
    Ok(Pad {
        position: point(node, "x", "y")?,
        width: mm(node, "width")?,
        height: mm(node, "height")?,
        shape,
        clearance: mm_or(node, "clearance", 0)?,
        layers: node
            .attr("layers")
            .map(|l| l.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default(),
        net_name: optional_net(node),
    })
}

fn parse_track(node: &XmlNode) -> Result<Track> {
    Ok(Track {
        start: point(node, "x1", "y1")?,
        end: point(node, "x2", "y2")?,
        width: mm(node, "width")?,
        clearance: mm_or(node, "clearance", 0)?,
        layer: required(node, "layer")?.to_string(),
        net_name: optional_net(node),
        selected: flag(node, "selected"),
    })
}

fn parse_via(node: &XmlNode) -> Result<Via> {
    let via_type = match node.attr("type") {
        Some(t) => ViaType::parse(t).ok_or_else(|| anyhow!("<Via> has unknown type '{}'", t))?,
        None => ViaType::Through,
    };
    Ok(Via {
        id: required(node, "id")?.parse().context("<Via> id is not an unsigned integer")?,
        position: point(node, "x", "y")?,
        diameter: mm(node, "diameter")?,
        drill: mm(node, "drill")?,
        via_type,
        net_name: node.attr("net").unwrap_or_default().to_string(),
        marker: node
            .attr("marker")
            .map(|m| m.parse::<u32>())
            .transpose()
            .context("<Via> marker is not an unsigned integer")?,
    })
}

fn parse_drawing(node: &XmlNode, kind: DrawingKind) -> Result<Drawing> {
    Ok(Drawing {
        kind,
        layer: required(node, "layer")?.to_string(),
        bbox: Rect::new(point(node, "x", "y")?, mm(node, "width")?, mm(node, "height")?),
        text: (!node.text_content.is_empty()).then(|| node.text_content.clone()),
    })
}

/// Build a [`Board`] from a `<Board>` element
pub fn board_from_xml(root: &XmlNode) -> Result<Board> {
    if root.name != ROOT {
        bail!("expected <{}> root element, found <{}>", ROOT, root.name);
    }

    let mut board = Board::new();
    for node in &root.children {
        match node.name.as_str() {
            "Net" => board.add_net(required(node, "name")?),
            "Zone" => board.zones.push(parse_zone(node)?),
            "Pad" => board.pads.push(parse_pad(node)?),
            "Track" => board.tracks.push(parse_track(node)?),
            "Via" => board.push_via(parse_via(node)?),
            "Text" => board.drawings.push(parse_drawing(node, DrawingKind::Text)?),
            "Graphic" => board.drawings.push(parse_drawing(node, DrawingKind::Graphic)?),
            other => debug!("Keeping unrecognised element <{}>", other),
        }
    }

    // Nets referenced by items but never declared still exist on the board
    let referenced: Vec<String> = board
        .zones
        .iter()
        .map(|z| z.net_name.clone())
        .chain(board.vias.iter().map(|v| v.net_name.clone()))
        .chain(board.pads.iter().filter_map(|p| p.net_name.clone()))
        .chain(board.tracks.iter().filter_map(|t| t.net_name.clone()))
        .filter(|n| !n.is_empty())
        .collect();
    for net in referenced {
        board.add_net(&net);
    }

    Ok(board)
}

fn fmt_mm(value: Coord) -> String {
    format!("{}", to_mm(value))
}

fn ring_to_xml(node: &mut XmlNode, ring: &[Point]) {
    for p in ring {
        node.children
            .push(XmlNode::new("Pt").with_attr("x", fmt_mm(p.x)).with_attr("y", fmt_mm(p.y)));
    }
}

fn polygon_to_xml(name: &str, polygon: &Polygon) -> XmlNode {
    let mut node = XmlNode::new(name);
    ring_to_xml(&mut node, &polygon.outer_ring);
    for hole in &polygon.holes {
        let mut hole_node = XmlNode::new("Hole");
        ring_to_xml(&mut hole_node, hole);
        node.children.push(hole_node);
    }
    node
}

fn zone_to_xml(zone: &Zone) -> XmlNode {
    let mut node = XmlNode::new("Zone");
    if !zone.net_name.is_empty() {
        node = node.with_attr("net", &zone.net_name);
    }
    node = node
        .with_attr("layer", &zone.layer)
        .with_attr("priority", zone.priority)
        .with_attr("clearance", fmt_mm(zone.clearance));
    if zone.selected {
        node = node.with_attr("selected", true);
    }
    if let Some(rules) = zone.keepout {
        node = node
            .with_attr("keepout", true)
            .with_attr("noCopperPour", rules.no_copper_pour)
            .with_attr("noVias", rules.no_vias)
            .with_attr("noTracks", rules.no_tracks);
    }
    node.children.push(polygon_to_xml("Outline", &zone.outline));
    if !zone.filled_polygons.is_empty() {
        let mut filled = XmlNode::new("Filled");
        filled
            .children
            .extend(zone.filled_polygons.iter().map(|p| polygon_to_xml("Polygon", p)));
        node.children.push(filled);
    }
    node
}

fn pad_to_xml(pad: &Pad) -> XmlNode {
    let shape = match pad.shape {
        PadShape::Circle => "circle",
        PadShape::Rect => "rect",
        PadShape::Oval => "oval",
    };
    let mut node = XmlNode::new("Pad")
        .with_attr("x", fmt_mm(pad.position.x))
        .with_attr("y", fmt_mm(pad.position.y))
        .with_attr("width", fmt_mm(pad.width))
        .with_attr("height", fmt_mm(pad.height))
        .with_attr("shape", shape)
        .with_attr("clearance", fmt_mm(pad.clearance));
    if !pad.layers.is_empty() {
        node = node.with_attr("layers", pad.layers.join(","));
    }
    if let Some(net) = &pad.net_name {
        node = node.with_attr("net", net);
    }
    node
}

fn track_to_xml(track: &Track) -> XmlNode {
    let mut node = XmlNode::new("Track")
        .with_attr("x1", fmt_mm(track.start.x))
        .with_attr("y1", fmt_mm(track.start.y))
        .with_attr("x2", fmt_mm(track.end.x))
        .with_attr("y2", fmt_mm(track.end.y))
        .with_attr("width", fmt_mm(track.width))
        .with_attr("clearance", fmt_mm(track.clearance))
        .with_attr("layer", &track.layer);
    if let Some(net) = &track.net_name {
        node = node.with_attr("net", net);
    }
    if track.selected {
        node = node.with_attr("selected", true);
    }
    node
}

fn via_to_xml(via: &Via) -> XmlNode {
    let mut node = XmlNode::new("Via")
        .with_attr("id", via.id)
        .with_attr("x", fmt_mm(via.position.x))
        .with_attr("y", fmt_mm(via.position.y))
        .with_attr("diameter", fmt_mm(via.diameter))
        .with_attr("drill", fmt_mm(via.drill))
        .with_attr("type", via.via_type.as_str())
        .with_attr("net", &via.net_name);
    if let Some(marker) = via.marker {
        node = node.with_attr("marker", marker);
    }
    node
}

fn drawing_to_xml(drawing: &Drawing) -> XmlNode {
    let name = match drawing.kind {
        DrawingKind::Text => "Text",
        DrawingKind::Graphic => "Graphic",
    };
    let mut node = XmlNode::new(name)
        .with_attr("x", fmt_mm(drawing.bbox.origin.x))
        .with_attr("y", fmt_mm(drawing.bbox.origin.y))
        .with_attr("width", fmt_mm(drawing.bbox.width))
        .with_attr("height", fmt_mm(drawing.bbox.height))
        .with_attr("layer", &drawing.layer);
    if let Some(text) = &drawing.text {
        node.text_content = text.clone();
    }
    node
}

/// Serialize a board; unmanaged children and root attributes of `template`
/// are kept ahead of the regenerated items
pub fn board_to_xml(board: &Board, template: Option<&XmlNode>) -> XmlNode {
    let mut root = match template {
        Some(t) => XmlNode {
            name: ROOT.to_string(),
            attributes: t.attributes.clone(),
            text_content: String::new(),
            children: t
                .children
                .iter()
                .filter(|c| !MANAGED.contains(&c.name.as_str()))
                .cloned()
                .collect(),
        },
        None => XmlNode::new(ROOT),
    };

    root.children
        .extend(board.nets.iter().map(|n| XmlNode::new("Net").with_attr("name", n)));
    root.children.extend(board.zones.iter().map(zone_to_xml));
    root.children.extend(board.pads.iter().map(pad_to_xml));
    root.children.extend(board.tracks.iter().map(track_to_xml));
    root.children.extend(board.vias.iter().map(via_to_xml));
    root.children.extend(board.drawings.iter().map(drawing_to_xml));
    root
}
