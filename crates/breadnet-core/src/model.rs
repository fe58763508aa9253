//! Request-side data model.
//!
//! Everything here is supplied by the caller: either straight from the
//! detector or from a client that confirmed or edited a previous detection.
//! JSON field names follow the camelCase wire format of the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::config::ResolveConfig;
use crate::terminal::WireSide;

pub type ComponentId = u32;
pub type WireId = u32;

/// Pixel or board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Oriented detection box, corners in TL, TR, BR, BL order. Carried through
/// for reporting only; it takes no part in connectivity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub corners: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
    Led,
    Diode,
    Transistor,
    Source,
    Ic,
    Wire,
    Other,
}

impl ComponentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Resistor => "resistor",
            ComponentKind::Capacitor => "capacitor",
            ComponentKind::Inductor => "inductor",
            ComponentKind::Led => "led",
            ComponentKind::Diode => "diode",
            ComponentKind::Transistor => "transistor",
            ComponentKind::Source => "source",
            ComponentKind::Ic => "ic",
            ComponentKind::Wire => "wire",
            ComponentKind::Other => "other",
        }
    }

    /// SPICE element letter. `None` for kinds that never produce an element card.
    pub const fn spice_prefix(self) -> Option<char> {
        match self {
            ComponentKind::Resistor => Some('R'),
            ComponentKind::Capacitor => Some('C'),
            ComponentKind::Inductor => Some('L'),
            ComponentKind::Led | ComponentKind::Diode => Some('D'),
            ComponentKind::Transistor => Some('Q'),
            ComponentKind::Source => Some('V'),
            ComponentKind::Ic => Some('X'),
            ComponentKind::Wire | ComponentKind::Other => None,
        }
    }

    /// Map a detector class label onto a kind. Unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "resistor" | "r" => ComponentKind::Resistor,
            "capacitor" | "c" => ComponentKind::Capacitor,
            "inductor" | "l" => ComponentKind::Inductor,
            "led" => ComponentKind::Led,
            "diode" | "d" => ComponentKind::Diode,
            "transistor" | "q" | "bjt" | "mosfet" => ComponentKind::Transistor,
            "source" | "v" | "battery" | "voltage_source" => ComponentKind::Source,
            "ic" | "x" | "chip" => ComponentKind::Ic,
            "wire" | "jumper" => ComponentKind::Wire,
            _ => ComponentKind::Other,
        }
    }
}

impl From<String> for ComponentKind {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<ComponentKind> for &'static str {
    fn from(kind: ComponentKind) -> Self {
        kind.as_str()
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected part. Terminal order is significant: index `i` of `terminals`
/// is terminal `i` of the component and becomes the `i`-th node of its card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub terminals: Vec<Point>,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl Component {
    pub fn new(
        id: ComponentId,
        kind: ComponentKind,
        terminals: impl IntoIterator<Item = impl Into<Point>>,
    ) -> Self {
        Self {
            id,
            kind,
            name: None,
            terminals: terminals.into_iter().map(Into::into).collect(),
            value: String::new(),
            bounding_box: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wire {
    pub id: WireId,
    pub endpoint_a: Point,
    pub endpoint_b: Point,
    /// Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Wire {
    pub fn new(id: WireId, endpoint_a: impl Into<Point>, endpoint_b: impl Into<Point>) -> Self {
        Self {
            id,
            endpoint_a: endpoint_a.into(),
            endpoint_b: endpoint_b.into(),
            color: None,
        }
    }

    pub fn endpoint(&self, side: WireSide) -> Point {
        match side {
            WireSide::A => self.endpoint_a,
            WireSide::B => self.endpoint_b,
        }
    }
}

/// Reference used by ground and power markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MarkerRef {
    /// One terminal of one component.
    Terminal {
        component: ComponentId,
        terminal: usize,
    },
    /// A whole component. Only unambiguous for single-terminal parts unless
    /// [`ResolveConfig::component_markers_cover_all_terminals`] is set.
    Component { component: ComponentId },
    /// A board position, bound to the nearest terminal within the match tolerance.
    Position { x: f64, y: f64 },
}

impl MarkerRef {
    pub fn terminal(component: ComponentId, terminal: usize) -> Self {
        MarkerRef::Terminal {
            component,
            terminal,
        }
    }

    pub fn component(component: ComponentId) -> Self {
        MarkerRef::Component { component }
    }
}

impl std::fmt::Display for MarkerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerRef::Terminal {
                component,
                terminal,
            } => write!(f, "terminal {component}.{terminal}"),
            MarkerRef::Component { component } => write!(f, "component {component}"),
            MarkerRef::Position { x, y } => write!(f, "position {}", Point::new(*x, *y)),
        }
    }
}

/// A complete resolution request as it arrives over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitInput {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub wires: Vec<Wire>,
    #[serde(default)]
    pub ground_markers: Vec<MarkerRef>,
    #[serde(default)]
    pub power_markers: Vec<MarkerRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ResolveConfig>,
}
