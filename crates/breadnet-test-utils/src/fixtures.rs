//! Canned detection documents.

/// 9 V source across a 10k / 4.7k divider, grounded at the source's
/// negative lead.
pub const DIVIDER_JSON: &str = r#"{
  "components": [
    {"id": 1, "type": "source", "value": "9V",
     "terminals": [{"x": 0, "y": 0}, {"x": 0, "y": 200}]},
    {"id": 2, "type": "resistor", "value": "10k",
     "terminals": [{"x": 100, "y": 0}, {"x": 100, "y": 100}]},
    {"id": 3, "type": "resistor", "value": "4.7k",
     "terminals": [{"x": 200, "y": 100}, {"x": 200, "y": 200}]}
  ],
  "wires": [
    {"id": 1, "endpointA": {"x": 0, "y": 0}, "endpointB": {"x": 100, "y": 0}, "color": "red"},
    {"id": 2, "endpointA": {"x": 100, "y": 100}, "endpointB": {"x": 200, "y": 100}},
    {"id": 3, "endpointA": {"x": 200, "y": 200}, "endpointB": {"x": 0, "y": 200}, "color": "black"}
  ],
  "groundMarkers": [{"kind": "terminal", "component": 1, "terminal": 1}],
  "powerMarkers": [{"kind": "terminal", "component": 1, "terminal": 0}]
}"#;

/// Two unconnected resistors, each carrying a ground marker.
pub const AMBIGUOUS_JSON: &str = r#"{
  "components": [
    {"id": 1, "type": "resistor", "value": "1k",
     "terminals": [{"x": 0, "y": 0}, {"x": 100, "y": 0}]},
    {"id": 2, "type": "resistor", "value": "1k",
     "terminals": [{"x": 0, "y": 300}, {"x": 100, "y": 300}]}
  ],
  "groundMarkers": [
    {"kind": "terminal", "component": 1, "terminal": 0},
    {"kind": "terminal", "component": 2, "terminal": 0}
  ]
}"#;

/// Recoverable faults only: a dangling wire, no ground marker and an
/// unreadable resistor value.
pub const FAULTY_JSON: &str = r#"{
  "components": [
    {"id": 1, "type": "resistor", "value": "banana",
     "terminals": [{"x": 0, "y": 0}, {"x": 100, "y": 0}]},
    {"id": 2, "type": "capacitor", "value": "1u",
     "terminals": [{"x": 100, "y": 0}, {"x": 200, "y": 0}]}
  ],
  "wires": [
    {"id": 1, "endpointA": {"x": 200, "y": 0}, "endpointB": {"x": 400, "y": 400}}
  ]
}"#;
