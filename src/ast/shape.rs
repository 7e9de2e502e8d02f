use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The visual category of a node, which also selects its executor.
///
/// Only `Rectangle`, `RoundRectangle`, `Diamond` and `Circle` have syntax in
/// the flowchart language; the rest are accepted in graphs built elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
    Rectangle,
    RoundRectangle,
    Diamond,
    Circle,
    Hexagon,
    Parallelogram,
    Trapezoid,
}

impl NodeShape {
    pub const ALL: [NodeShape; 7] = [
        NodeShape::Rectangle,
        NodeShape::RoundRectangle,
        NodeShape::Diamond,
        NodeShape::Circle,
        NodeShape::Hexagon,
        NodeShape::Parallelogram,
        NodeShape::Trapezoid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeShape::Rectangle => "rectangle",
            NodeShape::RoundRectangle => "round_rectangle",
            NodeShape::Diamond => "diamond",
            NodeShape::Circle => "circle",
            NodeShape::Hexagon => "hexagon",
            NodeShape::Parallelogram => "parallelogram",
            NodeShape::Trapezoid => "trapezoid",
        }
    }
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| format!("Unknown node shape '{}'", s))
    }
}
