/// A problem description as submitted by a client.
///
/// ```json
/// { "type": "standard", "objective": "3x1 + 2x2", "constraints": ["2x1 + x2 <= 8"] }
/// { "type": "transportation", "supply": [20, 30], "demand": [25, 25], "costs": [[8, 6], [9, 12]] }
/// { "type": "tsp", "cities": ["A", "B"], "distances": [[0, 10], [10, 0]] }
/// ```
///
/// A missing `type` means `standard`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemRequest {
    #[cfg_attr(feature = "serde", serde(alias = "lp"))]
    Standard {
        objective: String,
        constraints: Vec<String>,
    },
    Transportation {
        supply: Vec<f64>,
        demand: Vec<f64>,
        costs: Vec<Vec<f64>>,
    },
    Tsp {
        cities: Vec<String>,
        distances: Vec<Vec<f64>>,
    },
}

impl ProblemRequest {
    #[cfg(feature = "serde")]
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        let mut value: serde_json::Value = serde_json::from_str(source)?;
        if let Some(object) = value.as_object_mut() {
            object
                .entry("type")
                .or_insert_with(|| serde_json::Value::from("standard"));
        }
        serde_json::from_value(value)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProblemRequest::Standard { .. } => "standard",
            ProblemRequest::Transportation { .. } => "transportation",
            ProblemRequest::Tsp { .. } => "tsp",
        }
    }
}
