use serde::{Deserialize, Serialize};

/// One annotated ply as persisted in a game's metadata blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveAnnotation {
    #[serde(rename = "move")]
    pub san: String,
    pub evaluation_diff: f64,
}

/// Persisted annotation shape: `{"moves": [{"move": .., "evaluation_diff": ..}, ..]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub moves: Vec<MoveAnnotation>,
}

impl Annotation {
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Move texts in ply order.
    pub fn sans(&self) -> Vec<&str> {
        self.moves.iter().map(|m| m.san.as_str()).collect()
    }
}

/// Id and display name of a stored game, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_json_shape() {
        let annotation = Annotation {
            moves: vec![
                MoveAnnotation { san: "e4".into(), evaluation_diff: 0.5 },
                MoveAnnotation { san: "e5".into(), evaluation_diff: -0.25 },
            ],
        };

        let json = annotation.to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "moves": [
                    {"move": "e4", "evaluation_diff": 0.5},
                    {"move": "e5", "evaluation_diff": -0.25},
                ]
            })
        );
        assert_eq!(Annotation::from_json(json).unwrap(), annotation);
        assert_eq!(annotation.sans(), vec!["e4", "e5"]);
    }

    #[test]
    fn test_annotation_rejects_wrong_shape() {
        let json = serde_json::json!({"moves": [{"san": "e4"}]});
        assert!(Annotation::from_json(json).is_err());
    }
}
