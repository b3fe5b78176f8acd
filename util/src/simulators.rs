use serde::{Deserialize, Serialize};

/// Simulators a gym can be built for and evaluated against.
/// Serialized/deserialized in `lowercase` for task and profile JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Simulator {
    Questa,   // "questa" (Questa/ModelSim vcover reports)
    Xcelium,  // "xcelium" (Xcelium IMC reports)
    Vcs,      // "vcs"
    Verilator, // "verilator"
    Dsim,     // "dsim"
}

impl Simulator {
    /// Canonical lowercase name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Simulator::Questa => "questa",
            Simulator::Xcelium => "xcelium",
            Simulator::Vcs => "vcs",
            Simulator::Verilator => "verilator",
            Simulator::Dsim => "dsim",
        }
    }
}

impl std::fmt::Display for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Simulator::Questa).unwrap(),
            "\"questa\""
        );
        assert_eq!(
            serde_json::from_str::<Simulator>("\"xcelium\"").unwrap(),
            Simulator::Xcelium
        );
    }

    #[test]
    fn test_display_matches_serialized_form() {
        for sim in [
            Simulator::Questa,
            Simulator::Xcelium,
            Simulator::Vcs,
            Simulator::Verilator,
            Simulator::Dsim,
        ] {
            assert_eq!(format!("\"{sim}\""), serde_json::to_string(&sim).unwrap());
        }
    }
}
