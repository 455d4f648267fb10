//! Sheet materials offered by the service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sheet material for laser cutting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Steel,
    Stainless,
    Aluminum,
    Acrylic,
}

impl Material {
    pub const ALL: [Material; 4] = [
        Material::Steel,
        Material::Stainless,
        Material::Aluminum,
        Material::Acrylic,
    ];

    /// Wire value sent to the service
    pub fn as_str(self) -> &'static str {
        match self {
            Material::Steel => "steel",
            Material::Stainless => "stainless",
            Material::Aluminum => "aluminum",
            Material::Acrylic => "acrylic",
        }
    }

    /// Human readable name including the grade
    pub fn label(self) -> &'static str {
        match self {
            Material::Steel => "SS400 steel",
            Material::Stainless => "SUS stainless",
            Material::Aluminum => "AL aluminum",
            Material::Acrylic => "Acrylic",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Material {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Material::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Material::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown material `{}` (expected one of: {})", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_material() {
        assert_eq!("steel".parse::<Material>().unwrap(), Material::Steel);
        assert_eq!(" Aluminum ".parse::<Material>().unwrap(), Material::Aluminum);
        let err = "titanium".parse::<Material>().unwrap_err();
        assert!(err.contains("acrylic"));
    }

    #[test]
    fn test_material_wire_value() {
        let value = serde_json::to_value(Material::Stainless).unwrap();
        assert_eq!(value, serde_json::json!("stainless"));
        assert_eq!(Material::default(), Material::Steel);
    }
}
