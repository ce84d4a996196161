//! Billing mode tags and the material enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BillingError;

/// One of the three mutually independent billing modes a form can activate.
///
/// The serialized form is the lowercase tag used in `billingMethods`.
///
/// # Example
///
/// ```
/// use yard_billing::models::BillingMode;
///
/// let mode: BillingMode = "different".parse().unwrap();
/// assert_eq!(mode, BillingMode::Different);
/// assert_eq!(mode.to_string(), "different");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    /// Single aggregate weight/rate pair split into account and cash portions.
    Half,
    /// Multiple loading lines aggregated into one invoice.
    Weight,
    /// Multiple material lines aggregated into one invoice.
    Different,
}

impl BillingMode {
    /// All modes, in display order.
    pub const ALL: [BillingMode; 3] = [BillingMode::Half, BillingMode::Weight, BillingMode::Different];

    /// Returns the wire tag for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingMode::Half => "half",
            BillingMode::Weight => "weight",
            BillingMode::Different => "different",
        }
    }

    /// Returns the human-readable name shown next to the mode's totals.
    pub fn label(&self) -> &'static str {
        match self {
            BillingMode::Half => "Half Billing",
            BillingMode::Weight => "Weight Billing",
            BillingMode::Different => "Different Material Billing",
        }
    }

    /// Returns true if the mode carries a list of line items.
    pub fn has_lines(&self) -> bool {
        !matches!(self, BillingMode::Half)
    }
}

impl fmt::Display for BillingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingMode {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "half" => Ok(BillingMode::Half),
            "weight" => Ok(BillingMode::Weight),
            "different" => Ok(BillingMode::Different),
            other => Err(BillingError::UnknownBillingMode {
                tag: other.to_string(),
            }),
        }
    }
}

/// Materials handled by the yard for multi-material billing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Material {
    /// Run-of-mine coal.
    #[default]
    #[serde(rename = "E-ROM")]
    ERom,
    /// Steam coal.
    #[serde(rename = "F-STEAM")]
    FSteam,
    /// Boulder coal.
    #[serde(rename = "B-BOULDER")]
    BBoulder,
}

impl Material {
    /// All materials, in display order.
    pub const ALL: [Material; 3] = [Material::ERom, Material::FSteam, Material::BBoulder];

    /// Returns the material code as shown on the weighbridge slip.
    pub fn as_str(&self) -> &'static str {
        match self {
            Material::ERom => "E-ROM",
            Material::FSteam => "F-STEAM",
            Material::BBoulder => "B-BOULDER",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Material {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Material::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BillingError::UnknownMaterial {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_mode_serializes_as_tag() {
        let json = serde_json::to_string(&BillingMode::Weight).unwrap();
        assert_eq!(json, "\"weight\"");

        let mode: BillingMode = serde_json::from_str("\"half\"").unwrap();
        assert_eq!(mode, BillingMode::Half);
    }

    #[test]
    fn test_unknown_billing_mode_is_rejected() {
        let result = "quarter".parse::<BillingMode>();
        match result {
            Err(BillingError::UnknownBillingMode { tag }) => assert_eq!(tag, "quarter"),
            other => panic!("Expected UnknownBillingMode, got {:?}", other),
        }
    }

    #[test]
    fn test_only_half_has_no_lines() {
        assert!(!BillingMode::Half.has_lines());
        assert!(BillingMode::Weight.has_lines());
        assert!(BillingMode::Different.has_lines());
    }

    #[test]
    fn test_material_serializes_with_yard_codes() {
        assert_eq!(
            serde_json::to_string(&Material::BBoulder).unwrap(),
            "\"B-BOULDER\""
        );
        let material: Material = serde_json::from_str("\"F-STEAM\"").unwrap();
        assert_eq!(material, Material::FSteam);
    }

    #[test]
    fn test_material_default_is_e_rom() {
        assert_eq!(Material::default(), Material::ERom);
    }

    #[test]
    fn test_material_parse_ignores_case() {
        assert_eq!("e-rom".parse::<Material>().unwrap(), Material::ERom);
        assert!("ANTHRACITE".parse::<Material>().is_err());
    }

    #[test]
    fn test_unknown_material_fails_deserialization() {
        let result: Result<Material, _> = serde_json::from_str("\"C-SLACK\"");
        assert!(result.is_err());
    }
}
