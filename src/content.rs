//! Tracing content catalog
//!
//! Static reference content for the tracing activity: each level carries one
//! path variant per support tier, authored in a 300 x 300 unit box. Items
//! without a variant for a tier fall back to the Mild variant.

use crate::error::EngineError;
use crate::geometry::ReferencePath;
use crate::types::DifficultyTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracingCategory {
    Lines,
    Letters,
    Numbers,
    Shapes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingVariant {
    pub label: String,
    pub path_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingItem {
    pub id: String,
    pub category: TracingCategory,
    pub label: String,
    pub variants: BTreeMap<DifficultyTier, TracingVariant>,
}

impl TracingItem {
    /// Variant for a tier, falling back to Mild
    pub fn variant(&self, tier: DifficultyTier) -> Option<&TracingVariant> {
        self.variants
            .get(&tier)
            .or_else(|| self.variants.get(&DifficultyTier::Mild))
    }

    /// Parse the tier's path, authored in a box of side `extent`
    pub fn reference_path(
        &self,
        tier: DifficultyTier,
        extent: f64,
    ) -> Result<ReferencePath, EngineError> {
        let variant = self
            .variant(tier)
            .ok_or_else(|| EngineError::UnknownItem(format!("{} ({tier})", self.id)))?;
        ReferencePath::parse(&variant.path_data, extent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingCatalog {
    items: Vec<TracingItem>,
}

impl TracingCatalog {
    pub fn new(items: Vec<TracingItem>) -> Self {
        Self { items }
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn items(&self) -> &[TracingItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&TracingItem, EngineError> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| EngineError::UnknownItem(id.to_string()))
    }

    /// Item following `id` in catalog order
    pub fn next_after(&self, id: &str) -> Option<&TracingItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        self.items.get(index + 1)
    }

    /// The built-in line levels
    pub fn builtin() -> Self {
        Self::new(vec![
            line("t1", "Straight Lines", [
                ("Short Drop", "M 150,50 L 150,150"),
                ("Long Drop", "M 150,20 L 150,280"),
                ("Flat Line", "M 50,150 L 250,150"),
                ("Cross", "M 150,50 L 150,250 M 50,150 L 250,150"),
            ]),
            line("t2", "Slopes", [
                ("Rain Drop", "M 100,50 L 150,150"),
                ("Slide Down", "M 50,50 L 250,250"),
                ("Slide Up", "M 50,250 L 250,50"),
                ("X Marks Spot", "M 50,50 L 250,250 M 250,50 L 50,250"),
            ]),
            line("t3", "Corners", [
                ("L Shape", "M 100,50 L 100,200 L 200,200"),
                ("7 Shape", "M 50,50 L 250,50 L 150,250"),
                ("Open Box", "M 50,50 L 50,250 L 250,250 L 250,50"),
                ("Zig Zag Steps", "M 50,250 L 50,150 L 150,150 L 150,50 L 250,50"),
            ]),
            line("t4", "Curves", [
                ("Smile", "M 50,150 Q 150,250 250,150"),
                ("Frown", "M 50,200 Q 150,50 250,200"),
                ("C Curve", "M 200,50 Q 50,150 200,250"),
                ("S Curve", "M 200,50 C 50,50 50,250 200,250"),
            ]),
            line("t5", "Waves", [
                ("Big Hill", "M 50,200 Q 150,50 250,200"),
                ("Two Hills", "M 30,200 Q 90,100 150,200 Q 210,100 270,200"),
                ("Ocean Wave", "M 30,150 Q 90,50 150,150 T 270,150"),
                ("Sine Wave", "M 30,150 C 90,50 150,250 210,150 T 270,150"),
            ]),
            line("t6", "Loops", [
                ("Circle", "M 150,50 A 100,100 0 1,1 150,250 A 100,100 0 1,1 150,50"),
                ("Egg", "M 150,50 C 50,50 50,250 150,250 C 250,250 250,50 150,50"),
                ("Loop-de-Loop", "M 50,200 C 50,0 250,0 250,200"),
                (
                    "Figure 8",
                    "M 150,150 C 50,150 50,50 150,50 C 250,50 250,150 150,150 \
                     C 50,150 50,250 150,250 C 250,250 250,150 150,150",
                ),
            ]),
            line("t7", "Spikes", [
                ("Mountain", "M 50,250 L 150,50 L 250,250"),
                ("Teeth", "M 30,200 L 85,100 L 140,200 L 195,100 L 250,200"),
                (
                    "Castle",
                    "M 50,200 L 50,100 L 100,100 L 100,200 L 150,200 L 150,100 \
                     L 200,100 L 200,200 L 250,200 L 250,100",
                ),
                ("Pulse", "M 20,150 L 80,150 L 100,50 L 140,250 L 180,150 L 280,150"),
            ]),
        ])
    }
}

impl Default for TracingCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Build a line-category item from variants listed Profound → Mild
fn line(id: &str, label: &str, variants: [(&str, &str); 4]) -> TracingItem {
    TracingItem {
        id: id.to_string(),
        category: TracingCategory::Lines,
        label: label.to_string(),
        variants: DifficultyTier::ALL
            .into_iter()
            .zip(variants)
            .map(|(tier, (label, path_data))| {
                (
                    tier,
                    TracingVariant {
                        label: label.to_string(),
                        path_data: path_data.to_string(),
                    },
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_paths_all_parse() {
        let catalog = TracingCatalog::builtin();
        assert_eq!(catalog.len(), 7);
        for item in catalog.items() {
            for tier in DifficultyTier::ALL {
                let path = item.reference_path(tier, 300.0);
                assert!(path.is_ok(), "{} {tier}: {:?}", item.id, path.err());
            }
        }
    }

    #[test]
    fn test_variant_lookup_and_fallback() {
        let catalog = TracingCatalog::builtin();
        let item = catalog.get("t1").unwrap();
        assert_eq!(item.variant(DifficultyTier::Severe).unwrap().label, "Long Drop");

        let mut sparse = item.clone();
        sparse.variants.remove(&DifficultyTier::Profound);
        assert_eq!(sparse.variant(DifficultyTier::Profound).unwrap().label, "Cross");
    }

    #[test]
    fn test_unknown_item() {
        let catalog = TracingCatalog::builtin();
        assert!(matches!(catalog.get("t99"), Err(EngineError::UnknownItem(_))));
    }

    #[test]
    fn test_next_after() {
        let catalog = TracingCatalog::builtin();
        assert_eq!(catalog.next_after("t3").map(|i| i.id.as_str()), Some("t4"));
        assert!(catalog.next_after("t7").is_none());
    }

    #[test]
    fn test_catalog_json_roundtrip() {
        let catalog = TracingCatalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(TracingCatalog::from_json(&json).unwrap(), catalog);
    }
}
