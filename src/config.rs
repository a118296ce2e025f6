use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::taxonomy::{ANIMAL_CLASSES, InteractionType, UNKNOWN};

pub type Rgb = [u8; 3];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub fill: Rgb,
    #[serde(default = "default_stroke")]
    pub stroke: Rgb,
}

fn default_stroke() -> Rgb {
    [15, 15, 15]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkStyle {
    pub color: Rgb,
    #[serde(default)]
    pub dashed: bool,
}

/// Colours keyed by taxonomic class, plus per-interaction link styles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub root: NodeStyle,
    pub kingdom: NodeStyle,
    pub categories: BTreeMap<String, NodeStyle>,
    pub unknown: NodeStyle,
    pub interactions: BTreeMap<InteractionType, LinkStyle>,
    pub reference_url_template: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let palette: [Rgb; 5] = [
            [214, 96, 77],
            [67, 147, 195],
            [90, 174, 97],
            [191, 129, 45],
            [153, 112, 171],
        ];
        let categories = ANIMAL_CLASSES
            .iter()
            .zip(palette)
            .map(|(class, fill)| {
                (
                    (*class).to_owned(),
                    NodeStyle {
                        fill,
                        stroke: default_stroke(),
                    },
                )
            })
            .collect();

        let interactions = InteractionType::ALL
            .into_iter()
            .map(|interaction| {
                let style = match interaction {
                    InteractionType::PreysOn => LinkStyle {
                        color: [200, 80, 70],
                        dashed: false,
                    },
                    InteractionType::Eats => LinkStyle {
                        color: [222, 160, 72],
                        dashed: false,
                    },
                    InteractionType::Pollinates => LinkStyle {
                        color: [120, 190, 120],
                        dashed: true,
                    },
                };
                (interaction, style)
            })
            .collect();

        Self {
            root: NodeStyle {
                fill: [245, 206, 93],
                stroke: default_stroke(),
            },
            kingdom: NodeStyle {
                fill: [150, 160, 172],
                stroke: default_stroke(),
            },
            categories,
            unknown: NodeStyle {
                fill: [128, 128, 128],
                stroke: default_stroke(),
            },
            interactions,
            reference_url_template: "https://www.gbif.org/search?q={name}".to_owned(),
        }
    }
}

impl StyleConfig {
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let raw = fs::read_to_string(path).map_err(|error| PipelineError::io(path, error))?;
        serde_json::from_str(&raw)
            .map_err(|error| PipelineError::json(path.display().to_string(), error))
    }

    /// Resolves a class to its category key; unmapped classes are `"Unknown"`.
    pub fn category<'a>(&'a self, class: Option<&'a str>) -> &'a str {
        class
            .filter(|class| self.categories.contains_key(*class))
            .unwrap_or(UNKNOWN)
    }

    pub fn category_style(&self, class: Option<&str>) -> &NodeStyle {
        class
            .and_then(|class| self.categories.get(class))
            .unwrap_or(&self.unknown)
    }

    pub fn link_style(&self, interaction: InteractionType) -> LinkStyle {
        self.interactions
            .get(&interaction)
            .cloned()
            .unwrap_or(LinkStyle {
                color: self.unknown.fill,
                dashed: interaction == InteractionType::Pollinates,
            })
    }
}

/// Geometry knobs for the radial layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub margin: f32,
    /// Leaf gap multiplier when neighbouring leaves have different parents.
    pub cross_parent_separation: f32,
    pub root_marker: f32,
    pub kingdom_marker: f32,
    pub family_marker: f32,
    pub min_marker: f32,
    pub marker_scale: f32,
    pub max_marker: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 120.0,
            cross_parent_separation: 2.0,
            root_marker: 12.0,
            kingdom_marker: 9.0,
            family_marker: 6.0,
            min_marker: 3.0,
            marker_scale: 1.2,
            max_marker: 18.0,
        }
    }
}
