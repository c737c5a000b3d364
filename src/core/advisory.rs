use crate::core::dataset::normalize_category;
use crate::core::{AdvisoryEntry, AdvisorySection, CropAdvisory};
use crate::utils::error::{PestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 作物名稱對應到害蟲清單與防治建議
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisoryCatalog {
    #[serde(default)]
    pub crops: BTreeMap<String, CropAdvisory>,
}

fn section(title: &str, entries: &[(&str, &str)]) -> AdvisorySection {
    AdvisorySection {
        title: title.to_string(),
        entries: entries
            .iter()
            .map(|(label, text)| AdvisoryEntry {
                label: label.to_string(),
                text: text.to_string(),
            })
            .collect(),
    }
}

fn advisory(pests: &[&str], sections: Vec<AdvisorySection>) -> CropAdvisory {
    CropAdvisory {
        pests: pests.iter().map(|p| p.to_string()).collect(),
        sections,
    }
}

impl AdvisoryCatalog {
    pub fn builtin() -> Self {
        let mut crops = BTreeMap::new();

        crops.insert(
            "tomatoes".to_string(),
            advisory(
                &["Aphids", "Whiteflies", "Hornworms"],
                vec![section(
                    "Mitigation",
                    &[
                        ("A: early_stage", "Use insecticidal soap, plant companion crops like marigolds"),
                        ("B: mid_stage", "Regularly inspect plants, use neem oil, introduce beneficial insects"),
                        ("C: late_stage", "Harvest ripe tomatoes promptly, remove plant debris, practice crop rotation"),
                    ],
                )],
            ),
        );

        crops.insert(
            "maize".to_string(),
            advisory(
                &["Armyworms", "Borers", "Cutworms"],
                vec![
                    section(
                        "Mitigation",
                        &[
                            ("A: Early Stages", "Practice clean cultivation, use biological control methods"),
                            ("B: Mid Stages", "Implement crop rotation, use pheromone traps"),
                            ("C: Later Stages", "Harvest maize promptly, destroy crop residues, use resistant varieties"),
                        ],
                    ),
                    section(
                        "Procedures",
                        &[
                            ("Land Preparation", "The piece of land for planting maize should be prepared early, before the onset of rains, for weeds to decompose before planting."),
                            ("1", "Plough the land and make it level with a fine tilth. Considering the size of the land, machines like tractors or ox-drawn ploughs can be used, observing the correct spacing."),
                            ("2", "Mix soil with manure and biochar for efficient and improved nutrient uptake as well as stabilizing soil pH."),
                            ("3", "Make holes at a spacing of 90 x 30–50 cm if soil fertility is low or 75 x 25–50 cm if soil fertility is relatively high."),
                            ("4", "Place 1 or 2 seeds per hole, or alternate 1 and 2 seeds at a depth of about 4 cm if the soil is moist and about 10 cm if the soil is dry."),
                            ("5", "Cover the seeds with loose soil."),
                        ],
                    ),
                    section(
                        "Operations",
                        &[
                            ("Thinning and Gapping", "Gapping is done to replace seeds that did not germinate after others germinated completely. Thinning is done when maize has grown to about 15 cm in height by removing weak and deformed seedlings to make space for healthy seedlings in a hole."),
                            ("Fertilizer application", "To achieve maximum yield, fertilizer should be applied on time. Manure and biochar can also be added to soil with little or no organic matter. When planting manually, thoroughly mix soil with a teaspoonful of fertilizer into each planting hole to ensure that it doesn’t burn the seeds. Place the seeds on top of the soil and feel for softness. DAP is recommended for planting because it contains phosphorous, which helps in root development."),
                            ("Top dressing", "Maize can be top dressed with CA 2-3 weeks after planting or when it is 45 cm (1 ft) high. One teaspoon of fertilizer should be applied to the base of each plant, 15 cm away from the plant in a ring or along the row. Top dress in two stages in areas with heavy rainfall: the first six weeks after sowing and the second 10-15 days later, or just before tussling. In areas experiencing low rainfall, topdressing is done only once at a rate of 50–100 kg per acre. Using CAN and urea for topdressing is good because it fixes nitrogen in the soil. Nitrogen increases the green color of the leaves to make food for the plant."),
                            ("Weeding", "Remove weeds mechanically, manually, or by using herbicides to prevent them from competing with the crops for nutrients, water, and light. First weeding, if done manually, should be done three weeks after planting, depending on the intensity of weeds in the field. Herbicides can be applied in two phases: pre-emergence, which is used before the maize germinates and weeds appear, and post-emergence, which is applied after the maize and weeds germinate."),
                            ("Harvesting", "Normally, each maize stalk should yield one large ear of maize, but in ideal conditions, the stalk can yield a second, slightly smaller ear that matures slightly later than the first. Maize is ready for harvesting when the kernels within the husks are well packed and produce a milky substance when the kernel is punctured."),
                        ],
                    ),
                ],
            ),
        );

        crops.insert(
            "potatoes".to_string(),
            advisory(
                &["Colorado Potato Beetles", "Aphids", "Flea Beetles"],
                vec![section(
                    "Mitigation",
                    &[
                        ("A: early_stage", "Remove and destroy infested leaves, use insecticidal soap"),
                        ("B: mid_stage", "Rotate crops, plant potatoes away from tomatoes, peppers"),
                        ("C: late_stage", "Harvest potatoes when mature, remove plant debris, practice crop rotation"),
                    ],
                )],
            ),
        );

        crops.insert(
            "beans".to_string(),
            advisory(
                &["Aphids", "Mexican Bean Beetles", "Thrips"],
                vec![section(
                    "Mitigation",
                    &[
                        ("A: early_stage", "Use insecticidal soap, encourage natural predators"),
                        ("B: mid_stage", "Introduce ladybugs, handpick beetles, rotate crops"),
                        ("C: late_stage", "Harvest beans regularly, remove debris, practice crop rotation"),
                    ],
                )],
            ),
        );

        crops.insert(
            "wheat".to_string(),
            advisory(
                &["Aphids", "Hessian Fly", "Armyworms"],
                vec![section(
                    "Mitigation",
                    &[
                        ("A: early_stage", "Select resistant wheat varieties, monitor for aphids"),
                        ("B: mid_stage", "Practice crop rotation, use insecticidal soap sparingly"),
                        ("C: late_stage", "Harvest wheat promptly, destroy crop residues, practice clean cultivation"),
                    ],
                )],
            ),
        );

        Self { crops }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: AdvisoryCatalog =
            toml::from_str(content).map_err(|e| PestError::ConfigValidationError {
                field: "advisory".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        // key 統一正規化，查詢時才對得上
        let crops = parsed
            .crops
            .into_iter()
            .map(|(name, advice)| (normalize_category(&name), advice))
            .collect();
        Ok(Self { crops })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn lookup(&self, crop: &str) -> Option<&CropAdvisory> {
        self.crops.get(&normalize_category(crop))
    }

    pub fn crop_names(&self) -> impl Iterator<Item = &str> {
        self.crops.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }
}
