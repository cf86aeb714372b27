//! Condition classification.
//!
//! There is no model behind this yet. `ApWeightedClassifier` produces
//! plausible-looking output from a fixed table of per-condition average
//! precision values so the rest of the pipeline can be exercised. A real
//! inference backend only has to implement `Classifier`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::history::{RiskLevel, ScanRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKey {
    Normal,
    Diabetes,
    Glaucoma,
    Cataract,
    Amd,
    Hypertension,
    Myopia,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub key: ConditionKey,
    pub name: &'static str,
    /// average precision, used only as a base weight
    pub ap: f64,
    pub description: &'static str,
}

pub static CONDITIONS: [Condition; 8] = [
    Condition {
        key: ConditionKey::Normal,
        name: "Normal",
        ap: 0.5,
        description: "No significant retinal abnormalities detected",
    },
    Condition {
        key: ConditionKey::Diabetes,
        name: "Diabetic Retinopathy",
        ap: 0.530303,
        description: "Blood vessel damage in the retina caused by diabetes",
    },
    Condition {
        key: ConditionKey::Glaucoma,
        name: "Glaucoma",
        ap: 0.364706,
        description: "Increased pressure leading to optic nerve damage",
    },
    Condition {
        key: ConditionKey::Cataract,
        name: "Cataract",
        ap: 0.852521,
        description: "Clouding of the eye's lens affecting vision",
    },
    Condition {
        key: ConditionKey::Amd,
        name: "Age-related Macular Degeneration (AMD)",
        ap: 0.390385,
        description: "Deterioration of central retina (macula)",
    },
    Condition {
        key: ConditionKey::Hypertension,
        name: "Hypertensive Retinopathy",
        ap: 0.621212,
        description: "Retinal vessel changes due to high blood pressure",
    },
    Condition {
        key: ConditionKey::Myopia,
        name: "Pathological Myopia",
        ap: 0.584759,
        description: "Elongated eyeball causing retinal stretching/changes",
    },
    Condition {
        key: ConditionKey::Other,
        name: "Other Retinal Diseases",
        ap: 0.440476,
        description: "Other less common retinal pathologies",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionResult {
    pub key: ConditionKey,
    pub name: &'static str,
    pub description: &'static str,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub overall_risk: RiskLevel,
    pub confidence: f64,
    pub predicted: ConditionResult,
    /// descending by probability, sums to 1
    pub all: Vec<ConditionResult>,
}

impl Classification {
    /// Record for this result. Takes the top condition and its probability.
    pub fn to_record(&self, image_uri: impl Into<String>) -> ScanRecord {
        ScanRecord::new(
            image_uri,
            self.overall_risk,
            self.predicted.name,
            self.predicted.probability,
        )
    }
}

pub trait Classifier {
    fn classify(&mut self) -> Classification;
}

/// Randomized stand-in for a model.
///
/// Normal takes 12-25% of the mass. The rest is split across the other
/// conditions in proportion to `ap * U(0.5, 1.5)`. Risk is high 95% of the
/// time, otherwise low for a normal top class and moderate for anything else.
pub struct ApWeightedClassifier<R = StdRng> {
    rng: R,
}

impl ApWeightedClassifier<StdRng> {
    pub fn new() -> Self {
        ApWeightedClassifier { rng: StdRng::from_entropy() }
    }

    pub fn with_seed(seed: u64) -> Self {
        ApWeightedClassifier { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for ApWeightedClassifier<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ApWeightedClassifier<R> {
    pub fn from_rng(rng: R) -> Self {
        ApWeightedClassifier { rng }
    }
}

impl<R: Rng> Classifier for ApWeightedClassifier<R> {
    fn classify(&mut self) -> Classification {
        let normal_prob: f64 = self.rng.gen_range(0.12..0.25);
        let remaining = (1.0 - normal_prob).max(0.0);

        let weighted: Vec<(&Condition, f64)> = CONDITIONS
            .iter()
            .filter(|c| c.key != ConditionKey::Normal)
            .map(|c| (c, c.ap * self.rng.gen_range(0.5..1.5)))
            .collect();

        let mut weight_sum: f64 = weighted.iter().map(|(_, w)| w).sum();
        if weight_sum <= 0.0 {
            weight_sum = 1.0;
        }

        let mut all: Vec<ConditionResult> = CONDITIONS
            .iter()
            .filter(|c| c.key == ConditionKey::Normal)
            .map(|c| result_for(c, normal_prob))
            .chain(
                weighted
                    .iter()
                    .map(|(c, w)| result_for(c, w / weight_sum * remaining)),
            )
            .collect();

        all.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        let predicted = all[0].clone();

        let confidence = self.rng.gen_range(0.50..0.85);

        let overall_risk = if self.rng.gen_bool(0.95) {
            RiskLevel::High
        } else if predicted.key == ConditionKey::Normal {
            RiskLevel::Low
        } else {
            RiskLevel::Moderate
        };

        Classification { overall_risk, confidence, predicted, all }
    }
}

fn result_for(condition: &Condition, probability: f64) -> ConditionResult {
    ConditionResult {
        key: condition.key,
        name: condition.name,
        description: condition.description,
        probability,
    }
}
