//! Drug label data used to build fair-balance inputs.

use crate::collaborators::LabelSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Disclaimer attached to patient-facing education content.
pub const PATIENT_DISCLAIMER: &str = "This information is for educational purposes only. \
Consult your healthcare provider before making any changes to your medication. \
Report any side effects to your doctor immediately.";

/// Disclaimer attached to professional-facing content.
pub const HCP_DISCLAIMER: &str = "For Healthcare Professional use only. \
This is not a diagnostic tool. \
Please refer to full prescribing information before prescribing.";

const DEFAULT_SAFETY_INFORMATION: &str = "Consult prescribing information for safety details.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugLabel {
    pub generic_name: String,
    pub brand_names: Vec<String>,
    pub drug_class: String,
    #[serde(default)]
    pub indications: Vec<String>,
    pub key_benefits: Vec<String>,
    pub common_side_effects: Vec<String>,
    pub serious_risks: Vec<String>,
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub boxed_warning: Option<String>,
    #[serde(default)]
    pub monitoring: Option<String>,
}

impl DrugLabel {
    /// Display name: first brand name, else the generic name.
    pub fn display_name(&self) -> &str {
        self.brand_names
            .first()
            .map_or(self.generic_name.as_str(), String::as_str)
    }

    /// Safety paragraph: up to four common side effects, up to three serious risks and the
    /// monitoring note.
    pub fn safety_information(&self) -> String {
        let mut parts = Vec::new();
        if !self.common_side_effects.is_empty() {
            let effects: Vec<&str> = self
                .common_side_effects
                .iter()
                .take(4)
                .map(String::as_str)
                .collect();
            parts.push(format!("Common side effects include: {}.", effects.join(", ")));
        }
        if !self.serious_risks.is_empty() {
            let risks: Vec<&str> = self
                .serious_risks
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            parts.push(format!("Serious risks: {}.", risks.join("; ")));
        }
        if let Some(monitoring) = self.monitoring.as_deref().filter(|m| !m.trim().is_empty()) {
            parts.push(monitoring.to_string());
        }

        if parts.is_empty() {
            DEFAULT_SAFETY_INFORMATION.to_string()
        } else {
            parts.join(" ")
        }
    }

    fn matches(&self, key: &str, name: &str) -> bool {
        key == name
            || self.generic_name.to_lowercase() == name
            || self.brand_names.iter().any(|b| b.to_lowercase() == name)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// In-memory label source keyed by lowercase drug name.
#[derive(Clone, Debug, Default)]
pub struct StaticLabelSource {
    labels: BTreeMap<String, DrugLabel>,
}

impl StaticLabelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, key: &str, label: DrugLabel) -> Self {
        self.labels.insert(key.trim().to_lowercase(), label);
        self
    }

    /// Labels for metformin, semaglutide (Ozempic) and apixaban (Eliquis).
    pub fn with_defaults() -> Self {
        Self::new()
            .with_label(
                "metformin",
                DrugLabel {
                    generic_name: "Metformin Hydrochloride".into(),
                    brand_names: strings(&["Glucophage", "Fortamet", "Riomet"]),
                    drug_class: "Biguanide".into(),
                    indications: strings(&["Type 2 Diabetes Mellitus"]),
                    key_benefits: strings(&[
                        "Helps control blood sugar levels",
                        "Reduces risk of diabetes complications",
                        "May help with weight management",
                        "First-line treatment for Type 2 diabetes",
                    ]),
                    common_side_effects: strings(&[
                        "Nausea or upset stomach",
                        "Diarrhea",
                        "Loss of appetite",
                        "Metallic taste",
                    ]),
                    serious_risks: strings(&[
                        "Lactic acidosis (rare but serious)",
                        "Vitamin B12 deficiency with long-term use",
                        "Low blood sugar when combined with other diabetes medications",
                    ]),
                    contraindications: strings(&[
                        "Severe kidney disease",
                        "Metabolic acidosis",
                        "Dehydration",
                        "Heavy alcohol use",
                    ]),
                    boxed_warning: Some(
                        "LACTIC ACIDOSIS: Metformin can cause a rare but serious condition \
called lactic acidosis. Stop taking metformin and seek medical help \
immediately if you experience unusual muscle pain, difficulty breathing, \
stomach pain with nausea/vomiting, dizziness, or feeling cold."
                            .into(),
                    ),
                    monitoring: Some("Regular kidney function tests recommended".into()),
                },
            )
            .with_label(
                "ozempic",
                DrugLabel {
                    generic_name: "Semaglutide".into(),
                    brand_names: strings(&["Ozempic"]),
                    drug_class: "GLP-1 Receptor Agonist".into(),
                    indications: strings(&[
                        "Type 2 Diabetes Mellitus",
                        "Cardiovascular Risk Reduction",
                    ]),
                    key_benefits: strings(&[
                        "Significant blood sugar control",
                        "Weight loss in many patients",
                        "Reduced cardiovascular risk",
                        "Once-weekly dosing for convenience",
                    ]),
                    common_side_effects: strings(&[
                        "Nausea",
                        "Vomiting",
                        "Diarrhea",
                        "Abdominal pain",
                        "Constipation",
                    ]),
                    serious_risks: strings(&[
                        "Thyroid C-cell tumors (seen in rodent studies)",
                        "Pancreatitis",
                        "Diabetic retinopathy complications",
                        "Kidney problems",
                        "Gallbladder problems",
                    ]),
                    contraindications: strings(&[
                        "Personal or family history of medullary thyroid carcinoma",
                        "Multiple Endocrine Neoplasia syndrome type 2",
                        "History of pancreatitis",
                    ]),
                    boxed_warning: Some(
                        "THYROID C-CELL TUMORS: In rodent studies, semaglutide caused thyroid \
C-cell tumors. It is unknown if this occurs in humans. Ozempic is \
contraindicated in patients with a personal or family history of medullary \
thyroid carcinoma or in patients with Multiple Endocrine Neoplasia syndrome type 2."
                            .into(),
                    ),
                    monitoring: Some(
                        "Regular thyroid monitoring, kidney function, and eye exams".into(),
                    ),
                },
            )
            .with_label(
                "eliquis",
                DrugLabel {
                    generic_name: "Apixaban".into(),
                    brand_names: strings(&["Eliquis"]),
                    drug_class: "Factor Xa Inhibitor (Blood Thinner)".into(),
                    indications: strings(&[
                        "Stroke Prevention in Atrial Fibrillation",
                        "DVT/PE Treatment and Prevention",
                    ]),
                    key_benefits: strings(&[
                        "Reduces stroke risk in atrial fibrillation",
                        "Prevents blood clots",
                        "No routine blood monitoring required",
                        "Predictable anticoagulation",
                    ]),
                    common_side_effects: strings(&["Minor bleeding", "Bruising", "Nausea", "Anemia"]),
                    serious_risks: strings(&[
                        "Major bleeding including fatal bleeding",
                        "Spinal/epidural hematoma with spinal procedures",
                        "Increased stroke risk if stopped abruptly",
                    ]),
                    contraindications: strings(&[
                        "Active major bleeding",
                        "Prosthetic heart valves",
                        "Severe liver disease",
                    ]),
                    boxed_warning: Some(
                        "DISCONTINUING INCREASES STROKE RISK: Premature discontinuation increases \
the risk of thrombotic events. If anticoagulation must be discontinued for \
a reason other than pathological bleeding, consider coverage with another \
anticoagulant.\n\n\
SPINAL/EPIDURAL HEMATOMA: Epidural or spinal hematomas may occur in patients \
treated with Eliquis who are receiving neuraxial anesthesia or undergoing \
spinal puncture. These hematomas may result in long-term or permanent paralysis."
                            .into(),
                    ),
                    monitoring: Some("Regular assessments for bleeding, kidney function".into()),
                },
            )
    }

    /// Looks a drug up by key, brand name or generic name, ignoring case.
    pub fn find(&self, drug_name: &str) -> Option<&DrugLabel> {
        let name = drug_name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }
        self.labels.get(&name).or_else(|| {
            self.labels
                .iter()
                .find(|(key, label)| label.matches(key, &name))
                .map(|(_, label)| label)
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }
}

#[async_trait]
impl LabelSource for StaticLabelSource {
    async fn get_label(&self, drug_name: &str) -> Option<DrugLabel> {
        self.find(drug_name).cloned()
    }
}
