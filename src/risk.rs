//! Health risk heuristics
//!
//! Risks are re-derived on demand from a profile and goal snapshot and are
//! never stored. Each category starts from a fixed base and applies linear
//! adjustments for the factors it responds to.

use crate::types::{ActivityLevel, Goal, RiskAssessment, RiskFactor, RiskLevel, UserProfile};

/// Lowest reported risk percentage
pub const MIN_RISK: f64 = 1.0;
/// Highest reported risk percentage
pub const MAX_RISK: f64 = 95.0;
/// Age above which each additional year adds risk
pub const AGE_THRESHOLD: u32 = 35;
/// Percentage points per year above [`AGE_THRESHOLD`]
pub const AGE_RISK_PER_YEAR: f64 = 0.5;

/// A base risk category
#[derive(Debug, Clone, Copy)]
pub struct BaseRisk {
    pub category: &'static str,
    pub risk: f64,
    pub description: &'static str,
    pub factors: &'static [RiskFactor],
}

/// Fixed base categories, in display order
pub const BASE_RISKS: [BaseRisk; 4] = [
    BaseRisk {
        category: "Cardiovascular",
        risk: 15.0,
        description: "Risk of Heart Disease",
        factors: &[RiskFactor::Age, RiskFactor::Activity, RiskFactor::Goals],
    },
    BaseRisk {
        category: "Metabolic",
        risk: 12.0,
        description: "Risk of Type 2 Diabetes",
        factors: &[RiskFactor::Activity, RiskFactor::Goals],
    },
    BaseRisk {
        category: "Musculoskeletal",
        risk: 20.0,
        description: "Risk of Osteoarthritis",
        factors: &[RiskFactor::Age, RiskFactor::Activity],
    },
    BaseRisk {
        category: "Respiratory",
        risk: 8.0,
        description: "Risk of Respiratory Issues",
        factors: &[RiskFactor::Activity],
    },
];

/// Snapshot-derived inputs shared by every category
#[derive(Debug, Clone, Copy, PartialEq)]
struct RiskInputs {
    age: u32,
    activity_modifier: f64,
    completion_rate: f64,
    sedentary: bool,
}

impl RiskInputs {
    fn from_snapshot(profile: &UserProfile, goals: &[Goal]) -> Self {
        let activity = profile.activity();
        let completed = goals.iter().filter(|g| g.completed).count();
        let total = goals.len().max(1);

        Self {
            age: profile.age_or_default(),
            activity_modifier: activity.map(|a| a.risk_modifier()).unwrap_or(0.0),
            completion_rate: completed as f64 / total as f64 * 100.0,
            sedentary: activity == Some(ActivityLevel::Sedentary),
        }
    }
}

/// Compute risk assessments for all base categories.
///
/// Returns an empty list when there is no profile.
pub fn compute_risks(profile: Option<&UserProfile>, goals: &[Goal]) -> Vec<RiskAssessment> {
    let Some(profile) = profile else {
        return Vec::new();
    };
    let inputs = RiskInputs::from_snapshot(profile, goals);

    BASE_RISKS
        .iter()
        .map(|base| assess(base, &inputs))
        .collect()
}

fn assess(base: &BaseRisk, inputs: &RiskInputs) -> RiskAssessment {
    let mut adjusted = base.risk;

    if base.factors.contains(&RiskFactor::Age) && inputs.age > AGE_THRESHOLD {
        adjusted += f64::from(inputs.age - AGE_THRESHOLD) * AGE_RISK_PER_YEAR;
    }

    if base.factors.contains(&RiskFactor::Activity) {
        adjusted += inputs.activity_modifier;
    }

    // Sign as observed: lower completion lowers risk.
    if base.factors.contains(&RiskFactor::Goals) {
        adjusted += -((100.0 - inputs.completion_rate) * 0.1);
    }

    let risk = adjusted.round().clamp(MIN_RISK, MAX_RISK) as u8;
    let level = RiskLevel::from_risk(risk);

    RiskAssessment {
        category: base.category.to_string(),
        risk,
        description: base.description.to_string(),
        factors: base.factors.to_vec(),
        level,
        recommendations: recommendations(base, inputs, level),
    }
}

fn recommendations(base: &BaseRisk, inputs: &RiskInputs, level: RiskLevel) -> Vec<String> {
    let mut out = Vec::new();

    if base.factors.contains(&RiskFactor::Age) && inputs.age > AGE_THRESHOLD {
        out.push("Regular health check-ups recommended");
    }
    if base.factors.contains(&RiskFactor::Activity) && inputs.sedentary {
        out.push("Increase physical activity level");
    }
    if base.factors.contains(&RiskFactor::Goals) {
        out.push("Improve goal completion rate");
    }

    match level {
        RiskLevel::High => {
            out.push("Consult a healthcare professional");
            out.push("Consider lifestyle changes");
        }
        RiskLevel::Medium => {
            out.push("Monitor regularly");
            out.push("Consider preventive measures");
        }
        RiskLevel::Low => out.push("Maintain healthy habits"),
    }

    out.into_iter().map(String::from).collect()
}
