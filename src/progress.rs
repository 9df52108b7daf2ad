//! Goal progress summaries

use serde::{Deserialize, Serialize};

use crate::types::Goal;

/// Completion counts for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCompletion {
    pub category: String,
    pub completed: usize,
    pub total: usize,
    /// Completed share of this category (0-100)
    pub rate: f64,
}

/// Overview of the goal collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    /// Rounded completion percentage, 0 with no goals
    pub completion_rate: u32,
    /// Per-category completion in first-seen order
    pub categories: Vec<CategoryCompletion>,
}

impl ProgressSummary {
    pub fn from_goals(goals: &[Goal]) -> Self {
        let completed = goals.iter().filter(|g| g.completed).count();
        let total = goals.len();
        let completion_rate = if total > 0 {
            (completed as f64 / total as f64 * 100.0).round() as u32
        } else {
            0
        };

        let mut categories: Vec<CategoryCompletion> = Vec::new();
        for goal in goals {
            let index = match categories.iter().position(|c| c.category == goal.category) {
                Some(index) => index,
                None => {
                    categories.push(CategoryCompletion {
                        category: goal.category.clone(),
                        completed: 0,
                        total: 0,
                        rate: 0.0,
                    });
                    categories.len() - 1
                }
            };
            let entry = &mut categories[index];
            entry.total += 1;
            if goal.completed {
                entry.completed += 1;
            }
        }
        for entry in &mut categories {
            entry.rate = entry.completed as f64 / entry.total as f64 * 100.0;
        }

        Self {
            completed,
            total,
            completion_rate,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::default_goals;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_collection() {
        let summary = ProgressSummary::from_goals(&[]);
        assert_eq!(summary.completion_rate, 0);
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn test_category_breakdown() {
        let mut goals = default_goals(Utc::now());
        goals[0].completed = true;

        let summary = ProgressSummary::from_goals(&goals);

        assert_eq!(summary.completed, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completion_rate, 33);
        assert_eq!(
            summary.categories,
            vec![
                CategoryCompletion {
                    category: "Activity".to_string(),
                    completed: 1,
                    total: 2,
                    rate: 50.0,
                },
                CategoryCompletion {
                    category: "Nutrition".to_string(),
                    completed: 0,
                    total: 1,
                    rate: 0.0,
                },
            ]
        );
    }
}
