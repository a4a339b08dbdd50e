//! Rule-based lifestyle advice
//!
//! Rules are kept as static tables so the wording can change without touching
//! the evaluation order: weight rules first (loss, then gain), activity last.

use crate::models::ActivityLevel;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Category of a recommendation block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    WeightLoss,
    WeightGain,
    Activity,
}

/// A titled group of related suggestions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub suggestions: Vec<String>,
}

/// Static definition of one recommendation block
#[derive(Debug)]
pub struct RecommendationRule {
    pub kind: RecommendationKind,
    pub title: &'static str,
    pub suggestions: &'static [&'static str],
}

impl RecommendationRule {
    fn to_recommendation(&self) -> Recommendation {
        Recommendation {
            kind: self.kind,
            title: self.title.to_string(),
            suggestions: self.suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub const WEIGHT_MANAGEMENT: RecommendationRule = RecommendationRule {
    kind: RecommendationKind::WeightLoss,
    title: "Weight Management",
    suggestions: &[
        "Focus on portion control and mindful eating",
        "Include more vegetables and fruits in your diet",
        "Choose whole grains over refined grains",
        "Limit fried foods and sweets",
        "Stay active with at least 30 minutes of exercise daily",
    ],
};

pub const HEALTHY_WEIGHT_GAIN: RecommendationRule = RecommendationRule {
    kind: RecommendationKind::WeightGain,
    title: "Healthy Weight Gain",
    suggestions: &[
        "Increase calorie intake with healthy foods",
        "Include protein-rich foods like dal, paneer, eggs",
        "Add healthy fats like nuts, ghee, and avocados",
        "Eat frequent meals throughout the day",
        "Include strength training exercises",
    ],
};

pub const INCREASE_ACTIVITY: RecommendationRule = RecommendationRule {
    kind: RecommendationKind::Activity,
    title: "Increase Physical Activity",
    suggestions: &[
        "Start with 15-20 minutes of walking daily",
        "Try yoga or simple stretching exercises",
        "Take stairs instead of elevators",
        "Consider joining a gym or fitness class",
    ],
};

pub const BASE_HEALTH_TIPS: &[&str] = &[
    "Drink at least 8-10 glasses of water daily",
    "Include seasonal fruits and vegetables in your diet",
    "Practice mindful eating - eat slowly and enjoy your food",
    "Limit salt intake to less than 5g per day",
    "Include traditional Indian spices like turmeric, ginger, and garlic",
    "Avoid eating late at night",
    "Include fermented foods like curd for gut health",
];

pub const OVERWEIGHT_HEALTH_TIPS: &[&str] = &[
    "Focus on portion control and avoid overeating",
    "Include more fiber-rich foods to feel full longer",
];

pub const UNDERWEIGHT_HEALTH_TIPS: &[&str] = &[
    "Eat nutrient-dense foods to gain healthy weight",
    "Include healthy snacks between meals",
];

/// Derives goal-oriented advice from computed metrics
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Recommendation blocks in evaluation order
    pub fn recommendations(bmi: Decimal, activity: ActivityLevel) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if bmi > dec!(25) {
            recommendations.push(WEIGHT_MANAGEMENT.to_recommendation());
        } else if bmi < dec!(18.5) {
            recommendations.push(HEALTHY_WEIGHT_GAIN.to_recommendation());
        }

        if activity == ActivityLevel::Sedentary {
            recommendations.push(INCREASE_ACTIVITY.to_recommendation());
        }

        recommendations
    }

    /// General tips plus BMI-specific extras
    pub fn health_tips(bmi: Decimal) -> Vec<String> {
        let extra: &[&str] = if bmi > dec!(25) {
            OVERWEIGHT_HEALTH_TIPS
        } else if bmi < dec!(18.5) {
            UNDERWEIGHT_HEALTH_TIPS
        } else {
            &[]
        };

        BASE_HEALTH_TIPS
            .iter()
            .chain(extra.iter())
            .map(|tip| tip.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overweight_sedentary_gets_both_blocks_in_order() {
        let recs = RecommendationEngine::recommendations(dec!(27.4), ActivityLevel::Sedentary);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].kind, RecommendationKind::WeightLoss);
        assert_eq!(recs[0].title, "Weight Management");
        assert_eq!(recs[0].suggestions.len(), 5);
        assert_eq!(recs[1].kind, RecommendationKind::Activity);
        assert_eq!(recs[1].suggestions.len(), 4);
    }

    #[test]
    fn test_underweight_gets_weight_gain_block() {
        let recs = RecommendationEngine::recommendations(dec!(17.2), ActivityLevel::Active);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::WeightGain);
        assert_eq!(recs[0].suggestions.len(), 5);
    }

    #[test]
    fn test_normal_weight_active_gets_nothing() {
        assert!(RecommendationEngine::recommendations(dec!(22.9), ActivityLevel::Moderate).is_empty());
        // Band edges: 25.0 is not "> 25" and 18.5 is not "< 18.5"
        assert!(RecommendationEngine::recommendations(dec!(25.0), ActivityLevel::Very).is_empty());
        assert!(RecommendationEngine::recommendations(dec!(18.5), ActivityLevel::Very).is_empty());
    }

    #[test]
    fn test_health_tips() {
        assert_eq!(RecommendationEngine::health_tips(dec!(22.0)).len(), 7);

        let overweight = RecommendationEngine::health_tips(dec!(26.0));
        assert_eq!(overweight.len(), 9);
        assert_eq!(overweight[7], "Focus on portion control and avoid overeating");

        let underweight = RecommendationEngine::health_tips(dec!(18.0));
        assert_eq!(underweight.len(), 9);
        assert_eq!(underweight[8], "Include healthy snacks between meals");
    }

    #[test]
    fn test_recommendation_json_shape() {
        let recs = RecommendationEngine::recommendations(dec!(30.0), ActivityLevel::Moderate);
        let json = serde_json::to_value(&recs[0]).unwrap();
        assert_eq!(json["type"], "weight_loss");
        assert_eq!(json["title"], "Weight Management");
    }
}
