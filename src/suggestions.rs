use crate::catalog::FoodCatalog;
use crate::error::Result;
use crate::meal_planner::MealPlanner;
use crate::metrics::MetricsCalculator;
use crate::models::{ActivityLevel, FoodItem, Goal, MealSlot, MetricsResult, UserProfile};
use crate::recommendations::{Recommendation, RecommendationEngine};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// One meal slot of a local plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanSlot {
    pub target_calories: i64,
    /// Foods in the order they were picked
    pub selected_foods: Vec<FoodItem>,
    pub tips: Vec<String>,
}

impl MealPlanSlot {
    pub fn selected_calories(&self) -> i64 {
        self.selected_foods
            .iter()
            .map(|f| i64::from(f.calories_kcal))
            .sum()
    }
}

/// Rule-based nutrition suggestions for a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSuggestions {
    pub meal_plan: BTreeMap<MealSlot, MealPlanSlot>,
    pub recommendations: Vec<Recommendation>,
    pub health_tips: Vec<String>,
    /// Goal-adjusted daily calories
    pub target_calories: i64,
}

/// Share of the daily calories given to a slot
pub fn slot_share(slot: MealSlot) -> Decimal {
    match slot {
        MealSlot::Breakfast => dec!(0.25),
        MealSlot::Lunch => dec!(0.35),
        MealSlot::Dinner => dec!(0.30),
        MealSlot::Snacks => dec!(0.10),
    }
}

/// Fixed tips shown with every plan for a slot
pub fn slot_tips(slot: MealSlot) -> &'static [&'static str] {
    match slot {
        MealSlot::Breakfast => &[
            "Start with protein-rich foods like eggs or dal",
            "Include whole grains for sustained energy",
            "Add fruits for vitamins and fiber",
        ],
        MealSlot::Lunch => &[
            "Include a good source of protein (dal, paneer, chicken)",
            "Add plenty of vegetables for fiber",
            "Use whole grains like brown rice or whole wheat roti",
        ],
        MealSlot::Dinner => &[
            "Keep dinner light and early (before 8 PM)",
            "Include easily digestible foods",
            "Avoid heavy fried foods",
        ],
        MealSlot::Snacks => &[
            "Choose healthy snacks like fruits, nuts, or roasted chana",
            "Avoid processed snacks and fried foods",
            "Stay hydrated with water or herbal teas",
        ],
    }
}

/// Composes the meal planner and recommendation rules into one plan
#[derive(Debug, Clone)]
pub struct LocalPlanOrchestrator {
    catalog: FoodCatalog,
    planner: MealPlanner,
}

impl Default for LocalPlanOrchestrator {
    fn default() -> Self {
        Self::new(FoodCatalog::default())
    }
}

impl LocalPlanOrchestrator {
    pub fn new(catalog: FoodCatalog) -> Self {
        Self {
            catalog,
            planner: MealPlanner::new(),
        }
    }

    pub fn catalog(&self) -> &FoodCatalog {
        &self.catalog
    }

    /// Daily calories after the goal adjustment
    pub fn target_calories(tdee: i64, goal: Goal) -> i64 {
        tdee + goal.calorie_adjustment()
    }

    /// Per-slot calorie budgets, each rounded on its own
    ///
    /// The four values may not add up exactly to `target_calories`.
    pub fn slot_targets(target_calories: i64) -> BTreeMap<MealSlot, i64> {
        MealSlot::ALL
            .iter()
            .map(|&slot| {
                let share = Decimal::from(target_calories) * slot_share(slot);
                (slot, MetricsCalculator::round_to_whole(share))
            })
            .collect()
    }

    /// Build suggestions from already computed metrics
    pub fn suggest<R: Rng + ?Sized>(
        &self,
        metrics: &MetricsResult,
        activity: ActivityLevel,
        goal: Goal,
        rng: &mut R,
    ) -> LocalSuggestions {
        let target_calories = Self::target_calories(metrics.tdee, goal);

        let meal_plan = Self::slot_targets(target_calories)
            .into_iter()
            .map(|(slot, slot_calories)| {
                let selected_foods = self.planner.select_foods(
                    self.catalog.foods(slot),
                    slot_calories,
                    metrics.bmi,
                    &mut *rng,
                );
                let plan = MealPlanSlot {
                    target_calories: slot_calories,
                    selected_foods,
                    tips: slot_tips(slot).iter().map(|t| t.to_string()).collect(),
                };
                (slot, plan)
            })
            .collect();

        info!(%goal, target_calories, bmi = %metrics.bmi, "Generated local nutrition suggestions");

        LocalSuggestions {
            meal_plan,
            recommendations: RecommendationEngine::recommendations(metrics.bmi, activity),
            health_tips: RecommendationEngine::health_tips(metrics.bmi),
            target_calories,
        }
    }

    /// Full local pipeline for a profile
    ///
    /// Metrics are computed first; an invalid profile aborts before any
    /// suggestion is produced.
    pub fn suggest_for_profile<R: Rng + ?Sized>(
        &self,
        profile: &UserProfile,
        goal: Goal,
        rng: &mut R,
    ) -> Result<(MetricsResult, LocalSuggestions)> {
        let metrics = MetricsCalculator::evaluate(profile, goal)?;
        let suggestions = self.suggest(&metrics, profile.activity_level, goal, rng);
        Ok((metrics, suggestions))
    }
}
