//! Reference food data grouped by meal slot
//!
//! The built-in table covers common Indian dishes. A different table can be
//! loaded from TOML or JSON with the same shape:
//!
//! ```toml
//! [[breakfast]]
//! name = "Idli"
//! calories_kcal = 39
//! protein_g = 2.5
//! carbs_g = 7.5
//! fat_g = 0.2
//! ```

use crate::error::{NutriError, Result};
use crate::models::{FoodItem, Goal, MealSlot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Calorie ceiling for foods offered to overweight users or weight-loss goals
pub const LOW_CALORIE_LIMIT: u32 = 200;

/// Calorie floor for foods offered to underweight users or weight-gain goals
pub const HIGH_CALORIE_FLOOR: u32 = 150;

/// Foods available per meal slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodCatalog {
    slots: BTreeMap<MealSlot, Vec<FoodItem>>,
}

impl Default for FoodCatalog {
    fn default() -> Self {
        Self::indian()
    }
}

impl FoodCatalog {
    /// Build a catalog from explicit slot lists
    pub fn new(slots: BTreeMap<MealSlot, Vec<FoodItem>>) -> Self {
        Self { slots }
    }

    /// Built-in catalog of Indian diet options
    pub fn indian() -> Self {
        let mut slots = BTreeMap::new();

        slots.insert(
            MealSlot::Breakfast,
            vec![
                FoodItem::new("Idli", 39, dec!(2.5), dec!(7.5), dec!(0.2)),
                FoodItem::new("Dosa", 133, dec!(3.1), dec!(25.8), dec!(1.2)),
                FoodItem::new("Poha", 76, dec!(2.1), dec!(15.2), dec!(0.3)),
                FoodItem::new("Paratha", 264, dec!(6.8), dec!(42.1), dec!(7.2)),
                FoodItem::new("Bread Omelette", 156, dec!(8.9), dec!(12.3), dec!(8.1)),
            ],
        );
        slots.insert(
            MealSlot::Lunch,
            vec![
                FoodItem::new("Dal Chawal", 245, dec!(8.9), dec!(45.2), dec!(2.1)),
                FoodItem::new("Roti Sabzi", 189, dec!(6.8), dec!(32.5), dec!(4.2)),
                FoodItem::new("Biryani", 456, dec!(12.8), dec!(78.9), dec!(8.5)),
                FoodItem::new("Rajma Chawal", 298, dec!(11.2), dec!(52.3), dec!(3.8)),
                FoodItem::new("Sambar Rice", 234, dec!(7.8), dec!(43.1), dec!(2.9)),
            ],
        );
        slots.insert(
            MealSlot::Dinner,
            vec![
                FoodItem::new("Chapati Dal", 189, dec!(7.2), dec!(32.1), dec!(3.5)),
                FoodItem::new("Rasam Rice", 167, dec!(5.8), dec!(31.2), dec!(1.8)),
                FoodItem::new("Pulao", 298, dec!(8.9), dec!(56.7), dec!(4.2)),
                FoodItem::new("Mixed Vegetable Curry", 145, dec!(4.2), dec!(23.8), dec!(3.1)),
                FoodItem::new("Dosa with Chutney", 198, dec!(5.2), dec!(35.6), dec!(2.8)),
            ],
        );
        slots.insert(
            MealSlot::Snacks,
            vec![
                FoodItem::new("Fruits", 52, dec!(0.8), dec!(12.5), dec!(0.2)),
                FoodItem::new("Nuts (Mixed)", 607, dec!(20.8), dec!(19.8), dec!(54.1)),
                FoodItem::new("Roasted Chana", 364, dec!(21.2), dec!(61.2), dec!(6.1)),
                FoodItem::new("Makhana", 347, dec!(9.7), dec!(77.2), dec!(0.1)),
            ],
        );

        Self { slots }
    }

    /// Load a catalog from a TOML or JSON file (chosen by extension)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let catalog: FoodCatalog = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                NutriError::Configuration(format!(
                    "Failed to parse food catalog {}: {}",
                    path.display(),
                    e
                ))
            })?,
            _ => toml::from_str(&content).map_err(|e| {
                NutriError::Configuration(format!(
                    "Failed to parse food catalog {}: {}",
                    path.display(),
                    e
                ))
            })?,
        };

        catalog.validate()?;
        tracing::info!(path = %path.display(), foods = catalog.len(), "Loaded food catalog");
        Ok(catalog)
    }

    /// Foods for a meal slot, in catalog order
    pub fn foods(&self, slot: MealSlot) -> &[FoodItem] {
        self.slots.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of foods across all slots
    pub fn len(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Foods for a slot suited to the user's BMI and goal
    ///
    /// A weight-loss goal or BMI above 25 keeps foods under 200 kcal; otherwise
    /// a weight-gain goal or BMI below 18.5 keeps foods over 150 kcal.
    pub fn recommended_foods(&self, slot: MealSlot, bmi: Decimal, goal: Goal) -> Vec<&FoodItem> {
        let foods = self.foods(slot).iter();

        if goal == Goal::Lose || bmi > dec!(25) {
            foods.filter(|f| f.calories_kcal < LOW_CALORIE_LIMIT).collect()
        } else if goal == Goal::Gain || bmi < dec!(18.5) {
            foods.filter(|f| f.calories_kcal > HIGH_CALORIE_FLOOR).collect()
        } else {
            foods.collect()
        }
    }

    /// Heuristic suitability score of a food for a goal (higher is better)
    pub fn nutrition_score(food: &FoodItem, goal: Goal) -> u32 {
        let mut score = 0;

        if food.protein_g > dec!(5) {
            score += 2;
        } else if food.protein_g > dec!(2) {
            score += 1;
        }

        // Fiber estimate from the dish name
        if food.name.contains("vegetable") || food.name.contains("fruit") {
            score += 2;
        }
        if food.name.contains("whole") || food.name.contains("brown") {
            score += 1;
        }

        match goal {
            Goal::Lose if food.calories_kcal < LOW_CALORIE_LIMIT => score += 2,
            Goal::Gain if food.calories_kcal > HIGH_CALORIE_FLOOR => score += 2,
            Goal::Maintain => score += 1,
            _ => {}
        }

        score
    }

    fn validate(&self) -> Result<()> {
        for (slot, foods) in &self.slots {
            for food in foods {
                if food.name.trim().is_empty() {
                    return Err(NutriError::Configuration(format!(
                        "Food without a name in {} slot",
                        slot
                    )));
                }
                if food.protein_g < Decimal::ZERO
                    || food.carbs_g < Decimal::ZERO
                    || food.fat_g < Decimal::ZERO
                {
                    return Err(NutriError::Configuration(format!(
                        "Negative nutrient value for {}",
                        food.name
                    )));
                }
            }
        }
        Ok(())
    }
}
