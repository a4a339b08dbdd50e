use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Systolic blood pressure assumed when the profile does not carry one (mmHg)
pub const DEFAULT_BLOOD_PRESSURE: u32 = 120;

/// Fasting blood sugar assumed when the profile does not carry one (mg/dL)
pub const DEFAULT_BLOOD_SUGAR: u32 = 100;

/// Self-reported diet quality assumed when the profile does not carry one (1-10)
pub const DEFAULT_NUTRITION_QUALITY: u8 = 7;

/// Biological sex used by the Mifflin-St Jeor equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

/// Habitual activity level, scaling BMR into TDEE
///
/// Unrecognized labels resolve to `Moderate`, both when parsed from the
/// command line and when deserialized from a profile file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Lightly,
    /// Moderate exercise 3-5 days/week
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Very hard exercise and a physical job
    Very,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Lightly,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::Very,
    ];

    /// Parse an activity label, falling back to `Moderate` for unknown input
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "lightly" | "light" => ActivityLevel::Lightly,
            "moderate" => ActivityLevel::Moderate,
            "active" => ActivityLevel::Active,
            "very" | "very_active" => ActivityLevel::Very,
            other => {
                tracing::warn!(label = other, "Unknown activity level, using moderate");
                ActivityLevel::Moderate
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Lightly => "lightly",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::Very => "very",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::Lightly => "Light exercise/sports 1-3 days/week",
            ActivityLevel::Moderate => "Moderate exercise/sports 3-5 days/week",
            ActivityLevel::Active => "Hard exercise/sports 6-7 days/week",
            ActivityLevel::Very => "Very hard exercise/sports & physical job",
        }
    }
}

impl From<String> for ActivityLevel {
    fn from(label: String) -> Self {
        ActivityLevel::from_label(&label)
    }
}

impl From<ActivityLevel> for String {
    fn from(level: ActivityLevel) -> Self {
        level.label().to_string()
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weight goal driving calorie adjustment and macro ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl Goal {
    /// Parse a goal label, falling back to `Maintain` for unknown input
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "lose" => Goal::Lose,
            "gain" => Goal::Gain,
            "maintain" => Goal::Maintain,
            other => {
                tracing::warn!(label = other, "Unknown goal, using maintain");
                Goal::Maintain
            }
        }
    }

    /// Daily calorie offset applied to TDEE for this goal
    pub fn calorie_adjustment(&self) -> i64 {
        match self {
            Goal::Lose => -500,
            Goal::Maintain => 0,
            Goal::Gain => 300,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Lose => write!(f, "lose"),
            Goal::Maintain => write!(f, "maintain"),
            Goal::Gain => write!(f, "gain"),
        }
    }
}

/// WHO adult BMI bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Biometric profile supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name
    pub name: String,

    /// Age in years
    pub age: u32,

    /// Body weight in kilograms
    pub weight_kg: Decimal,

    /// Height in centimeters
    pub height_cm: Decimal,

    pub gender: Gender,

    pub activity_level: ActivityLevel,

    /// Systolic blood pressure in mmHg
    #[serde(default)]
    pub blood_pressure_systolic: Option<u32>,

    /// Fasting blood sugar in mg/dL
    #[serde(default)]
    pub blood_sugar_mg_dl: Option<u32>,

    /// Self-reported diet quality on a 1-10 scale
    #[serde(default)]
    pub nutrition_quality_score: Option<u8>,
}

impl UserProfile {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        weight_kg: Decimal,
        height_cm: Decimal,
        gender: Gender,
        activity_level: ActivityLevel,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            weight_kg,
            height_cm,
            gender,
            activity_level,
            blood_pressure_systolic: None,
            blood_sugar_mg_dl: None,
            nutrition_quality_score: None,
        }
    }

    pub fn with_blood_pressure(mut self, systolic: u32) -> Self {
        self.blood_pressure_systolic = Some(systolic);
        self
    }

    pub fn with_blood_sugar(mut self, mg_dl: u32) -> Self {
        self.blood_sugar_mg_dl = Some(mg_dl);
        self
    }

    pub fn with_nutrition_quality(mut self, score: u8) -> Self {
        self.nutrition_quality_score = Some(score);
        self
    }

    pub fn blood_pressure(&self) -> u32 {
        self.blood_pressure_systolic.unwrap_or(DEFAULT_BLOOD_PRESSURE)
    }

    pub fn blood_sugar(&self) -> u32 {
        self.blood_sugar_mg_dl.unwrap_or(DEFAULT_BLOOD_SUGAR)
    }

    pub fn nutrition_quality(&self) -> u8 {
        self.nutrition_quality_score.unwrap_or(DEFAULT_NUTRITION_QUALITY)
    }
}

/// Target grams of each macronutrient for a calorie budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein_g: i64,
    pub fat_g: i64,
    pub carb_g: i64,
    /// Sum of the three rounded gram values
    pub total_g: i64,
}

impl MacroSplit {
    /// Calories represented by the rounded gram values
    pub fn calories(&self) -> i64 {
        self.protein_g * 4 + self.fat_g * 9 + self.carb_g * 4
    }
}

/// Derived metabolic metrics for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    /// Body Mass Index, one decimal place
    #[serde(with = "rust_decimal::serde::float")]
    pub bmi: Decimal,

    pub bmi_category: BmiCategory,

    /// Basal Metabolic Rate in kcal/day
    pub bmr: i64,

    /// Total Daily Energy Expenditure in kcal/day
    pub tdee: i64,

    pub macros: MacroSplit,
}

/// Healthy weight bounds for a height (kg)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: i64,
    pub max: i64,
}

/// Meal slot of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snacks,
    ];
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            "snacks" | "snack" => Ok(MealSlot::Snacks),
            _ => Err(format!("Invalid meal slot: {}", s)),
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealSlot::Breakfast => write!(f, "breakfast"),
            MealSlot::Lunch => write!(f, "lunch"),
            MealSlot::Dinner => write!(f, "dinner"),
            MealSlot::Snacks => write!(f, "snacks"),
        }
    }
}

/// Catalog entry with per-serving nutrition values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,

    /// Energy per serving in kcal
    pub calories_kcal: u32,

    #[serde(with = "rust_decimal::serde::float")]
    pub protein_g: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub carbs_g: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub fat_g: Decimal,
}

impl FoodItem {
    pub fn new(
        name: impl Into<String>,
        calories_kcal: u32,
        protein_g: Decimal,
        carbs_g: Decimal,
        fat_g: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            calories_kcal,
            protein_g,
            carbs_g,
            fat_g,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unknown_activity_falls_back_to_moderate() {
        assert_eq!(ActivityLevel::from_label("couch"), ActivityLevel::Moderate);
        assert_eq!(ActivityLevel::from_label("Sedentary"), ActivityLevel::Sedentary);

        let level: ActivityLevel = serde_json::from_str("\"marathoner\"").unwrap();
        assert_eq!(level, ActivityLevel::Moderate);
        assert_eq!(serde_json::to_string(&ActivityLevel::Very).unwrap(), "\"very\"");
    }

    #[test]
    fn test_profile_defaults() {
        let profile = UserProfile::new(
            "Asha",
            30,
            dec!(70),
            dec!(175),
            Gender::Female,
            ActivityLevel::Moderate,
        );
        assert_eq!(profile.blood_pressure(), 120);
        assert_eq!(profile.blood_sugar(), 100);
        assert_eq!(profile.nutrition_quality(), 7);

        let profile = profile.with_blood_pressure(135).with_nutrition_quality(4);
        assert_eq!(profile.blood_pressure(), 135);
        assert_eq!(profile.nutrition_quality(), 4);
    }

    #[test]
    fn test_bmi_category_serializes_with_display_label() {
        let json = serde_json::to_string(&BmiCategory::NormalWeight).unwrap();
        assert_eq!(json, "\"Normal weight\"");
        assert_eq!(BmiCategory::Obese.to_string(), "Obese");
    }

    #[test]
    fn test_numeric_fields_serialize_as_json_numbers() {
        let metrics = MetricsResult {
            bmi: dec!(22.9),
            bmi_category: BmiCategory::NormalWeight,
            bmr: 1649,
            tdee: 2556,
            macros: MacroSplit {
                protein_g: 192,
                fat_g: 71,
                carb_g: 288,
                total_g: 551,
            },
        };
        let value = serde_json::to_value(&metrics).unwrap();
        assert_eq!(value["bmi"], serde_json::json!(22.9));

        let food = FoodItem::new("Idli", 39, dec!(2.5), dec!(7.5), dec!(0.2));
        let value = serde_json::to_value(&food).unwrap();
        assert_eq!(value["protein_g"], serde_json::json!(2.5));
        assert_eq!(value["fat_g"], serde_json::json!(0.2));

        let parsed: FoodItem = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, food);
    }

    #[test]
    fn test_meal_slot_parsing() {
        assert_eq!("Snack".parse::<MealSlot>().unwrap(), MealSlot::Snacks);
        assert!("brunch".parse::<MealSlot>().is_err());
    }
}
