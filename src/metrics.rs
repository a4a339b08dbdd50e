use crate::error::{NutriError, Result};
use crate::models::{
    ActivityLevel, BmiCategory, Gender, Goal, MacroSplit, MetricsResult, UserProfile, WeightRange,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// Accepted age range in years
const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=120;

/// Accepted body dimensions; the bounds keep BMI arithmetic inside Decimal range
const MIN_WEIGHT_KG: Decimal = dec!(2);
const MAX_WEIGHT_KG: Decimal = dec!(1000);
const MIN_HEIGHT_CM: Decimal = dec!(30);
const MAX_HEIGHT_CM: Decimal = dec!(300);

/// Healthy BMI band used for the ideal weight range
const IDEAL_BMI_MIN: Decimal = dec!(18.5);
const IDEAL_BMI_MAX: Decimal = dec!(24.9);

/// Protein/fat/carb share of total calories for a goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroRatios {
    pub protein: Decimal,
    pub fat: Decimal,
    pub carbs: Decimal,
}

impl MacroRatios {
    pub fn for_goal(goal: Goal) -> Self {
        match goal {
            Goal::Lose => MacroRatios {
                protein: dec!(0.35),
                fat: dec!(0.30),
                carbs: dec!(0.35),
            },
            Goal::Gain => MacroRatios {
                protein: dec!(0.25),
                fat: dec!(0.20),
                carbs: dec!(0.55),
            },
            Goal::Maintain => MacroRatios {
                protein: dec!(0.30),
                fat: dec!(0.25),
                carbs: dec!(0.45),
            },
        }
    }
}

/// Metabolic calculations over a biometric profile
///
/// All functions are pure: the same inputs always produce the same output.
/// Rounding is half-up to match how the numbers are presented to users.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Run the whole pipeline (BMI, BMR, TDEE, macros) for a profile
    pub fn evaluate(profile: &UserProfile, goal: Goal) -> Result<MetricsResult> {
        Self::validate_profile(profile)?;

        let bmi = Self::bmi(profile.weight_kg, profile.height_cm)?;
        let bmr = Self::bmr(
            profile.weight_kg,
            profile.height_cm,
            profile.age,
            profile.gender,
        );
        let tdee = Self::tdee(bmr, profile.activity_level);
        let macros = Self::macros(tdee, goal);

        debug!(%bmi, bmr, tdee, %goal, "Computed metrics");

        Ok(MetricsResult {
            bmi,
            bmi_category: Self::bmi_category(bmi),
            bmr,
            tdee,
            macros,
        })
    }

    /// Reject profiles the formulas are not meant for
    pub fn validate_profile(profile: &UserProfile) -> Result<()> {
        if !AGE_RANGE.contains(&profile.age) {
            return Err(NutriError::invalid_input(
                "age",
                format!(
                    "{} is outside {}-{} years",
                    profile.age,
                    AGE_RANGE.start(),
                    AGE_RANGE.end()
                ),
            ));
        }

        Self::validate_weight(profile.weight_kg)?;
        Self::validate_height(profile.height_cm)?;

        // Small, old profiles can push Mifflin-St Jeor to zero or below
        let bmr = Self::bmr(
            profile.weight_kg,
            profile.height_cm,
            profile.age,
            profile.gender,
        );
        if bmr <= 0 {
            return Err(NutriError::invalid_input(
                "profile",
                format!("weight, height and age give a non-positive BMR ({})", bmr),
            ));
        }

        if let Some(score) = profile.nutrition_quality_score {
            if !(1..=10).contains(&score) {
                return Err(NutriError::invalid_input(
                    "nutrition_quality_score",
                    format!("{} is outside 1-10", score),
                ));
            }
        }

        Ok(())
    }

    /// Body Mass Index: weight / (height in m)^2, one decimal place
    pub fn bmi(weight_kg: Decimal, height_cm: Decimal) -> Result<Decimal> {
        Self::validate_weight(weight_kg)?;
        Self::validate_height(height_cm)?;

        let height_m = height_cm / dec!(100);
        let bmi = height_m
            .checked_mul(height_m)
            .and_then(|squared| weight_kg.checked_div(squared))
            .ok_or_else(|| {
                NutriError::invalid_input("height_cm", format!("{} is too small", height_cm))
            })?;

        Ok(Self::round_half_up(bmi, 1))
    }

    /// Classify a BMI value; each band includes its lower bound
    pub fn bmi_category(bmi: Decimal) -> BmiCategory {
        if bmi < dec!(18.5) {
            BmiCategory::Underweight
        } else if bmi < dec!(25) {
            BmiCategory::NormalWeight
        } else if bmi < dec!(30) {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    /// Basal Metabolic Rate using the Mifflin-St Jeor equation
    ///
    /// - Male: 10w + 6.25h - 5a + 5
    /// - Female/other: 10w + 6.25h - 5a - 161
    pub fn bmr(weight_kg: Decimal, height_cm: Decimal, age: u32, gender: Gender) -> i64 {
        let base = dec!(10) * weight_kg + dec!(6.25) * height_cm - dec!(5) * Decimal::from(age);
        let bmr = match gender {
            Gender::Male => base + dec!(5),
            Gender::Female | Gender::Other => base - dec!(161),
        };
        Self::round_to_whole(bmr)
    }

    /// Activity multiplier applied to BMR
    pub fn activity_multiplier(level: ActivityLevel) -> Decimal {
        match level {
            ActivityLevel::Sedentary => dec!(1.2),
            ActivityLevel::Lightly => dec!(1.375),
            ActivityLevel::Moderate => dec!(1.55),
            ActivityLevel::Active => dec!(1.725),
            ActivityLevel::Very => dec!(1.9),
        }
    }

    /// Total Daily Energy Expenditure
    pub fn tdee(bmr: i64, level: ActivityLevel) -> i64 {
        Self::round_to_whole(Decimal::from(bmr) * Self::activity_multiplier(level))
    }

    /// Split a calorie budget into macronutrient grams
    ///
    /// Protein and carbs carry 4 kcal/g, fat 9 kcal/g. Each gram value is
    /// rounded on its own and `total_g` is the sum of the rounded values.
    pub fn macros(calories: i64, goal: Goal) -> MacroSplit {
        let ratios = MacroRatios::for_goal(goal);
        let calories = Decimal::from(calories);

        let protein_g = Self::round_to_whole(calories * ratios.protein / dec!(4));
        let fat_g = Self::round_to_whole(calories * ratios.fat / dec!(9));
        let carb_g = Self::round_to_whole(calories * ratios.carbs / dec!(4));

        MacroSplit {
            protein_g,
            fat_g,
            carb_g,
            total_g: protein_g + fat_g + carb_g,
        }
    }

    /// Weight bounds for BMI 18.5 and 24.9 at the given height
    pub fn ideal_weight_range(height_cm: Decimal) -> Result<WeightRange> {
        Self::validate_height(height_cm)?;

        let height_m = height_cm / dec!(100);
        let squared = height_m * height_m;

        Ok(WeightRange {
            min: Self::round_to_whole(IDEAL_BMI_MIN * squared),
            max: Self::round_to_whole(IDEAL_BMI_MAX * squared),
        })
    }

    pub(crate) fn validate_weight(weight_kg: Decimal) -> Result<()> {
        if weight_kg < MIN_WEIGHT_KG || weight_kg > MAX_WEIGHT_KG {
            return Err(NutriError::invalid_input(
                "weight_kg",
                format!("{} must be within {}-{}", weight_kg, MIN_WEIGHT_KG, MAX_WEIGHT_KG),
            ));
        }
        Ok(())
    }

    pub(crate) fn validate_height(height_cm: Decimal) -> Result<()> {
        if height_cm < MIN_HEIGHT_CM || height_cm > MAX_HEIGHT_CM {
            return Err(NutriError::invalid_input(
                "height_cm",
                format!("{} must be within {}-{}", height_cm, MIN_HEIGHT_CM, MAX_HEIGHT_CM),
            ));
        }
        Ok(())
    }

    /// floor(x + 0.5) at `dp` decimal places; midpoints go toward positive infinity
    fn round_half_up(value: Decimal, dp: u32) -> Decimal {
        let scale = Decimal::from(10u64.pow(dp));
        ((value * scale) + dec!(0.5)).floor() / scale
    }

    /// Round half up to a whole number
    pub(crate) fn round_to_whole(value: Decimal) -> i64 {
        let rounded = Self::round_half_up(value, 0);
        // Saturates outside the i64 range
        rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
    }
}
