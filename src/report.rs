//! Terminal rendering for command output

use crate::models::{BmiCategory, FoodItem, Goal, MealSlot, MetricsResult, WeightRange};
use crate::recommendations::Recommendation;
use crate::remote::{FoodCompatibility, Priority, RemoteBmi, RemoteDietPlan};
use crate::suggestions::LocalSuggestions;
use colored::*;
use std::fmt::{self, Write};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct FoodRow {
    #[tabled(rename = "Food")]
    name: String,
    #[tabled(rename = "kcal")]
    calories: u32,
    #[tabled(rename = "Protein (g)")]
    protein: String,
    #[tabled(rename = "Carbs (g)")]
    carbs: String,
    #[tabled(rename = "Fat (g)")]
    fat: String,
}

impl From<&FoodItem> for FoodRow {
    fn from(food: &FoodItem) -> Self {
        Self {
            name: food.name.clone(),
            calories: food.calories_kcal,
            protein: food.protein_g.to_string(),
            carbs: food.carbs_g.to_string(),
            fat: food.fat_g.to_string(),
        }
    }
}

#[derive(Tabled)]
struct RemoteFoodRow {
    #[tabled(rename = "Food")]
    name: String,
    #[tabled(rename = "kcal")]
    calories: String,
    #[tabled(rename = "Compatibility")]
    compatibility: String,
}

fn food_table<'a, I>(foods: I) -> String
where
    I: IntoIterator<Item = &'a FoodItem>,
{
    let rows: Vec<FoodRow> = foods.into_iter().map(FoodRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn heading(text: &str) -> String {
    text.bold().underline().to_string()
}

/// Runs a writer over a fresh buffer; formatting into a `String` never fails
fn render_with<F>(write: F) -> String
where
    F: FnOnce(&mut String) -> fmt::Result,
{
    let mut out = String::new();
    match write(&mut out) {
        Ok(()) => out,
        Err(fmt::Error) => String::new(),
    }
}

fn write_recommendations(out: &mut String, recommendations: &[Recommendation]) -> fmt::Result {
    for rec in recommendations {
        writeln!(out, "  {}", rec.title.yellow().bold())?;
        for suggestion in &rec.suggestions {
            writeln!(out, "    - {}", suggestion)?;
        }
    }
    Ok(())
}

/// Body metrics with the macro breakdown and healthy weight range
pub fn render_metrics(metrics: &MetricsResult, goal: Goal, ideal: Option<WeightRange>) -> String {
    render_with(|out| write_metrics(out, metrics, goal, ideal))
}

fn write_metrics(
    out: &mut String,
    metrics: &MetricsResult,
    goal: Goal,
    ideal: Option<WeightRange>,
) -> fmt::Result {
    let category = metrics.bmi_category.to_string();
    let category = match metrics.bmi_category {
        BmiCategory::NormalWeight => category.green(),
        BmiCategory::Underweight | BmiCategory::Overweight => category.yellow(),
        BmiCategory::Obese => category.red(),
    };

    writeln!(out, "{}", heading("Body metrics"))?;
    writeln!(out, "  BMI:  {} ({})", metrics.bmi, category)?;
    writeln!(out, "  BMR:  {} kcal/day", metrics.bmr)?;
    writeln!(out, "  TDEE: {} kcal/day", metrics.tdee)?;
    if let Some(range) = ideal {
        writeln!(out, "  Healthy weight: {}-{} kg", range.min, range.max)?;
    }

    let macros = &metrics.macros;
    writeln!(out)?;
    writeln!(out, "{} ({})", heading("Daily macros"), goal)?;
    writeln!(out, "  Protein: {} g", macros.protein_g)?;
    writeln!(out, "  Fat:     {} g", macros.fat_g)?;
    writeln!(out, "  Carbs:   {} g", macros.carb_g)?;
    writeln!(out, "  Total:   {} g", macros.total_g)
}

/// Local meal plan, one table per slot
pub fn render_local_plan(suggestions: &LocalSuggestions) -> String {
    render_with(|out| write_local_plan(out, suggestions))
}

fn write_local_plan(out: &mut String, suggestions: &LocalSuggestions) -> fmt::Result {
    writeln!(
        out,
        "{} {} kcal/day",
        heading("Meal plan"),
        suggestions.target_calories.to_string().cyan().bold()
    )?;

    for (slot, plan) in &suggestions.meal_plan {
        writeln!(
            out,
            "\n{} target {} kcal, selected {} kcal",
            slot.to_string().to_uppercase().bold(),
            plan.target_calories,
            plan.selected_calories()
        )?;
        if plan.selected_foods.is_empty() {
            writeln!(out, "  {}", "No suitable foods in the catalog".dimmed())?;
        } else {
            writeln!(out, "{}", food_table(&plan.selected_foods))?;
        }
        for tip in &plan.tips {
            writeln!(out, "  {} {}", "tip:".dimmed(), tip)?;
        }
    }

    if !suggestions.recommendations.is_empty() {
        writeln!(out, "\n{}", heading("Recommendations"))?;
        write_recommendations(out, &suggestions.recommendations)?;
    }

    writeln!(out, "\n{}", heading("Health tips"))?;
    for tip in &suggestions.health_tips {
        writeln!(out, "  - {}", tip)?;
    }
    Ok(())
}

/// Catalog foods for one slot
pub fn render_foods(slot: MealSlot, foods: &[&FoodItem]) -> String {
    render_with(|out| {
        writeln!(out, "{} ({} items)", heading(&slot.to_string()), foods.len())?;
        if foods.is_empty() {
            writeln!(out, "  {}", "No foods match".dimmed())
        } else {
            writeln!(out, "{}", food_table(foods.iter().copied()))
        }
    })
}

/// AI-generated plan
pub fn render_remote_plan(plan: &RemoteDietPlan) -> String {
    render_with(|out| write_remote_plan(out, plan))
}

fn write_remote_plan(out: &mut String, plan: &RemoteDietPlan) -> fmt::Result {
    writeln!(
        out,
        "{} BMI {:.1} ({}), {} kcal over {} meals",
        heading("AI diet plan"),
        plan.user_profile.bmi,
        plan.user_profile.bmi_category,
        plan.daily_summary.total_calories,
        plan.daily_summary.meals_count
    )?;

    for (meal, detail) in &plan.diet_plan {
        writeln!(
            out,
            "\n{} {} kcal, compatibility {:.1}",
            meal.to_uppercase().bold(),
            detail.total_calories,
            detail.avg_compatibility
        )?;
        let rows: Vec<RemoteFoodRow> = detail
            .foods
            .iter()
            .map(|f| RemoteFoodRow {
                name: f.food_name.clone(),
                calories: format!("{:.0}", f.energy_kcal),
                compatibility: format!("{:.1}", f.compatibility_score),
            })
            .collect();
        writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;
    }

    if !plan.health_recommendations.is_empty() {
        writeln!(out, "\n{}", heading("Health recommendations"))?;
        for rec in &plan.health_recommendations {
            let priority = match rec.priority {
                Priority::High => "high".red().bold(),
                Priority::Medium => "medium".yellow(),
                Priority::Low => "low".normal(),
            };
            writeln!(out, "  [{}] {}: {}", priority, rec.title.bold(), rec.message)?;
        }
    }
    Ok(())
}

pub fn render_remote_bmi(bmi: &RemoteBmi) -> String {
    format!(
        "BMI {:.1} ({}) for {} kg at {} cm\n",
        bmi.bmi, bmi.category, bmi.weight_kg, bmi.height_cm
    )
}

pub fn render_compatibility(result: &FoodCompatibility) -> String {
    let score = format!("{:.1}", result.compatibility_score);
    let score = if result.compatibility_score >= 70.0 {
        score.green()
    } else if result.compatibility_score >= 40.0 {
        score.yellow()
    } else {
        score.red()
    };
    format!(
        "{}: compatibility {} ({:.0} kcal)\n  {}\n",
        result.food_name.bold(),
        score,
        result.energy_kcal,
        result.recommendation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsCalculator;
    use crate::models::{ActivityLevel, Gender, UserProfile};
    use crate::suggestions::LocalPlanOrchestrator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn create_test_profile() -> UserProfile {
        UserProfile::new(
            "Test User",
            30,
            dec!(70),
            dec!(175),
            Gender::Male,
            ActivityLevel::Moderate,
        )
    }

    #[test]
    fn test_metrics_report_lists_values() {
        colored::control::set_override(false);
        let metrics = MetricsCalculator::evaluate(&create_test_profile(), Goal::Maintain).unwrap();
        let text = render_metrics(&metrics, Goal::Maintain, Some(WeightRange { min: 57, max: 76 }));

        assert!(text.contains("BMI:  22.9 (Normal weight)"));
        assert!(text.contains("TDEE: 2556 kcal/day"));
        assert!(text.contains("Healthy weight: 57-76 kg"));
    }

    #[test]
    fn test_local_plan_report_covers_every_slot() {
        colored::control::set_override(false);
        let (_, suggestions) = LocalPlanOrchestrator::default()
            .suggest_for_profile(&create_test_profile(), Goal::Maintain, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let text = render_local_plan(&suggestions);

        for slot in MealSlot::ALL {
            assert!(text.contains(&slot.to_string().to_uppercase()));
        }
        assert!(text.contains("Health tips"));
    }

    #[test]
    fn test_remote_plan_report_lists_meals_and_priorities() {
        colored::control::set_override(false);
        let plan: RemoteDietPlan = serde_json::from_value(serde_json::json!({
            "user_profile": {"bmi": 22.86, "bmi_category": "Normal weight"},
            "diet_plan": {
                "Lunch": {
                    "foods": [{"food_name": "Rajma rice", "energy_kcal": 420.4, "compatibility_score": 87.4}],
                    "total_calories": 420,
                    "avg_compatibility": 87.4
                }
            },
            "daily_summary": {"total_calories": 420, "meals_count": 1},
            "health_recommendations": [
                {"title": "Blood Sugar Control", "message": "Prefer low glycemic index foods", "priority": "high"}
            ]
        }))
        .unwrap();

        let text = render_remote_plan(&plan);

        assert!(text.starts_with("AI diet plan BMI 22.9 (Normal weight), 420 kcal over 1 meals\n"));
        assert!(text.contains("LUNCH 420 kcal, compatibility 87.4"));
        assert!(text.contains("Rajma rice"));
        assert!(text.contains("[high] Blood Sugar Control: Prefer low glycemic index foods\n"));
    }

    #[test]
    fn test_foods_report_handles_empty_slot() {
        colored::control::set_override(false);
        let text = render_foods(MealSlot::Snacks, &[]);

        assert_eq!(text, "snacks (0 items)\n  No foods match\n");
    }
}
