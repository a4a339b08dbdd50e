//! Client for the remote diet-plan generation service
//!
//! The service owns the scoring model; this side only builds requests,
//! checks the response contract and keeps the latest good plan per profile.

use crate::config::RemoteConfig;
use crate::error::{NutriError, Result};
use crate::metrics::MetricsCalculator;
use crate::models::{BmiCategory, UserProfile};
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Health profile sent with every diet-plan request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DietPlanRequest {
    pub age: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub weight_kg: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub height_cm: Decimal,
    pub blood_pressure: u32,
    pub blood_sugar_level: u32,
    pub nutrition_quality: u8,
}

impl From<&UserProfile> for DietPlanRequest {
    fn from(profile: &UserProfile) -> Self {
        Self {
            age: profile.age,
            weight_kg: profile.weight_kg,
            height_cm: profile.height_cm,
            blood_pressure: profile.blood_pressure(),
            blood_sugar_level: profile.blood_sugar(),
            nutrition_quality: profile.nutrition_quality(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BmiRequest {
    #[serde(with = "rust_decimal::serde::float")]
    weight_kg: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    height_cm: Decimal,
}

#[derive(Debug, Serialize)]
struct CompatibilityRequest<'a> {
    user: DietPlanRequest,
    food_name: &'a str,
}

/// AI-generated plan as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDietPlan {
    pub user_profile: RemoteUserProfile,
    pub daily_summary: DailySummary,
    /// Meal type (e.g. "Breakfast") to recommended foods
    pub diet_plan: BTreeMap<String, RemoteMeal>,
    pub health_recommendations: Vec<HealthRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUserProfile {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub total_calories: i64,
    pub meals_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMeal {
    pub total_calories: i64,
    /// Mean compatibility of the foods, 0-100
    pub avg_compatibility: f64,
    pub foods: Vec<RemoteFood>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFood {
    pub food_name: String,
    pub energy_kcal: f64,
    /// Suitability for the profile, 0-100
    pub compatibility_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecommendation {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub title: String,
    pub message: String,
    pub priority: Priority,
}

/// Server-side BMI calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBmi {
    pub bmi: f64,
    pub category: BmiCategory,
    pub weight_kg: f64,
    pub height_cm: f64,
}

/// Compatibility of one food with a health profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCompatibility {
    pub food_name: String,
    pub compatibility_score: f64,
    pub energy_kcal: f64,
    pub recommendation: String,
}

/// Ask the service whether it is up answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

fn check_score(what: &str, score: f64) -> Result<()> {
    if score.is_finite() && (0.0..=100.0).contains(&score) {
        Ok(())
    } else {
        Err(NutriError::MalformedResponse(format!(
            "{} {} is outside 0-100",
            what, score
        )))
    }
}

impl RemoteDietPlan {
    /// Check the score ranges promised by the service
    pub fn validate(&self) -> Result<()> {
        for (meal, plan) in &self.diet_plan {
            check_score(&format!("{} avg_compatibility", meal), plan.avg_compatibility)?;
            for food in &plan.foods {
                check_score(
                    &format!("{} compatibility_score for {}", meal, food.food_name),
                    food.compatibility_score,
                )?;
            }
        }
        Ok(())
    }

    /// Foods across all meals
    pub fn food_count(&self) -> usize {
        self.diet_plan.values().map(|m| m.foods.len()).sum()
    }
}

/// Handle to the diet-plan service
///
/// Cheap to clone; clones share the underlying connection pool. Every call
/// is a single attempt: retrying is left to the caller.
#[derive(Debug, Clone)]
pub struct RemoteDietPlanClient {
    http_client: Client,
    base_url: String,
}

impl RemoteDietPlanClient {
    /// Create a client from configuration
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    /// Create a client for a base URL with an explicit request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(NutriError::Configuration(
                "Remote timeout must be greater than 0".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nutrirs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NutriError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request an AI-generated diet plan for a profile
    pub async fn generate_diet_plan(&self, profile: &UserProfile) -> Result<RemoteDietPlan> {
        MetricsCalculator::validate_profile(profile)?;

        let plan: RemoteDietPlan = self
            .post_json("generate-diet-plan", &DietPlanRequest::from(profile))
            .await?;
        plan.validate()?;

        info!(
            meals = plan.diet_plan.len(),
            foods = plan.food_count(),
            total_calories = plan.daily_summary.total_calories,
            "Received diet plan"
        );

        Ok(plan)
    }

    /// Ask the service to compute BMI
    pub async fn calculate_bmi(&self, weight_kg: Decimal, height_cm: Decimal) -> Result<RemoteBmi> {
        MetricsCalculator::validate_weight(weight_kg)?;
        MetricsCalculator::validate_height(height_cm)?;

        self.post_json(
            "calculate-bmi",
            &BmiRequest {
                weight_kg,
                height_cm,
            },
        )
        .await
    }

    /// Score a single food against a profile
    pub async fn check_food_compatibility(
        &self,
        profile: &UserProfile,
        food_name: &str,
    ) -> Result<FoodCompatibility> {
        MetricsCalculator::validate_profile(profile)?;

        let food_name = food_name.trim();
        if food_name.is_empty() {
            return Err(NutriError::invalid_input("food_name", "cannot be empty"));
        }

        let result: FoodCompatibility = self
            .post_json(
                "food-compatibility",
                &CompatibilityRequest {
                    user: DietPlanRequest::from(profile),
                    food_name,
                },
            )
            .await?;
        check_score("compatibility_score", result.compatibility_score)?;

        Ok(result)
    }

    /// Ask the service whether it is up
    pub async fn check_health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("health");
        let request_id = Uuid::new_v4();
        debug!(%url, %request_id, "GET");

        let response = self
            .http_client
            .get(&url)
            .header("X-Request-Id", request_id.to_string())
            .send()
            .await?;

        Self::decode(&url, response).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let request_id = Uuid::new_v4();
        debug!(%url, %request_id, "POST");

        let response = self
            .http_client
            .post(&url)
            .header("X-Request-Id", request_id.to_string())
            .json(body)
            .send()
            .await?;

        Self::decode(&url, response).await
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Diet-plan service returned an error");
            return Err(NutriError::RemoteService {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(%url, error = %e, "Diet-plan service broke the response contract");
            NutriError::MalformedResponse(format!("{}: {}", url, e))
        })
    }
}

/// Identifies one issued plan request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTicket {
    revision: u64,
    sequence: u64,
}

/// What happened to a completed request
#[derive(Debug)]
pub enum PlanOutcome {
    /// The plan replaced the held one
    Applied,
    /// A newer request or a profile change superseded this one
    Discarded,
    /// The request failed; any held plan is kept
    Failed(NutriError),
}

/// Holds the latest diet plan for the current profile state
///
/// The last request *issued* for the current profile wins, not the last to
/// resolve. Failures never replace a plan that is already held.
#[derive(Debug, Default)]
pub struct DietPlanSession {
    revision: u64,
    issued: u64,
    plan: Option<RemoteDietPlan>,
}

impl DietPlanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently held plan, if any
    pub fn plan(&self) -> Option<&RemoteDietPlan> {
        self.plan.as_ref()
    }

    /// Mark the profile as changed: drop the plan and orphan in-flight requests
    pub fn invalidate_profile(&mut self) {
        self.revision += 1;
        self.plan = None;
        debug!(revision = self.revision, "Profile changed, diet plan discarded");
    }

    /// Register a new request; earlier tickets stop being current
    pub fn begin_request(&mut self) -> PlanTicket {
        self.issued += 1;
        PlanTicket {
            revision: self.revision,
            sequence: self.issued,
        }
    }

    pub fn is_current(&self, ticket: PlanTicket) -> bool {
        ticket.revision == self.revision && ticket.sequence == self.issued
    }

    /// Apply the result of a request issued with `ticket`
    pub fn complete(&mut self, ticket: PlanTicket, result: Result<RemoteDietPlan>) -> PlanOutcome {
        if !self.is_current(ticket) {
            warn!(
                sequence = ticket.sequence,
                latest = self.issued,
                "Discarding stale diet plan result"
            );
            return PlanOutcome::Discarded;
        }

        match result {
            Ok(plan) => {
                self.plan = Some(plan);
                PlanOutcome::Applied
            }
            Err(err) => {
                warn!(
                    error = %err,
                    retained = self.plan.is_some(),
                    "Diet plan request failed"
                );
                PlanOutcome::Failed(err)
            }
        }
    }

    /// Issue one request and apply its result
    pub async fn refresh(
        &mut self,
        client: &RemoteDietPlanClient,
        profile: &UserProfile,
    ) -> Result<()> {
        let ticket = self.begin_request();
        let result = client.generate_diet_plan(profile).await;

        match self.complete(ticket, result) {
            PlanOutcome::Failed(err) => Err(err),
            PlanOutcome::Applied | PlanOutcome::Discarded => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Gender};
    use rust_decimal_macros::dec;
    use serde_json::json;

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

    fn sample_plan_json() -> serde_json::Value {
        json!({
            "user_profile": {
                "bmi": 22.86,
                "bmi_category": "Normal weight",
                "age": 30.0
            },
            "diet_plan": {
                "Breakfast": {
                    "foods": [
                        {"food_name": "Vegetable poha", "energy_kcal": 180.5, "compatibility_score": 97.0}
                    ],
                    "total_calories": 180,
                    "avg_compatibility": 97.0
                }
            },
            "daily_summary": {
                "total_calories": 180,
                "meals_count": 1,
                "generated_at": "2024-05-01T08:00:00"
            },
            "health_recommendations": [
                {"type": "blood_pressure", "title": "Blood Pressure Management",
                 "message": "Reduce sodium intake and choose low-fat options", "priority": "medium"}
            ]
        })
    }

    #[test]
    fn test_request_body_uses_profile_defaults() {
        let body = serde_json::to_value(DietPlanRequest::from(&create_test_profile())).unwrap();
        assert_eq!(
            body,
            json!({
                "age": 30,
                "weight_kg": 70.0,
                "height_cm": 175.0,
                "blood_pressure": 120,
                "blood_sugar_level": 100,
                "nutrition_quality": 7
            })
        );
    }

    #[test]
    fn test_plan_decodes_and_validates() {
        let plan: RemoteDietPlan = serde_json::from_value(sample_plan_json()).unwrap();
        assert!(plan.validate().is_ok());
        assert_eq!(plan.user_profile.bmi_category, BmiCategory::NormalWeight);
        assert_eq!(plan.health_recommendations[0].priority, Priority::Medium);
        assert_eq!(plan.food_count(), 1);
    }

    #[test]
    fn test_out_of_range_score_is_malformed() {
        let mut value = sample_plan_json();
        value["diet_plan"]["Breakfast"]["foods"][0]["compatibility_score"] = json!(104.2);
        let plan: RemoteDietPlan = serde_json::from_value(value).unwrap();

        assert!(matches!(plan.validate(), Err(NutriError::MalformedResponse(_))));
    }

    fn sample_plan() -> RemoteDietPlan {
        serde_json::from_value(sample_plan_json()).unwrap()
    }

    #[test]
    fn test_session_applies_current_result() {
        let mut session = DietPlanSession::new();
        let ticket = session.begin_request();

        assert!(matches!(session.complete(ticket, Ok(sample_plan())), PlanOutcome::Applied));
        assert!(session.plan().is_some());
    }

    #[test]
    fn test_session_keeps_plan_on_failure() {
        let mut session = DietPlanSession::new();
        let ticket = session.begin_request();
        session.complete(ticket, Ok(sample_plan()));

        let ticket = session.begin_request();
        let outcome = session.complete(ticket, Err(NutriError::RemoteService { status: 500 }));

        assert!(matches!(
            outcome,
            PlanOutcome::Failed(NutriError::RemoteService { status: 500 })
        ));
        assert_eq!(session.plan(), Some(&sample_plan()));
    }

    #[test]
    fn test_session_discards_superseded_request() {
        let mut session = DietPlanSession::new();
        let first = session.begin_request();
        let second = session.begin_request();

        let mut newer = sample_plan();
        newer.daily_summary.total_calories = 2100;

        assert!(matches!(session.complete(second, Ok(newer.clone())), PlanOutcome::Applied));
        // The older request resolves last and must not win
        assert!(matches!(session.complete(first, Ok(sample_plan())), PlanOutcome::Discarded));
        assert_eq!(session.plan(), Some(&newer));
    }

    #[test]
    fn test_session_discards_results_after_profile_change() {
        let mut session = DietPlanSession::new();
        let ticket = session.begin_request();
        session.complete(ticket, Ok(sample_plan()));

        let in_flight = session.begin_request();
        session.invalidate_profile();

        assert!(session.plan().is_none());
        assert!(!session.is_current(in_flight));
        assert!(matches!(
            session.complete(in_flight, Ok(sample_plan())),
            PlanOutcome::Discarded
        ));
        assert!(session.plan().is_none());
    }

    #[test]
    fn test_client_rejects_zero_timeout() {
        let result = RemoteDietPlanClient::with_timeout("http://localhost:5000/api", Duration::ZERO);
        assert!(matches!(result, Err(NutriError::Configuration(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            RemoteDietPlanClient::with_timeout("http://localhost:5000/api/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.endpoint("health"), "http://localhost:5000/api/health");
    }
}
