// Library interface for nutrirs modules
// This allows integration tests to access the core functionality

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod meal_planner;
pub mod metrics;
pub mod models;
pub mod recommendations;
pub mod remote;
pub mod report;
pub mod suggestions;

// Re-export commonly used types for convenience
pub use catalog::FoodCatalog;
pub use config::{AppConfig, RemoteConfig};
pub use error::{NutriError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use meal_planner::MealPlanner;
pub use metrics::MetricsCalculator;
pub use models::*;
pub use recommendations::{Recommendation, RecommendationEngine, RecommendationKind};
pub use remote::{DietPlanSession, PlanOutcome, RemoteDietPlan, RemoteDietPlanClient};
pub use suggestions::{LocalPlanOrchestrator, LocalSuggestions, MealPlanSlot};
