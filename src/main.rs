use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use nutrirs::config::AppConfig;
use nutrirs::logging::{init_logging, LogLevel};
use nutrirs::remote::{DietPlanSession, RemoteDietPlanClient};
use nutrirs::report;
use nutrirs::{
    ActivityLevel, FoodCatalog, Gender, Goal, LocalPlanOrchestrator, MealSlot, MetricsCalculator,
    NutriError, UserProfile,
};

/// NutriRS - Nutrition Planning CLI
///
/// Computes body metrics, builds rule-based Indian meal plans and talks to
/// the AI diet-plan service.
#[derive(Parser)]
#[command(name = "nutrirs")]
#[command(author = "NutriRS Contributors")]
#[command(version)]
#[command(about = "Nutrition planning CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate BMI, BMR, TDEE, macros and healthy weight range
    Metrics {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Weight goal (lose, maintain, gain)
        #[arg(short, long)]
        goal: Option<String>,
    },

    /// Build a local meal plan from the food catalog
    Plan {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Weight goal (lose, maintain, gain)
        #[arg(short, long)]
        goal: Option<String>,

        /// Seed for reproducible food selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List catalog foods, optionally filtered for a BMI and goal
    Foods {
        /// Meal slot (breakfast, lunch, dinner, snacks)
        #[arg(short, long)]
        slot: Option<MealSlot>,

        /// Only show foods recommended for this BMI
        #[arg(long)]
        bmi: Option<Decimal>,

        /// Weight goal used with --bmi
        #[arg(short, long)]
        goal: Option<String>,
    },

    /// Call the AI diet-plan service
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },

    /// Show or create the configuration file
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    /// Generate an AI diet plan
    Plan {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Compute BMI on the service
    Bmi {
        /// Weight in kg
        #[arg(long)]
        weight: Decimal,

        /// Height in cm
        #[arg(long)]
        height: Decimal,
    },

    /// Score one food against a profile
    Compatibility {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Food name as known to the service
        #[arg(long)]
        food: String,
    },

    /// Check that the service is reachable
    Health,
}

/// Profile from a file or from individual flags
#[derive(Args)]
struct ProfileArgs {
    /// Profile file (JSON or TOML)
    #[arg(short, long, value_name = "FILE")]
    profile: Option<PathBuf>,

    #[arg(long, default_value = "User")]
    name: String,

    /// Age in years
    #[arg(long)]
    age: Option<u32>,

    /// Weight in kg
    #[arg(long)]
    weight: Option<Decimal>,

    /// Height in cm
    #[arg(long)]
    height: Option<Decimal>,

    /// male, female or other
    #[arg(long, default_value = "male")]
    gender: Gender,

    /// sedentary, lightly, moderate, active or very
    #[arg(long, default_value = "moderate")]
    activity: String,

    /// Systolic blood pressure (mmHg)
    #[arg(long)]
    blood_pressure: Option<u32>,

    /// Fasting blood sugar (mg/dL)
    #[arg(long)]
    blood_sugar: Option<u32>,

    /// Diet quality 1-10
    #[arg(long)]
    nutrition_quality: Option<u8>,
}

impl ProfileArgs {
    fn resolve(&self) -> Result<UserProfile> {
        if let Some(path) = &self.profile {
            return load_profile(path);
        }

        let (Some(age), Some(weight), Some(height)) = (self.age, self.weight, self.height) else {
            anyhow::bail!("--age, --weight and --height are required without --profile");
        };

        let mut profile = UserProfile::new(
            self.name.clone(),
            age,
            weight,
            height,
            self.gender,
            ActivityLevel::from_label(&self.activity),
        );
        profile.blood_pressure_systolic = self.blood_pressure;
        profile.blood_sugar_mg_dl = self.blood_sugar;
        profile.nutrition_quality_score = self.nutrition_quality;
        Ok(profile)
    }
}

fn load_profile(path: &Path) -> Result<UserProfile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).with_context(|| "Failed to parse JSON profile")
    } else {
        toml::from_str(&content).with_context(|| "Failed to parse TOML profile")
    }
}

fn resolve_goal(goal: Option<&str>, config: &AppConfig) -> Goal {
    goal.map(Goal::from_label)
        .unwrap_or(config.planner.default_goal)
}

fn load_catalog(config: &AppConfig) -> Result<FoodCatalog> {
    match &config.planner.catalog_path {
        Some(path) => Ok(FoodCatalog::load_from_file(path)?),
        None => Ok(FoodCatalog::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<NutriError>() {
            Some(nutri) => {
                if nutri.severity().to_tracing_level() == tracing::Level::WARN {
                    tracing::warn!(error = %nutri, "Command failed");
                } else {
                    tracing::error!(severity = ?nutri.severity(), error = %nutri, "Command failed");
                }
                eprintln!("{} {}", "Error:".red().bold(), nutri.user_message());
            }
            None => eprintln!("{} {:#}", "Error:".red().bold(), err),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // `config --init` must work before any config file exists
    let config = match &cli.command {
        Commands::Config { init: true, .. } => AppConfig::default(),
        _ => AppConfig::load(cli.config.as_deref())?,
    };

    let mut log_config = config.logging.clone();
    log_config.level = LogLevel::from_verbosity(log_config.level, cli.verbose);
    init_logging(&log_config)?;

    match cli.command {
        Commands::Metrics { profile, goal } => {
            let profile = profile.resolve()?;
            let goal = resolve_goal(goal.as_deref(), &config);
            let metrics = MetricsCalculator::evaluate(&profile, goal)?;
            let ideal = MetricsCalculator::ideal_weight_range(profile.height_cm)?;

            if cli.json {
                print_json(&serde_json::json!({
                    "metrics": metrics,
                    "ideal_weight_kg": ideal,
                    "activity": profile.activity_level.description(),
                }))?;
            } else {
                print!("{}", report::render_metrics(&metrics, goal, Some(ideal)));
            }
        }

        Commands::Plan {
            profile,
            goal,
            seed,
        } => {
            let profile = profile.resolve()?;
            let goal = resolve_goal(goal.as_deref(), &config);
            let orchestrator = LocalPlanOrchestrator::new(load_catalog(&config)?);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let (metrics, suggestions) =
                orchestrator.suggest_for_profile(&profile, goal, &mut rng)?;

            if cli.json {
                print_json(&serde_json::json!({
                    "metrics": metrics,
                    "suggestions": suggestions,
                }))?;
            } else {
                print!("{}", report::render_metrics(&metrics, goal, None));
                println!();
                print!("{}", report::render_local_plan(&suggestions));
            }
        }

        Commands::Foods { slot, bmi, goal } => {
            let catalog = load_catalog(&config)?;
            let goal = resolve_goal(goal.as_deref(), &config);
            let slots: Vec<MealSlot> = match slot {
                Some(slot) => vec![slot],
                None => MealSlot::ALL.to_vec(),
            };

            for slot in slots {
                let foods = match bmi {
                    Some(bmi) => catalog.recommended_foods(slot, bmi, goal),
                    None => catalog.foods(slot).iter().collect(),
                };

                if cli.json {
                    print_json(&serde_json::json!({ "slot": slot, "foods": foods }))?;
                } else {
                    print!("{}", report::render_foods(slot, &foods));
                }
            }
        }

        Commands::Remote { command } => {
            let client = RemoteDietPlanClient::new(&config.remote)?;
            run_remote(command, &client, cli.json).await?;
        }

        Commands::Config { show, init } => {
            let path = cli.config.unwrap_or_else(AppConfig::default_config_path);

            if init {
                if path.exists() {
                    anyhow::bail!("Config file already exists: {}", path.display());
                }
                AppConfig::default().save_to_file(&path)?;
                println!("{} {}", "Created".green().bold(), path.display());
            }

            if show || !init {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

async fn run_remote(command: RemoteCommands, client: &RemoteDietPlanClient, json: bool) -> Result<()> {
    match command {
        RemoteCommands::Plan { profile } => {
            let profile = profile.resolve()?;
            let mut session = DietPlanSession::new();
            session.refresh(client, &profile).await?;

            if let Some(plan) = session.plan() {
                if json {
                    print_json(plan)?;
                } else {
                    print!("{}", report::render_remote_plan(plan));
                }
            }
        }

        RemoteCommands::Bmi { weight, height } => {
            let bmi = client.calculate_bmi(weight, height).await?;
            if json {
                print_json(&bmi)?;
            } else {
                print!("{}", report::render_remote_bmi(&bmi));
            }
        }

        RemoteCommands::Compatibility { profile, food } => {
            let profile = profile.resolve()?;
            let result = client.check_food_compatibility(&profile, &food).await?;
            if json {
                print_json(&result)?;
            } else {
                print!("{}", report::render_compatibility(&result));
            }
        }

        RemoteCommands::Health => {
            let status = client.check_health().await?;
            if json {
                print_json(&status)?;
            } else if status.is_healthy() {
                println!("{} {}", "✓".green(), client.base_url());
            } else {
                println!("{} {} {}", "✗".red(), status.status, status.message);
            }
        }
    }

    Ok(())
}
