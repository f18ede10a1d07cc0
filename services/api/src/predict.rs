use clap::Args;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::screening::{
    FeatureValue, LoanApplicationForm, LoanScreeningService, ModelBundle, ModelState,
    ModelSummary, ScreeningOutcome,
};
use loan_approval::telemetry;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Model artifact to load (defaults to LOAN_MODEL_PATH)
    #[arg(long)]
    pub(crate) artifact: Option<PathBuf>,
    /// Print the full outcome as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
    #[arg(long, default_value_t = 30)]
    pub(crate) age: i64,
    /// Annual income ($)
    #[arg(long, default_value_t = 50_000)]
    pub(crate) income: i64,
    /// Employment experience (years)
    #[arg(long, default_value_t = 5)]
    pub(crate) experience: i64,
    #[arg(long, default_value = "RENT")]
    pub(crate) home_ownership: String,
    #[arg(long, default_value = "High School")]
    pub(crate) education: String,
    #[arg(long, default_value = "Male")]
    pub(crate) gender: String,
    /// Loan amount ($)
    #[arg(long, default_value_t = 10_000)]
    pub(crate) loan_amount: i64,
    #[arg(long, default_value = "PERSONAL")]
    pub(crate) loan_purpose: String,
    /// Interest rate (%)
    #[arg(long, default_value_t = 10.5)]
    pub(crate) interest_rate: f64,
    #[arg(long, default_value_t = 0.2)]
    pub(crate) loan_percent_income: f64,
    /// Credit history length (years)
    #[arg(long, default_value_t = 5)]
    pub(crate) credit_history_length: i64,
    #[arg(long, default_value_t = 700)]
    pub(crate) credit_score: i64,
    /// Previous loan defaults on file (No/Yes, 0/1)
    #[arg(long, default_value = "No")]
    pub(crate) previous_defaults: String,
}

impl PredictArgs {
    pub(crate) fn form(&self) -> LoanApplicationForm {
        LoanApplicationForm {
            age: self.age,
            income: self.income,
            experience: self.experience,
            home_ownership: FeatureValue::from(self.home_ownership.as_str()),
            education: FeatureValue::from(self.education.as_str()),
            gender: FeatureValue::from(self.gender.as_str()),
            loan_amount: self.loan_amount,
            loan_purpose: FeatureValue::from(self.loan_purpose.as_str()),
            interest_rate: self.interest_rate,
            loan_percent_income: self.loan_percent_income,
            credit_history_length: self.credit_history_length,
            credit_score: self.credit_score,
            previous_defaults: FeatureValue::from(self.previous_defaults.as_str()),
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct InspectArgs {
    /// Model artifact to load (defaults to LOAN_MODEL_PATH)
    #[arg(long)]
    pub(crate) artifact: Option<PathBuf>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let bundle = load_bundle(args.artifact.clone())?;
    let service = LoanScreeningService::new(ModelState::Ready(bundle));
    let outcome = service.screen(&args.form())?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&outcome).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_outcome(&outcome);
    }
    Ok(())
}

pub(crate) fn run_inspect(args: InspectArgs) -> Result<(), AppError> {
    let bundle = load_bundle(args.artifact)?;
    render_summary(&bundle.summary());
    Ok(())
}

fn load_bundle(artifact: Option<PathBuf>) -> Result<ModelBundle, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let path = artifact.unwrap_or(config.model.artifact_path);
    Ok(ModelBundle::from_path(path)?)
}

fn render_outcome(outcome: &ScreeningOutcome) {
    println!("Loan {}", outcome.verdict.label());

    println!("\nFeatures sent to the model");
    for (name, value) in outcome.features.iter() {
        println!("- {name}: {value}");
    }

    if !outcome.defaulted_features.is_empty() {
        println!("\nDefaulted to 0 (missing from the form)");
        for name in &outcome.defaulted_features {
            println!("- {name}");
        }
    }
}

fn render_summary(summary: &ModelSummary) {
    println!("Model kind: {}", summary.kind);

    match &summary.feature_names {
        Some(names) => {
            println!("\nModel features");
            for (index, name) in names.iter().enumerate() {
                println!("{index:>3}. {name}");
            }
        }
        None => println!("\nModel doesn't record its feature names"),
    }

    if summary.known_labels.is_empty() {
        println!("\nLabel encoders: none");
    } else {
        println!("\nLabel encoders");
        for (field, labels) in &summary.known_labels {
            println!("- {field}: {}", labels.join(", "));
        }
    }
}
