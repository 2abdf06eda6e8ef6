use serde::Deserialize;

/// Root application configuration. Loaded from environment variables with
/// the prefix `OPPORTUNITY_INSIGHT__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_input_path")]
    pub input_path: String,
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

/// Source-file column names. Defaults match the CRM export this tool was
/// built for, which uses Spanish headers.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_stage_column")]
    pub stage: String,
    #[serde(default = "default_traffic_source_column")]
    pub traffic_source: String,
    #[serde(default = "default_business_unit_column")]
    pub business_unit: String,
    #[serde(default = "default_created_column")]
    pub created: String,
    /// Stage value that marks a won opportunity.
    #[serde(default = "default_won_stage")]
    pub won_stage: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Two-sided significance level for the Wald test.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

// Default functions
fn default_input_path() -> String {
    "bd_processed.csv".to_string()
}
fn default_stage_column() -> String {
    "etapa".to_string()
}
fn default_traffic_source_column() -> String {
    "Fuente original de trafico".to_string()
}
fn default_business_unit_column() -> String {
    "Unidad de negocio asignada".to_string()
}
fn default_created_column() -> String {
    "Fecha de creacion".to_string()
}
fn default_won_stage() -> String {
    "ganado".to_string()
}
fn default_alpha() -> f64 {
    0.05
}
fn default_max_iterations() -> usize {
    25
}
fn default_tolerance() -> f64 {
    1e-8
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            stage: default_stage_column(),
            traffic_source: default_traffic_source_column(),
            business_unit: default_business_unit_column(),
            created: default_created_column(),
            won_stage: default_won_stage(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            columns: ColumnsConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("OPPORTUNITY_INSIGHT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
