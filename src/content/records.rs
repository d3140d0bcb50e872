use serde::{Deserialize, Serialize};

use crate::math::Rgba;

/// Insurance task as delivered by the data source.
///
/// Every field is optional on the wire; missing values render as placeholders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRecord {
    pub id: Option<String>,
    pub account_name: Option<String>,
    pub status: Option<String>,
    pub premium: Option<f64>,
    pub propensity_to_bind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioCard {
    pub title: Option<String>,
    pub value: Option<String>,
    pub bound_amount: Option<String>,
    pub bound_quote_ratio: Option<String>,
    pub open_quote: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardCard {
    pub title: Option<String>,
    pub value: Option<String>,
    pub change: Option<String>,
}

/// One row of the risk matrix, derived from a task
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskRow {
    pub name: Option<String>,
    pub risk: Option<String>,
    pub premium: Option<f64>,
}

impl From<&TaskRecord> for RiskRow {
    fn from(task: &TaskRecord) -> Self {
        Self {
            name: task.account_name.clone(),
            risk: task.propensity_to_bind.clone(),
            premium: task.premium,
        }
    }
}

/// Portfolio summary for one globe location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityStats {
    pub name: String,
    pub lat: f32,
    pub lon: f32,
    /// Marker radius
    pub size: f32,
    pub policies: u32,
    pub premium: String,
    pub risk: String,
    pub claims: u32,
}

impl CityStats {
    pub fn new(name: &str, lat: f32, lon: f32, size: f32, policies: u32, premium: &str, risk: &str, claims: u32) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
            size,
            policies,
            premium: premium.to_string(),
            risk: risk.to_string(),
            claims,
        }
    }

    pub fn defaults() -> Vec<CityStats> {
        vec![
            CityStats::new("New York", 40.7128, -74.0060, 0.1, 342, "$4.2M", "Medium", 12),
            CityStats::new("London", 51.5074, -0.1278, 0.08, 218, "$2.8M", "Low", 5),
            CityStats::new("Tokyo", 35.6762, 139.6503, 0.09, 186, "$3.1M", "High", 18),
            CityStats::new("Hong Kong", 22.3193, 114.1694, 0.07, 156, "$2.4M", "Medium", 8),
            CityStats::new("Singapore", 1.3521, 103.8198, 0.06, 98, "$1.5M", "Low", 3),
        ]
    }
}

/// Everything a surface texture can be generated from
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    /// Placeholder shown until the first real record arrives
    Loading { title: String },
    Tasks(Vec<TaskRecord>),
    Portfolio(Vec<PortfolioCard>),
    Dashboard(Vec<DashboardCard>),
    Risk(Vec<RiskRow>),
    City(CityStats),
    Label {
        title: String,
        lines: Vec<String>,
        background: Rgba,
        foreground: Rgba,
    },
}

impl PanelContent {
    pub fn label(title: &str, lines: &[&str], background: Rgba, foreground: Rgba) -> Self {
        PanelContent::Label {
            title: title.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            background,
            foreground,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PanelContent::Loading { .. } => "loading",
            PanelContent::Tasks(_) => "tasks",
            PanelContent::Portfolio(_) => "portfolio",
            PanelContent::Dashboard(_) => "dashboard",
            PanelContent::Risk(_) => "risk",
            PanelContent::City(_) => "city",
            PanelContent::Label { .. } => "label",
        }
    }
}
