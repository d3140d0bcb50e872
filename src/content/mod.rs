pub mod canvas;
pub mod generator;
pub mod records;

pub use canvas::{Canvas, DrawOp, TextAlign};
pub use generator::{render, Rendered, MISSING_AMOUNT, MISSING_TEXT};
pub use records::{CityStats, DashboardCard, PanelContent, PortfolioCard, RiskRow, TaskRecord};
