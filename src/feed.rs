//! Content delivery from the data source into the render loop.
//!
//! Producers may publish from any thread at any time; the orchestrator drains
//! the inbox once per frame on the loop thread.

use std::path::Path;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use serde::{Deserialize, Serialize};

use crate::content::{DashboardCard, PanelContent, PortfolioCard, RiskRow, TaskRecord};
use crate::error::ConfigError;

/// Tasks shown on the task monitor
pub const TASK_PANEL_ROWS: usize = 5;

/// Snapshot of everything the data source knows
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfficeData {
    pub tasks: Vec<TaskRecord>,
    pub portfolio: Vec<PortfolioCard>,
    pub dashboard: Vec<DashboardCard>,
}

impl OfficeData {
    /// Monitor slot and content for each panel this snapshot can fill.
    ///
    /// Nothing is routed until at least one task exists.
    pub fn panel_contents(&self) -> Vec<(usize, PanelContent)> {
        if self.tasks.is_empty() {
            return Vec::new();
        }
        let mut out = vec![(
            0,
            PanelContent::Tasks(self.tasks.iter().take(TASK_PANEL_ROWS).cloned().collect()),
        )];
        if !self.portfolio.is_empty() {
            out.push((1, PanelContent::Portfolio(self.portfolio.clone())));
        }
        if !self.dashboard.is_empty() {
            out.push((2, PanelContent::Dashboard(self.dashboard.clone())));
        }
        out.push((3, PanelContent::Risk(self.tasks.iter().map(RiskRow::from).collect())));
        out
    }
}

#[derive(Debug, Clone)]
pub enum ContentUpdate {
    Office(OfficeData),
    Panel { slot: usize, content: PanelContent },
}

#[derive(Debug, Clone)]
pub struct ContentSender(UnboundedSender<ContentUpdate>);

impl ContentSender {
    /// False once the orchestrator is gone
    pub fn publish(&self, data: OfficeData) -> bool {
        self.0.unbounded_send(ContentUpdate::Office(data)).is_ok()
    }

    pub fn publish_panel(&self, slot: usize, content: PanelContent) -> bool {
        self.0.unbounded_send(ContentUpdate::Panel { slot, content }).is_ok()
    }
}

pub struct ContentInbox(UnboundedReceiver<ContentUpdate>);

impl ContentInbox {
    /// Everything published since the last drain, oldest first
    pub fn drain(&mut self) -> Vec<ContentUpdate> {
        let mut out = Vec::new();
        while let Ok(Some(update)) = self.0.try_next() {
            out.push(update);
        }
        out
    }
}

pub fn content_channel() -> (ContentSender, ContentInbox) {
    let (tx, rx) = unbounded();
    (ContentSender(tx), ContentInbox(rx))
}

pub fn load_office_data(path: &Path) -> Result<OfficeData, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks(n: usize) -> Vec<TaskRecord> {
        (0..n)
            .map(|i| TaskRecord {
                account_name: Some(format!("Account {i}")),
                propensity_to_bind: Some("Likely".into()),
                premium: Some(1000.0 * i as f64),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_no_tasks_routes_nothing() {
        let data = OfficeData {
            portfolio: vec![PortfolioCard::default()],
            ..Default::default()
        };
        assert!(data.panel_contents().is_empty());
    }

    #[test]
    fn test_routing_by_slot() {
        let data = OfficeData {
            tasks: tasks(8),
            portfolio: vec![],
            dashboard: vec![DashboardCard::default()],
        };
        let routed = data.panel_contents();
        let slots: Vec<usize> = routed.iter().map(|(s, _)| *s).collect();
        assert_eq!(slots, vec![0, 2, 3], "empty portfolio is skipped");

        match &routed[0].1 {
            PanelContent::Tasks(t) => assert_eq!(t.len(), TASK_PANEL_ROWS),
            other => panic!("slot 0 got {}", other.kind()),
        }
        match &routed[2].1 {
            PanelContent::Risk(rows) => {
                assert_eq!(rows.len(), 8, "risk rows cover every task");
                assert_eq!(rows[3].premium, Some(3000.0));
            }
            other => panic!("slot 3 got {}", other.kind()),
        }
    }

    #[test]
    fn test_inbox_drains_in_order() {
        let (tx, mut inbox) = content_channel();
        assert!(tx.publish_panel(1, PanelContent::Portfolio(vec![])));
        assert!(tx.publish(OfficeData::default()));
        let drained = inbox.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], ContentUpdate::Panel { slot: 1, .. }));
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_office_data_parses_camel_case() {
        let data: OfficeData =
            serde_json::from_str(r#"{"tasks":[{"accountName":"MUJI","propensityToBind":"Highly Likely"}]}"#).unwrap();
        assert_eq!(data.tasks[0].propensity_to_bind.as_deref(), Some("Highly Likely"));
        assert!(data.dashboard.is_empty());
    }
}
