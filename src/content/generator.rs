//! Pure record-to-pixels rendering for panel textures.
//!
//! Each variant has a fixed layout in canvas pixels. Missing fields are
//! replaced with [`MISSING_TEXT`] or [`MISSING_AMOUNT`] and counted, so a
//! malformed record still yields a complete texture.

use super::canvas::{text_width, Canvas, DrawOp, TextAlign};
use super::records::{CityStats, DashboardCard, PanelContent, PortfolioCard, RiskRow, TaskRecord};
use crate::math::Rgba;

pub const MISSING_TEXT: &str = "N/A";
pub const MISSING_AMOUNT: &str = "$--";

/// Risk label used when a row carries none
pub const DEFAULT_RISK_LEVEL: &str = "Even chance";

const ACCENT: Rgba = Rgba::from_hex(0x00c6ff);
const CARD_FILL: Rgba = Rgba::new(0, 198, 255, 26);
const POSITIVE: Rgba = Rgba::from_hex(0x05c46b);

pub struct Rendered {
    pub canvas: Canvas,
    /// How many fields fell back to a placeholder
    pub placeholders: usize,
}

pub fn render(content: &PanelContent, width: u32, height: u32) -> Rendered {
    let mut ctx = Layout {
        ops: Vec::new(),
        placeholders: 0,
        width: width as i32,
        height: height as i32,
    };

    match content {
        PanelContent::Loading { title } => ctx.loading(title),
        PanelContent::Tasks(tasks) => ctx.tasks(tasks),
        PanelContent::Portfolio(cards) => ctx.portfolio(cards),
        PanelContent::Dashboard(cards) => ctx.dashboard(cards),
        PanelContent::Risk(rows) => ctx.risk(rows),
        PanelContent::City(city) => ctx.city(city),
        PanelContent::Label { title, lines, background, foreground } => {
            ctx.label(title, lines, *background, *foreground)
        }
    }

    if ctx.placeholders > 0 {
        log::debug!(
            "{} panel rendered with {} placeholder field(s)",
            content.kind(),
            ctx.placeholders
        );
    }

    Rendered {
        canvas: Canvas::new(width, height).draw_all(ctx.ops).execute_ops(),
        placeholders: ctx.placeholders,
    }
}

/// Glow color for a panel showing `content`
pub fn accent_color(content: &PanelContent) -> u32 {
    match content {
        PanelContent::Tasks(_) => 0x00c6ff,
        PanelContent::Portfolio(_) => 0x05c46b,
        PanelContent::Dashboard(_) => 0xffa502,
        PanelContent::Risk(_) => 0xff4757,
        _ => 0x0072ff,
    }
}

pub fn status_color(status: &str) -> Rgba {
    match status {
        "Pending" => Rgba::from_hex(0xffa502),
        "Quoted" => Rgba::from_hex(0x05c46b),
        "Referred" => Rgba::from_hex(0xff4757),
        _ => Rgba::WHITE,
    }
}

pub fn risk_level_color(level: &str) -> Rgba {
    match level {
        "Almost certain" => Rgba::from_hex(0xff4757),
        "Likely" => Rgba::from_hex(0xffa502),
        "Even chance" => Rgba::from_hex(0xffd32c),
        "Unlikely" => Rgba::from_hex(0x05c46b),
        "Remote" => Rgba::from_hex(0x0fbcf9),
        _ => Rgba::WHITE,
    }
}

/// Globe region risk (High / Medium / Low)
pub fn region_risk_color(risk: &str) -> Rgba {
    match risk {
        "High" => Rgba::from_hex(0xff4757),
        "Medium" => Rgba::from_hex(0xffa502),
        "Low" => Rgba::from_hex(0x05c46b),
        _ => ACCENT,
    }
}

/// `1234567.0` -> `"$1,234,567"`
pub fn format_amount(amount: f64) -> String {
    let whole = amount.abs().round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0.0 && whole > 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Approximate a CSS pixel font size with the 8px bitmap font
fn font(px: i32) -> i32 {
    ((px + 4) / 9).max(1)
}

struct Layout {
    ops: Vec<DrawOp>,
    placeholders: usize,
    width: i32,
    height: i32,
}

impl Layout {
    fn text_or_placeholder(&mut self, value: &Option<String>) -> String {
        match value.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                self.placeholders += 1;
                MISSING_TEXT.to_string()
            }
        }
    }

    fn amount_or_placeholder(&mut self, value: Option<f64>) -> String {
        match value {
            Some(v) if v.is_finite() => format_amount(v),
            _ => {
                self.placeholders += 1;
                MISSING_AMOUNT.to_string()
            }
        }
    }

    fn text(&mut self, x: i32, y: i32, text: impl Into<String>, px: i32, color: Rgba, align: TextAlign) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.into(),
            scale: font(px),
            color,
            align,
        });
    }

    fn rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        self.ops.push(DrawOp::Rect { x, y, width, height, color });
    }

    fn panel_background(&mut self) {
        self.ops.push(DrawOp::VGradient {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
            top: Rgba::from_hex(0x0a0a0f),
            bottom: Rgba::from_hex(0x1a1a3e),
        });
    }

    fn heading(&mut self, title: &str) {
        self.text(self.width / 2, 60, title, 36, ACCENT, TextAlign::Center);
    }

    fn loading(&mut self, title: &str) {
        self.panel_background();
        let (cx, cy) = (self.width / 2, self.height / 2);
        self.text(cx, 80, title, 48, ACCENT, TextAlign::Center);
        self.ops.push(DrawOp::Arc {
            cx,
            cy,
            radius: 50,
            start: 0.0,
            end: std::f32::consts::PI * 1.5,
            thickness: 3,
            color: ACCENT,
        });
        self.text(cx, cy + 100, "Loading data...", 24, Rgba::WHITE, TextAlign::Center);
    }

    fn tasks(&mut self, tasks: &[TaskRecord]) {
        self.panel_background();
        self.text(50, 60, "Active Tasks", 36, ACCENT, TextAlign::Left);

        for (i, task) in tasks.iter().enumerate() {
            let y = 120 + i as i32 * 80;
            self.rect(40, y - 30, 944, 70, CARD_FILL);

            let id = self.text_or_placeholder(&task.id);
            let account = self.text_or_placeholder(&task.account_name);
            let status = self.text_or_placeholder(&task.status);
            let premium = self.amount_or_placeholder(task.premium);

            self.text(60, y - 10, id, 14, ACCENT, TextAlign::Left);
            self.text(60, y + 15, account, 20, Rgba::WHITE, TextAlign::Left);
            let status_rgba = status_color(&status);
            self.text(850, y, status, 16, status_rgba, TextAlign::Left);
            self.text(930, y + 15, premium, 18, ACCENT, TextAlign::Right);
        }
    }

    fn portfolio(&mut self, cards: &[PortfolioCard]) {
        self.panel_background();
        self.heading("Portfolio Performance");

        for (i, card) in cards.iter().enumerate() {
            let x = 100 + i as i32 * 450;
            let y = 150;
            self.rect(x - 50, y - 50, 400, 300, CARD_FILL);

            let cx = x + 150;
            let title = self.text_or_placeholder(&card.title);
            let value = self.text_or_placeholder(&card.value);
            self.text(cx, y, title, 24, Rgba::WHITE, TextAlign::Center);
            self.text(cx, y + 60, value, 48, ACCENT, TextAlign::Center);

            for (offset, field) in [(100, &card.bound_amount), (130, &card.bound_quote_ratio), (160, &card.open_quote)] {
                let line = self.text_or_placeholder(field);
                self.text(cx, y + offset, line, 18, Rgba::WHITE, TextAlign::Center);
            }
        }
    }

    fn dashboard(&mut self, cards: &[DashboardCard]) {
        self.panel_background();
        self.heading("Dashboard Metrics");

        for (i, card) in cards.iter().enumerate() {
            let x = 200 + (i as i32 % 2) * 400;
            let y = 150 + (i as i32 / 2) * 200;
            self.rect(x - 150, y - 50, 300, 150, CARD_FILL);

            let title = self.text_or_placeholder(&card.title);
            let value = self.text_or_placeholder(&card.value);
            self.text(x, y, title, 18, Rgba::WHITE, TextAlign::Center);
            self.text(x, y + 50, value, 48, ACCENT, TextAlign::Center);

            // change is optional and never counted
            if let Some(change) = card.change.as_deref().filter(|c| !c.is_empty()) {
                self.text(x, y + 80, change, 16, POSITIVE, TextAlign::Center);
            }
        }
    }

    fn risk(&mut self, rows: &[RiskRow]) {
        self.panel_background();
        self.heading("Risk Assessment Matrix");

        for (i, row) in rows.iter().enumerate() {
            let y = 120 + i as i32 * 60;
            let level = row
                .risk
                .as_deref()
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_RISK_LEVEL)
                .to_string();
            self.rect(50, y - 20, 600, 40, risk_level_color(&level));

            let name = self.text_or_placeholder(&row.name);
            let premium = self.amount_or_placeholder(row.premium);
            self.text(70, y + 5, name, 18, Rgba::WHITE, TextAlign::Left);
            self.text(620, y + 5, level, 18, Rgba::BLACK, TextAlign::Right);
            self.text(900, y + 5, premium, 16, Rgba::WHITE, TextAlign::Right);
        }
    }

    fn city(&mut self, city: &CityStats) {
        self.ops.push(DrawOp::VGradient {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
            top: Rgba::new(0, 30, 60, 242),
            bottom: Rgba::new(0, 15, 30, 242),
        });
        self.ops.push(DrawOp::StrokeRect {
            x: 2,
            y: 2,
            width: self.width - 4,
            height: self.height - 4,
            thickness: 3,
            color: ACCENT,
        });
        self.text(self.width / 2, 50, city.name.clone(), 36, ACCENT, TextAlign::Center);

        let rows = [
            ("Active Policies:", city.policies.to_string(), ACCENT),
            ("Total Premium:", city.premium.clone(), ACCENT),
            ("Risk Level:", city.risk.clone(), region_risk_color(&city.risk)),
            ("Recent Claims:", city.claims.to_string(), ACCENT),
        ];
        for (i, (label, value, color)) in rows.into_iter().enumerate() {
            let y = 120 + i as i32 * 50;
            self.text(50, y, label, 24, Rgba::WHITE, TextAlign::Left);
            self.text(250, y, value, 24, color, TextAlign::Left);
        }
    }

    fn label(&mut self, title: &str, lines: &[String], background: Rgba, foreground: Rgba) {
        self.ops.push(DrawOp::Clear(background));

        let fit = |text: &str, max: i32, width: i32| {
            let unit = text_width(text, 1).max(1);
            ((width - 16) / unit).clamp(1, max)
        };
        let title_scale = fit(title, 4, self.width);
        let line_scale = lines.iter().map(|l| fit(l, 2, self.width)).min().unwrap_or(2);

        let title_h = 10 * title_scale;
        let line_h = 12 * line_scale;
        let total = title_h + line_h * lines.len() as i32;
        let mut baseline = (self.height - total) / 2 + 8 * title_scale;

        self.ops.push(DrawOp::Text {
            x: self.width / 2,
            y: baseline,
            text: title.to_string(),
            scale: title_scale,
            color: foreground,
            align: TextAlign::Center,
        });
        baseline += title_h - 8 * title_scale + 10 * line_scale;
        for line in lines {
            self.ops.push(DrawOp::Text {
                x: self.width / 2,
                y: baseline,
                text: line.clone(),
                scale: line_scale,
                color: foreground.with_alpha(0.85),
                align: TextAlign::Center,
            });
            baseline += line_h;
        }
    }
}
