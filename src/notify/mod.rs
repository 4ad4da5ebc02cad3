//! Notifier: templates, lookup tables, charts and alert deduplication

pub mod alerts;
pub mod chart;
pub mod render;
pub mod texts;

pub use alerts::{AlertPlan, AlertReport, deliver_alerts, process_alerts};
pub use render::{
    render_alert, render_forecast, render_precipitation_caption, render_summary,
    render_temperature_caption,
};
