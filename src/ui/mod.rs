//! Presentation layer. Reads [`crate::state::AppState`], never computes
//! summaries itself.

pub mod charts;
pub mod panels;
pub mod tables;

/// `0.753` → `"75.3%"`.
pub fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}
