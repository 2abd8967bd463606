use mailmorph_core::{AppViewModel, FetchState, LogRowView, MetricRowView, Notice, ViewKind};

use super::constants::*;

/// Full text of one view for the current view model.
pub fn render(kind: ViewKind, view: &AppViewModel) -> String {
    let mut lines = Vec::new();

    match kind {
        ViewKind::Extract => {
            if let Some(notice) = &view.notice {
                lines.push(notice_text(notice).to_string());
            }
            render_fetch(&view.extraction, &mut lines, |items| match items.first() {
                Some(document) => vec![TITLE_EXTRACT.to_string(), document.to_string()],
                None => Vec::new(),
            });
        }
        ViewKind::Metrics => {
            lines.push(TITLE_METRICS.to_string());
            render_fetch(&view.metrics, &mut lines, |_| {
                let rows: Vec<Vec<String>> = view.metric_rows().iter().map(metric_cells).collect();
                render_table(&METRIC_HEADERS, &rows)
            });
        }
        ViewKind::Logs => {
            lines.push(TITLE_LOGS.to_string());
            render_fetch(&view.logs, &mut lines, |_| {
                let rows: Vec<Vec<String>> = view.log_rows().iter().map(log_cells).collect();
                render_table(&LOG_HEADERS, &rows)
            });
        }
    }

    lines.join("\n")
}

/// Loading, error and content are mutually exclusive.
fn render_fetch<T>(
    state: &FetchState<T>,
    lines: &mut Vec<String>,
    content: impl FnOnce(&[T]) -> Vec<String>,
) {
    if state.is_loading {
        lines.push(LOADING.to_string());
    } else if let Some(error) = &state.error {
        lines.push(format!("Error: {error}"));
    } else {
        lines.extend(content(&state.items));
    }
}

fn notice_text(notice: &Notice) -> &'static str {
    match notice {
        Notice::EmptyInput => NOTICE_EMPTY_INPUT,
        Notice::Extracted => NOTICE_EXTRACTED,
        Notice::ExtractionFailed(_) => NOTICE_EXTRACTION_FAILED,
    }
}

fn metric_cells(row: &MetricRowView) -> Vec<String> {
    vec![
        cell(row.tokens_used),
        row.latency.map(format_number).unwrap_or_default(),
        row.timestamp.display_local(),
    ]
}

fn log_cells(row: &LogRowView) -> Vec<String> {
    vec![
        row.request_id.clone().unwrap_or_default(),
        row.source_hash.clone().unwrap_or_default(),
        cell(row.cache_hit),
        row.latency.map(format_number).unwrap_or_default(),
        row.timestamp.display_local(),
    ]
}

/// Missing fields render as blank cells.
fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.iter().copied(), &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str), &widths));
    }
    lines
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Whole numbers print without a fraction, like the backend sends them.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
