use crate::state::RegionContent;
use crate::types::{ChartPayload, ContentBlock, Message, TablePayload};
use crate::ui::measure::{display_width, pad_to_width, truncate_to_width};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use serde_json::Value;

const MAX_CELL_WIDTH: usize = 32;
const COLUMN_GAP: &str = "  ";

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn indent(line: &str) -> Line<'static> {
    Line::from(format!("  {line}"))
}

/// Lightweight markdown: headings, bullets and fenced code get their own style;
/// everything else is shown verbatim.
pub fn markdown_lines(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut in_code = false;

    for raw in text.lines() {
        let trimmed = raw.trim_start();
        if trimmed.starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            lines.push(Line::styled(
                format!("  {raw}"),
                Style::default().fg(Color::Yellow),
            ));
        } else if let Some(heading) = trimmed.strip_prefix('#') {
            lines.push(Line::styled(
                heading.trim_start_matches('#').trim().to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            let depth = raw.len() - trimmed.len();
            lines.push(Line::from(format!("{}• {item}", " ".repeat(depth))));
        } else {
            lines.push(Line::from(raw.replace("**", "")));
        }
    }

    if lines.is_empty() && !text.is_empty() {
        lines.push(Line::from(String::new()));
    }
    lines
}

/// Aligned text grid; wide cells are cut at a fixed column width.
pub fn table_lines(columns: &[String], rows: &[Vec<String>]) -> Vec<Line<'static>> {
    if columns.is_empty() {
        return vec![Line::styled("(empty table)", dim())];
    }

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| display_width(cell))
                .chain(std::iter::once(display_width(name)))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let format_row = |cells: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let cell = cells.get(col).map(String::as_str).unwrap_or("");
                pad_to_width(&truncate_to_width(cell, *width), *width)
            })
            .collect::<Vec<_>>()
            .join(COLUMN_GAP)
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(Line::styled(
        format_row(columns),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let rule_width = widths.iter().sum::<usize>() + COLUMN_GAP.len() * (widths.len() - 1);
    lines.push(Line::styled("─".repeat(rule_width), dim()));
    lines.extend(rows.iter().map(|row| Line::from(format_row(row))));
    lines
}

fn spec_text(value: Option<&Value>, nested_key: &str) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map.get(nested_key)?.as_str().map(str::to_string),
        _ => None,
    }
}

/// One-line description of a Vega-Lite chart: title, mark and encoded fields.
pub fn chart_summary(spec: &Value) -> String {
    let title = spec_text(spec.get("title"), "text").unwrap_or_else(|| "Chart".to_string());
    let mut parts = Vec::new();
    if let Some(mark) = spec_text(spec.get("mark"), "type") {
        parts.push(mark);
    }
    if let Some(encoding) = spec.get("encoding").and_then(Value::as_object) {
        for (channel, def) in encoding {
            if let Some(field) = def.get("field").and_then(Value::as_str) {
                parts.push(format!("{channel}: {field}"));
            }
        }
    }

    if parts.is_empty() {
        format!("[chart] {title}")
    } else {
        format!("[chart] {title} ({})", parts.join(", "))
    }
}

fn disclosure(label: &str, expanded: bool) -> Line<'static> {
    let marker = if expanded { "▾" } else { "▸" };
    Line::from(vec![
        Span::styled(format!("{marker} "), dim()),
        Span::styled(
            label.to_string(),
            Style::default().add_modifier(Modifier::ITALIC),
        ),
    ])
}

pub fn expandable_lines(label: &str, body: &str, expanded: bool) -> Vec<Line<'static>> {
    let mut lines = vec![disclosure(label, expanded)];
    if expanded {
        lines.extend(body.lines().map(|line| indent(line).style(dim())));
    }
    lines
}

pub fn json_lines(label: &str, value: &Value, expanded: bool) -> Vec<Line<'static>> {
    let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    expandable_lines(label, &body, expanded)
}

/// Lines for a live region as last rendered.
pub fn region_lines(content: &RegionContent) -> Vec<Line<'static>> {
    match content {
        RegionContent::Markdown(text) => markdown_lines(text),
        RegionContent::Expandable {
            label,
            body,
            expanded,
        } => expandable_lines(label, body, *expanded),
        RegionContent::Table { columns, rows } => table_lines(columns, rows),
        RegionContent::Chart { spec } => vec![Line::styled(
            chart_summary(spec),
            Style::default().fg(Color::Magenta),
        )],
        RegionContent::Json {
            label,
            value,
            expanded,
        } => json_lines(label, value, *expanded),
    }
}

fn table_block_lines(table: &TablePayload) -> Vec<Line<'static>> {
    match table.result_set.to_result_set() {
        Ok(result_set) => table_lines(&result_set.columns, &result_set.display_rows()),
        Err(_) => {
            let raw = Value::from(ContentBlock::Table {
                table: table.clone(),
            });
            json_lines("table", &raw, true)
        }
    }
}

fn chart_block_lines(chart: &ChartPayload) -> Vec<Line<'static>> {
    match chart.spec() {
        Ok(spec) => vec![Line::styled(
            chart_summary(&spec),
            Style::default().fg(Color::Magenta),
        )],
        Err(_) => vec![Line::styled(format!("[chart] {}", chart.chart_spec), dim())],
    }
}

pub fn block_lines(block: &ContentBlock) -> Vec<Line<'static>> {
    match block {
        ContentBlock::Text { text } => markdown_lines(text),
        ContentBlock::Table { table } => table_block_lines(table),
        ContentBlock::Chart { chart } => chart_block_lines(chart),
        ContentBlock::Other { raw } => json_lines(block.kind(), raw, true),
    }
}

pub fn speaker_line(is_user: bool) -> Line<'static> {
    if is_user {
        Line::styled(
            "You",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Line::styled(
            "Agent",
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
    }
}

/// Replay of one committed transcript message.
pub fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let mut lines = vec![speaker_line(message.is_user())];
    for block in &message.content {
        lines.extend(block_lines(block));
    }
    lines
}

#[cfg(test)]
pub(crate) fn plain(lines: &[Line<'_>]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
        .collect()
}
