// =============================================================================
// Plain-text rendering of a dashboard snapshot
// =============================================================================

use crate::dashboard::{ChartPoint, DashboardSnapshot, OverviewEntry, TechnicalSection};
use crate::sentiment::HeadlineSentiment;

/// Rows in the ASCII close-price chart.
const CHART_HEIGHT: usize = 10;

/// Render the whole page as text, section by section.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut lines = vec![
        "NASDAQ Market Analyzer".to_string(),
        format!("Generated {}", snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        String::new(),
        "== Market Overview ==".to_string(),
    ];
    lines.extend(snapshot.overview.iter().map(overview_line));

    lines.push(String::new());
    lines.push("== News Sentiment Analysis ==".to_string());
    for row in &snapshot.sentiment {
        lines.extend(sentiment_block(row));
    }

    lines.push(String::new());
    lines.extend(technical_block(&snapshot.technical));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn overview_line(entry: &OverviewEntry) -> String {
    match (&entry.quote, entry.absent_reason) {
        (Some(q), _) => format!(
            "{:<18} ${:.2}  {:+.2}%",
            entry.display_name, q.price, q.change_percent
        ),
        (None, Some(reason)) => format!("{:<18} no data ({reason})", entry.display_name),
        (None, None) => format!("{:<18} no data", entry.display_name),
    }
}

fn sentiment_block(row: &HeadlineSentiment) -> Vec<String> {
    vec![
        row.headline.clone(),
        format!("Sentiment: {} (Score: {:.2})", row.sentiment, row.score),
        "---".to_string(),
    ]
}

fn technical_block(section: &TechnicalSection) -> Vec<String> {
    match section {
        TechnicalSection::Unavailable { symbol, warning, .. } => vec![
            format!("== Technical Chart - {symbol} =="),
            format!("WARNING: {warning}"),
        ],
        TechnicalSection::Available {
            symbol,
            chart,
            rsi,
            rsi_zone,
            ..
        } => {
            let mut lines = vec![format!(
                "== Technical Chart - {symbol} ({} Day Performance) ==",
                chart.len()
            )];
            lines.extend(ascii_chart(chart, CHART_HEIGHT));
            lines.push(String::new());
            lines.push("-- RSI Indicator --".to_string());
            lines.push(match (rsi, rsi_zone) {
                (Some(v), Some(zone)) => format!("Current RSI: {v:.2} ({zone})"),
                (Some(v), None) => format!("Current RSI: {v:.2}"),
                _ => "Current RSI: n/a".to_string(),
            });
            lines
        }
    }
}

/// Plot closes as a `height`-row chart, one column per point.
///
/// Each column gets a single `*` on the row closest to its close price; the
/// top and bottom rows carry the max / min price as labels.
pub fn ascii_chart(points: &[ChartPoint], height: usize) -> Vec<String> {
    if points.is_empty() || height == 0 {
        return Vec::new();
    }

    let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.close), hi.max(p.close))
    });
    let span = max - min;

    let level = |close: f64| -> usize {
        if span <= 0.0 || height == 1 {
            return height / 2;
        }
        (((close - min) / span) * (height - 1) as f64).round() as usize
    };
    let levels: Vec<usize> = points.iter().map(|p| level(p.close)).collect();

    let mut lines = Vec::with_capacity(height + 2);
    for row in (0..height).rev() {
        let label = if row == height - 1 {
            format!("{max:>10.2}")
        } else if row == 0 {
            format!("{min:>10.2}")
        } else {
            " ".repeat(10)
        };
        let cells: String = levels
            .iter()
            .map(|&l| if l == row { '*' } else { ' ' })
            .collect();
        lines.push(format!("{label} |{}", cells.trim_end()));
    }

    lines.push(format!("{} +{}", " ".repeat(10), "-".repeat(points.len())));
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        lines.push(format!("{} {} .. {}", " ".repeat(10), first.date, last.date));
    }
    lines
}
