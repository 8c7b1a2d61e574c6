use crate::board::SceneSnapshot;
use crate::charts::{ChartSpec, HourlySeries};
use crate::constants::PLACEHOLDER;
use crate::dashboard::DashboardView;
use crate::metrics::DisplayFields;
use crate::scene::EffectKind;

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v:.1}"))
}

/// Formats the current-conditions panel
pub fn format_conditions(fields: &DisplayFields) -> String {
    let mut output = format!(
        "{}\n{}\n{}\n\n",
        fields.place, fields.local_time, fields.updated
    );
    output.push_str(&format!(
        "  Temperature: {} ({})\n  {}\n  {}\n  Wind: {}\n  Visibility: {}\n  Pressure: {}\n  UV: {}\n  {}\n\n",
        fields.temperature,
        fields.condition,
        fields.feels_like,
        fields.humidity,
        fields.wind,
        fields.visibility,
        fields.pressure,
        fields.uv,
        fields.last_updated
    ));

    let aqi = &fields.air_quality;
    output.push_str(&format!("Air Quality ({}):\n", aqi.summary));
    for pill in &aqi.pills {
        output.push_str(&format!("  [{}] {}\n", pill.color, pill.text));
    }
    if !aqi.legend.is_empty() {
        let keys: Vec<String> = aqi
            .legend
            .iter()
            .map(|swatch| format!("[{}] {}", swatch.color, swatch.text))
            .collect();
        output.push_str(&format!("  Legend: {}\n", keys.join("  ")));
    }
    output
}

/// Formats hourly series as a table, one row per hour
pub fn format_hourly(series: &HourlySeries) -> String {
    let mut output = format!("Hourly ({}):\n", series.title);
    if series.labels.is_empty() {
        output.push_str("  No hourly data.\n");
        return output;
    }

    output.push_str(&format!("  {:<6} {:>8}", "Time", format!("°{}", series.unit.symbol())));
    for pollutant in &series.pollutants {
        output.push_str(&format!(" {:>7}", pollutant.pollutant.label()));
    }
    output.push('\n');

    for (i, label) in series.labels.iter().enumerate() {
        let temperature = series.temperature.get(i).copied().flatten();
        output.push_str(&format!("  {:<6} {:>8}", label, cell(temperature)));
        for pollutant in &series.pollutants {
            let value = pollutant.values.get(i).copied().flatten();
            output.push_str(&format!(" {:>7}", cell(value)));
        }
        output.push('\n');
    }
    output
}

/// Summarizes a drawn chart: axis, point count and range per dataset
pub fn format_chart(chart: &ChartSpec) -> String {
    let mut output = format!(
        "{:?} chart: {} ({}, {} points)\n",
        chart.kind,
        chart.title,
        chart.y_axis,
        chart.labels.len()
    );
    if chart.datasets.is_empty() {
        output.push_str("  No datasets.\n");
    }
    for dataset in &chart.datasets {
        let values: Vec<f64> = dataset.values.iter().flatten().copied().collect();
        let min = values.iter().copied().reduce(f64::min);
        let max = values.iter().copied().reduce(f64::max);
        output.push_str(&format!(
            "  {} [{}]: min {}, max {}\n",
            dataset.label,
            dataset.color,
            cell(min),
            cell(max)
        ));
    }
    output
}

/// Formats the whole dashboard into a human-readable string
pub fn format_dashboard(view: &DashboardView) -> String {
    let mut output = String::from("Weather Dashboard\n");
    if !view.status.is_empty() {
        output.push_str(&format!("Status: {}\n", view.status));
    }
    output.push_str(&format!(
        "Search: {}\nUnits: °{}\n\n",
        if view.input.is_empty() { PLACEHOLDER } else { view.input.as_str() },
        view.unit.symbol()
    ));

    let Some(fields) = &view.fields else {
        output.push_str("No forecast loaded yet.\n");
        return output;
    };

    output.push_str(&format_conditions(fields));
    if let Some(scene) = view.scene {
        output.push_str(&format!("Scene: {}\n", scene.name()));
    }

    output.push_str("\nForecast:\n");
    for (i, card) in view.cards.iter().enumerate() {
        let marker = if i == view.highlighted_day { '>' } else { ' ' };
        output.push_str(&format!(
            "{marker} [{i}] {}: {}, {}, {}\n",
            card.label, card.temperature, card.condition, card.precipitation
        ));
    }

    if let Some(series) = &view.series {
        output.push('\n');
        output.push_str(&format_hourly(series));
    }
    output
}

/// Formats the live scene
pub fn format_scene(snapshot: &SceneSnapshot, effects: &[EffectKind]) -> String {
    let Some(backdrop) = snapshot.backdrop else {
        return "Scene: none\n".to_string();
    };

    let mut output = format!(
        "Scene: {}\n  Art: {}\n  Effects: {}\n",
        backdrop.name(),
        snapshot.art.as_deref().unwrap_or(PLACEHOLDER),
        if effects.is_empty() {
            "none".to_string()
        } else {
            effects
                .iter()
                .map(|e| format!("{e:?}").to_lowercase())
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
    for (name, count) in &snapshot.elements {
        output.push_str(&format!("  {name}: {count}\n"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{build_day_cards, build_hourly_series};
    use crate::classifier::SceneCategory;
    use crate::metrics::project;
    use crate::models::Unit;
    use crate::testing::sample_document;

    fn view(unit: Unit) -> DashboardView {
        let document = sample_document("London", "Patchy rain nearby", 1);
        DashboardView {
            status: String::new(),
            input: "London".to_string(),
            unit,
            fields: Some(project(&document, unit, None)),
            cards: build_day_cards(&document.forecast_days, unit),
            highlighted_day: 1,
            series: Some(build_hourly_series(&document, None, unit)),
            scene: Some(SceneCategory::Rain),
        }
    }

    #[test]
    fn test_format_dashboard() {
        let output = format_dashboard(&view(Unit::Celsius));
        assert!(output.contains("London, Somewhere"));
        assert!(output.contains("Temperature: 17°C (Patchy rain nearby)"));
        assert!(output.contains("[#ff9b6b] PM2.5: 40.3 µg/m³"));
        assert!(output.contains("Local Time: 2025-08-17 9:05\nUpdated: --\n"));
        assert!(output.contains("  Legend: [#7ee67a] Good  [#ffdf7a] Moderate  [#ffb37a] Unhealthy\n"));
        assert!(output.contains("  [0] Today: 17°C"));
        assert!(output.contains("> [1] Mon: 17°C"));
        assert!(output.contains("Hourly (Next 24 hours):"));
        assert!(output.contains("Scene: rain"));
        assert!(!output.contains("Status:"));
    }

    #[test]
    fn test_format_empty_dashboard() {
        let empty = DashboardView {
            status: "Enter a location".to_string(),
            input: String::new(),
            unit: Unit::Celsius,
            fields: None,
            cards: Vec::new(),
            highlighted_day: 0,
            series: None,
            scene: None,
        };
        let output = format_dashboard(&empty);
        assert!(output.contains("Status: Enter a location"));
        assert!(output.contains("Search: --"));
        assert!(output.contains("No forecast loaded yet."));
    }

    #[test]
    fn test_format_hourly_shows_gaps() {
        let document = sample_document("London", "Sunny", 1);
        let series = build_hourly_series(&document, Some(0), Unit::Fahrenheit);
        let output = format_hourly(&series);
        let header = output.lines().nth(1).expect("header row");
        assert!(header.contains("°F"));
        assert!(header.contains("PM2.5"));
        assert!(!header.contains("PM10"));
        assert_eq!(output.lines().count(), 2 + 24);
    }

    #[test]
    fn test_format_chart() {
        let document = sample_document("London", "Sunny", 1);
        let series = build_hourly_series(&document, Some(0), Unit::Celsius);

        let output = format_chart(&series.temperature_chart());
        assert!(output.starts_with("Temperature chart: Sun, Aug 17 (°C, 24 points)\n"));
        assert!(output.contains("Temp [rgba(110,193,228,0.95)]: min 12.0, max 23.5"));

        let mut pollutants = series.pollutant_chart();
        assert!(format_chart(&pollutants).contains("PM2.5 [#ff7a7a]: min 5.0, max 28.0"));
        pollutants.datasets.clear();
        assert!(format_chart(&pollutants).contains("No datasets."));
    }

    #[test]
    fn test_format_scene() {
        let snapshot = SceneSnapshot {
            backdrop: Some(SceneCategory::Thunder),
            art: Some("☂".to_string()),
            elements: vec![("bolt", 1), ("raindrop", 32)],
        };
        let output = format_scene(&snapshot, &[EffectKind::Rain, EffectKind::Lightning]);
        assert!(output.starts_with("Scene: thunder\n"));
        assert!(output.contains("Effects: rain, lightning"));
        assert!(output.contains("raindrop: 32"));

        let idle = SceneSnapshot {
            backdrop: None,
            art: None,
            elements: Vec::new(),
        };
        assert_eq!(format_scene(&idle, &[]), "Scene: none\n");
    }
}
