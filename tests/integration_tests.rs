use async_trait::async_trait;
use chrono::NaiveDate;
use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

use resumo_meteo::config::AppConfig;
use resumo_meteo::error::{ReportError, Result};
use resumo_meteo::models::{Color, DrawInstruction, MetricId, StationInfo, Territory};
use resumo_meteo::processors::{build_daily_report, TieBreak};
use resumo_meteo::readers::{CachedDirectory, StaticSource, StationDirectory};
use resumo_meteo::utils::filename::{report_csv_filename, report_image_filename};
use resumo_meteo::writers::{publish_outputs, CsvWriter, RenderJob, ReportPublisher, TemplateRenderer};

/// Directory backed by a fixed table, as the live service would answer
struct TableDirectory {
    stations: HashMap<&'static str, (&'static str, &'static str)>,
}

impl TableDirectory {
    fn new() -> Self {
        let stations = HashMap::from([
            ("1", ("Beja", "Continente")),
            ("2", ("Bragança", "Continente")),
            ("3", ("Évora", "Continente")),
            ("4", ("Faro", "Continente")),
            ("5", ("Santarém", "Continente")),
            ("11", ("Funchal, Observatório", "Madeira")),
            ("12", ("Porto Santo", "Madeira")),
            ("21", ("Ponta Delgada", "Açores")),
        ]);
        Self { stations }
    }
}

#[async_trait]
impl StationDirectory for TableDirectory {
    async fn lookup(&self, station_id: &str) -> Result<StationInfo> {
        let (name, region) = self
            .stations
            .get(station_id)
            .ok_or_else(|| ReportError::lookup(station_id, "unknown station"))?;
        Ok(StationInfo::new(
            station_id,
            *name,
            Some(region.to_string()),
        ))
    }
}

const SOURCE_PAGE: &str = r#"<!DOCTYPE html>
<html><head><script type="text/javascript">
var observations = {
 "2022-03-09T00:00": {
  "1": {"temp_max": 30.0, "temp_min": 10.0, "vento_int_max_inst": 45.0, "prec_quant": 0.2, "hum_min": 30.0, "hum_max": 80.0},
  "2": {"temp_max": -99.0, "temp_min": 5.0, "vento_int_max_inst": 61.2, "prec_quant": 0.0},
  "3": {"temp_max": 35.0, "temp_min": 20.0, "vento_int_max_inst": -99.0, "prec_quant": 3.1},
  "4": {"temp_max": 28.0, "temp_min": 12.5, "vento_int_max_inst": 30.0, "prec_quant": null},
  "5": {"temp_max": 33.0, "temp_min": 14.0, "vento_int_max_inst": 52.0, "prec_quant": 1.4},
  "11": {"temp_max": 21.0, "temp_min": 14.0, "vento_int_max_inst": 80.4, "prec_quant": 12.4},
  "12": {"temp_max": 19.5, "temp_min": 15.5, "vento_int_max_inst": 66.0, "prec_quant": 2.0},
  "21": {"temp_max": 17.0, "temp_min": 12.0, "vento_int_max_inst": 95.0, "prec_quant": 25.0},
  "99": null
 },
 "2022-03-10T00:00": {
  "1": {"temp_max": 45.0, "temp_min": -5.0, "vento_int_max_inst": 150.0, "prec_quant": 90.0}
 }
};
</script></head><body></body></html>"#;

fn report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 3, 9).unwrap()
}

fn ids(board: &resumo_meteo::models::Leaderboard) -> Vec<&str> {
    board.entries.iter().map(|e| e.station_id.as_str()).collect()
}

#[tokio::test]
async fn test_daily_report_from_source_page() {
    let source = StaticSource::new(SOURCE_PAGE);
    let directory = CachedDirectory::new(TableDirectory::new());
    let config = AppConfig::default();

    let daily = build_daily_report(&source, &directory, &config, report_date(), &Territory::ALL)
        .await
        .unwrap();

    let mainland = daily.report(Territory::Mainland).unwrap();

    // Sentinel row 2 excluded, top four by maximum temperature
    let max = mainland.leaderboard(MetricId::TempMax).unwrap();
    assert_eq!(ids(max), vec!["3", "5", "1", "4"]);
    assert_eq!(max.entries[0].station_display_name, "Évora");

    let min = mainland.leaderboard(MetricId::TempMin).unwrap();
    assert_eq!(ids(min), vec!["2", "1", "4", "5"]);

    let wind = mainland.leaderboard(MetricId::WindGustMax).unwrap();
    assert_eq!(ids(wind), vec!["2", "5", "1", "4"]);

    // Rain is ranked on its own metric; the null reading is treated as missing
    let rain = mainland.leaderboard(MetricId::RainAccum).unwrap();
    assert_eq!(ids(rain), vec!["3", "5", "1", "2"]);

    let amplitude = mainland.amplitude.as_ref().unwrap();
    assert_eq!(amplitude.record.station_id, "1");
    assert_eq!(amplitude.record.amplitude, 20.0);
    assert_eq!(amplitude.station_display_name, "Beja");

    // Only the three archipelago rows of the active day reach the islands
    let madeira = daily.report(Territory::Madeira).unwrap();
    assert_eq!(ids(madeira.leaderboard(MetricId::TempMax).unwrap()), vec!["11", "12"]);
    let azores = daily.report(Territory::Azores).unwrap();
    assert_eq!(ids(azores.leaderboard(MetricId::RainAccum).unwrap()), vec!["21"]);

    assert_eq!(daily.summary.total_rows, 8);
    assert_eq!(
        daily.summary.territories[&Territory::Mainland].sentinel_count(MetricId::RainAccum),
        1
    );
    assert_eq!(directory.cached_len(), 8);
}

#[tokio::test]
async fn test_territory_isolation() {
    let source = StaticSource::new(SOURCE_PAGE);
    let directory = TableDirectory::new();
    let config = AppConfig::default();

    let daily = build_daily_report(&source, &directory, &config, report_date(), &Territory::ALL)
        .await
        .unwrap();

    for report in &daily.reports {
        for board in &report.leaderboards {
            for entry in &board.entries {
                let info = directory.lookup(&entry.station_id).await.unwrap();
                assert_eq!(info.territory(), Some(report.territory));
            }
        }
    }
}

#[tokio::test]
async fn test_reports_and_bindings_are_idempotent() {
    let config = AppConfig::default();
    let binders = config.binders().unwrap();

    let mut runs = Vec::new();
    for _ in 0..2 {
        let daily = build_daily_report(
            &StaticSource::new(SOURCE_PAGE),
            &TableDirectory::new(),
            &config,
            report_date(),
            &Territory::ALL,
        )
        .await
        .unwrap();

        let instructions: Vec<Vec<DrawInstruction>> = daily
            .reports
            .iter()
            .zip(&binders)
            .map(|(report, (_, binder))| binder.bind_report(report).unwrap())
            .collect();
        runs.push((daily.reports, instructions));
    }

    assert_eq!(runs[0], runs[1]);
}

#[tokio::test]
async fn test_bound_instructions_for_mainland() {
    let config = AppConfig::default();
    let daily = build_daily_report(
        &StaticSource::new(SOURCE_PAGE),
        &TableDirectory::new(),
        &config,
        report_date(),
        &[Territory::Mainland],
    )
    .await
    .unwrap();

    let binders = config.binders().unwrap();
    let (_, binder) = &binders[0];
    let instructions = binder.bind_report(&daily.reports[0]).unwrap();

    // Four boards of four rows (name + value) plus the amplitude panel
    assert_eq!(instructions.len(), 4 * 4 * 2 + 4);
    assert_eq!(
        instructions[0],
        DrawInstruction::new(40, 300, "Évora", Color::BLACK)
    );
    assert_eq!(
        instructions[1],
        DrawInstruction::new(450, 300, "35.0", Color::BLACK)
    );
    assert_eq!(
        instructions[7],
        DrawInstruction::new(450, 372, "28.0", Color::BLACK)
    );
    assert_eq!(
        instructions.last().unwrap(),
        &DrawInstruction::new(950, 820, "20.0", Color::BLACK)
    );
}

#[tokio::test]
async fn test_snapshot_order_tie_break() {
    let snapshot = r#"{"2022-03-09": {
        "5": {"temp_max": 30.0, "territory": "Continente"},
        "3": {"temp_max": 30.0, "territory": "Continente"},
        "4": {"temp_max": 31.0, "territory": "Continente"}
    }}"#;

    let mut config = AppConfig::default();
    let by_id = build_daily_report(
        &StaticSource::new(snapshot),
        &TableDirectory::new(),
        &config,
        report_date(),
        &[Territory::Mainland],
    )
    .await
    .unwrap();
    assert_eq!(
        ids(by_id.reports[0].leaderboard(MetricId::TempMax).unwrap()),
        vec!["4", "3", "5"]
    );

    config.ranking.tie_break = TieBreak::SnapshotOrder;
    let by_order = build_daily_report(
        &StaticSource::new(snapshot),
        &TableDirectory::new(),
        &config,
        report_date(),
        &[Territory::Mainland],
    )
    .await
    .unwrap();
    assert_eq!(
        ids(by_order.reports[0].leaderboard(MetricId::TempMax).unwrap()),
        vec!["4", "5", "3"]
    );
}

#[tokio::test]
async fn test_csv_export_published() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let daily = build_daily_report(
        &StaticSource::new(SOURCE_PAGE),
        &TableDirectory::new(),
        &AppConfig::default(),
        report_date(),
        &[Territory::Madeira],
    )
    .await
    .unwrap();

    let bytes = CsvWriter::new().to_bytes(&daily.reports).unwrap();
    let csv_path = report_csv_filename(temp_dir.path(), report_date());
    let image_path = report_image_filename(temp_dir.path(), Territory::Madeira, report_date());
    let image = RgbaImage::from_pixel(64, 32, Rgba([255, 255, 255, 255]));

    let published = publish_outputs(
        temp_dir.path(),
        vec![(image_path.clone(), image)],
        Some((csv_path.clone(), bytes)),
    )
    .unwrap();
    assert_eq!(published, vec![image_path.clone(), csv_path.clone()]);

    let text = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "date,territory,board,rank,station_id,station_name,value");
    assert_eq!(
        lines[1],
        "2022-03-09,madeira,temp_max,1,11,\"Funchal, Observatório\",21.0"
    );
    assert!(lines.contains(&"2022-03-09,madeira,amplitude,1,11,\"Funchal, Observatório\",7.0"));
    assert!(image_path.ends_with("resumo-meteo-madeira-20220309.png"));
}

#[tokio::test]
async fn test_render_published_images() {
    let font = [
        "assets/Lato-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.exists());
    let Some(font) = font else {
        // Skip test if no font is available
        return;
    };

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let template = temp_dir.path().join("template.png");
    RgbaImage::from_pixel(1080, 1080, Rgba([255, 255, 255, 255]))
        .save(&template)
        .unwrap();

    let config = AppConfig::default();
    let daily = build_daily_report(
        &StaticSource::new(SOURCE_PAGE),
        &TableDirectory::new(),
        &config,
        report_date(),
        &Territory::ALL,
    )
    .await
    .unwrap();

    let out = temp_dir.path().join("out");
    let jobs: Vec<RenderJob> = daily
        .reports
        .iter()
        .zip(config.binders().unwrap())
        .map(|(report, (territory, binder))| RenderJob {
            territory,
            template: template.clone(),
            instructions: binder.bind_report(report).unwrap(),
            output: report_image_filename(&out, territory, report_date()),
        })
        .collect();

    let renderer = TemplateRenderer::from_font_file(&font, 22.0).unwrap();
    let published = ReportPublisher::new(&renderer)
        .with_max_workers(2)
        .publish(&out, &jobs, None)
        .unwrap();

    assert_eq!(published.len(), 3);
    for path in &published {
        let rendered = image::open(path).unwrap().to_rgba8();
        assert_eq!(rendered.dimensions(), (1080, 1080));
        assert!(rendered.pixels().any(|p| p[0] < 128));
    }
}

#[test]
fn test_config_file_overrides() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r##"
[ranking]
tie_break = "snapshot_order"

[plan]
amplitude = false
boards = [
    {{ metric = "temp_max", direction = "max", limit = 3 }},
    {{ metric = "humidity_min", direction = "min" }},
]

[layout]
metrics = [
    {{ metric = "temp_max", start_y = 10, station_column_x = 1, value_column_x = 2, color_palette = ["#111111", "#222222", "#333333"] }},
    {{ metric = "humidity_min", start_y = 20, station_column_x = 1, value_column_x = 2, unit_column_x = 3, color_palette = ["#000000", "#000000", "#000000", "#000000"] }},
]
"##
    )
    .unwrap();

    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.ranking.tie_break, TieBreak::SnapshotOrder);
    assert!(!config.plan.amplitude);
    assert_eq!(config.plan.boards[1].limit, 4);
    assert!(config.layout.amplitude.is_none());
    assert_eq!(config.binders().unwrap().len(), 3);
}
