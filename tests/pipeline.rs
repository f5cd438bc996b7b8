//! End-to-end flows: snapshot file → store → filter → metrics.

use std::path::PathBuf;

use vercoal::metrics::{self, MetricValue};
use vercoal::schema::{self, Dimension};
use vercoal::{filter, snapshot_source, DashboardError, FilterSpec, RecordStore};

/// Full sheet header: date, a couple of categories, every indicator.
fn header_line() -> String {
    let mut cols = vec!["fecha".to_string(), "comuna".to_string(), "ruta".to_string()];
    cols.extend(schema::all_indicator_fields().map(|(_, f)| f.name.to_string()));
    cols.join(",")
}

/// One CSV row answering every indicator with `answer`.
fn row_line(fecha: &str, comuna: &str, ruta: &str, answer: &str) -> String {
    let mut cells = vec![fecha.to_string(), comuna.to_string(), ruta.to_string()];
    cells.extend(schema::all_indicator_fields().map(|_| answer.to_string()));
    cells.join(",")
}

fn write_snapshot(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, contents).expect("writing snapshot fixture");
    path
}

#[test]
fn csv_snapshot_flows_into_filtered_metrics() {
    let csv = format!(
        "{}\n{}\n{}\n{}\n{}\n",
        header_line(),
        row_line("2025-02-03", "Norte", "Ruta 1", "SI"),
        row_line("2025-02-10", "Norte", "Ruta 1", "NO"),
        row_line("2025-03-05", "Sur", "Ruta 2", "SI"),
        row_line("fecha rota", "Sur", "Ruta 2", "SI"),
    );
    let path = write_snapshot("vercoal_pipeline_basic.csv", &csv);

    let store = RecordStore::new();
    let source = snapshot_source(&path).unwrap();
    let dataset = store.refresh(source.as_ref()).unwrap();

    assert_eq!(dataset.version, 1);
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.skipped_rows, 1);

    let spec = FilterSpec::default().with_category("comuna", ["Norte"]);
    let view = filter::apply(&dataset, &spec).unwrap();
    assert_eq!(view.len(), 2);
    assert_eq!(view.skipped_rows(), 1);

    let computed = metrics::compute(&view, Dimension::Compliance);
    assert_eq!(
        computed["entrega_en_dia_programado"].value,
        MetricValue::Rate(50.0)
    );
    assert_eq!(computed["respuestas"].value, MetricValue::Count(2));

    std::fs::remove_file(path).ok();
}

#[test]
fn json_snapshot_loads_like_csv() {
    let mut obj_yes = vec![
        r#""fecha":"2025-05-02""#.to_string(),
        r#""comuna":"Centro""#.to_string(),
    ];
    for (_, f) in schema::all_indicator_fields() {
        obj_yes.push(format!(r#""{}":"SI""#, f.name));
    }
    let json = format!("[{{{}}}]", obj_yes.join(","));
    let path = write_snapshot("vercoal_pipeline_json.json", &json);

    let store = RecordStore::new();
    let source = snapshot_source(&path).unwrap();
    let dataset = store.refresh(source.as_ref()).unwrap();
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.records[0].date(), Some("2025-05-02"));

    let view = filter::apply(&dataset, &FilterSpec::default()).unwrap();
    assert_eq!(
        metrics::dimension_index(&view, Dimension::Attitudes),
        MetricValue::Score(100.0)
    );

    std::fs::remove_file(path).ok();
}

#[test]
fn schema_drift_keeps_the_previous_snapshot_current() {
    let good = format!(
        "{}\n{}\n",
        header_line(),
        row_line("2025-02-03", "Norte", "Ruta 1", "SI"),
    );
    let good_path = write_snapshot("vercoal_pipeline_good.csv", &good);

    // A re-export with renamed indicator columns.
    let drifted = "fecha,comuna,indicador_uno,indicador_dos\n\
                   2025-02-03,Norte,SI,NO\n\
                   2025-02-04,Sur,SI,SI\n\
                   2025-02-05,Sur,NO,NO\n";
    let drifted_path = write_snapshot("vercoal_pipeline_drifted.csv", drifted);

    let store = RecordStore::new();
    store
        .refresh(snapshot_source(&good_path).unwrap().as_ref())
        .unwrap();

    let err = store
        .refresh(snapshot_source(&drifted_path).unwrap().as_ref())
        .unwrap_err();
    assert!(matches!(err, DashboardError::SchemaMismatch { .. }));

    let current = store.current().unwrap();
    assert_eq!(current.version, 1);
    assert_eq!(current.len(), 1);

    std::fs::remove_file(good_path).ok();
    std::fs::remove_file(drifted_path).ok();
}

#[test]
fn page_view_sequence_summary_findings_and_breakdown() {
    // Two comunas with contrasting compliance, attitudes solid everywhere.
    let mut lines = vec![header_line()];
    for i in 0..6 {
        let comuna = if i < 3 { "Norte" } else { "Centro" };
        let answer = if i < 3 { "SI" } else { "NO" };
        lines.push(row_line(&format!("2025-01-{:02}", i + 2), comuna, "Ruta 1", answer));
    }
    let path = write_snapshot("vercoal_pipeline_pages.csv", &lines.join("\n"));

    let store = RecordStore::new();
    let dataset = store
        .refresh(snapshot_source(&path).unwrap().as_ref())
        .unwrap();
    let view = filter::apply(&dataset, &FilterSpec::default()).unwrap();

    let summary = metrics::summary(&view);
    assert_eq!(
        summary["indice_cumplimiento"].value,
        MetricValue::Score(50.0)
    );
    assert!(summary["indice_general"].value.is_defined());

    let MetricValue::Breakdown(by_comuna) =
        metrics::breakdown(&view, "comuna", Dimension::Compliance)
    else {
        panic!("expected breakdown");
    };
    assert_eq!(by_comuna[0].0, "Norte");
    assert_eq!(by_comuna[0].1, 100.0);
    assert_eq!(by_comuna[1].0, "Centro");
    assert_eq!(by_comuna[1].1, 0.0);

    // Half the fleet failing puts compliance indicators under threshold.
    let findings = metrics::findings(&view, metrics::Thresholds::default());
    assert!(findings
        .iter()
        .any(|f| f.field == "entrega_en_dia_programado"));

    std::fs::remove_file(path).ok();
}
