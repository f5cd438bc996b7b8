use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::Record;
use crate::filter::FilteredView;
use crate::schema::{
    self, Dimension, FieldDef, FieldKind, Polarity, ACCESSIBILITY_FIELDS,
    ACCESSIBILITY_NEGATIVE_SHARE, ACCESSIBILITY_POSITIVE_SHARE, GENERAL_WEIGHTS,
};

// ---------------------------------------------------------------------------
// Metric – a named, reproducible aggregate
// ---------------------------------------------------------------------------

/// The value of one computed indicator.
///
/// `Undefined` means no applicable records existed — distinct from a
/// computed zero, so presentation can render "sin datos" instead of a
/// misleading 0%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MetricValue {
    /// Share of affirmative answers, 0–100.
    Rate(f64),
    /// Composite index, 0–100.
    Score(f64),
    Count(u64),
    /// Ordered (category, value) pairs for breakdown charts.
    Breakdown(Vec<(String, f64)>),
    Undefined,
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Rate(v) | MetricValue::Score(v) => Some(*v),
            MetricValue::Count(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self, MetricValue::Undefined)
    }
}

/// A named metric computed over one (dataset, filter) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    /// Human-readable label for tables and chart titles.
    pub label: String,
    pub value: MetricValue,
}

/// Round to one decimal place. Presentation only — aggregation always runs
/// on unrounded values so composite metrics don't compound rounding error.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Core aggregation
// ---------------------------------------------------------------------------

/// A record's normalized score for one indicator, in 0..=1.
/// `None` when the question is unanswered, so missing answers fall out of
/// the denominator per question, never per record.
fn answer_score(record: &Record, field: &FieldDef) -> Option<f64> {
    match field.kind {
        FieldKind::Flag => record
            .answer(field.name)
            .map(|yes| if yes { 1.0 } else { 0.0 }),
        FieldKind::Likert { max } => {
            let v = record.value(field.name).as_f64()?;
            Some((v - 1.0) / f64::from(max - 1))
        }
    }
}

/// Raw rate for one indicator: mean answer score × 100 over applicable
/// records. `None` when no record in view answers the question.
fn field_rate(view: &FilteredView, field: &FieldDef) -> Option<f64> {
    let mut sum = 0.0;
    let mut applicable = 0usize;
    for record in view.records() {
        if let Some(score) = answer_score(record, field) {
            sum += score;
            applicable += 1;
        }
    }
    if applicable == 0 {
        None
    } else {
        Some(sum / applicable as f64 * 100.0)
    }
}

/// Polarity-adjusted rate: negative indicators are inverted so every
/// reported value reads "higher is better".
fn effective_rate(view: &FilteredView, field: &FieldDef) -> Option<f64> {
    field_rate(view, field).map(|rate| match field.polarity {
        Polarity::Positive => rate,
        Polarity::Negative => 100.0 - rate,
    })
}

/// Weighted mean of effective rates over a field group. Weights are
/// renormalized over the fields that have data; a group with no data at
/// all yields `None`.
fn group_index(view: &FilteredView, fields: &[FieldDef]) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for field in fields {
        if let Some(rate) = effective_rate(view, field) {
            weighted_sum += rate * field.weight;
            weight_total += field.weight;
        }
    }
    if weight_total == 0.0 {
        None
    } else {
        Some(weighted_sum / weight_total)
    }
}

fn accessibility_index(view: &FilteredView) -> Option<f64> {
    let positive: Vec<FieldDef> = ACCESSIBILITY_FIELDS
        .iter()
        .filter(|f| f.polarity == Polarity::Positive)
        .copied()
        .collect();
    let negative: Vec<FieldDef> = ACCESSIBILITY_FIELDS
        .iter()
        .filter(|f| f.polarity == Polarity::Negative)
        .copied()
        .collect();

    match (
        group_index(view, &positive),
        group_index(view, &negative),
    ) {
        (Some(pos), Some(neg)) => {
            Some(pos * ACCESSIBILITY_POSITIVE_SHARE + neg * ACCESSIBILITY_NEGATIVE_SHARE)
        }
        (Some(pos), None) => Some(pos),
        (None, Some(neg)) => Some(neg),
        (None, None) => None,
    }
}

fn dimension_score(view: &FilteredView, dimension: Dimension) -> Option<f64> {
    match dimension {
        Dimension::Accessibility => accessibility_index(view),
        _ => group_index(view, schema::fields_for(dimension)),
    }
}

/// Label under which an indicator is reported: negative indicators are
/// presented as the inverted "absence of the problem" rate.
fn display_label(field: &FieldDef) -> String {
    match field.polarity {
        Polarity::Positive => field.label.to_string(),
        Polarity::Negative => format!("Ausencia de {}", field.label),
    }
}

// ---------------------------------------------------------------------------
// Public engine surface
// ---------------------------------------------------------------------------

/// Composite index of one dimension over a view.
pub fn dimension_index(view: &FilteredView, dimension: Dimension) -> MetricValue {
    dimension_score(view, dimension)
        .map(MetricValue::Score)
        .unwrap_or(MetricValue::Undefined)
}

/// Compute all named metrics of one dimension: one polarity-adjusted
/// `Rate` per indicator, the composite `Score`, and the response `Count`.
///
/// Pure over (view, dimension): identical inputs yield identical output.
pub fn compute(view: &FilteredView, dimension: Dimension) -> BTreeMap<String, Metric> {
    let mut metrics = BTreeMap::new();
    for field in schema::fields_for(dimension) {
        let value = effective_rate(view, field)
            .map(MetricValue::Rate)
            .unwrap_or(MetricValue::Undefined);
        metrics.insert(
            field.name.to_string(),
            Metric {
                name: field.name.to_string(),
                label: display_label(field),
                value,
            },
        );
    }
    metrics.insert(
        format!("indice_{}", dimension.key()),
        Metric {
            name: format!("indice_{}", dimension.key()),
            label: format!("Índice de {}", dimension.label()),
            value: dimension_index(view, dimension),
        },
    );
    metrics.insert(
        "respuestas".to_string(),
        Metric {
            name: "respuestas".to_string(),
            label: "Respuestas".to_string(),
            value: MetricValue::Count(view.len() as u64),
        },
    );
    metrics
}

/// The general service index: weighted mean of the four dimension indexes
/// per [`GENERAL_WEIGHTS`], skipping dimensions with no data. `Undefined`
/// only when all four are.
pub fn general_index(view: &FilteredView) -> MetricValue {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (dimension, weight) in GENERAL_WEIGHTS {
        if let Some(score) = dimension_score(view, dimension) {
            weighted_sum += score * weight;
            weight_total += weight;
        }
    }
    if weight_total == 0.0 {
        MetricValue::Undefined
    } else {
        MetricValue::Score(weighted_sum / weight_total)
    }
}

/// Home-page summary: the four dimension indexes, the general index, and
/// the response count.
pub fn summary(view: &FilteredView) -> BTreeMap<String, Metric> {
    let mut metrics = BTreeMap::new();
    for dimension in Dimension::ALL {
        metrics.insert(
            format!("indice_{}", dimension.key()),
            Metric {
                name: format!("indice_{}", dimension.key()),
                label: format!("Índice de {}", dimension.label()),
                value: dimension_index(view, dimension),
            },
        );
    }
    metrics.insert(
        "indice_general".to_string(),
        Metric {
            name: "indice_general".to_string(),
            label: "Índice General".to_string(),
            value: general_index(view),
        },
    );
    metrics.insert(
        "respuestas".to_string(),
        Metric {
            name: "respuestas".to_string(),
            label: "Respuestas".to_string(),
            value: MetricValue::Count(view.len() as u64),
        },
    );
    metrics
}

/// Per-category composite scores of one dimension, for breakdown charts.
///
/// Sorted by descending score, ties by ascending category name, so chart
/// ordering is deterministic. Categories with no applicable records are
/// omitted; an unknown category column yields an empty breakdown.
pub fn breakdown(
    view: &FilteredView,
    category_column: &str,
    dimension: Dimension,
) -> MetricValue {
    let mut entries: Vec<(String, f64)> = Vec::new();
    if let Some(values) = view.dataset().category_values.get(category_column) {
        for value in values {
            let subset = view.narrow(|r| r.value(category_column) == value);
            if let Some(score) = dimension_score(&subset, dimension) {
                entries.push((value.to_string(), score));
            }
        }
    }
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    MetricValue::Breakdown(entries)
}

// ---------------------------------------------------------------------------
// Findings – indicator health scan
// ---------------------------------------------------------------------------

/// Alert bands an indicator is judged against, as effective rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    /// Below this the indicator is worth watching.
    pub warning: f64,
    /// Below this the indicator needs action.
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            warning: 80.0,
            critical: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Critical,
    Warning,
}

/// One indicator performing below its threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub dimension: Dimension,
    pub field: String,
    pub label: String,
    /// Effective (polarity-adjusted) rate, 0–100.
    pub value: f64,
    pub severity: Severity,
}

/// Scan every indicator across the four dimensions and report those under
/// threshold, worst first. Indicators with no applicable records are not
/// findings.
pub fn findings(view: &FilteredView, thresholds: Thresholds) -> Vec<Finding> {
    let mut out = Vec::new();
    for (dimension, field) in schema::all_indicator_fields() {
        let Some(value) = effective_rate(view, field) else {
            continue;
        };
        let severity = if value < thresholds.critical {
            Severity::Critical
        } else if value < thresholds.warning {
            Severity::Warning
        } else {
            continue;
        };
        out.push(Finding {
            dimension,
            field: field.name.to_string(),
            label: display_label(field),
            value,
            severity,
        });
    }
    out.sort_by(|a, b| a.value.total_cmp(&b.value).then_with(|| a.field.cmp(&b.field)));
    out
}

// ---------------------------------------------------------------------------
// Trend – month-over-month movement of one indicator
// ---------------------------------------------------------------------------

/// Relative change within ±this band counts as stable.
pub const TREND_STABLE_BAND_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

/// Movement of one indicator over its trailing months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Relative change between the first and last month, in percent.
    pub change_pct: f64,
    /// Effective rate of the most recent month, 0–100.
    pub last_value: f64,
}

/// Month-over-month trend of one indicator, using the trailing `months`
/// calendar months with data. Months group by the `YYYY-MM` prefix of the
/// observation date; the rate is polarity-adjusted, so `Improving` always
/// means better. `None` when no dated record answers the question.
pub fn trend(view: &FilteredView, field_name: &str, months: usize) -> Option<Trend> {
    let (_, field) = schema::indicator(field_name)?;

    let mut by_month: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in view.records() {
        let Some(month) = record.date().and_then(|d| d.get(..7)) else {
            continue;
        };
        let Some(score) = answer_score(record, field) else {
            continue;
        };
        let entry = by_month.entry(month.to_string()).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }
    if by_month.is_empty() {
        return None;
    }

    let monthly: Vec<f64> = by_month
        .values()
        .map(|(sum, n)| {
            let rate = sum / *n as f64 * 100.0;
            match field.polarity {
                Polarity::Positive => rate,
                Polarity::Negative => 100.0 - rate,
            }
        })
        .collect();

    let window = &monthly[monthly.len().saturating_sub(months.max(1))..];
    let first = window[0];
    let last = window[window.len() - 1];
    let change_pct = if first > 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };
    let direction = if window.len() < 2 || change_pct.abs() < TREND_STABLE_BAND_PCT {
        TrendDirection::Stable
    } else if change_pct > 0.0 {
        TrendDirection::Improving
    } else {
        TrendDirection::Declining
    };
    Some(Trend {
        direction,
        change_pct,
        last_value: last,
    })
}

// ---------------------------------------------------------------------------
// Rankings – best and worst categories by composite score
// ---------------------------------------------------------------------------

/// Best and worst category values of one breakdown group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    /// Top categories, best first.
    pub best: Vec<(String, f64)>,
    /// Bottom categories, worst first.
    pub worst: Vec<(String, f64)>,
}

/// Rank the values of a category column by a dimension's composite score.
/// `None` when the breakdown is empty (unknown column or no data).
pub fn rank_categories(
    view: &FilteredView,
    category_column: &str,
    dimension: Dimension,
    top_n: usize,
) -> Option<Ranking> {
    let MetricValue::Breakdown(entries) = breakdown(view, category_column, dimension) else {
        return None;
    };
    if entries.is_empty() {
        return None;
    }
    let best: Vec<(String, f64)> = entries.iter().take(top_n).cloned().collect();
    let worst: Vec<(String, f64)> = entries
        .iter()
        .rev()
        .take(top_n)
        .cloned()
        .collect();
    Some(Ranking { best, worst })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::model::{CellValue, Dataset};
    use crate::filter::{apply, FilterSpec};

    fn record(id: usize, pairs: &[(&str, CellValue)]) -> Record {
        Record {
            id: format!("r{id}"),
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    fn view_of(records: Vec<Record>) -> FilteredView {
        let ds = Arc::new(Dataset::from_records(1, records, 0));
        apply(&ds, &FilterSpec::default()).unwrap()
    }

    fn flag(v: bool) -> CellValue {
        CellValue::Bool(v)
    }

    #[test]
    fn on_time_rate_over_ten_records_is_seventy() {
        let records = (0..10)
            .map(|i| {
                record(
                    i,
                    &[("entrega_en_dia_programado", flag(i < 7))],
                )
            })
            .collect();
        let view = view_of(records);
        let metrics = compute(&view, Dimension::Compliance);
        assert_eq!(
            metrics["entrega_en_dia_programado"].value,
            MetricValue::Rate(70.0)
        );
        assert_eq!(metrics["respuestas"].value, MetricValue::Count(10));
    }

    #[test]
    fn missing_answers_drop_out_per_question_not_per_record() {
        // 5 records over 3 attitude questions; one record leaves q2 blank.
        // q1: 5/5 yes = 100, q2: 2/4 yes = 50, q3: 0/5 yes = 0.
        let records = (0..5)
            .map(|i| {
                let mut pairs = vec![
                    ("actitud_conductor_respetuosa_colaborativa", flag(true)),
                    ("comunicacion_efectiva", flag(false)),
                ];
                if i != 0 {
                    pairs.push(("actitud_auxiliar_respetuosa_colaborativa", flag(i <= 2)));
                }
                record(i, &pairs)
            })
            .collect();
        let view = view_of(records);
        let metrics = compute(&view, Dimension::Attitudes);

        assert_eq!(
            metrics["actitud_auxiliar_respetuosa_colaborativa"].value,
            MetricValue::Rate(50.0)
        );
        // Composite averages the three per-question means: (100+50+0)/3.
        assert_eq!(
            metrics["indice_actitudes"].value,
            MetricValue::Score(50.0)
        );
    }

    #[test]
    fn no_applicable_records_is_undefined_not_zero() {
        let view = view_of(vec![record(0, &[("comuna", CellValue::String("N".into()))])]);
        let metrics = compute(&view, Dimension::Compliance);
        assert_eq!(
            metrics["entrega_en_dia_programado"].value,
            MetricValue::Undefined
        );
        assert_eq!(metrics["indice_cumplimiento"].value, MetricValue::Undefined);

        let empty = view_of(Vec::new());
        assert_eq!(general_index(&empty), MetricValue::Undefined);
    }

    #[test]
    fn compute_is_pure() {
        let records = (0..6)
            .map(|i| record(i, &[("vehiculo_limpio_buen_estado", flag(i % 2 == 0))]))
            .collect();
        let view = view_of(records);
        assert_eq!(
            compute(&view, Dimension::Vehicle),
            compute(&view, Dimension::Vehicle)
        );
    }

    #[test]
    fn negative_indicators_are_inverted() {
        let records = (0..4)
            .map(|i| record(i, &[("trasbordo", flag(i < 3))]))
            .collect();
        let view = view_of(records);
        let metrics = compute(&view, Dimension::Accessibility);
        // 75% reported a transfer; the indicator reads 25% "absence of".
        assert_eq!(metrics["trasbordo"].value, MetricValue::Rate(25.0));
        assert_eq!(metrics["trasbordo"].label, "Ausencia de Necesidad de Trasbordo");
    }

    #[test]
    fn accessibility_blends_positive_and_negative_groups() {
        // Positive group at 100, negative group fully problematic (0 after
        // inversion): index = 100 * 0.6 + 0 * 0.4.
        let records = (0..4)
            .map(|i| {
                record(
                    i,
                    &[
                        ("comedor_facil_Acceso", flag(true)),
                        ("trasbordo", flag(true)),
                    ],
                )
            })
            .collect();
        let view = view_of(records);
        assert_eq!(
            dimension_index(&view, Dimension::Accessibility),
            MetricValue::Score(60.0)
        );

        // With no negative-group data, the positive group takes the index.
        let records = (0..4)
            .map(|i| record(i, &[("comedor_facil_Acceso", flag(true))]))
            .collect();
        let view = view_of(records);
        assert_eq!(
            dimension_index(&view, Dimension::Accessibility),
            MetricValue::Score(100.0)
        );
    }

    #[test]
    fn compliance_weights_favor_scheduled_day() {
        // On-time 100%, verification 0% → 0.6 * 100 + 0.4 * 0 = 60.
        let records = (0..5)
            .map(|i| {
                record(
                    i,
                    &[
                        ("entrega_en_dia_programado", flag(true)),
                        ("alimentos_debidamente_entregados", flag(false)),
                    ],
                )
            })
            .collect();
        let view = view_of(records);
        assert_eq!(
            dimension_index(&view, Dimension::Compliance),
            MetricValue::Score(60.0)
        );
    }

    #[test]
    fn general_index_skips_undefined_dimensions() {
        let records = (0..5)
            .map(|i| {
                record(
                    i,
                    &[
                        ("entrega_en_dia_programado", flag(true)),
                        ("alimentos_debidamente_entregados", flag(true)),
                        ("vehiculo_limpio_buen_estado", flag(false)),
                        ("alimentos_de_calidad_cantidad", flag(false)),
                        ("contenedores_para_cada_tipoalimento", flag(false)),
                    ],
                )
            })
            .collect();
        let view = view_of(records);
        // Compliance 100, vehicle 0, the other two undefined: mean = 50.
        assert_eq!(general_index(&view), MetricValue::Score(50.0));
    }

    #[test]
    fn breakdown_sorts_descending_then_by_name() {
        let mut records = Vec::new();
        for (i, (comuna, on_time)) in [
            ("Norte", true),
            ("Norte", true),
            ("Centro", false),
            ("Centro", false),
            ("Sur", true),
            ("Sur", true),
        ]
        .iter()
        .enumerate()
        {
            records.push(record(
                i,
                &[
                    ("comuna", CellValue::String(comuna.to_string())),
                    ("entrega_en_dia_programado", flag(*on_time)),
                    ("alimentos_debidamente_entregados", flag(*on_time)),
                ],
            ));
        }
        let view = view_of(records);
        let MetricValue::Breakdown(entries) = breakdown(&view, "comuna", Dimension::Compliance)
        else {
            panic!("expected breakdown");
        };
        // Norte and Sur tie at 100 (name order), Centro trails at 0.
        assert_eq!(
            entries,
            vec![
                ("Norte".to_string(), 100.0),
                ("Sur".to_string(), 100.0),
                ("Centro".to_string(), 0.0),
            ]
        );

        assert_eq!(
            breakdown(&view, "no_such_column", Dimension::Compliance),
            MetricValue::Breakdown(Vec::new())
        );
    }

    #[test]
    fn findings_classify_and_sort_worst_first() {
        // Scheduled-day 75% (warning band), verification 50% (critical).
        let records = (0..4)
            .map(|i| {
                record(
                    i,
                    &[
                        ("entrega_en_dia_programado", flag(i < 3)),
                        ("alimentos_debidamente_entregados", flag(i < 2)),
                    ],
                )
            })
            .collect();
        let view = view_of(records);
        let found = findings(&view, Thresholds::default());

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].field, "alimentos_debidamente_entregados");
        assert_eq!(found[0].severity, Severity::Critical);
        assert_eq!(found[1].field, "entrega_en_dia_programado");
        assert_eq!(found[1].severity, Severity::Warning);
    }

    #[test]
    fn trend_compares_trailing_months() {
        let mut records = Vec::new();
        let mut id = 0;
        // January: 2/4 on time. February: 4/4 on time.
        for (month, hits, total) in [("2025-01", 2, 4), ("2025-02", 4, 4)] {
            for i in 0..total {
                records.push(record(
                    id,
                    &[
                        (
                            "fecha",
                            CellValue::Date(format!("{month}-{:02}", i + 1)),
                        ),
                        ("entrega_en_dia_programado", flag(i < hits)),
                    ],
                ));
                id += 1;
            }
        }
        let view = view_of(records);
        let t = trend(&view, "entrega_en_dia_programado", 3).unwrap();
        assert_eq!(t.direction, TrendDirection::Improving);
        assert_eq!(t.last_value, 100.0);
        assert!((t.change_pct - 100.0).abs() < 1e-9);

        assert!(trend(&view, "comunicacion_efectiva", 3).is_none());
    }

    #[test]
    fn single_month_trend_is_stable() {
        let records = vec![record(
            0,
            &[
                ("fecha", CellValue::Date("2025-06-03".to_string())),
                ("entrega_en_dia_programado", flag(true)),
            ],
        )];
        let view = view_of(records);
        let t = trend(&view, "entrega_en_dia_programado", 3).unwrap();
        assert_eq!(t.direction, TrendDirection::Stable);
        assert_eq!(t.change_pct, 0.0);
    }

    #[test]
    fn rankings_take_breakdown_head_and_tail() {
        let mut records = Vec::new();
        for (i, (ruta, score)) in [
            ("R1", true),
            ("R2", false),
            ("R3", true),
            ("R4", false),
        ]
        .iter()
        .enumerate()
        {
            records.push(record(
                i,
                &[
                    ("ruta", CellValue::String(ruta.to_string())),
                    ("entrega_en_dia_programado", flag(*score)),
                    ("alimentos_debidamente_entregados", flag(*score)),
                ],
            ));
        }
        let view = view_of(records);
        let ranking = rank_categories(&view, "ruta", Dimension::Compliance, 2).unwrap();
        assert_eq!(
            ranking.best,
            vec![("R1".to_string(), 100.0), ("R3".to_string(), 100.0)]
        );
        assert_eq!(
            ranking.worst,
            vec![("R4".to_string(), 0.0), ("R2".to_string(), 0.0)]
        );

        assert!(rank_categories(&view, "nodo", Dimension::Compliance, 2).is_none());
    }

    #[test]
    fn likert_answers_normalize_onto_the_same_scale() {
        let likert = FieldDef {
            name: "satisfaccion_entrega",
            label: "Satisfacción con la Entrega",
            kind: FieldKind::Likert { max: 5 },
            polarity: Polarity::Positive,
            weight: 1.0,
        };
        // Answers 1, 3, 5 → normalized 0, 0.5, 1 → rate 50.
        let records = [1i64, 3, 5]
            .iter()
            .enumerate()
            .map(|(i, v)| record(i, &[("satisfaccion_entrega", CellValue::Integer(*v))]))
            .collect();
        let view = view_of(records);
        assert_eq!(field_rate(&view, &likert), Some(50.0));
    }

    #[test]
    fn round1_is_presentation_only() {
        assert_eq!(round1(66.666_666), 66.7);
        // Unrounded values flow through compute.
        let records = (0..3)
            .map(|i| record(i, &[("entrega_en_dia_programado", flag(i < 2))]))
            .collect();
        let view = view_of(records);
        let metrics = compute(&view, Dimension::Compliance);
        let MetricValue::Rate(v) = metrics["entrega_en_dia_programado"].value else {
            panic!("expected rate");
        };
        assert!((v - 200.0 / 3.0).abs() < 1e-12);
        assert_eq!(round1(v), 66.7);
    }
}
