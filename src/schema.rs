use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Dimension – the four analysis areas
// ---------------------------------------------------------------------------

/// One of the four analysis areas the dashboard reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Accessibility,
    Compliance,
    Vehicle,
    Attitudes,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Accessibility,
        Dimension::Compliance,
        Dimension::Vehicle,
        Dimension::Attitudes,
    ];

    /// Resolve a page-facing dimension name. This is the only place an
    /// unknown dimension can enter the engine; past it, the enum makes the
    /// error unrepresentable.
    pub fn from_name(name: &str) -> Result<Dimension, DashboardError> {
        match name {
            "accesibilidad" | "accessibility" => Ok(Dimension::Accessibility),
            "cumplimiento" | "compliance" => Ok(Dimension::Compliance),
            "vehiculo" | "vehicle" => Ok(Dimension::Vehicle),
            "actitudes" | "attitudes" => Ok(Dimension::Attitudes),
            other => Err(DashboardError::UnknownDimension {
                name: other.to_string(),
            }),
        }
    }

    /// Stable key used in metric names and cache keys.
    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Accessibility => "accesibilidad",
            Dimension::Compliance => "cumplimiento",
            Dimension::Vehicle => "vehiculo",
            Dimension::Attitudes => "actitudes",
        }
    }

    /// Human-readable name for tables and chart titles.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Accessibility => "Accesibilidad",
            Dimension::Compliance => "Cumplimiento",
            Dimension::Vehicle => "Vehículo",
            Dimension::Attitudes => "Actitudes",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Field definitions – column name → kind / polarity / weight
// ---------------------------------------------------------------------------

/// How a column's cells are typed and coerced at load time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Sí/No indicator, stored as a boolean.
    Flag,
    /// Ordinal answer on a 1..=max scale, normalized to 0–100 when scored.
    Likert { max: u8 },
}

/// Whether an affirmative answer is good news or bad news.
///
/// Negative indicators (e.g. "needed a transfer") are inverted before they
/// contribute to an index, so every score reads "higher is better".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// One indicator column of the verification sheet.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Canonical column name in the source sheet.
    pub name: &'static str,
    /// Human-readable label for tables and charts.
    pub label: &'static str,
    pub kind: FieldKind,
    pub polarity: Polarity,
    /// Relative weight inside the dimension index. Weights are normalized
    /// over the fields that actually have data, so they need not sum to 1.
    pub weight: f64,
}

const fn flag(
    name: &'static str,
    label: &'static str,
    polarity: Polarity,
    weight: f64,
) -> FieldDef {
    FieldDef {
        name,
        label,
        kind: FieldKind::Flag,
        polarity,
        weight,
    }
}

// ---------------------------------------------------------------------------
// Fixed column layout of the verification sheet
// ---------------------------------------------------------------------------

/// Date column; every observation carries the verification date.
pub const DATE_COLUMN: &str = "fecha";

/// Optional stable identifier column. When absent, record ids are
/// synthesized from the row position.
pub const ID_COLUMN: &str = "id";

/// Categorical columns usable as filter dimensions and breakdown groups.
pub const CATEGORY_COLUMNS: [&str; 6] = [
    "comuna",
    "ruta",
    "nodo",
    "dia_entrega",
    "conductor_auxiliar",
    "tiempo_de_entrega_de_alimentos",
];

/// Monetary columns (support costs reported for problematic deliveries).
pub const MONEY_COLUMNS: [&str; 2] = ["valor_trasbordo", "valor_apoyo"];

/// Accessibility: can the vehicle and the food actually reach the comedor.
pub const ACCESSIBILITY_FIELDS: [FieldDef; 6] = [
    flag(
        "comedor_facil_Acceso",
        "Acceso Fácil al Comedor",
        Polarity::Positive,
        1.0,
    ),
    flag(
        "vehiculo_puede_llegar_a_sitio",
        "Vehículo Llega Directamente",
        Polarity::Positive,
        1.0,
    ),
    flag("trasbordo", "Necesidad de Trasbordo", Polarity::Negative, 1.0),
    flag(
        "ingreso_apoyo_comunidad",
        "Necesidad de Apoyo Comunitario",
        Polarity::Negative,
        1.0,
    ),
    flag(
        "demora_entregas",
        "Demoras en Otras Entregas",
        Polarity::Negative,
        1.0,
    ),
    flag(
        "inocuidad_comprometida",
        "Inocuidad Comprometida",
        Polarity::Negative,
        1.0,
    ),
];

/// Accessibility blends its positive and negative groups with these weights
/// when both groups have data; a lone group takes the whole index.
pub const ACCESSIBILITY_POSITIVE_SHARE: f64 = 0.6;
pub const ACCESSIBILITY_NEGATIVE_SHARE: f64 = 0.4;

/// Compliance: was the delivery on the scheduled day and properly verified.
/// The scheduled-day indicator is weighted heavier.
pub const COMPLIANCE_FIELDS: [FieldDef; 2] = [
    flag(
        "entrega_en_dia_programado",
        "Entrega en Día Programado",
        Polarity::Positive,
        0.6,
    ),
    flag(
        "alimentos_debidamente_entregados",
        "Verificación de Alimentos",
        Polarity::Positive,
        0.4,
    ),
];

/// Vehicle condition; food quality carries the largest weight.
pub const VEHICLE_FIELDS: [FieldDef; 3] = [
    flag(
        "vehiculo_limpio_buen_estado",
        "Vehículo Limpio y en Buen Estado",
        Polarity::Positive,
        0.3,
    ),
    flag(
        "alimentos_de_calidad_cantidad",
        "Calidad y Cantidad de Alimentos",
        Polarity::Positive,
        0.4,
    ),
    flag(
        "contenedores_para_cada_tipoalimento",
        "Contenedores Adecuados",
        Polarity::Positive,
        0.3,
    ),
];

/// Staff attitudes, equally weighted.
pub const ATTITUDE_FIELDS: [FieldDef; 6] = [
    flag(
        "actitud_conductor_respetuosa_colaborativa",
        "Actitud del Conductor",
        Polarity::Positive,
        1.0,
    ),
    flag(
        "actitud_auxiliar_respetuosa_colaborativa",
        "Actitud del Auxiliar",
        Polarity::Positive,
        1.0,
    ),
    flag(
        "actitud_gestora_respetuosa_colaborativa",
        "Actitud de la Gestora",
        Polarity::Positive,
        1.0,
    ),
    flag(
        "buena_disposicion_recibir_mercados",
        "Disposición para Recibir",
        Polarity::Positive,
        1.0,
    ),
    flag(
        "comunicacion_efectiva",
        "Comunicación Efectiva",
        Polarity::Positive,
        1.0,
    ),
    flag(
        "resolucion_inconvenientes",
        "Resolución de Inconvenientes",
        Polarity::Positive,
        1.0,
    ),
];

/// Weights of the four dimension indexes inside the general index.
/// Deliberately equal; change here, not in the engine.
pub const GENERAL_WEIGHTS: [(Dimension, f64); 4] = [
    (Dimension::Accessibility, 1.0),
    (Dimension::Compliance, 1.0),
    (Dimension::Vehicle, 1.0),
    (Dimension::Attitudes, 1.0),
];

/// Indicator fields of one dimension.
pub fn fields_for(dimension: Dimension) -> &'static [FieldDef] {
    match dimension {
        Dimension::Accessibility => &ACCESSIBILITY_FIELDS,
        Dimension::Compliance => &COMPLIANCE_FIELDS,
        Dimension::Vehicle => &VEHICLE_FIELDS,
        Dimension::Attitudes => &ATTITUDE_FIELDS,
    }
}

/// All indicator fields across the four dimensions, in dimension order.
pub fn all_indicator_fields() -> impl Iterator<Item = (Dimension, &'static FieldDef)> {
    Dimension::ALL
        .into_iter()
        .flat_map(|dim| fields_for(dim).iter().map(move |f| (dim, f)))
}

/// Look up an indicator definition by column name.
pub fn indicator(name: &str) -> Option<(Dimension, &'static FieldDef)> {
    all_indicator_fields().find(|(_, f)| f.name == name)
}

/// Whether `name` is any schema-known column. Unknown source columns are
/// dropped at load time with a logged warning, never silently merged into
/// metrics.
pub fn is_known_column(name: &str) -> bool {
    name == DATE_COLUMN
        || name == ID_COLUMN
        || CATEGORY_COLUMNS.contains(&name)
        || MONEY_COLUMNS.contains(&name)
        || indicator(name).is_some()
}

/// Columns that must be present in the source header for a refresh to be
/// accepted: the date column plus every indicator column. Category and
/// monetary columns may be absent and degrade gracefully.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![DATE_COLUMN];
    cols.extend(all_indicator_fields().map(|(_, f)| f.name));
    cols
}
