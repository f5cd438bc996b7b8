use anyhow::{Context, Result};

use vercoal::schema::{self, Polarity};

/// Minimal deterministic PRNG (64-bit LCG, Knuth constants).
struct SampleRng {
    state: u64,
}

impl SampleRng {
    fn new(seed: u64) -> Self {
        SampleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SampleRng::new(42);

    let comunas = ["Norte", "Centro", "Sur", "Oriente"];
    let rutas = ["Ruta 1", "Ruta 2", "Ruta 3", "Ruta 4", "Ruta 5"];
    let nodos = ["Nodo A", "Nodo B", "Nodo C"];
    let dias = ["lunes", "miércoles", "viernes"];
    let conductores = [
        "Carlos / Andrea",
        "Luis / Marta",
        "Jorge / Paula",
        "Diana / Felipe",
    ];
    let tiempos = ["mañana", "mediodía", "tarde"];

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut headers = vec![
        "fecha",
        "comuna",
        "ruta",
        "nodo",
        "dia_entrega",
        "conductor_auxiliar",
        "tiempo_de_entrega_de_alimentos",
        "valor_trasbordo",
        "valor_apoyo",
    ];
    headers.extend(schema::all_indicator_fields().map(|(_, f)| f.name));
    writer.write_record(&headers).context("writing header")?;

    let n_rows = 200;
    for i in 0..n_rows {
        // Observations spread over the first half of 2025.
        let month = i % 6 + 1;
        let day = rng.next_u64() % 28 + 1;
        let fecha = format!("2025-{month:02}-{day:02}");

        let transfer_needed = rng.chance(0.18);
        let valor_trasbordo = if transfer_needed {
            format!("{}", 10_000 + rng.next_u64() % 40_000)
        } else {
            String::new()
        };
        let valor_apoyo = if rng.chance(0.1) {
            format!("{}", 5_000 + rng.next_u64() % 20_000)
        } else {
            String::new()
        };

        let mut row = vec![
            fecha,
            rng.pick(&comunas).to_string(),
            rng.pick(&rutas).to_string(),
            rng.pick(&nodos).to_string(),
            rng.pick(&dias).to_string(),
            rng.pick(&conductores).to_string(),
            rng.pick(&tiempos).to_string(),
            valor_trasbordo,
            valor_apoyo,
        ];
        for (_, field) in schema::all_indicator_fields() {
            // A few answers are left blank, like real survey sheets.
            if rng.chance(0.04) {
                row.push(String::new());
                continue;
            }
            let yes = if field.name == "trasbordo" {
                transfer_needed
            } else {
                match field.polarity {
                    Polarity::Positive => rng.chance(0.88),
                    Polarity::Negative => rng.chance(0.15),
                }
            };
            row.push(if yes { "SI" } else { "NO" }.to_string());
        }
        writer.write_record(&row).with_context(|| format!("writing row {i}"))?;
    }

    writer.flush().context("flushing CSV")?;
    println!("Wrote {n_rows} verification rows to {output_path}");
    Ok(())
}
