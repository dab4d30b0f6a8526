use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

/// Minimal deterministic PRNG (splitmix64)
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Each client sheet spells the headers its own way, like real inventories do.
struct ClientSheet {
    name: &'static str,
    headers: [&'static str; 6],
    rows: usize,
}

const CLIENTS: &[ClientSheet] = &[
    ClientSheet {
        name: "Hospital Norte",
        headers: ["", "MARCA", "Modelo", "N° Serie", "Ubicacion", "Estado"],
        rows: 24,
    },
    ClientSheet {
        name: "Municipalidad",
        headers: ["marca", "modelo", "Numero de serie", "Ubicación", "estado", "Bandeja"],
        rows: 18,
    },
    ClientSheet {
        name: "Colegio San José",
        headers: ["Marca ", " Modelo", "Serie", "ubicación", "ESTADO", "fecha instalacion"],
        rows: 12,
    },
];

const BRANDS: &[(&str, &[&str])] = &[
    ("HP", &["LaserJet M404", "LaserJet M428", "OfficeJet 9020"]),
    ("Brother", &["HL-L5100", "MFC-L8900"]),
    ("Epson", &["WorkForce WF-C5790", "EcoTank L6270"]),
    ("Lexmark", &["MS521", "MX622"]),
];

const PLACES: &[&str] = &["Recepción", "Oficina 1", "Oficina 2", "Bodega", "Dirección"];
const STATES: &[&str] = &["Activa", "Activa", "Activa", "En reparación", "RETIRADA"];

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_inventory.xlsx".to_string());
    let mut rng = SimpleRng::new(42);
    let mut workbook = Workbook::new();
    let mut total = 0;

    for (sheet_no, client) in CLIENTS.iter().enumerate() {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(client.name)
            .with_context(|| format!("naming sheet '{}'", client.name))?;

        for (c, header) in client.headers.iter().enumerate() {
            sheet.write_string(0, c as u16, *header)?;
        }

        for r in 0..client.rows {
            let row = (r + 1) as u32;
            let brand_idx = (rng.next_u64() % BRANDS.len() as u64) as usize;
            let (brand, models) = BRANDS[brand_idx];
            let serial = format!(
                "{}{:02}{:05}",
                &brand[..2].to_uppercase(),
                sheet_no,
                rng.next_u64() % 100_000
            );

            // The first client keeps a spreadsheet index column.
            let values: [String; 6] = match sheet_no {
                0 => [
                    r.to_string(),
                    brand.to_string(),
                    rng.pick(models).to_string(),
                    serial,
                    rng.pick(PLACES).to_string(),
                    rng.pick(STATES).to_string(),
                ],
                1 => [
                    brand.to_string(),
                    rng.pick(models).to_string(),
                    serial,
                    rng.pick(PLACES).to_string(),
                    rng.pick(STATES).to_string(),
                    format!("{}", 1 + rng.next_u64() % 3),
                ],
                _ => [
                    brand.to_lowercase(),
                    rng.pick(models).to_string(),
                    serial,
                    rng.pick(PLACES).to_string(),
                    rng.pick(STATES).to_lowercase(),
                    format!("2023-{:02}-15", 1 + rng.next_u64() % 12),
                ],
            };

            for (c, value) in values.iter().enumerate() {
                match value.parse::<f64>() {
                    Ok(n) => sheet.write_number(row, c as u16, n)?,
                    Err(_) => sheet.write_string(row, c as u16, value.as_str())?,
                };
            }
            total += 1;
        }
    }

    workbook
        .save(&output_path)
        .with_context(|| format!("writing {output_path}"))?;

    println!(
        "Wrote {total} equipment rows across {} clients to {output_path}",
        CLIENTS.len()
    );
    Ok(())
}
