use std::collections::BTreeMap;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Canonical column names
// ---------------------------------------------------------------------------

pub const MARCA: &str = "Marca";
pub const MODELO: &str = "Modelo";
pub const SERIE: &str = "Serie";
pub const UBICACION: &str = "Ubicación";
pub const ESTADO: &str = "Estado";
pub const BANDEJA: &str = "Bandeja";

/// Column holding the sheet (client) each row came from.
pub const CLIENTE: &str = "Cliente";

/// Count column of every Summary Table.
pub const CANTIDAD: &str = "Cantidad";
/// Percentage column of frequency Summary Tables.
pub const PORCENTAJE: &str = "Porcentaje";

/// Prefix of the auto-generated index columns spreadsheets leave behind.
pub const PLACEHOLDER_PREFIX: &str = "Unnamed";

/// Raw header (lowercased, trimmed) → canonical name.
const SYNONYMS: &[(&str, &str)] = &[
    ("marca", MARCA),
    ("modelo", MODELO),
    ("n° serie", SERIE),
    ("numero de serie", SERIE),
    ("serie", SERIE),
    ("ubicacion", UBICACION),
    ("ubicación", UBICACION),
    ("estado", ESTADO),
    ("bandeja", BANDEJA),
];

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Header synonym table. Extend-only: entries can be added, never remapped.
#[derive(Debug, Clone)]
pub struct Normalizer {
    synonyms: BTreeMap<String, String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            synonyms: SYNONYMS
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
        }
    }
}

impl Normalizer {
    /// Register an extra synonym. Returns `false` (and changes nothing) when
    /// `raw` is already mapped.
    pub fn with_synonym(&mut self, raw: &str, canonical: &str) -> bool {
        let key = raw.trim().to_lowercase();
        if self.synonyms.contains_key(&key) {
            return false;
        }
        self.synonyms.insert(key, canonical.to_string());
        true
    }

    /// Canonical name for a raw header.
    ///
    /// Known synonyms map case- and whitespace-insensitively; anything else
    /// comes back trimmed with only its first character upper-cased.
    pub fn canonical(&self, raw: &str) -> String {
        let key = raw.trim().to_lowercase();
        match self.synonyms.get(&key) {
            Some(canonical) => canonical.clone(),
            None => capitalize_first(raw.trim()),
        }
    }
}

/// [`Normalizer::canonical`] with the built-in synonym table.
pub fn normalize_name(raw: &str) -> String {
    Normalizer::default().canonical(raw)
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether a header is a spreadsheet auto-index column (`Unnamed: 0` …).
pub fn is_placeholder_column(header: &str) -> bool {
    header.starts_with(PLACEHOLDER_PREFIX) || header.trim().is_empty()
}

/// Turn a raw sheet into a Sheet Table.
///
/// Placeholder columns are dropped, the rest renamed to canonical names and a
/// `Cliente` column set to `sheet_name` on every row. When two headers end up
/// with the same canonical name the last one wins.
pub fn normalize_sheet(sheet_name: &str, raw: &Table, normalizer: &Normalizer) -> Table {
    let renamed: Vec<(usize, String)> = raw
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, header)| !is_placeholder_column(header))
        .map(|(idx, header)| (idx, normalizer.canonical(header)))
        .collect();

    let mut kept: Vec<(usize, String)> = Vec::with_capacity(renamed.len());
    for (pos, (idx, name)) in renamed.iter().enumerate() {
        if renamed[pos + 1..].iter().any(|(_, later)| later == name) {
            log::warn!(
                "Sheet '{sheet_name}': column '{}' also maps to '{name}', keeping the last one",
                raw.columns()[*idx]
            );
            continue;
        }
        kept.push((*idx, name.clone()));
    }

    let mut table = raw.project(&kept);
    table.set_column(CLIENTE, CellValue::Text(sheet_name.to_string()));
    table
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_ignore_case_and_whitespace() {
        for raw in ["Marca", " marca ", "MARCA"] {
            assert_eq!(normalize_name(raw), "Marca");
        }
        assert_eq!(normalize_name("N° Serie"), "Serie");
        assert_eq!(normalize_name("Numero de Serie"), "Serie");
        assert_eq!(normalize_name("UBICACION"), "Ubicación");
        assert_eq!(normalize_name("Ubicación"), "Ubicación");
        assert_eq!(normalize_name("bandeja"), "Bandeja");
    }

    #[test]
    fn unknown_headers_only_capitalize_first_char() {
        assert_eq!(normalize_name("fecha de compra"), "Fecha de compra");
        assert_eq!(normalize_name("iP Address"), "IP Address");
        assert_eq!(normalize_name("123abc"), "123abc");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("  "), "");
    }

    #[test]
    fn unknown_headers_are_trimmed_before_capitalizing() {
        assert_eq!(normalize_name(" fecha"), "Fecha");
        assert_eq!(normalize_name("fecha "), normalize_name("fecha"));
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["marca", "N° serie", "ubicacion", "fecha", " fecha ", "Estado", "x y"] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn synonyms_are_extend_only() {
        let mut n = Normalizer::default();
        assert!(!n.with_synonym("Marca", "Brand"));
        assert!(n.with_synonym("S/N", SERIE));
        assert_eq!(n.canonical(" s/n "), "Serie");
        assert_eq!(n.canonical("marca"), "Marca");
    }

    #[test]
    fn placeholder_columns_are_detected() {
        assert!(is_placeholder_column("Unnamed: 0"));
        assert!(is_placeholder_column("Unnamed: 12"));
        assert!(is_placeholder_column("   "));
        assert!(!is_placeholder_column("Marca"));
    }

    #[test]
    fn normalize_sheet_drops_placeholders_and_tags_client() {
        let mut raw = Table::with_columns(["Unnamed: 0", " MARCA", "n° serie", "Notas"]);
        raw.push_row(vec![1i64.into(), "HP".into(), "S1".into(), "ok".into()]);
        raw.push_row(vec![2i64.into(), "Dell".into(), "S2".into(), CellValue::Empty]);

        let table = normalize_sheet("ClientA", &raw, &Normalizer::default());

        assert_eq!(table.columns(), &["Marca", "Serie", "Notas", "Cliente"]);
        assert_eq!(table.len(), 2);
        assert!(table
            .column_values(CLIENTE)
            .unwrap()
            .all(|v| v == &CellValue::from("ClientA")));
    }

    #[test]
    fn duplicate_canonical_names_keep_last() {
        let mut raw = Table::with_columns(["marca", "Marca "]);
        raw.push_row(vec!["first".into(), "second".into()]);

        let table = normalize_sheet("S", &raw, &Normalizer::default());

        assert_eq!(table.columns(), &["Marca", "Cliente"]);
        assert_eq!(table.value(0, MARCA), Some(&CellValue::from("second")));
    }

    #[test]
    fn existing_cliente_column_is_overwritten() {
        let mut raw = Table::with_columns(["cliente"]);
        raw.push_row(vec!["someone else".into()]);

        let table = normalize_sheet("ClientB", &raw, &Normalizer::default());

        assert_eq!(table.columns(), &["Cliente"]);
        assert_eq!(table.value(0, CLIENTE), Some(&CellValue::from("ClientB")));
    }
}
