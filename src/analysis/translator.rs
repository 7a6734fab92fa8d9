use crate::models::{DisplayStatement, Kpi, LineItem, StatementTable};

/// Canonical row key → German display name
pub const TRANSLATIONS: [(&str, &str); 21] = [
    ("Total Non Current Assets", "Gesamtanlagevermögen"),
    ("Current Assets", "Umlaufvermögen"),
    ("Inventory", "Vorräte"),
    ("Receivables", "Forderungen"),
    ("Cash Cash Equivalents And Short Term Investments", "Liquide Mittel und kurzfristige Anlagen"),
    ("Stockholders Equity", "Eigenkapital"),
    ("Total Liabilities Net Minority Interest", "Gesamtverbindlichkeiten ohne Minderheitsanteile"),
    ("Current Liabilities", "Kurzfristige Verbindlichkeiten"),
    ("Total Non Current Liabilities Net Minority Interest", "Langfristige Verbindlichkeiten"),
    ("Equity_Ratio", "Eigenkapitalquote"),
    ("Debt_Ratio", "Fremdkapitalquote"),
    ("Static_Debt_Ratio", "Statischer Verschuldungsgrad"),
    ("Fixed_Asset_Intensity", "Anlageintensität"),
    ("Coverage_Ratio_1", "Anlagendeckungsgrad 1"),
    ("Coverage_Ratio_2", "Anlagendeckungsgrad 2"),
    ("Current_Asset_Ratio", "Umlaufquote"),
    ("Receivables_Ratio", "Forderungsquote"),
    ("Liquidity_Ratio_1", "1. Liquiditätsquote"),
    ("Liquidity_Ratio_2", "2. Liquiditätsquote"),
    ("Liquidity_Ratio_3", "3. Liquiditätsquote"),
    ("Net_Working_Capital", "Netto-Umlaufvermögen"),
];

/// Display name for a canonical key; unknown keys are returned unchanged
pub fn display_name(key: &str) -> &str {
    TRANSLATIONS
        .iter()
        .find(|(canonical, _)| *canonical == key)
        .map(|(_, display)| *display)
        .unwrap_or(key)
}

pub fn line_item_label(item: LineItem) -> &'static str {
    display_name(item.name())
}

pub fn kpi_label(kpi: Kpi) -> &'static str {
    display_name(kpi.name())
}

/// Rename every row to its display name
pub fn translate(statement: &StatementTable) -> DisplayStatement {
    statement.map_keys(|key| display_name(key).to_string())
}
