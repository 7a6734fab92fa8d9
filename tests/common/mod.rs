//! Common test utilities and helpers


pub use fake_provider::FakeProvider;

/// Test data utilities
pub mod test_data {
    use rust_balance_sheets::models::{LineItem, RawStatement, RawValue};

    /// Base values of a small, balanced statement (assets 1000 = capital 1000)
    pub fn base_values() -> [(LineItem, f64); 9] {
        [
            (LineItem::TotalNonCurrentAssets, 600.0),
            (LineItem::CurrentAssets, 400.0),
            (LineItem::Inventory, 100.0),
            (LineItem::Receivables, 50.0),
            (LineItem::CashAndShortTermInvestments, 80.0),
            (LineItem::StockholdersEquity, 300.0),
            (LineItem::TotalLiabilities, 700.0),
            (LineItem::CurrentLiabilities, 200.0),
            (LineItem::NonCurrentLiabilities, 500.0),
        ]
    }

    /// Create a raw statement with all nine line items for the given report dates
    pub fn create_raw_statement(ticker: &str, report_dates: &[&str]) -> RawStatement {
        let mut raw = RawStatement::new(ticker);
        for date in report_dates {
            for (item, value) in base_values() {
                raw.insert(item.name(), date, RawValue::Number(value));
            }
        }
        raw
    }

    /// Same as [`create_raw_statement`] but without one line item
    pub fn create_raw_statement_without(ticker: &str, report_dates: &[&str], missing: LineItem) -> RawStatement {
        let mut raw = create_raw_statement(ticker, report_dates);
        raw.rows.remove(missing.name());
        raw
    }
}

/// Logging utilities for tests
pub mod logging {
    use std::sync::Once;
    use tracing::{debug, info};

    static INIT: Once = Once::new();

    /// Initialize test logging
    pub fn init_test_logging() {
        INIT.call_once(|| {
            // Another test harness may already own the global subscriber
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::fmt()
                    .with_env_filter("rust_balance_sheets=debug,test=debug")
                    .with_test_writer()
                    .finish(),
            );
        });
    }

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    /// Log test data
    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}
