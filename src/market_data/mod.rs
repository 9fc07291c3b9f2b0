pub mod csv_provider;
pub mod provider;
pub mod timeframe;
pub mod yahoo;

pub use csv_provider::CsvDataProvider;
pub use provider::{MockPriceDataProvider, PriceDataProvider};
pub use timeframe::{Interval, Period};
pub use yahoo::YahooProvider;
