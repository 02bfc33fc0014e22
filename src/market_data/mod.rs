pub mod daily_series;

pub use daily_series::normalize;
