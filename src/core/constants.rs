// Constants shared by the core and the exporters

/// Decimal places kept for corrected values and cross-chunk averages.
pub const ROUND_DECIMALS: i32 = 5;

// Input table columns: chunk id, timestamp, value
pub const COLUMN_CHUNK_ID: usize = 0;
pub const COLUMN_TIMESTAMP: usize = 1;
pub const COLUMN_VALUE: usize = 2;
pub const REQUIRED_COLUMNS: usize = 3;

pub const INPUT_EXTENSION: &str = "csv";

// Table layout
pub const TABLE_CORNER_LABEL: &str = "timestamps\\chunk";
pub const TABLE_AVERAGE_LABEL: &str = "average";
pub const TABLE_DELIMITER: u8 = b',';

// Output file suffixes, appended to the configured output name
pub const RAW_TABLE_SUFFIX: &str = ".csv";
pub const CORRECTED_TABLE_SUFFIX: &str = "_corrected.csv";
pub const CHART_ALL_SUFFIX: &str = "_all";
pub const CHART_ALL_CORRECTED_SUFFIX: &str = "_all_corrected";
pub const CHART_AVERAGE_SUFFIX: &str = "_average";
pub const CHART_FUNCTIONS_CORRECTED_SUFFIX: &str = "_functions_corrected";
pub const CHART_FUNCTIONS_SUFFIX: &str = "_functions";
pub const CHART_EXTENSION: &str = "json";
