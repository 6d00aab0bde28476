use thiserror::Error;

/// Errors raised while building a calibration and evaluating samples against it
#[derive(Error, Debug)]
pub enum Error {
    // Standard validation
    #[error("standard {index} is missing its {field}")]
    IncompleteData { index: usize, field: &'static str },

    #[error("{count} standards supplied, between {min} and {max} are required")]
    PointCount { count: usize, min: usize, max: usize },

    #[error("standard {index} has an invalid {field}: {value}")]
    InvalidValue {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("standards must span at least two distinct concentrations")]
    InsufficientVariance,

    // Regression and inversion
    #[error("calibration slope {slope:e} is too flat to invert (minimum magnitude {min_slope:e})")]
    DegenerateSlope { slope: f64, min_slope: f64 },

    #[error("cannot invert a calibration line with zero slope")]
    DivisionByZeroSlope,

    // Sample evaluation
    #[error("{count} samples supplied, between {min} and {max} are required")]
    SampleCount { count: usize, min: usize, max: usize },

    #[error("sample {label} has no absorbance reading")]
    MissingReading { label: String },

    #[error("sample {label} has a non-finite absorbance: {absorbance}")]
    InvalidReading { label: String, absorbance: f64 },

    #[error("duplicate evaluation needs an even number of samples, got {count}")]
    OddSampleCount { count: usize },

    #[error("duplicate pair {pair} has a zero mean concentration")]
    ZeroAverage { pair: String },

    #[error("Horwitz CV is not computable at a concentration of {concentration} ppm")]
    NotComputable { concentration: f64 },

    // Loading
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = ::std::result::Result<T, Error>;
