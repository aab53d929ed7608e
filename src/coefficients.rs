//! Reader for World Magnetic Model spherical harmonic coefficient files.
use chrono::NaiveDate;
use rust_embed::RustEmbed;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Highest spherical harmonic degree carried by a WMM release.
pub const MAX_DEGREE: usize = 12;

/// Extent of the packed coefficient arrays, `MAX_DEGREE + 1`.
pub const COEFF_DIM: usize = MAX_DEGREE + 1;

/// Years a WMM release stays valid; `default_date` sits at the midpoint.
const MODEL_LIFESPAN: f64 = 5.0;

#[derive(RustEmbed)]
#[folder = "data/"]
struct CoefficientData;

const COEFFICIENT_FILE: &str = "WMM.COF";

/// Enum of the possible error variants that may be encountered while
/// reading a coefficient file
#[derive(Error, Debug)]
pub enum CoefficientError {
    /// The coefficient file could not be opened or read
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A record's token count matches no known record layout
    #[error("{0}")]
    InvalidRecord(String),

    /// A token expected to be numeric could not be converted
    #[error("{0}")]
    InvalidValue(String),

    /// A coefficient record's degree exceeds the model's storage
    #[error("{0}")]
    DegreeOutOfRange(String),
}

type Result<T> = std::result::Result<T, CoefficientError>;

/// Parser progress through a coefficient file.
///
/// Transitions: `Header` moves to `ReadingCoefficients` once the epoch
/// header has been seen; any state moves to `Done` on a one-token sentinel
/// line, after which no further lines are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Header,
    ReadingCoefficients,
    Done,
}

/// A fully parsed set of Gauss coefficients and their secular variation
/// rates, valid from `epoch` for five years.
///
/// Both the cosine (`g`) and sine (`h`) terms share one square array:
/// `c[m][n]` holds g(n, m), and for m != 0 the companion h(n, m) lives in
/// the transposed, shifted slot `c[n][m - 1]`. `cd` is laid out the same
/// way for the secular variation rates. Use [`CoefficientSet::g`] and
/// friends to read individual terms without unpacking by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    pub epoch: f64,
    pub default_date: f64,
    pub model_name: String,
    pub release_date: Option<NaiveDate>,
    pub c: [[f64; COEFF_DIM]; COEFF_DIM],
    pub cd: [[f64; COEFF_DIM]; COEFF_DIM],
}

impl CoefficientSet {
    /// Parses the `WMM.COF` file shipped with this crate.
    ///
    /// # Errors
    /// Will return `Err` if the bundled file is missing or any of its
    /// records fails to parse.
    pub fn bundled() -> Result<CoefficientSet> {
        let file = CoefficientData::get(COEFFICIENT_FILE).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Bundled coefficient file {COEFFICIENT_FILE} not found"),
            )
        })?;
        Self::parse(BufReader::new(file.data.as_ref()))
    }

    /// Parses a coefficient file on disk, e.g. a candidate WMM release.
    ///
    /// # Errors
    /// Will return `Err` if the file cannot be opened or any of its
    /// records fails to parse.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<CoefficientSet> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }

    /// Parses a coefficient file from any buffered reader.
    ///
    /// The scan is line by line and stops at the first one-token sentinel
    /// line. A set is only returned once every record up to the sentinel
    /// has been accepted, so callers never see a partially filled set.
    ///
    /// # Errors
    /// Will return `Err` if a line cannot be read, a numeric token cannot
    /// be converted, a record matches no known layout, or a record's
    /// degree exceeds [`MAX_DEGREE`].
    pub fn parse<R: BufRead>(reader: R) -> Result<CoefficientSet> {
        let mut coeffs = CoefficientSet {
            epoch: 0.0,
            default_date: 0.0,
            model_name: String::new(),
            release_date: None,
            c: [[0.0; COEFF_DIM]; COEFF_DIM],
            cd: [[0.0; COEFF_DIM]; COEFF_DIM],
        };
        let mut state = ParserState::Header;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            state = coeffs.read_record(state, &line, i + 1)?;
            if state == ParserState::Done {
                break;
            }
        }
        Ok(coeffs)
    }

    /// Consumes one line of the file and returns the next parser state.
    fn read_record(&mut self, state: ParserState, line: &str, line_num: usize) -> Result<ParserState> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            // End-of-data sentinel, e.g. a line of nines
            [_] => Ok(ParserState::Done),
            [epoch, name, released] => {
                self.epoch = parse_float(epoch, "epoch", line_num)?;
                self.default_date = self.epoch + MODEL_LIFESPAN / 2.0;
                self.model_name = (*name).to_string();
                self.release_date = NaiveDate::parse_from_str(released, "%m/%d/%Y").ok();
                Ok(ParserState::ReadingCoefficients)
            }
            [n, m, gnm, hnm, dgnm, dhnm, ..] => {
                let n = parse_index(n, "degree", line_num)?;
                let m = parse_index(m, "order", line_num)?;
                // Order above degree has no meaning in the harmonic
                // expansion; such records are skipped, not rejected.
                if m <= n {
                    if n > MAX_DEGREE {
                        Err(CoefficientError::DegreeOutOfRange(format!(
                            "Line {line_num}: degree {n} exceeds maximum of {MAX_DEGREE}"
                        )))?;
                    }
                    self.c[m][n] = parse_float(gnm, "gnm", line_num)?;
                    self.cd[m][n] = parse_float(dgnm, "dgnm", line_num)?;
                    if m != 0 {
                        self.c[n][m - 1] = parse_float(hnm, "hnm", line_num)?;
                        self.cd[n][m - 1] = parse_float(dhnm, "dhnm", line_num)?;
                    }
                }
                Ok(state)
            }
            _ => Err(CoefficientError::InvalidRecord(format!(
                "Line {line_num}: expected 1, 3, or 6 fields, got {}",
                fields.len()
            ))),
        }
    }

    /// Main field coefficient g(n, m) in nT.
    pub fn g(&self, n: usize, m: usize) -> f64 {
        self.c[m][n]
    }

    /// Main field coefficient h(n, m) in nT. Zero when m == 0, where the
    /// sine term vanishes.
    pub fn h(&self, n: usize, m: usize) -> f64 {
        if m == 0 {
            0.0
        } else {
            self.c[n][m - 1]
        }
    }

    /// Secular variation of g(n, m) in nT/year.
    pub fn g_dot(&self, n: usize, m: usize) -> f64 {
        self.cd[m][n]
    }

    /// Secular variation of h(n, m) in nT/year. Zero when m == 0.
    pub fn h_dot(&self, n: usize, m: usize) -> f64 {
        if m == 0 {
            0.0
        } else {
            self.cd[n][m - 1]
        }
    }
}

fn parse_float(field: &str, name: &str, line_num: usize) -> Result<f64> {
    field.parse::<f64>().map_err(|_| {
        CoefficientError::InvalidValue(format!(
            "Line {line_num}: unable to convert {name} {field:?} to a float"
        ))
    })
}

fn parse_index(field: &str, name: &str, line_num: usize) -> Result<usize> {
    field.parse::<usize>().map_err(|_| {
        CoefficientError::InvalidValue(format!(
            "Line {line_num}: unable to convert {name} {field:?} to an index"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse_str(contents: &str) -> Result<CoefficientSet> {
        CoefficientSet::parse(contents.as_bytes())
    }

    #[test]
    fn header_sets_epoch_and_default_date() {
        let coeffs = parse_str("2020.0 WMM-2020 12/10/2019\n").unwrap();
        assert_eq!(coeffs.epoch, 2020.0);
        assert_eq!(coeffs.default_date, 2022.5);
    }

    #[test]
    fn header_metadata_is_retained() {
        let coeffs = parse_str("2020.0 WMM-2020 12/10/2019\n").unwrap();
        assert_eq!(coeffs.model_name, "WMM-2020");
        assert_eq!(
            coeffs.release_date,
            Some(NaiveDate::from_ymd_opt(2019, 12, 10).unwrap())
        );
    }

    #[test]
    fn unparseable_release_date_is_dropped() {
        let coeffs = parse_str("2020.0 WMM-2020 December\n").unwrap();
        assert_eq!(coeffs.release_date, None);
    }

    #[test]
    fn zero_order_record_has_no_transposed_write() {
        let coeffs = parse_str("1 0 -29404.5 0.0 6.7 0.0\n").unwrap();
        assert_eq!(coeffs.c[0][1], -29404.5);
        assert_eq!(coeffs.cd[0][1], 6.7);
        assert_eq!(coeffs.c[1][0], 0.0);
        assert_eq!(coeffs.cd[1][0], 0.0);
    }

    #[test]
    fn nonzero_order_packs_h_into_transposed_slot() {
        let coeffs = parse_str("1 1 -1450.7 4652.9 7.7 -25.1\n").unwrap();
        assert_eq!(coeffs.c[1][1], -1450.7);
        assert_eq!(coeffs.cd[1][1], 7.7);
        assert_eq!(coeffs.c[1][0], 4652.9);
        assert_eq!(coeffs.cd[1][0], -25.1);
    }

    #[test]
    fn accessors_unpack_the_shared_array() {
        let coeffs = parse_str("1 1 -1450.7 4652.9 7.7 -25.1\n").unwrap();
        assert_eq!(coeffs.g(1, 1), -1450.7);
        assert_eq!(coeffs.h(1, 1), 4652.9);
        assert_eq!(coeffs.g_dot(1, 1), 7.7);
        assert_eq!(coeffs.h_dot(1, 1), -25.1);
        assert_eq!(coeffs.h(1, 0), 0.0);
        assert_eq!(coeffs.h_dot(1, 0), 0.0);
    }

    #[test]
    fn order_above_degree_is_skipped() {
        let coeffs = parse_str("2 3 100.0 200.0 1.0 2.0\n").unwrap();
        assert_eq!(coeffs.c, [[0.0; COEFF_DIM]; COEFF_DIM]);
        assert_eq!(coeffs.cd, [[0.0; COEFF_DIM]; COEFF_DIM]);
    }

    #[test]
    fn sentinel_stops_reading() {
        let contents = "2020.0 WMM-2020 12/10/2019\n\
                        1 0 -29404.5 0.0 6.7 0.0\n\
                        999999999999999999999999999999999999999999999999\n\
                        1 1 -1450.7 4652.9 7.7 -25.1\n";
        let coeffs = parse_str(contents).unwrap();
        assert_eq!(coeffs.c[0][1], -29404.5);
        assert_eq!(coeffs.c[1][1], 0.0);
        assert_eq!(coeffs.c[1][0], 0.0);
    }

    #[test]
    fn trailing_fields_are_ignored() {
        let coeffs = parse_str("1 0 -29404.5 0.0 6.7 0.0 extra fields\n").unwrap();
        assert_eq!(coeffs.c[0][1], -29404.5);
    }

    #[test]
    fn parsing_is_deterministic() {
        let contents = "2020.0 WMM-2020 12/10/2019\n\
                        1 0 -29404.5 0.0 6.7 0.0\n\
                        1 1 -1450.7 4652.9 7.7 -25.1\n\
                        999999999999999999999999999999999999999999999999\n";
        let first = parse_str(contents).unwrap();
        let second = parse_str(contents).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn bad_numeric_token_is_an_error() {
        let result = parse_str("1 0 not_a_number 0.0 6.7 0.0\n");
        assert!(matches!(result, Err(CoefficientError::InvalidValue(_))));
    }

    #[test]
    fn bad_epoch_is_an_error() {
        let result = parse_str("epoch WMM-2020 12/10/2019\n");
        assert!(matches!(result, Err(CoefficientError::InvalidValue(_))));
    }

    #[test]
    fn short_record_is_an_error() {
        let result = parse_str("1 0\n");
        assert!(matches!(result, Err(CoefficientError::InvalidRecord(_))));
    }

    #[test]
    fn blank_line_is_an_error() {
        let result = parse_str("2020.0 WMM-2020 12/10/2019\n\n");
        assert!(matches!(result, Err(CoefficientError::InvalidRecord(_))));
    }

    #[test]
    fn degree_beyond_storage_is_an_error() {
        let result = parse_str("13 0 1.0 0.0 0.0 0.0\n");
        assert!(matches!(result, Err(CoefficientError::DegreeOutOfRange(_))));
    }

    #[test]
    fn negative_degree_is_an_error() {
        let result = parse_str("-1 0 1.0 0.0 0.0 0.0\n");
        assert!(matches!(result, Err(CoefficientError::InvalidValue(_))));
    }
}
