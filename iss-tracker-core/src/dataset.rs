//! Immutable trajectory dataset and its read-only queries

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{Result, TrackerError};
use crate::types::StateVector;

/// Ordered key/value block (OEM header or metadata)
pub type Block = BTreeMap<String, String>;

/// A complete ephemeris as delivered by a loader.
///
/// Records are in strictly increasing epoch order, epochs are unique and
/// there is at least one record. Those invariants are checked once in
/// [`Ephemeris::new`]; every query relies on them.
#[derive(Debug, Clone, Serialize)]
pub struct Ephemeris {
    header: Block,
    metadata: Block,
    comments: Vec<String>,
    state_vectors: Vec<StateVector>,
    #[serde(skip)]
    by_epoch: HashMap<String, usize>,
}

impl Ephemeris {
    pub fn new(
        header: Block,
        metadata: Block,
        comments: Vec<String>,
        state_vectors: Vec<StateVector>,
    ) -> Result<Self> {
        if state_vectors.is_empty() {
            return Err(TrackerError::InvalidDataset(
                "ephemeris contains no state vectors".to_string(),
            ));
        }

        let mut by_epoch = HashMap::with_capacity(state_vectors.len());
        for (index, sv) in state_vectors.iter().enumerate() {
            if by_epoch.insert(sv.epoch().to_string(), index).is_some() {
                return Err(TrackerError::InvalidDataset(format!(
                    "duplicate epoch '{}'",
                    sv.epoch()
                )));
            }
            // Instants are whole seconds; within one second the fixed-width
            // epoch strings order the fractional part
            let out_of_order = index > 0 && {
                let prev = &state_vectors[index - 1];
                (prev.instant(), prev.epoch()) >= (sv.instant(), sv.epoch())
            };
            if out_of_order {
                return Err(TrackerError::InvalidDataset(format!(
                    "epoch '{}' is not after '{}'",
                    sv.epoch(),
                    state_vectors[index - 1].epoch()
                )));
            }
        }

        Ok(Self {
            header,
            metadata,
            comments,
            state_vectors,
            by_epoch,
        })
    }

    pub fn header(&self) -> &Block {
        &self.header
    }

    pub fn metadata(&self) -> &Block {
        &self.metadata
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// State vectors in chronological order
    pub fn state_vectors(&self) -> &[StateVector] {
        &self.state_vectors
    }

    pub fn len(&self) -> usize {
        self.state_vectors.len()
    }

    /// Always false for a constructed ephemeris
    pub fn is_empty(&self) -> bool {
        self.state_vectors.is_empty()
    }

    /// Exact-match lookup of a state vector by its epoch string
    pub fn find_by_epoch(&self, epoch: &str) -> Result<&StateVector> {
        self.by_epoch
            .get(epoch)
            .map(|&index| &self.state_vectors[index])
            .ok_or_else(|| TrackerError::EpochNotFound(epoch.to_string()))
    }

    /// Epoch identifiers of one page, in chronological order
    pub fn list_epochs(&self, page: Page) -> Vec<String> {
        let remaining = self.state_vectors.iter().skip(page.offset);
        let selected: Box<dyn Iterator<Item = &StateVector>> = match page.limit {
            0 => Box::new(remaining),
            limit => Box::new(remaining.take(limit)),
        };
        selected.map(|sv| sv.epoch().to_string()).collect()
    }
}

/// Validated pagination window over the epoch list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Number of leading epochs to skip
    pub offset: usize,
    /// Maximum number of epochs to return, 0 means unlimited
    pub limit: usize,
}

impl Page {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Build a page from raw query-string values.
    ///
    /// Missing or blank values take the defaults (`offset = 0`, `limit = 0`).
    /// A negative offset is clamped to 0 and oversized values saturate; a
    /// negative limit or any non-integer value fails with
    /// [`TrackerError::InvalidQueryParameter`].
    pub fn parse(offset: Option<&str>, limit: Option<&str>) -> Result<Self> {
        let offset = match parse_integer("offset", offset)? {
            Some(value) if value < 0 => 0,
            Some(value) => usize::try_from(value).unwrap_or(usize::MAX),
            None => 0,
        };

        let limit = match parse_integer("limit", limit)? {
            Some(value) if value < 0 => {
                let raw = limit.map(str::trim).unwrap_or_default();
                return Err(TrackerError::invalid_parameter("limit", raw));
            }
            Some(value) => usize::try_from(value).unwrap_or(usize::MAX),
            None => 0,
        };

        Ok(Self { offset, limit })
    }
}

/// Integer query value, saturated at the `i64` range so that an
/// arbitrarily long digit string is still a number.
fn parse_integer(name: &str, raw: Option<&str>) -> Result<Option<i64>> {
    let text = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(text) => text,
    };

    if let Ok(value) = text.parse::<i64>() {
        return Ok(Some(value));
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TrackerError::invalid_parameter(name, text));
    }
    Ok(Some(if negative { i64::MIN } else { i64::MAX }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::Vector3;

    pub(crate) fn sample_ephemeris(count: usize) -> Ephemeris {
        let state_vectors = (0..count)
            .map(|i| {
                let minutes = i * 4;
                StateVector::new(
                    format!("2023-061T{:02}:{:02}:00.000Z", 12 + minutes / 60, minutes % 60),
                    Vector3::new(6778.0, i as f64, 0.0),
                    Vector3::new(0.0, 7.66, 0.0),
                )
                .unwrap()
            })
            .collect();

        let mut header = Block::new();
        header.insert("CCSDS_OEM_VERS".to_string(), "2.0".to_string());
        let mut metadata = Block::new();
        metadata.insert("OBJECT_NAME".to_string(), "ISS".to_string());

        Ephemeris::new(header, metadata, vec!["Source: test".to_string()], state_vectors).unwrap()
    }

    #[test]
    fn test_rejects_empty_dataset() {
        let err = Ephemeris::new(Block::new(), Block::new(), Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err.kind(), "invalid_dataset");
    }

    #[test]
    fn test_rejects_duplicate_and_unordered_epochs() {
        let sv = |epoch: &str| {
            StateVector::new(epoch, Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)).unwrap()
        };

        let duplicate = vec![sv("2023-061T12:00:00.000Z"), sv("2023-061T12:00:00.000Z")];
        assert!(Ephemeris::new(Block::new(), Block::new(), Vec::new(), duplicate).is_err());

        let unordered = vec![sv("2023-061T12:04:00.000Z"), sv("2023-061T12:00:00.000Z")];
        assert!(Ephemeris::new(Block::new(), Block::new(), Vec::new(), unordered).is_err());
    }

    #[test]
    fn test_accepts_sub_second_spacing() {
        let sv = |epoch: &str| {
            StateVector::new(epoch, Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)).unwrap()
        };

        let vectors = vec![
            sv("2023-061T12:00:00.000Z"),
            sv("2023-061T12:00:00.500Z"),
            sv("2023-061T12:00:01.000Z"),
        ];
        let eph = Ephemeris::new(Block::new(), Block::new(), Vec::new(), vectors).unwrap();
        assert_eq!(eph.len(), 3);
        assert!(eph.find_by_epoch("2023-061T12:00:00.500Z").is_ok());

        // Same second, same epoch string: still a duplicate
        let duplicate = vec![sv("2023-061T12:00:00.500Z"), sv("2023-061T12:00:00.500Z")];
        assert!(Ephemeris::new(Block::new(), Block::new(), Vec::new(), duplicate).is_err());

        let unordered = vec![sv("2023-061T12:00:00.500Z"), sv("2023-061T12:00:00.000Z")];
        assert!(Ephemeris::new(Block::new(), Block::new(), Vec::new(), unordered).is_err());
    }

    #[test]
    fn test_find_by_epoch() {
        let eph = sample_ephemeris(5);
        let sv = eph.find_by_epoch("2023-061T12:08:00.000Z").unwrap();
        assert_eq!(sv.position().y, 2.0);

        let err = eph.find_by_epoch("2023-061T12:08:00").unwrap_err();
        assert_eq!(err, TrackerError::EpochNotFound("2023-061T12:08:00".to_string()));
    }

    #[test]
    fn test_list_all_epochs_in_order() {
        let eph = sample_ephemeris(20);
        let epochs = eph.list_epochs(Page::default());
        assert_eq!(epochs.len(), 20);
        let expected: Vec<String> = eph.state_vectors().iter().map(|sv| sv.epoch().to_string()).collect();
        assert_eq!(epochs, expected);
    }

    #[test]
    fn test_list_epochs_windows() {
        let eph = sample_ephemeris(10);
        let all = eph.list_epochs(Page::default());

        for offset in 0..=10 {
            for limit in 0..=12 {
                let page = eph.list_epochs(Page::new(offset, limit));
                let expected_len = if limit == 0 { 10 - offset } else { limit.min(10 - offset) };
                assert_eq!(page.len(), expected_len, "offset={} limit={}", offset, limit);
                assert_eq!(page[..], all[offset..offset + expected_len]);
            }
        }

        assert!(eph.list_epochs(Page::new(11, 0)).is_empty());
        assert!(eph.list_epochs(Page::new(500, 3)).is_empty());
    }

    #[test]
    fn test_page_parse_defaults_and_clamping() {
        assert_eq!(Page::parse(None, None).unwrap(), Page::new(0, 0));
        assert_eq!(Page::parse(Some(""), Some(" ")).unwrap(), Page::new(0, 0));
        assert_eq!(Page::parse(Some("3"), Some("7")).unwrap(), Page::new(3, 7));
        assert_eq!(Page::parse(Some("-4"), Some("2")).unwrap(), Page::new(0, 2));
        assert_eq!(Page::parse(Some("+5"), None).unwrap(), Page::new(5, 0));

        // Digit strings beyond the i64 range saturate instead of failing
        let huge = Page::parse(Some("99999999999999999999"), Some("99999999999999999999")).unwrap();
        assert_eq!(huge, Page::new(usize::MAX, usize::MAX));
        assert_eq!(
            Page::parse(Some("-99999999999999999999"), None).unwrap(),
            Page::new(0, 0)
        );
        assert!(sample_ephemeris(3).list_epochs(huge).is_empty());
    }

    #[test]
    fn test_page_parse_rejects_bad_input() {
        let err = Page::parse(Some("abc"), None).unwrap_err();
        assert_eq!(
            err,
            TrackerError::InvalidQueryParameter {
                name: "offset".to_string(),
                value: "abc".to_string()
            }
        );

        let err = Page::parse(None, Some("1.5")).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidQueryParameter { ref name, .. } if name == "limit"));

        let err = Page::parse(Some("1"), Some("-1")).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidQueryParameter { ref name, .. } if name == "limit"));

        let err = Page::parse(None, Some("-99999999999999999999")).unwrap_err();
        assert_eq!(
            err,
            TrackerError::InvalidQueryParameter {
                name: "limit".to_string(),
                value: "-99999999999999999999".to_string()
            }
        );

        for bad in ["-", "+", "1e3", "12abc", "--1"] {
            assert!(Page::parse(Some(bad), None).is_err(), "{:?} should be rejected", bad);
        }
    }
}
