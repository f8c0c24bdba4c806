use super::{ConeBlock, ConeKind, ConeSpecError};
use std::collections::{BTreeMap, HashMap};

/// Mapping from cone kind to the number of constraint rows it covers.
///
/// ```
/// use cosmo::cones::ConeSpec;
///
/// let cone = ConeSpec::from_pairs([("f", 1), ("l", 6)]).unwrap();
/// assert_eq!(cone.total_rows(), Some(7));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConeSpec {
    // BTreeMap ordering on ConeKind is the canonical row order
    sizes: BTreeMap<ConeKind, usize>,
}

impl ConeSpec {
    /// An empty specification, covering zero rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a specification from `(key, size)` pairs such as `("l", 6)`.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, ConeSpecError>
    where
        I: IntoIterator<Item = (K, usize)>,
        K: AsRef<str>,
    {
        let mut spec = Self::new();
        for (key, size) in pairs {
            spec.insert(key.as_ref().parse()?, size)?;
        }
        Ok(spec)
    }

    /// Add rows for one cone kind.  Each kind may appear only once.
    pub fn insert(&mut self, kind: ConeKind, size: usize) -> Result<(), ConeSpecError> {
        kind.check_size(size)?;
        if self.sizes.contains_key(&kind) {
            return Err(ConeSpecError::Duplicate(kind));
        }
        self.sizes.insert(kind, size);
        Ok(())
    }

    /// Builder style version of [`insert`](ConeSpec::insert).
    pub fn with(mut self, kind: ConeKind, size: usize) -> Result<Self, ConeSpecError> {
        self.insert(kind, size)?;
        Ok(self)
    }

    /// Rows assigned to `kind`, zero if absent
    pub fn get(&self, kind: ConeKind) -> usize {
        self.sizes.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of rows covered by all cones, or `None` if the sum
    /// does not fit in a `usize`
    pub fn total_rows(&self) -> Option<usize> {
        self.sizes
            .values()
            .try_fold(0usize, |acc, &size| acc.checked_add(size))
    }

    /// (kind, size) entries in canonical row order
    pub fn iter(&self) -> impl Iterator<Item = (ConeKind, usize)> + '_ {
        self.sizes.iter().map(|(&k, &s)| (k, s))
    }

    /// Check that the cones exactly cover `m` constraint rows
    pub fn check_rows(&self, m: usize) -> Result<(), ConeSpecError> {
        let found = self.total_rows().ok_or(ConeSpecError::RowOverflow)?;
        if found != m {
            return Err(ConeSpecError::RowCount { expected: m, found });
        }
        Ok(())
    }

    /// Individual cones in row order.
    ///
    /// Exponential kinds are split into one block per three rows and
    /// empty entries are dropped.
    pub fn blocks(&self) -> Vec<ConeBlock> {
        let mut blocks = Vec::new();
        for (kind, size) in self.iter().filter(|&(_, s)| s > 0) {
            match kind {
                ConeKind::Exponential | ConeKind::DualExponential => {
                    blocks.extend((0..size / 3).map(|_| ConeBlock { kind, dim: 3 }));
                }
                _ => blocks.push(ConeBlock { kind, dim: size }),
            }
        }
        blocks
    }
}

impl TryFrom<&HashMap<String, usize>> for ConeSpec {
    type Error = ConeSpecError;

    fn try_from(map: &HashMap<String, usize>) -> Result<Self, Self::Error> {
        ConeSpec::from_pairs(map.iter().map(|(k, &v)| (k, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let spec = ConeSpec::from_pairs([("l", 4), ("ep", 6), ("f", 2)]).unwrap();
        let kinds: Vec<ConeKind> = spec.iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![ConeKind::Zero, ConeKind::Nonnegative, ConeKind::Exponential]
        );
        assert_eq!(spec.total_rows(), Some(12));
    }

    #[test]
    fn test_blocks() {
        let spec = ConeSpec::from_pairs([("q", 3), ("ep", 6), ("l", 0), ("f", 1)]).unwrap();
        assert_eq!(
            spec.blocks(),
            vec![
                ConeBlock { kind: ConeKind::Zero, dim: 1 },
                ConeBlock { kind: ConeKind::SecondOrder, dim: 3 },
                ConeBlock { kind: ConeKind::Exponential, dim: 3 },
                ConeBlock { kind: ConeKind::Exponential, dim: 3 },
            ]
        );
    }

    #[test]
    fn test_bad_entries() {
        assert_eq!(
            ConeSpec::from_pairs([("f", 1), ("z", 2)]),
            Err(ConeSpecError::Duplicate(ConeKind::Zero))
        );
        assert!(matches!(
            ConeSpec::from_pairs([("s", 4)]),
            Err(ConeSpecError::BadSize { kind: ConeKind::PsdTriangle, .. })
        ));
        assert!(matches!(
            ConeSpec::from_pairs([("ed", 4)]),
            Err(ConeSpecError::BadSize { kind: ConeKind::DualExponential, .. })
        ));
        assert!(ConeSpec::from_pairs([("s", 6)]).is_ok());
    }

    #[test]
    fn test_check_rows() {
        let spec = ConeSpec::new().with(ConeKind::Nonnegative, 6).unwrap();
        assert!(spec.check_rows(6).is_ok());
        assert_eq!(
            spec.check_rows(5),
            Err(ConeSpecError::RowCount { expected: 5, found: 6 })
        );
    }

    #[test]
    fn test_check_rows_overflow() {
        let spec = ConeSpec::from_pairs([("l", usize::MAX), ("f", 1)]).unwrap();
        assert_eq!(spec.total_rows(), None);
        assert_eq!(spec.check_rows(6), Err(ConeSpecError::RowOverflow));

        let spec = ConeSpec::from_pairs([("l", usize::MAX)]).unwrap();
        assert_eq!(
            spec.check_rows(6),
            Err(ConeSpecError::RowCount { expected: 6, found: usize::MAX })
        );
    }

    #[test]
    fn test_from_hashmap() {
        let mut map = HashMap::new();
        map.insert("l".to_string(), 6);
        let spec = ConeSpec::try_from(&map).unwrap();
        assert_eq!(spec.get(ConeKind::Nonnegative), 6);
        assert_eq!(spec.get(ConeKind::Zero), 0);
    }
}
