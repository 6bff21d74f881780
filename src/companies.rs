use std::collections::HashMap;

/// Read-only mapping from ship-to-party codes to company display names.
///
/// Built once at startup and handed to the normalizer, so tests (and
/// deployments with a different customer set) can swap the table without
/// touching global state.
pub(crate) struct CompanyDirectory {
    names: HashMap<i64, String>,
}

impl CompanyDirectory {
    /// The customer codes the daily report currently tracks.
    pub(crate) fn builtin() -> Self {
        Self::from_pairs([
            (4000068001, "KUTCH"),
            (4000068002, "CHEMIE"),
            (4000068014, "DEEPAK"),
            (4000068027, "AARTI"),
            (4000068033, "ATUL"),
            (4000068041, "TRANSPEK"),
            (4000068056, "BODAL"),
        ])
    }

    pub(crate) fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(code, name)| (code, name.into()))
                .collect(),
        }
    }

    pub(crate) fn name_for(&self, ship_to_party: i64) -> Option<String> {
        self.names.get(&ship_to_party).cloned()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_lookup_hit() {
        let dir = CompanyDirectory::builtin();
        assert_eq!(dir.name_for(4000068001).unwrap(), "KUTCH");
    }

    #[test]
    fn test_lookup_miss() {
        let dir = CompanyDirectory::builtin();
        assert!(dir.name_for(1).is_none());
    }

    #[test]
    fn test_from_pairs_overrides_builtin() {
        let dir = CompanyDirectory::from_pairs([(42, "TESTCO")]);
        assert_eq!(dir.name_for(42).unwrap(), "TESTCO");
        assert!(dir.name_for(4000068001).is_none());
    }
}
