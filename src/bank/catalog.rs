use super::{Bank, BankError};
use crate::handoff::GameRef;
use itertools::Itertools;

/// One embedded bank as listed in the catalog, without its questions.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub audience: String,
    pub sequence: u32,
    pub path: String,
    pub questions: usize,
}

impl CatalogEntry {
    fn from_bank(bank: &Bank) -> Self {
        Self {
            id: bank.id.clone(),
            title: bank.title.clone(),
            topic: bank.topic.clone(),
            audience: bank.audience.clone(),
            sequence: bank.sequence,
            path: format!("{}/{}/{}", bank.topic, bank.audience, bank.id),
            questions: bank.len(),
        }
    }
}

/// The ordered list of embedded banks. Banks that share a topic and
/// audience form a track, played in `sequence` order; `next_after`
/// chains a finished bank to the next one on its track.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn embedded() -> Result<Self, BankError> {
        let entries = Bank::load_all()?
            .iter()
            .map(CatalogEntry::from_bank)
            .sorted_by_key(|e| (e.topic.clone(), e.audience.clone(), e.sequence))
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn find(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The entry that follows `id` on the same track, if any.
    pub fn next_after(&self, id: &str) -> Option<GameRef> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        let current = &self.entries[pos];
        let next = self.entries.get(pos + 1)?;
        if next.topic == current.topic && next.audience == current.audience {
            Some(GameRef {
                id: next.id.clone(),
                path: next.path.clone(),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_embedded_bank() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.entries().len(), Bank::embedded_ids().len());
        assert!(catalog.find("finance-kids-spending").is_some());
    }

    #[test]
    fn tracks_are_ordered_by_sequence() {
        let catalog = Catalog::embedded().unwrap();
        let finance_kids: Vec<_> = catalog
            .entries()
            .iter()
            .filter(|e| e.topic == "finance" && e.audience == "kids")
            .collect();
        for pair in finance_kids.windows(2) {
            assert!(pair[0].sequence <= pair[1].sequence);
        }
    }

    #[test]
    fn next_after_chains_within_a_track() {
        let catalog = Catalog::embedded().unwrap();
        let next = catalog.next_after("finance-kids-spending").unwrap();
        assert_eq!(next.id, "finance-kids-saving");
        assert_eq!(next.path, "finance/kids/finance-kids-saving");
    }

    #[test]
    fn next_after_stops_at_the_end_of_a_track() {
        let catalog = Catalog::embedded().unwrap();
        // Last bank on the finance/kids track.
        assert_eq!(catalog.next_after("finance-kids-reflex"), None);
        assert_eq!(catalog.next_after("no-such-bank"), None);
    }
}
