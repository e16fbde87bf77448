//! Stored play state per date, with one-time migration of legacy keys.
//!
//! Lookup for a date checks the canonical key first. If nothing is stored
//! there, each legacy spelling is probed in order and the first one holding
//! answers is copied (answers, and correctness when present) to the canonical
//! slots. Once the canonical answers exist, legacy keys are never read again
//! for that date.

use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::datekey::{canonical_key, DateKeys};
use crate::error::StoreError;
use crate::model::{AnswerSet, CorrectnessSet, OverturnSet};
use crate::store::{decode, encode, KeyValueStore, Slot};

/// What is stored for a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRecord {
    pub answers: AnswerSet,
    /// Absent when a legacy record carried answers only.
    pub correct: Option<CorrectnessSet>,
    pub overturns: OverturnSet,
    /// The legacy key this record was migrated from during this lookup.
    pub migrated_from: Option<String>,
}

impl PlayRecord {
    pub fn is_overturned(&self, index: usize) -> bool {
        self.overturns.get(index).copied().unwrap_or(false)
    }
}

/// Per-date play history on top of a [`KeyValueStore`].
#[derive(Debug)]
pub struct History<S> {
    store: S,
}

impl<S: KeyValueStore> History<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &str, slot: Slot) -> Result<Option<T>, StoreError> {
        match self.store.get(&slot.key(key))? {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn entry<T: Serialize>(
        key: &str,
        slot: Slot,
        value: &T,
    ) -> Result<(String, String), StoreError> {
        Ok((slot.key(key), encode(value)?))
    }

    /// Load the stored record for `date`, migrating a legacy record to the
    /// canonical key on first access.
    ///
    /// Returns `Ok(None)` when the date has never been played.
    pub fn resolve(&mut self, date: NaiveDate) -> Result<Option<PlayRecord>, StoreError> {
        let keys = DateKeys::for_date(date);

        let mut migrated_from = None;
        let answers = match self.read::<AnswerSet>(&keys.canonical, Slot::Answers)? {
            Some(answers) => Some(answers),
            None => {
                let found = self.migrate(&keys)?;
                if let Some((legacy, answers)) = found {
                    migrated_from = Some(legacy);
                    Some(answers)
                } else {
                    None
                }
            }
        };

        let Some(answers) = answers else {
            return Ok(None);
        };

        let correct = self.read(&keys.canonical, Slot::Correct)?;
        let overturns = self
            .read(&keys.canonical, Slot::Overturns)?
            .unwrap_or_default();

        Ok(Some(PlayRecord {
            answers,
            correct,
            overturns,
            migrated_from,
        }))
    }

    fn migrate(&mut self, keys: &DateKeys) -> Result<Option<(String, AnswerSet)>, StoreError> {
        for legacy in &keys.legacy {
            let answers = match self.read::<AnswerSet>(legacy, Slot::Answers) {
                Ok(Some(answers)) => answers,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("ignoring unreadable legacy answers under {legacy}: {e}");
                    continue;
                }
            };

            let mut entries = vec![Self::entry(&keys.canonical, Slot::Answers, &answers)?];
            match self.read::<CorrectnessSet>(legacy, Slot::Correct) {
                Ok(Some(correct)) => {
                    entries.push(Self::entry(&keys.canonical, Slot::Correct, &correct)?)
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("ignoring unreadable legacy correctness under {legacy}: {e}"),
            }
            self.store.set_many(&entries)?;

            tracing::info!("migrated stored answers from {legacy} to {}", keys.canonical);
            return Ok(Some((legacy.clone(), answers)));
        }
        Ok(None)
    }

    /// Whether answers are stored for `date` under its canonical key.
    pub fn has_canonical(&self, date: NaiveDate) -> Result<bool, StoreError> {
        let key = Slot::Answers.key(&canonical_key(date));
        Ok(self.store.get(&key)?.is_some())
    }

    /// Persist a submission. Answers and correctness are written together.
    pub fn save_submission(
        &mut self,
        date: NaiveDate,
        answers: &[String],
        correct: &[bool],
    ) -> Result<(), StoreError> {
        let key = canonical_key(date);
        self.store.set_many(&[
            Self::entry(&key, Slot::Answers, &answers)?,
            Self::entry(&key, Slot::Correct, &correct)?,
        ])?;
        tracing::debug!("saved submission under {key}");
        Ok(())
    }

    /// Persist overturns together with the merged correctness they imply.
    pub fn save_overturns(
        &mut self,
        date: NaiveDate,
        overturns: &[bool],
        correct: &[bool],
    ) -> Result<(), StoreError> {
        let key = canonical_key(date);
        self.store.set_many(&[
            Self::entry(&key, Slot::Overturns, &overturns)?,
            Self::entry(&key, Slot::Correct, &correct)?,
        ])
    }

    /// Number of correct answers stored for `date`, probing the canonical
    /// key and then every legacy spelling. Does not migrate.
    pub fn correct_count(&self, date: NaiveDate) -> Result<Option<usize>, StoreError> {
        let keys = DateKeys::for_date(date);
        for key in std::iter::once(&keys.canonical).chain(keys.legacy.iter()) {
            match self.read::<CorrectnessSet>(key, Slot::Correct) {
                Ok(Some(correct)) => return Ok(Some(correct.iter().filter(|&&c| c).count())),
                Ok(None) => {}
                Err(e) if *key == keys.canonical => return Err(e),
                Err(e) => tracing::warn!("ignoring unreadable legacy correctness under {key}: {e}"),
            }
        }
        Ok(None)
    }

    /// Correct counts for the `days` days ending at `today`, oldest first,
    /// keyed by canonical key. Unplayed days count as zero.
    pub fn daily_correct(
        &self,
        today: NaiveDate,
        days: u32,
    ) -> Result<Vec<(String, usize)>, StoreError> {
        (0..days)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(i64::from(offset));
                let count = self.correct_count(date)?.unwrap_or(0);
                Ok((canonical_key(date), count))
            })
            .collect()
    }
}
