//! Daily mood flow for a signed-in patient.
//!
//! `MoodTracker` sits on top of the API client. It loads the rating range and
//! history together, checks a rating against the range before sending it,
//! and allows at most one mutation in flight: a second submit while the
//! first is pending fails with `ApiError::SubmitInProgress`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::models::{MessageResponse, Mood, MoodResponse, RateRange, ServerReply};

#[derive(Debug, Clone)]
pub struct MoodOverview {
    pub range: RateRange,
    pub moods: Vec<Mood>,
    pub today_tracked: bool,
    pub today_mood: Option<Mood>,
}

/// Clears the in-flight flag when dropped, whether the request succeeded or not
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ApiError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(flag))
            .map_err(|_| ApiError::SubmitInProgress)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct MoodTracker {
    api: ApiClient,
    range: Arc<Mutex<RateRange>>,
    in_flight: Arc<AtomicBool>,
}

impl MoodTracker {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            range: Arc::new(Mutex::new(RateRange::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The last rating range published by the server (1..=10 until loaded)
    pub fn range(&self) -> RateRange {
        *self.range.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Fetch config and history concurrently
    pub async fn load(&self) -> Result<MoodOverview> {
        let moods_api = self.api.moods();
        let (config, history) = futures::try_join!(moods_api.get_config(), moods_api.get_all())?;
        let config = config.check()?;
        let history = history.check()?;

        let range = config.config.map(|c| c.rate).unwrap_or_default();
        *self.range.lock().unwrap_or_else(PoisonError::into_inner) = range;
        debug!(min = range.min, max = range.max, entries = history.moods.len(), "Loaded moods");

        Ok(MoodOverview {
            range,
            moods: history.moods,
            today_tracked: history.today_tracked,
            today_mood: history.today_mood,
        })
    }

    /// Record today's mood
    pub async fn submit(&self, rate: u8) -> Result<Mood> {
        self.validate(rate)?;
        let _guard = InFlight::acquire(&self.in_flight)?;
        let reply = self.api.moods().add(rate).await?.check()?;
        Self::returned_mood(reply)
    }

    /// Replace today's mood
    pub async fn amend(&self, rate: u8) -> Result<Mood> {
        self.validate(rate)?;
        let _guard = InFlight::acquire(&self.in_flight)?;
        let reply = self.api.moods().update(rate).await?.check()?;
        Self::returned_mood(reply)
    }

    /// Delete today's mood
    pub async fn clear_today(&self) -> Result<MessageResponse> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        Ok(self.api.moods().remove().await?.check()?)
    }

    fn validate(&self, rate: u8) -> Result<(), ApiError> {
        let range = self.range();
        if range.contains(rate) {
            Ok(())
        } else {
            Err(ApiError::InvalidRate {
                rate,
                min: range.min,
                max: range.max,
            })
        }
    }

    fn returned_mood(reply: MoodResponse) -> Result<Mood> {
        reply
            .mood
            .ok_or_else(|| anyhow::Error::from(ApiError::InvalidResponse("mood reply has no mood".to_string())))
    }
}
