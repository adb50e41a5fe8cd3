//! View and edit modes for a plan.
//!
//! Entering edit mode copies the plan's spots into a working copy. All
//! timeline operations apply to that copy; cancelling drops it and saving
//! submits it to the backend in a single call. A failed save keeps the
//! working copy so nothing the user did is lost.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{info, warn};

use crate::api::ApiError;
use crate::config::TimelineConfig;
use crate::domain::{
    DomainError, ModeChoice, Plan, PlanId, PlanSpot, PlanSpotId, Spot, estimate_transport_minutes,
};

use super::day::{DayTimeline, TimelineEntry, merge_day, split_day};

/// Persists the spot list of a plan.
///
/// This abstraction allows edit sessions to be tested without a backend.
pub trait PlanStore {
    /// Replace all spots of a plan, returning the plan as stored.
    fn save_spots(
        &self,
        plan_id: &PlanId,
        spots: &[PlanSpot],
    ) -> impl Future<Output = Result<Plan, ApiError>> + Send;
}

/// Unsaved changes to a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingCopy {
    spots: Vec<PlanSpot>,
    /// Modes picked in the selector but not yet written to the spot.
    choices: HashMap<PlanSpotId, ModeChoice>,
    dirty: bool,
}

impl WorkingCopy {
    fn new(plan: &Plan) -> Self {
        Self {
            spots: plan.spots.clone(),
            choices: HashMap::new(),
            dirty: false,
        }
    }

    fn find(&self, day: u32, index: usize) -> Result<&PlanSpot, DomainError> {
        let len = self.spots.iter().filter(|s| s.day == day).count();
        self.spots
            .iter()
            .filter(|s| s.day == day)
            .nth(index)
            .ok_or(DomainError::IndexOutOfRange { index, len })
    }

    /// Spot list as it would be saved, with picked modes written back.
    fn to_submit(&self) -> Vec<PlanSpot> {
        self.spots
            .iter()
            .map(|spot| {
                let mut spot = spot.clone();
                if let Some(choice) = self.choices.get(&spot.id) {
                    spot.transport_mode = Some(choice.to_stored());
                }
                spot
            })
            .collect()
    }
}

/// Editing state of a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    View,
    Edit(WorkingCopy),
}

/// A plan being viewed or edited.
#[derive(Debug)]
pub struct EditSession {
    plan: Plan,
    config: TimelineConfig,
    mode: Mode,
}

impl EditSession {
    /// Open a plan in view mode.
    pub fn new(plan: Plan, config: TimelineConfig) -> Self {
        Self {
            plan,
            config,
            mode: Mode::View,
        }
    }

    /// The plan as last loaded or saved.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Edit(_))
    }

    /// Whether the working copy differs from the plan.
    pub fn is_dirty(&self) -> bool {
        match &self.mode {
            Mode::Edit(copy) => copy.dirty || !copy.choices.is_empty(),
            Mode::View => false,
        }
    }

    /// Spots currently shown: the working copy in edit mode.
    pub fn spots(&self) -> &[PlanSpot] {
        match &self.mode {
            Mode::Edit(copy) => &copy.spots,
            Mode::View => &self.plan.spots,
        }
    }

    /// Switch to edit mode. Does nothing if already editing.
    pub fn enter_edit(&mut self) {
        if !self.is_editing() {
            self.mode = Mode::Edit(WorkingCopy::new(&self.plan));
        }
    }

    /// Drop the working copy and return to view mode.
    pub fn cancel(&mut self) {
        if self.is_dirty() {
            info!(plan = %self.plan.id, "discarding unsaved changes");
        }
        self.mode = Mode::View;
    }

    /// Displayed schedule of one day.
    ///
    /// In edit mode, segments whose mode was changed show the picked mode
    /// and its estimated duration next to the stored one.
    pub fn timeline(&self, day: u32) -> Vec<TimelineEntry> {
        let mut entries = split_day(self.spots(), day).entries(&self.config);

        if let Mode::Edit(copy) = &self.mode {
            let day_spots: Vec<&PlanSpot> = copy.spots.iter().filter(|s| s.day == day).collect();
            for (entry, spot) in entries.iter_mut().zip(day_spots) {
                let (Some(segment), Some(choice)) =
                    (entry.transport.as_mut(), copy.choices.get(&spot.id))
                else {
                    continue;
                };
                segment.mode = *choice;
                segment.estimate =
                    estimate_transport_minutes(spot.transport_mode, spot.transport_duration, *choice);
            }
        }

        entries
    }

    fn working_copy(&mut self) -> Result<&mut WorkingCopy, DomainError> {
        match &mut self.mode {
            Mode::Edit(copy) => Ok(copy),
            Mode::View => Err(DomainError::NotEditing),
        }
    }

    /// Apply `edit` to one day of the working copy.
    ///
    /// The working copy is only updated when `edit` succeeds.
    fn edit_day<R>(
        &mut self,
        day: u32,
        edit: impl FnOnce(&mut DayTimeline, &TimelineConfig) -> Result<R, DomainError>,
    ) -> Result<R, DomainError> {
        self.plan.check_day(day)?;
        let config = self.config.clone();
        let copy = self.working_copy()?;

        let mut timeline = split_day(&copy.spots, day);
        let result = edit(&mut timeline, &config)?;
        merge_day(&mut copy.spots, timeline);
        copy.dirty = true;

        Ok(result)
    }

    /// Move a spot within its day.
    pub fn reorder(&mut self, day: u32, from: usize, to: usize) -> Result<(), DomainError> {
        self.edit_day(day, |timeline, config| timeline.reorder(from, to, config))
    }

    /// Move the spot `moved` to the position of `target` within a day.
    ///
    /// This is how drag-and-drop resolves: the dragged spot lands where the
    /// spot it was dropped on used to be.
    pub fn reorder_by_id(
        &mut self,
        day: u32,
        moved: &PlanSpotId,
        target: &PlanSpotId,
    ) -> Result<(), DomainError> {
        self.edit_day(day, |timeline, config| {
            let from = timeline
                .position(moved)
                .ok_or_else(|| DomainError::UnknownPlanSpot(moved.clone()))?;
            let to = timeline
                .position(target)
                .ok_or_else(|| DomainError::UnknownPlanSpot(target.clone()))?;
            timeline.reorder(from, to, config)
        })
    }

    /// Change how long a visit lasts.
    pub fn set_stay(&mut self, day: u32, index: usize, minutes: u32) -> Result<(), DomainError> {
        self.edit_day(day, |timeline, config| {
            timeline.set_stay(index, minutes, config)
        })
    }

    /// Change the travel time to the next spot.
    pub fn set_transport(
        &mut self,
        day: u32,
        index: usize,
        minutes: u32,
    ) -> Result<(), DomainError> {
        self.edit_day(day, |timeline, config| {
            timeline.set_transport(index, minutes, config)
        })
    }

    /// Remove a spot from its day.
    pub fn remove(&mut self, day: u32, index: usize) -> Result<PlanSpot, DomainError> {
        let removed = self.edit_day(day, |timeline, config| timeline.remove(index, config))?;
        if let Mode::Edit(copy) = &mut self.mode {
            copy.choices.remove(&removed.id);
        }
        Ok(removed)
    }

    /// Append a spot to a day at the default time for new spots.
    pub fn add_spot(&mut self, day: u32, spot: Spot) -> Result<PlanSpotId, DomainError> {
        let id = next_plan_spot_id();
        self.edit_day(day, |timeline, config| {
            Ok(timeline.push(id, spot, config).id.clone())
        })
    }

    /// Append lodging to the end of a day.
    pub fn add_lodging(&mut self, day: u32, spot: Spot) -> Result<PlanSpotId, DomainError> {
        let id = next_plan_spot_id();
        self.edit_day(day, |timeline, config| {
            Ok(timeline.push_lodging(id, spot, config).id.clone())
        })
    }

    /// Pick a transport mode in the selector for the segment leaving a spot.
    ///
    /// Returns the estimated duration for the picked mode. The stored
    /// duration is not changed; see [`EditSession::accept_estimate`].
    pub fn choose_mode(
        &mut self,
        day: u32,
        index: usize,
        choice: ModeChoice,
    ) -> Result<Option<u32>, DomainError> {
        self.plan.check_day(day)?;
        let copy = self.working_copy()?;
        let spot = copy.find(day, index)?;

        let estimate =
            estimate_transport_minutes(spot.transport_mode, spot.transport_duration, choice);
        let id = spot.id.clone();

        if choice == spot.mode_choice() {
            copy.choices.remove(&id);
        } else {
            copy.choices.insert(id, choice);
        }

        Ok(estimate)
    }

    /// Store the picked mode and its estimated duration on the spot.
    ///
    /// Returns the new duration, or `None` when there was nothing to
    /// estimate from, in which case only the mode is stored.
    pub fn accept_estimate(&mut self, day: u32, index: usize) -> Result<Option<u32>, DomainError> {
        self.plan.check_day(day)?;
        let copy = self.working_copy()?;
        let spot = copy.find(day, index)?;

        let Some(choice) = copy.choices.get(&spot.id).copied() else {
            return Ok(None);
        };
        let estimate =
            estimate_transport_minutes(spot.transport_mode, spot.transport_duration, choice);
        let id = spot.id.clone();

        self.edit_day(day, |timeline, config| {
            if let Some(minutes) = estimate {
                timeline.set_transport(index, minutes, config)?;
            }
            timeline.set_transport_mode(index, choice.to_stored())
        })?;

        if let Mode::Edit(copy) = &mut self.mode {
            copy.choices.remove(&id);
        }
        Ok(estimate)
    }

    /// Submit the working copy to the backend.
    ///
    /// On success the stored plan replaces the local one and the session
    /// returns to view mode. On failure the working copy is kept and the
    /// session stays in edit mode.
    pub async fn save<S: PlanStore>(&mut self, store: &S) -> Result<&Plan, ApiError> {
        let spots = match &self.mode {
            Mode::Edit(copy) => copy.to_submit(),
            Mode::View => return Err(DomainError::NotEditing.into()),
        };

        match store.save_spots(&self.plan.id, &spots).await {
            Ok(saved) => {
                info!(plan = %saved.id, spots = saved.spots.len(), "saved plan");
                self.plan = saved;
                self.mode = Mode::View;
                Ok(&self.plan)
            }
            Err(e) => {
                warn!(plan = %self.plan.id, error = %e, "save failed, keeping local edits");
                Err(e)
            }
        }
    }
}

static NEXT_SEQ: AtomicU32 = AtomicU32::new(0);

/// Fresh id for a spot occurrence that has not been saved yet.
fn next_plan_spot_id() -> PlanSpotId {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
    PlanSpotId::new(format!("new_{millis}_{seq}"))
}
