//! The schedule of a single day.
//!
//! A [`DayTimeline`] owns the spots of one day in visiting order. Start
//! times are chained from the day anchor: each spot starts when the previous
//! one ends plus the travel time leaving it. Every operation keeps the other
//! days of the plan untouched; see [`split_day`] and [`merge_day`].

use tracing::debug;

use crate::config::TimelineConfig;
use crate::domain::{
    ClockTime, DomainError, ModeChoice, PlanSpot, PlanSpotId, Spot, TransportMode, validate_stay,
    validate_transport,
};

/// Note attached to lodging added through [`DayTimeline::push_lodging`].
pub const LODGING_NOTE: &str = "stay";

/// When a spot's visit ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndTime {
    /// A clock time on the schedule.
    At(ClockTime),
    /// Lodging runs until the following morning.
    NextDay,
}

/// Travel from one spot to the next within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSegment {
    pub mode: ModeChoice,
    pub minutes: u32,
    /// The spot has no stored duration and the default was used.
    pub assumed: bool,
    /// Duration estimated for a mode picked but not yet accepted.
    pub estimate: Option<u32>,
}

/// Derived view of one spot on the schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub id: PlanSpotId,
    pub name: String,
    pub start: ClockTime,
    pub end: EndTime,
    pub stay_minutes: u32,
    /// Travel to the next spot; `None` for the last spot of the day.
    pub transport: Option<TransportSegment>,
    /// Starts before the previous spot of the day.
    pub out_of_order: bool,
}

/// Ordered spots of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTimeline {
    day: u32,
    spots: Vec<PlanSpot>,
}

impl DayTimeline {
    /// Wrap spots that all belong to `day`, keeping their order.
    pub fn new(day: u32, spots: Vec<PlanSpot>) -> Self {
        debug_assert!(spots.iter().all(|s| s.day == day));
        Self { day, spots }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn spots(&self) -> &[PlanSpot] {
        &self.spots
    }

    pub fn into_spots(self) -> Vec<PlanSpot> {
        self.spots
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Position of a spot occurrence within the day.
    pub fn position(&self, id: &PlanSpotId) -> Option<usize> {
        self.spots.iter().position(|s| &s.id == id)
    }

    fn check_index(&self, index: usize) -> Result<(), DomainError> {
        if index < self.spots.len() {
            Ok(())
        } else {
            Err(DomainError::IndexOutOfRange {
                index,
                len: self.spots.len(),
            })
        }
    }

    /// Minutes from the start of spot `index` to the start of the next one.
    fn step_after(&self, index: usize, config: &TimelineConfig) -> u32 {
        let spot = &self.spots[index];
        spot.stay_minutes()
            + spot
                .transport_duration
                .unwrap_or(config.default_transport_minutes)
    }

    /// Reassign every start time from the day anchor.
    pub fn recompute(&mut self, config: &TimelineConfig) {
        let mut start = config.day_anchor;
        for i in 0..self.spots.len() {
            self.spots[i].start_time = Some(start);
            start = start + self.step_after(i, config);
        }
    }

    /// Reassign start times after position `index`, leaving `0..=index` as
    /// stored.
    ///
    /// Falls back to a full recompute when any of the kept spots has no
    /// start time to chain from.
    pub fn recompute_after(&mut self, index: usize, config: &TimelineConfig) {
        if index >= self.spots.len() {
            return;
        }
        if self.spots[..=index].iter().any(|s| s.start_time.is_none()) {
            self.recompute(config);
            return;
        }

        for i in index + 1..self.spots.len() {
            let prev_start = self.spots[i - 1].start_time.unwrap_or(config.day_anchor);
            self.spots[i].start_time = Some(prev_start + self.step_after(i - 1, config));
        }
    }

    /// Move the spot at `from` to position `to`, then recompute the day.
    ///
    /// Out-of-range positions leave the day unchanged.
    pub fn reorder(
        &mut self,
        from: usize,
        to: usize,
        config: &TimelineConfig,
    ) -> Result<(), DomainError> {
        self.check_index(from)?;
        self.check_index(to)?;

        let spot = self.spots.remove(from);
        self.spots.insert(to, spot);
        debug!(day = self.day, from, to, "reordered spot");

        self.recompute(config);
        Ok(())
    }

    /// Change how long the visit at `index` lasts.
    pub fn set_stay(
        &mut self,
        index: usize,
        minutes: u32,
        config: &TimelineConfig,
    ) -> Result<(), DomainError> {
        self.check_index(index)?;
        let minutes = validate_stay(minutes)?;

        self.spots[index].spot.duration_minutes = minutes;
        self.recompute_after(index, config);
        Ok(())
    }

    /// Change the travel time from the spot at `index` to the next one.
    pub fn set_transport(
        &mut self,
        index: usize,
        minutes: u32,
        config: &TimelineConfig,
    ) -> Result<(), DomainError> {
        self.check_index(index)?;
        let minutes = validate_transport(minutes)?;

        self.spots[index].transport_duration = Some(minutes);
        self.recompute_after(index, config);
        Ok(())
    }

    /// Store the transport mode of the segment leaving `index`.
    ///
    /// Durations and start times are not touched.
    pub fn set_transport_mode(
        &mut self,
        index: usize,
        mode: TransportMode,
    ) -> Result<(), DomainError> {
        self.check_index(index)?;
        self.spots[index].transport_mode = Some(mode);
        Ok(())
    }

    /// Remove the spot at `index` and recompute the rest of the day.
    pub fn remove(&mut self, index: usize, config: &TimelineConfig) -> Result<PlanSpot, DomainError> {
        self.check_index(index)?;

        let removed = self.spots.remove(index);
        self.recompute(config);
        Ok(removed)
    }

    /// Append a spot at the default time for newly added spots.
    ///
    /// The rest of the day is not recomputed; the user positions the new
    /// spot by reordering.
    pub fn push(&mut self, id: PlanSpotId, spot: Spot, config: &TimelineConfig) -> &PlanSpot {
        let mut added = PlanSpot::new(id.as_str(), spot, self.day);
        added.start_time = Some(config.added_spot_time);
        self.push_spot(added)
    }

    /// Append lodging starting when the day's last visit ends.
    pub fn push_lodging(&mut self, id: PlanSpotId, spot: Spot, config: &TimelineConfig) -> &PlanSpot {
        let start = match self.spots.last() {
            Some(last) => last.start_time.unwrap_or(config.day_anchor) + last.stay_minutes(),
            None => config.lodging_fallback_start,
        };

        let mut added = PlanSpot::new(id.as_str(), spot, self.day)
            .with_start(start)
            .with_transport(TransportMode::Walk, 0);
        added.note = Some(LODGING_NOTE.to_string());
        self.push_spot(added)
    }

    fn push_spot(&mut self, spot: PlanSpot) -> &PlanSpot {
        debug!(day = self.day, id = %spot.id, "added spot");
        let index = self.spots.len();
        self.spots.push(spot);
        &self.spots[index]
    }

    /// Derive the displayed schedule.
    ///
    /// Entries follow visiting order, so indices match the editing
    /// operations. Stored start times are shown as they are; spots without
    /// one get the time the chaining rule would give them. A spot added with
    /// [`push`](Self::push) stays last at its default time and is flagged
    /// `out_of_order` when that is earlier than the spot before it, until the
    /// day is reordered or recomputed.
    pub fn entries(&self, config: &TimelineConfig) -> Vec<TimelineEntry> {
        let mut entries: Vec<TimelineEntry> = Vec::with_capacity(self.spots.len());
        let mut expected = config.day_anchor;

        for (i, spot) in self.spots.iter().enumerate() {
            let start = spot.start_time.unwrap_or(expected);
            let stay = spot.stay_minutes();

            let end = if spot.is_lodging() {
                EndTime::NextDay
            } else {
                EndTime::At(start + stay)
            };

            let transport = (i + 1 < self.spots.len()).then(|| TransportSegment {
                mode: spot.mode_choice(),
                minutes: spot
                    .transport_duration
                    .unwrap_or(config.default_transport_minutes),
                assumed: spot.transport_duration.is_none(),
                estimate: None,
            });
            let out_of_order = entries.last().is_some_and(|prev| start < prev.start);

            entries.push(TimelineEntry {
                id: spot.id.clone(),
                name: spot.spot.name.clone(),
                start,
                end,
                stay_minutes: stay,
                transport,
                out_of_order,
            });

            expected = start + self.step_after(i, config);
        }

        entries
    }
}

/// Take the spots of `day` out of a plan's spot list, in order.
pub fn split_day(spots: &[PlanSpot], day: u32) -> DayTimeline {
    DayTimeline::new(
        day,
        spots.iter().filter(|s| s.day == day).cloned().collect(),
    )
}

/// Write a day back into a plan's spot list.
///
/// The day's spots fill the slots its previous spots occupied; removed
/// spots free their slot and added spots go at the end. Spots of other
/// days keep their positions.
pub fn merge_day(spots: &mut Vec<PlanSpot>, timeline: DayTimeline) {
    let day = timeline.day;
    let mut replacement = timeline.spots.into_iter();

    let mut merged = Vec::with_capacity(spots.len());
    for spot in spots.drain(..) {
        if spot.day != day {
            merged.push(spot);
        } else if let Some(next) = replacement.next() {
            merged.push(next);
        }
    }
    merged.extend(replacement);

    *spots = merged;
}
