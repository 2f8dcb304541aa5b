//! What-if editing of scores.
//!
//! [`SimulationController`] owns a transcript and the report derived from it.
//! While simulating, edits are kept as overrides on top of the transcript and
//! every edit reruns the whole pipeline; leaving the session drops them all.

use crate::analyzers::analyzer::{Overrides, analyze};
use crate::analyzers::normalize::ScoreNormalizer;
use crate::analyzers::types::TranscriptReport;
use crate::config::RaterConfig;
use crate::transcript::{CourseId, RawScore, Transcript};
use anyhow::{Result, anyhow, bail};
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Normal,
    Simulating,
}

/// Overrides for one editing session, plus the scores they started from.
#[derive(Debug, Default)]
struct Session {
    baseline: HashMap<CourseId, RawScore>,
    overrides: Overrides,
}

pub struct SimulationController<'t> {
    transcript: Transcript,
    config: RaterConfig,
    normalizer: ScoreNormalizer<'t>,
    session: Option<Session>,
    report: TranscriptReport,
}

impl<'t> SimulationController<'t> {
    /// Takes ownership of a transcript and computes its initial report.
    pub fn new(transcript: Transcript, config: RaterConfig, normalizer: ScoreNormalizer<'t>) -> Self {
        let report = analyze(&transcript, &Overrides::new(), &normalizer, &config);
        Self {
            transcript,
            config,
            normalizer,
            session: None,
            report,
        }
    }

    pub fn state(&self) -> SimulationState {
        if self.session.is_some() {
            SimulationState::Simulating
        } else {
            SimulationState::Normal
        }
    }

    /// The report of the last completed pass.
    pub fn report(&self) -> &TranscriptReport {
        &self.report
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn config(&self) -> &RaterConfig {
        &self.config
    }

    /// Score a course had when the session started.
    pub fn baseline(&self, course: CourseId) -> Option<&RawScore> {
        self.session.as_ref()?.baseline.get(&course)
    }

    /// Raw score currently in effect for a course.
    pub fn current_score(&self, course: CourseId) -> Option<&RawScore> {
        if let Some(value) = self.session.as_ref().and_then(|s| s.overrides.get(&course)) {
            return Some(value);
        }
        self.transcript.course(course).map(|c| &c.score)
    }

    pub fn override_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.overrides.len())
    }

    pub fn enter_simulation(&mut self) -> Result<&TranscriptReport> {
        if self.session.is_some() {
            bail!("already simulating");
        }

        let baseline = self
            .transcript
            .course_ids()
            .filter_map(|id| self.transcript.course(id).map(|c| (id, c.score.clone())))
            .collect::<HashMap<_, _>>();

        info!(courses = baseline.len(), "Simulation started");
        self.session = Some(Session {
            baseline,
            overrides: Overrides::new(),
        });
        Ok(self.recompute())
    }

    /// Replaces one course's raw score and recomputes everything.
    pub fn apply_edit(&mut self, course: CourseId, value: impl Into<RawScore>) -> Result<&TranscriptReport> {
        let value = value.into();
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| anyhow!("edits are only accepted while simulating"))?;
        if !session.baseline.contains_key(&course) {
            bail!("unknown course {course}");
        }

        debug!(%course, value = %value, "Applying edit");
        session.overrides.insert(course, value);
        Ok(self.recompute())
    }

    /// Drops the override for one course, restoring its baseline score.
    pub fn revert(&mut self, course: CourseId) -> Result<&TranscriptReport> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| anyhow!("nothing to revert outside a simulation"))?;
        if !session.baseline.contains_key(&course) {
            bail!("unknown course {course}");
        }

        session.overrides.remove(&course);
        Ok(self.recompute())
    }

    pub fn exit_simulation(&mut self) -> Result<&TranscriptReport> {
        let session = self.session.take().ok_or_else(|| anyhow!("not simulating"))?;
        info!(discarded = session.overrides.len(), "Simulation ended");
        Ok(self.recompute())
    }

    /// Switches the presentation scale and recomputes.
    pub fn set_use_gpa_scale(&mut self, use_gpa_scale: bool) -> &TranscriptReport {
        self.config.use_gpa_scale = use_gpa_scale;
        self.recompute()
    }

    /// Runs a full pass and only then swaps the new report in.
    fn recompute(&mut self) -> &TranscriptReport {
        let empty = Overrides::new();
        let overrides = self.session.as_ref().map_or(&empty, |s| &s.overrides);
        let next = analyze(&self.transcript, overrides, &self.normalizer, &self.config);
        self.report = next;
        &self.report
    }
}
