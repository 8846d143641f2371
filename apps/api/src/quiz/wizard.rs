//! Quiz wizard, a linear step machine over accumulated answers.
//!
//! States are the steps `1..=TOTAL_STEPS`. Every forward transition is gated by
//! the step's schema; validation always runs before the step counter moves and
//! before anything is handed to the inference pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::quiz::models::QuizAnswers;
use crate::quiz::validation::{step_schema, FieldErrors, StepSchema, QUIZ_STEPS};

pub const TOTAL_STEPS: u8 = QUIZ_STEPS.len() as u8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error("step {step} has {} invalid field(s)", errors.len())]
    Invalid { step: u8, errors: FieldErrors },

    #[error("submission is only allowed from step {TOTAL_STEPS} (current step {current})")]
    NotAtFinalStep { current: u8 },

    #[error("a submission for this quiz is already in progress")]
    SubmissionInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Advanced,
    AlreadyAtEnd,
    Retreated,
    AlreadyAtStart,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    id: Uuid,
    step: u8,
    answers: QuizAnswers,
    errors: FieldErrors,
    submitting: bool,
    created_at: DateTime<Utc>,
}

/// Snapshot returned to clients after every operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub id: Uuid,
    pub step: u8,
    pub total_steps: u8,
    pub schema: StepSchema,
    pub answers: QuizAnswers,
    pub errors: FieldErrors,
    pub submitting: bool,
    pub created_at: DateTime<Utc>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            step: 1,
            answers: QuizAnswers::new(),
            errors: FieldErrors::new(),
            submitting: false,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn answers(&self) -> &QuizAnswers {
        &self.answers
    }

    /// Errors from the last failed `next`/submission attempt.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_final_step(&self) -> bool {
        self.step == TOTAL_STEPS
    }

    fn schema(&self) -> &'static StepSchema {
        // step is kept within 1..=TOTAL_STEPS by every transition
        step_schema(self.step).unwrap_or(&QUIZ_STEPS[0])
    }

    pub fn set_answers(&mut self, patch: QuizAnswers) -> Result<(), WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        self.answers.merge(patch);
        Ok(())
    }

    pub fn validate_current(&self) -> Result<(), FieldErrors> {
        self.schema().validate(&self.answers)
    }

    fn gate(&mut self) -> Result<(), WizardError> {
        match self.validate_current() {
            Ok(()) => {
                self.errors.clear();
                Ok(())
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(WizardError::Invalid {
                    step: self.step,
                    errors,
                })
            }
        }
    }

    pub fn next(&mut self) -> Result<Transition, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        self.gate()?;
        if self.is_final_step() {
            return Ok(Transition::AlreadyAtEnd);
        }
        self.step += 1;
        Ok(Transition::Advanced)
    }

    /// Moves back one step. Answers for the step being left are kept.
    pub fn previous(&mut self) -> Result<Transition, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        if self.step <= 1 {
            return Ok(Transition::AlreadyAtStart);
        }
        self.step -= 1;
        self.errors.clear();
        Ok(Transition::Retreated)
    }

    /// Marks a submission as in flight and hands out the answers to submit.
    /// At most one submission may be outstanding per wizard.
    pub fn begin_submission(&mut self) -> Result<QuizAnswers, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        if !self.is_final_step() {
            return Err(WizardError::NotAtFinalStep { current: self.step });
        }
        self.gate()?;
        self.submitting = true;
        Ok(self.answers.clone())
    }

    pub fn finish_submission(&mut self) {
        self.submitting = false;
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            id: self.id,
            step: self.step,
            total_steps: TOTAL_STEPS,
            schema: *self.schema(),
            answers: self.answers.clone(),
            errors: self.errors.clone(),
            submitting: self.submitting,
            created_at: self.created_at,
        }
    }
}
