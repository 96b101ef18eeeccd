//! Per-form upload state machine.
//!
//! A managed form starts `Idle`. Picking a file makes it `Dirty` and clears the
//! hidden fields before anything touches the network. A successful preparation
//! makes it `Prepared`; any failure returns it to `Dirty` with empty fields.
//! Submission is intercepted while the form is in upload mode and not prepared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gustav_core::constants::NOTIFICATION_PREPARED_MS;
use gustav_core::{
    ErrorMetadata, FormMode, LogLevel, UploadError, UploadFile, UploadPolicy, UploadResult,
};

use crate::context::FormContext;
use crate::fields::HiddenFields;
use crate::notify::{NotificationCenter, NotificationLevel};
use crate::preparer::{FormSubmitter, PrepareUpload};

const PREPARED_MESSAGE: &str = "Upload prepared. Now click Submit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparationState {
    /// No file selected
    Idle,
    /// Hidden fields describe the selected file
    Prepared,
    /// A file is selected but not yet uploaded
    Dirty,
}

/// Which group of inputs is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Text,
    Upload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form was posted. `prepared_now` is set when the upload ran as part of this submit.
    Submitted { status: u16, prepared_now: bool },
    /// The submit control was disabled; nothing happened.
    Ignored,
}

#[derive(Debug)]
pub struct FormController {
    context: FormContext,
    action: String,
    policy: UploadPolicy,
    mode: FormMode,
    state: PreparationState,
    fields: HiddenFields,
    file: Option<UploadFile>,
    visible_fields: Vec<(String, String)>,
    submit_enabled: Arc<AtomicBool>,
}

/// Re-enables the submit control when dropped, including when the submit future
/// is cancelled or a collaborator panics.
struct SubmitGuard(Arc<AtomicBool>);

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl FormController {
    /// Bind a controller to a form. `learning_policy` is used by learning forms;
    /// material forms carry their own policy in the context.
    pub fn new(context: FormContext, action: impl Into<String>, learning_policy: &UploadPolicy) -> Self {
        let policy = context.policy(learning_policy).clone();
        let fields = HiddenFields::new(context.identifier_field());
        Self {
            context,
            action: action.into(),
            policy,
            mode: FormMode::default(),
            state: PreparationState::Idle,
            fields,
            file: None,
            visible_fields: Vec::new(),
            submit_enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_mode(mut self, mode: FormMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn context(&self) -> &FormContext {
        &self.context
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> PreparationState {
        self.state
    }

    pub fn fields(&self) -> &HiddenFields {
        &self.fields
    }

    pub fn selected_file(&self) -> Option<&UploadFile> {
        self.file.as_ref()
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled.load(Ordering::SeqCst)
    }

    pub fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Switch mode. Only changes which group is visible.
    pub fn set_mode(&mut self, mode: FormMode) -> FieldGroup {
        self.mode = mode;
        self.visible_group()
    }

    pub fn visible_group(&self) -> FieldGroup {
        if self.mode.requires_file() {
            FieldGroup::Upload
        } else {
            FieldGroup::Text
        }
    }

    /// Set a visible input (text answer, title, ...). Replaces an earlier value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.visible_fields.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.visible_fields.push((name, value)),
        }
    }

    /// Record a file-input change. Never touches the network.
    pub fn select_file(&mut self, file: Option<UploadFile>) {
        self.fields.clear();
        self.state = if file.is_some() {
            PreparationState::Dirty
        } else {
            PreparationState::Idle
        };
        self.file = file;
    }

    /// File-input change handler. Learning forms prepare immediately and announce
    /// success; material forms only record the selection.
    pub async fn handle_file_change(
        &mut self,
        file: Option<UploadFile>,
        preparer: &dyn PrepareUpload,
        notifications: &mut NotificationCenter,
    ) -> UploadResult<()> {
        self.select_file(file);
        if self.file.is_none() || !self.context.prepares_on_select() {
            return Ok(());
        }

        self.prepare(preparer, notifications).await?;
        notifications.show_for(
            NotificationLevel::Info,
            PREPARED_MESSAGE,
            NOTIFICATION_PREPARED_MS,
        );
        Ok(())
    }

    /// Upload the selected file and fill the hidden fields.
    pub async fn prepare(
        &mut self,
        preparer: &dyn PrepareUpload,
        notifications: &mut NotificationCenter,
    ) -> UploadResult<()> {
        let result = self.try_prepare(preparer).await;
        if let Err(err) = &result {
            self.fail(err, notifications);
        }
        result
    }

    async fn try_prepare(&mut self, preparer: &dyn PrepareUpload) -> UploadResult<()> {
        let file = self.file.clone().ok_or(UploadError::NoFileSelected)?;
        let endpoint = self.context.intent_endpoint()?;
        let payload = self.context.payload(&file);

        let outcome = preparer
            .prepare(&endpoint, &file, &self.policy, &payload)
            .await?;
        self.fields.fill(&outcome)?;
        self.state = PreparationState::Prepared;
        Ok(())
    }

    fn fail(&mut self, err: &UploadError, notifications: &mut NotificationCenter) {
        self.fields.clear();
        if self.file.is_some() {
            self.state = PreparationState::Dirty;
        }
        notifications.error(err.client_message());

        match err.log_level() {
            LogLevel::Debug => {
                tracing::debug!(error = %err, code = err.error_code(), "Upload preparation rejected")
            }
            LogLevel::Warn => {
                tracing::warn!(error = %err, code = err.error_code(), "Upload preparation failed")
            }
            LogLevel::Error => {
                tracing::error!(error = %err, code = err.error_code(), "Upload preparation failed")
            }
        }
    }

    /// Fields posted on submit: visible inputs, then the hidden fields in upload mode.
    pub fn submission_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.visible_fields.clone();
        if self.mode.requires_file() {
            fields.extend(self.fields.pairs());
        }
        fields
    }

    /// Submit interception.
    ///
    /// The submit control stays disabled for the whole call and is re-enabled
    /// regardless of the outcome.
    pub async fn submit(
        &mut self,
        preparer: &dyn PrepareUpload,
        submitter: &dyn FormSubmitter,
        notifications: &mut NotificationCenter,
    ) -> UploadResult<SubmitOutcome> {
        if !self.submit_enabled.swap(false, Ordering::SeqCst) {
            tracing::debug!("Submit ignored while a submission is in flight");
            return Ok(SubmitOutcome::Ignored);
        }

        let _guard = SubmitGuard(Arc::clone(&self.submit_enabled));
        self.run_submit(preparer, submitter, notifications).await
    }

    async fn run_submit(
        &mut self,
        preparer: &dyn PrepareUpload,
        submitter: &dyn FormSubmitter,
        notifications: &mut NotificationCenter,
    ) -> UploadResult<SubmitOutcome> {
        let already_prepared =
            self.state == PreparationState::Prepared && self.fields.is_complete();

        let prepared_now = if !self.mode.requires_file() || already_prepared {
            false
        } else if self.file.is_none() {
            let err = UploadError::NoFileSelected;
            notifications.error(err.client_message());
            return Err(err);
        } else {
            self.prepare(preparer, notifications).await?;
            true
        };

        // State is clean here, so the post below goes straight through.
        let status = match submitter
            .submit(&self.action, &self.submission_fields())
            .await
        {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = %err, action = %self.action, "Form submission failed");
                notifications.error(err.client_message());
                return Err(err);
            }
        };

        tracing::info!(status, prepared_now, mode = self.mode.as_str(), "Form submitted");
        Ok(SubmitOutcome::Submitted {
            status,
            prepared_now,
        })
    }
}
