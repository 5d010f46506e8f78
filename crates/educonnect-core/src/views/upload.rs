use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};
use url::Url;

use crate::api::{ApiClient, ApiError};
use crate::auth::{AuthController, RouteGate};
use crate::models::{MaterialSource, MessageResponse, NewMaterial, Token, SUBJECTS};
use crate::nav::{Navigator, View, Visit};

use super::{Flash, REDIRECT_DELAY};

pub const UPLOAD_SUCCESS: &str = "Resource uploaded successfully! Redirecting...";
pub const UPLOAD_FAILED: &str = "Upload failed. Please check the form and try again.";
pub const UPLOAD_NETWORK_ERROR: &str = "Upload failed due to network/server error.";
pub const TITLE_SUBJECT_REQUIRED: &str = "Title and Subject are required.";
pub const FILE_REQUIRED: &str = "Please select a file to upload.";
pub const URL_INVALID: &str = "Please enter a valid URL.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceKind {
    #[default]
    File,
    Link,
}

impl ResourceKind {
    pub fn toggle(self) -> Self {
        match self {
            ResourceKind::File => ResourceKind::Link,
            ResourceKind::Link => ResourceKind::File,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::File => "File Upload",
            ResourceKind::Link => "External Link",
        }
    }
}

/// Focusable parts of the upload form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadField {
    #[default]
    Title,
    Subject,
    Description,
    Kind,
    Source,
    Submit,
}

impl UploadField {
    const ORDER: [UploadField; 6] = [
        UploadField::Title,
        UploadField::Subject,
        UploadField::Description,
        UploadField::Kind,
        UploadField::Source,
        UploadField::Submit,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }

    /// Fields that take typed text.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            UploadField::Title | UploadField::Description | UploadField::Source
        )
    }
}

/// Form for sharing a file or an external link. Requires a session.
#[derive(Debug, Default)]
pub struct UploadView {
    pub title: String,
    pub subject_index: usize,
    pub description: String,
    pub kind: ResourceKind,
    pub file_path: String,
    pub url: String,
    pub focus: UploadField,
    pub flash: Option<Flash>,
    pending: Option<Visit>,
}

impl UploadView {
    pub fn subject(&self) -> &'static str {
        SUBJECTS.get(self.subject_index).copied().unwrap_or(SUBJECTS[0])
    }

    pub fn next_subject(&mut self) {
        self.subject_index = (self.subject_index + 1) % SUBJECTS.len();
    }

    pub fn prev_subject(&mut self) {
        self.subject_index = (self.subject_index + SUBJECTS.len() - 1) % SUBJECTS.len();
    }

    /// The text field currently holding the resource source.
    pub fn source_mut(&mut self) -> &mut String {
        match self.kind {
            ResourceKind::File => &mut self.file_path,
            ResourceKind::Link => &mut self.url,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Enter the view. Returns false if the route gate sent the user away.
    pub fn activate(&mut self, auth: &AuthController, nav: &mut impl Navigator) -> bool {
        RouteGate::admit(auth, View::Upload, nav)
    }

    pub fn reset(&mut self) {
        let flash = self.flash.take();
        *self = Self {
            flash,
            ..Self::default()
        };
    }

    /// Check the session and the form. Returns the upload to send, or `None`
    /// with either a redirect (no token) or an error flash.
    pub fn begin_submit(
        &mut self,
        auth: &mut AuthController,
        nav: &mut impl Navigator,
    ) -> Option<(Visit, Token, NewMaterial)> {
        if self.pending.is_some() {
            return None;
        }
        let Some(token) = auth.token() else {
            warn!("Upload attempted without a session");
            auth.reject(nav);
            return None;
        };

        match self.validate() {
            Ok(material) => {
                let visit = nav.visit();
                self.flash = None;
                self.pending = Some(visit);
                Some((visit, token, material))
            }
            Err(message) => {
                self.flash = Some(Flash::error(message));
                None
            }
        }
    }

    fn validate(&self) -> Result<NewMaterial, &'static str> {
        let title = self.title.trim();
        let subject = self.subject();
        if title.is_empty() || subject.is_empty() {
            return Err(TITLE_SUBJECT_REQUIRED);
        }

        let source = match self.kind {
            ResourceKind::File => {
                let path = self.file_path.trim();
                if path.is_empty() {
                    return Err(FILE_REQUIRED);
                }
                MaterialSource::File(PathBuf::from(path))
            }
            ResourceKind::Link => {
                let link = self.url.trim();
                if Url::parse(link).is_err() {
                    return Err(URL_INVALID);
                }
                MaterialSource::Link(link.to_string())
            }
        };

        Ok(NewMaterial {
            title: title.to_string(),
            subject: subject.to_string(),
            description: self.description.trim().to_string(),
            source,
        })
    }

    pub fn finish_submit(
        &mut self,
        visit: Visit,
        result: Result<MessageResponse, ApiError>,
        auth: &mut AuthController,
        nav: &mut impl Navigator,
    ) {
        if self.pending == Some(visit) {
            self.pending = None;
        }

        match result {
            Err(e) if e.is_auth_rejection() => {
                warn!(error = %e, "Upload rejected, session expired");
                auth.reject(nav);
            }
            _ if !nav.is_current(visit) => {}
            Ok(_) => {
                info!("Material uploaded");
                self.reset();
                self.flash = Some(Flash::success(UPLOAD_SUCCESS));
                nav.schedule(View::Materials, REDIRECT_DELAY);
            }
            Err(e) => {
                warn!(error = %e, "Upload failed");
                self.flash = Some(Flash::error(
                    e.display_message(UPLOAD_FAILED, UPLOAD_NETWORK_ERROR),
                ));
            }
        }
    }

    /// Drop the flash once it has been up long enough.
    pub fn tick(&mut self, now: Instant) {
        if self.flash.as_ref().is_some_and(|f| f.is_expired(now)) {
            self.flash = None;
        }
    }

    pub async fn submit(
        &mut self,
        api: &ApiClient,
        auth: &mut AuthController,
        nav: &mut impl Navigator,
    ) {
        let Some((visit, token, material)) = self.begin_submit(auth, nav) else {
            return;
        };
        let result = api.upload_material(&token, &material).await;
        self.finish_submit(visit, result, auth, nav);
    }
}
