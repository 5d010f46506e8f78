use tracing::warn;

use crate::api::{ApiClient, ApiError};
use crate::models::Material;
use crate::nav::{Navigator, Visit};

pub const MATERIALS_ERROR: &str = "Failed to fetch materials. Please check server connection.";

/// Public list of every uploaded material.
#[derive(Debug, Default)]
pub struct MaterialsView {
    pub materials: Vec<Material>,
    pub error: Option<String>,
    pub selection: usize,
    pending: Option<Visit>,
}

impl MaterialsView {
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn begin_load(&mut self, nav: &impl Navigator) -> Visit {
        let visit = nav.visit();
        self.error = None;
        self.pending = Some(visit);
        visit
    }

    pub fn finish_load(
        &mut self,
        visit: Visit,
        result: Result<Vec<Material>, ApiError>,
        nav: &impl Navigator,
    ) {
        if self.pending == Some(visit) {
            self.pending = None;
        }
        if !nav.is_current(visit) {
            return;
        }

        match result {
            Ok(materials) => {
                self.materials = materials;
                self.selection = self.selection.min(self.materials.len().saturating_sub(1));
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch materials");
                self.error = Some(e.display_message(MATERIALS_ERROR, MATERIALS_ERROR));
            }
        }
    }

    pub async fn load(&mut self, api: &ApiClient, nav: &impl Navigator) {
        let visit = self.begin_load(nav);
        let result = api.list_materials().await;
        self.finish_load(visit, result, nav);
    }

    pub fn selected(&self) -> Option<&Material> {
        self.materials.get(self.selection)
    }

    pub fn select_next(&mut self) {
        if self.selection + 1 < self.materials.len() {
            self.selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }
}
