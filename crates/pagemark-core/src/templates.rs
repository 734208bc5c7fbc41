use crate::error::PagemarkError;
use crate::geometry::Region;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Number of template slots, labelled by the digits `0`-`9`.
pub const SLOT_COUNT: usize = 10;

/// Identifier of one of the ten template slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u8);

impl SlotId {
    /// Returns `None` for anything outside `0..=9`.
    pub fn new(id: u8) -> Option<SlotId> {
        (usize::from(id) < SLOT_COUNT).then_some(SlotId(id))
    }

    pub fn from_digit(c: char) -> Option<SlotId> {
        c.to_digit(10).and_then(|d| SlotId::new(d as u8))
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn all() -> impl Iterator<Item = SlotId> {
        (0..SLOT_COUNT as u8).map(SlotId)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ten independently ordered groups of regions, one of which is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateStore {
    slots: [Vec<Region>; SLOT_COUNT],
    active: SlotId,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_slot(&self) -> SlotId {
        self.active
    }

    /// Appends to the active slot.
    pub fn add_region(&mut self, region: Region) {
        debug!(slot = %self.active, %region, "region added");
        self.slots[self.active.index()].push(region);
    }

    /// Pops the newest region of the active slot; `None` if the slot is empty.
    pub fn remove_last_region(&mut self) -> Option<Region> {
        let removed = self.slots[self.active.index()].pop();
        if let Some(region) = &removed {
            debug!(slot = %self.active, %region, "region removed");
        }
        removed
    }

    pub fn set_active_slot(&mut self, id: SlotId) {
        debug!(from = %self.active, to = %id, "active template changed");
        self.active = id;
    }

    pub fn regions_in_active_slot(&self) -> &[Region] {
        self.regions(self.active)
    }

    pub fn regions(&self, id: SlotId) -> &[Region] {
        &self.slots[id.index()]
    }

    /// Write all non-empty slots and the active slot id as JSON.
    pub fn save(&self, path: &Path) -> Result<(), PagemarkError> {
        let file = TemplateFile {
            active: self.active.0,
            slots: SlotId::all()
                .filter(|id| !self.regions(*id).is_empty())
                .map(|id| (id.0, self.regions(id).to_vec()))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "templates saved");
        Ok(())
    }

    /// Load slots previously written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<TemplateStore, PagemarkError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PagemarkError::TemplatesLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        parse_templates(&content).map_err(|reason| PagemarkError::TemplatesLoad {
            path: path.to_path_buf(),
            reason,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    active: u8,
    #[serde(default)]
    slots: BTreeMap<u8, Vec<Region>>,
}

fn parse_templates(json: &str) -> Result<TemplateStore, String> {
    let file: TemplateFile = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let mut store = TemplateStore::new();
    store.active =
        SlotId::new(file.active).ok_or_else(|| format!("invalid active slot {}", file.active))?;
    for (id, regions) in file.slots {
        let slot = SlotId::new(id).ok_or_else(|| format!("invalid slot {}", id))?;
        store.slots[slot.index()] = regions;
    }
    Ok(store)
}
