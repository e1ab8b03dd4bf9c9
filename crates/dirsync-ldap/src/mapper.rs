//! Mapping of raw directory entries into application records

use dirsync_core::config::{AttributeMappings, OrgUnitLayout};
use dirsync_core::types::{AccountProfile, DirectoryEntry, User};
use dirsync_core::utils::org_units;
use dirsync_core::{Error, Result};

/// Attributes requested by the single-account lookup
pub const LOOKUP_ATTRIBUTES: [&str; 4] = ["distinguishedName", "mail", "displayName", "title"];

/// Build the lookup profile of an entry. Absent attributes stay `None`.
pub fn map_profile(entry: &DirectoryEntry) -> AccountProfile {
    AccountProfile {
        distinguished_name: entry
            .first("distinguishedName")
            .map(str::to_string)
            .or_else(|| (!entry.dn.is_empty()).then(|| entry.dn.clone())),
        mail: entry.first("mail").map(str::to_string),
        display_name: entry.first("displayName").map(str::to_string),
        title: entry.first("title").map(str::to_string),
    }
}

/// Maps synchronized entries into [`User`] records
#[derive(Debug, Clone, Default)]
pub struct RecordMapper {
    mappings: AttributeMappings,
    layout: OrgUnitLayout,
}

impl RecordMapper {
    pub fn new(mappings: AttributeMappings, layout: OrgUnitLayout) -> Self {
        Self { mappings, layout }
    }

    /// Attribute list to request from the server
    pub fn requested_attributes(&self) -> Vec<String> {
        self.mappings.requested()
    }

    pub fn map_user(&self, entry: &DirectoryEntry) -> Result<User> {
        let dn = entry
            .first(&self.mappings.distinguished_name)
            .unwrap_or(entry.dn.as_str());

        let id = entry
            .first(&self.mappings.account_name)
            .ok_or_else(|| Error::MissingAttribute {
                dn: dn.to_string(),
                attribute: self.mappings.account_name.clone(),
            })?;

        let mut ous = org_units(dn);
        let required = self.layout.required();
        if ous.len() < required {
            return Err(Error::InsufficientOrgUnits {
                dn: dn.to_string(),
                found: ous.len(),
                required,
            });
        }

        let region = std::mem::take(&mut ous[self.layout.region_index]);
        let org = std::mem::take(&mut ous[self.layout.org_index]);

        Ok(User {
            id: id.to_string(),
            display_name: entry.first(&self.mappings.display_name).map(str::to_string),
            email: entry.first(&self.mappings.email).map(str::to_string),
            org,
            job_title: entry.first(&self.mappings.title).map(str::to_string),
            region,
        })
    }
}
