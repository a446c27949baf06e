//! Organization persistence.

use super::sqlite_store::{bool_to_int, int_to_bool, parse_uuid};
use super::{EntityStore, RepoError, RepoResult, SqliteRosterStore};
use crate::model::identity::{EntityKind, OrganizationIdentity};
use crate::model::organization::{Coordinates, Organization};
use rusqlite::{params, Row};

const ORGANIZATION_SELECT_SQL: &str = "SELECT
    uuid,
    full_name,
    town,
    nickname,
    website,
    member_list_url,
    fotobond_number,
    kvk_number,
    latitude,
    longitude,
    priority,
    has_hardcoded_member_data
FROM organizations";

impl EntityStore<Organization> for SqliteRosterStore<'_> {
    fn lookup(&self, key: &OrganizationIdentity) -> RepoResult<Vec<Organization>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORGANIZATION_SELECT_SQL}
             WHERE full_name = ?1 AND town = ?2
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![key.full_name, key.town])?;
        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(parse_organization_row(row)?);
        }
        Ok(found)
    }

    fn insert(&self, organization: &Organization) -> RepoResult<()> {
        let (latitude, longitude) = split_coordinates(organization.coordinates);
        self.conn.execute(
            "INSERT INTO organizations (
                uuid,
                full_name,
                town,
                nickname,
                website,
                member_list_url,
                fotobond_number,
                kvk_number,
                latitude,
                longitude,
                priority,
                has_hardcoded_member_data
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                organization.uuid.to_string(),
                organization.identity.full_name,
                organization.identity.town,
                organization.nickname,
                organization.website,
                organization.member_list_url,
                organization.fotobond_number,
                organization.kvk_number,
                latitude,
                longitude,
                organization.priority,
                bool_to_int(organization.has_hardcoded_member_data),
            ],
        )?;
        Ok(())
    }

    fn update(&self, organization: &Organization) -> RepoResult<()> {
        let (latitude, longitude) = split_coordinates(organization.coordinates);
        let changed = self.conn.execute(
            "UPDATE organizations
             SET
                nickname = ?1,
                website = ?2,
                member_list_url = ?3,
                fotobond_number = ?4,
                kvk_number = ?5,
                latitude = ?6,
                longitude = ?7,
                priority = ?8,
                has_hardcoded_member_data = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                organization.nickname,
                organization.website,
                organization.member_list_url,
                organization.fotobond_number,
                organization.kvk_number,
                latitude,
                longitude,
                organization.priority,
                bool_to_int(organization.has_hardcoded_member_data),
                organization.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Organization,
                key: organization.identity.to_string(),
            });
        }
        Ok(())
    }

    /// Refuses while any membership still references the club.
    fn delete(&self, organization: &Organization) -> RepoResult<()> {
        let dependents = self.count_memberships_where("organization_uuid", organization.uuid)?;
        if dependents > 0 {
            return Err(RepoError::HasDependents {
                kind: EntityKind::Organization,
                key: organization.identity.to_string(),
                dependents,
            });
        }

        let changed = self.conn.execute(
            "DELETE FROM organizations WHERE uuid = ?1;",
            [organization.uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Organization,
                key: organization.identity.to_string(),
            });
        }
        Ok(())
    }
}

fn split_coordinates(coordinates: Option<Coordinates>) -> (Option<f64>, Option<f64>) {
    match coordinates {
        Some(value) => (Some(value.latitude), Some(value.longitude)),
        None => (None, None),
    }
}

fn parse_organization_row(row: &Row<'_>) -> RepoResult<Organization> {
    let uuid_text: String = row.get("uuid")?;
    let coordinates = match (
        row.get::<_, Option<f64>>("latitude")?,
        row.get::<_, Option<f64>>("longitude")?,
    ) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "organization {uuid_text} has only one of latitude/longitude"
            )))
        }
    };

    Ok(Organization {
        uuid: parse_uuid(&uuid_text, "organizations.uuid")?,
        identity: OrganizationIdentity {
            full_name: row.get("full_name")?,
            town: row.get("town")?,
        },
        nickname: row.get("nickname")?,
        website: row.get("website")?,
        member_list_url: row.get("member_list_url")?,
        fotobond_number: row.get("fotobond_number")?,
        kvk_number: row.get("kvk_number")?,
        coordinates,
        priority: row.get("priority")?,
        has_hardcoded_member_data: int_to_bool(
            row.get("has_hardcoded_member_data")?,
            "organizations.has_hardcoded_member_data",
        )?,
    })
}
