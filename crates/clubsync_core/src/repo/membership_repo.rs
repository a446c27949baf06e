//! Membership persistence, including tri-state role/status columns.

use super::sqlite_store::{flag_value, parse_uuid, read_flags};
use super::{EntityStore, RepoError, RepoResult, SqliteRosterStore};
use crate::model::flags::{MemberRole, MemberStatus};
use crate::model::identity::{EntityKind, MembershipKey};
use crate::model::membership::Membership;
use rusqlite::{params, Params, Row};

const MEMBERSHIP_SELECT_SQL: &str = "SELECT
    uuid,
    organization_uuid,
    person_uuid,
    role_chairman,
    role_vice_chairman,
    role_secretary,
    role_treasurer,
    role_admin,
    status_deceased,
    status_former,
    status_coach,
    status_prospective,
    member_website,
    latest_image
FROM memberships";

impl SqliteRosterStore<'_> {
    pub(super) fn query_memberships<P: Params>(
        &self,
        filter: &str,
        params: P,
    ) -> RepoResult<Vec<Membership>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBERSHIP_SELECT_SQL} {filter} ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(parse_membership_row(row)?);
        }
        Ok(found)
    }
}

impl EntityStore<Membership> for SqliteRosterStore<'_> {
    fn lookup(&self, key: &MembershipKey) -> RepoResult<Vec<Membership>> {
        self.query_memberships(
            "WHERE organization_uuid = ?1 AND person_uuid = ?2",
            params![key.organization.to_string(), key.person.to_string()],
        )
    }

    fn insert(&self, membership: &Membership) -> RepoResult<()> {
        let roles = &membership.roles;
        let status = &membership.status;
        self.conn.execute(
            "INSERT INTO memberships (
                uuid,
                organization_uuid,
                person_uuid,
                role_chairman,
                role_vice_chairman,
                role_secretary,
                role_treasurer,
                role_admin,
                status_deceased,
                status_former,
                status_coach,
                status_prospective,
                member_website,
                latest_image
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                membership.uuid.to_string(),
                membership.key.organization.to_string(),
                membership.key.person.to_string(),
                flag_value(roles, MemberRole::Chairman),
                flag_value(roles, MemberRole::ViceChairman),
                flag_value(roles, MemberRole::Secretary),
                flag_value(roles, MemberRole::Treasurer),
                flag_value(roles, MemberRole::Admin),
                flag_value(status, MemberStatus::Deceased),
                flag_value(status, MemberStatus::Former),
                flag_value(status, MemberStatus::Coach),
                flag_value(status, MemberStatus::Prospective),
                membership.member_website,
                membership.latest_image,
            ],
        )?;
        Ok(())
    }

    fn update(&self, membership: &Membership) -> RepoResult<()> {
        let roles = &membership.roles;
        let status = &membership.status;
        let changed = self.conn.execute(
            "UPDATE memberships
             SET
                role_chairman = ?1,
                role_vice_chairman = ?2,
                role_secretary = ?3,
                role_treasurer = ?4,
                role_admin = ?5,
                status_deceased = ?6,
                status_former = ?7,
                status_coach = ?8,
                status_prospective = ?9,
                member_website = ?10,
                latest_image = ?11,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?12;",
            params![
                flag_value(roles, MemberRole::Chairman),
                flag_value(roles, MemberRole::ViceChairman),
                flag_value(roles, MemberRole::Secretary),
                flag_value(roles, MemberRole::Treasurer),
                flag_value(roles, MemberRole::Admin),
                flag_value(status, MemberStatus::Deceased),
                flag_value(status, MemberStatus::Former),
                flag_value(status, MemberStatus::Coach),
                flag_value(status, MemberStatus::Prospective),
                membership.member_website,
                membership.latest_image,
                membership.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Membership,
                key: membership.key.to_string(),
            });
        }
        Ok(())
    }

    fn delete(&self, membership: &Membership) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM memberships WHERE uuid = ?1;",
            [membership.uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Membership,
                key: membership.key.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_membership_row(row: &Row<'_>) -> RepoResult<Membership> {
    let uuid_text: String = row.get("uuid")?;
    let organization_text: String = row.get("organization_uuid")?;
    let person_text: String = row.get("person_uuid")?;
    Ok(Membership {
        uuid: parse_uuid(&uuid_text, "memberships.uuid")?,
        key: MembershipKey {
            organization: parse_uuid(&organization_text, "memberships.organization_uuid")?,
            person: parse_uuid(&person_text, "memberships.person_uuid")?,
        },
        roles: read_flags(row)?,
        status: read_flags(row)?,
        member_website: row.get("member_website")?,
        latest_image: row.get("latest_image")?,
    })
}
