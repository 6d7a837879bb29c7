//! Group rosters loaded from a JSON seed file for the in-memory store.
//!
//! ```json
//! [
//!   { "id": "…", "name": "Flat 4", "memberIds": ["…", "…"] }
//! ]
//! ```

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::{GroupId, GroupRoster, MemberId};

use super::InMemoryExpenseLedgerRepository;

/// Errors raised while reading a roster seed file.
#[derive(Debug, Error)]
pub enum RosterSeedError {
    #[error("failed to read roster seed at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("roster seed at {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("member {member_id} appears in more than one seeded group")]
    SharedMember { member_id: Uuid },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SeedGroup {
    id: Uuid,
    name: String,
    member_ids: Vec<Uuid>,
}

/// Parse a roster seed document.
///
/// Duplicate member ids inside one group collapse to their first occurrence;
/// a member listed under two groups is rejected.
pub fn parse_roster_seed(path: &Path, contents: &str) -> Result<Vec<GroupRoster>, RosterSeedError> {
    let groups: Vec<SeedGroup> =
        serde_json::from_str(contents).map_err(|source| RosterSeedError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut owners = std::collections::HashSet::new();
    let mut rosters = Vec::with_capacity(groups.len());
    for group in groups {
        let mut members: Vec<MemberId> = Vec::with_capacity(group.member_ids.len());
        for id in group.member_ids {
            let member = MemberId::from_uuid(id);
            if members.contains(&member) {
                continue;
            }
            if !owners.insert(id) {
                return Err(RosterSeedError::SharedMember { member_id: id });
            }
            members.push(member);
        }
        rosters.push(GroupRoster::new(
            GroupId::from_uuid(group.id),
            group.name,
            members,
        ));
    }
    Ok(rosters)
}

/// Read a roster seed file through a capability-scoped directory handle.
pub fn load_roster_seed(path: &Path) -> Result<Vec<GroupRoster>, RosterSeedError> {
    let read_error = |source: std::io::Error| RosterSeedError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "roster seed path must be a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let contents = dir.read_to_string(Path::new(file_name)).map_err(read_error)?;
    parse_roster_seed(path, &contents)
}

impl InMemoryExpenseLedgerRepository {
    /// Register every roster from a seed file.
    pub async fn seed_from_file(&self, path: &Path) -> Result<usize, RosterSeedError> {
        let rosters = load_roster_seed(path)?;
        let count = rosters.len();
        for roster in rosters {
            self.upsert_group(roster).await;
        }
        info!(path = %path.display(), groups = count, "roster seed applied");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;

    use super::*;
    use crate::domain::ports::ExpenseLedgerRepository;

    const GROUP: &str = "00000000-0000-0000-0000-000000000101";
    const ALICE: &str = "00000000-0000-0000-0000-000000000201";
    const BOB: &str = "00000000-0000-0000-0000-000000000202";

    fn seed_json() -> String {
        format!(r#"[{{"id": "{GROUP}", "name": "Flat 4", "memberIds": ["{ALICE}", "{BOB}", "{ALICE}"]}}]"#)
    }

    #[rstest]
    fn duplicate_members_keep_their_first_position() {
        let rosters = parse_roster_seed(Path::new("seed.json"), &seed_json()).expect("valid seed");
        assert_eq!(rosters.len(), 1);
        let members: Vec<String> = rosters[0]
            .member_ids()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(members, vec![ALICE.to_owned(), BOB.to_owned()]);
    }

    #[rstest]
    fn members_cannot_belong_to_two_groups() {
        let doc = format!(
            r#"[{{"id": "{GROUP}", "name": "A", "memberIds": ["{ALICE}"]}},
                {{"id": "{BOB}", "name": "B", "memberIds": ["{ALICE}"]}}]"#
        );
        let err = parse_roster_seed(Path::new("seed.json"), &doc).expect_err("shared member");
        assert!(matches!(err, RosterSeedError::SharedMember { .. }));
    }

    #[rstest]
    fn malformed_documents_are_rejected() {
        let err = parse_roster_seed(Path::new("seed.json"), "{}").expect_err("not a list");
        assert!(matches!(err, RosterSeedError::Parse { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn seed_files_register_groups() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(seed_json().as_bytes()).expect("write seed");

        let repo = InMemoryExpenseLedgerRepository::new();
        let count = repo.seed_from_file(file.path()).await.expect("seed applies");

        assert_eq!(count, 1);
        let group = GroupId::from_uuid(Uuid::parse_str(GROUP).expect("uuid"));
        let roster = repo
            .find_roster(&group)
            .await
            .expect("lookup succeeds")
            .expect("group registered");
        assert_eq!(roster.name(), "Flat 4");
    }

    #[rstest]
    fn missing_files_report_the_path() {
        let err = load_roster_seed(Path::new("/nonexistent/seed.json")).expect_err("missing");
        assert!(err.to_string().contains("/nonexistent/seed.json"));
    }
}
