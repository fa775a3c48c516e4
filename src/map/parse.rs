use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use super::workspace::{ElementRecord, MessageRuleRecord, RoleRecord, WorkspaceInfo};

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawSnapshot {
    #[serde(default)]
    pub(super) now: Option<u64>,
    #[serde(default)]
    pub(super) workgroups: Vec<RawWorkgroup>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawWorkgroup {
    pub(super) name: String,
    #[serde(default)]
    pub(super) workspaces: Vec<RawWorkspace>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawWorkspaceRef {
    pub(super) name: String,
    #[serde(default)]
    pub(super) owner: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawWorkspace {
    name: String,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    parent: Option<RawWorkspaceRef>,
    #[serde(default)]
    goal: Option<String>,
    #[serde(default)]
    created: Option<u64>,
    #[serde(default)]
    roles: Vec<RawRole>,
    #[serde(default)]
    participants: Vec<RawElement>,
    #[serde(default)]
    documents: Vec<RawElement>,
    #[serde(default)]
    discussions: Vec<RawElement>,
    #[serde(default)]
    actions: Vec<RawElement>,
    #[serde(default)]
    message_types: Vec<RawElement>,
    #[serde(default)]
    message_rules: Vec<RawMessageRule>,
    #[serde(default)]
    messages_sent: Vec<u64>,
    #[serde(default)]
    messages_received: Vec<u64>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawRole {
    name: String,
    #[serde(default)]
    created: Option<u64>,
    #[serde(default)]
    participants: Vec<String>,
    #[serde(default, alias = "objects")]
    assigned_objects: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawElement {
    name: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    created: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawMessageRule {
    #[serde(default)]
    source_type: String,
    #[serde(default)]
    target_type: String,
    #[serde(default)]
    target_role: Option<String>,
    target: RawWorkspaceRef,
}

pub(super) struct ParsedWorkspace {
    pub(super) info: WorkspaceInfo,
    pub(super) parent: Option<RawWorkspaceRef>,
}

pub(super) fn parse_snapshot(raw: &str) -> Result<RawSnapshot> {
    let snapshot: RawSnapshot =
        serde_json::from_str(raw).context("invalid workgroup snapshot JSON")?;

    if snapshot
        .workgroups
        .iter()
        .all(|workgroup| workgroup.workspaces.is_empty())
    {
        return Err(anyhow!("workgroup snapshot contains no workspaces"));
    }

    Ok(snapshot)
}

impl RawWorkspace {
    pub(super) fn into_parsed(self, workgroup: &str) -> ParsedWorkspace {
        let goal = self
            .goal
            .map(|goal| goal.trim().to_owned())
            .filter(|goal| !goal.is_empty() && goal != "null");

        let message_rules = self
            .message_rules
            .into_iter()
            .map(|rule| MessageRuleRecord {
                source_type: rule.source_type,
                target_type: rule.target_type,
                target_role: rule.target_role,
                target_workspace: rule.target.name,
                target_owner: rule.target.owner,
            })
            .collect();

        let info = WorkspaceInfo {
            name: self.name,
            owner: self.owner,
            goal,
            workgroup: Some(workgroup.to_owned()),
            created: self.created,
            roles: self.roles.into_iter().map(RawRole::into_record).collect(),
            participants: elements(self.participants),
            documents: elements(self.documents),
            discussions: elements(self.discussions),
            actions: elements(self.actions),
            message_types: elements(self.message_types),
            message_rules,
            messages_sent: self.messages_sent,
            messages_received: self.messages_received,
        };

        ParsedWorkspace {
            info,
            parent: self.parent,
        }
    }
}

impl RawRole {
    fn into_record(self) -> RoleRecord {
        RoleRecord {
            name: self.name,
            created: self.created,
            participants: self.participants,
            assigned_objects: self.assigned_objects,
        }
    }
}

fn elements(raw: Vec<RawElement>) -> Vec<ElementRecord> {
    raw.into_iter()
        .map(|element| ElementRecord {
            name: element.name,
            url: element.url.filter(|url| !url.is_empty()),
            created: element.created,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_rejected() {
        let error = parse_snapshot(r#"{"workgroups": [{"name": "wg"}]}"#).unwrap_err();
        assert!(error.to_string().contains("no workspaces"));
    }

    #[test]
    fn malformed_json_reports_context() {
        let error = parse_snapshot("{").unwrap_err();
        assert!(error.to_string().contains("invalid workgroup snapshot JSON"));
    }

    #[test]
    fn placeholder_goals_are_dropped() {
        let snapshot = parse_snapshot(
            r#"{"workgroups": [{"name": "wg", "workspaces": [
                {"name": "a", "goal": "null"},
                {"name": "b", "goal": "  "},
                {"name": "c", "goal": "ship it", "roles": [{"name": "lead", "objects": ["plan"]}]}
            ]}]}"#,
        )
        .unwrap();

        let parsed = snapshot
            .workgroups
            .into_iter()
            .flat_map(|workgroup| {
                let name = workgroup.name;
                workgroup
                    .workspaces
                    .into_iter()
                    .map(move |workspace| workspace.into_parsed(&name))
            })
            .map(|parsed| parsed.info)
            .collect::<Vec<_>>();

        assert_eq!(parsed[0].goal, None);
        assert_eq!(parsed[1].goal, None);
        assert_eq!(parsed[2].goal.as_deref(), Some("ship it"));
        assert_eq!(parsed[2].roles[0].assigned_objects, vec!["plan".to_owned()]);
        assert_eq!(parsed[2].workgroup.as_deref(), Some("wg"));
    }
}
