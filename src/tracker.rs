use serde::Deserialize;
use tracing::debug;

use crate::config::Settings;
use crate::error::{Error, Result};

const TRACKER_API_URL: &str = "https://api.linear.app/graphql";

// ---------------------------------------------------------------------------
// Client abstraction (for testability)
// ---------------------------------------------------------------------------

pub trait TrackerClient {
    fn graphql(&self, query: &str, variables: serde_json::Value) -> Result<serde_json::Value>;
}

struct HttpTrackerClient {
    api_key: String,
}

impl TrackerClient for HttpTrackerClient {
    fn graphql(&self, query: &str, variables: serde_json::Value) -> Result<serde_json::Value> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        // Linear expects the raw API key, not "Bearer <key>". Exactly one
        // attempt per call: a failed request is surfaced to the user and
        // re-invoking the command is the retry.
        let response = ureq::post(TRACKER_API_URL)
            .set("Authorization", &self.api_key)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| Error::Tracker(format!("request failed: {e}")))?;

        let json: serde_json::Value = response
            .into_json()
            .map_err(|e| Error::Tracker(format!("failed to parse response: {e}")))?;

        if let Some(errors) = json.get("errors") {
            return Err(Error::Tracker(format!("API errors: {errors}")));
        }

        json.get("data")
            .cloned()
            .ok_or_else(|| Error::Tracker("response missing data".to_string()))
    }
}

// ---------------------------------------------------------------------------
// GraphQL response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct TeamConnection {
    nodes: Vec<Team>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectConnection {
    nodes: Vec<Project>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cycle {
    pub id: String,
    pub number: u64,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CycleConnection {
    nodes: Vec<Cycle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowStateConnection {
    nodes: Vec<WorkflowState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Creator {
    pub name: String,
}

/// Issue details rendered by the hover surface.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub identifier: String,
    pub title: String,
    pub url: String,
    pub creator: Option<Creator>,
}

/// Minimal issue info returned after creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub identifier: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Tracker gateway
// ---------------------------------------------------------------------------

/// Thin wrapper over the tracker's GraphQL API.
///
/// Built per operation from explicitly passed settings; the API key is
/// resolved at construction time, so a key change simply takes effect on the
/// next command invocation.
pub struct Tracker {
    team_id: Option<String>,
    project_id: Option<String>,
    cycle_id: Option<String>,
    status_id: Option<String>,
    client: Box<dyn TrackerClient>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("team_id", &self.team_id)
            .field("project_id", &self.project_id)
            .field("cycle_id", &self.cycle_id)
            .field("status_id", &self.status_id)
            .finish_non_exhaustive()
    }
}

impl Tracker {
    pub fn new(settings: &Settings) -> Result<Self> {
        let api_key = settings.resolve_api_key()?;
        Ok(Self {
            team_id: settings.team_id.clone(),
            project_id: settings.project_id.clone(),
            cycle_id: settings.cycle_id.clone(),
            status_id: settings.status_id.clone(),
            client: Box::new(HttpTrackerClient { api_key }),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_client(settings: &Settings, client: Box<dyn TrackerClient>) -> Self {
        Self {
            team_id: settings.team_id.clone(),
            project_id: settings.project_id.clone(),
            cycle_id: settings.cycle_id.clone(),
            status_id: settings.status_id.clone(),
            client,
        }
    }

    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let query = r#"
            query Teams {
                teams(first: 50) {
                    nodes { id name key }
                }
            }
        "#;

        let data = self.client.graphql(query, serde_json::json!({}))?;

        let teams: TeamConnection =
            serde_json::from_value(data.get("teams").cloned().unwrap_or_default())
                .map_err(|e| Error::Tracker(format!("failed to parse teams: {e}")))?;

        debug!(count = teams.nodes.len(), "fetched teams");
        Ok(teams.nodes)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let query = r#"
            query Projects {
                projects(first: 50) {
                    nodes { id name }
                }
            }
        "#;

        let data = self.client.graphql(query, serde_json::json!({}))?;

        let projects: ProjectConnection =
            serde_json::from_value(data.get("projects").cloned().unwrap_or_default())
                .map_err(|e| Error::Tracker(format!("failed to parse projects: {e}")))?;

        debug!(count = projects.nodes.len(), "fetched projects");
        Ok(projects.nodes)
    }

    /// List cycles, scoped to the configured team when one is set.
    pub fn list_cycles(&self) -> Result<Vec<Cycle>> {
        let query = r#"
            query Cycles($filter: CycleFilter) {
                cycles(filter: $filter, first: 50) {
                    nodes { id number name }
                }
            }
        "#;

        let data = self
            .client
            .graphql(query, serde_json::json!({ "filter": self.team_filter() }))?;

        let cycles: CycleConnection =
            serde_json::from_value(data.get("cycles").cloned().unwrap_or_default())
                .map_err(|e| Error::Tracker(format!("failed to parse cycles: {e}")))?;

        debug!(count = cycles.nodes.len(), "fetched cycles");
        Ok(cycles.nodes)
    }

    /// List workflow states, scoped to the configured team when one is set.
    pub fn list_workflow_states(&self) -> Result<Vec<WorkflowState>> {
        let query = r#"
            query WorkflowStates($filter: WorkflowStateFilter) {
                workflowStates(filter: $filter, first: 50) {
                    nodes { id name }
                }
            }
        "#;

        let data = self
            .client
            .graphql(query, serde_json::json!({ "filter": self.team_filter() }))?;

        let states: WorkflowStateConnection =
            serde_json::from_value(data.get("workflowStates").cloned().unwrap_or_default())
                .map_err(|e| Error::Tracker(format!("failed to parse workflow states: {e}")))?;

        debug!(count = states.nodes.len(), "fetched workflow states");
        Ok(states.nodes)
    }

    /// Fetch one issue by its human identifier (`ABC-123`).
    pub fn get_issue(&self, identifier: &str) -> Result<Issue> {
        let query = r#"
            query Issue($id: String!) {
                issue(id: $id) {
                    identifier title url
                    creator { name }
                }
            }
        "#;

        let data = self
            .client
            .graphql(query, serde_json::json!({ "id": identifier }))?;

        serde_json::from_value(data.get("issue").cloned().unwrap_or_default())
            .map_err(|e| Error::Tracker(format!("failed to parse issue {identifier}: {e}")))
    }

    /// Create an issue with the configured team/project/cycle/state
    /// assignment. Unset assignments are omitted from the input entirely.
    pub fn create_issue(&self, title: &str, description: &str) -> Result<CreatedIssue> {
        let team_id = self.team_id.as_ref().ok_or_else(|| {
            Error::ConfigValidation(
                "no team configured: run `todolink configure team`".to_string(),
            )
        })?;

        let mut input = serde_json::json!({
            "title": title,
            "teamId": team_id,
            "description": description,
        });
        if let Some(ref id) = self.project_id {
            input["projectId"] = serde_json::json!(id);
        }
        if let Some(ref id) = self.cycle_id {
            input["cycleId"] = serde_json::json!(id);
        }
        if let Some(ref id) = self.status_id {
            input["stateId"] = serde_json::json!(id);
        }

        let query = r#"
            mutation IssueCreate($input: IssueCreateInput!) {
                issueCreate(input: $input) {
                    success
                    issue { identifier url }
                }
            }
        "#;

        let data = self
            .client
            .graphql(query, serde_json::json!({ "input": input }))?;

        let payload = data.get("issueCreate").cloned().unwrap_or_default();
        let success = payload
            .get("success")
            .and_then(|s| s.as_bool())
            .unwrap_or(false);
        if !success {
            return Err(Error::Tracker("issue creation reported failure".to_string()));
        }

        let issue: CreatedIssue =
            serde_json::from_value(payload.get("issue").cloned().unwrap_or_default())
                .map_err(|e| Error::Tracker(format!("failed to parse created issue: {e}")))?;

        debug!(identifier = %issue.identifier, "created issue");
        Ok(issue)
    }

    fn team_filter(&self) -> serde_json::Value {
        match &self.team_id {
            Some(id) => serde_json::json!({ "team": { "id": { "eq": id } } }),
            None => serde_json::json!({}),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
