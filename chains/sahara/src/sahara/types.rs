use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct ChallengeResponse {
    pub challenge: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
    // The server also returns refresh token and expiry fields; only the
    // access token is consumed.
}

/// Per-task status code from `dataBatch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "1")]
    NotStarted,
    #[serde(rename = "2")]
    Ready,
    #[serde(rename = "3")]
    Done,
}

#[derive(Debug, Deserialize)]
pub struct TaskState {
    pub status: TaskStatus,
    #[serde(rename = "subTaskID", default)]
    pub sub_task_id: Option<String>,
}

pub type TaskStateMap = HashMap<String, TaskState>;

#[derive(Debug, Deserialize)]
pub struct CatalogTask {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// The slice of `/system/configTable` this bot reads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTable {
    pub task_map: HashMap<String, CatalogTask>,
}

#[derive(Debug, Deserialize)]
pub struct FaucetResponse {
    #[serde(default)]
    pub msg: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub shard_amount: String,
}

/// Filters a `dataBatch` response down to the wanted task ids that are ready
/// to claim. Sorted for deterministic claim order.
pub fn select_ready(states: &TaskStateMap, wanted: &[&str]) -> Vec<String> {
    let mut ids: Vec<String> = states
        .iter()
        .filter(|(id, state)| {
            wanted.contains(&id.as_str()) && state.status == TaskStatus::Ready
        })
        .map(|(id, _)| id.clone())
        .collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(entries: &[(&str, &str)]) -> TaskStateMap {
        entries
            .iter()
            .map(|(id, status)| {
                let state: TaskState = serde_json::from_str(&format!(
                    r#"{{"status": "{}", "subTaskID": "{}"}}"#,
                    status, id
                ))
                .unwrap();
                (id.to_string(), state)
            })
            .collect()
    }

    #[test]
    fn keeps_only_ready_wanted_tasks() {
        let map = states(&[("1001", "1"), ("1002", "2"), ("1004", "3")]);
        assert_eq!(select_ready(&map, &["1001", "1002"]), vec!["1002"]);
    }

    #[test]
    fn ignores_unwanted_ready_tasks() {
        let map = states(&[("1002", "2"), ("1104", "2")]);
        assert_eq!(select_ready(&map, &["1002"]), vec!["1002"]);
    }

    #[test]
    fn selection_is_deterministic() {
        let map = states(&[("1002", "2"), ("1001", "2"), ("1004", "1")]);
        let first = select_ready(&map, &["1001", "1002", "1004"]);
        let second = select_ready(&map, &["1001", "1002", "1004"]);
        assert_eq!(first, vec!["1001", "1002"]);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_when_nothing_ready() {
        let map = states(&[("1001", "3"), ("1002", "1")]);
        assert!(select_ready(&map, &["1001", "1002"]).is_empty());
    }

    #[test]
    fn status_codes_deserialize() {
        let map = states(&[("1", "1"), ("2", "2"), ("3", "3")]);
        assert_eq!(map["1"].status, TaskStatus::NotStarted);
        assert_eq!(map["2"].status, TaskStatus::Ready);
        assert_eq!(map["3"].status, TaskStatus::Done);
    }
}
