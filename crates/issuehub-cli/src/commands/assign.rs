use issuehub_kernel::{AssignCodingAgent, AssignmentOutcome, ClientSource, assign_coding_agent};
use serde_json::{Value, json};

use crate::cli::GlobalArgs;
use crate::support::{client_source_or_exit, fail, print_json, repo_or_exit, runtime_or_exit};

pub fn run(global: &GlobalArgs, repo: String, issue_number: i64, json_output: bool) {
    let source = client_source_or_exit(global);
    let repo = repo_or_exit(&repo);
    let request =
        AssignCodingAgent::new(&repo.owner, &repo.name, issue_number).unwrap_or_else(|e| fail(e));

    let outcome = runtime_or_exit()
        .block_on(async {
            let graph = source.graph().await?;
            assign_coding_agent(graph.as_ref(), &request).await
        })
        .unwrap_or_else(|e| fail(e));

    if json_output {
        print_json(&outcome_json(&outcome));
    } else {
        println!(
            "issuehub assign-agent\n  Issue: {} {}\n  {}",
            request.repo,
            request.issue,
            outcome.message()
        );
    }
}

/// An unavailable agent is a normal result, so the exit code stays 0.
pub fn outcome_json(outcome: &AssignmentOutcome) -> Value {
    match outcome {
        AssignmentOutcome::Assigned { issue, assignees } => json!({
            "action": "assign-agent",
            "assigned": true,
            "issueId": issue,
            "assignees": assignees,
            "message": outcome.message(),
        }),
        AssignmentOutcome::AgentUnavailable => json!({
            "action": "assign-agent",
            "assigned": false,
            "message": outcome.message(),
        }),
    }
}
