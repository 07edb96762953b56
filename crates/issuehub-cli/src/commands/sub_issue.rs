use issuehub_kernel::sub_issue::{
    add_sub_issue, list_sub_issues, remove_sub_issue, reprioritize_sub_issue,
};
use issuehub_kernel::{
    AddSubIssue, ClientSource, ListSubIssues, RemoveSubIssue, ReprioritizeSubIssue,
};
use serde_json::{Value, json};

use crate::cli::{GlobalArgs, SubIssueCommands};
use crate::support::{client_source_or_exit, fail, print_json, repo_or_exit, runtime_or_exit};

pub fn run(global: &GlobalArgs, command: SubIssueCommands) {
    let source = client_source_or_exit(global);
    let runtime = runtime_or_exit();

    match command {
        SubIssueCommands::Add {
            repo,
            issue_number,
            sub_issue_id,
            replace_parent,
            json,
        } => {
            let repo = repo_or_exit(&repo);
            let request = AddSubIssue::new(
                &repo.owner,
                &repo.name,
                issue_number,
                sub_issue_id,
                Some(replace_parent),
            )
            .unwrap_or_else(|e| fail(e));
            let created = runtime.block_on(async {
                let client = source.rest().await?;
                add_sub_issue(client.as_ref(), &request).await
            });
            let created = created.unwrap_or_else(|e| fail(e));
            report(json, "sub-issue.add", &created, || {
                format!(
                    "issuehub sub-issue add\n  Parent: {} {}\n  Added: {}",
                    request.repo,
                    request.parent,
                    describe(&created)
                )
            });
        }

        SubIssueCommands::List {
            repo,
            issue_number,
            page,
            per_page,
            json,
        } => {
            let repo = repo_or_exit(&repo);
            let request =
                ListSubIssues::new(&repo.owner, &repo.name, issue_number, page, per_page)
                    .unwrap_or_else(|e| fail(e));
            let listed = runtime.block_on(async {
                let client = source.rest().await?;
                list_sub_issues(client.as_ref(), &request).await
            });
            let listed = listed.unwrap_or_else(|e| fail(e));
            report(json, "sub-issue.list", &listed, || {
                let items = listed.as_array().map(Vec::as_slice).unwrap_or_default();
                let mut out = format!(
                    "issuehub sub-issue list\n  Parent: {} {}\n  Page: {} ({} per page)\n  Count: {}",
                    request.repo,
                    request.parent,
                    request.pagination.page,
                    request.pagination.per_page,
                    items.len()
                );
                for (position, item) in items.iter().enumerate() {
                    out.push_str(&format!("\n  {:>3}. {}", position + 1, describe(item)));
                }
                out
            });
        }

        SubIssueCommands::Remove {
            repo,
            issue_number,
            sub_issue_id,
            json,
        } => {
            let repo = repo_or_exit(&repo);
            let request = RemoveSubIssue::new(&repo.owner, &repo.name, issue_number, sub_issue_id)
                .unwrap_or_else(|e| fail(e));
            let removed = runtime.block_on(async {
                let client = source.rest().await?;
                remove_sub_issue(client.as_ref(), &request).await
            });
            let removed = removed.unwrap_or_else(|e| fail(e));
            report(json, "sub-issue.remove", &removed, || {
                format!(
                    "issuehub sub-issue remove\n  Parent: {} {}\n  Removed: {}",
                    request.repo,
                    request.parent,
                    request.sub_issue
                )
            });
        }

        SubIssueCommands::Reprioritize {
            repo,
            issue_number,
            sub_issue_id,
            after_id,
            before_id,
            json,
        } => {
            let repo = repo_or_exit(&repo);
            let request = ReprioritizeSubIssue::new(
                &repo.owner,
                &repo.name,
                issue_number,
                sub_issue_id,
                after_id,
                before_id,
            )
            .unwrap_or_else(|e| fail(e));
            let moved = runtime.block_on(async {
                let client = source.rest().await?;
                reprioritize_sub_issue(client.as_ref(), &request).await
            });
            let moved = moved.unwrap_or_else(|e| fail(e));
            report(json, "sub-issue.reprioritize", &moved, || {
                format!(
                    "issuehub sub-issue reprioritize\n  Parent: {} {}\n  Moved: {} ({})",
                    request.repo,
                    request.parent,
                    request.sub_issue,
                    request.anchor
                )
            });
        }
    }
}

fn report(json_output: bool, action: &str, result: &Value, human: impl FnOnce() -> String) {
    if json_output {
        print_json(&json!({ "action": action, "result": result }));
    } else {
        println!("{}", human());
    }
}

/// `#12 Title (id 345)` from an issue payload, tolerating missing fields.
fn describe(issue: &Value) -> String {
    let number = issue["number"].as_i64().map(|n| format!("#{n} ")).unwrap_or_default();
    let title = issue["title"].as_str().unwrap_or("(untitled)");
    match issue["id"].as_i64() {
        Some(id) => format!("{number}{title} (id {id})"),
        None => format!("{number}{title}"),
    }
}
