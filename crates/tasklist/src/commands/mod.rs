use std::io::Write;

use anyhow::Result;
use tasklist_app::{EditSession, TaskStore, TaskSync};
use tasklist_core::{Task, TaskFilter};

use crate::{LsFormat, TaskCommand};

/// Execute a store-backed command, writing results to `out`.
pub async fn run<S: TaskStore>(
    command: TaskCommand,
    sync: &TaskSync<S>,
    default_filter: TaskFilter,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        TaskCommand::Ls { filter, format } => {
            let tasks = sync.list(filter.unwrap_or(default_filter)).await?;
            match format {
                LsFormat::Table => render_task_table(&tasks, out)?,
                LsFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &tasks)?;
                    writeln!(out)?;
                }
            }
        }

        TaskCommand::Add { title } => match sync.create(&title).await? {
            Some(task) => render_task_line("created", &task, out)?,
            None => writeln!(out, "nothing to add: title is blank")?,
        },

        TaskCommand::Toggle { id } => {
            sync.list(TaskFilter::All).await?;
            let task = sync.toggle_completion(&id).await?;
            render_task_line("updated", &task, out)?;
        }

        TaskCommand::Rename { id, title } => {
            sync.list(TaskFilter::All).await?;
            let mut session = EditSession::default();
            session.begin(sync.begin_edit(&id).await?);
            if let Some(draft) = session.draft_mut() {
                draft.set_text(title);
            }
            if let Some(task) = session.save(sync).await? {
                render_task_line("renamed", &task, out)?;
            }
        }

        TaskCommand::Rm { id } => {
            sync.list(TaskFilter::All).await?;
            sync.delete(&id).await?;
            writeln!(out, "deleted {id}")?;
        }
    }

    Ok(())
}

fn render_task_table(tasks: &[Task], out: &mut impl Write) -> Result<()> {
    if tasks.is_empty() {
        writeln!(out, "no tasks")?;
        return Ok(());
    }

    writeln!(out, "ID | Done | Title")?;
    writeln!(out, "-- | ---- | -----")?;
    for task in tasks {
        writeln!(out, "{} | {} | {}", task.id, checkbox(task), task.title)?;
    }
    Ok(())
}

fn render_task_line(verb: &str, task: &Task, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{verb} {} {} {}", task.id, checkbox(task), task.title)?;
    Ok(())
}

const fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use tasklist_app::SyncError;
    use tasklist_core::TaskId;
    use tasklist_server::{ServerHandle, TaskServer};
    use tasklist_store_http::HttpTaskStore;

    async fn harness() -> (ServerHandle, TaskSync<HttpTaskStore>) {
        let server = TaskServer::new()
            .start("127.0.0.1:0")
            .await
            .unwrap_or_else(|err| panic!("failed to start server: {err}"));
        let store = HttpTaskStore::new(&server.base_url(), None)
            .unwrap_or_else(|err| panic!("failed to build store: {err}"));
        (server, TaskSync::new(store))
    }

    async fn exec(sync: &TaskSync<HttpTaskStore>, command: TaskCommand) -> Result<String> {
        let mut out = Vec::new();
        run(command, sync, TaskFilter::All, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    async fn add(sync: &TaskSync<HttpTaskStore>, title: &str) {
        exec(sync, TaskCommand::Add { title: title.into() }).await.unwrap();
    }

    fn ls(filter: Option<TaskFilter>) -> TaskCommand {
        TaskCommand::Ls {
            filter,
            format: LsFormat::Table,
        }
    }

    #[tokio::test]
    async fn add_toggle_and_filter() {
        let (_server, sync) = harness().await;

        let created = exec(&sync, TaskCommand::Add { title: "buy milk".into() }).await.unwrap();
        assert_eq!(created, "created 1 [ ] buy milk\n");
        add(&sync, "walk dog").await;

        let toggled = exec(&sync, TaskCommand::Toggle { id: TaskId::Number(1) }).await.unwrap();
        assert_eq!(toggled, "updated 1 [x] buy milk\n");

        let done = exec(&sync, ls(Some(TaskFilter::Completed))).await.unwrap();
        assert_eq!(done, "ID | Done | Title\n-- | ---- | -----\n1 | [x] | buy milk\n");

        let pending = exec(&sync, ls(Some(TaskFilter::Incomplete))).await.unwrap();
        assert!(pending.contains("2 | [ ] | walk dog"));
        assert!(!pending.contains("buy milk"));
    }

    #[tokio::test]
    async fn blank_title_is_not_sent() {
        let (_server, sync) = harness().await;
        let out = exec(&sync, TaskCommand::Add { title: "   ".into() }).await.unwrap();
        assert_eq!(out, "nothing to add: title is blank\n");
        assert_eq!(exec(&sync, ls(None)).await.unwrap(), "no tasks\n");
    }

    #[tokio::test]
    async fn rename_goes_through_an_edit_draft() {
        let (_server, sync) = harness().await;
        add(&sync, "buy milk").await;

        let out = exec(
            &sync,
            TaskCommand::Rename {
                id: TaskId::Number(1),
                title: "buy oat milk".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(out, "renamed 1 [ ] buy oat milk\n");
    }

    #[tokio::test]
    async fn rm_deletes_and_reports_id() {
        let (_server, sync) = harness().await;
        add(&sync, "a").await;
        add(&sync, "b").await;

        let out = exec(&sync, TaskCommand::Rm { id: TaskId::Number(1) }).await.unwrap();
        assert_eq!(out, "deleted 1\n");
        let remaining = sync.list(TaskFilter::All).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "b");
    }

    #[tokio::test]
    async fn toggle_unknown_id_reports_task_not_found() {
        let (_server, sync) = harness().await;
        let err = exec(&sync, TaskCommand::Toggle { id: TaskId::Number(7) })
            .await
            .expect_err("unknown id should fail");
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::TaskNotFound(TaskId::Number(7)))
        ));
    }

    #[tokio::test]
    async fn json_listing_matches_wire_shape() {
        let (_server, sync) = harness().await;
        add(&sync, "buy milk").await;

        let out = exec(
            &sync,
            TaskCommand::Ls {
                filter: None,
                format: LsFormat::Json,
            },
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"id": 1, "title": "buy milk", "completed": false}])
        );
    }
}
