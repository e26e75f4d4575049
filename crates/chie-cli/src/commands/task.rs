use chie_core::{RecordStore, SqliteStorage, Task};

use crate::app::AppContext;
use crate::cli::{ListArgs, TaskCommand};
use crate::errors::CliError;
use crate::helpers::find_by_id;
use crate::output::{apply_limit, print_empty, print_json};
use crate::ui::{short_id, task_table};

type TaskStore<'v> = RecordStore<'v, SqliteStorage, Task>;

pub fn handle_task(ctx: &AppContext<'_>, command: &TaskCommand) -> anyhow::Result<()> {
    match command {
        TaskCommand::Add { text, no_input } => handle_add(ctx, text, *no_input),
        TaskCommand::List { pending, list } => handle_list(ctx, *pending, list),
        TaskCommand::Done { id, undo, no_input } => handle_done(ctx, id, !*undo, *no_input),
        TaskCommand::Delete(args) => {
            super::delete_record::<Task>(ctx, args, "task", |t| t.text.clone())
        }
    }
}

fn handle_add(ctx: &AppContext<'_>, text: &str, no_input: bool) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        return Err(CliError::invalid_input("Task text cannot be empty").into());
    }

    let vault = ctx.unlock(no_input)?;
    let task = Task::new(text.trim());
    TaskStore::new(&vault).add(&task)?;

    if ctx.quiet() {
        println!("{}", task.id);
    } else {
        println!("Added task {}", short_id(&task.id));
    }
    Ok(())
}

fn handle_list(ctx: &AppContext<'_>, pending: bool, args: &ListArgs) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let mut tasks = TaskStore::new(&vault).load_all()?;
    if pending {
        tasks.retain(|task| !task.completed);
    }
    let tasks = apply_limit(tasks, args.limit);

    if args.json {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        print_empty("tasks", ctx.quiet());
        return Ok(());
    }
    println!("{}", task_table(&tasks));
    Ok(())
}

fn handle_done(ctx: &AppContext<'_>, id: &str, completed: bool, no_input: bool) -> anyhow::Result<()> {
    let vault = ctx.unlock(no_input)?;
    let mut store = TaskStore::new(&vault);
    let tasks = store.load_all()?;
    let mut task = find_by_id(&tasks, id)?.clone();

    if task.completed == completed {
        if !ctx.quiet() {
            println!(
                "Task {} is already {}",
                short_id(&task.id),
                if completed { "done" } else { "open" }
            );
        }
        return Ok(());
    }

    task.completed = completed;
    if !store.update(task.id, &task)? {
        return Err(CliError::not_found(
            format!("Task {} no longer exists", short_id(&task.id)),
            "Hint: Run `chie task list` to find task IDs.",
        )
        .into());
    }
    if !ctx.quiet() {
        println!(
            "Marked task {} as {}",
            short_id(&task.id),
            if completed { "done" } else { "open" }
        );
    }
    Ok(())
}
