use chie_core::{Journal, RecordStore, Sentiment, SqliteStorage};

use crate::app::AppContext;
use crate::cli::{JournalAddArgs, JournalCommand, JournalEditArgs, ListArgs};
use crate::errors::CliError;
use crate::helpers::{find_by_id, parse_datetime, read_body};
use crate::output::{apply_limit, print_empty, print_json};
use crate::ui::{journal_table, short_id};

type JournalStore<'v> = RecordStore<'v, SqliteStorage, Journal>;

pub fn handle_journal(ctx: &AppContext<'_>, command: &JournalCommand) -> anyhow::Result<()> {
    match command {
        JournalCommand::Add(args) => handle_add(ctx, args),
        JournalCommand::List(args) => handle_list(ctx, args),
        JournalCommand::Show { id, json } => handle_show(ctx, id, *json),
        JournalCommand::Edit(args) => handle_edit(ctx, args),
        JournalCommand::Delete(args) => {
            super::delete_record::<Journal>(ctx, args, "journal entry", |j| j.title.clone())
        }
    }
}

fn handle_add(ctx: &AppContext<'_>, args: &JournalAddArgs) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let body = read_body(args.no_input, args.body.clone(), ctx.editor()?, "")?;

    let mut journal = Journal::new(args.title.clone().unwrap_or_default(), body);
    if let Some(date) = args.date.as_deref() {
        journal = journal.with_date(parse_datetime(date)?);
    }
    if let Some(sentiment) = args.sentiment.as_deref() {
        journal = journal.with_sentiment(sentiment.parse::<Sentiment>()?);
    }

    JournalStore::new(&vault).add(&journal)?;

    if ctx.quiet() {
        println!("{}", journal.id);
    } else {
        println!("Added journal entry {} ({})", short_id(&journal.id), journal.title);
    }
    Ok(())
}

fn handle_list(ctx: &AppContext<'_>, args: &ListArgs) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let journals = apply_limit(JournalStore::new(&vault).load_all()?, args.limit);

    if args.json {
        return print_json(&journals);
    }
    if journals.is_empty() {
        print_empty("journal entries", ctx.quiet());
        return Ok(());
    }
    println!("{}", journal_table(&journals));
    Ok(())
}

fn handle_show(ctx: &AppContext<'_>, id: &str, json: bool) -> anyhow::Result<()> {
    let vault = ctx.unlock(false)?;
    let journals = JournalStore::new(&vault).load_all()?;
    let journal = find_by_id(&journals, id)?;

    if json {
        return print_json(journal);
    }

    if !ctx.quiet() {
        println!("ID: {}", journal.id);
        println!("Title: {}", journal.title);
        println!("Date: {}", journal.date.format("%Y-%m-%d %H:%M UTC"));
        if let Some(sentiment) = &journal.sentiment {
            println!("Sentiment: {}", sentiment);
        }
        println!();
    }
    println!("{}", journal.content);
    Ok(())
}

fn handle_edit(ctx: &AppContext<'_>, args: &JournalEditArgs) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let mut store = JournalStore::new(&vault);
    let journals = store.load_all()?;
    let mut journal = find_by_id(&journals, &args.id)?.clone();

    let mut changed = false;
    if let Some(title) = &args.title {
        journal.title = if title.trim().is_empty() {
            Journal::DEFAULT_TITLE.to_string()
        } else {
            title.clone()
        };
        changed = true;
    }
    if let Some(sentiment) = &args.sentiment {
        journal.sentiment = if sentiment.trim().is_empty() {
            None
        } else {
            Some(sentiment.parse::<Sentiment>()?)
        };
        changed = true;
    }
    if args.body.is_some() || !changed {
        journal.content = read_body(
            args.no_input,
            args.body.clone(),
            ctx.editor()?,
            &journal.content,
        )?;
    }

    if !store.update(journal.id, &journal)? {
        return Err(CliError::not_found(
            format!("Journal entry {} no longer exists", short_id(&journal.id)),
            "Hint: Run `chie journal list` to find entry IDs.",
        )
        .into());
    }
    if !ctx.quiet() {
        println!("Updated journal entry {}", short_id(&journal.id));
    }
    Ok(())
}
