use chrono::Utc;

use chie_core::{Event, RecordStore, SqliteStorage};

use crate::app::AppContext;
use crate::cli::{EventCommand, ListArgs};
use crate::errors::CliError;
use crate::helpers::parse_datetime;
use crate::output::{apply_limit, print_empty, print_json};
use crate::ui::{event_table, short_id};

type EventStore<'v> = RecordStore<'v, SqliteStorage, Event>;

pub fn handle_event(ctx: &AppContext<'_>, command: &EventCommand) -> anyhow::Result<()> {
    match command {
        EventCommand::Add {
            title,
            at,
            description,
            no_input,
        } => handle_add(ctx, title, at, description, *no_input),
        EventCommand::List { upcoming, list } => handle_list(ctx, *upcoming, list),
        EventCommand::Delete(args) => super::delete_record::<Event>(ctx, args, "event", |e| {
            format!("{} at {}", e.title, e.date_time.format("%Y-%m-%d %H:%M"))
        }),
    }
}

fn handle_add(
    ctx: &AppContext<'_>,
    title: &str,
    at: &str,
    description: &str,
    no_input: bool,
) -> anyhow::Result<()> {
    if title.trim().is_empty() {
        return Err(CliError::invalid_input("Event title cannot be empty").into());
    }
    let date_time = parse_datetime(at)?;

    let vault = ctx.unlock(no_input)?;
    let event = Event::new(title.trim(), date_time, description);
    EventStore::new(&vault).add(&event)?;

    if ctx.quiet() {
        println!("{}", event.id);
    } else {
        println!(
            "Added event {} on {}",
            short_id(&event.id),
            event.date_time.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn handle_list(ctx: &AppContext<'_>, upcoming: bool, args: &ListArgs) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let mut events = EventStore::new(&vault).load_all()?;
    if upcoming {
        let now = Utc::now();
        events.retain(|event| event.date_time >= now);
    }
    let events = apply_limit(events, args.limit);

    if args.json {
        return print_json(&events);
    }
    if events.is_empty() {
        print_empty("events", ctx.quiet());
        return Ok(());
    }
    println!("{}", event_table(&events));
    Ok(())
}
