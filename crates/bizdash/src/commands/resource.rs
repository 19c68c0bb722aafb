//! Record command handlers, shared by every resource collection.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tabled::Tabled;

use bizdash_core::{
    FieldDescriptor, PageShape, Record, RecordId, Resource, ResourceDataStore, display_value,
    filter_records,
};

use crate::cli::{GlobalOpts, ListArgs, OutputFormat, ResourceArgs, ResourceCommand, WriteArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

/// Stop following `next` links after this many pages.
const MAX_PAGES: u32 = 500;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    name: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Required")]
    required: String,
    #[tabled(rename = "Options")]
    options: String,
}

impl From<&FieldDescriptor> for FieldRow {
    fn from(f: &FieldDescriptor) -> Self {
        Self {
            name: f.name.clone(),
            label: f.label.clone(),
            kind: f.widget.kind().into(),
            required: if f.is_required() { "yes" } else { "no" }.into(),
            options: f
                .options()
                .iter()
                .map(|o| o.value.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &Context,
    resource: Resource,
    args: ResourceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ResourceCommand::Fields => {
            let fields = resource.fields();
            let out = output::render_list(
                &global.output,
                &fields,
                |f| FieldRow::from(f),
                |f| f.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourceCommand::List(list) => {
            let store = bind_store(ctx, resource).await?;
            list_records(&store, resource, &list, global).await
        }

        ResourceCommand::Create(values) => {
            let body = build_body(&resource.fields(), &values, true)?;
            let store = bind_store(ctx, resource).await?;
            let created = store.add_record(&body).await?;
            report_write(ctx, global, &created, &format!("Created {}", resource.singular()));
            Ok(())
        }

        ResourceCommand::Update { id, values } => {
            let body = build_body(&resource.fields(), &values, false)?;
            let store = bind_store(ctx, resource).await?;
            let updated = store
                .update_record(&RecordId::from(id.as_str()), &body)
                .await
                .map_err(|e| CliError::for_record(e, resource.singular(), &id))?;
            report_write(
                ctx,
                global,
                &updated,
                &format!("Updated {} {id}", resource.singular()),
            );
            Ok(())
        }

        ResourceCommand::Delete { id } => {
            let prompt = format!("Delete {} {id}?", resource.singular());
            if !util::confirm(&prompt, &format!("{resource} delete"), global.yes)? {
                eprintln!("Aborted.");
                return Ok(());
            }
            let store = bind_store(ctx, resource).await?;
            store
                .delete_record(&RecordId::from(id.as_str()))
                .await
                .map_err(|e| CliError::for_record(e, resource.singular(), &id))?;
            if !global.quiet {
                eprintln!(
                    "{}",
                    output::success_line(
                        &format!("Deleted {} {id}", resource.singular()),
                        ctx.color
                    )
                );
            }
            Ok(())
        }
    }
}

/// An idle store for `resource`, after making sure a token is attached.
async fn bind_store(ctx: &Context, resource: Resource) -> Result<ResourceDataStore, CliError> {
    ctx.ensure_session().await?;
    Ok(ResourceDataStore::new(
        Arc::clone(ctx.session.client()),
        resource.endpoint(),
    ))
}

async fn list_records(
    store: &ResourceDataStore,
    resource: Resource,
    args: &ListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let records = if args.all {
        collect_all_pages(store).await
    } else {
        store.fetch_page(args.page).await;
        store.snapshot().records.to_vec()
    };

    let rows = match args.search.as_deref() {
        Some(text) => filter_records(&records, text),
        None => records,
    };

    let out = output::render_records(&global.output, resource.columns(), &rows);
    output::print_output(&out, global.quiet);

    if !args.all && matches!(global.output, OutputFormat::Table) && !global.quiet {
        let snap = store.snapshot();
        if snap.shape == PageShape::Envelope {
            eprintln!(
                "page {} · {} records total{}",
                snap.current_page,
                snap.pagination.count,
                if snap.pagination.next.is_some() {
                    format!(" · next: --page {}", snap.current_page + 1)
                } else {
                    String::new()
                }
            );
        }
    }
    Ok(())
}

/// Walk `next` links from page 1. A raw list is already complete.
async fn collect_all_pages(store: &ResourceDataStore) -> Vec<Arc<Record>> {
    let mut records = Vec::new();
    let mut page = 1;
    loop {
        store.fetch_page(page).await;
        let snap = store.snapshot();
        records.extend(snap.records.iter().cloned());
        let more = snap.shape == PageShape::Envelope
            && snap.pagination.next.is_some()
            && !snap.records.is_empty();
        if !more || page >= MAX_PAGES {
            break;
        }
        page += 1;
    }
    records
}

/// Assemble a request body from `--from-file` and `--set`, validated
/// against the resource's fields. Creates check every field; updates only
/// the ones supplied.
fn build_body(
    fields: &[FieldDescriptor],
    args: &WriteArgs,
    require_all: bool,
) -> Result<Value, CliError> {
    let mut body = match &args.from_file {
        Some(path) => match util::read_json_file(path)? {
            Value::Object(map) => map,
            _ => {
                return Err(CliError::Validation {
                    field: "from-file".into(),
                    reason: "expected a JSON object".into(),
                });
            }
        },
        None => Map::new(),
    };

    for raw in &args.set {
        let (key, value) = util::parse_assignment(raw)?;
        let field = fields
            .iter()
            .find(|f| f.name == key)
            .ok_or_else(|| CliError::Validation {
                field: key.into(),
                reason: format!(
                    "unknown field. Valid fields: {}",
                    fields
                        .iter()
                        .map(|f| f.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;
        body.insert(key.to_owned(), field.coerce(value));
    }

    if body.is_empty() {
        return Err(CliError::Validation {
            field: "set".into(),
            reason: "no field values given (use --set KEY=VALUE or --from-file)".into(),
        });
    }

    let problems: Vec<String> = fields
        .iter()
        .filter(|f| require_all || body.contains_key(&f.name))
        .filter_map(|f| {
            let raw = body.get(&f.name).map(display_value).unwrap_or_default();
            f.validate(&raw).err().map(|msg| format!("{}: {msg}", f.name))
        })
        .collect();
    if !problems.is_empty() {
        return Err(CliError::Validation {
            field: "fields".into(),
            reason: problems.join("; "),
        });
    }

    Ok(Value::Object(body))
}

fn report_write<T: Serialize>(ctx: &Context, global: &GlobalOpts, body: &T, message: &str) {
    if global.quiet {
        return;
    }
    eprintln!("{}", output::success_line(message, ctx.color));
    if !matches!(global.output, OutputFormat::Table) {
        let out = output::render_single(&global.output, body, |_| String::new(), |_| String::new());
        output::print_output(&out, false);
    }
}
