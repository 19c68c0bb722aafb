//! Dashboard totals: one row per collection with its record count.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use bizdash_core::{Resource, ResourceDataStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Debug, Serialize)]
struct Total {
    resource: Resource,
    label: &'static str,
    count: u64,
}

#[derive(Tabled)]
struct TotalRow {
    #[tabled(rename = "Collection")]
    label: &'static str,
    #[tabled(rename = "Records")]
    count: u64,
}

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.ensure_session().await?;

    let client = ctx.session.client();
    let totals = join_all(Resource::iter().map(|resource| {
        let client = Arc::clone(client);
        async move {
            let store = ResourceDataStore::bind(client, resource.endpoint()).await;
            Total {
                resource,
                label: resource.label(),
                count: store.snapshot().pagination.count,
            }
        }
    }))
    .await;

    let out = output::render_list(
        &global.output,
        &totals,
        |t| TotalRow {
            label: t.label,
            count: t.count,
        },
        |t| format!("{}\t{}", t.resource, t.count),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
