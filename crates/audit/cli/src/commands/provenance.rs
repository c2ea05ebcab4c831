//! Provenance commands

use crate::output::print_json;
use crate::Context;
use audit_provenance::{Operation, ProvenanceGraph, ProvenanceInput};
use clap::Subcommand;
use std::sync::Arc;

/// Provenance subcommands
#[derive(Subcommand)]
pub enum ProvenanceCommands {
    /// Record an operation on a data artifact
    Record {
        /// Data identifier
        data_id: String,

        /// create, read, update, delete, transform, export, import or share
        operation: Operation,

        /// Parent data identifier (repeatable)
        #[arg(short, long = "parent")]
        parents: Vec<String>,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        session: Option<String>,
    },

    /// Show a record with its full provenance tree
    Show {
        /// Data identifier
        data_id: String,
    },
}

pub async fn execute(ctx: &Context, command: ProvenanceCommands) -> anyhow::Result<()> {
    let graph = ProvenanceGraph::new(Arc::clone(&ctx.ledger));
    graph.restore().await?;

    match command {
        ProvenanceCommands::Record {
            data_id,
            operation,
            parents,
            user,
            session,
        } => {
            let input = ProvenanceInput {
                parent_data_ids: parents,
                user_id: user,
                session_id: session,
                ..Default::default()
            };
            let record = graph.record(&data_id, operation, input).await?;
            print_json(&record)
        }
        ProvenanceCommands::Show { data_id } => match graph.query(&data_id) {
            Some(view) => print_json(&view),
            None => anyhow::bail!("no provenance recorded for {data_id}"),
        },
    }
}
